use std::fs;

use camino::{Utf8Path, Utf8PathBuf};

use crate::actions::glob::resolve;
use crate::error::TaskError;
use crate::task::CopyOptions;

pub(crate) fn run(root: &Utf8Path, opts: &CopyOptions) -> Result<Vec<Utf8PathBuf>, TaskError> {
    let cwd = root.join(&opts.cwd);
    let dest = root.join(&opts.dest);

    let sources = resolve(&opts.patterns, &cwd)?;
    let mut written = Vec::with_capacity(sources.len());

    for source in sources {
        let target = target(&cwd, &dest, &source, opts.flatten);

        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir).map_err(TaskError::io(dir))?;
        }

        fs::copy(&source, &target).map_err(TaskError::io(&source))?;

        if opts.preserve_timestamps {
            copy_mtime(&source, &target)?;
        }

        written.push(target);
    }

    Ok(written)
}

fn target(cwd: &Utf8Path, dest: &Utf8Path, source: &Utf8Path, flatten: bool) -> Utf8PathBuf {
    match (flatten, source.file_name()) {
        (true, Some(name)) => dest.join(name),
        _ => dest.join(source.strip_prefix(cwd).unwrap_or(source)),
    }
}

fn copy_mtime(source: &Utf8Path, target: &Utf8Path) -> Result<(), TaskError> {
    let modified = fs::metadata(source)
        .and_then(|meta| meta.modified())
        .map_err(TaskError::io(source))?;

    fs::File::options()
        .write(true)
        .open(target)
        .and_then(|file| file.set_modified(modified))
        .map_err(TaskError::io(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    fn vendor() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();

        fs::create_dir_all(root.join("node_modules/leaflet/dist/images")).unwrap();
        fs::write(root.join("node_modules/leaflet/dist/leaflet.css"), ".a{}").unwrap();
        fs::write(root.join("node_modules/leaflet/dist/images/marker.png"), [0u8, 1, 2]).unwrap();

        (dir, root)
    }

    #[test]
    fn test_flatten_copies_into_dest() {
        let (_dir, root) = vendor();

        let opts = CopyOptions {
            cwd: "node_modules".into(),
            patterns: vec!["leaflet/dist/images/*.png".into()],
            dest: "css/images".into(),
            flatten: true,
            preserve_timestamps: false,
        };

        let written = run(&root, &opts).unwrap();

        assert_eq!(written, vec![root.join("css/images/marker.png")]);
        assert_eq!(fs::read(root.join("css/images/marker.png")).unwrap(), vec![0u8, 1, 2]);
    }

    #[test]
    fn test_structure_is_kept_without_flatten() {
        let (_dir, root) = vendor();

        let opts = CopyOptions {
            cwd: "node_modules".into(),
            patterns: vec!["leaflet/**".into()],
            dest: "vendor".into(),
            flatten: false,
            preserve_timestamps: false,
        };

        run(&root, &opts).unwrap();

        assert!(root.join("vendor/leaflet/dist/leaflet.css").is_file());
        assert!(root.join("vendor/leaflet/dist/images/marker.png").is_file());
    }

    #[test]
    fn test_preserves_modification_time() {
        let (_dir, root) = vendor();
        let source = root.join("node_modules/leaflet/dist/leaflet.css");
        let past = SystemTime::now() - Duration::from_secs(3600 * 24);
        fs::File::options()
            .write(true)
            .open(&source)
            .unwrap()
            .set_modified(past)
            .unwrap();

        let opts = CopyOptions {
            cwd: "node_modules".into(),
            patterns: vec!["leaflet/dist/leaflet.css".into()],
            dest: "css".into(),
            flatten: true,
            preserve_timestamps: true,
        };

        run(&root, &opts).unwrap();

        let copied = fs::metadata(root.join("css/leaflet.css")).unwrap().modified().unwrap();
        assert_eq!(copied, fs::metadata(&source).unwrap().modified().unwrap());
    }
}
