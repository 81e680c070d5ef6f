use std::collections::HashSet;

use camino::{Utf8Path, Utf8PathBuf};
use glob::{MatchOptions, Pattern, glob_with};

use crate::error::TaskError;

const OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Expands `patterns` against `base` into existing file paths.
///
/// Patterns are evaluated in order, a path matched by several patterns is
/// kept at its first occurrence. Patterns matching nothing, including those
/// pointing into a missing directory, contribute nothing. Wildcards never
/// match hidden files.
pub fn resolve<S>(patterns: &[S], base: &Utf8Path) -> Result<Vec<Utf8PathBuf>, TaskError>
where
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut paths = Vec::new();

    for pattern in patterns {
        for path in glob_with(&anchor(base, pattern.as_ref()), OPTIONS)? {
            let path = Utf8PathBuf::try_from(path?)?;

            if path.is_file() && seen.insert(path.clone()) {
                paths.push(path);
            }
        }
    }

    Ok(paths)
}

/// Whether the pattern names a single file rather than a set of them.
pub fn is_literal(pattern: &str) -> bool {
    !pattern.contains(['*', '?', '['])
}

/// Joins the pattern onto `base`, escaping any metacharacters in the base.
fn anchor(base: &Utf8Path, pattern: &str) -> String {
    // A trailing `**` only yields directories in `glob`, we want their files.
    let pattern = match pattern.strip_suffix("**") {
        Some(head) if head.is_empty() || head.ends_with('/') => format!("{pattern}/*"),
        _ => pattern.to_string(),
    };

    if base.as_str().is_empty() {
        return pattern;
    }

    let base = Pattern::escape(base.as_str());
    Utf8Path::new(&base).join(pattern).into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn tree() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();

        fs::create_dir_all(root.join("src/js/main/sub")).unwrap();
        fs::write(root.join("src/js/main/a.js"), "a").unwrap();
        fs::write(root.join("src/js/main/b.js"), "b").unwrap();
        fs::write(root.join("src/js/main/sub/c.js"), "c").unwrap();

        (dir, root)
    }

    fn names(paths: &[Utf8PathBuf], root: &Utf8Path) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_single_segment_wildcard() {
        let (_dir, root) = tree();
        let paths = resolve(&["src/js/main/*.js"], &root).unwrap();

        assert_eq!(names(&paths, &root), vec!["src/js/main/a.js", "src/js/main/b.js"]);
    }

    #[test]
    fn test_dotfiles_are_skipped() {
        let (_dir, root) = tree();
        fs::write(root.join("src/js/main/.hidden.js"), "x").unwrap();

        let paths = resolve(&["src/js/main/*.js"], &root).unwrap();
        assert_eq!(names(&paths, &root), vec!["src/js/main/a.js", "src/js/main/b.js"]);

        let paths = resolve(&["src/**"], &root).unwrap();
        assert_eq!(
            names(&paths, &root),
            vec!["src/js/main/a.js", "src/js/main/b.js", "src/js/main/sub/c.js"]
        );

        let paths = resolve(&["src/js/main/.hidden.js"], &root).unwrap();
        assert_eq!(names(&paths, &root), vec!["src/js/main/.hidden.js"]);
    }

    #[test]
    fn test_recursive_wildcard() {
        let (_dir, root) = tree();
        let paths = resolve(&["src/**"], &root).unwrap();

        assert_eq!(
            names(&paths, &root),
            vec!["src/js/main/a.js", "src/js/main/b.js", "src/js/main/sub/c.js"]
        );
    }

    #[test]
    fn test_overlap_keeps_first_occurrence() {
        let (_dir, root) = tree();
        let paths = resolve(&["src/js/main/b.js", "src/**/*.js"], &root).unwrap();

        assert_eq!(
            names(&paths, &root),
            vec!["src/js/main/b.js", "src/js/main/a.js", "src/js/main/sub/c.js"]
        );
    }

    #[test]
    fn test_misses_are_empty() {
        let (_dir, root) = tree();

        assert!(resolve(&["src/less/*.less"], &root).unwrap().is_empty());
        assert!(resolve(&["*.js"], &root.join("nope")).unwrap().is_empty());
    }

    #[test]
    fn test_base_with_metacharacters() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().join("theme[1]")).unwrap();
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("x.js"), "x").unwrap();

        assert_eq!(names(&resolve(&["*.js"], &root).unwrap(), &root), vec!["x.js"]);
    }

    #[test]
    fn test_is_literal() {
        assert!(is_literal("node_modules/autocomplete-js/dist/autocomplete.js"));
        assert!(!is_literal("src/js/main/*.js"));
        assert!(!is_literal("src/**"));
    }
}
