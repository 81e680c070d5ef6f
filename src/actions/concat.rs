use std::fs;

use camino::{Utf8Path, Utf8PathBuf};

use crate::actions::glob::{is_literal, resolve};
use crate::error::TaskError;
use crate::task::{Bundle, ConcatOptions};

/// Runs every bundle of a concatenate task, returning the written paths.
pub(crate) fn run(root: &Utf8Path, opts: &ConcatOptions) -> Result<Vec<Utf8PathBuf>, TaskError> {
    let mut written = Vec::with_capacity(opts.bundles.len());

    for bundle in &opts.bundles {
        let inputs = inputs(root, bundle)?;
        let output = root.join(&bundle.output);

        tracing::debug!("concatenating {} file(s) into {}", inputs.len(), output);
        concat(&inputs, &opts.separator, &output)?;
        written.push(output);
    }

    Ok(written)
}

/// Resolves the bundle inputs, failing on explicit files that are missing.
fn inputs(root: &Utf8Path, bundle: &Bundle) -> Result<Vec<Utf8PathBuf>, TaskError> {
    for pattern in bundle.inputs.iter().filter(|p| is_literal(p)) {
        let path = root.join(pattern);
        if !path.is_file() {
            return Err(TaskError::MissingInput(path));
        }
    }

    resolve(&bundle.inputs, root)
}

/// Reads `inputs` in order, joins them with `separator` and writes the result.
pub fn concat(inputs: &[Utf8PathBuf], separator: &str, output: &Utf8Path) -> Result<(), TaskError> {
    let mut buffer = String::new();

    for (i, path) in inputs.iter().enumerate() {
        if i > 0 {
            buffer.push_str(separator);
        }

        let text = fs::read_to_string(path).map_err(TaskError::io(path))?;
        buffer.push_str(&text);
    }

    write(output, buffer.as_bytes())
}

/// Writes `data` to `path`, creating missing parent directories.
pub(crate) fn write(path: &Utf8Path, data: &[u8]) -> Result<(), TaskError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(TaskError::io(dir))?;
    }

    fs::write(path, data).map_err(TaskError::io(path))
}
