use std::process::{Command, Stdio};

use camino::Utf8Path;
use thiserror::Error;

use crate::task::MinifyOptions;

/// Errors that can occur when minifying JavaScript files.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// An I/O error occurred during process execution.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The Esbuild process returned a non-zero exit code.
    #[error("Esbuild execution failed: {0}")]
    Esbuild(String),
}

/// Minifies a single script bundle.
pub trait ScriptMinifier: Send + Sync {
    fn minify(&self, input: &Utf8Path, output: &Utf8Path, opts: &MinifyOptions) -> anyhow::Result<()>;
}

/// Minifies scripts with the `esbuild` command-line tool, which has to be
/// available in the system PATH.
#[derive(Debug, Clone, Default)]
pub struct Esbuild;

impl ScriptMinifier for Esbuild {
    fn minify(&self, input: &Utf8Path, output: &Utf8Path, opts: &MinifyOptions) -> anyhow::Result<()> {
        let mut command = Command::new("esbuild");
        command
            .arg(input.as_str())
            .arg(format!("--outfile={output}"))
            .arg("--minify-whitespace")
            .arg("--minify-syntax");

        if opts.mangle {
            command.arg("--minify-identifiers");
        }
        if opts.source_map {
            command.arg("--sourcemap");
        }
        if opts.keep_comments {
            command.arg("--legal-comments=inline");
        }

        let result = command
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(ScriptError::Io)?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).into_owned();
            return Err(ScriptError::Esbuild(stderr).into());
        }

        Ok(())
    }
}
