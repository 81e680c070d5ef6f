use std::process::{Command, Stdio};

use camino::Utf8Path;
use thiserror::Error;

use crate::task::StyleOptions;

/// Errors that can occur when compiling stylesheets.
#[derive(Debug, Error)]
pub enum StyleError {
    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A Sass compilation error occurred.
    #[cfg(feature = "grass")]
    #[error("Sass compilation error: {0}")]
    Sass(#[from] Box<grass::Error>),

    /// The external compiler returned a non-zero exit code.
    #[error("{0} execution failed: {1}")]
    Command(String, String),
}

/// Compiles a single stylesheet entry point.
pub trait StyleCompiler: Send + Sync {
    fn compile(&self, input: &Utf8Path, output: &Utf8Path, opts: &StyleOptions) -> anyhow::Result<()>;
}

/// Compiles Sass/SCSS in-process using the `grass` crate.
///
/// `grass` doesn't produce source maps, `source_map` is ignored.
#[cfg(feature = "grass")]
#[derive(Debug, Clone, Default)]
pub struct Grass;

#[cfg(feature = "grass")]
impl StyleCompiler for Grass {
    fn compile(&self, input: &Utf8Path, output: &Utf8Path, opts: &StyleOptions) -> anyhow::Result<()> {
        let style = match opts.minify {
            true => grass::OutputStyle::Compressed,
            false => grass::OutputStyle::Expanded,
        };

        let options = opts
            .load_paths
            .iter()
            .fold(grass::Options::default().style(style), |options, path| {
                options.load_path(path.as_std_path())
            });

        let css = grass::from_path(input, &options).map_err(StyleError::Sass)?;

        if let Some(dir) = output.parent() {
            std::fs::create_dir_all(dir).map_err(StyleError::Io)?;
        }
        std::fs::write(output, css).map_err(StyleError::Io)?;

        if opts.source_map {
            tracing::debug!("grass can't emit source maps, skipping one for {}", output);
        }

        Ok(())
    }
}

/// Compiles LESS with the external `lessc` compiler. Minification relies on
/// the `less-plugin-clean-css` plugin being installed.
#[derive(Debug, Clone, Default)]
pub struct Lessc;

impl StyleCompiler for Lessc {
    fn compile(&self, input: &Utf8Path, output: &Utf8Path, opts: &StyleOptions) -> anyhow::Result<()> {
        let mut command = Command::new("lessc");

        if !opts.load_paths.is_empty() {
            let paths: Vec<_> = opts.load_paths.iter().map(|p| p.as_str()).collect();
            command.arg(format!("--include-path={}", paths.join(":")));
        }
        if opts.minify {
            command.arg("--clean-css");
        }
        if opts.source_map {
            command.arg("--source-map").arg("--source-map-rootpath=../");
        }

        let result = command
            .arg(input.as_str())
            .arg(output.as_str())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(StyleError::Io)?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).into_owned();
            return Err(StyleError::Command("lessc".into(), stderr).into());
        }

        Ok(())
    }
}
