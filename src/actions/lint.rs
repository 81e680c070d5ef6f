use std::process::{Command, Stdio};

use camino::{Utf8Path, Utf8PathBuf};

/// Problems found by a linter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
    /// Human readable diagnostics, one per line of linter output.
    pub diagnostics: Vec<String>,
    /// Number of errors, zero when the files are clean.
    pub errors: usize,
}

/// Checks source files for problems.
pub trait Linter: Send + Sync {
    fn lint(&self, root: &Utf8Path, files: &[Utf8PathBuf]) -> anyhow::Result<LintReport>;
}

/// Runs an external linter such as `eslint` or `stylelint`, passing the files
/// as trailing arguments.
#[derive(Debug, Clone)]
pub struct CommandLinter {
    program: String,
    args: Vec<String>,
}

impl CommandLinter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn eslint() -> Self {
        Self::new("eslint").arg("--config").arg(".eslintrc.json")
    }

    pub fn stylelint() -> Self {
        Self::new("stylelint").arg("--formatter").arg("unix")
    }
}

impl Linter for CommandLinter {
    fn lint(&self, root: &Utf8Path, files: &[Utf8PathBuf]) -> anyhow::Result<LintReport> {
        if files.is_empty() {
            return Ok(LintReport::default());
        }

        let output = Command::new(&self.program)
            .current_dir(root)
            .args(&self.args)
            .args(files.iter().map(|file| file.as_str()))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|err| anyhow::anyhow!("couldn't run {}: {}", self.program, err))?;

        let diagnostics: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .chain(String::from_utf8_lossy(&output.stderr).lines())
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();

        let errors = match output.status.success() {
            true => 0,
            false => diagnostics.len().max(1),
        };

        Ok(LintReport {
            diagnostics,
            errors,
        })
    }
}
