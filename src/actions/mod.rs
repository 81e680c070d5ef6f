//! Task actions and the external tools they delegate to.

pub mod concat;
pub mod copy;
pub mod glob;
pub mod icons;
pub mod lint;
pub mod script;
pub mod style;

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::TaskError;
use crate::task::{Action, LintOptions, LintTool, MinifyOptions, StyleOptions};

pub use self::lint::{CommandLinter, LintReport, Linter};
pub use self::script::{Esbuild, ScriptMinifier};
#[cfg(feature = "grass")]
pub use self::style::Grass;
pub use self::style::{Lessc, StyleCompiler};

/// External collaborators invoked by the pipeline.
#[derive(Clone)]
pub struct Adapters {
    pub script_linter: Arc<dyn Linter>,
    pub style_linter: Arc<dyn Linter>,
    pub minifier: Arc<dyn ScriptMinifier>,
    pub compiler: Arc<dyn StyleCompiler>,
}

impl Adapters {
    fn linter(&self, tool: LintTool) -> &dyn Linter {
        match tool {
            LintTool::Script => self.script_linter.as_ref(),
            LintTool::Style => self.style_linter.as_ref(),
        }
    }
}

impl Default for Adapters {
    fn default() -> Self {
        #[cfg(feature = "grass")]
        let compiler: Arc<dyn StyleCompiler> = Arc::new(Grass);
        #[cfg(not(feature = "grass"))]
        let compiler: Arc<dyn StyleCompiler> = Arc::new(Lessc);

        Self {
            script_linter: Arc::new(CommandLinter::eslint()),
            style_linter: Arc::new(CommandLinter::stylelint()),
            minifier: Arc::new(Esbuild),
            compiler,
        }
    }
}

impl std::fmt::Debug for Adapters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Adapters(*)")
    }
}

/// What a successfully finished action did.
#[derive(Debug, Default)]
pub struct Outcome {
    /// Files written by the action.
    pub written: Vec<Utf8PathBuf>,
    /// Lint diagnostics, empty for other actions.
    pub diagnostics: Vec<String>,
    /// Errors reported by a linter that didn't escalate them.
    pub lint_errors: usize,
    /// Icons dropped because their file couldn't be read.
    pub skipped: Vec<String>,
}

/// Executes one action against the tree at `root`.
pub(crate) fn execute(
    root: &Utf8Path,
    action: &Action,
    adapters: &Adapters,
) -> Result<Outcome, TaskError> {
    match action {
        Action::Lint(opts) => lint(root, opts, adapters),
        Action::Copy(opts) => Ok(Outcome {
            written: copy::run(root, opts)?,
            ..Default::default()
        }),
        Action::Concat(opts) => Ok(Outcome {
            written: concat::run(root, opts)?,
            ..Default::default()
        }),
        Action::Icons(opts) => {
            let (set, output) = icons::run(root, opts)?;
            Ok(Outcome {
                written: vec![output],
                skipped: set.skipped,
                ..Default::default()
            })
        }
        Action::MinifyScript(opts) => minify(root, opts, adapters),
        Action::CompileStyle(opts) => compile(root, opts, adapters),
    }
}

fn lint(root: &Utf8Path, opts: &LintOptions, adapters: &Adapters) -> Result<Outcome, TaskError> {
    let files = self::glob::resolve(&opts.patterns, root)?;
    let report = adapters.linter(opts.tool).lint(root, &files)?;

    for line in &report.diagnostics {
        tracing::warn!("{}", line);
    }

    if report.errors > 0 && opts.fail_on_error {
        return Err(TaskError::Lint {
            errors: report.errors,
        });
    }

    Ok(Outcome {
        diagnostics: report.diagnostics,
        lint_errors: report.errors,
        ..Default::default()
    })
}

fn minify(root: &Utf8Path, opts: &MinifyOptions, adapters: &Adapters) -> Result<Outcome, TaskError> {
    let mut written = Vec::with_capacity(opts.files.len());

    for (output, input) in &opts.files {
        let (input, output) = (root.join(input), root.join(output));
        prepare(&input, &output)?;
        adapters.minifier.minify(&input, &output, opts)?;
        written.push(output);
    }

    Ok(Outcome {
        written,
        ..Default::default()
    })
}

fn compile(root: &Utf8Path, opts: &StyleOptions, adapters: &Adapters) -> Result<Outcome, TaskError> {
    let opts = StyleOptions {
        load_paths: opts.load_paths.iter().map(|p| root.join(p)).collect(),
        ..opts.clone()
    };

    let mut written = Vec::with_capacity(opts.files.len());

    for (output, input) in &opts.files {
        let (input, output) = (root.join(input), root.join(output));
        prepare(&input, &output)?;
        adapters.compiler.compile(&input, &output, &opts)?;
        written.push(output);
    }

    Ok(Outcome {
        written,
        ..Default::default()
    })
}

/// Checks the input exists and creates the directory of the output.
fn prepare(input: &Utf8Path, output: &Utf8Path) -> Result<(), TaskError> {
    if !input.is_file() {
        return Err(TaskError::MissingInput(input.to_path_buf()));
    }

    if let Some(dir) = output.parent() {
        std::fs::create_dir_all(dir).map_err(TaskError::io(dir))?;
    }

    Ok(())
}
