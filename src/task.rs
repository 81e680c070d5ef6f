//! Task definitions.
//!
//! A [`Task`] is a named unit of the pipeline. What it does is decided by its
//! [`Action`], and every action carries its own options record. Paths in the
//! options are relative to the root of the [`Blueprint`](crate::Blueprint)
//! the task is registered with.

use std::borrow::Cow;
use std::fmt::{Display, Formatter};

use camino::Utf8PathBuf;

/// Coarse classification of a task, used to pick its failure policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Lint,
    Copy,
    Concatenate,
    Transform,
    MinifyScript,
    CompileStyle,
}

impl TaskKind {
    /// Lint-class tasks report problems without halting the pipeline, unless
    /// configured otherwise.
    pub fn is_lint(self) -> bool {
        matches!(self, TaskKind::Lint)
    }
}

impl Display for TaskKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TaskKind::Lint => "lint",
            TaskKind::Copy => "copy",
            TaskKind::Concatenate => "concatenate",
            TaskKind::Transform => "transform",
            TaskKind::MinifyScript => "minify-js",
            TaskKind::CompileStyle => "compile-style",
        };
        f.pad(name)
    }
}

/// Which linter adapter a lint task talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LintTool {
    Script,
    Style,
}

#[derive(Debug, Clone)]
pub struct LintOptions {
    pub tool: LintTool,
    /// Files to lint.
    pub patterns: Vec<String>,
    /// Escalate reported errors into a pipeline failure.
    pub fail_on_error: bool,
}

#[derive(Debug, Clone)]
pub struct CopyOptions {
    /// Directory the patterns are resolved against.
    pub cwd: Utf8PathBuf,
    pub patterns: Vec<String>,
    /// Destination directory.
    pub dest: Utf8PathBuf,
    /// Drop the directory structure below `cwd`, keeping only file names.
    pub flatten: bool,
    /// Carry over the modification time of each source file.
    pub preserve_timestamps: bool,
}

/// One concatenated output file.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub output: Utf8PathBuf,
    /// Inputs in concatenation order. Patterns without wildcards name files
    /// that must exist.
    pub inputs: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ConcatOptions {
    pub separator: String,
    pub bundles: Vec<Bundle>,
}

#[derive(Debug, Clone)]
pub struct IconOptions {
    /// Symbolic name and source file, in emission order.
    pub icons: Vec<(String, Utf8PathBuf)>,
    pub output: Utf8PathBuf,
}

impl IconOptions {
    pub fn new(output: impl Into<Utf8PathBuf>) -> Self {
        Self {
            icons: Vec::new(),
            output: output.into(),
        }
    }

    pub fn icon(mut self, name: impl Into<String>, path: impl Into<Utf8PathBuf>) -> Self {
        self.icons.push((name.into(), path.into()));
        self
    }
}

#[derive(Debug, Clone)]
pub struct MinifyOptions {
    /// `(output, input)` pairs.
    pub files: Vec<(Utf8PathBuf, Utf8PathBuf)>,
    pub mangle: bool,
    pub source_map: bool,
    /// Keep license-style comments.
    pub keep_comments: bool,
}

#[derive(Debug, Clone)]
pub struct StyleOptions {
    /// `(output, input)` pairs.
    pub files: Vec<(Utf8PathBuf, Utf8PathBuf)>,
    pub load_paths: Vec<Utf8PathBuf>,
    /// Plugin set: minify the compiled stylesheet.
    pub minify: bool,
    /// Plugin set: emit a source map next to the output.
    pub source_map: bool,
}

#[derive(Debug, Clone)]
pub enum Action {
    Lint(LintOptions),
    Copy(CopyOptions),
    Concat(ConcatOptions),
    Icons(IconOptions),
    MinifyScript(MinifyOptions),
    CompileStyle(StyleOptions),
}

impl Action {
    pub fn kind(&self) -> TaskKind {
        match self {
            Action::Lint(_) => TaskKind::Lint,
            Action::Copy(_) => TaskKind::Copy,
            Action::Concat(_) => TaskKind::Concatenate,
            Action::Icons(_) => TaskKind::Transform,
            Action::MinifyScript(_) => TaskKind::MinifyScript,
            Action::CompileStyle(_) => TaskKind::CompileStyle,
        }
    }

    /// Glob patterns the action reads, used for validation and for watching.
    pub(crate) fn patterns(&self) -> Vec<&str> {
        match self {
            Action::Lint(opts) => opts.patterns.iter().map(String::as_str).collect(),
            Action::Copy(opts) => opts.patterns.iter().map(String::as_str).collect(),
            Action::Concat(opts) => opts
                .bundles
                .iter()
                .flat_map(|bundle| bundle.inputs.iter().map(String::as_str))
                .collect(),
            Action::Icons(_) | Action::MinifyScript(_) | Action::CompileStyle(_) => vec![],
        }
    }
}

/// A named, immutable unit of the build pipeline.
#[derive(Debug, Clone)]
pub struct Task {
    pub(crate) name: Cow<'static, str>,
    pub(crate) action: Action,
    pub(crate) after: Vec<Cow<'static, str>>,
}

impl Task {
    pub fn new(name: impl Into<Cow<'static, str>>, action: Action) -> Self {
        Self {
            name: name.into(),
            action,
            after: Vec::new(),
        }
    }

    pub fn lint(name: impl Into<Cow<'static, str>>, options: LintOptions) -> Self {
        Self::new(name, Action::Lint(options))
    }

    pub fn copy(name: impl Into<Cow<'static, str>>, options: CopyOptions) -> Self {
        Self::new(name, Action::Copy(options))
    }

    pub fn concat(name: impl Into<Cow<'static, str>>, options: ConcatOptions) -> Self {
        Self::new(name, Action::Concat(options))
    }

    pub fn icons(name: impl Into<Cow<'static, str>>, options: IconOptions) -> Self {
        Self::new(name, Action::Icons(options))
    }

    pub fn minify_script(name: impl Into<Cow<'static, str>>, options: MinifyOptions) -> Self {
        Self::new(name, Action::MinifyScript(options))
    }

    pub fn compile_style(name: impl Into<Cow<'static, str>>, options: StyleOptions) -> Self {
        Self::new(name, Action::CompileStyle(options))
    }

    /// Declares that this task consumes the outputs of `task`.
    pub fn after(mut self, task: impl Into<Cow<'static, str>>) -> Self {
        self.after.push(task.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn kind(&self) -> TaskKind {
        self.action.kind()
    }

    /// Whether a failure of this task lets the pipeline continue.
    pub fn tolerates_failure(&self) -> bool {
        matches!(&self.action, Action::Lint(opts) if !opts.fail_on_error)
    }

    /// Output paths declared by the task, derived from its options alone.
    /// Copy tasks report their destination directory.
    pub fn outputs(&self) -> Vec<Utf8PathBuf> {
        match &self.action {
            Action::Lint(_) => vec![],
            Action::Copy(opts) => vec![opts.dest.clone()],
            Action::Concat(opts) => opts.bundles.iter().map(|b| b.output.clone()).collect(),
            Action::Icons(opts) => vec![opts.output.clone()],
            Action::MinifyScript(opts) => opts.files.iter().map(|(out, _)| out.clone()).collect(),
            Action::CompileStyle(opts) => opts.files.iter().map(|(out, _)| out.clone()).collect(),
        }
    }
}
