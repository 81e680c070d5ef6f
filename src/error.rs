use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors detected while defining the pipeline, before any task runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Task '{0}' is already registered")]
    DuplicateTask(String),

    #[error("Sequence '{0}' is already registered")]
    DuplicateSequence(String),

    #[error("Task '{task}': invalid glob pattern '{pattern}'.\n{source}")]
    Pattern {
        task: String,
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Task '{task}': icon '{icon}' is declared more than once")]
    DuplicateIcon { task: String, icon: String },

    #[error("Task '{task}' depends on unknown task '{dependency}'")]
    UnknownDependency { task: String, dependency: String },

    #[error("Sequence '{sequence}' references unknown task '{task}'")]
    UnknownTask { sequence: String, task: String },

    #[error("Sequence '{sequence}' runs '{task}' before its dependency '{dependency}'")]
    OutOfOrder {
        sequence: String,
        task: String,
        dependency: String,
    },

    #[error("Unknown sequence '{0}'")]
    UnknownSequence(String),

    #[error("Task dependencies form a cycle through '{0}'")]
    Cycle(String),
}

/// Errors raised by a single task action.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Couldn't access '{path}'.\n{source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Required input '{0}' does not exist")]
    MissingInput(Utf8PathBuf),

    #[error("Couldn't compile glob pattern.\n{0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Couldn't run glob.\n{0}")]
    Glob(#[from] glob::GlobError),

    #[error("Couldn't convert path to UTF-8.\n{0}")]
    PathFormat(#[from] camino::FromPathBufError),

    #[error("Linter reported {errors} error(s)")]
    Lint { errors: usize },

    #[error("Generated template is invalid.\n{0}")]
    Template(String),

    #[error(transparent)]
    Adapter(#[from] anyhow::Error),
}

impl TaskError {
    pub(crate) fn io(path: impl Into<Utf8PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| TaskError::Io { path, source }
    }
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Task '{0}':\n{1}")]
    Task(String, TaskError),
}

#[cfg(feature = "live")]
#[derive(Debug, Error)]
pub enum WatchError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Notify(#[from] notify::Error),

    #[error("Couldn't resolve watch path '{0}'.\n{1}")]
    Resolve(String, anyhow::Error),
}

/// Errors surfaced by the engine description loader.
#[derive(Debug, Error)]
pub enum DescriptionError {
    #[error("Fetching engine descriptions failed: {0}")]
    Fetch(String),

    #[error("Malformed engine descriptions.\n{0}")]
    Parse(#[from] serde_json::Error),
}
