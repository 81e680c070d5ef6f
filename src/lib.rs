#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub mod actions;
mod blueprint;
pub mod descriptions;
mod engine;
mod error;
#[cfg(feature = "logging")]
mod logging;
mod task;
mod utils;

pub use crate::actions::{
    Adapters, CommandLinter, Esbuild, LintReport, Lessc, Linter, ScriptMinifier, StyleCompiler,
};
#[cfg(feature = "grass")]
pub use crate::actions::Grass;
pub use crate::blueprint::Blueprint;
pub use crate::descriptions::{Description, DescriptionLoader, Host, LoaderState};
pub use crate::engine::{Diagnostics, Pipeline, TaskExecution, TaskStatus};
#[cfg(feature = "live")]
pub use crate::engine::{collapse_watch_paths, resolve_watch_path};
pub use crate::error::*;
#[cfg(feature = "logging")]
pub use crate::logging::init_logging;
pub use crate::task::{
    Action, Bundle, ConcatOptions, CopyOptions, IconOptions, LintOptions, LintTool, MinifyOptions,
    StyleOptions, Task, TaskKind,
};
