mod diagnostics;
#[cfg(feature = "live")]
mod watch;

use std::collections::HashMap;
use std::time::Instant;

use camino::{Utf8Path, Utf8PathBuf};
use petgraph::Graph;
use petgraph::graph::NodeIndex;
use tracing::Level;
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::actions::{self, Adapters};
use crate::error::{BuildError, ConfigError};
use crate::task::Task;
use crate::utils::{STYLE_PIPELINE, STYLE_TASK, as_overhead};

pub use diagnostics::{Diagnostics, TaskExecution, TaskStatus};
#[cfg(feature = "live")]
pub use watch::{collapse_watch_paths, resolve_watch_path};

/// A validated pipeline, created by [`Blueprint::finish`](crate::Blueprint::finish).
///
/// Tasks always run one after another on the calling thread, in the order of
/// the sequence being run. A task starts only after every file written by the
/// previous one is on disk.
#[derive(Debug)]
pub struct Pipeline {
    pub(crate) root: Utf8PathBuf,
    pub(crate) graph: Graph<Task, ()>,
    pub(crate) names: HashMap<String, NodeIndex>,
    pub(crate) sequences: HashMap<String, Vec<NodeIndex>>,
    pub(crate) adapters: Adapters,
}

impl Pipeline {
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn task(&self, name: &str) -> Option<&Task> {
        self.names.get(name).map(|&index| &self.graph[index])
    }

    /// Names of the tasks in a sequence, in execution order.
    pub fn sequence(&self, name: &str) -> Option<Vec<&str>> {
        self.sequences
            .get(name)
            .map(|plan| plan.iter().map(|&index| self.graph[index].name()).collect())
    }

    /// Runs a named sequence.
    pub fn run(&self, sequence: &str) -> Result<Diagnostics, BuildError> {
        let plan = self.plan(sequence)?;
        self.execute(sequence, plan)
    }

    /// Runs an ad hoc list of tasks, in the given order.
    pub fn run_tasks<S: AsRef<str>>(&self, tasks: &[S]) -> Result<Diagnostics, BuildError> {
        let plan = crate::blueprint::plan(&self.graph, &self.names, "(ad hoc)", tasks)?;
        self.execute("(ad hoc)", &plan)
    }

    /// Runs a sequence, then runs it again whenever a file matching one of
    /// `patterns` changes. Blocks for as long as the watcher is alive.
    #[cfg(feature = "live")]
    pub fn watch<S: AsRef<str>>(
        &self,
        sequence: &str,
        patterns: &[S],
    ) -> Result<(), crate::error::WatchError> {
        watch::watch(self, sequence, patterns)
    }

    pub(crate) fn plan(&self, sequence: &str) -> Result<&[NodeIndex], ConfigError> {
        self.sequences
            .get(sequence)
            .map(Vec::as_slice)
            .ok_or_else(|| ConfigError::UnknownSequence(sequence.to_string()))
    }

    pub(crate) fn execute(&self, name: &str, plan: &[NodeIndex]) -> Result<Diagnostics, BuildError> {
        let s = Instant::now();
        let mut diagnostics = Diagnostics::default();

        let root_span = tracing::span!(Level::INFO, "pipeline", sequence = name);
        root_span.pb_set_length(plan.len() as u64);
        root_span.pb_set_style(&STYLE_PIPELINE);
        root_span.pb_set_message(&format!("Running {name}"));
        let _enter = root_span.enter();

        for &index in plan {
            let task = &self.graph[index];

            let span = tracing::span!(Level::INFO, "task", name = task.name());
            span.pb_set_style(&STYLE_TASK);
            span.pb_set_message(&format!("Running {}", task.name()));
            let _enter = span.enter();

            let start = Instant::now();
            let result = actions::execute(&self.root, task.action(), &self.adapters);
            let duration = start.elapsed();

            let status = match result {
                Ok(outcome) => {
                    tracing::info!("finished {} {}", task.name(), as_overhead(start));
                    diagnostics.written.extend(outcome.written);
                    diagnostics.lint_warnings.extend(outcome.diagnostics);
                    diagnostics.skipped_icons.extend(outcome.skipped);
                    match outcome.lint_errors {
                        0 => TaskStatus::Succeeded,
                        errors => {
                            tracing::warn!("{} reported {} error(s), continuing", task.name(), errors);
                            TaskStatus::Warned(errors)
                        }
                    }
                }
                Err(err) if task.tolerates_failure() => {
                    tracing::warn!("{} failed, continuing: {}", task.name(), err);
                    TaskStatus::Tolerated(err.to_string())
                }
                Err(err) => {
                    tracing::error!("{} failed", task.name());
                    return Err(BuildError::Task(task.name().to_string(), err));
                }
            };

            diagnostics.executions.push(TaskExecution {
                task: task.name().to_string(),
                kind: task.kind(),
                start,
                duration,
                status,
            });

            root_span.pb_inc(1);
        }

        tracing::info!("finished {} {}", name, as_overhead(s));
        Ok(diagnostics)
    }
}
