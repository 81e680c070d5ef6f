use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

use camino::Utf8PathBuf;

use crate::task::TaskKind;

/// How a task that didn't stop the pipeline ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Succeeded,
    /// A linter reported this many errors without escalating them.
    Warned(usize),
    /// The task failed, but its failure policy let the pipeline continue.
    Tolerated(String),
}

#[derive(Debug, Clone)]
pub struct TaskExecution {
    pub task: String,
    pub kind: TaskKind,
    pub start: Instant,
    pub duration: Duration,
    pub status: TaskStatus,
}

/// Build diagnostics of a single pipeline run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    /// Executed tasks, in execution order.
    pub executions: Vec<TaskExecution>,
    /// Files written during the run.
    pub written: Vec<Utf8PathBuf>,
    /// Lint diagnostics reported by lint-class tasks.
    pub lint_warnings: Vec<String>,
    /// Icons left out of generated fragments.
    pub skipped_icons: Vec<String>,
}

impl Diagnostics {
    pub fn tolerated(&self) -> impl Iterator<Item = &TaskExecution> {
        self.executions
            .iter()
            .filter(|exec| matches!(exec.status, TaskStatus::Tolerated(_)))
    }

    /// Lint tasks that reported errors without halting the run.
    pub fn warned(&self) -> impl Iterator<Item = &TaskExecution> {
        self.executions
            .iter()
            .filter(|exec| matches!(exec.status, TaskStatus::Warned(_)))
    }

    pub fn total(&self) -> Duration {
        self.executions.iter().map(|exec| exec.duration).sum()
    }
}

impl Display for Diagnostics {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let width = self
            .executions
            .iter()
            .map(|exec| exec.task.len())
            .max()
            .unwrap_or(0);

        for exec in &self.executions {
            let status = match &exec.status {
                TaskStatus::Succeeded => "ok".to_string(),
                TaskStatus::Warned(errors) => format!("{errors} error(s) (ignored)"),
                TaskStatus::Tolerated(_) => "failed (ignored)".to_string(),
            };

            writeln!(
                f,
                "{:width$}  {:13}  {:>10.2?}  {}",
                exec.task, exec.kind, exec.duration, status
            )?;
        }

        write!(
            f,
            "{} task(s), {} file(s) written, {} lint warning(s) in {:.2?}",
            self.executions.len(),
            self.written.len(),
            self.lint_warnings.len(),
            self.total()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exec(task: &str, kind: TaskKind, status: TaskStatus) -> TaskExecution {
        TaskExecution {
            task: task.into(),
            kind,
            start: Instant::now(),
            duration: Duration::from_millis(5),
            status,
        }
    }

    #[test]
    fn test_summary() {
        let diagnostics = Diagnostics {
            executions: vec![
                exec("eslint", TaskKind::Lint, TaskStatus::Tolerated("boom".into())),
                exec("stylelint", TaskKind::Lint, TaskStatus::Warned(3)),
                exec("concat", TaskKind::Concatenate, TaskStatus::Succeeded),
            ],
            written: vec!["js/searxng.js".into()],
            lint_warnings: vec!["a.js:1:1 missing semicolon".into()],
            skipped_icons: vec![],
        };

        let text = diagnostics.to_string();

        assert_eq!(diagnostics.tolerated().count(), 1);
        assert_eq!(diagnostics.warned().count(), 1);
        assert_eq!(diagnostics.total(), Duration::from_millis(15));
        assert!(text.contains("eslint"));
        assert!(text.contains("failed (ignored)"));
        assert!(text.lines().any(|line| line.starts_with("stylelint")
            && line.ends_with("3 error(s) (ignored)")));
        assert!(text.ends_with("3 task(s), 1 file(s) written, 1 lint warning(s) in 15.00ms"));
    }
}
