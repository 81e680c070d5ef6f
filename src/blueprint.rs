use std::collections::{HashMap, HashSet};

use camino::{Utf8Path, Utf8PathBuf};
use glob::Pattern;
use petgraph::Graph;
use petgraph::graph::NodeIndex;

use crate::Pipeline;
use crate::actions::Adapters;
use crate::error::ConfigError;
use crate::task::{Action, Task};

/// The blueprint of a build pipeline.
///
/// `Blueprint` collects named tasks and named sequences of those tasks. It
/// rejects invalid definitions as soon as they are added, and checks the
/// relations between tasks when converted into a runnable [`Pipeline`].
///
/// # Example
///
/// ```rust,no_run
/// use themekit::{Blueprint, Bundle, ConcatOptions, Task};
///
/// let mut config = Blueprint::new("searx/static/themes/simple");
///
/// config.register(Task::concat("concat", ConcatOptions {
///     separator: ";".into(),
///     bundles: vec![Bundle {
///         output: "js/searxng.head.js".into(),
///         inputs: vec!["src/js/head/*.js".into()],
///     }],
/// }))?;
///
/// config.sequence("default", ["concat"])?;
///
/// let pipeline = config.finish()?;
/// pipeline.run("default")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Blueprint {
    root: Utf8PathBuf,
    graph: Graph<Task, ()>,
    names: HashMap<String, NodeIndex>,
    sequences: Vec<(String, Vec<String>)>,
    adapters: Adapters,
}

impl Blueprint {
    /// Creates an empty blueprint. Relative task paths resolve against `root`.
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: root.into(),
            graph: Graph::new(),
            names: HashMap::new(),
            sequences: Vec::new(),
            adapters: Adapters::default(),
        }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Replaces the external tools used by lint, minify and compile tasks.
    pub fn set_adapters(&mut self, adapters: Adapters) -> &mut Self {
        self.adapters = adapters;
        self
    }

    /// Adds a task definition.
    ///
    /// Fails when a task with the same name exists, when one of its glob
    /// patterns is malformed, or when an icon name repeats.
    pub fn register(&mut self, task: Task) -> Result<&mut Self, ConfigError> {
        if self.names.contains_key(task.name()) {
            return Err(ConfigError::DuplicateTask(task.name().to_string()));
        }

        for pattern in task.action().patterns() {
            if let Err(source) = Pattern::new(pattern) {
                return Err(ConfigError::Pattern {
                    task: task.name().to_string(),
                    pattern: pattern.to_string(),
                    source,
                });
            }
        }

        if let Action::Icons(opts) = task.action() {
            let mut seen = HashSet::new();
            for (icon, _) in &opts.icons {
                if !seen.insert(icon.as_str()) {
                    return Err(ConfigError::DuplicateIcon {
                        task: task.name().to_string(),
                        icon: icon.clone(),
                    });
                }
            }
        }

        let name = task.name().to_string();
        let index = self.graph.add_node(task);
        self.names.insert(name, index);

        Ok(self)
    }

    /// Declares a named, ordered list of tasks to run together.
    pub fn sequence<I, S>(&mut self, name: impl Into<String>, tasks: I) -> Result<&mut Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();

        if self.sequences.iter().any(|(existing, _)| existing == &name) {
            return Err(ConfigError::DuplicateSequence(name));
        }

        self.sequences
            .push((name, tasks.into_iter().map(Into::into).collect()));

        Ok(self)
    }

    /// Validates the relations between tasks and sequences.
    pub fn finish(mut self) -> Result<Pipeline, ConfigError> {
        let mut edges = Vec::new();
        for index in self.graph.node_indices() {
            let task = &self.graph[index];
            for dependency in &task.after {
                match self.names.get(dependency.as_ref()) {
                    Some(&source) => edges.push((source, index)),
                    None => {
                        return Err(ConfigError::UnknownDependency {
                            task: task.name().to_string(),
                            dependency: dependency.to_string(),
                        });
                    }
                }
            }
        }

        for (source, target) in edges {
            self.graph.add_edge(source, target, ());
        }

        if let Err(cycle) = petgraph::algo::toposort(&self.graph, None) {
            let name = self.graph[cycle.node_id()].name().to_string();
            return Err(ConfigError::Cycle(name));
        }

        let mut sequences = HashMap::new();
        for (name, tasks) in &self.sequences {
            let plan = plan(&self.graph, &self.names, name, tasks)?;
            sequences.insert(name.clone(), plan);
        }

        Ok(Pipeline {
            root: self.root,
            graph: self.graph,
            names: self.names,
            sequences,
            adapters: self.adapters,
        })
    }
}

/// Resolves task names into graph nodes, checking that no task runs before
/// a dependency scheduled in the same list.
pub(crate) fn plan<S: AsRef<str>>(
    graph: &Graph<Task, ()>,
    names: &HashMap<String, NodeIndex>,
    sequence: &str,
    tasks: &[S],
) -> Result<Vec<NodeIndex>, ConfigError> {
    let indices = tasks
        .iter()
        .map(|task| {
            names
                .get(task.as_ref())
                .copied()
                .ok_or_else(|| ConfigError::UnknownTask {
                    sequence: sequence.to_string(),
                    task: task.as_ref().to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (position, &index) in indices.iter().enumerate() {
        for dependency in graph.neighbors_directed(index, petgraph::Direction::Incoming) {
            if indices[position..].contains(&dependency) && !indices[..position].contains(&dependency) {
                return Err(ConfigError::OutOfOrder {
                    sequence: sequence.to_string(),
                    task: graph[index].name().to_string(),
                    dependency: graph[dependency].name().to_string(),
                });
            }
        }
    }

    Ok(indices)
}

impl std::fmt::Display for Blueprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "graph LR")?;

        for index in self.graph.node_indices() {
            let task = &self.graph[index];
            let name = task.name().replace('"', "\\\""); // Simple escape
            writeln!(f, "    {:?}[\"{}\\n{}\"]", index.index(), name, task.kind())?;
        }

        for index in self.graph.node_indices() {
            for dependency in &self.graph[index].after {
                if let Some(source) = self.names.get(dependency.as_ref()) {
                    writeln!(f, "    {:?} --> {:?}", source.index(), index.index())?;
                }
            }
        }

        Ok(())
    }
}
