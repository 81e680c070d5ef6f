//! Watch mode.
//!
//! The static roots of the watched patterns are monitored recursively through
//! a debounced `notify` watcher. Every batch of events touching a matching
//! file triggers a fresh sequential run of the sequence.
//!
//! Runs never overlap. Changes made while a run is in progress stay queued in
//! the event channel, and everything queued is coalesced into a single
//! follow-up run once the current one finishes.

use std::collections::HashSet;
use std::path::Path;
use std::sync::mpsc::{Receiver, channel};
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use glob::Pattern;
use notify::RecursiveMode;
use notify_debouncer_full::{DebounceEventResult, new_debouncer};

use crate::Pipeline;
use crate::error::{BuildError, WatchError};

pub(crate) fn watch<S: AsRef<str>>(
    pipeline: &Pipeline,
    sequence: &str,
    patterns: &[S],
) -> Result<(), WatchError> {
    let plan = pipeline.plan(sequence).map_err(BuildError::from)?;

    tracing::info!("running initial build...");
    match pipeline.execute(sequence, plan) {
        Ok(diagnostics) => tracing::info!("initial build completed\n{}", diagnostics),
        Err(err) => tracing::error!("initial build failed: {}", err),
    }

    let mut watched = HashSet::new();
    let mut filters = Vec::new();
    for pattern in patterns {
        let glob = pipeline.root().join(pattern.as_ref());
        match resolve_watch_path(&glob) {
            Ok((path, filter)) => {
                watched.insert(path);
                filters.push(filter);
            }
            Err(err) => return Err(WatchError::Resolve(glob.into_string(), err)),
        }
    }

    let (tx, rx) = channel();
    let mut debouncer = new_debouncer(Duration::from_millis(250), None, tx)?;

    for path in collapse_watch_paths(watched) {
        tracing::info!("watching {}", path);
        debouncer.watch(&path, RecursiveMode::Recursive)?;
    }

    while let Ok(result) = rx.recv() {
        let mut dirty = is_dirty(result, &filters);
        dirty |= drain(&rx, &filters);

        if !dirty {
            continue;
        }

        tracing::info!("change detected, re-running '{}'...", sequence);
        match pipeline.execute(sequence, plan) {
            Ok(diagnostics) => tracing::info!("rebuild completed\n{}", diagnostics),
            Err(err) => tracing::error!("rebuild failed: {}", err),
        }
        tracing::info!("watching for changes...");
    }

    Ok(())
}

/// Consumes every batch already waiting in the channel.
fn drain(rx: &Receiver<DebounceEventResult>, filters: &[Pattern]) -> bool {
    let mut dirty = false;
    while let Ok(result) = rx.try_recv() {
        dirty |= is_dirty(result, filters);
    }
    dirty
}

fn is_dirty(result: DebounceEventResult, filters: &[Pattern]) -> bool {
    match result {
        Ok(events) => events
            .iter()
            .flat_map(|event| event.paths.iter())
            .any(|path| matches_any(path, filters)),
        Err(errors) => {
            for err in errors {
                tracing::error!("watch error: {:?}", err);
            }
            false
        }
    }
}

fn matches_any(path: &Path, filters: &[Pattern]) -> bool {
    filters.iter().any(|filter| filter.matches_path(path))
}

/// Splits a glob string into a canonicalized static root path (for
/// watching) and a compiled absolute Pattern (for matching).
pub fn resolve_watch_path(glob_str: impl AsRef<str>) -> anyhow::Result<(Utf8PathBuf, Pattern)> {
    let path = Utf8Path::new(glob_str.as_ref());

    // Split path into static root and dynamic suffix (containing wildcards)
    let components: Vec<_> = path.components().collect();
    let split_idx = components
        .iter()
        .position(|c| c.as_str().contains(['*', '?', '[']))
        .unwrap_or(components.len());

    let root_part: Utf8PathBuf = components.iter().take(split_idx).collect();
    let suffix_part: Utf8PathBuf = components.iter().skip(split_idx).collect();

    // Canonicalize the static root (must exist on disk)
    let absolute_root = root_part.canonicalize_utf8()?;

    // A concrete file is watched through its parent, so atomic writes
    // replacing the file are caught too.
    let (watch_root, pattern) = if suffix_part.as_str().is_empty() && absolute_root.is_file() {
        let parent = absolute_root
            .parent()
            .unwrap_or(&absolute_root)
            .to_path_buf();
        let pattern = Pattern::escape(absolute_root.as_str());
        (parent, pattern)
    } else {
        let pattern = Utf8Path::new(&Pattern::escape(absolute_root.as_str()))
            .join(&suffix_part)
            .into_string();
        (absolute_root, pattern)
    };

    Ok((watch_root, Pattern::new(&pattern)?))
}

/// Sorted watch roots with every root nested inside another one removed,
/// recursive watches already cover those.
pub fn collapse_watch_paths(paths: HashSet<Utf8PathBuf>) -> Vec<Utf8PathBuf> {
    let mut sorted: Vec<_> = paths.into_iter().collect();
    sorted.sort();

    let mut roots: Vec<Utf8PathBuf> = Vec::with_capacity(sorted.len());
    for path in sorted {
        match roots.last() {
            Some(root) if path.starts_with(root) => {}
            _ => roots.push(path),
        }
    }

    roots
}
