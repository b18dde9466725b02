//! Filesystem watcher feeding the work queue during a live build.

use std::path::Path;
use std::sync::Arc;

use crossbeam_channel::Sender;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};

use crate::inject::has_include_marker;
use crate::project::is_generated_cpp;

use super::WorkItem;
use super::report::{FileStatus, StateTracker};

/// Keeps the underlying watcher alive; dropping it stops event delivery
/// and releases the queue sender held by the callback.
pub(crate) struct OutputWatcher {
    _inner: RecommendedWatcher,
}

/// Watch `dir` recursively, enqueueing created or modified `.gml.cpp`
/// files. Files already carrying the include marker are not enqueued; the
/// compiler rewrites files we have processed only on the next build.
pub(crate) fn watch(
    dir: &Path,
    queue: Sender<WorkItem>,
    tracker: Arc<StateTracker>,
) -> Result<OutputWatcher, notify::Error> {
    let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
        let event = match result {
            Ok(event) => event,
            Err(err) => {
                warn!(error = %err, "watch error");
                return;
            }
        };
        if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
            return;
        }
        for path in event.paths {
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !is_generated_cpp(file_name) {
                continue;
            }
            if matches!(has_include_marker(&path), Ok(true)) {
                continue;
            }
            debug!(file = %path.display(), "enqueueing changed file");
            tracker.set(&path, FileStatus::Queued);
            if queue.send(WorkItem { path }).is_err() {
                // Shutdown in progress
                return;
            }
        }
    })?;
    watcher.watch(dir, RecursiveMode::Recursive)?;
    Ok(OutputWatcher { _inner: watcher })
}
