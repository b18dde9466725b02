//! Worker threads draining the work queue.

use std::path::Path;
use std::sync::Arc;

use crossbeam_channel::Receiver;
use tracing::{debug, info, warn};

use crate::inject::{Injector, Outcome};
use crate::project::{aux_override, is_generated_cpp};

use super::WorkItem;
use super::report::{FileStatus, StateTracker};

/// Pop items until the queue is closed and drained. Every failure is
/// recorded and logged; nothing a single file does stops the worker.
pub(crate) fn worker_loop(
    id: usize,
    queue: Receiver<WorkItem>,
    injector: Arc<Injector>,
    aux_dir: Option<Arc<Path>>,
    tracker: Arc<StateTracker>,
) {
    debug!(worker = id, "worker started");
    for item in queue.iter() {
        tracker.set(&item.path, FileStatus::Processing);
        let status = process_file(&injector, aux_dir.as_deref(), &item.path);
        match &status {
            FileStatus::Processed => {
                info!(worker = id, file = %item.path.display(), "processed");
            }
            FileStatus::Skipped { reason } => {
                debug!(worker = id, file = %item.path.display(), reason, "skipped");
            }
            FileStatus::Failed { error } => {
                warn!(worker = id, file = %item.path.display(), error, "failed");
            }
            _ => {}
        }
        tracker.set(&item.path, status);
    }
    debug!(worker = id, "worker finished");
}

/// Handle one generated file to a terminal status.
fn process_file(injector: &Injector, aux_dir: Option<&Path>, path: &Path) -> FileStatus {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return FileStatus::skipped("not a generated file");
    };
    if !is_generated_cpp(file_name) {
        return FileStatus::skipped("not a generated file");
    }

    // A replacement shipped in the aux dir wins over injection.
    if let Some(replacement) = aux_dir.and_then(|dir| aux_override(dir, file_name)) {
        return match std::fs::copy(&replacement, path) {
            Ok(_) => FileStatus::Processed,
            Err(err) => FileStatus::Failed {
                error: format!("aux override copy failed: {err}"),
            },
        };
    }

    match injector.inject(path) {
        Ok(Outcome::Injected) => FileStatus::Processed,
        Ok(Outcome::AlreadyProcessed) => FileStatus::skipped("already processed"),
        Ok(Outcome::NoMapping) => FileStatus::skipped("no source mapping"),
        Err(err) => FileStatus::Failed {
            error: err.to_string(),
        },
    }
}
