//! Per-file state tracking and the end-of-run report.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// Lifecycle of one queued file. `Queued` and `Processing` are transient;
/// the other three are terminal. A later filesystem event for the same
/// path restarts the lifecycle from `Queued`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Queued,
    Processing,
    Processed,
    Skipped { reason: String },
    Failed { error: String },
}

impl FileStatus {
    pub fn skipped(reason: impl Into<String>) -> Self {
        FileStatus::Skipped {
            reason: reason.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, FileStatus::Queued | FileStatus::Processing)
    }
}

/// Shared map of the latest status per path. Workers and the watcher
/// callback update it concurrently.
#[derive(Debug, Default)]
pub struct StateTracker {
    states: Mutex<FxHashMap<PathBuf, FileStatus>>,
}

impl StateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, path: &Path, status: FileStatus) {
        self.states.lock().insert(path.to_path_buf(), status);
    }

    /// Snapshot the current states into a report.
    pub fn report(&self) -> Report {
        let mut outcomes: Vec<_> = self
            .states
            .lock()
            .iter()
            .map(|(path, status)| (path.clone(), status.clone()))
            .collect();
        outcomes.sort_by(|a, b| a.0.cmp(&b.0));
        Report { outcomes }
    }
}

/// What happened to every file seen during a run.
#[derive(Debug, Clone, Default)]
pub struct Report {
    outcomes: Vec<(PathBuf, FileStatus)>,
}

impl Report {
    pub fn outcomes(&self) -> &[(PathBuf, FileStatus)] {
        &self.outcomes
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn processed(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Processed))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&FileStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, s)| pred(s)).count()
    }
}
