//! Pipeline setup errors.
//!
//! Once the workers are running, per-file failures are recorded in the
//! [`Report`](super::Report) instead of surfacing here; only setup can
//! fail the whole run.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The compiler's output directory is not there yet. Callers that
    /// race the IDE poll for it before running.
    #[error("output directory {0} does not exist")]
    MissingOutputDir(PathBuf),

    #[error("i/o error during pipeline setup")]
    Io(#[from] std::io::Error),

    #[error("file watcher error")]
    Watch(#[from] notify::Error),
}
