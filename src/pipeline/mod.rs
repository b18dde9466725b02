//! Concurrent build-session pipeline
//!
//! Feeds generated `.gml.cpp` files through the injection engine: an
//! initial scan of the compiler's output directory seeds an MPMC queue, a
//! filesystem watcher keeps it fed during a live build, and a pool of
//! worker threads drains it. Per-file failures are recorded and logged,
//! never fatal to the run.

#[allow(clippy::module_inception)]
mod pipeline;

mod error;
mod report;
mod watcher;
mod worker;

pub use error::PipelineError;
pub use pipeline::{Mode, Pipeline, PipelineOptions, StopHandle, WorkItem};
pub use report::{FileStatus, Report, StateTracker};
