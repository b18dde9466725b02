//! Pipeline orchestration: queue, worker pool, and lifecycle.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::inject::Injector;
use crate::project::{BuildConfig, copy_aux_files, is_generated_cpp};

use super::error::PipelineError;
use super::report::{FileStatus, Report, StateTracker};
use super::watcher;
use super::worker::worker_loop;

/// One queued generated file.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub path: PathBuf,
}

/// How the pipeline ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Process what the initial scan finds, then stop.
    Once,
    /// Keep watching for compiler writes until stopped or timed out.
    Watch { timeout: Option<Duration> },
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Worker thread count; defaults to the available parallelism.
    pub jobs: Option<usize>,
    /// Directory of auxiliary headers and replacement files.
    pub aux_dir: Option<PathBuf>,
    /// Overrides the output directory derived from the build config.
    pub output_dir: Option<PathBuf>,
    pub mode: Mode,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            jobs: None,
            aux_dir: None,
            output_dir: None,
            mode: Mode::Once,
        }
    }
}

/// Requests a watch-mode pipeline to wind down. Cloneable and safe to
/// call from signal handlers or other threads; calling it more than once
/// is harmless.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: Sender<()>,
}

impl StopHandle {
    pub fn stop(&self) {
        let _ = self.tx.try_send(());
    }
}

/// A configured injection pipeline. [`Pipeline::run`] consumes it and
/// blocks until the run completes.
pub struct Pipeline {
    injector: Arc<Injector>,
    options: PipelineOptions,
    stop_tx: Sender<()>,
    stop_rx: Receiver<()>,
}

impl Pipeline {
    pub fn new(config: BuildConfig, options: PipelineOptions) -> Self {
        let (stop_tx, stop_rx) = crossbeam_channel::bounded(1);
        Self {
            injector: Arc::new(Injector::new(config)),
            options,
            stop_tx,
            stop_rx,
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            tx: self.stop_tx.clone(),
        }
    }

    /// Run to completion and report every file seen.
    ///
    /// Shutdown order matters: the watcher goes first so no new items
    /// arrive, then the senders drop closing the queue, then the workers
    /// drain what is in flight and exit.
    pub fn run(self) -> Result<Report, PipelineError> {
        let output_dir = self
            .options
            .output_dir
            .clone()
            .unwrap_or_else(|| self.injector.config().output_dir());
        if !output_dir.is_dir() {
            return Err(PipelineError::MissingOutputDir(output_dir));
        }

        let aux_dir: Option<Arc<Path>> = self
            .options
            .aux_dir
            .as_deref()
            .map(Arc::from);
        if let Some(aux) = aux_dir.as_deref() {
            let copied = copy_aux_files(aux, &output_dir)?;
            info!(copied, "copied aux files into output directory");
        }

        let tracker = Arc::new(StateTracker::new());
        let (tx, rx) = crossbeam_channel::unbounded::<WorkItem>();

        let jobs = self
            .options
            .jobs
            .unwrap_or_else(|| {
                thread::available_parallelism().map_or(1, usize::from)
            })
            .max(1);
        let mut workers = Vec::with_capacity(jobs);
        for id in 0..jobs {
            let queue = rx.clone();
            let injector = Arc::clone(&self.injector);
            let aux = aux_dir.clone();
            let tracker = Arc::clone(&tracker);
            let handle = thread::Builder::new()
                .name(format!("yyc-worker-{id}"))
                .spawn(move || worker_loop(id, queue, injector, aux, tracker))?;
            workers.push(handle);
        }
        drop(rx);

        let mut scanned = 0;
        for entry in WalkDir::new(&output_dir).into_iter().filter_map(Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(file_name) = entry.file_name().to_str() else {
                continue;
            };
            if !is_generated_cpp(file_name) {
                continue;
            }
            tracker.set(entry.path(), FileStatus::Queued);
            let _ = tx.send(WorkItem {
                path: entry.path().to_path_buf(),
            });
            scanned += 1;
        }
        info!(files = scanned, "initial scan complete");

        match self.options.mode {
            Mode::Once => drop(tx),
            Mode::Watch { timeout } => {
                let watcher = watcher::watch(&output_dir, tx.clone(), Arc::clone(&tracker))?;
                let stopped = match timeout {
                    Some(timeout) => self.stop_rx.recv_timeout(timeout).is_ok(),
                    None => self.stop_rx.recv().is_ok(),
                };
                if stopped {
                    info!("stop requested, winding down");
                } else {
                    debug!("watch timeout elapsed");
                }
                drop(watcher);
                drop(tx);
            }
        }

        for worker in workers {
            let _ = worker.join();
        }

        Ok(tracker.report())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inject::INCLUDE_DIRECTIVE;

    const MOVE_SYMBOL: &str = "gml_Script_move_gml_GlobalScript_scr_player";

    fn callable_stub(symbol: &str, body: &str) -> String {
        format!(
            "extern YYVAR g_Script_{symbol};\n\
             YYRValue& {symbol}( CInstance* pSelf, CInstance* pOther, YYRValue& _result, int _count,  YYRValue** _args  )\n\
             {{{body}}}\n"
        )
    }

    fn write_script(project_dir: &Path, name: &str, gml: &str) {
        let dir = project_dir.join("scripts").join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{name}.gml")), gml).unwrap();
    }

    fn test_config(project_dir: &Path) -> BuildConfig {
        BuildConfig::new("Game", project_dir, "Default", project_dir)
    }

    fn once_options(output_dir: &Path, jobs: usize) -> PipelineOptions {
        PipelineOptions {
            jobs: Some(jobs),
            output_dir: Some(output_dir.to_path_buf()),
            ..PipelineOptions::default()
        }
    }

    #[test]
    fn test_once_mode_reaches_terminal_states() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out");
        std::fs::create_dir_all(&out).unwrap();

        write_script(
            tmp.path(),
            "scr_player",
            "function move() { /*cpp pSelf->x += 4; */ }",
        );
        std::fs::write(
            out.join("gml_GlobalScript_scr_player.gml.cpp"),
            callable_stub(MOVE_SYMBOL, "\nold;\n"),
        )
        .unwrap();
        // No source file for this one
        std::fs::write(
            out.join("gml_Room_rm_main_rm_main.gml.cpp"),
            "room code\n",
        )
        .unwrap();

        let pipeline = Pipeline::new(test_config(tmp.path()), once_options(&out, 2));
        let report = pipeline.run().unwrap();

        assert_eq!(report.total(), 2);
        assert_eq!(report.processed(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 0);
        assert!(report.outcomes().iter().all(|(_, s)| s.is_terminal()));

        let injected =
            std::fs::read_to_string(out.join("gml_GlobalScript_scr_player.gml.cpp")).unwrap();
        assert!(injected.starts_with(INCLUDE_DIRECTIVE));
        assert!(injected.contains("pSelf->x += 4;"));
    }

    #[test]
    fn test_marked_file_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out");
        std::fs::create_dir_all(&out).unwrap();

        let marked = format!("{INCLUDE_DIRECTIVE}already done\n");
        let path = out.join("gml_GlobalScript_scr_done.gml.cpp");
        std::fs::write(&path, &marked).unwrap();

        let pipeline = Pipeline::new(test_config(tmp.path()), once_options(&out, 1));
        let report = pipeline.run().unwrap();

        assert_eq!(report.skipped(), 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), marked);
    }

    #[test]
    fn test_missing_source_is_failed_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out");
        std::fs::create_dir_all(&out).unwrap();

        std::fs::write(
            out.join("gml_GlobalScript_scr_ghost.gml.cpp"),
            callable_stub("gml_Script_f_gml_GlobalScript_scr_ghost", "\n"),
        )
        .unwrap();
        write_script(tmp.path(), "scr_ok", "function ok() { /*cpp fine(); */ }");
        std::fs::write(
            out.join("gml_GlobalScript_scr_ok.gml.cpp"),
            callable_stub("gml_Script_ok_gml_GlobalScript_scr_ok", "\nold;\n"),
        )
        .unwrap();

        let pipeline = Pipeline::new(test_config(tmp.path()), once_options(&out, 2));
        let report = pipeline.run().unwrap();

        assert_eq!(report.failed(), 1);
        assert_eq!(report.processed(), 1);
    }

    #[test]
    fn test_aux_override_copied_over_generated() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out");
        let aux = tmp.path().join("aux");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::create_dir_all(&aux).unwrap();

        let name = "gml_GlobalScript_scr_custom.gml.cpp";
        std::fs::write(aux.join(name), "// replacement\n").unwrap();
        std::fs::write(aux.join("YYCBoost.h"), "// header\n").unwrap();
        std::fs::write(out.join(name), "compiler output\n").unwrap();

        let options = PipelineOptions {
            aux_dir: Some(aux.clone()),
            ..once_options(&out, 1)
        };
        let pipeline = Pipeline::new(test_config(tmp.path()), options);
        let report = pipeline.run().unwrap();

        assert_eq!(report.processed(), 1);
        assert_eq!(
            std::fs::read_to_string(out.join(name)).unwrap(),
            "// replacement\n"
        );
        // Support headers land in the output dir at startup
        assert!(out.join("YYCBoost.h").is_file());
    }

    #[test]
    fn test_missing_output_dir_is_setup_error() {
        let tmp = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(
            test_config(tmp.path()),
            once_options(&tmp.path().join("nope"), 1),
        );
        let err = pipeline.run().unwrap_err();
        assert!(matches!(err, PipelineError::MissingOutputDir(_)));
    }
}
