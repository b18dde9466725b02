//! Command-line front end for the injection pipeline.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use yyc_inject::pipeline::{Mode, Pipeline, PipelineOptions};
use yyc_inject::project::{BuildConfig, default_aux_dir, default_build_bff_path};

#[derive(Parser)]
#[command(
    name = "yyc-inject",
    version,
    about = "Injects hand-written C++ into GameMaker YYC compiler output"
)]
struct Cli {
    /// Path to the IDE's build.bff handoff file. Defaults to the standard
    /// GameMaker GMS2TEMP location.
    #[arg(long, value_name = "PATH")]
    build_bff: Option<PathBuf>,

    /// Process the files found by the initial scan, then exit instead of
    /// watching for further compiler writes.
    #[arg(long)]
    once: bool,

    /// Seconds to wait for build.bff and the output directory to appear.
    #[arg(long, value_name = "SECONDS", default_value_t = 300)]
    timeout: u64,

    /// Worker thread count. Defaults to the available parallelism.
    #[arg(long, value_name = "N")]
    jobs: Option<usize>,

    /// Directory with auxiliary headers and replacement files. Defaults
    /// to the `cpp/` directory next to the executable.
    #[arg(long, value_name = "PATH")]
    aux_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let build_bff = cli
        .build_bff
        .clone()
        .or_else(default_build_bff_path)
        .ok_or("no --build-bff given and LOCALAPPDATA is not set")?;

    // The IDE writes build.bff and the output directory partway into the
    // build; poll for both against one shared deadline.
    let deadline = Instant::now() + Duration::from_secs(cli.timeout);
    wait_for_path(&build_bff, deadline)?;

    let config = BuildConfig::load(&build_bff)?;
    info!(
        project = %config.project_name,
        config = %config.config,
        dir = %config.project_dir.display(),
        "loaded build.bff"
    );

    let output_dir = config.output_dir();
    wait_for_path(&output_dir, deadline)?;
    info!(dir = %output_dir.display(), "target directory ready");

    let mode = if cli.once {
        Mode::Once
    } else {
        Mode::Watch { timeout: None }
    };
    // Every processed file gains an include of YYCBoost.h, so the support
    // headers must land in the output directory even on a bare invocation.
    let options = PipelineOptions {
        jobs: cli.jobs,
        aux_dir: cli.aux_dir.clone().or_else(default_aux_dir),
        output_dir: Some(output_dir),
        mode,
    };

    let report = Pipeline::new(config, options).run()?;
    info!(
        processed = report.processed(),
        skipped = report.skipped(),
        failed = report.failed(),
        "run complete"
    );
    Ok(())
}

fn wait_for_path(path: &Path, deadline: Instant) -> Result<(), Box<dyn Error>> {
    if path.exists() {
        return Ok(());
    }
    info!(path = %path.display(), "waiting for path to appear");
    while !path.exists() {
        if Instant::now() >= deadline {
            return Err(format!("timed out waiting for {}", path.display()).into());
        }
        std::thread::sleep(Duration::from_millis(500));
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
