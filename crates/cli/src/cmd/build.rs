//! Implementation of the `cvbuild build` command.
//!
//! Validates the request up front, prints the build configuration, then
//! drives the orchestrator and reports the outcome:
//! - resolves the variant's source tree
//! - provisions the engine (building the container image when needed)
//! - compiles to a fixed point and publishes the artifact
//! - applies post-processing (aux cleanup, move-to-root)

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use cvbuild_core::{BuildError, BuildRequest, Variant, run_build};

use crate::cmd::EngineChoice;
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct BuildArgs {
  /// Language variant to build (en or fr)
  #[arg(short, long, default_value = "en")]
  pub language: String,

  /// Project root containing the cv-{lang} source trees
  #[arg(long, default_value = ".")]
  pub root: PathBuf,

  /// Custom output path for the PDF
  #[arg(short, long)]
  pub output: Option<PathBuf>,

  /// Typesetting engine to use
  #[arg(long, value_enum, default_value_t = EngineChoice::Docker)]
  pub engine: EngineChoice,

  /// Override the local engine binary
  #[arg(long, value_name = "BIN")]
  pub engine_bin: Option<PathBuf>,

  /// Force a rebuild of the engine container image
  #[arg(long)]
  pub rebuild: bool,

  /// Remove auxiliary engine files after compilation
  #[arg(long)]
  pub clean: bool,

  /// Move the PDF to the project root as cv-{lang}.pdf
  #[arg(long)]
  pub move_to_root: bool,

  /// Upper bound for a single engine pass (e.g. 90s, 5m)
  #[arg(long, default_value = "5m", value_parser = humantime::parse_duration)]
  pub timeout: Duration,

  /// Output format for the build report
  #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
  pub format: OutputFormat,
}

pub fn cmd_build(args: BuildArgs, verbose: bool) -> Result<()> {
  let variant = match Variant::parse(&args.language) {
    Ok(variant) => variant,
    Err(err) => {
      output::print_error(&err.to_string());
      std::process::exit(1);
    }
  };

  let mut request = BuildRequest::new(variant, args.root);
  request.engine = args.engine.into();
  request.rebuild_image = args.rebuild;
  request.clean_aux = args.clean;
  request.move_to_root = args.move_to_root;
  request.output = args.output;
  request.timeout = args.timeout;
  request.engine_bin = args.engine_bin;
  request.verbose = verbose;

  if !args.format.is_json() {
    output::print_info(&format!("Building résumé variant '{}'", request.variant));
    output::print_stat("Source", &request.variant.source_dir(&request.root).display().to_string());
    output::print_stat("Engine", request.engine.as_str());
    output::print_stat("Rebuild image", if request.rebuild_image { "yes" } else { "no" });
    output::print_stat("Clean aux files", if request.clean_aux { "yes" } else { "no" });
  }

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = match rt.block_on(run_build(&request)) {
    Ok(report) => report,
    Err(err) => {
      report_failure(&err, verbose);
      std::process::exit(1);
    }
  };
  info!(artifact = %report.artifact.display(), passes = report.passes, "build complete");

  if args.format.is_json() {
    output::print_json(&report)?;
  } else {
    println!();
    output::print_success(&format!("PDF created at {}", report.artifact.display()));
    output::print_stat("Passes", &report.passes.to_string());
    output::print_stat("Size", &output::format_bytes(report.size_bytes));
    output::print_stat("Digest", output::truncate_hash(&report.digest));
    output::print_stat("Time", &output::format_duration(report.elapsed));
  }

  Ok(())
}

fn report_failure(err: &BuildError, verbose: bool) {
  match err {
    BuildError::CompilationFailed { log } => {
      output::print_error("Compilation failed");
      let shown = if verbose { log.clone() } else { output::log_tail(log, 40) };
      if !shown.is_empty() {
        eprintln!("{shown}");
      }
      if !verbose {
        eprintln!("(run with --verbose for the full engine log)");
      }
    }
    other => output::print_error(&other.to_string()),
  }
}
