//! Implementation of the `cvbuild info` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use cvbuild_core::engine::{Engine, LatexmkEngine};
use cvbuild_core::{EngineKind, Variant, docker};

use crate::cmd::EngineChoice;
use crate::output;

#[derive(Args)]
pub struct InfoArgs {
  /// Project root containing the cv-{lang} source trees
  #[arg(long, default_value = ".")]
  pub root: PathBuf,

  /// Typesetting engine to probe
  #[arg(long, value_enum, default_value_t = EngineChoice::Docker)]
  pub engine: EngineChoice,

  /// Override the local engine binary
  #[arg(long, value_name = "BIN")]
  pub engine_bin: Option<PathBuf>,
}

/// Report engine availability and the variant trees present under the root.
/// An unavailable engine is reported, not treated as a failure.
pub fn cmd_info(args: InfoArgs) -> Result<()> {
  println!("cvbuild v{}", env!("CARGO_PKG_VERSION"));
  println!();

  let kind = EngineKind::from(args.engine);
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let probe = match args.engine {
    EngineChoice::Docker => rt.block_on(docker::docker_available(Path::new("docker"))),
    EngineChoice::Local => rt.block_on(LatexmkEngine::new(args.engine_bin).check()),
  };

  match probe {
    Ok(()) => output::print_success(&format!("Engine '{}' is available", kind)),
    Err(err) => output::print_warning(&format!("Engine '{}' is not available: {}", kind, err)),
  }

  println!();
  let variants = Variant::discover(&args.root);
  if variants.is_empty() {
    output::print_info("No variant source trees found");
  } else {
    println!("Variants:");
    for variant in variants {
      output::print_stat(variant.as_str(), &variant.source_dir(&args.root).display().to_string());
    }
  }

  Ok(())
}
