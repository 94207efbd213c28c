//! cvbuild - résumé PDF build orchestrator.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;
mod output;

/// Build LaTeX résumé variants through a containerized or local typesetting engine.
#[derive(Parser)]
#[command(name = "cvbuild")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output (debug tracing, full engine log on failure)
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Compile one language variant to a PDF artifact
  Build(cmd::BuildArgs),

  /// Remove auxiliary engine files from a variant's source tree
  Clean(cmd::CleanArgs),

  /// Show engine availability and discovered variants
  Info(cmd::InfoArgs),
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  // RUST_LOG wins when set; --verbose raises the default floor.
  let default_filter = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
    .without_time()
    .with_writer(std::io::stderr)
    .init();

  match cli.command {
    Commands::Build(args) => cmd::cmd_build(args, cli.verbose),
    Commands::Clean(args) => cmd::cmd_clean(args),
    Commands::Info(args) => cmd::cmd_info(args),
  }
}
