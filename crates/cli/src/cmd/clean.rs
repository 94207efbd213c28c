//! Implementation of the `cvbuild clean` command.
//!
//! Standalone auxiliary-file cleanup for a variant's source tree, without
//! running a build.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use cvbuild_core::{Variant, clean_aux_files, resolve};

use crate::output;

#[derive(Args)]
pub struct CleanArgs {
  /// Language variant to clean (en or fr)
  #[arg(short, long, default_value = "en")]
  pub language: String,

  /// Project root containing the cv-{lang} source trees
  #[arg(long, default_value = ".")]
  pub root: PathBuf,
}

pub fn cmd_clean(args: CleanArgs) -> Result<()> {
  let outcome = Variant::parse(&args.language)
    .and_then(|variant| resolve(variant, &args.root))
    .and_then(|dir| clean_aux_files(&dir));

  match outcome {
    Ok(0) => output::print_info("No auxiliary files to clean"),
    Ok(removed) => output::print_success(&format!("Cleaned {removed} auxiliary file(s)")),
    Err(err) => {
      output::print_error(&err.to_string());
      std::process::exit(1);
    }
  }
  Ok(())
}
