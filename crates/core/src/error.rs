//! Error types for cvbuild-core.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while orchestrating a build.
///
/// All variants are terminal for the current invocation. Nothing is retried;
/// the caller may re-run the whole request.
#[derive(Debug, Error)]
pub enum BuildError {
  /// The requested language variant is not one of the supported ones.
  #[error("unknown variant '{name}' (supported: en, fr)")]
  UnknownVariant { name: String },

  /// The variant is supported but its source tree is absent or incomplete.
  #[error("source tree missing or incomplete: {path}")]
  SourceMissing { path: PathBuf },

  /// The typesetting engine (or its container image) could not be provisioned.
  #[error("engine unavailable: {message}")]
  EnvironmentUnavailable { message: String },

  /// The engine exited non-zero or produced no artifact.
  #[error("compilation failed:\n{log}")]
  CompilationFailed { log: String },

  /// An engine pass ran longer than the configured limit and was killed.
  #[error("compilation timed out after {}s", limit.as_secs())]
  CompilationTimedOut { limit: Duration },

  /// Auxiliary cleanup or artifact relocation failed.
  #[error("post-processing failed for '{path}': {message}")]
  PostProcessingFailed { path: PathBuf, message: String },

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BuildError>;
