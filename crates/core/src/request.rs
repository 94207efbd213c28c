//! Build request and report types.
//!
//! A `BuildRequest` is constructed once per invocation from caller-supplied
//! configuration and stays immutable for the run. A `BuildReport` is produced
//! at the end of one successful attempt; failures carry their diagnostics in
//! `BuildError` instead.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::variant::{ARTIFACT_NAME, Variant};

/// Default upper bound for a single engine pass.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Which typesetting engine backs the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
  /// Containerized engine, one builder image per variant.
  #[default]
  Docker,
  /// Locally installed latexmk.
  Local,
}

impl EngineKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      EngineKind::Docker => "docker",
      EngineKind::Local => "local",
    }
  }
}

impl std::fmt::Display for EngineKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// One build invocation.
#[derive(Debug, Clone)]
pub struct BuildRequest {
  pub variant: Variant,
  /// Project root containing the `cv-{lang}` trees and the builder Dockerfile.
  pub root: PathBuf,
  pub engine: EngineKind,
  /// Rebuild the builder image even when it already exists.
  pub rebuild_image: bool,
  /// Remove auxiliary engine files from the source tree afterwards.
  pub clean_aux: bool,
  /// Relocate the artifact to `{root}/cv-{lang}.pdf`.
  pub move_to_root: bool,
  /// Explicit artifact destination; overrides `cv-{lang}/resume.pdf`.
  pub output: Option<PathBuf>,
  /// Upper bound for a single engine pass.
  pub timeout: Duration,
  /// Override for the local engine binary.
  pub engine_bin: Option<PathBuf>,
  /// Surface the full engine log instead of a summary.
  pub verbose: bool,
}

impl BuildRequest {
  pub fn new(variant: Variant, root: impl Into<PathBuf>) -> Self {
    Self {
      variant,
      root: root.into(),
      engine: EngineKind::default(),
      rebuild_image: false,
      clean_aux: false,
      move_to_root: false,
      output: None,
      timeout: DEFAULT_TIMEOUT,
      engine_bin: None,
      verbose: false,
    }
  }

  /// Where the artifact is published after compilation, before any
  /// move-to-root relocation.
  pub fn artifact_path(&self) -> PathBuf {
    match self.output {
      Some(ref out) => out.clone(),
      None => self.variant.source_dir(&self.root).join(ARTIFACT_NAME),
    }
  }
}

/// Report of one successful build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
  pub variant: Variant,
  /// Final location of the artifact.
  pub artifact: PathBuf,
  /// Engine passes run before the artifact stabilized.
  pub passes: u32,
  /// SHA-256 digest of the artifact bytes.
  pub digest: String,
  pub size_bytes: u64,
  pub elapsed: Duration,
  /// Captured engine output from the final pass.
  #[serde(skip)]
  pub log: String,
}
