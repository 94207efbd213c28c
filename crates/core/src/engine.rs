//! Typesetting engine abstraction.
//!
//! The orchestrator depends only on an engine's exit status and the files it
//! emits, never on its internals. Engines run as subprocesses with captured
//! stdout/stderr, one compilation pass at a time.

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time;
use tracing::{debug, info};

use crate::error::{BuildError, Result};
use crate::request::BuildRequest;
use crate::variant::MAIN_DOCUMENT;

/// Upper bound for availability probes (`docker info`, `latexmk -version`).
pub(crate) const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Captured outcome of a single engine pass.
#[derive(Debug)]
pub struct EngineRun {
  pub success: bool,
  pub stdout: String,
  pub stderr: String,
}

impl EngineRun {
  /// Combined diagnostic log, stderr last so the failure cause reads at the
  /// end.
  pub fn log(&self) -> String {
    match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
      (false, false) => format!("{}\n{}", self.stdout.trim_end(), self.stderr.trim_end()),
      (false, true) => self.stdout.trim_end().to_string(),
      (true, false) => self.stderr.trim_end().to_string(),
      (true, true) => String::new(),
    }
  }
}

impl From<Output> for EngineRun {
  fn from(output: Output) -> Self {
    Self {
      success: output.status.success(),
      stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
      stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
  }
}

/// An external typesetting toolchain.
#[async_trait]
pub trait Engine: Send + Sync {
  /// Identifies the engine (e.g. "docker", "latexmk").
  fn name(&self) -> &str;

  /// Cheap availability probe, no side effects.
  async fn check(&self) -> Result<()>;

  /// Provision the engine for this request (e.g. build the container image).
  async fn prepare(&self, request: &BuildRequest) -> Result<()>;

  /// Run one compilation pass against the staged source tree.
  async fn compile_pass(&self, workdir: &Path, timeout: Duration) -> Result<EngineRun>;
}

/// Run a subprocess with captured output under a timeout.
///
/// The child is spawned with `kill_on_drop`, so expiry of the timeout tears
/// the process down rather than leaving it running detached.
pub(crate) async fn run_captured(mut command: Command, limit: Duration) -> Result<EngineRun> {
  command.stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);

  debug!(command = ?command.as_std(), "spawning process");
  let child = command.spawn()?;

  match time::timeout(limit, child.wait_with_output()).await {
    Ok(output) => Ok(EngineRun::from(output?)),
    Err(_) => Err(BuildError::CompilationTimedOut { limit }),
  }
}

/// Locally installed latexmk, driving xelatex.
///
/// The binary is overridable, which is also how the test suite substitutes a
/// stub engine.
pub struct LatexmkEngine {
  program: PathBuf,
}

impl LatexmkEngine {
  pub fn new(program: Option<PathBuf>) -> Self {
    Self {
      program: program.unwrap_or_else(|| PathBuf::from("latexmk")),
    }
  }
}

#[async_trait]
impl Engine for LatexmkEngine {
  fn name(&self) -> &str {
    "latexmk"
  }

  async fn check(&self) -> Result<()> {
    let mut cmd = Command::new(&self.program);
    cmd.arg("-version");

    let run = run_captured(cmd, PROBE_TIMEOUT).await.map_err(|e| BuildError::EnvironmentUnavailable {
      message: format!("{}: {}", self.program.display(), e),
    })?;

    if run.success {
      Ok(())
    } else {
      Err(BuildError::EnvironmentUnavailable {
        message: format!("'{} -version' exited non-zero", self.program.display()),
      })
    }
  }

  async fn prepare(&self, _request: &BuildRequest) -> Result<()> {
    // Nothing to provision for a local toolchain.
    self.check().await
  }

  async fn compile_pass(&self, workdir: &Path, timeout: Duration) -> Result<EngineRun> {
    info!(engine = self.name(), workdir = %workdir.display(), "running engine pass");

    let mut cmd = Command::new(&self.program);
    cmd
      .arg("-xelatex")
      .arg("-interaction=nonstopmode")
      .arg("-halt-on-error")
      .arg(MAIN_DOCUMENT)
      .current_dir(workdir);

    run_captured(cmd, timeout).await
  }
}
