//! Docker-backed engine provisioning and execution.
//!
//! Each variant has its own builder image (`cv-builder-{lang}`) baked from
//! `Dockerfile.cv` at the project root. The container entrypoint runs the
//! typesetting toolchain against a volume-mounted source tree and leaves
//! `resume.pdf` in the mount.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::engine::{Engine, EngineRun, PROBE_TIMEOUT, run_captured};
use crate::error::{BuildError, Result};
use crate::request::BuildRequest;
use crate::variant::Variant;

/// Dockerfile the builder images are baked from.
pub const DOCKERFILE: &str = "Dockerfile.cv";

/// Where the staged source tree is mounted inside the container.
const CONTAINER_MOUNT: &str = "/cv/output";

/// Image builds pull a TeX distribution; allow far more than a compile pass.
const IMAGE_BUILD_TIMEOUT: Duration = Duration::from_secs(1800);

/// Probe whether the Docker client exists and the daemon answers.
///
/// `docker info` can exit non-zero on warnings while still printing client
/// and server sections, so the probe accepts either signal.
pub async fn docker_available(program: &Path) -> Result<()> {
  let unavailable = |message: String| BuildError::EnvironmentUnavailable { message };

  let mut version = Command::new(program);
  version.arg("--version");
  let run = run_captured(version, PROBE_TIMEOUT)
    .await
    .map_err(|e| unavailable(format!("{}: {}", program.display(), e)))?;
  if !run.success {
    return Err(unavailable(format!("'{} --version' exited non-zero", program.display())));
  }

  let mut info = Command::new(program);
  info.arg("info");
  let run = run_captured(info, PROBE_TIMEOUT)
    .await
    .map_err(|e| unavailable(format!("{}: {}", program.display(), e)))?;
  if run.success || run.stdout.contains("Client:") || run.stdout.contains("Server:") {
    Ok(())
  } else {
    Err(unavailable("docker daemon is not running".to_string()))
  }
}

/// Containerized typesetting engine, one builder image per variant.
pub struct DockerEngine {
  program: PathBuf,
  variant: Variant,
  /// Build context for the image, where `Dockerfile.cv` lives.
  context: PathBuf,
}

impl DockerEngine {
  pub fn new(variant: Variant, context: impl Into<PathBuf>) -> Self {
    Self {
      program: PathBuf::from("docker"),
      variant,
      context: context.into(),
    }
  }

  async fn image_exists(&self) -> Result<bool> {
    let tag = self.variant.image_tag();
    let mut cmd = Command::new(&self.program);
    cmd.args(["images", "-q"]).arg(&tag);

    let run = run_captured(cmd, PROBE_TIMEOUT)
      .await
      .map_err(|e| BuildError::EnvironmentUnavailable { message: e.to_string() })?;
    Ok(run.success && !run.stdout.trim().is_empty())
  }

  async fn build_image(&self) -> Result<()> {
    let tag = self.variant.image_tag();
    info!(image = %tag, "building engine image");

    let mut cmd = Command::new(&self.program);
    cmd
      .args(["build", "--build-arg"])
      .arg(format!("LANG={}", self.variant))
      .args(["-f", DOCKERFILE, "-t"])
      .arg(&tag)
      .arg(".")
      .current_dir(&self.context);

    let run = run_captured(cmd, IMAGE_BUILD_TIMEOUT)
      .await
      .map_err(|e| BuildError::EnvironmentUnavailable { message: e.to_string() })?;

    if !run.success {
      return Err(BuildError::EnvironmentUnavailable {
        message: format!("image build failed for {}:\n{}", tag, run.stderr.trim_end()),
      });
    }
    Ok(())
  }
}

#[async_trait]
impl Engine for DockerEngine {
  fn name(&self) -> &str {
    "docker"
  }

  async fn check(&self) -> Result<()> {
    docker_available(&self.program).await
  }

  async fn prepare(&self, request: &BuildRequest) -> Result<()> {
    self.check().await?;

    if !request.rebuild_image && self.image_exists().await? {
      debug!(image = %self.variant.image_tag(), "image already present");
      return Ok(());
    }
    self.build_image().await
  }

  async fn compile_pass(&self, workdir: &Path, timeout: Duration) -> Result<EngineRun> {
    // The volume mount needs a canonical host path.
    let mount = dunce::canonicalize(workdir)?;
    info!(engine = self.name(), image = %self.variant.image_tag(), "running engine pass");

    let mut cmd = Command::new(&self.program);
    cmd
      .args(["run", "--rm", "-v"])
      .arg(format!("{}:{}", mount.display(), CONTAINER_MOUNT))
      .arg(self.variant.image_tag());

    run_captured(cmd, timeout).await
  }
}
