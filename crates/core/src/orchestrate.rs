//! End-to-end build orchestration.
//!
//! One build request is driven through resolve → prepare → compile →
//! post-process as a chain of fallible steps with early exit. A failed step
//! is surfaced immediately; nothing is retried within an invocation.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};

use crate::docker::DockerEngine;
use crate::engine::{Engine, LatexmkEngine};
use crate::error::{BuildError, Result};
use crate::hash::{ContentHash, hash_file};
use crate::request::{BuildReport, BuildRequest, EngineKind};
use crate::variant::{ARTIFACT_NAME, MAIN_DOCUMENT, Variant};
use crate::workdir::Workdir;

/// Auxiliary files the engine leaves next to the document.
pub const AUX_EXTENSIONS: &[&str] =
  &["aux", "log", "out", "bbl", "blg", "fdb_latexmk", "fls", "toc", "synctex.gz"];

/// Upper bound on engine passes while waiting for the artifact to stabilize.
/// Cross-reference resolution typically settles after two.
pub const MAX_PASSES: u32 = 4;

/// Resolve a variant to its source directory.
///
/// Validates that the directory and the main document exist before any
/// external process is invoked.
pub fn resolve(variant: Variant, root: &Path) -> Result<PathBuf> {
  let dir = variant.source_dir(root);
  if !dir.is_dir() {
    return Err(BuildError::SourceMissing { path: dir });
  }
  if !dir.join(MAIN_DOCUMENT).is_file() {
    return Err(BuildError::SourceMissing { path: dir.join(MAIN_DOCUMENT) });
  }
  Ok(dir)
}

fn engine_for(request: &BuildRequest) -> Box<dyn Engine> {
  match request.engine {
    EngineKind::Docker => Box::new(DockerEngine::new(request.variant, &request.root)),
    EngineKind::Local => Box::new(LatexmkEngine::new(request.engine_bin.clone())),
  }
}

/// Drive one build request end to end.
pub async fn run_build(request: &BuildRequest) -> Result<BuildReport> {
  let started = Instant::now();

  let source_dir = resolve(request.variant, &request.root)?;
  info!(variant = %request.variant, source = %source_dir.display(), "resolved source tree");

  let engine = engine_for(request);
  engine.prepare(request).await?;
  info!(engine = engine.name(), "engine ready");

  let workdir = Workdir::stage(&source_dir)?;
  let (passes, log) = compile(engine.as_ref(), &workdir, request).await?;

  let dest = request.artifact_path();
  let artifact = workdir.publish(ARTIFACT_NAME, &dest)?;
  let digest = hash_file(&artifact)?;
  let size_bytes = fs::metadata(&artifact)?.len();
  info!(artifact = %artifact.display(), passes, "artifact published");

  let mut report = BuildReport {
    variant: request.variant,
    artifact,
    passes,
    digest: digest.0,
    size_bytes,
    elapsed: started.elapsed(),
    log,
  };

  post_process(&mut report, request, &source_dir, workdir.path())?;
  Ok(report)
}

/// Run the engine to a fixed point.
///
/// Stops once the artifact digest no longer changes between passes, or at
/// `MAX_PASSES`. Returns the pass count and the captured log of the final
/// pass.
pub async fn compile(engine: &dyn Engine, workdir: &Workdir, request: &BuildRequest) -> Result<(u32, String)> {
  let mut passes = 0;
  let mut last_digest: Option<ContentHash> = None;
  let mut log = String::new();

  while passes < MAX_PASSES {
    let run = engine.compile_pass(workdir.path(), request.timeout).await?;
    passes += 1;
    log = run.log();

    if !run.success {
      return Err(BuildError::CompilationFailed { log });
    }
    if request.verbose && !log.is_empty() {
      info!(pass = passes, log = %log, "engine pass output");
    }

    let produced = workdir.path().join(ARTIFACT_NAME);
    if !produced.is_file() {
      return Err(BuildError::CompilationFailed {
        log: format!("engine exited successfully but produced no {ARTIFACT_NAME}\n{log}"),
      });
    }

    let digest = hash_file(&produced)?;
    debug!(pass = passes, digest = %digest, "pass complete");
    if last_digest.as_ref() == Some(&digest) {
      break;
    }
    last_digest = Some(digest);
  }

  Ok((passes, log))
}

/// Post-compilation filesystem mutations: auxiliary handling and artifact
/// relocation. No process or network side effects at this stage.
pub fn post_process(
  report: &mut BuildReport,
  request: &BuildRequest,
  source_dir: &Path,
  workdir: &Path,
) -> Result<()> {
  if request.clean_aux {
    // Also drops by-products left behind by earlier in-place builds.
    let removed = clean_aux_files(source_dir)?;
    debug!(removed, "auxiliary files removed");
  } else {
    // Keep the engine's by-products next to the source for inspection.
    publish_aux_files(workdir, source_dir)?;
  }

  if request.move_to_root {
    let dest = request.root.join(request.variant.rooted_artifact_name());
    move_artifact(&report.artifact, &dest)?;
    info!(from = %report.artifact.display(), to = %dest.display(), "artifact relocated");
    report.artifact = dest;
  }

  Ok(())
}

/// Remove engine by-products from `dir`, returning how many were deleted.
pub fn clean_aux_files(dir: &Path) -> Result<usize> {
  let mut removed = 0;
  for entry in fs::read_dir(dir)? {
    let entry = entry?;
    let path = entry.path();
    if path.is_file() && is_aux_file(&path) {
      fs::remove_file(&path).map_err(|e| post_processing_failed(&path, e))?;
      removed += 1;
    }
  }
  Ok(removed)
}

/// Copy engine by-products from the scratch tree back next to the source.
fn publish_aux_files(workdir: &Path, source_dir: &Path) -> Result<()> {
  for entry in fs::read_dir(workdir)? {
    let entry = entry?;
    let path = entry.path();
    if path.is_file() && is_aux_file(&path) {
      let dest = source_dir.join(entry.file_name());
      fs::copy(&path, &dest).map_err(|e| post_processing_failed(&dest, e))?;
    }
  }
  Ok(())
}

fn is_aux_file(path: &Path) -> bool {
  let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
  AUX_EXTENSIONS.iter().any(|ext| name.ends_with(&format!(".{ext}")))
}

/// Relocate the artifact, overwriting any prior artifact at `dest`.
///
/// Falls back to copy+remove when the rename crosses filesystems.
pub fn move_artifact(from: &Path, dest: &Path) -> Result<()> {
  if let Some(parent) = dest.parent() {
    fs::create_dir_all(parent).map_err(|e| post_processing_failed(dest, e))?;
  }
  if fs::rename(from, dest).is_err() {
    fs::copy(from, dest).map_err(|e| post_processing_failed(dest, e))?;
    fs::remove_file(from).map_err(|e| post_processing_failed(from, e))?;
  }
  Ok(())
}

fn post_processing_failed(path: &Path, err: std::io::Error) -> BuildError {
  BuildError::PostProcessingFailed {
    path: path.to_path_buf(),
    message: err.to_string(),
  }
}
