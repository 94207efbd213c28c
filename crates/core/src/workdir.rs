//! Per-run scratch staging.
//!
//! Each build compiles inside its own temporary copy of the variant source
//! tree, so two builds of different variants never clobber each other's
//! auxiliary files, and a failed pass never touches a previously published
//! artifact.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{BuildError, Result};

/// A staged working copy of one variant's source tree.
///
/// The underlying directory is removed when the value is dropped.
pub struct Workdir {
  temp: TempDir,
}

impl Workdir {
  /// Stage a copy of `source` into a fresh temporary directory.
  pub fn stage(source: &Path) -> Result<Self> {
    let temp = TempDir::new()?;
    copy_tree(source, temp.path())?;
    debug!(source = %source.display(), workdir = %temp.path().display(), "staged source tree");
    Ok(Self { temp })
  }

  pub fn path(&self) -> &Path {
    self.temp.path()
  }

  /// Copy the produced artifact out of the scratch tree, overwriting any
  /// previous artifact at `dest`.
  pub fn publish(&self, artifact: &str, dest: &Path) -> Result<PathBuf> {
    let produced = self.temp.path().join(artifact);
    if !produced.is_file() {
      return Err(BuildError::CompilationFailed {
        log: format!("engine reported success but produced no {artifact}"),
      });
    }
    if let Some(parent) = dest.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::copy(&produced, dest)?;
    Ok(dest.to_path_buf())
  }
}

/// Recursive tree copy preserving the relative layout; symlinks are followed
/// so font directories linked into the tree are staged as real files.
fn copy_tree(from: &Path, to: &Path) -> Result<()> {
  for entry in WalkDir::new(from).follow_links(true) {
    let entry = entry.map_err(std::io::Error::from)?;
    let Ok(rel) = entry.path().strip_prefix(from) else {
      continue;
    };
    if rel.as_os_str().is_empty() {
      continue;
    }

    let target = to.join(rel);
    if entry.file_type().is_dir() {
      fs::create_dir_all(&target)?;
    } else if entry.file_type().is_file() {
      if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
      }
      fs::copy(entry.path(), &target)?;
    }
  }
  Ok(())
}
