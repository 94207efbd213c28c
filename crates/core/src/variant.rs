//! Language variants of the résumé source tree.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::BuildError;

/// File name of the main document inside a variant's source tree.
pub const MAIN_DOCUMENT: &str = "resume.tex";

/// File name of the artifact the engine emits next to the main document.
pub const ARTIFACT_NAME: &str = "resume.pdf";

/// A language variant of the document source.
///
/// Each variant maps to a `cv-{lang}` directory under the project root
/// (main document, section fragments, a font directory) and to its own
/// builder image tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
  En,
  Fr,
}

impl Variant {
  pub const ALL: [Variant; 2] = [Variant::En, Variant::Fr];

  /// Parse a caller-supplied language name.
  ///
  /// Unknown variants are rejected here, before any external process is
  /// invoked.
  pub fn parse(name: &str) -> Result<Self, BuildError> {
    match name.to_lowercase().as_str() {
      "en" => Ok(Variant::En),
      "fr" => Ok(Variant::Fr),
      _ => Err(BuildError::UnknownVariant { name: name.to_string() }),
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Variant::En => "en",
      Variant::Fr => "fr",
    }
  }

  /// Source directory for this variant under the project root.
  pub fn source_dir(&self, root: &Path) -> PathBuf {
    root.join(format!("cv-{}", self.as_str()))
  }

  /// Tag of the builder image that compiles this variant.
  pub fn image_tag(&self) -> String {
    format!("cv-builder-{}", self.as_str())
  }

  /// Artifact name used when the PDF is relocated to the project root.
  pub fn rooted_artifact_name(&self) -> String {
    format!("cv-{}.pdf", self.as_str())
  }

  /// Variants whose source tree (including the main document) exists under
  /// `root`.
  pub fn discover(root: &Path) -> Vec<Variant> {
    Self::ALL
      .iter()
      .copied()
      .filter(|v| v.source_dir(root).join(MAIN_DOCUMENT).is_file())
      .collect()
  }
}

impl fmt::Display for Variant {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
