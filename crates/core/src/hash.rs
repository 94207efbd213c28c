//! Content hashing for artifact fixed-point detection.
//!
//! The compile loop re-runs the engine until the artifact's digest stops
//! changing between passes, so the orchestrator never has to interpret
//! engine logs to decide whether another pass is needed.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

/// A full 64-character SHA-256 hash of an artifact's bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentHash(pub String);

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Hash a file's contents in 8 KiB chunks.
pub fn hash_file(path: &Path) -> std::io::Result<ContentHash> {
  let mut file = File::open(path)?;

  let mut hasher = Sha256::new();
  let mut buffer = [0u8; 8192];

  loop {
    let bytes_read = file.read(&mut buffer)?;
    if bytes_read == 0 {
      break;
    }
    hasher.update(&buffer[..bytes_read]);
  }

  Ok(ContentHash(hex::encode(hasher.finalize())))
}
