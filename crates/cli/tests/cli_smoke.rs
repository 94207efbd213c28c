//! CLI smoke tests for cvbuild.
//!
//! These tests verify that all CLI commands run without panicking and
//! return appropriate exit codes.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the cvbuild binary.
fn cvbuild_cmd() -> Command {
  cargo_bin_cmd!("cvbuild")
}

/// Create a temp project with a valid cv-en source tree.
fn temp_project() -> TempDir {
  let temp = TempDir::new().unwrap();
  let dir = temp.path().join("cv-en");
  std::fs::create_dir_all(dir.join("fonts")).unwrap();
  std::fs::write(dir.join("resume.tex"), "\\documentclass{article}").unwrap();
  temp
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  cvbuild_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  cvbuild_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("cvbuild"));
}

#[test]
fn subcommand_help_works() {
  for cmd in &["build", "clean", "info"] {
    cvbuild_cmd()
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

// =============================================================================
// build: request validation
// =============================================================================

#[test]
fn build_rejects_unknown_language() {
  let temp = temp_project();

  cvbuild_cmd()
    .arg("build")
    .args(["--language", "de"])
    .arg("--root")
    .arg(temp.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown variant 'de'"));
}

#[test]
fn build_missing_source_tree_fails() {
  let temp = TempDir::new().unwrap();

  // cv-fr does not exist; resolution fails before any engine is probed.
  cvbuild_cmd()
    .arg("build")
    .args(["--language", "fr"])
    .arg("--root")
    .arg(temp.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("source tree missing"));
}

#[test]
fn build_tree_without_main_document_fails() {
  let temp = TempDir::new().unwrap();
  std::fs::create_dir(temp.path().join("cv-en")).unwrap();

  cvbuild_cmd()
    .arg("build")
    .arg("--root")
    .arg(temp.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("resume.tex"));
}

#[test]
fn build_rejects_bad_timeout() {
  let temp = temp_project();

  cvbuild_cmd()
    .arg("build")
    .args(["--timeout", "not-a-duration"])
    .arg("--root")
    .arg(temp.path())
    .assert()
    .failure();
}

// =============================================================================
// clean
// =============================================================================

#[test]
fn clean_reports_nothing_to_do() {
  let temp = temp_project();

  cvbuild_cmd()
    .arg("clean")
    .arg("--root")
    .arg(temp.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("No auxiliary files"));
}

#[test]
fn clean_removes_aux_files() {
  let temp = temp_project();
  let dir = temp.path().join("cv-en");
  std::fs::write(dir.join("resume.aux"), "x").unwrap();
  std::fs::write(dir.join("resume.log"), "x").unwrap();

  cvbuild_cmd()
    .arg("clean")
    .arg("--root")
    .arg(temp.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("Cleaned 2"));

  assert!(dir.join("resume.tex").is_file());
  assert!(!dir.join("resume.aux").exists());
  assert!(!dir.join("resume.log").exists());
}

#[test]
fn clean_rejects_unknown_language() {
  let temp = temp_project();

  cvbuild_cmd()
    .arg("clean")
    .args(["--language", "klingon"])
    .arg("--root")
    .arg(temp.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown variant"));
}

// =============================================================================
// info
// =============================================================================

#[test]
fn info_lists_discovered_variants() {
  let temp = temp_project();

  cvbuild_cmd()
    .arg("info")
    .arg("--root")
    .arg(temp.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("cvbuild"))
    .stdout(predicate::str::contains("cv-en"));
}

#[test]
fn info_with_empty_root_succeeds() {
  let temp = TempDir::new().unwrap();

  // Engine availability is reported, never fatal for info.
  cvbuild_cmd()
    .arg("info")
    .args(["--engine", "local"])
    .args(["--engine-bin", "/nonexistent/latexmk-binary"])
    .arg("--root")
    .arg(temp.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("No variant source trees"));
}
