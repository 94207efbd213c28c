//! End-to-end build tests against a stub typesetting engine.
//!
//! The local engine's binary is overridable, so these tests substitute a
//! small shell script that behaves like a deterministic latexmk: it answers
//! the `-version` probe and emits an artifact plus auxiliary files.

#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Isolated project directory with one valid variant tree and a stub engine.
struct TestEnv {
  temp: TempDir,
}

impl TestEnv {
  fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let env = Self { temp };
    env.write_variant("en");
    env
  }

  fn root(&self) -> &Path {
    self.temp.path()
  }

  fn write_variant(&self, lang: &str) {
    let dir = self.root().join(format!("cv-{lang}"));
    fs::create_dir_all(dir.join("sections")).unwrap();
    fs::create_dir_all(dir.join("fonts")).unwrap();
    fs::write(dir.join("resume.tex"), "\\documentclass{article}").unwrap();
    fs::write(dir.join("sections/experience.tex"), "\\section{Experience}").unwrap();
  }

  /// Stub engine that emits a deterministic artifact plus aux files.
  fn stub_engine(&self) -> PathBuf {
    self.write_engine_script(
      r#"#!/bin/sh
if [ "$1" = "-version" ]; then
  echo "Latexmk stub 4.77"
  exit 0
fi
printf '%%PDF-1.5\nstub resume body\n%%%%EOF\n' > resume.pdf
printf '\\relax\n' > resume.aux
echo "This is stub XeTeX" > resume.log
echo "Output written on resume.pdf (1 page)."
"#,
    )
  }

  /// Stub engine that fails like a TeX error.
  fn failing_engine(&self) -> PathBuf {
    self.write_engine_script(
      r#"#!/bin/sh
if [ "$1" = "-version" ]; then
  echo "Latexmk stub 4.77"
  exit 0
fi
echo "! Undefined control sequence." >&2
exit 1
"#,
    )
  }

  /// Stub engine that hangs past any short timeout.
  fn sleeping_engine(&self) -> PathBuf {
    self.write_engine_script(
      r#"#!/bin/sh
if [ "$1" = "-version" ]; then
  exit 0
fi
sleep 30
"#,
    )
  }

  fn write_engine_script(&self, script: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = self.root().join("fake-latexmk");
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
  }

  /// Pre-configured `cvbuild build` invocation against the given engine stub.
  fn build_cmd(&self, engine: &Path) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("cvbuild");
    cmd
      .arg("build")
      .args(["--engine", "local"])
      .arg("--engine-bin")
      .arg(engine)
      .arg("--root")
      .arg(self.root());
    cmd
  }
}

// =============================================================================
// Success path
// =============================================================================

#[test]
fn build_produces_artifact() {
  let env = TestEnv::new();
  let engine = env.stub_engine();

  env
    .build_cmd(&engine)
    .assert()
    .success()
    .stdout(predicate::str::contains("PDF created"));

  assert!(env.root().join("cv-en/resume.pdf").is_file());
}

#[test]
fn build_keeps_aux_files_by_default() {
  let env = TestEnv::new();
  let engine = env.stub_engine();

  env.build_cmd(&engine).assert().success();

  assert!(env.root().join("cv-en/resume.aux").is_file());
  assert!(env.root().join("cv-en/resume.log").is_file());
}

#[test]
fn build_twice_yields_identical_bytes() {
  let env = TestEnv::new();
  let engine = env.stub_engine();
  let artifact = env.root().join("cv-en/resume.pdf");

  env.build_cmd(&engine).assert().success();
  let first = fs::read(&artifact).unwrap();

  env.build_cmd(&engine).assert().success();
  let second = fs::read(&artifact).unwrap();

  assert_eq!(first, second);
}

#[test]
fn build_json_report() {
  let env = TestEnv::new();
  let engine = env.stub_engine();

  env
    .build_cmd(&engine)
    .args(["--format", "json"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"passes\""))
    .stdout(predicate::str::contains("\"digest\""));
}

// =============================================================================
// Post-processing
// =============================================================================

#[test]
fn build_clean_leaves_only_input_files() {
  let env = TestEnv::new();
  let engine = env.stub_engine();

  env.build_cmd(&engine).arg("--clean").assert().success();

  let dir = env.root().join("cv-en");
  assert!(dir.join("resume.tex").is_file());
  assert!(dir.join("sections/experience.tex").is_file());
  assert!(dir.join("resume.pdf").is_file());
  assert!(!dir.join("resume.aux").exists());
  assert!(!dir.join("resume.log").exists());
}

#[test]
fn build_move_to_root_relocates_artifact() {
  let env = TestEnv::new();
  let engine = env.stub_engine();

  env.build_cmd(&engine).arg("--move-to-root").assert().success();

  assert!(env.root().join("cv-en.pdf").is_file());
  assert!(!env.root().join("cv-en/resume.pdf").exists());
}

#[test]
fn build_move_to_root_overwrites_stale_artifact() {
  let env = TestEnv::new();
  let engine = env.stub_engine();
  fs::write(env.root().join("cv-en.pdf"), "stale").unwrap();

  env.build_cmd(&engine).arg("--move-to-root").assert().success();

  let bytes = fs::read_to_string(env.root().join("cv-en.pdf")).unwrap();
  assert!(bytes.contains("stub resume body"));
}

#[test]
fn build_output_override() {
  let env = TestEnv::new();
  let engine = env.stub_engine();
  let out = env.root().join("out/custom.pdf");

  env.build_cmd(&engine).arg("--output").arg(&out).assert().success();

  assert!(out.is_file());
  assert!(!env.root().join("cv-en/resume.pdf").exists());
}

// =============================================================================
// Failure paths
// =============================================================================

#[test]
fn failed_build_preserves_prior_artifact() {
  let env = TestEnv::new();
  let engine = env.stub_engine();

  env.build_cmd(&engine).assert().success();
  let before = fs::read(env.root().join("cv-en/resume.pdf")).unwrap();

  let failing = env.failing_engine();
  env
    .build_cmd(&failing)
    .assert()
    .failure()
    .stderr(predicate::str::contains("Compilation failed"));

  let after = fs::read(env.root().join("cv-en/resume.pdf")).unwrap();
  assert_eq!(before, after);
}

#[test]
fn failing_build_surfaces_engine_log() {
  let env = TestEnv::new();
  let engine = env.failing_engine();

  env
    .build_cmd(&engine)
    .assert()
    .failure()
    .stderr(predicate::str::contains("Undefined control sequence"));
}

#[test]
fn build_times_out() {
  let env = TestEnv::new();
  let engine = env.sleeping_engine();

  env
    .build_cmd(&engine)
    .args(["--timeout", "1s"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("timed out"));
}
