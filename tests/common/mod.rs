//! Shared test helpers for integration tests
//!
//! This module provides common utilities used across all test files.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to get an mtbf command
pub fn mtbf() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("mtbf"));
    // Keep user-level settings out of the tests
    cmd.env_remove("MTBF_PARAMETER_POLICY")
        .env_remove("MTBF_PRECISION")
        .env_remove("MTBF_GENERATOR_TOLERANCE")
        .env_remove("RUST_LOG")
        .env("XDG_CONFIG_HOME", std::env::temp_dir().join("mtbf-tests-no-user-config"));
    cmd
}

/// Helper to create an initialized project in a temp directory
pub fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    mtbf().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

/// Helper to write a file into the temp directory
pub fn write_file(tmp: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = tmp.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Series chain with λ = {0.001, 0.002, 0.002}
pub const SERIES_SYSTEM: &str = r#"name: Three in series
components:
  - name: A
    type: simple
    parameters:
      lambda: 0.001
  - name: B
    type: simple
    parameters:
      lambda: 0.002
  - name: C
    type: simple
    parameters:
      lambda: 0.002
connections:
  - from: A
    to: B
  - from: B
    to: C
"#;

/// Three unconnected components with MTBF 100, 200, 300
pub const UNCONNECTED_SYSTEM: &str = r#"name: Loose parts
components:
  - name: A
    type: simple
    parameters:
      lambda: 0.01
  - name: B
    type: series
    parameters:
      n_components: 5
      mtbf_component: 1000
  - name: C
    type: k_of_n
    parameters:
      n_total: 1
      k_required: 1
      mtbf_component: 300
"#;

/// The documented 3-state generator matrix
pub const CANONICAL_MARKOV: &str = r#"title: Degraded-mode pump
states: [Operational, Degraded, Failed]
matrix:
  - [-0.01, 0.008, 0.002]
  - [0.05, -0.08, 0.03]
  - [0, 0, 0]
"#;

/// Two-state repairable unit, λ = 0.01, μ = 0.1
pub const REPAIRABLE_MARKOV: &str = r#"title: Repairable unit
matrix:
  - [-0.01, 0.01]
  - [0.1, -0.1]
"#;

/// Row 1 sums to 0.01
pub const UNBALANCED_MARKOV: &str = r#"title: Broken
matrix:
  - [-0.01, 0.008, 0.002]
  - [0.05, -0.08, 0.04]
  - [0, 0, 0]
"#;
