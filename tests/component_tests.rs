//! Component formula and validate command tests

mod common;

use approx::assert_relative_eq;
use common::{mtbf, write_file, CANONICAL_MARKOV, UNBALANCED_MARKOV};
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn calc_json(args: &[&str]) -> Value {
    let output = mtbf()
        .args(["component", "calc", "-o", "json"])
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

// ============================================================================
// Component Calc
// ============================================================================

#[test]
fn test_calc_simple() {
    let report = calc_json(&["simple", "--param", "lambda=0.002"]);
    assert_relative_eq!(report["mtbf"].as_f64().unwrap(), 500.0, epsilon = 1e-9);
    assert_eq!(report["model"]["type"], "simple");
}

#[test]
fn test_calc_k_of_n_with_short_keys() {
    let report = calc_json(&["k-of-n", "-p", "n=3", "-p", "k=3", "-p", "mtbf=1000"]);
    assert_relative_eq!(report["mtbf"].as_f64().unwrap(), 1000.0 / 3.0, epsilon = 1e-9);
    assert_eq!(report["model"]["k_required"], 3);
}

#[test]
fn test_calc_k_greater_than_n_is_zero() {
    let report = calc_json(&["k_of_n", "-p", "n_total=2", "-p", "k_required=3", "-p", "mtbf_component=1000"]);
    assert_eq!(report["mtbf"].as_f64(), Some(0.0));
    assert_eq!(report["failure_rate"].as_f64(), Some(0.0));
}

#[test]
fn test_calc_zero_lambda_is_infinite() {
    let report = calc_json(&["simple", "-p", "lambda=0"]);
    assert_eq!(report["mtbf"], "infinite");
}

#[test]
fn test_calc_missing_parameter_strict() {
    mtbf()
        .args(["component", "calc", "parallel", "-p", "n_components=2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("mtbf_component"));
}

#[test]
fn test_calc_lenient_uses_defaults() {
    let report = calc_json(&["maintained", "--lenient"]);
    assert_eq!(report["model"]["mtbf_base"].as_f64(), Some(1000.0));
    assert_eq!(report["model"]["maintenance_interval"].as_f64(), Some(100.0));
}

#[test]
fn test_calc_env_policy() {
    let output = mtbf()
        .env("MTBF_PARAMETER_POLICY", "lenient")
        .args(["component", "calc", "series", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_relative_eq!(report["mtbf"].as_f64().unwrap(), 500.0, epsilon = 1e-9);
}

#[test]
fn test_calc_bad_param_syntax() {
    mtbf()
        .args(["component", "calc", "simple", "-p", "lambda"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("KEY=VALUE"));
}

#[test]
fn test_calc_unknown_type() {
    mtbf()
        .args(["component", "calc", "quantum"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown component type"));
}

#[test]
fn test_types_json_lists_all() {
    let output = mtbf()
        .args(["component", "types", "-o", "json"])
        .output()
        .unwrap();
    let types: Value = serde_json::from_slice(&output.stdout).unwrap();
    let types = types.as_array().unwrap();
    assert_eq!(types.len(), 5);
    assert_eq!(types[3]["type"], "k_of_n");
    assert_eq!(types[3]["parameters"]["k_required"].as_f64(), Some(2.0));
}

// ============================================================================
// Validate Command
// ============================================================================

#[test]
fn test_validate_reports_each_file() {
    let tmp = TempDir::new().unwrap();
    let good = write_file(&tmp, "good.yaml", CANONICAL_MARKOV);
    let bad = write_file(&tmp, "bad.yaml", UNBALANCED_MARKOV);

    mtbf()
        .current_dir(tmp.path())
        .arg("validate")
        .arg(&good)
        .arg(&bad)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Files checked:  2"))
        .stdout(predicate::str::contains("row 1"));
}

#[test]
fn test_validate_stops_at_first_failure() {
    let tmp = TempDir::new().unwrap();
    let bad = write_file(&tmp, "bad.yaml", UNBALANCED_MARKOV);
    let good = write_file(&tmp, "good.yaml", CANONICAL_MARKOV);

    mtbf()
        .current_dir(tmp.path())
        .arg("validate")
        .arg(&bad)
        .arg(&good)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Files checked:  1"));

    mtbf()
        .current_dir(tmp.path())
        .args(["validate", "--keep-going"])
        .arg(&bad)
        .arg(&good)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Files checked:  2"));
}

#[test]
fn test_validate_range_warning_strict() {
    let tmp = TempDir::new().unwrap();
    let path = write_file(
        &tmp,
        "system.yaml",
        "name: Hot\ncomponents:\n  - name: Fan\n    type: simple\n    parameters: {lambda: 5}\n",
    );

    mtbf()
        .current_dir(tmp.path())
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("recommended range"));

    mtbf()
        .current_dir(tmp.path())
        .args(["validate", "--strict"])
        .arg(&path)
        .assert()
        .failure();
}
