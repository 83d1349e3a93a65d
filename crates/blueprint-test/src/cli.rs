//! CLI regression tests for the `blueprint` binary.
//!
//! These run the binary as a subprocess to catch regressions in flag names,
//! exit codes and output formats.
//!
//! Run with: `cargo test -p blueprint-test`
//! Requires the `blueprint` binary to be built first (`cargo build -p blueprint`).

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

use crate::fixture;

/// Returns an assert_cmd Command wrapping the `blueprint` binary.
fn blueprint() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("blueprint")
        .expect("blueprint binary not found, run `cargo build -p blueprint` first")
}

fn read_json(path: &std::path::Path) -> serde_json::Value {
    let content = std::fs::read_to_string(path).expect("read output");
    serde_json::from_str(&content).expect("output should be valid JSON")
}

// ---------------------------------------------------------------------------
// blueprint validate
// ---------------------------------------------------------------------------

#[test]
fn validate_valid_module_exits_zero() {
    blueprint()
        .args(["validate", "--input"])
        .arg(fixture("minimal.yaml"))
        .assert()
        .success()
        .stderr(contains("is valid"));
}

#[test]
fn validate_reports_warnings() {
    blueprint()
        .args(["validate", "--input"])
        .arg(fixture("full.yaml"))
        .assert()
        .success()
        .stderr(contains("E1201"))
        .stderr(contains("(warning)"));
}

#[test]
fn validate_parse_error_exits_one() {
    blueprint()
        .args(["validate", "--input"])
        .arg(fixture("invalid-parse-error.yaml"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("E1002"));
}

#[test]
fn validate_missing_file_exits_one() {
    blueprint()
        .args(["validate", "--input", "this-file-does-not-exist.yaml"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("file not found"));
}

#[test]
fn validate_unknown_route_path_exits_one() {
    blueprint()
        .args(["validate", "--input"])
        .arg(fixture("invalid-route-path.yaml"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("E1120"));
}

#[test]
fn validate_multiple_inputs_summarizes() {
    blueprint()
        .args(["validate", "--input"])
        .arg(fixture("minimal.yaml"))
        .arg(fixture("invalid-missing-post.yaml"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("validated 2 module(s): 1 valid, 1 invalid"));
}

#[test]
fn validate_json_format_outputs_valid_json() {
    let output = blueprint()
        .args(["validate", "--input"])
        .arg(fixture("minimal.yaml"))
        .args(["--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let v: serde_json::Value =
        serde_json::from_slice(&output).expect("--format json output should be valid JSON");
    assert_eq!(v["summary"]["total"], 1);
    assert_eq!(v["results"][0]["valid"], true);
}

#[test]
fn validate_json_format_invalid_module_lists_error_code() {
    let output = blueprint()
        .args(["validate", "--input"])
        .arg(fixture("invalid-missing-post.yaml"))
        .args(["--format", "json"])
        .assert()
        .failure()
        .code(1)
        .get_output()
        .stdout
        .clone();

    let v: serde_json::Value =
        serde_json::from_slice(&output).expect("JSON output even on error");
    assert_eq!(v["results"][0]["valid"], false);
    assert_eq!(v["results"][0]["errors"][0]["code"], "E1110");
}

#[test]
fn validate_unknown_format_exits_two() {
    blueprint()
        .args(["validate", "--input"])
        .arg(fixture("minimal.yaml"))
        .args(["--format", "xml"])
        .assert()
        .failure()
        .code(2);
}

// ---------------------------------------------------------------------------
// blueprint compile
// ---------------------------------------------------------------------------

#[test]
fn compile_missing_output_flag_exits_two() {
    blueprint()
        .args(["compile", "--input"])
        .arg(fixture("minimal.yaml"))
        .assert()
        .failure()
        .code(2);
}

#[test]
fn compile_writes_blueprint() {
    let tmp = TempDir::new().expect("temp dir");
    let output = tmp.path().join("blueprint.json");

    blueprint()
        .args(["compile", "--input"])
        .arg(fixture("full.yaml"))
        .arg("--output")
        .arg(&output)
        .arg("--pretty")
        .assert()
        .success()
        .stderr(contains("compiled"));

    let v = read_json(&output);
    assert_eq!(v["title"], "Device API");
    assert_eq!(v["routes"][0]["path"], "/devices");
    assert_eq!(v["routes"][0]["endpoints"][0]["workspaceScope"], "optional");
    assert_eq!(v["actionAttempts"][0]["actionAttemptType"], "UNLOCK_DOOR");
}

#[test]
fn compile_nonexistent_input_exits_one() {
    let tmp = TempDir::new().expect("temp dir");
    blueprint()
        .args(["compile", "--input", "nonexistent.yaml", "--output"])
        .arg(tmp.path().join("blueprint.json"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("not found"));
}

#[test]
fn compile_missing_post_exits_one() {
    let tmp = TempDir::new().expect("temp dir");
    let output = tmp.path().join("blueprint.json");

    blueprint()
        .args(["compile", "--input"])
        .arg(fixture("invalid-missing-post.yaml"))
        .arg("--output")
        .arg(&output)
        .assert()
        .failure()
        .code(1)
        .stderr(contains("E1110"));

    assert!(!output.exists(), "no output on failure");
}

#[test]
fn compile_with_config_restricts_syntaxes() {
    let tmp = TempDir::new().expect("temp dir");
    let output = tmp.path().join("blueprint.json");

    blueprint()
        .args(["compile", "--input"])
        .arg(fixture("full.yaml"))
        .arg("--config")
        .arg(fixture("blueprint.yaml"))
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let v = read_json(&output);
    let get = &v["routes"][0]["endpoints"][0];
    assert_eq!(get["path"], "/devices/get");
    let code = get["codeSamples"][0]["code"]
        .as_object()
        .expect("code map");
    assert!(code.contains_key("json"));
    assert!(!code.contains_key("curl"));
}

#[test]
fn compile_invalid_config_exits_one() {
    let tmp = TempDir::new().expect("temp dir");
    let config = tmp.path().join("blueprint.yaml");
    std::fs::write(&config, "outputs: {}\n").expect("write config");

    blueprint()
        .args(["compile", "--input"])
        .arg(fixture("minimal.yaml"))
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(tmp.path().join("blueprint.json"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("E1160"));
}

#[test]
fn pretty_log_format_is_accepted() {
    blueprint()
        .args(["--log-format", "pretty", "validate", "--input"])
        .arg(fixture("minimal.yaml"))
        .assert()
        .success();
}

#[test]
fn unknown_log_format_exits_two() {
    blueprint()
        .args(["--log-format", "xml", "validate", "--input"])
        .arg(fixture("minimal.yaml"))
        .assert()
        .failure()
        .code(2);
}

#[test]
fn version_reports_compiler_version() {
    blueprint()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains(blueprint_compiler::COMPILER_VERSION));
}
