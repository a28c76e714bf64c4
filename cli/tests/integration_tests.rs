use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const ENV_VARS: [&str; 4] = [
    "INTAKE_SPREADSHEET_ID",
    "INTAKE_API_KEY",
    "INTAKE_ACCESS_TOKEN",
    "INTAKE_PORT",
];

/// Runs the binary with a clean intake environment.
fn intake(args: &[&str]) -> Output {
    intake_with_env(args, &[])
}

fn intake_with_env(args: &[&str], env: &[(&str, &str)]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_intake"));
    for var in ENV_VARS {
        command.env_remove(var);
    }
    command
        .args(args)
        .envs(env.iter().copied())
        .output()
        .expect("failed to run intake")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("failed to write file");
    path
}

/// Config pointing at a port nothing listens on.
fn write_unreachable_config(dir: &TempDir) -> PathBuf {
    write_file(
        dir,
        "intake.yml",
        r#"source:
  spreadsheet_id: test-sheet
  sheet: Responses
  base_url: http://127.0.0.1:1
  timeout_secs: 2
schema:
  version: v2
"#,
    )
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

// ---------------------------------------------------------------------------
// schema show
// ---------------------------------------------------------------------------

#[test]
fn schema_show_defaults_to_latest() {
    let output = intake(&["schema", "show"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let schema: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(schema["version"], "v3");
    assert_eq!(schema["fields"].as_array().unwrap().len(), 8);
}

#[test]
fn schema_show_specific_version_as_yaml() {
    let output = intake(&["--format", "yaml", "schema", "show", "--version", "v1"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let text = stdout(&output);
    assert!(text.contains("version: v1"), "{text}");
    assert!(text.contains("key: skinTone"), "{text}");
}

#[test]
fn schema_show_lists_versions() {
    let output = intake(&["schema", "show", "--list"]);
    assert!(output.status.success());

    let versions: Vec<String> = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(versions, vec!["v1", "v2", "v3"]);
}

#[test]
fn schema_show_unknown_version_fails() {
    let output = intake(&["schema", "show", "--version", "v9"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("error: Unknown schema version 'v9'"));
}

// ---------------------------------------------------------------------------
// schema validate
// ---------------------------------------------------------------------------

#[test]
fn schema_validate_accepts_valid_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "custom.yaml",
        r#"version: custom
fields:
  - { key: name, column: 0, required: true }
  - { key: phone, column: 1 }
  - { key: notes, column: 4, label: Notes }
"#,
    );

    let output = intake(&["schema", "validate", path_str(&path)]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("3 field(s) over columns A:E"));
}

#[test]
fn schema_validate_accepts_json() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "custom.json",
        r#"{"version": "j1", "fields": [{"key": "name", "column": 0}]}"#,
    );

    let output = intake(&["schema", "validate", path_str(&path)]);
    assert!(output.status.success(), "{}", stderr(&output));
}

#[test]
fn schema_validate_reports_every_error() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "broken.yaml",
        r#"version: broken
fields:
  - { key: name, column: 0 }
  - { key: phone, column: 0 }
  - { key: name, column: 2 }
"#,
    );

    let output = intake(&["schema", "validate", path_str(&path)]);
    assert!(!output.status.success());

    let err = stderr(&output);
    assert!(err.contains("column 0 is assigned to both 'name' and 'phone'"), "{err}");
    assert!(err.contains("duplicate field key: name"), "{err}");
    assert!(err.contains("error: 2 validation error(s)"), "{err}");
}

#[test]
fn schema_validate_missing_file_fails() {
    let output = intake(&["schema", "validate", "/nonexistent/schema.yaml"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to read"));
}

// ---------------------------------------------------------------------------
// schema check-evolution
// ---------------------------------------------------------------------------

#[test]
fn check_evolution_rejects_v1_to_v2() {
    let output = intake(&["schema", "check-evolution", "v1", "v2"]);
    assert!(!output.status.success());

    let err = stderr(&output);
    assert!(err.contains("field 'skinTone' moved from column 3 to column 7"), "{err}");
    assert!(err.contains("is not additive"), "{err}");
}

#[test]
fn check_evolution_accepts_v2_to_v3() {
    let output = intake(&["schema", "check-evolution", "v2", "v3"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("'v2' -> 'v3' is additive."));
}

#[test]
fn check_evolution_against_file() {
    let dir = TempDir::new().unwrap();
    let reuse = write_file(
        &dir,
        "reuse.yaml",
        r#"version: v3-draft
fields:
  - { key: name, column: 0 }
  - { key: phone, column: 1 }
  - { key: date, column: 2 }
  - { key: allergies, column: 3 }
  - { key: concerns, column: 5 }
  - { key: skinType, column: 6 }
  - { key: skinTone, column: 7 }
"#,
    );

    // v1 used column D for skinTone
    let output = intake(&["schema", "check-evolution", "v1", path_str(&reuse)]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("column 3 reassigned from 'skinTone' to 'allergies'"));

    // v2 left column D unmapped
    let output = intake(&["schema", "check-evolution", "v2", path_str(&reuse)]);
    assert!(output.status.success(), "{}", stderr(&output));
}

// ---------------------------------------------------------------------------
// record commands
// ---------------------------------------------------------------------------

#[test]
fn list_without_config_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.yml");

    let output = intake(&["--config", path_str(&missing), "list"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("error: Failed to load config"));
}

#[test]
fn list_without_credential_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_unreachable_config(&dir);

    let output = intake(&["--config", path_str(&config), "list"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("No credential"));
}

#[test]
fn list_without_spreadsheet_id_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "intake.yml", "schema:\n  version: v2\n");

    let output = intake_with_env(
        &["--config", path_str(&config), "list"],
        &[("INTAKE_API_KEY", "test-key")],
    );
    assert!(!output.status.success());
    assert!(
        stderr(&output).contains("missing setting: source.spreadsheet_id"),
        "{}",
        stderr(&output)
    );
}

#[test]
fn get_reports_unreachable_store() {
    let dir = TempDir::new().unwrap();
    let config = write_unreachable_config(&dir);

    let output = intake_with_env(
        &["--config", path_str(&config), "get", "1"],
        &[("INTAKE_API_KEY", "test-key")],
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("store unavailable"), "{}", stderr(&output));
}

#[test]
fn submit_rejects_malformed_field() {
    let output = intake(&["submit", "--field", "name"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("expected KEY=VALUE"));
}

#[test]
fn submit_validates_before_writing() {
    let dir = TempDir::new().unwrap();
    let config = write_unreachable_config(&dir);

    let output = intake_with_env(
        &[
            "--config",
            path_str(&config),
            "submit",
            "--field",
            "name=Kim",
            "--field",
            "phone=010-1234",
        ],
        &[("INTAKE_ACCESS_TOKEN", "token")],
    );
    assert!(!output.status.success());

    let err = stderr(&output);
    assert!(err.contains("invalid submission"), "{err}");
    assert!(err.contains("required field is missing: concerns"), "{err}");
    assert!(!err.contains("store unavailable"), "{err}");
}

#[test]
fn invalid_port_override_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_unreachable_config(&dir);

    let output = intake_with_env(
        &["--config", path_str(&config), "list"],
        &[("INTAKE_PORT", "eighty"), ("INTAKE_API_KEY", "k")],
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("invalid value for INTAKE_PORT"));
}
