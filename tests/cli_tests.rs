//! End-to-end tests for the command-line contract (no network access)

use serde_json::Value;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const AZURE_VARS: &[&str] = &[
    "AZURE_OPENAI_API_KEY",
    "AZURE_OPENAI_ENDPOINT",
    "AZURE_OPENAI_API_VERSION",
    "AZURE_OPENAI_DEPLOYMENT",
];

/// Run the binary against an empty config file in a scratch directory, with
/// no Azure credentials in the environment.
fn run(args: &[&str], workdir: &Path) -> Output {
    let config = workdir.join("config.toml");
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_resume-retailor"));
    cmd.current_dir(workdir)
        .arg("--config")
        .arg(&config)
        .args(args)
        .env("NO_COLOR", "1");
    for var in AZURE_VARS {
        cmd.env_remove(var);
    }
    cmd.output().expect("failed to run resume-retailor")
}

fn fixture(name: &str) -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
        .to_string_lossy()
        .to_string()
}

#[test]
fn test_missing_resume_file() {
    let dir = TempDir::new().unwrap();
    let output = run(&["retailor", "no_such_resume.json", "jd"], dir.path());

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("File not found: no_such_resume.json"), "stderr: {stderr}");
}

#[test]
fn test_malformed_resume_json() {
    let dir = TempDir::new().unwrap();
    let output = run(&["retailor", &fixture("malformed_resume.json"), "nojd"], dir.path());

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: Value = serde_json::from_str(stdout.trim()).expect("stdout should be a JSON error object");
    let message = parsed["error"].as_str().unwrap();
    assert!(message.starts_with("Invalid JSON input: "));
    assert!(message.contains("EOF"), "parse reason missing: {message}");
}

#[test]
fn test_unknown_mode() {
    let dir = TempDir::new().unwrap();
    let output = run(&["retailor", &fixture("sample_resume.json"), "cover-letter"], dir.path());

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid value 'cover-letter'"), "stderr: {stderr}");
    assert!(stderr.contains("possible values: jd, nojd"));
}

#[test]
fn test_missing_mode_argument() {
    let dir = TempDir::new().unwrap();
    let output = run(&["retailor", &fixture("sample_resume.json")], dir.path());
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_empty_credentials_fail_before_any_request() {
    let dir = TempDir::new().unwrap();
    let output = run(&["retailor", &fixture("sample_resume.json"), "JD", "--no-document"], dir.path());

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Using Keywords: software development, programming"));
    assert!(stderr.contains("AZURE_OPENAI_API_KEY"), "stderr: {stderr}");
    // nothing was retailored, so nothing was written
    assert!(output.stdout.is_empty());
}

#[test]
fn test_probe_reports_configuration_failure() {
    let dir = TempDir::new().unwrap();
    let output = run(&["probe"], dir.path());

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Connection failed:"));
    assert!(stdout.contains("Check your endpoint, API key, and deployment name."));
}

#[test]
fn test_config_reset_and_show() {
    let dir = TempDir::new().unwrap();
    let reset = run(&["config", "reset"], dir.path());
    assert_eq!(reset.status.code(), Some(0));
    assert!(dir.path().join("config.toml").exists());

    let show = run(&["config", "show"], dir.path());
    assert_eq!(show.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&show.stdout);
    assert!(stdout.contains("api_version = \"2024-08-01-preview\""));
    assert!(stdout.contains("api_key = \"<unset>\""));
}

#[test]
fn test_help_exits_zero() {
    let dir = TempDir::new().unwrap();
    let output = run(&["--help"], dir.path());
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("retailor"));
}
