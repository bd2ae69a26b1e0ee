//! Offline tests for the qncli binary
//!
//! None of these reach a real storage service: they cover argument handling,
//! configuration errors, commands that never send a request, and the exit
//! code of an unreachable endpoint.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{Value, json};
use tempfile::TempDir;

fn qncli_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_qncli"))
}

/// Run qncli with the given config file and no ambient configuration
fn run_qncli(args: &[&str], config: Option<&Path>) -> Output {
    run_qncli_with_env(args, config, &[])
}

fn run_qncli_with_env(args: &[&str], config: Option<&Path>, env: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(qncli_binary());
    cmd.env_remove("QNCLI_CONFIG").env_remove("RUST_LOG");
    cmd.envs(env.iter().copied());
    if let Some(config) = config {
        cmd.arg("--config").arg(config);
    }
    cmd.args(args)
        .output()
        .expect("Failed to execute qncli command")
}

/// Write a config whose hosts point at a port nothing listens on
fn write_config(dir: &TempDir, value: Value) -> PathBuf {
    let path = dir.path().join("config.json");
    std::fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
    path
}

fn valid_config() -> Value {
    json!({
        "access_key": "ak",
        "secret_key": "sk",
        "buckets": [
            {"name": "a", "domain": "a.example.com", "protocol": "https"},
            {"name": "p", "domain": "p.example.com", "private": true}
        ],
        "hosts": {
            "rs": "http://127.0.0.1:1",
            "rsf": "http://127.0.0.1:1",
            "io": "http://127.0.0.1:1",
            "up": "http://127.0.0.1:1"
        },
        "timeout": {"connect_ms": 500, "read_ms": 1000}
    })
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_help_lists_subcommands() {
    let output = run_qncli(&["--help"], None);
    assert!(output.status.success());
    let help = stdout(&output);
    for command in ["buckets", "ls", "stat", "mv", "cp", "rm", "upload", "fetch", "edit"] {
        assert!(help.contains(command), "missing {command} in help");
    }
}

#[test]
fn test_missing_config_file_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let output = run_qncli(&["buckets"], Some(&dir.path().join("missing.json")));
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Configuration file not found"));
}

#[test]
fn test_missing_credentials_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, json!({"buckets": []}));
    let output = run_qncli(&["buckets"], Some(&config));
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("access_key and secret_key are required"));
}

#[test]
fn test_unknown_config_field_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let mut value = valid_config();
    value["region"] = json!("z0");
    let config = write_config(&dir, value);
    let output = run_qncli(&["buckets"], Some(&config));
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("region"));
}

#[test]
fn test_config_loglevel_is_accepted() {
    let dir = TempDir::new().unwrap();
    let mut value = valid_config();
    value["loglevel"] = json!("INFO");
    let config = write_config(&dir, value);
    let output = run_qncli(&["buckets", "--json"], Some(&config));
    assert!(output.status.success(), "stderr: {}", stderr(&output));
}

#[test]
fn test_config_loglevel_sets_log_filter() {
    let dir = TempDir::new().unwrap();
    let mut value = valid_config();
    value["loglevel"] = json!("DEBUG");
    let config = write_config(&dir, value);
    let output = run_qncli(&["stat", "pic.jpg"], Some(&config));
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("stat failed, info:"));
}

#[test]
fn test_unknown_config_loglevel_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let mut value = valid_config();
    value["loglevel"] = json!("LOUD");
    let config = write_config(&dir, value);
    let output = run_qncli(&["buckets"], Some(&config));
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("unknown loglevel 'LOUD'"));
}

#[test]
fn test_buckets_table() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, valid_config());
    let output = run_qncli(&["buckets", "--no-color"], Some(&config));
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("https://a.example.com"));
    assert!(out.contains("http://p.example.com"));
    assert!(out.contains("private"));
}

#[test]
fn test_buckets_without_any_configured() {
    let dir = TempDir::new().unwrap();
    let mut value = valid_config();
    value["buckets"] = json!([]);
    let config = write_config(&dir, value);
    let output = run_qncli(&["buckets", "--no-color"], Some(&config));
    assert!(output.status.success());
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("No buckets configured"));
}

#[test]
fn test_buckets_json() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let config = write_config(&dir, valid_config());
    let output = run_qncli(&["buckets", "--json"], Some(&config));
    assert!(output.status.success());

    let rows: Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(rows[0]["name"], "a");
    assert_eq!(rows[0]["default"], true);
    assert_eq!(rows[1]["access"], "private");
    Ok(())
}

#[test]
fn test_url_public_bucket() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, valid_config());
    let output = run_qncli(&["url", "pic.jpg"], Some(&config));
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "https://a.example.com/pic.jpg");
}

#[test]
fn test_unknown_bucket_falls_back_with_warning() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, valid_config());
    let output = run_qncli(&["url", "pic.jpg", "-b", "typo"], Some(&config));
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output).trim(), "https://a.example.com/pic.jpg");
    assert!(stderr(&output).contains("bucket 'typo' is not configured, using 'a'"));
}

#[test]
fn test_url_private_bucket_is_signed() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, valid_config());
    let output = run_qncli(&["url", "doc.pdf", "-b", "p"], Some(&config));
    assert!(output.status.success());

    let url = stdout(&output);
    assert!(url.starts_with("http://p.example.com/doc.pdf?e="));
    assert!(url.contains("&token=ak:"));
}

#[test]
fn test_edit_without_changes_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, valid_config());
    let output = run_qncli(&["edit", "index.html"], Some(&config));
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_rm_without_keys_is_usage_error() {
    let output = run_qncli(&["rm"], None);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_upload_missing_local_file_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, valid_config());
    let missing = dir.path().join("nope.bin");
    let output = run_qncli(
        &["upload", missing.to_str().unwrap(), "--no-progress"],
        Some(&config),
    );
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("upload failed"));
}

#[test]
fn test_fetch_rejects_non_http_url() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, valid_config());
    let output = run_qncli(&["fetch", "ftp://example.org/a.png"], Some(&config));
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_unreachable_service_is_network_error() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, valid_config());
    let output = run_qncli(&["stat", "pic.jpg"], Some(&config));
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("stat failed: (0)"));
}

#[test]
fn test_failure_is_logged_under_target_scoped_rust_log() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, valid_config());
    let output = run_qncli_with_env(
        &["stat", "pic.jpg"],
        Some(&config),
        &[("RUST_LOG", "qn_kodo=debug")],
    );
    assert_eq!(output.status.code(), Some(3));
    let err = stderr(&output);
    assert!(err.contains("stat failed: (0)"));
    assert!(err.contains("Request failed"));
}

#[test]
fn test_json_failure_output() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, valid_config());
    let output = run_qncli(&["rm", "a.txt", "--json"], Some(&config));
    assert_eq!(output.status.code(), Some(3));

    let outcome: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(outcome["success"], false);
    assert_eq!(outcome["operation"], "remove");
    assert_eq!(outcome["failure"]["status_code"], 0);
}

#[test]
fn test_completions() {
    let output = run_qncli(&["completions", "bash"], None);
    assert!(output.status.success());
    assert!(stdout(&output).contains("qncli"));
}
