//! Integration tests for the `tether` CLI binary.
//!
//! Argument parsing, help output, completions, and config handling run
//! without a companion service; the end-to-end tests stand one up with
//! wiremock.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `tether` binary with env isolation.
///
/// Points config and cache directories at a nonexistent path and
/// clears all `TETHER_*` env vars so tests never touch the user's real
/// configuration or token cache.
fn tether_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("tether");
    cmd.env("HOME", "/tmp/tether-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/tether-cli-test-nonexistent")
        .env("XDG_CACHE_HOME", "/tmp/tether-cli-test-nonexistent")
        .env_remove("TETHER_BASE_URL")
        .env_remove("TETHER_TOKEN_FILE")
        .env_remove("TETHER_OUTPUT")
        .env_remove("TETHER_COLOR")
        .env_remove("TETHER_TIMEOUT")
        .env_remove("TETHER_POLL_INTERVAL")
        .env_remove("TETHER_SETTLE_DELAY_MS");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Write a token cache file and return its path.
fn token_file(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("auth_token");
    std::fs::write(&path, "e2e-token\n").unwrap();
    path
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = tether_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    tether_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("companion")
            .and(predicate::str::contains("status"))
            .and(predicate::str::contains("connect"))
            .and(predicate::str::contains("profiles")),
    );
}

#[test]
fn test_version_flag() {
    tether_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tether"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    tether_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    tether_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = tether_cmd().arg("foobar").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_invalid_output_format() {
    let output = tether_cmd()
        .args(["--output", "invalid", "status"])
        .output()
        .unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid output format"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values") || text.contains("valid value"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_status_without_token_fails_before_network() {
    // No companion is running and no token cache exists. The failure
    // must be the missing token (auth exit code), proving no request
    // was attempted against the dead endpoint.
    let output = tether_cmd().arg("status").output().unwrap();
    assert_eq!(output.status.code(), Some(3), "Expected auth exit code");
    let text = combined_output(&output);
    assert!(text.contains("token"), "Expected token error:\n{text}");
}

#[test]
fn test_zero_poll_interval_flag_is_rejected() {
    let output = tether_cmd()
        .args(["--poll-interval", "0", "status"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected usage exit code");
    let text = combined_output(&output);
    assert!(
        text.contains("poll_interval"),
        "Expected poll_interval validation error:\n{text}"
    );
}

#[test]
fn test_global_flags_parsing() {
    // All flags should parse correctly; the failure should be the
    // missing token, not argument parsing.
    let output = tether_cmd()
        .args(["-o", "json", "--verbose", "--timeout", "5", "status"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3), "Expected auth exit code");
}

// ── Config commands ─────────────────────────────────────────────────

#[test]
fn test_config_show_no_config() {
    // `config show` uses the built-in defaults when no file exists.
    tether_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_config_path_prints_location() {
    tether_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_writes_file_once() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = tether_cmd();
    cmd.env("XDG_CONFIG_HOME", dir.path());
    cmd.args(["config", "init"]).assert().success();
    assert!(
        dir.path().join("tether/config.toml").exists(),
        "config file should be created"
    );

    let mut cmd = tether_cmd();
    cmd.env("XDG_CONFIG_HOME", dir.path());
    cmd.args(["config", "init"]).assert().failure().code(2);
}

#[test]
fn test_config_set_writes_and_validates() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = tether_cmd();
    cmd.env("XDG_CONFIG_HOME", dir.path());
    cmd.args(["config", "set", "poll_interval_secs", "10"])
        .assert()
        .success();

    let contents = std::fs::read_to_string(dir.path().join("tether/config.toml")).unwrap();
    assert!(
        contents.contains("poll_interval_secs = 10"),
        "got:\n{contents}"
    );

    let mut cmd = tether_cmd();
    cmd.env("XDG_CONFIG_HOME", dir.path());
    cmd.args(["config", "set", "bogus", "1"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_config_set_rejects_zero_poll_interval() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = tether_cmd();
    cmd.env("XDG_CONFIG_HOME", dir.path());
    let output = cmd
        .args(["config", "set", "poll_interval_secs", "0"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2), "Expected usage exit code");
    let text = combined_output(&output);
    assert!(
        text.contains("at least 1 second"),
        "Expected interval validation error:\n{text}"
    );
    assert!(
        !dir.path().join("tether/config.toml").exists(),
        "rejected value must not be written"
    );
}

#[test]
fn test_config_subcommands_exist() {
    tether_cmd().args(["config", "--help"]).assert().success().stdout(
        predicate::str::contains("init")
            .and(predicate::str::contains("show"))
            .and(predicate::str::contains("path"))
            .and(predicate::str::contains("set")),
    );
}

// ── End-to-end against a mock companion ─────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_status_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vpn/status"))
        .and(header("Authorization", "Bearer e2e-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "connected": true,
            "profile_name": "IAD2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let token = token_file(&dir);

    tether_cmd()
        .args([
            "--base-url",
            &server.uri(),
            "--token-file",
            token.to_str().unwrap(),
            "-o",
            "plain",
            "status",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("connected (IAD2)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_profiles_end_to_end_without_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vpn/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": "iad2", "name": "IAD2"},
            {"id": "ams2", "name": "AMS2", "remote": "vpn.ams2.example.com", "port": 1194}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/vpn/default"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "detail": "No default VPN profile configured"
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let token = token_file(&dir);

    tether_cmd()
        .args([
            "--base-url",
            &server.uri(),
            "--token-file",
            token.to_str().unwrap(),
            "profiles",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("IAD2").and(predicate::str::contains("AMS2")));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_connect_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/vpn/connect/iad2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "profile_name": "IAD2"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/vpn/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "connected": true,
            "profile_name": "IAD2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let token = token_file(&dir);

    tether_cmd()
        .env("TETHER_SETTLE_DELAY_MS", "0")
        .args([
            "--base-url",
            &server.uri(),
            "--token-file",
            token.to_str().unwrap(),
            "-o",
            "plain",
            "connect",
            "iad2",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("connected (IAD2)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_health_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ok",
            "service": "tether",
            "version": "1.2.3"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let token = token_file(&dir);

    tether_cmd()
        .args([
            "--base-url",
            &server.uri(),
            "--token-file",
            token.to_str().unwrap(),
            "-o",
            "plain",
            "health",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_token_exits_auth_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vpn/status"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "detail": "Invalid or missing token"
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let token = token_file(&dir);

    let output = tether_cmd()
        .args([
            "--base-url",
            &server.uri(),
            "--token-file",
            token.to_str().unwrap(),
            "status",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3), "Expected auth exit code");
    let text = combined_output(&output);
    assert!(text.contains("rejected"), "Expected rejection error:\n{text}");
}
