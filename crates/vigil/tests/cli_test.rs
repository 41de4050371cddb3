//! Integration tests for the `vigil` CLI binary.
//!
//! Argument parsing, help output and completions run without a backend.
//! Session flows run against a wiremock backend, with HOME and the XDG
//! directories pointed at a temp dir so the session file is isolated.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `vigil` binary with env isolation.
///
/// Clears all `VIGIL_*` env vars and points config and data directories
/// at `home` so tests never touch the user's real configuration.
fn vigil_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("vigil");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("NO_COLOR", "1")
        .env_remove("VIGIL_PROFILE")
        .env_remove("VIGIL_API_URL")
        .env_remove("VIGIL_OUTPUT")
        .env_remove("VIGIL_INSECURE")
        .env_remove("VIGIL_TIMEOUT")
        .env_remove("VIGIL_USERNAME")
        .env_remove("VIGIL_PASSWORD");
    cmd
}

fn isolated() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn mock_login(server: &MockServer, role: &str) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "sid=cli-session; Path=/; HttpOnly")
                .set_body_json(json!({"id": "u-1", "username": "ops", "role": role})),
        )
        .mount(server)
        .await;
}

fn login(home: &Path, api_url: &str) -> std::process::Output {
    vigil_cmd(home)
        .args(["--api-url", api_url, "-o", "plain", "login", "ops", "--password-stdin"])
        .write_stdin("s3cret-pass\n")
        .output()
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = isolated();
    let output = vigil_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = isolated();
    vigil_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("locations")
            .and(predicate::str::contains("clients"))
            .and(predicate::str::contains("url-profiles"))
            .and(predicate::str::contains("login")),
    );
}

#[test]
fn test_version_flag() {
    let home = isolated();
    vigil_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("vigil"));
}

#[test]
fn test_completions_bash() {
    let home = isolated();
    vigil_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_invalid_subcommand() {
    let home = isolated();
    vigil_cmd(home.path())
        .arg("frobnicate")
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_interval_requires_watch() {
    let home = isolated();
    vigil_cmd(home.path())
        .args(["locations", "list", "--interval", "2s"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_config_path_needs_no_backend() {
    let home = isolated();
    vigil_cmd(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

// ── Gate ────────────────────────────────────────────────────────────

#[test]
fn test_no_backend_configured_is_usage_error() {
    let home = isolated();
    vigil_cmd(home.path())
        .args(["locations", "list"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("No backend configured"));
}

#[test]
fn test_not_logged_in_exits_with_auth_code() {
    let home = isolated();
    // Nothing listens on port 9; the gate must refuse before any request.
    vigil_cmd(home.path())
        .args(["--api-url", "http://127.0.0.1:9/api", "locations", "list"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Not logged in"));
}

// ── Session flows (wiremock backend) ────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_login_continues_to_requested_command() {
    let server = MockServer::start().await;
    let api_url = format!("{}/api", server.uri());
    let home = isolated();
    mock_login(&server, "admin").await;

    vigil_cmd(home.path())
        .args(["--api-url", &api_url, "clients", "list"])
        .assert()
        .code(3);

    let output = login(home.path(), &api_url);
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "/admin/clients");

    // The redirect is consumed: a second login lands home.
    let output = login(home.path(), &api_url);
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "/");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_session_cookie_survives_between_runs() {
    let server = MockServer::start().await;
    let api_url = format!("{}/api", server.uri());
    let home = isolated();
    mock_login(&server, "admin").await;

    let handshake = chrono::Utc::now().to_rfc3339();
    Mock::given(method("GET"))
        .and(path("/api/locations"))
        .and(header("cookie", "sid=cli-session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "loc-1", "name": "HQ", "ipAddress": "10.8.0.2",
             "urlProfile": "router", "latestHandshakeAt": handshake, "isEnabled": true},
            {"id": "loc-2", "name": "Depot", "ipAddress": "10.8.0.3",
             "urlProfile": "router", "isEnabled": true}
        ])))
        .mount(&server)
        .await;

    assert!(login(home.path(), &api_url).status.success());

    let output = vigil_cmd(home.path())
        .args(["--api-url", &api_url, "-o", "json", "locations", "list"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listed[0]["name"], "HQ");
    assert_eq!(listed[0]["liveness"], "online");
    assert_eq!(listed[1]["liveness"], "offline");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_normal_role_is_refused_admin_commands() {
    let server = MockServer::start().await;
    let api_url = format!("{}/api", server.uri());
    let home = isolated();
    mock_login(&server, "normal").await;

    assert!(login(home.path(), &api_url).status.success());

    vigil_cmd(home.path())
        .args(["--api-url", &api_url, "users", "list"])
        .assert()
        .failure()
        .code(5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_expired_session_is_cleared() {
    let server = MockServer::start().await;
    let api_url = format!("{}/api", server.uri());
    let home = isolated();
    mock_login(&server, "admin").await;
    Mock::given(method("GET"))
        .and(path("/api/clients"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    assert!(login(home.path(), &api_url).status.success());

    vigil_cmd(home.path())
        .args(["--api-url", &api_url, "clients", "list"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Session expired"));

    // The 401 logged us out, so the gate now refuses locally.
    vigil_cmd(home.path())
        .args(["--api-url", &api_url, "whoami"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Not logged in"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_corrupt_session_file_does_not_lock_out() {
    let server = MockServer::start().await;
    let api_url = format!("{}/api", server.uri());
    let home = isolated();
    mock_login(&server, "admin").await;

    let sessions = home.path().join("data").join("vigil").join("sessions");
    std::fs::create_dir_all(&sessions).unwrap();
    std::fs::write(sessions.join("default.toml"), "role = [").unwrap();

    let output = login(home.path(), &api_url);
    assert!(output.status.success(), "{}", combined_output(&output));

    vigil_cmd(home.path())
        .args(["--api-url", &api_url, "logout"])
        .assert()
        .success();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_rejected_login_exits_with_auth_code() {
    let server = MockServer::start().await;
    let api_url = format!("{}/api", server.uri());
    let home = isolated();
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let output = login(home.path(), &api_url);
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("Invalid username or password"));
}
