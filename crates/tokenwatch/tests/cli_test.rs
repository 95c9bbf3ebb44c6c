//! Integration tests for the `tokenwatch` CLI binary.
//!
//! Argument parsing, help output, shell completions and error handling run
//! without an agent; the end-to-end tests stand up a local WebSocket agent.
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use assert_cmd::cargo::cargo_bin_cmd;
use futures_util::{SinkExt, StreamExt};
use predicates::prelude::*;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `tokenwatch` binary with env isolation.
///
/// Removes `TOKENWATCH_ENDPOINT` and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn tokenwatch_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("tokenwatch");
    cmd.env("HOME", "/tmp/tokenwatch-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/tokenwatch-cli-test-nonexistent")
        .env_remove("TOKENWATCH_ENDPOINT")
        .env_remove("NO_COLOR");
    cmd
}

/// Same isolation, but with config living in `dir`.
fn tokenwatch_cmd_in(dir: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = tokenwatch_cmd();
    cmd.env("HOME", dir).env("XDG_CONFIG_HOME", dir);
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// An endpoint nothing listens on.
fn refused_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{addr}")
}

/// Serve one connection: push `frames`, then report every text frame the
/// client sends until it closes.
async fn spawn_agent(frames: Vec<String>) -> (String, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (seen_tx, seen_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        for frame in frames {
            if ws.send(Message::Text(frame.into())).await.is_err() {
                return;
            }
        }
        while let Some(Ok(msg)) = ws.next().await {
            match msg {
                Message::Text(text) => {
                    let _ = seen_tx.send(text.to_string());
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    (format!("ws://{addr}"), seen_rx)
}

/// Run the binary off the async runtime.
async fn run_blocking(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.timeout(Duration::from_secs(30)).output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = tokenwatch_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    tokenwatch_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("token discovery agent")
            .and(predicate::str::contains("watch"))
            .and(predicate::str::contains("tokens"))
            .and(predicate::str::contains("task"))
            .and(predicate::str::contains("ask")),
    );
}

#[test]
fn test_version_flag() {
    tokenwatch_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tokenwatch"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    tokenwatch_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    tokenwatch_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = tokenwatch_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success(), "Expected failure for invalid subcommand");
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_blank_task_rejected_before_connecting() {
    // The endpoint is unreachable; a usage error proves no connect was tried.
    let output = tokenwatch_cmd()
        .args(["--endpoint", &refused_endpoint(), "task", "   "])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("must not be empty"), "unexpected output:\n{text}");
}

#[test]
fn test_blank_question_rejected() {
    tokenwatch_cmd()
        .args(["ask", ""])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("question"));
}

#[test]
fn test_non_websocket_endpoint_rejected() {
    tokenwatch_cmd()
        .args(["--endpoint", "http://localhost:8000", "tokens"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid endpoint"));
}

#[test]
fn test_endpoint_from_env() {
    tokenwatch_cmd()
        .env("TOKENWATCH_ENDPOINT", "ftp://nowhere")
        .args(["tokens"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("ftp://nowhere"));
}

#[test]
fn test_unreachable_agent_is_a_connection_error() {
    tokenwatch_cmd()
        .args(["--endpoint", &refused_endpoint(), "ask", "anyone there?", "--wait", "5"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("Could not connect"));
}

#[test]
fn test_invalid_output_format() {
    let output = tokenwatch_cmd()
        .args(["--output", "invalid", "tokens"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_defaults() {
    tokenwatch_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ws://localhost:8000"));
}

#[test]
fn test_config_show_applies_endpoint_flag() {
    tokenwatch_cmd()
        .args(["-e", "wss://agent.example/ws", "-o", "plain", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::diff("wss://agent.example/ws\n"));
}

#[test]
fn test_config_path() {
    tokenwatch_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_writes_file_once() {
    let dir = tempfile::tempdir().unwrap();

    tokenwatch_cmd_in(dir.path())
        .args(["-e", "ws://10.1.2.3:8000", "config", "init"])
        .assert()
        .success();

    tokenwatch_cmd_in(dir.path())
        .args(["-o", "plain", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ws://10.1.2.3:8000"));

    tokenwatch_cmd_in(dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    tokenwatch_cmd_in(dir.path())
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_subcommands_exist() {
    tokenwatch_cmd()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("init")
                .and(predicate::str::contains("show"))
                .and(predicate::str::contains("path")),
        );
}

// ── Against a live agent ────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_task_reaches_agent() {
    let (endpoint, mut seen) = spawn_agent(Vec::new()).await;

    let mut cmd = tokenwatch_cmd();
    cmd.args(["--endpoint", &endpoint, "-o", "plain", "task", "find memecoins"]);
    let output = run_blocking(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "set_task");
    assert_eq!(
        seen.recv().await.unwrap(),
        r#"{"type":"set_task","task":"find memecoins"}"#
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_tokens_lists_discovered_tokens() {
    let frames = vec![
        r#"{"type":"meta","title":"Dex Scan","description":"Top tokens"}"#.to_string(),
        r#"{"type":"token","token":{"name":"Foo","symbol":"FOO","marketCap":1500,"price":0.5}}"#
            .to_string(),
        r#"{"type":"token","token":{"name":"Foo","symbol":"FOO","marketCap":1500,"price":0.5}}"#
            .to_string(),
        "not-json".to_string(),
        r#"{"type":"token","token":{"name":"Bar","symbol":"BAR","marketCap":3000000,"price":2}}"#
            .to_string(),
    ];
    let (endpoint, _seen) = spawn_agent(frames).await;

    let mut cmd = tokenwatch_cmd();
    cmd.args([
        "--endpoint",
        &endpoint,
        "tokens",
        "--wait",
        "1",
        "--sort",
        "market-cap",
        "-o",
        "plain",
    ]);
    let output = run_blocking(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Bar\nFoo\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_fails_when_agent_drops_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.send(Message::Text(r#"{"type":"status","message":"scanning"}"#.into()))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        // Gone without a close frame.
        drop(ws);
    });

    let mut cmd = tokenwatch_cmd();
    cmd.args(["--endpoint", &format!("ws://{addr}"), "-o", "plain", "watch"]);
    let output = run_blocking(cmd).await;

    let text = combined_output(&output);
    assert_eq!(output.status.code(), Some(7), "{text}");
    assert!(text.contains("scanning"), "{text}");
    assert!(text.contains("connection lost"), "{text}");
}
