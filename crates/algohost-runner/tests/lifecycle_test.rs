// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Lifecycle tests against an in-process mock orchestrator.
//!
//! Each test binds its own listener, points a runner at it, and drives the
//! lifecycle over the real wire protocol.

use std::time::Duration;

use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use algohost_protocol::{read_frame, write_frame};
use algohost_runner::{Endpoint, Hook, Runner, RunnerConfig, register_hook};

// ============================================================================
// Test algorithms
// ============================================================================

async fn noop(_input: Value) -> Result<Value, String> {
    Ok(Value::Null)
}

/// Adds one to the `x` field of the retained input.
async fn add_one(input: Value) -> Result<Value, String> {
    let x = input
        .get("x")
        .and_then(Value::as_i64)
        .ok_or_else(|| "missing input field `x`".to_string())?;
    Ok(json!(x + 1))
}

async fn echo(input: Value) -> Result<Value, String> {
    Ok(input)
}

async fn refuse(_input: Value) -> Result<Value, String> {
    Err("input vector is empty".to_string())
}

register_hook!("calc", Hook::Initialize, noop);
register_hook!("calc", Hook::Start, add_one);
register_hook!("calc", Hook::Stop, noop);
register_hook!("calc", Hook::Exit, noop);

register_hook!("echo", Hook::Start, echo);

register_hook!("setup-only", Hook::Initialize, noop);
register_hook!("setup-only", Hook::Stop, noop);

register_hook!("faulty-start", Hook::Initialize, noop);
register_hook!("faulty-start", Hook::Start, refuse);
register_hook!("faulty-start", Hook::Stop, noop);

register_hook!("faulty-init", Hook::Initialize, refuse);
register_hook!("faulty-init", Hook::Start, add_one);

register_hook!("faulty-exit", Hook::Start, echo);
register_hook!("faulty-exit", Hook::Exit, refuse);

// ============================================================================
// Mock orchestrator
// ============================================================================

struct Orchestrator {
    listener: TcpListener,
}

struct Session {
    stream: TcpStream,
}

impl Orchestrator {
    async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        Self { listener }
    }

    /// Spawn a runner for `entry_point` connected to this orchestrator.
    fn spawn_runner(&self, entry_point: &str) -> JoinHandle<i32> {
        let addr = self.listener.local_addr().unwrap();
        let config = RunnerConfig::new(entry_point)
            .with_endpoint(Endpoint::new("tcp", addr.ip().to_string(), addr.port()))
            .with_reconnect_interval_ms(50)
            .with_connect_timeout_ms(1_000);
        let runner = Runner::new(config);
        tokio::spawn(runner.run())
    }

    async fn accept(&self) -> Session {
        let (stream, _) = tokio::time::timeout(Duration::from_secs(5), self.listener.accept())
            .await
            .expect("timed out waiting for runner connection")
            .unwrap();
        Session { stream }
    }
}

impl Session {
    async fn command(&mut self, payload: Value) {
        let bytes = serde_json::to_vec(&payload).unwrap();
        write_frame(&mut self.stream, &bytes).await.unwrap();
    }

    async fn event(&mut self) -> Value {
        let payload = tokio::time::timeout(Duration::from_secs(5), read_frame(&mut self.stream))
            .await
            .expect("timed out waiting for runner event")
            .unwrap();
        serde_json::from_slice(&payload).unwrap()
    }

    async fn expect(&mut self, command: &str) -> Value {
        let event = self.event().await;
        assert_eq!(event["command"], command, "unexpected event: {}", event);
        event
    }

    async fn expect_error(&mut self) -> String {
        let event = self.expect("error").await;
        assert_eq!(event["error"]["code"], "Failed");
        event["error"]["message"].as_str().unwrap().to_string()
    }
}

async fn finish(runner: JoinHandle<i32>) -> i32 {
    tokio::time::timeout(Duration::from_secs(5), runner)
        .await
        .expect("runner did not exit")
        .unwrap()
}

// ============================================================================
// Lifecycle tests
// ============================================================================

#[tokio::test]
async fn test_full_lifecycle_sequence() {
    let orchestrator = Orchestrator::bind().await;
    let runner = orchestrator.spawn_runner("calc");
    let mut session = orchestrator.accept().await;

    session.command(json!({"command": "initialize", "data": {"x": 1}})).await;
    session.expect("initialized").await;

    session.command(json!({"command": "start"})).await;
    session.expect("started").await;
    let done = session.expect("done").await;
    assert_eq!(done["data"], json!(2));

    session.command(json!({"command": "stop"})).await;
    session.expect("stopped").await;

    session.command(json!({"command": "exit"})).await;
    assert_eq!(finish(runner).await, 0);
}

#[tokio::test]
async fn test_optional_hooks_omitted() {
    let orchestrator = Orchestrator::bind().await;
    let runner = orchestrator.spawn_runner("echo");
    let mut session = orchestrator.accept().await;

    // `echo` implements only `start`: the sequence must still complete with
    // no error frames.
    session.command(json!({"command": "initialize", "data": {"k": "v"}})).await;
    session.expect("initialized").await;

    session.command(json!({"command": "start"})).await;
    session.expect("started").await;
    let done = session.expect("done").await;
    assert_eq!(done["data"], json!({"k": "v"}));

    session.command(json!({"command": "stop"})).await;
    session.expect("stopped").await;

    session.command(json!({"command": "exit"})).await;
    assert_eq!(finish(runner).await, 0);
}

#[tokio::test]
async fn test_missing_mandatory_hook() {
    let orchestrator = Orchestrator::bind().await;
    let runner = orchestrator.spawn_runner("setup-only");
    let mut session = orchestrator.accept().await;

    // The load failed as a whole, so initialize replays the load error...
    session.command(json!({"command": "initialize", "data": {}})).await;
    let message = session.expect_error().await;
    assert!(message.contains("mandatory hook `start`"), "got: {}", message);

    // ...and start reports the missing hook with no `started`/`done`.
    session.command(json!({"command": "start"})).await;
    let message = session.expect_error().await;
    assert!(message.contains("mandatory hook `start`"), "got: {}", message);

    session.command(json!({"command": "exit"})).await;
    assert_eq!(finish(runner).await, 0);
}

#[tokio::test]
async fn test_unknown_entry_point() {
    let orchestrator = Orchestrator::bind().await;
    let runner = orchestrator.spawn_runner("ghost");
    let mut session = orchestrator.accept().await;

    session.command(json!({"command": "initialize"})).await;
    let message = session.expect_error().await;
    assert!(
        message.contains("unknown algorithm entry point `ghost`"),
        "got: {}",
        message
    );

    session.command(json!({"command": "exit"})).await;
    finish(runner).await;
}

#[tokio::test]
async fn test_start_hook_failure() {
    let orchestrator = Orchestrator::bind().await;
    let runner = orchestrator.spawn_runner("faulty-start");
    let mut session = orchestrator.accept().await;

    session.command(json!({"command": "initialize", "data": {}})).await;
    session.expect("initialized").await;

    // Exactly one error after `started`, and no `done`.
    session.command(json!({"command": "start"})).await;
    session.expect("started").await;
    let message = session.expect_error().await;
    assert!(message.contains("hook `start` failed"), "got: {}", message);
    assert!(message.contains("input vector is empty"), "got: {}", message);

    // The runner is still alive and serviceable.
    session.command(json!({"command": "stop"})).await;
    session.expect("stopped").await;

    session.command(json!({"command": "exit"})).await;
    assert_eq!(finish(runner).await, 0);
}

#[tokio::test]
async fn test_stop_is_idempotent() {
    let orchestrator = Orchestrator::bind().await;
    let runner = orchestrator.spawn_runner("calc");
    let mut session = orchestrator.accept().await;

    session.command(json!({"command": "stop"})).await;
    session.expect("stopped").await;
    session.command(json!({"command": "stop"})).await;
    session.expect("stopped").await;

    session.command(json!({"command": "exit"})).await;
    assert_eq!(finish(runner).await, 0);
}

#[tokio::test]
async fn test_start_without_initialize_runs_with_null_input() {
    let orchestrator = Orchestrator::bind().await;
    let runner = orchestrator.spawn_runner("echo");
    let mut session = orchestrator.accept().await;

    session.command(json!({"command": "start"})).await;
    session.expect("started").await;
    let done = session.expect("done").await;
    assert_eq!(done["data"], Value::Null);

    session.command(json!({"command": "exit"})).await;
    finish(runner).await;
}

#[tokio::test]
async fn test_retained_input_survives_failing_initialize() {
    let orchestrator = Orchestrator::bind().await;
    let runner = orchestrator.spawn_runner("faulty-init");
    let mut session = orchestrator.accept().await;

    session.command(json!({"command": "initialize", "data": {"x": 41}})).await;
    let message = session.expect_error().await;
    assert!(message.contains("hook `initialize` failed"), "got: {}", message);

    // The session input was cached before the hook ran.
    session.command(json!({"command": "start"})).await;
    session.expect("started").await;
    let done = session.expect("done").await;
    assert_eq!(done["data"], json!(42));

    session.command(json!({"command": "exit"})).await;
    finish(runner).await;
}

#[tokio::test]
async fn test_exit_code_from_payload() {
    let orchestrator = Orchestrator::bind().await;
    let runner = orchestrator.spawn_runner("echo");
    let mut session = orchestrator.accept().await;

    session.command(json!({"command": "exit", "data": {"exitCode": 3}})).await;
    assert_eq!(finish(runner).await, 3);
}

#[tokio::test]
async fn test_exit_hook_failure_still_terminates() {
    let orchestrator = Orchestrator::bind().await;
    let runner = orchestrator.spawn_runner("faulty-exit");
    let mut session = orchestrator.accept().await;

    session.command(json!({"command": "exit"})).await;
    let message = session.expect_error().await;
    assert!(message.contains("hook `exit` failed"), "got: {}", message);

    assert_eq!(finish(runner).await, 0);
}

#[tokio::test]
async fn test_commands_survive_reconnect() {
    let orchestrator = Orchestrator::bind().await;
    let runner = orchestrator.spawn_runner("calc");

    let mut session = orchestrator.accept().await;
    session.command(json!({"command": "initialize", "data": {"x": 9}})).await;
    session.expect("initialized").await;

    // Orchestrator restarts: drop the session and accept the retry.
    drop(session);
    let mut session = orchestrator.accept().await;

    // A command sent on the new session is still processed, with the
    // retained input intact.
    session.command(json!({"command": "start"})).await;
    session.expect("started").await;
    let done = session.expect("done").await;
    assert_eq!(done["data"], json!(10));

    session.command(json!({"command": "exit"})).await;
    assert_eq!(finish(runner).await, 0);
}
