// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Basic Example - An algorithm implementing all four lifecycle hooks.
//!
//! This example shows:
//! - Hook registration for one entry point
//! - Setup state carried from `initialize` to `start` by the runner
//! - A `start` hook returning a result the orchestrator receives in `done`
//!
//! Run with: cargo run -p algohost-example --bin basic_example
//!
//! The runner connects to `tcp://127.0.0.1:9400` unless overridden through
//! the `ALGOHOST_SOCKET_*` environment variables.

use serde_json::{Value, json};
use tracing::info;

use algohost_runner::{Hook, Runner, RunnerConfig, register_hook};

async fn initialize(input: Value) -> Result<Value, String> {
    info!(input = %input, "algorithm initializing");
    Ok(Value::Null)
}

/// Sums the `values` array of the session input.
async fn start(input: Value) -> Result<Value, String> {
    let values = input
        .get("values")
        .and_then(Value::as_array)
        .ok_or_else(|| "missing input field `values`".to_string())?;

    let mut sum = 0.0;
    for value in values {
        sum += value
            .as_f64()
            .ok_or_else(|| format!("non-numeric value in `values`: {}", value))?;
    }

    Ok(json!({ "sum": sum, "count": values.len() }))
}

async fn stop(_input: Value) -> Result<Value, String> {
    info!("algorithm stopping");
    Ok(Value::Null)
}

async fn exit(_input: Value) -> Result<Value, String> {
    info!("algorithm exiting");
    Ok(Value::Null)
}

register_hook!("basic", Hook::Initialize, initialize);
register_hook!("basic", Hook::Start, start);
register_hook!("basic", Hook::Stop, stop);
register_hook!("basic", Hook::Exit, exit);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Environment configuration wins; fall back to local defaults so the
    // example runs against an orchestrator on this machine.
    let config = RunnerConfig::from_env().unwrap_or_else(|_| RunnerConfig::new("basic"));

    let exit_code = Runner::new(config).run().await;
    std::process::exit(exit_code);
}
