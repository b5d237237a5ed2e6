// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Minimal Example - An algorithm implementing only the mandatory hook.
//!
//! The runner skips the absent optional hooks and still completes the
//! `initialize -> start -> stop` sequence without errors.
//!
//! Run with: cargo run -p algohost-example --bin minimal_example

use serde_json::Value;

use algohost_runner::{Hook, Runner, RunnerConfig, register_hook};

/// Adds one to the `x` field of the session input.
async fn start(input: Value) -> Result<Value, String> {
    let x = input
        .get("x")
        .and_then(Value::as_i64)
        .ok_or_else(|| "missing input field `x`".to_string())?;
    Ok(Value::from(x + 1))
}

register_hook!("minimal", Hook::Start, start);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = RunnerConfig::from_env().unwrap_or_else(|_| RunnerConfig::new("minimal"));

    let exit_code = Runner::new(config).run().await;
    std::process::exit(exit_code);
}
