// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Algohost Runner - sidecar runtime hosting algorithm code for an
//! orchestrator.
//!
//! The runner binds a set of named lifecycle hooks (`initialize`, `start`,
//! `stop`, `exit`) from algorithm code into a dispatch table, connects to the
//! orchestrator over a persistent duplex connection, and translates inbound
//! commands into hook invocations and outbound acknowledgements. Any failure
//! while loading or executing a hook is reported as a structured `error`
//! frame; nothing short of an explicit `exit` command terminates the process.
//!
//! # Features
//!
//! - **Hook binding**: compile-time hook registration per entry point, with
//!   mandatory (`start`) vs. optional hooks enforced at load time
//! - **Self-healing transport**: fixed-interval reconnect, forever, without
//!   losing command ordering
//! - **Uniform error capture**: load failures, missing hooks, and hook
//!   errors all become `error` frames with the stable `Failed` code
//! - **In-order dispatch**: at most one command is ever in flight
//!
//! # Quick Start
//!
//! ```ignore
//! use algohost_runner::{Hook, Runner, RunnerConfig, register_hook};
//! use serde_json::Value;
//!
//! async fn start(input: Value) -> Result<Value, String> {
//!     let x = input.get("x").and_then(Value::as_i64).ok_or("missing x")?;
//!     Ok(Value::from(x + 1))
//! }
//!
//! register_hook!("main", Hook::Start, start);
//!
//! #[tokio::main]
//! async fn main() {
//!     let runner = Runner::from_env().expect("configuration");
//!     let exit_code = runner.run().await;
//!     std::process::exit(exit_code);
//! }
//! ```
//!
//! # Configuration
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `ALGOHOST_ENTRY_POINT` | Yes | - | Registered algorithm entry point |
//! | `ALGOHOST_ALGORITHM_PATH` | No | process cwd | Algorithm working directory |
//! | `ALGOHOST_SOCKET_URL` | No | - | Explicit orchestrator URL |
//! | `ALGOHOST_SOCKET_PROTOCOL` | No | `tcp` | Endpoint protocol |
//! | `ALGOHOST_SOCKET_HOST` | No | `127.0.0.1` | Endpoint host |
//! | `ALGOHOST_SOCKET_PORT` | No | `9400` | Endpoint port |
//! | `ALGOHOST_RECONNECT_INTERVAL_MS` | No | `5000` | Reconnect backoff |
//! | `ALGOHOST_CONNECT_TIMEOUT_MS` | No | `10000` | Connection timeout |

mod config;
mod error;
mod hooks;
mod loader;
mod runner;

pub mod registry;

// Main types
pub use config::{DEFAULT_PORT, RunnerConfig};
pub use error::{Result, RunnerError};
pub use hooks::{Hook, HookFn, HookFuture, HookTable};
pub use loader::{AlgorithmDescriptor, LoadResult};
pub use runner::{Runner, RunnerState};

// Re-export protocol types for orchestrator-facing code and tests
pub use algohost_protocol::{
    ClientConfig, ClientError, Command, Endpoint, ErrorInfo, Event, InboundMessage,
    OutboundMessage, TransportClient, TransportEvent,
};

// Re-exported for the register_hook! macro expansion
pub use inventory;
