// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Runner lifecycle state machine.
//!
//! The runner owns the loaded hook table and the transport client, wires
//! inbound commands to lifecycle transitions, and reports the outcome of
//! every hook invocation back to the orchestrator. Commands are processed
//! strictly one at a time, in receipt order: the transport task reads frames
//! and the runner task drains the event channel, and nothing else touches the
//! lifecycle state.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

use algohost_protocol::{
    Command, InboundMessage, OutboundMessage, TransportClient, TransportEvent,
};

use crate::config::RunnerConfig;
use crate::error::{Result, RunnerError};
use crate::hooks::{Hook, HookFn};
use crate::loader::{self, LoadResult};

/// Algorithm lifecycle state. Exactly one per process, mutated only by the
/// runner in response to inbound commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    /// No usable algorithm (load failed)
    Unloaded,
    /// Algorithm loaded, not yet initialized
    Loaded,
    Initialized,
    Running,
    Stopped,
    /// Terminal: an `exit` command was processed
    Exited,
}

impl fmt::Display for RunnerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunnerState::Unloaded => "unloaded",
            RunnerState::Loaded => "loaded",
            RunnerState::Initialized => "initialized",
            RunnerState::Running => "running",
            RunnerState::Stopped => "stopped",
            RunnerState::Exited => "exited",
        };
        f.write_str(name)
    }
}

/// Hosts one algorithm and exposes its lifecycle to the orchestrator.
///
/// # Example
///
/// ```ignore
/// use algohost_runner::{Runner, RunnerConfig};
///
/// #[tokio::main]
/// async fn main() {
///     let config = RunnerConfig::from_env().expect("configuration");
///     let exit_code = Runner::new(config).run().await;
///     std::process::exit(exit_code);
/// }
/// ```
pub struct Runner {
    transport: Arc<TransportClient>,
    load: LoadResult,
    state: RunnerState,
    /// Payload supplied with `initialize`, reused as the `start` input
    input: Option<Value>,
    exit_code: i32,
}

impl Runner {
    /// Load the configured algorithm and prepare the transport client.
    ///
    /// Loading happens here, exactly once, before any connection is opened;
    /// a load failure is stored and replayed on the wire, never raised.
    pub fn new(config: RunnerConfig) -> Self {
        let load = loader::load(&config.algorithm);
        let state = if load.is_loaded() {
            RunnerState::Loaded
        } else {
            RunnerState::Unloaded
        };

        Self {
            transport: Arc::new(TransportClient::new(config.client_config())),
            load,
            state,
            input: None,
            exit_code: 0,
        }
    }

    /// Create a runner from environment variables.
    ///
    /// See [`RunnerConfig::from_env`] for the recognized variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(RunnerConfig::from_env()?))
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunnerState {
        self.state
    }

    /// Outcome of the one-shot algorithm load.
    pub fn load_result(&self) -> &LoadResult {
        &self.load
    }

    /// Connect to the orchestrator and process commands until an `exit`
    /// command arrives. Returns the exit code to terminate the process with.
    #[instrument(skip(self), fields(endpoint = %self.transport.endpoint()))]
    pub async fn run(mut self) -> i32 {
        let (events_tx, mut events_rx) = mpsc::channel(32);
        let transport = self.transport.clone();
        let transport_task = tokio::spawn(async move { transport.run(events_tx).await });

        while let Some(event) = events_rx.recv().await {
            match event {
                TransportEvent::Connected => {
                    debug!(state = %self.state, "orchestrator session opened");
                }
                TransportEvent::Disconnected => {
                    debug!(state = %self.state, "orchestrator session closed");
                }
                TransportEvent::Message(message) => {
                    self.dispatch(message).await;
                    if self.state == RunnerState::Exited {
                        break;
                    }
                }
            }
        }

        drop(events_rx);
        let _ = transport_task.await;
        info!(exit_code = self.exit_code, "runner finished");
        self.exit_code
    }

    /// Handle one inbound command. Every failure path ends in an outbound
    /// `error` frame; nothing here terminates the process.
    async fn dispatch(&mut self, message: InboundMessage) {
        debug!(command = %message.command, state = %self.state, "dispatching command");
        match message.command {
            Command::Initialize => self.handle_initialize(message.data).await,
            Command::Start => self.handle_start().await,
            Command::Stop => self.handle_stop(message.data).await,
            Command::Exit => self.handle_exit(message.data).await,
        }
    }

    async fn handle_initialize(&mut self, data: Option<Value>) {
        let hook = match &self.load {
            LoadResult::Failed(reason) => {
                let reason = reason.clone();
                self.report(RunnerError::Load(reason)).await;
                return;
            }
            LoadResult::Loaded(table) => table.lookup(Hook::Initialize),
        };

        // Retain the session input before the hook runs; a failing
        // initialize hook must not lose it.
        self.input = data.clone();

        if let Some(hook) = hook
            && let Err(message) = hook(data.unwrap_or(Value::Null)).await
        {
            self.report(RunnerError::HookExecution {
                hook: Hook::Initialize.name(),
                message,
            })
            .await;
            return;
        }

        self.send(OutboundMessage::initialized()).await;
        self.state = RunnerState::Initialized;
    }

    async fn handle_start(&mut self) {
        // A failed load behaves as if no algorithm were loaded at all.
        let Some(hook) = self.lookup(Hook::Start) else {
            self.report(RunnerError::MissingHook(Hook::Start.name())).await;
            return;
        };

        self.send(OutboundMessage::started()).await;

        let input = self.input.clone().unwrap_or(Value::Null);
        match hook(input).await {
            Ok(output) => {
                self.send(OutboundMessage::done(output)).await;
                self.state = RunnerState::Running;
            }
            Err(message) => {
                self.report(RunnerError::HookExecution {
                    hook: Hook::Start.name(),
                    message,
                })
                .await;
            }
        }
    }

    async fn handle_stop(&mut self, data: Option<Value>) {
        if let Some(hook) = self.lookup(Hook::Stop)
            && let Err(message) = hook(data.unwrap_or(Value::Null)).await
        {
            self.report(RunnerError::HookExecution {
                hook: Hook::Stop.name(),
                message,
            })
            .await;
            return;
        }

        self.send(OutboundMessage::stopped()).await;
        self.state = RunnerState::Stopped;
    }

    async fn handle_exit(&mut self, data: Option<Value>) {
        self.exit_code = data
            .as_ref()
            .and_then(|payload| payload.get("exitCode"))
            .and_then(Value::as_i64)
            .unwrap_or(0) as i32;

        if let Some(hook) = self.lookup(Hook::Exit)
            && let Err(message) = hook(data.unwrap_or(Value::Null)).await
        {
            // Reported before the connection is torn down.
            self.report(RunnerError::HookExecution {
                hook: Hook::Exit.name(),
                message,
            })
            .await;
        }

        // No further reconnect attempts; the runner loop ends with this command.
        self.transport.stop();

        info!(exit_code = self.exit_code, "exit command received");
        self.state = RunnerState::Exited;
    }

    /// Look up a bound hook; a failed load behaves as an empty table.
    fn lookup(&self, hook: Hook) -> Option<HookFn> {
        match &self.load {
            LoadResult::Failed(_) => None,
            LoadResult::Loaded(table) => table.lookup(hook),
        }
    }

    /// Best-effort send: outbound status updates are only meaningful to a
    /// live session, so they are dropped rather than queued across
    /// reconnects.
    async fn send(&self, message: OutboundMessage) {
        if let Err(e) = self.transport.send(&message).await {
            warn!(command = %message.command, error = %e, "dropping outbound message");
        }
    }

    /// Convert a failure into an outbound `error` frame.
    async fn report(&self, failure: RunnerError) {
        error!(error = %failure, state = %self.state, "command failed");
        self.send(OutboundMessage::error(failure.to_string())).await;
    }
}
