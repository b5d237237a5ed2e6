// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Message types exchanged with the orchestrator.
//!
//! Inbound frames carry a lifecycle command with an optional opaque payload;
//! outbound frames carry a lifecycle event, an optional payload, and an
//! optional structured error. Both directions are JSON with a `command`
//! discriminator field.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable error code carried by every outbound `error` frame.
pub const ERROR_CODE_FAILED: &str = "Failed";

/// Lifecycle commands the orchestrator may send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Initialize,
    Start,
    Stop,
    Exit,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::Initialize => "initialize",
            Command::Start => "start",
            Command::Stop => "stop",
            Command::Exit => "exit",
        };
        f.write_str(name)
    }
}

/// Lifecycle events the runner reports back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Event {
    Initialized,
    Started,
    Done,
    Stopped,
    Error,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Event::Initialized => "initialized",
            Event::Started => "started",
            Event::Done => "done",
            Event::Stopped => "stopped",
            Event::Error => "error",
        };
        f.write_str(name)
    }
}

/// A command frame received from the orchestrator.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    pub command: Command,
    #[serde(default)]
    pub data: Option<Value>,
}

impl InboundMessage {
    /// Decode an inbound message from a raw frame payload.
    pub fn decode(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }
}

/// Structured error carried by an `error` frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// An event frame sent to the orchestrator.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundMessage {
    pub command: Event,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl OutboundMessage {
    fn event(command: Event) -> Self {
        Self {
            command,
            data: None,
            error: None,
        }
    }

    /// Build an `initialized` acknowledgement.
    pub fn initialized() -> Self {
        Self::event(Event::Initialized)
    }

    /// Build a `started` acknowledgement.
    pub fn started() -> Self {
        Self::event(Event::Started)
    }

    /// Build a `done` result carrying the start hook's return value.
    ///
    /// `done` always carries `data`, even when the hook returned null.
    pub fn done(data: Value) -> Self {
        Self {
            command: Event::Done,
            data: Some(data),
            error: None,
        }
    }

    /// Build a `stopped` acknowledgement.
    pub fn stopped() -> Self {
        Self::event(Event::Stopped)
    }

    /// Build an `error` frame with the stable `Failed` code.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            command: Event::Error,
            data: None,
            error: Some(ErrorInfo {
                code: ERROR_CODE_FAILED.to_string(),
                message: message.into(),
                details: None,
            }),
        }
    }

    /// Build an `error` frame with auxiliary failure text.
    pub fn error_with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            command: Event::Error,
            data: None,
            error: Some(ErrorInfo {
                code: ERROR_CODE_FAILED.to_string(),
                message: message.into(),
                details: Some(details.into()),
            }),
        }
    }

    /// Encode the message into a raw frame payload.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
