// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Algohost Protocol - JSON framing and transport for algorithm runners
//!
//! This crate provides the wire protocol between a hosted algorithm runner
//! and its orchestrator:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    algohost-protocol                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Messages: lifecycle commands and events (serde)            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Framing: 4-byte length prefix + JSON payload               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Transport: TCP with fixed-interval reconnect (tokio)       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The orchestrator drives the runner with `initialize` / `start` / `stop` /
//! `exit` commands; the runner reports `initialized` / `started` / `done` /
//! `stopped` / `error` events. The [`client::TransportClient`] keeps exactly
//! one logical connection alive, retrying forever with a fixed backoff until
//! stopped, and surfaces inbound traffic as typed [`client::TransportEvent`]s
//! on an mpsc channel.

pub mod client;
pub mod frame;
pub mod message;

// Re-export main types
pub use client::{ClientConfig, ClientError, Endpoint, TransportClient, TransportEvent};
pub use frame::{FrameError, MAX_FRAME_SIZE, read_frame, write_frame};
pub use message::{
    Command, ERROR_CODE_FAILED, ErrorInfo, Event, InboundMessage, OutboundMessage,
};
