// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Self-healing transport client for the orchestrator connection.
//!
//! The client owns exactly one logical connection. `run` drives an indefinite
//! connect-and-read loop: every well-formed frame is surfaced as a typed
//! [`TransportEvent`] on an mpsc channel, and after any disconnect the loop
//! sleeps a fixed interval and retries until [`TransportClient::stop`] is
//! called. Outbound sends are best-effort against the currently open
//! connection and fail with [`ClientError::NotConnected`] otherwise.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::frame::{self, FrameError};
use crate::message::{InboundMessage, OutboundMessage};

/// Errors that can occur in the transport client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no connection established")]
    NotConnected,

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("connection timed out after {0}ms")]
    Timeout(u64),
}

/// Orchestrator endpoint: either parsed from an explicit URL or built from
/// a (protocol, host, port) triple. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    protocol: String,
    host: String,
    port: u16,
}

impl Endpoint {
    /// Build an endpoint from its parts.
    pub fn new(
        protocol: impl Into<String>,
        host: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            protocol: protocol.into(),
            host: host.into(),
            port,
        }
    }

    /// Parse an endpoint from a `protocol://host:port` URL.
    pub fn parse(url: &str) -> Result<Self, ClientError> {
        let invalid = || ClientError::InvalidEndpoint(url.to_string());

        let (protocol, authority) = url.split_once("://").ok_or_else(invalid)?;
        let (host, port) = authority.rsplit_once(':').ok_or_else(invalid)?;
        if protocol.is_empty() || host.is_empty() {
            return Err(invalid());
        }
        let port = port.parse().map_err(|_| invalid())?;

        Ok(Self::new(protocol, host, port))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host:port` pair used to open the TCP connection.
    pub fn authority(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.protocol, self.host, self.port)
    }
}

/// Configuration for the transport client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Orchestrator endpoint to connect to
    pub endpoint: Endpoint,
    /// Fixed interval between reconnect attempts in milliseconds
    pub reconnect_interval_ms: u64,
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::new("tcp", "127.0.0.1", 9400),
            reconnect_interval_ms: 5_000,
            connect_timeout_ms: 10_000,
        }
    }
}

/// Semantic events surfaced by the transport client.
///
/// Delivered through a single mpsc channel so the owner observes connection
/// state changes and inbound commands at one dispatch point, in order.
#[derive(Debug)]
pub enum TransportEvent {
    Connected,
    Disconnected,
    Message(InboundMessage),
}

/// Transport client owning one logical connection to the orchestrator.
pub struct TransportClient {
    config: ClientConfig,
    writer: Mutex<Option<OwnedWriteHalf>>,
    cancel: CancellationToken,
}

impl TransportClient {
    /// Create a new client with the given configuration
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            writer: Mutex::new(None),
            cancel: CancellationToken::new(),
        }
    }

    /// The configured orchestrator endpoint.
    pub fn endpoint(&self) -> &Endpoint {
        &self.config.endpoint
    }

    /// Run the connect-and-read loop until [`stop`](Self::stop) is called or
    /// the event receiver is dropped.
    #[instrument(skip(self, events), fields(endpoint = %self.config.endpoint))]
    pub async fn run(&self, events: mpsc::Sender<TransportEvent>) {
        let interval = Duration::from_millis(self.config.reconnect_interval_ms);

        loop {
            if self.cancel.is_cancelled() || events.is_closed() {
                break;
            }

            match self.connect_once().await {
                Ok(stream) => {
                    let (reader, writer) = stream.into_split();
                    *self.writer.lock().await = Some(writer);
                    info!("connected to orchestrator");
                    if events.send(TransportEvent::Connected).await.is_err() {
                        break;
                    }

                    self.read_frames(reader, &events).await;

                    self.writer.lock().await.take();
                    info!("disconnected from orchestrator");
                    if events.send(TransportEvent::Disconnected).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "connection attempt failed");
                }
            }

            if self.cancel.is_cancelled() {
                break;
            }
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }

        debug!("transport loop stopped");
    }

    async fn connect_once(&self) -> Result<TcpStream, ClientError> {
        let timeout = Duration::from_millis(self.config.connect_timeout_ms);
        let connecting = TcpStream::connect(self.config.endpoint.authority());

        tokio::time::timeout(timeout, connecting)
            .await
            .map_err(|_| ClientError::Timeout(self.config.connect_timeout_ms))?
            .map_err(ClientError::Io)
    }

    /// Read frames until the connection closes, errors, or the client is
    /// stopped. Malformed frames are dropped with a diagnostic; they never
    /// tear down the loop.
    async fn read_frames(&self, mut reader: OwnedReadHalf, events: &mpsc::Sender<TransportEvent>) {
        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => return,
                result = frame::read_frame(&mut reader) => match result {
                    Ok(payload) => match InboundMessage::decode(&payload) {
                        Ok(message) => {
                            debug!(command = %message.command, "message received");
                            if events.send(TransportEvent::Message(message)).await.is_err() {
                                return;
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "dropping malformed inbound frame");
                        }
                    },
                    Err(FrameError::ConnectionClosed) => {
                        debug!("connection closed by peer");
                        return;
                    }
                    Err(e) => {
                        warn!(error = %e, "connection error");
                        return;
                    }
                },
            }
        }
    }

    /// Serialize and write a message on the current connection.
    ///
    /// Fails with [`ClientError::NotConnected`] when no connection is open;
    /// callers decide whether to drop, queue, or retry.
    pub async fn send(&self, message: &OutboundMessage) -> Result<(), ClientError> {
        let payload = message.encode()?;
        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(ClientError::NotConnected)?;
        frame::write_frame(writer, &payload).await?;
        debug!(command = %message.command, "message sent");
        Ok(())
    }

    /// Stop the retry loop. Idempotent; does not flush in-flight sends.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Whether [`stop`](Self::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether a connection is currently open.
    pub async fn is_connected(&self) -> bool {
        self.writer.lock().await.is_some()
    }
}
