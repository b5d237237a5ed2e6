// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Runner configuration.

use std::env;

use algohost_protocol::{ClientConfig, Endpoint};

use crate::error::{Result, RunnerError};
use crate::loader::AlgorithmDescriptor;

/// Default orchestrator port.
pub const DEFAULT_PORT: u16 = 9400;

/// Runner configuration: which algorithm to host and where the orchestrator
/// lives. Read once at startup; immutable afterwards.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// The hosted algorithm
    pub algorithm: AlgorithmDescriptor,
    /// Orchestrator endpoint
    pub endpoint: Endpoint,
    /// Fixed interval between reconnect attempts in milliseconds (default: 5_000)
    pub reconnect_interval_ms: u64,
    /// Connection timeout in milliseconds (default: 10_000)
    pub connect_timeout_ms: u64,
}

impl RunnerConfig {
    /// Load configuration from environment variables.
    ///
    /// # Required Environment Variables
    /// - `ALGOHOST_ENTRY_POINT` - Registered entry point of the hosted algorithm
    ///
    /// # Optional Environment Variables
    /// - `ALGOHOST_ALGORITHM_PATH` - Algorithm working directory (default: process cwd)
    /// - `ALGOHOST_SOCKET_URL` - Explicit orchestrator URL; overrides the triple below
    /// - `ALGOHOST_SOCKET_PROTOCOL` - Endpoint protocol (default: "tcp")
    /// - `ALGOHOST_SOCKET_HOST` - Endpoint host (default: "127.0.0.1")
    /// - `ALGOHOST_SOCKET_PORT` - Endpoint port (default: 9400)
    /// - `ALGOHOST_RECONNECT_INTERVAL_MS` - Reconnect backoff (default: 5000)
    /// - `ALGOHOST_CONNECT_TIMEOUT_MS` - Connection timeout (default: 10000)
    pub fn from_env() -> Result<Self> {
        let entry_point = env::var("ALGOHOST_ENTRY_POINT")
            .map_err(|_| RunnerError::Config("ALGOHOST_ENTRY_POINT is required".to_string()))?;

        let path = env::var("ALGOHOST_ALGORITHM_PATH").unwrap_or_default();

        let endpoint = match env::var("ALGOHOST_SOCKET_URL") {
            Ok(url) => Endpoint::parse(&url)
                .map_err(|e| RunnerError::Config(format!("invalid ALGOHOST_SOCKET_URL: {}", e)))?,
            Err(_) => {
                let protocol =
                    env::var("ALGOHOST_SOCKET_PROTOCOL").unwrap_or_else(|_| "tcp".to_string());
                let host =
                    env::var("ALGOHOST_SOCKET_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
                let port = match env::var("ALGOHOST_SOCKET_PORT") {
                    Ok(value) => value.parse().map_err(|e| {
                        RunnerError::Config(format!("invalid ALGOHOST_SOCKET_PORT: {}", e))
                    })?,
                    Err(_) => DEFAULT_PORT,
                };
                Endpoint::new(protocol, host, port)
            }
        };

        let reconnect_interval_ms = env::var("ALGOHOST_RECONNECT_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5_000);

        let connect_timeout_ms = env::var("ALGOHOST_CONNECT_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10_000);

        Ok(Self {
            algorithm: AlgorithmDescriptor::new(entry_point).with_path(path),
            endpoint,
            reconnect_interval_ms,
            connect_timeout_ms,
        })
    }

    /// Create a configuration for the given entry point with local defaults.
    pub fn new(entry_point: impl Into<String>) -> Self {
        Self {
            algorithm: AlgorithmDescriptor::new(entry_point),
            endpoint: Endpoint::new("tcp", "127.0.0.1", DEFAULT_PORT),
            reconnect_interval_ms: 5_000,
            connect_timeout_ms: 10_000,
        }
    }

    /// Set the algorithm working directory.
    pub fn with_algorithm_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.algorithm.path = path.into();
        self
    }

    /// Set the orchestrator endpoint.
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Set the reconnect backoff interval.
    pub fn with_reconnect_interval_ms(mut self, interval_ms: u64) -> Self {
        self.reconnect_interval_ms = interval_ms;
        self
    }

    /// Set the connection timeout.
    pub fn with_connect_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.connect_timeout_ms = timeout_ms;
        self
    }

    /// Transport-client configuration derived from this runner configuration.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint: self.endpoint.clone(),
            reconnect_interval_ms: self.reconnect_interval_ms,
            connect_timeout_ms: self.connect_timeout_ms,
        }
    }
}
