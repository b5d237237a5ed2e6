// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Runner-specific error types.

use algohost_protocol::ClientError;
use thiserror::Error;

/// Errors that can occur in the runner.
///
/// Load, missing-hook, and hook-execution failures are never fatal: the
/// runner converts them into outbound `error` frames with the stable
/// `Failed` code. Only configuration errors abort startup.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Configuration error (missing or invalid environment variable)
    #[error("configuration error: {0}")]
    Config(String),

    /// Algorithm module resolution failed; detected once at load time and
    /// replayed on every `initialize`
    #[error("algorithm load error: {0}")]
    Load(String),

    /// A mandatory hook was absent when a command needed it
    #[error("unable to find mandatory hook `{0}`")]
    MissingHook(&'static str),

    /// A bound hook returned an error
    #[error("hook `{hook}` failed: {message}")]
    HookExecution {
        /// Name of the failing hook
        hook: &'static str,
        /// Error text returned by the hook
        message: String,
    },

    /// Transport-level failure surfaced by the protocol client
    #[error("transport error: {0}")]
    Transport(#[from] ClientError),
}

/// Type alias for runner results.
pub type Result<T> = std::result::Result<T, RunnerError>;
