// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Algorithm loader.
//!
//! Runs exactly once, before the transport client starts. Resolves the
//! configured entry point against the hook registry, enforces the mandatory
//! hook, and captures every failure as a [`LoadResult::Failed`] reason: a
//! broken algorithm must never crash the process, only surface on the wire
//! when the lifecycle requires it.

use std::env;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::hooks::{Hook, HookTable};
use crate::registry;

/// Where the algorithm lives: a registered entry point plus an optional
/// working directory. Supplied once at startup; immutable.
#[derive(Debug, Clone)]
pub struct AlgorithmDescriptor {
    /// Working directory entered before hooks run (empty = keep the process
    /// working directory)
    pub path: PathBuf,
    /// Registered entry point selecting the algorithm
    pub entry_point: String,
}

impl AlgorithmDescriptor {
    /// Describe an algorithm by its registered entry point.
    pub fn new(entry_point: impl Into<String>) -> Self {
        Self {
            path: PathBuf::new(),
            entry_point: entry_point.into(),
        }
    }

    /// Set the algorithm working directory.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }
}

/// Outcome of the one-shot algorithm load.
///
/// A `Failed` reason is stored, not raised: the runner replays it on every
/// `initialize` instead of re-attempting the load.
#[derive(Debug)]
pub enum LoadResult {
    Loaded(HookTable),
    Failed(String),
}

impl LoadResult {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadResult::Loaded(_))
    }

    /// The stored failure reason, if loading failed.
    pub fn failure(&self) -> Option<&str> {
        match self {
            LoadResult::Loaded(_) => None,
            LoadResult::Failed(reason) => Some(reason),
        }
    }
}

/// Resolve the algorithm and populate its hook table.
pub fn load(descriptor: &AlgorithmDescriptor) -> LoadResult {
    info!(entry_point = %descriptor.entry_point, "loading algorithm");

    if let Err(reason) = enter_working_dir(&descriptor.path) {
        warn!(reason = %reason, "algorithm load failed");
        return LoadResult::Failed(reason);
    }

    let mut table = HookTable::default();
    let mut matched = false;
    for registration in registry::registrations_for(&descriptor.entry_point) {
        debug!(hook = %registration.hook, "found hook");
        table.insert(registration.hook, registration.execute);
        matched = true;
    }

    if !matched {
        let reason = format!(
            "unknown algorithm entry point `{}`",
            descriptor.entry_point
        );
        warn!(reason = %reason, "algorithm load failed");
        return LoadResult::Failed(reason);
    }

    for hook in Hook::ALL {
        if table.lookup(hook).is_some() {
            continue;
        }
        if hook.is_mandatory() {
            // No partial table: the algorithm is unusable as a whole.
            let reason = format!("unable to find mandatory hook `{}`", hook.name());
            warn!(reason = %reason, "algorithm load failed");
            return LoadResult::Failed(reason);
        }
        debug!(hook = %hook, "optional hook not implemented");
    }

    info!(entry_point = %descriptor.entry_point, hooks = ?table, "algorithm loaded");
    LoadResult::Loaded(table)
}

/// Enter the algorithm's working directory so its hooks resolve relative
/// paths against their own files. The loader runs before any other component
/// starts, so the change cannot race with other filesystem-sensitive work.
fn enter_working_dir(path: &Path) -> Result<(), String> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }
    env::set_current_dir(path)
        .map_err(|e| format!("algorithm path `{}`: {}", path.display(), e))
}
