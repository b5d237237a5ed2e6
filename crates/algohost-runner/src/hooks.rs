// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Lifecycle hook enumeration and dispatch table.
//!
//! The hook set is closed and known at compile time; only `start` is
//! mandatory. The [`HookTable`] is populated once by the loader and
//! read-only afterwards; the runner addresses hooks through the typed
//! [`Hook`] enum, never by string.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

/// A lifecycle phase the hosted algorithm may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    Initialize,
    Start,
    Stop,
    Exit,
}

impl Hook {
    /// The full hook enumeration, in lifecycle order.
    pub const ALL: [Hook; 4] = [Hook::Initialize, Hook::Start, Hook::Stop, Hook::Exit];

    /// The hook's name as algorithm authors spell it.
    pub fn name(self) -> &'static str {
        match self {
            Hook::Initialize => "initialize",
            Hook::Start => "start",
            Hook::Stop => "stop",
            Hook::Exit => "exit",
        }
    }

    /// Whether the algorithm is unusable without this hook.
    ///
    /// `start` is the unit of work the orchestrator schedules; its absence is
    /// an authoring error surfaced at load time. The other hooks are setup
    /// and teardown that many algorithms do not need.
    pub fn is_mandatory(self) -> bool {
        matches!(self, Hook::Start)
    }

    /// Resolve a hook from its name.
    pub fn from_name(name: &str) -> Option<Hook> {
        Hook::ALL.into_iter().find(|hook| hook.name() == name)
    }

    fn index(self) -> usize {
        match self {
            Hook::Initialize => 0,
            Hook::Start => 1,
            Hook::Stop => 2,
            Hook::Exit => 3,
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Future returned by a hook invocation.
pub type HookFuture = Pin<Box<dyn Future<Output = Result<Value, String>> + Send>>;

/// A bound hook: one opaque JSON payload in, one opaque JSON value (or an
/// error string) out. Async so hooks can await; sync work simply runs inline
/// on the command context, where at most one command is in flight.
pub type HookFn = fn(Value) -> HookFuture;

/// Dispatch table mapping each [`Hook`] to its bound implementation.
#[derive(Default, Clone)]
pub struct HookTable {
    entries: [Option<HookFn>; 4],
}

impl HookTable {
    /// Bind a hook. Called only by the loader during table construction.
    pub(crate) fn insert(&mut self, hook: Hook, func: HookFn) {
        self.entries[hook.index()] = Some(func);
    }

    /// Look up the bound implementation for a hook, if any.
    pub fn lookup(&self, hook: Hook) -> Option<HookFn> {
        self.entries[hook.index()]
    }

    /// Iterate over the hooks that are bound.
    pub fn bound(&self) -> impl Iterator<Item = Hook> + '_ {
        Hook::ALL
            .into_iter()
            .filter(|hook| self.lookup(*hook).is_some())
    }
}

impl fmt::Debug for HookTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.bound().map(Hook::name)).finish()
    }
}
