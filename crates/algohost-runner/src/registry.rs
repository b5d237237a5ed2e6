// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Hook registry using inventory-based dynamic dispatch.
//!
//! Algorithm crates register their lifecycle hooks at compile time with the
//! [`register_hook!`](crate::register_hook) macro; the loader collects every
//! registration matching the configured entry point at startup. This keeps
//! hook resolution typed end to end; the runner never performs a stringly
//! symbol lookup.

use crate::hooks::{Hook, HookFn};

/// One registered hook of one algorithm entry point.
pub struct HookRegistration {
    /// The algorithm entry point this hook belongs to (e.g. "main")
    pub entry_point: &'static str,
    /// Which lifecycle phase the hook implements
    pub hook: Hook,
    /// The executor function
    pub execute: HookFn,
}

inventory::collect!(HookRegistration);

/// Iterate over all registrations for the given entry point.
pub fn registrations_for(entry_point: &str) -> impl Iterator<Item = &'static HookRegistration> + '_ {
    inventory::iter::<HookRegistration>
        .into_iter()
        .filter(move |registration| registration.entry_point == entry_point)
}

/// Register a lifecycle hook for an algorithm entry point.
///
/// The hook is an `async fn` taking one `serde_json::Value` payload and
/// returning `Result<serde_json::Value, String>`:
///
/// ```ignore
/// use algohost_runner::{Hook, register_hook};
/// use serde_json::Value;
///
/// async fn start(input: Value) -> Result<Value, String> {
///     let x = input.get("x").and_then(Value::as_i64).ok_or("missing x")?;
///     Ok(Value::from(x + 1))
/// }
///
/// register_hook!("main", Hook::Start, start);
/// ```
#[macro_export]
macro_rules! register_hook {
    ($entry_point:expr, $hook:expr, $func:path) => {
        $crate::inventory::submit! {
            $crate::registry::HookRegistration {
                entry_point: $entry_point,
                hook: $hook,
                execute: |input| ::std::boxed::Box::pin($func(input)),
            }
        }
    };
}
