// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Seams between the bridge core and everything outside it: the global
// namespace, environment detection, and the per-capability native calls.

use std::rc::Rc;

use ntvbridge_core::error::Result;
use ntvbridge_core::{CallbackEnvelope, ExecutionMode, NativeIdentity};

/// A callable the native layer can reach by name. Receives the raw string
/// arguments of one native invocation.
pub type SlotCallback = Rc<dyn Fn(&[String])>;

/// Application callback: `Ok(envelope)` per native event, `Err` at most once
/// per failure.
pub type NativeCallback<K> = Rc<dyn Fn(Result<CallbackEnvelope<K>>)>;

/// Wrap a closure as a [`NativeCallback`].
pub fn callback<K>(f: impl Fn(Result<CallbackEnvelope<K>>) + 'static) -> NativeCallback<K> {
    Rc::new(f)
}

/// The shared global namespace, reduced to the one operation the bridge needs.
///
/// Last write wins and is visible to the native layer immediately. Writing
/// `None` must leave the name inert (not invocable).
pub trait SlotRegistry {
    /// Bind `name` to `slot`, or clear it with `None`.
    fn bind(&self, name: &str, slot: Option<SlotCallback>) -> Result<()>;
}

/// Platform/browser detection, supplied by the embedding application.
pub trait EnvironmentProbe {
    fn execution_mode(&self) -> ExecutionMode;
}

/// Everything a capability needs to perform one native call.
#[derive(Debug)]
pub struct NativeCall<'a, T> {
    pub identity: &'a NativeIdentity,
    /// Global name the native side should call back on. `None` when the
    /// caller supplied no callback and the instance was never bound.
    pub bound_name: Option<&'a str>,
    pub param: Option<&'a T>,
}

/// Native-container invocation path for one capability.
pub trait NativeInvoker<T> {
    fn invoke_native(&self, call: &NativeCall<'_, T>) -> Result<()>;
}

/// Emulation path used outside the native container (plain browser, tests).
pub trait FallbackExecutor<T> {
    fn exec_fallback(&self, call: &NativeCall<'_, T>) -> Result<()>;
}
