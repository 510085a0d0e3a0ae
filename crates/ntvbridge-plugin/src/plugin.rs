// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One native capability as seen from the page.
//
// A plugin instance owns at most one global callback name. The name is
// issued lazily on the first call that carries a callback, reused (with the
// newest wrapper) by every later call, and dropped only when something goes
// wrong. State machine: Unbound -> Bound <-> Bound (rebind) -> Unbound.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use ntvbridge_core::error::Result;
use ntvbridge_core::{ExecutionMode, NativeIdentity};

use crate::context::BridgeContext;
use crate::traits::{
    FallbackExecutor, NativeCall, NativeCallback, NativeInvoker, SlotCallback, SlotRegistry,
};

/// Call/callback lifecycle for one native capability.
///
/// `T` is the call parameter type, `K` the decoded event payload type.
pub struct BridgePlugin<T, K> {
    identity: NativeIdentity,
    fallback: Box<dyn FallbackExecutor<T>>,
    native: Option<Box<dyn NativeInvoker<T>>>,
    context: BridgeContext,
    param: Option<T>,
    /// Shared with every wrapper this instance has bound, so a wrapper that
    /// hits a bad payload can unbind the instance.
    bound_name: Rc<RefCell<Option<String>>>,
    _payload: PhantomData<fn() -> K>,
}

impl<T, K> BridgePlugin<T, K>
where
    K: DeserializeOwned + 'static,
{
    /// A plugin cannot exist without its identity and fallback path; the
    /// native path is optional (see [`BridgePlugin::with_native_invoker`]).
    pub fn new(
        identity: NativeIdentity,
        fallback: impl FallbackExecutor<T> + 'static,
        context: BridgeContext,
    ) -> Self {
        Self {
            identity,
            fallback: Box::new(fallback),
            native: None,
            context,
            param: None,
            bound_name: Rc::new(RefCell::new(None)),
            _payload: PhantomData,
        }
    }

    /// Initial call parameter.
    pub fn with_param(mut self, param: T) -> Self {
        self.param = Some(param);
        self
    }

    /// Logic to run when the page is hosted by the native container. Without
    /// one, native-mode calls only make sure the slot is bound; the native
    /// runtime is then expected to find it by name.
    pub fn with_native_invoker(mut self, invoker: impl NativeInvoker<T> + 'static) -> Self {
        self.native = Some(Box::new(invoker));
        self
    }

    pub fn identity(&self) -> &NativeIdentity {
        &self.identity
    }

    pub fn param(&self) -> Option<&T> {
        self.param.as_ref()
    }

    /// Global name currently bound for this instance.
    pub fn bound_name(&self) -> Option<String> {
        self.bound_name.borrow().clone()
    }

    pub fn is_bound(&self) -> bool {
        self.bound_name.borrow().is_some()
    }

    /// Bind `callback` (if any) to this instance's global slot and perform
    /// the native call. A supplied `param` replaces the stored one.
    ///
    /// Every failure clears the slot and reaches `callback` exactly once.
    /// Without a callback there is nowhere to report to: the failure is
    /// logged and otherwise dropped.
    #[instrument(skip_all, fields(method = %self.identity.method()))]
    pub fn invoke_bind(&mut self, callback: Option<NativeCallback<K>>, param: Option<T>) {
        if let Some(param) = param {
            self.param = Some(param);
        }
        self.execute_callback(callback);
    }

    fn execute_callback(&mut self, callback: Option<NativeCallback<K>>) {
        if let Some(callback) = &callback {
            let slot = self.wrap_callback(Rc::clone(callback));
            if let Err(err) = self.bind_slot(slot) {
                warn!(error = %err, "could not bind callback slot");
                self.clear_binding();
                callback(Err(err));
                return;
            }
        }

        if let Err(err) = self.bridge_exec() {
            warn!(error = %err, "native call failed");
            self.clear_binding();
            match callback {
                Some(callback) => callback(Err(err)),
                None => warn!("no callback supplied, native call error dropped"),
            }
        }
    }

    /// Wrapper the native layer actually calls: decode, then forward.
    fn wrap_callback(&self, callback: NativeCallback<K>) -> SlotCallback {
        let registry = Rc::downgrade(self.context.registry());
        let bound_name = Rc::clone(&self.bound_name);
        let parser = self.context.parser();
        let method = self.identity.method().to_string();

        Rc::new(move |args: &[String]| match parser.parse::<K, _>(args) {
            Ok(envelope) => callback(Ok(envelope)),
            Err(err) => {
                warn!(method = %method, error = %err, "undecodable native payload");
                if let Some(registry) = registry.upgrade() {
                    clear_slot(registry.as_ref(), &bound_name);
                }
                callback(Err(err));
            }
        })
    }

    /// First bind issues a name; later binds overwrite the same name.
    fn bind_slot(&self, slot: SlotCallback) -> Result<()> {
        let name = {
            let mut bound = self.bound_name.borrow_mut();
            match bound.as_ref() {
                Some(name) => {
                    debug!(name = %name, "rebinding callback slot");
                    name.clone()
                }
                None => {
                    let name = self.context.sequencer().next_name(self.identity.method())?;
                    info!(name = %name, "binding callback slot");
                    *bound = Some(name.clone());
                    name
                }
            }
        };
        self.context.registry().bind(&name, Some(slot))
    }

    fn bridge_exec(&self) -> Result<()> {
        // Owned copy: the executor may fire the slot synchronously, and a
        // failing wrapper needs to take the name.
        let bound_name = self.bound_name();
        let call = NativeCall {
            identity: &self.identity,
            bound_name: bound_name.as_deref(),
            param: self.param.as_ref(),
        };

        match self.context.environment().execution_mode() {
            ExecutionMode::Native => match &self.native {
                Some(invoker) => invoker.invoke_native(&call),
                None => {
                    debug!(bound = ?call.bound_name, "no native invoker attached");
                    Ok(())
                }
            },
            ExecutionMode::Fallback => self.fallback.exec_fallback(&call),
        }
    }

    fn clear_binding(&self) {
        clear_slot(self.context.registry().as_ref(), &self.bound_name);
    }
}

/// Forget the instance's name and make the global slot inert.
fn clear_slot(registry: &dyn SlotRegistry, bound_name: &RefCell<Option<String>>) {
    let Some(name) = bound_name.borrow_mut().take() else {
        return;
    };
    match registry.bind(&name, None) {
        Ok(()) => warn!(name = %name, "callback slot cleared"),
        Err(err) => warn!(name = %name, error = %err, "could not clear callback slot"),
    }
}

impl<T, K> std::fmt::Debug for BridgePlugin<T, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgePlugin")
            .field("identity", &self.identity)
            .field("bound_name", &self.bound_name.borrow())
            .field("native_invoker", &self.native.is_some())
            .finish_non_exhaustive()
    }
}
