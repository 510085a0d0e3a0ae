// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ntvbridge — plugin side of the webview-to-native bridge.
//
// A page talks to the native container by calling a capability and leaving
// a callback under a global name; the native layer answers by invoking that
// name with an encoded payload. This crate owns that lifecycle: naming,
// binding, rebinding and clearing global slots, and routing each call to the
// native or fallback path.

pub mod context;
pub mod memory;
pub mod plugin;
pub mod traits;
pub mod web;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use ntvbridge_core::{BridgeConfig, NameSequencer};
use tracing::debug;

pub use context::{BridgeContext, StaticEnvironment};
pub use memory::MemorySlotRegistry;
pub use plugin::BridgePlugin;
pub use traits::*;

thread_local! {
    /// One sequencer per prefix for the platform registry. Contexts built
    /// from the same config must never issue the same global name twice.
    static PLATFORM_SEQUENCERS: RefCell<HashMap<String, Rc<NameSequencer>>> =
        RefCell::new(HashMap::new());
}

#[cfg(target_arch = "wasm32")]
thread_local! {
    static WINDOW_REGISTRY: Rc<web::WindowSlotRegistry> = Rc::new(web::WindowSlotRegistry::new());
}

#[cfg(not(target_arch = "wasm32"))]
thread_local! {
    static HOST_REGISTRY: Rc<MemorySlotRegistry> = Rc::new(MemorySlotRegistry::new());
}

/// Global slot registry for the compilation target.
///
/// On wasm32 this is the page's real global object; elsewhere (host tests,
/// desktop tooling) an in-memory registry stands in for it. Every call on a
/// thread returns the same registry.
pub fn platform_registry() -> Rc<dyn SlotRegistry> {
    #[cfg(target_arch = "wasm32")]
    {
        WINDOW_REGISTRY.with(|registry| -> Rc<dyn SlotRegistry> { registry.clone() })
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        host_registry()
    }
}

/// The in-memory registry behind [`platform_registry`] on non-wasm targets,
/// with its `invoke` side exposed for tooling that plays the native runtime.
#[cfg(not(target_arch = "wasm32"))]
pub fn host_registry() -> Rc<MemorySlotRegistry> {
    HOST_REGISTRY.with(Rc::clone)
}

/// Sequencer shared by every context that writes `config.callback_prefix`
/// names into [`platform_registry`]. The first config seen for a prefix
/// fixes its starting sequence number.
pub fn platform_sequencer(config: &BridgeConfig) -> Rc<NameSequencer> {
    PLATFORM_SEQUENCERS.with(|sequencers| {
        let mut sequencers = sequencers.borrow_mut();
        let sequencer = sequencers
            .entry(config.callback_prefix.clone())
            .or_insert_with(|| {
                debug!(prefix = %config.callback_prefix, "platform sequencer created");
                Rc::new(NameSequencer::from_config(config))
            });
        Rc::clone(sequencer)
    })
}
