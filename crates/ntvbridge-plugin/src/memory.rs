// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-process stand-in for the webview's global namespace.
//
// Used on non-wasm targets and in tests. `invoke` plays the part of the
// native runtime calling `window.<name>(payload)`.

use std::cell::RefCell;
use std::collections::HashMap;

use ntvbridge_core::error::{BridgeError, Result};
use tracing::{debug, trace};

use crate::traits::{SlotCallback, SlotRegistry};
use crate::web::check_slot_name;

/// Global slots kept in a map.
#[derive(Default)]
pub struct MemorySlotRegistry {
    slots: RefCell<HashMap<String, SlotCallback>>,
}

impl MemorySlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call the slot bound under `name`, as the native layer would.
    ///
    /// The slot may clear or rebind itself while it runs.
    pub fn invoke<S: AsRef<str>>(&self, name: &str, args: &[S]) -> Result<()> {
        let slot = self
            .slots
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| BridgeError::SlotMissing(name.to_string()))?;

        let args: Vec<String> = args.iter().map(|arg| arg.as_ref().to_string()).collect();
        trace!(name, args = args.len(), "invoking slot");
        slot(&args);
        Ok(())
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.slots.borrow().contains_key(name)
    }

    /// Currently bound names, sorted.
    pub fn bound_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.slots.borrow().keys().cloned().collect();
        names.sort();
        names
    }
}

impl SlotRegistry for MemorySlotRegistry {
    fn bind(&self, name: &str, slot: Option<SlotCallback>) -> Result<()> {
        check_slot_name(name)?;

        let mut slots = self.slots.borrow_mut();
        match slot {
            Some(slot) => {
                debug!(name, "slot bound");
                slots.insert(name.to_string(), slot);
            }
            None => {
                debug!(name, "slot cleared");
                slots.remove(name);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for MemorySlotRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySlotRegistry")
            .field("bound", &self.bound_names())
            .finish()
    }
}
