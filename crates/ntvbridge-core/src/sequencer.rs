// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Globally unique callback names, one counter per native method.
//
// Names look like `_ntv_bar_set_navbar_1`. The last `_`-separated segment is
// always the decimal sequence number, so two different methods can never
// produce the same name.

use std::cell::RefCell;
use std::collections::HashMap;

use tracing::{debug, error};

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};

/// Per-method counter, created on first use and kept for the page lifetime.
#[derive(Debug, Clone, Copy)]
struct MethodSequence {
    /// `None` once `u64::MAX` has been issued.
    next: Option<u64>,
    issued: u64,
}

/// Issues `<prefix>_<method>_<n>` names with a monotonic `n` per method.
///
/// Owned by whoever composes plugins (see `BridgeContext`) instead of living
/// in a module-level static, so tests get a fresh sequence each time.
#[derive(Debug)]
pub struct NameSequencer {
    prefix: String,
    first: u64,
    sequences: RefCell<HashMap<String, MethodSequence>>,
}

impl NameSequencer {
    pub fn new(prefix: impl Into<String>, first: u64) -> Self {
        Self {
            prefix: prefix.into(),
            first,
            sequences: RefCell::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(config.callback_prefix.clone(), config.first_sequence)
    }

    /// Next never-issued name for `method`.
    ///
    /// A counter that has run past `u64::MAX` refuses to wrap and returns
    /// [`BridgeError::NamesExhausted`] instead of reissuing a name.
    pub fn next_name(&self, method: &str) -> Result<String> {
        let mut sequences = self.sequences.borrow_mut();
        let seq = sequences
            .entry(method.to_string())
            .or_insert(MethodSequence {
                next: Some(self.first),
                issued: 0,
            });
        let Some(n) = seq.next else {
            error!(method, "callback name sequence exhausted, refusing to wrap");
            return Err(BridgeError::NamesExhausted(method.to_string()));
        };
        seq.next = n.checked_add(1);
        seq.issued += 1;

        let name = format!("{}_{}_{}", self.prefix, method, n);
        debug!(method, name = %name, "issued callback name");
        Ok(name)
    }

    /// How many names have been issued for `method` so far.
    pub fn issued(&self, method: &str) -> u64 {
        self.sequences
            .borrow()
            .get(method)
            .map(|seq| seq.issued)
            .unwrap_or(0)
    }
}

impl Default for NameSequencer {
    fn default() -> Self {
        Self::from_config(&BridgeConfig::default())
    }
}
