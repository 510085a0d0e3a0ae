// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ntvbridge — Core types, error definitions, callback name sequencing and
// native payload decoding shared by every plugin.

pub mod config;
pub mod error;
pub mod payload;
pub mod sequencer;
pub mod types;

pub use config::{BridgeConfig, ExecutionMode};
pub use error::BridgeError;
pub use payload::{PayloadParser, parse_callback_data};
pub use sequencer::NameSequencer;
pub use types::*;
