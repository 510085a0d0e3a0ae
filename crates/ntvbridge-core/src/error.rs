// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Ntvbridge.

use thiserror::Error;

/// Top-level error type for all bridge operations.
///
/// Errors never cross the native boundary as panics: they are handed to the
/// caller's callback exactly once, after any orphaned slot has been cleared.
#[derive(Debug, Error)]
pub enum BridgeError {
    // -- Call/callback lifecycle --
    #[error("could not bind global slot `{name}`: {reason}")]
    Binding { name: String, reason: String },

    #[error("native call `{method}` failed: {reason}")]
    NativeInvocation { method: String, reason: String },

    #[error("malformed native payload ({reason}): {raw}")]
    PayloadParse { raw: String, reason: String },

    #[error("callback names for `{0}` are exhausted")]
    NamesExhausted(String),

    // -- Contract violations --
    #[error("invalid plugin identity: {0}")]
    InvalidIdentity(String),

    #[error("no callback bound under `{0}`")]
    SlotMissing(String),

    // -- Environment --
    #[error("configuration error: {0}")]
    Config(String),
}

impl BridgeError {
    /// Shorthand for a failed native call.
    pub fn native(method: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::NativeInvocation {
            method: method.into(),
            reason: reason.to_string(),
        }
    }

    /// Shorthand for an undecodable payload, keeping the offending text.
    pub fn payload(raw: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::PayloadParse {
            raw: raw.into(),
            reason: reason.to_string(),
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BridgeError>;
