// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

/// Where a plugin's native call is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Page runs inside the native container and can reach the bridge.
    Native,
    /// Plain browser or host process: plugins emulate the capability.
    #[default]
    Fallback,
}

/// Bridge settings, normally shipped as JSON alongside the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Fixed prefix of every bound global name.
    pub callback_prefix: String,
    /// First sequence number issued for each native method.
    pub first_sequence: u64,
    /// Which invocation path plugins take.
    pub execution_mode: ExecutionMode,
    /// Log raw native payloads at debug level.
    pub log_payloads: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            callback_prefix: "_ntv_bar".into(),
            first_sequence: 1,
            execution_mode: ExecutionMode::Fallback,
            log_payloads: false,
        }
    }
}

impl BridgeConfig {
    /// Parse a JSON config; absent fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| BridgeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks shared by JSON and code-built configs.
    pub fn validate(&self) -> Result<()> {
        if !crate::types::is_identifier(&self.callback_prefix) {
            return Err(BridgeError::Config(format!(
                "callback prefix `{}` is not an identifier",
                self.callback_prefix
            )));
        }
        Ok(())
    }
}
