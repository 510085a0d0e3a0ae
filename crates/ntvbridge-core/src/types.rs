// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the webview-to-native bridge.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

/// The name a plugin is known by on the native side, plus the oldest native
/// runtime that implements it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NativeIdentity {
    method: String,
    min_version: String,
}

impl NativeIdentity {
    /// Validate and build an identity.
    ///
    /// `method` ends up inside a global name, so it is restricted to
    /// identifier characters. `min_version` must be dotted numbers ("3.2.0").
    pub fn new(method: impl Into<String>, min_version: impl Into<String>) -> Result<Self> {
        let method = method.into();
        let min_version = min_version.into();

        if method.is_empty() {
            return Err(BridgeError::InvalidIdentity("native method name is empty".into()));
        }
        if !is_identifier(&method) {
            return Err(BridgeError::InvalidIdentity(format!(
                "native method name `{method}` contains characters outside [A-Za-z0-9_$]"
            )));
        }
        if parse_version(&min_version).is_none() {
            return Err(BridgeError::InvalidIdentity(format!(
                "minimum version `{min_version}` for `{method}` is not a dotted number"
            )));
        }

        Ok(Self {
            method,
            min_version,
        })
    }

    /// Native method name agreed with the iOS/Android side.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Minimum native runtime version this plugin needs.
    pub fn min_version(&self) -> &str {
        &self.min_version
    }

    /// Whether a native runtime reporting `runtime_version` can serve this plugin.
    ///
    /// Missing trailing components count as zero, so "3.2" satisfies "3.2.0".
    /// An unparseable runtime version never satisfies anything.
    pub fn is_supported_by(&self, runtime_version: &str) -> bool {
        let (Some(runtime), Some(required)) =
            (parse_version(runtime_version), parse_version(&self.min_version))
        else {
            return false;
        };
        compare_versions(&runtime, &required) != Ordering::Less
    }
}

impl std::fmt::Display for NativeIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.method, self.min_version)
    }
}

/// ASCII identifier check shared with slot-name validation.
pub fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn parse_version(text: &str) -> Option<Vec<u64>> {
    if text.trim().is_empty() {
        return None;
    }
    text.trim()
        .split('.')
        .map(|part| part.parse::<u64>().ok())
        .collect()
}

fn compare_versions(left: &[u64], right: &[u64]) -> Ordering {
    let len = left.len().max(right.len());
    (0..len)
        .map(|i| {
            let l = left.get(i).copied().unwrap_or(0);
            let r = right.get(i).copied().unwrap_or(0);
            l.cmp(&r)
        })
        .find(|ord| *ord != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

/// Typed result handed to application callbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackEnvelope<K> {
    /// Semantic event name, e.g. `click_navbar_left`. Empty when absent.
    #[serde(rename = "tagName")]
    pub tag_name: String,
    /// Event payload, decoded from the native `CBData` string.
    #[serde(rename = "cbData")]
    pub cb_data: K,
}

/// Raw object the native layer sends back (after URI decoding).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NativeResponse {
    #[serde(rename = "pluginName", default, skip_serializing_if = "Option::is_none")]
    pub plugin_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<NativeResponseParam>,
}

/// The `param` object of a [`NativeResponse`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NativeResponseParam {
    #[serde(rename = "tagName", default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    /// JSON text, possibly encoded more than once. Kept as a value so a
    /// native side that sends an object instead of a string still decodes.
    #[serde(rename = "CBData", default, skip_serializing_if = "Option::is_none")]
    pub cb_data: Option<serde_json::Value>,
    #[serde(rename = "isStop", default, skip_serializing_if = "Option::is_none")]
    pub is_stop: Option<String>,
}

impl NativeResponseParam {
    /// Native marks the last event of a stream with `isStop` = "1"/"true".
    ///
    /// Informational only: the bridge keeps the slot bound either way.
    pub fn is_stop(&self) -> bool {
        matches!(
            self.is_stop.as_deref().map(str::trim),
            Some("1") | Some("true") | Some("TRUE") | Some("True")
        )
    }
}
