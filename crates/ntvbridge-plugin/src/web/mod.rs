// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Webview global namespace.
//
// The native runtime (iOS WKWebView / Android WebView) can only evaluate
// `window.<name>(payload)`, so every slot is a property on the JS global
// object. Clearing writes `null`, which makes the call throw on the native
// side instead of reaching a stale closure.
//
// The wasm-bindgen registry lives in `window`; the checks around each write
// are plain Rust so host builds test them too.

#[cfg(target_arch = "wasm32")]
mod window;

#[cfg(target_arch = "wasm32")]
pub use window::WindowSlotRegistry;

use ntvbridge_core::error::{BridgeError, Result};
use ntvbridge_core::is_identifier;

/// Only plain identifiers can be reached as `window.<name>`.
pub(crate) fn check_slot_name(name: &str) -> Result<()> {
    if is_identifier(name) {
        return Ok(());
    }
    Err(BridgeError::Binding {
        name: name.to_string(),
        reason: "slot names must be [A-Za-z0-9_$] identifiers".into(),
    })
}

/// Interpret `Reflect.set`: it throws on a hostile setter and returns
/// `false` when the property is read-only or the global is frozen.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub(crate) fn check_slot_write(
    name: &str,
    outcome: std::result::Result<bool, String>,
) -> Result<()> {
    match outcome {
        Ok(true) => Ok(()),
        Ok(false) => Err(BridgeError::Binding {
            name: name.to_string(),
            reason: "global property not writable".into(),
        }),
        Err(reason) => Err(BridgeError::Binding {
            name: name.to_string(),
            reason,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refused_write_is_binding_error() {
        let err = check_slot_write("_ntv_bar_set_navbar_1", Ok(false)).unwrap_err();
        match err {
            BridgeError::Binding { name, reason } => {
                assert_eq!(name, "_ntv_bar_set_navbar_1");
                assert_eq!(reason, "global property not writable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn thrown_setter_keeps_its_message() {
        let err = check_slot_write("_x_1", Err("setter threw".into())).unwrap_err();
        assert!(matches!(err, BridgeError::Binding { ref reason, .. } if reason == "setter threw"));
        assert!(check_slot_write("_x_1", Ok(true)).is_ok());
    }

    #[test]
    fn slot_names_must_be_identifiers() {
        assert!(check_slot_name("_ntv_bar_scan_1").is_ok());
        assert!(check_slot_name("$cb").is_ok());
        for bad in ["", "a.b", "a b", "x()"] {
            assert!(matches!(check_slot_name(bad), Err(BridgeError::Binding { .. })));
        }
    }
}
