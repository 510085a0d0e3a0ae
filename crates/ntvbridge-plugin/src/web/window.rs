// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Slots written onto the JS global object via wasm-bindgen.

use js_sys::{Array, Reflect};
use wasm_bindgen::prelude::*;

use ntvbridge_core::error::Result;

use super::{check_slot_name, check_slot_write};
use crate::traits::{SlotCallback, SlotRegistry};

/// Slots written onto `globalThis` (the page's `window`).
pub struct WindowSlotRegistry {
    global: js_sys::Object,
}

impl WindowSlotRegistry {
    pub fn new() -> Self {
        Self {
            global: js_sys::global(),
        }
    }
}

impl Default for WindowSlotRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotRegistry for WindowSlotRegistry {
    fn bind(&self, name: &str, slot: Option<SlotCallback>) -> Result<()> {
        check_slot_name(name)?;

        let value = match slot {
            // Ownership passes to the JS GC; a replaced closure may still be
            // running when it is overwritten, so it must not be dropped here.
            Some(slot) => Closure::<dyn Fn(JsValue)>::new(move |arg: JsValue| {
                let args = native_args(arg);
                slot(&args);
            })
            .into_js_value(),
            None => JsValue::NULL,
        };

        let outcome = Reflect::set(&self.global, &JsValue::from_str(name), &value)
            .map_err(js_error_to_string);
        check_slot_write(name, outcome)?;
        tracing::debug!(name, cleared = value.is_null(), "window slot written");
        Ok(())
    }
}

/// Native hands us either a string or an array whose elements are strings.
fn native_args(arg: JsValue) -> Vec<String> {
    if arg.is_undefined() || arg.is_null() {
        return Vec::new();
    }
    if Array::is_array(&arg) {
        return Array::from(&arg).iter().map(js_to_string).collect();
    }
    vec![js_to_string(arg)]
}

fn js_to_string(value: JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    js_sys::JSON::stringify(&value)
        .map(String::from)
        .unwrap_or_default()
}

fn js_error_to_string(err: JsValue) -> String {
    if let Some(text) = err.as_string() {
        return text;
    }
    if let Ok(message) = Reflect::get(&err, &JsValue::from_str("message")) {
        if let Some(text) = message.as_string() {
            return text;
        }
    }
    format!("{err:?}")
}
