// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Decoding of the strings the native layer passes to a bound callback.
//
// Pipeline: URI-decode -> JSON -> read `param.tagName` / `param.CBData` ->
// deep-decode `CBData` (it is often JSON inside a JSON string, sometimes
// more than once) -> deserialize into the caller's payload type.

use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::types::{CallbackEnvelope, NativeResponse};

/// Decoder for native callback arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadParser {
    log_payloads: bool,
}

impl PayloadParser {
    pub fn new(log_payloads: bool) -> Self {
        Self { log_payloads }
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(config.log_payloads)
    }

    /// Decode the arguments of one native invocation.
    ///
    /// Only the first argument is looked at. No argument, or an empty
    /// string, yields the zero envelope (`tagName` "", `cbData` `{}`).
    pub fn parse<K, S>(&self, args: &[S]) -> Result<CallbackEnvelope<K>>
    where
        K: DeserializeOwned,
        S: AsRef<str>,
    {
        self.parse_str(args.first().map(|arg| arg.as_ref()))
    }

    /// Same as [`PayloadParser::parse`] for a single optional string.
    pub fn parse_str<K: DeserializeOwned>(&self, raw: Option<&str>) -> Result<CallbackEnvelope<K>> {
        let Some(raw) = raw.filter(|text| !text.is_empty()) else {
            return Ok(CallbackEnvelope {
                tag_name: String::new(),
                cb_data: payload_from_value(empty_object(), "")?,
            });
        };

        if self.log_payloads {
            debug!(raw, "native callback payload");
        }

        let response = parse_native_response(raw)?;
        let param = response.param.unwrap_or_default();
        let tag_name = param.tag_name.unwrap_or_default();
        let cb_data = decode_cb_data(param.cb_data, raw)?;

        debug!(tag = %tag_name, "decoded native callback");
        Ok(CallbackEnvelope {
            tag_name,
            cb_data: payload_from_value(cb_data, raw)?,
        })
    }
}

/// Decode with default settings. See [`PayloadParser::parse`].
pub fn parse_callback_data<K, S>(args: &[S]) -> Result<CallbackEnvelope<K>>
where
    K: DeserializeOwned,
    S: AsRef<str>,
{
    PayloadParser::default().parse(args)
}

/// URI-decode and JSON-parse a raw payload without touching `CBData`.
pub fn parse_native_response(raw: &str) -> Result<NativeResponse> {
    let decoded = decode_uri_component(raw)?;
    serde_json::from_str(&decoded).map_err(|e| BridgeError::payload(raw, e))
}

/// Strict `decodeURIComponent`: a stray `%` or non-UTF-8 result is an error
/// rather than being passed through.
pub fn decode_uri_component(raw: &str) -> Result<String> {
    let bytes = raw.as_bytes();
    for (i, byte) in bytes.iter().enumerate() {
        if *byte != b'%' {
            continue;
        }
        let well_formed = bytes
            .get(i + 1..i + 3)
            .is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit));
        if !well_formed {
            return Err(BridgeError::payload(
                raw,
                format!("malformed percent escape at byte {i}"),
            ));
        }
    }

    percent_decode_str(raw)
        .decode_utf8()
        .map(|text| text.into_owned())
        .map_err(|e| BridgeError::payload(raw, e))
}

/// Recursively decode strings that hold JSON containers or further encoded
/// strings. Scalar-looking strings ("12", "true") are left as strings.
pub fn deep_parse_json(value: Value) -> Value {
    match value {
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(inner @ (Value::Object(_) | Value::Array(_) | Value::String(_))) => {
                deep_parse_json(inner)
            }
            _ => Value::String(text),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(deep_parse_json).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, item)| (key, deep_parse_json(item)))
                .collect(),
        ),
        other => other,
    }
}

fn decode_cb_data(cb_data: Option<Value>, raw: &str) -> Result<Value> {
    let decoded = match cb_data {
        None | Some(Value::Null) => empty_object(),
        Some(Value::String(text)) if text.trim().is_empty() => empty_object(),
        Some(Value::String(text)) => {
            let outer: Value = serde_json::from_str(&text)
                .map_err(|e| BridgeError::payload(raw, format!("CBData is not JSON: {e}")))?;
            deep_parse_json(outer)
        }
        Some(other) => deep_parse_json(other),
    };

    Ok(if decoded.is_null() { empty_object() } else { decoded })
}

fn payload_from_value<K: DeserializeOwned>(value: Value, raw: &str) -> Result<K> {
    serde_json::from_value(value)
        .map_err(|e| BridgeError::payload(raw, format!("cbData has unexpected shape: {e}")))
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

#[cfg(test)]
mod tests {
    use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    /// What `encodeURIComponent` would hand us, close enough for tests.
    fn encode(value: &Value) -> String {
        utf8_percent_encode(&value.to_string(), NON_ALPHANUMERIC).to_string()
    }

    #[test]
    fn missing_payload_is_zero_envelope() {
        let env: CallbackEnvelope<Value> = parse_callback_data::<Value, String>(&[]).unwrap();
        assert_eq!(env.tag_name, "");
        assert_eq!(env.cb_data, json!({}));

        let env: CallbackEnvelope<Value> = PayloadParser::default().parse_str(None).unwrap();
        assert_eq!(env.cb_data, json!({}));

        let env: CallbackEnvelope<Value> = parse_callback_data(&[""]).unwrap();
        assert_eq!(env.tag_name, "");
    }

    #[test]
    fn decodes_click_event() {
        let raw = encode(&json!({
            "param": { "tagName": "click_navbar_left", "CBData": json!({"x": 1}).to_string() }
        }));
        let env: CallbackEnvelope<Value> = parse_callback_data(&[raw]).unwrap();
        assert_eq!(env.tag_name, "click_navbar_left");
        assert_eq!(env.cb_data, json!({"x": 1}));
    }

    #[test]
    fn only_first_argument_counts() {
        let first = encode(&json!({"param": {"tagName": "first"}}));
        let second = encode(&json!({"param": {"tagName": "second"}}));
        let env: CallbackEnvelope<Value> = parse_callback_data(&[first, second]).unwrap();
        assert_eq!(env.tag_name, "first");
        assert_eq!(env.cb_data, json!({}));
    }

    #[test]
    fn malformed_escape_is_parse_error() {
        let raw = "<malformed-not-uri-encoded-%>";
        let err = parse_callback_data::<Value, _>(&[raw]).unwrap_err();
        match err {
            BridgeError::PayloadParse { raw: text, .. } => assert_eq!(text, raw),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let err = parse_callback_data::<Value, _>(&["%7Bnope"]).unwrap_err();
        assert!(matches!(err, BridgeError::PayloadParse { .. }));
    }

    #[test]
    fn cb_data_must_be_json() {
        let raw = encode(&json!({"param": {"CBData": "not json"}}));
        let err = parse_callback_data::<Value, _>(&[raw]).unwrap_err();
        assert!(matches!(err, BridgeError::PayloadParse { .. }));
    }

    #[test]
    fn multiply_encoded_cb_data_is_fully_decoded() {
        let inner = json!({"items": json!([1, 2]).to_string(), "label": "12"});
        let twice = Value::String(inner.to_string()).to_string();
        let raw = encode(&json!({"param": {"tagName": "t", "CBData": twice}}));

        let env: CallbackEnvelope<Value> = parse_callback_data(&[raw]).unwrap();
        assert_eq!(env.cb_data, json!({"items": [1, 2], "label": "12"}));
    }

    #[test]
    fn empty_or_null_cb_data_becomes_object() {
        for cb in [json!(""), json!("null"), Value::Null] {
            let raw = encode(&json!({"param": {"tagName": "t", "CBData": cb}}));
            let env: CallbackEnvelope<Value> = parse_callback_data(&[raw]).unwrap();
            assert_eq!(env.cb_data, json!({}));
        }
    }

    #[test]
    fn typed_payload() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Click {
            x: i64,
            #[serde(default)]
            y: Option<i64>,
        }

        let raw = encode(&json!({"param": {"CBData": "{\"x\":7}"}}));
        let env: CallbackEnvelope<Click> = parse_callback_data(&[raw]).unwrap();
        assert_eq!(env.cb_data, Click { x: 7, y: None });

        let raw = encode(&json!({"param": {"CBData": "\"oops\""}}));
        assert!(parse_callback_data::<Click, _>(&[raw]).is_err());
    }

    #[test]
    fn plus_is_not_a_space() {
        assert_eq!(decode_uri_component("a+b%20c").unwrap(), "a+b c");
    }

    #[test]
    fn non_utf8_escape_is_rejected() {
        assert!(decode_uri_component("%FF").is_err());
    }

    #[test]
    fn raw_response_keeps_is_stop() {
        let raw = encode(&json!({"pluginName": "set_navbar", "param": {"isStop": "1"}}));
        let resp = parse_native_response(&raw).unwrap();
        assert!(resp.param.unwrap().is_stop());
    }
}
