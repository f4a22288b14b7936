//! Shared helpers for the WASM API
//!
//! Serialization across the JS boundary and conversion of crate errors into
//! `JsValue`s.

use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ============================================================================
// Serialization/Deserialization Helpers
// ============================================================================

/// Deserialize a value from JavaScript with automatic error handling
pub fn deserialize<T: DeserializeOwned>(value: JsValue, error_context: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| {
        let msg = format!("{}: {}", error_context, e);
        log::error!("{}", msg);
        JsValue::from_str(&msg)
    })
}

/// Serialize a value to a plain JavaScript object
pub fn serialize<T: Serialize>(value: &T, error_context: &str) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| {
            let msg = format!("{}: {}", error_context, e);
            log::error!("{}", msg);
            JsValue::from_str(&msg)
        })
}

/// Convert any displayable error into a `JsValue` message
pub fn to_js_error<E: std::fmt::Display>(e: E) -> JsValue {
    JsValue::from_str(&e.to_string())
}

// ============================================================================
// Notices
// ============================================================================

/// Show a blocking notice to the user
pub fn alert(message: &str) {
    match web_sys::window() {
        Some(window) => {
            if window.alert_with_message(message).is_err() {
                log::error!("Failed to show notice: {}", message);
            }
        }
        None => log::error!("No window for notice: {}", message),
    }
}
