//! `chrome.storage` bindings
//!
//! Uses the promise-returning Manifest V3 API. Values cross the boundary as
//! plain JSON objects.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use super::{KeyValueStore, StorageError};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "sync"], js_name = get)]
    fn sync_get(keys: &JsValue) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "sync"], js_name = set)]
    fn sync_set(items: &JsValue) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = get)]
    fn local_get(keys: &JsValue) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = set)]
    fn local_set(items: &JsValue) -> Result<js_sys::Promise, JsValue>;
}

/// Which `chrome.storage` area to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageArea {
    /// Synced across the user's browsers (settings)
    Sync,
    /// This browser only (history)
    Local,
}

/// [`KeyValueStore`] over one `chrome.storage` area
#[derive(Debug, Clone, Copy)]
pub struct ChromeStorage {
    area: StorageArea,
}

impl ChromeStorage {
    pub fn sync() -> Self {
        Self { area: StorageArea::Sync }
    }

    pub fn local() -> Self {
        Self { area: StorageArea::Local }
    }

    pub fn area(&self) -> StorageArea {
        self.area
    }
}

fn unavailable(e: JsValue) -> StorageError {
    StorageError::Unavailable(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
}

/// Convert JSON into a plain JS object (not a `Map`)
pub fn json_to_js(value: &Value) -> Result<JsValue, StorageError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| StorageError::Decode(e.to_string()))
}

/// Convert a JS value into JSON
pub fn js_to_json(value: JsValue) -> Result<Value, StorageError> {
    if value.is_undefined() || value.is_null() {
        return Ok(Value::Object(Default::default()));
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| StorageError::Decode(e.to_string()))
}

#[async_trait(?Send)]
impl KeyValueStore for ChromeStorage {
    async fn get(&self, keys: &[&str]) -> Result<Value, StorageError> {
        let keys_js = json_to_js(&Value::from(keys.to_vec()))?;
        let promise = match self.area {
            StorageArea::Sync => sync_get(&keys_js),
            StorageArea::Local => local_get(&keys_js),
        }
        .map_err(unavailable)?;
        let result = JsFuture::from(promise).await.map_err(unavailable)?;
        js_to_json(result)
    }

    async fn set(&self, items: Value) -> Result<(), StorageError> {
        let items_js = json_to_js(&items)?;
        let promise = match self.area {
            StorageArea::Sync => sync_set(&items_js),
            StorageArea::Local => local_set(&items_js),
        }
        .map_err(unavailable)?;
        JsFuture::from(promise).await.map_err(unavailable)?;
        Ok(())
    }
}
