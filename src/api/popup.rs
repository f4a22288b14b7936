//! Popup exports: history list and settings form

use log::info;
use wasm_bindgen::prelude::*;

use super::helpers::{deserialize, serialize, to_js_error};
use crate::models::history::HistoryList;
use crate::models::settings::Settings;
use crate::storage::{self, ChromeStorage, KeyValueStore, StorageError};

/// Load history, apply `edit`, and save it back when `edit` reports a change
pub async fn edit_history<S, F, R>(store: &S, edit: F) -> Result<(R, HistoryList), StorageError>
where
    S: KeyValueStore + ?Sized,
    F: FnOnce(&mut HistoryList) -> (R, bool),
{
    let mut history = storage::load_history(store).await?;
    let (result, changed) = edit(&mut history);
    if changed {
        storage::save_history(store, &history).await?;
    }
    Ok((result, history))
}

fn history_store() -> ChromeStorage {
    ChromeStorage::local()
}

#[wasm_bindgen(js_name = loadHistory)]
pub async fn load_history() -> Result<JsValue, JsValue> {
    let history = storage::load_history(&history_store()).await.map_err(to_js_error)?;
    serialize(&history, "Failed to serialize history")
}

/// Flip an entry's star; returns the updated list
#[wasm_bindgen(js_name = toggleHistoryStar)]
pub async fn toggle_history_star(id: f64) -> Result<JsValue, JsValue> {
    let (_, history) = edit_history(&history_store(), |h| {
        let starred = h.toggle_star(id as i64);
        (starred, starred.is_some())
    })
    .await
    .map_err(to_js_error)?;
    serialize(&history, "Failed to serialize history")
}

#[wasm_bindgen(js_name = removeHistoryEntry)]
pub async fn remove_history_entry(id: f64) -> Result<JsValue, JsValue> {
    let (_, history) = edit_history(&history_store(), |h| {
        let removed = h.remove(id as i64);
        let changed = removed.is_some();
        (removed, changed)
    })
    .await
    .map_err(to_js_error)?;
    serialize(&history, "Failed to serialize history")
}

/// Remove every entry that is not starred
#[wasm_bindgen(js_name = clearHistory)]
pub async fn clear_history() -> Result<JsValue, JsValue> {
    let (removed, history) = edit_history(&history_store(), |h| {
        let removed = h.clear_keep_starred();
        (removed, removed > 0)
    })
    .await
    .map_err(to_js_error)?;
    info!("Cleared {} history entries", removed);
    serialize(&history, "Failed to serialize history")
}

#[wasm_bindgen(js_name = loadSettings)]
pub async fn load_settings() -> Result<JsValue, JsValue> {
    let settings = storage::load_settings(&ChromeStorage::sync()).await.map_err(to_js_error)?;
    serialize(&settings, "Failed to serialize settings")
}

/// Save the settings form; returns what was stored after normalization
#[wasm_bindgen(js_name = saveSettings)]
pub async fn save_settings(settings: JsValue) -> Result<JsValue, JsValue> {
    let settings: Settings = deserialize(settings, "Invalid settings")?;
    let settings = settings.normalized();
    storage::save_settings(&ChromeStorage::sync(), &settings)
        .await
        .map_err(to_js_error)?;
    info!("Settings saved, API key: {}", settings.credential_summary());
    serialize(&settings, "Failed to serialize settings")
}
