//! Settings and history persistence
//!
//! The extension stores settings in `chrome.storage.sync` and history in
//! `chrome.storage.local`. Both go through [`KeyValueStore`], so the loading
//! rules (defaults, normalization, capping) are shared by the browser and
//! the in-memory store used in tests.

pub mod chrome;
pub mod memory;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde_json::{json, Value};
use thiserror::Error;

use crate::models::history::{EntryKind, HistoryEntry, HistoryList, HISTORY_KEY};
use crate::models::settings::{Settings, SETTINGS_KEYS};

pub use chrome::{ChromeStorage, StorageArea};
pub use memory::MemoryStore;

/// A storage read or write failed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("could not decode stored value: {0}")]
    Decode(String),
}

/// Asynchronous key-value storage holding JSON values
#[async_trait(?Send)]
pub trait KeyValueStore {
    /// Read the given keys; missing keys are absent from the returned object
    async fn get(&self, keys: &[&str]) -> Result<Value, StorageError>;

    /// Write every key of `items` (a JSON object)
    async fn set(&self, items: Value) -> Result<(), StorageError>;
}

/// Load settings, filling gaps with defaults
pub async fn load_settings<S: KeyValueStore + ?Sized>(store: &S) -> Result<Settings, StorageError> {
    let stored = store.get(&SETTINGS_KEYS).await?;
    let settings: Settings =
        serde_json::from_value(stored).map_err(|e| StorageError::Decode(e.to_string()))?;
    let settings = settings.normalized();
    debug!("Settings loaded, API key: {}", settings.credential_summary());
    Ok(settings)
}

/// Persist settings
pub async fn save_settings<S: KeyValueStore + ?Sized>(store: &S, settings: &Settings) -> Result<(), StorageError> {
    let value = serde_json::to_value(settings).map_err(|e| StorageError::Decode(e.to_string()))?;
    store.set(value).await
}

/// Merge stored settings with defaults and write them back (install hook)
pub async fn install_defaults<S: KeyValueStore + ?Sized>(store: &S) -> Result<Settings, StorageError> {
    let stored = store.get(&SETTINGS_KEYS).await?;
    let merged = Settings::merged_with_stored(&stored);
    save_settings(store, &merged).await?;
    info!("Default settings saved");
    Ok(merged)
}

/// Load the history list; a missing or malformed value is empty history
pub async fn load_history<S: KeyValueStore + ?Sized>(store: &S) -> Result<HistoryList, StorageError> {
    let stored = store.get(&[HISTORY_KEY]).await?;
    Ok(HistoryList::from_stored(stored.get(HISTORY_KEY).unwrap_or(&Value::Null)))
}

/// Persist the history list
pub async fn save_history<S: KeyValueStore + ?Sized>(store: &S, history: &HistoryList) -> Result<(), StorageError> {
    let list = serde_json::to_value(history).map_err(|e| StorageError::Decode(e.to_string()))?;
    store.set(json!({ HISTORY_KEY: list })).await
}

/// Record one generation in history
pub async fn record_history<S: KeyValueStore + ?Sized>(
    store: &S,
    original: &str,
    enhanced: &str,
    kind: EntryKind,
) -> Result<Option<HistoryEntry>, StorageError> {
    let mut history = load_history(store).await?;
    let entry = history.push(original, enhanced, kind).cloned();
    if entry.is_none() {
        warn!("Not saving empty {:?} result to history", kind);
        return Ok(None);
    }
    save_history(store, &history).await?;
    Ok(entry)
}
