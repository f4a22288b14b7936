//! Background worker exports
//!
//! The service worker's JS shell owns the `chrome.runtime` and
//! `chrome.contextMenus` listeners and forwards their payloads here.

use log::{info, warn};
use serde_json::Value;
use wasm_bindgen::prelude::*;

use super::helpers::{deserialize, serialize, to_js_error};
use crate::models::messages::{ContextMenuClick, ContextMenuItem, ExtensionMessage, MessageResponse};
use crate::storage::{self, chrome::js_to_json, ChromeStorage, KeyValueStore};

/// Reply to a runtime message addressed to the background worker
pub async fn background_response<S: KeyValueStore + ?Sized>(store: &S, message: &Value) -> MessageResponse {
    match ExtensionMessage::parse(message) {
        Ok(ExtensionMessage::GetSettings) => match storage::load_settings(store).await {
            Ok(settings) => MessageResponse::Settings(settings),
            Err(e) => {
                warn!("Error loading settings: {}", e);
                MessageResponse::Error { error: e.to_string() }
            }
        },
        Ok(other) => {
            warn!("Background ignoring {} message", other.action());
            MessageResponse::unknown_action()
        }
        Err(e) => {
            warn!("Rejected message: {}", e);
            MessageResponse::unknown_action()
        }
    }
}

#[wasm_bindgen(js_name = handleBackgroundMessage)]
pub async fn handle_background_message(message: JsValue) -> Result<JsValue, JsValue> {
    let message = js_to_json(message).map_err(to_js_error)?;
    let response = background_response(&ChromeStorage::sync(), &message).await;
    serialize(&response, "Failed to serialize response")
}

/// Install hook: merge stored settings with defaults and save them
#[wasm_bindgen(js_name = mergeInstallSettings)]
pub async fn merge_install_settings() -> Result<JsValue, JsValue> {
    let settings = storage::install_defaults(&ChromeStorage::sync())
        .await
        .map_err(to_js_error)?;
    info!("Extension installed, API key: {}", settings.credential_summary());
    serialize(&settings, "Failed to serialize settings")
}

/// The item to pass to `chrome.contextMenus.create`
#[wasm_bindgen(js_name = contextMenuItem)]
pub fn context_menu_item() -> Result<JsValue, JsValue> {
    serialize(&ContextMenuItem::improve_text(), "Failed to serialize menu item")
}

/// Route a context-menu click; returns `{tabId, message}` or `null`
#[wasm_bindgen(js_name = routeContextMenuClick)]
pub fn route_context_menu_click(info: JsValue, tab_id: Option<i32>) -> Result<JsValue, JsValue> {
    let mut click: ContextMenuClick = deserialize(info, "Invalid context menu click")?;
    if click.tab_id.is_none() {
        click.tab_id = tab_id;
    }
    match click.route() {
        Some(dispatch) => serialize(&dispatch, "Failed to serialize dispatch"),
        None => Ok(JsValue::NULL),
    }
}
