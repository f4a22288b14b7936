//! Cross-context messages
//!
//! Messages between the background worker and content scripts are tagged by
//! an `action` field. They are validated here, at the boundary, so the rest
//! of the crate only ever sees well-formed variants.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::settings::Settings;

/// Context-menu entry id
pub const IMPROVE_MENU_ID: &str = "improveText";

/// Errors from decoding a runtime message
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MessageError {
    #[error("message has no action")]
    MissingAction,

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("invalid {action} message: {reason}")]
    Invalid { action: String, reason: String },
}

/// A request sent between extension contexts
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ExtensionMessage {
    /// Background → content: run the enhance flow on this text
    ImproveSelectedText { text: String },

    /// Content → background: fetch current settings
    GetSettings,
}

impl ExtensionMessage {
    /// Decode and validate a raw message payload
    pub fn parse(value: &serde_json::Value) -> Result<Self, MessageError> {
        let action = value
            .get("action")
            .and_then(|a| a.as_str())
            .ok_or(MessageError::MissingAction)?;

        match action {
            "improveSelectedText" | "getSettings" => {}
            other => return Err(MessageError::UnknownAction(other.to_string())),
        }

        let message: ExtensionMessage =
            serde_json::from_value(value.clone()).map_err(|e| MessageError::Invalid {
                action: action.to_string(),
                reason: e.to_string(),
            })?;

        if let ExtensionMessage::ImproveSelectedText { text } = &message {
            if text.trim().is_empty() {
                return Err(MessageError::Invalid {
                    action: action.to_string(),
                    reason: "text is empty".to_string(),
                });
            }
        }

        Ok(message)
    }

    pub fn action(&self) -> &'static str {
        match self {
            ExtensionMessage::ImproveSelectedText { .. } => "improveSelectedText",
            ExtensionMessage::GetSettings => "getSettings",
        }
    }
}

/// Acknowledgement status values
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Processing,
    UnknownAction,
}

/// Reply to an [`ExtensionMessage`]
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum MessageResponse {
    Status { status: ResponseStatus },
    Error { error: String },
    Settings(Settings),
}

impl MessageResponse {
    pub fn processing() -> Self {
        MessageResponse::Status { status: ResponseStatus::Processing }
    }

    pub fn unknown_action() -> Self {
        MessageResponse::Status { status: ResponseStatus::UnknownAction }
    }
}

/// The single context-menu item registered on install
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ContextMenuItem {
    pub id: String,
    pub title: String,
    pub contexts: Vec<String>,
}

impl ContextMenuItem {
    pub fn improve_text() -> Self {
        Self {
            id: IMPROVE_MENU_ID.to_string(),
            title: "Enhance Prompt with LevelUp".to_string(),
            contexts: vec!["selection".to_string()],
        }
    }
}

/// Relevant fields of a `chrome.contextMenus.onClicked` event
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContextMenuClick {
    pub menu_item_id: String,
    #[serde(default)]
    pub selection_text: Option<String>,
    #[serde(default)]
    pub tab_id: Option<i32>,
}

/// A message addressed to one tab
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TabDispatch {
    pub tab_id: i32,
    pub message: ExtensionMessage,
}

impl ContextMenuClick {
    /// Turn a menu click into the message for its tab.
    ///
    /// Clicks on other menu items, clicks without a tab and clicks without
    /// selected text produce nothing.
    pub fn route(&self) -> Option<TabDispatch> {
        if self.menu_item_id != IMPROVE_MENU_ID {
            return None;
        }
        let tab_id = self.tab_id?;
        let text = self.selection_text.as_deref().filter(|t| !t.trim().is_empty())?;
        Some(TabDispatch {
            tab_id,
            message: ExtensionMessage::ImproveSelectedText { text: text.to_string() },
        })
    }
}
