//! Data models
//!
//! Plain serde types shared by every extension context.

pub mod history;
pub mod messages;
pub mod settings;

pub use history::{EntryKind, HistoryEntry, HistoryList};
pub use messages::{ExtensionMessage, MessageResponse};
pub use settings::Settings;
