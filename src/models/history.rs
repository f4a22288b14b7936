//! Prompt history and favorites
//!
//! History is an insertion-ordered list (most recent first) capped at
//! [`HISTORY_LIMIT`] entries. Favorites are history entries with `starred`
//! set; clearing history keeps them.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of entries kept in history
pub const HISTORY_LIMIT: usize = 20;

/// Storage key for the history list in `chrome.storage.local`
pub const HISTORY_KEY: &str = "historyPrompts";

/// What produced a history entry
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Enhance,
    Meaning,
}

/// One saved generation
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    /// Millisecond epoch at creation, unique within a list
    pub id: i64,
    pub original: String,
    pub enhanced: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// ISO-8601 creation time
    pub timestamp: String,
    #[serde(default)]
    pub starred: bool,
}

/// Capped, most-recent-first history list
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct HistoryList {
    entries: Vec<HistoryEntry>,
}

impl HistoryList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from a stored value.
    ///
    /// Anything that is not an array of entries is treated as empty history;
    /// individual malformed entries are dropped.
    pub fn from_stored(value: &serde_json::Value) -> Self {
        let entries = value
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value::<HistoryEntry>(item.clone()).ok())
                    .take(HISTORY_LIMIT)
                    .collect()
            })
            .unwrap_or_default();
        Self { entries }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a generation at the current time
    pub fn push(&mut self, original: &str, enhanced: &str, kind: EntryKind) -> Option<&HistoryEntry> {
        self.push_at(original, enhanced, kind, Utc::now())
    }

    /// Record a generation at `now`.
    ///
    /// Empty originals or results are not recorded.
    pub fn push_at(
        &mut self,
        original: &str,
        enhanced: &str,
        kind: EntryKind,
        now: DateTime<Utc>,
    ) -> Option<&HistoryEntry> {
        if original.is_empty() || enhanced.is_empty() {
            return None;
        }

        let mut id = now.timestamp_millis();
        if let Some(newest) = self.entries.first() {
            if id <= newest.id {
                id = newest.id + 1;
            }
        }

        self.entries.insert(
            0,
            HistoryEntry {
                id,
                original: original.to_string(),
                enhanced: enhanced.to_string(),
                kind,
                timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
                starred: false,
            },
        );
        self.entries.truncate(HISTORY_LIMIT);
        self.entries.first()
    }

    /// Flip the starred flag; returns the new value
    pub fn toggle_star(&mut self, id: i64) -> Option<bool> {
        let entry = self.entries.iter_mut().find(|e| e.id == id)?;
        entry.starred = !entry.starred;
        Some(entry.starred)
    }

    /// Remove an entry by id
    pub fn remove(&mut self, id: i64) -> Option<HistoryEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index))
    }

    /// Drop every entry that is not starred
    pub fn clear_keep_starred(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.starred);
        before - self.entries.len()
    }

    /// Starred entries in history order
    pub fn favorites(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().filter(|e| e.starred)
    }
}
