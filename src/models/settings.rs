//! Extension settings
//!
//! The settings record persisted in `chrome.storage.sync`. Field names match
//! the stored keys, so the struct round-trips through storage and through
//! the `getSettings` message unchanged.

use serde::{Deserialize, Serialize};

/// The only model the extension talks to. Stored values are ignored.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Sampling temperature used when nothing is stored
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Storage keys read by the settings loader
pub const SETTINGS_KEYS: [&str; 4] = ["apiKey", "model", "temperature", "markdown"];

/// User-facing configuration for generation requests
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Gemini API key (empty when not configured)
    pub api_key: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature in `[0.0, 1.0]`
    pub temperature: f64,

    /// Render results as markdown
    pub markdown: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            markdown: true,
        }
    }
}

impl Settings {
    /// Normalize a record loaded from storage.
    ///
    /// The model is pinned and the temperature clamped; a non-finite
    /// temperature falls back to the default.
    pub fn normalized(mut self) -> Self {
        self.model = DEFAULT_MODEL.to_string();
        self.temperature = clamp_temperature(self.temperature);
        self
    }

    /// Whether an API key has been configured
    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Merge values already in storage with the defaults, as done on install.
    ///
    /// The key, temperature and markdown flag survive; the model is reset.
    pub fn merged_with_stored(stored: &serde_json::Value) -> Self {
        let defaults = Self::default();
        let api_key = stored
            .get("apiKey")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or(defaults.api_key);
        let temperature = stored
            .get("temperature")
            .and_then(|v| v.as_f64())
            .unwrap_or(defaults.temperature);
        let markdown = stored
            .get("markdown")
            .and_then(|v| v.as_bool())
            .unwrap_or(defaults.markdown);

        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            temperature,
            markdown,
        }
        .normalized()
    }

    /// Apply a `chrome.storage.onChanged` payload (`{key: {newValue}}`).
    ///
    /// Returns true when any field changed.
    pub fn apply_changes(&mut self, changes: &serde_json::Value) -> bool {
        let new_value = |key: &str| changes.get(key).and_then(|c| c.get("newValue"));
        let mut changed = false;

        if let Some(key) = new_value("apiKey").and_then(|v| v.as_str()) {
            self.api_key = key.to_string();
            changed = true;
        }
        if let Some(t) = new_value("temperature").and_then(|v| v.as_f64()) {
            self.temperature = clamp_temperature(t);
            changed = true;
        }
        if let Some(md) = new_value("markdown").and_then(|v| v.as_bool()) {
            self.markdown = md;
            changed = true;
        }

        self.model = DEFAULT_MODEL.to_string();
        changed
    }

    /// Describe the credential without revealing it
    pub fn credential_summary(&self) -> String {
        if self.has_credential() {
            format!("Yes (length: {})", self.api_key.len())
        } else {
            "No".to_string()
        }
    }
}

/// Clamp a temperature into the range accepted by the API
pub fn clamp_temperature(t: f64) -> f64 {
    if t.is_finite() {
        t.clamp(0.0, 1.0)
    } else {
        DEFAULT_TEMPERATURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.model, "gemini-2.0-flash");
        assert_eq!(s.temperature, 0.7);
        assert!(s.markdown);
        assert!(!s.has_credential());
    }

    #[test]
    fn test_deserialize_partial_record() {
        let s: Settings = serde_json::from_value(json!({"apiKey": "abc"})).unwrap();
        assert_eq!(s.api_key, "abc");
        assert_eq!(s.temperature, DEFAULT_TEMPERATURE);
        assert!(s.markdown);
    }

    #[test]
    fn test_normalized_pins_model_and_clamps() {
        let s = Settings {
            api_key: "k".into(),
            model: "other".into(),
            temperature: 3.5,
            markdown: false,
        }
        .normalized();
        assert_eq!(s.model, DEFAULT_MODEL);
        assert_eq!(s.temperature, 1.0);
    }

    #[test]
    fn test_whitespace_key_is_not_a_credential() {
        let s = Settings { api_key: "   ".into(), ..Settings::default() };
        assert!(!s.has_credential());
        assert_eq!(s.credential_summary(), "No");
    }

    #[test]
    fn test_merge_keeps_stored_values() {
        let stored = json!({"apiKey": "key-1", "temperature": 0.2, "markdown": false, "model": "x"});
        let s = Settings::merged_with_stored(&stored);
        assert_eq!(s.api_key, "key-1");
        assert_eq!(s.temperature, 0.2);
        assert!(!s.markdown);
        assert_eq!(s.model, DEFAULT_MODEL);

        let s = Settings::merged_with_stored(&json!({}));
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn test_apply_changes() {
        let mut s = Settings::default();
        let changed = s.apply_changes(&json!({
            "apiKey": {"oldValue": "", "newValue": "new-key"},
            "temperature": {"newValue": 0.4}
        }));
        assert!(changed);
        assert_eq!(s.api_key, "new-key");
        assert_eq!(s.temperature, 0.4);

        assert!(!s.apply_changes(&json!({"darkTheme": {"newValue": true}})));
    }
}
