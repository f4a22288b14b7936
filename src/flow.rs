//! Generation flow
//!
//! One user action, start to finish: load settings, run the request, record
//! the result in history. Progress is reported as [`RequestState`] values;
//! every run reports `Pending` first and exactly one of `Success` or
//! `Failure` last, so whatever shows a loading state can always remove it.

use log::{info, warn};
use serde::Serialize;

use crate::error::LevelUpError;
use crate::generation::{GenerationClient, GenerationRequest, HttpTransport, PromptKind};
use crate::models::history::EntryKind;
use crate::storage::{self, KeyValueStore};

/// Lifecycle of one generation request, as seen by the UI
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum RequestState {
    Pending {
        kind: PromptKind,
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    Success {
        kind: PromptKind,
        original_text: String,
        text: String,
        markdown: bool,
    },
    Failure {
        kind: PromptKind,
        message: String,
    },
}

impl RequestState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestState::Pending { .. })
    }
}

/// Loading message shown while a request runs
pub fn pending_message(kind: PromptKind) -> String {
    match kind {
        PromptKind::Enhance => "Enhancing your prompt...".to_string(),
        PromptKind::Reprompt | PromptKind::Regenerate => "Generating new version...".to_string(),
        PromptKind::Tone(tone) => format!("Applying {} tone...", tone.label()),
        PromptKind::Meaning => "Getting meaning...".to_string(),
    }
}

/// Everything a generation run needs
pub struct GenerationFlow<'a, T, S: ?Sized, H: ?Sized> {
    pub client: &'a GenerationClient<T>,
    pub settings_store: &'a S,
    pub history_store: &'a H,
}

impl<'a, T, S, H> GenerationFlow<'a, T, S, H>
where
    T: HttpTransport,
    S: KeyValueStore + ?Sized,
    H: KeyValueStore + ?Sized,
{
    /// Run `kind` on `original`, reporting progress through `on_state`.
    ///
    /// History is written only on success; a history write failure is
    /// logged and does not fail the run.
    pub async fn run<F>(
        &self,
        kind: PromptKind,
        original: &str,
        context: Option<&str>,
        mut on_state: F,
    ) -> Result<String, LevelUpError>
    where
        F: FnMut(&RequestState),
    {
        on_state(&RequestState::Pending {
            kind,
            message: pending_message(kind),
        });

        match self.execute(kind, original, context).await {
            Ok((text, markdown)) => {
                on_state(&RequestState::Success {
                    kind,
                    original_text: original.to_string(),
                    text: text.clone(),
                    markdown,
                });
                Ok(text)
            }
            Err(e) => {
                on_state(&RequestState::Failure {
                    kind,
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        kind: PromptKind,
        original: &str,
        context: Option<&str>,
    ) -> Result<(String, bool), LevelUpError> {
        if original.trim().is_empty() {
            return Err(LevelUpError::NoSelection);
        }

        let settings = storage::load_settings(self.settings_store).await?;
        let request = GenerationRequest::new(kind, original, context, &settings);
        let text = self.client.generate(&settings, &request).await?;

        let entry_kind = if kind.is_meaning() { EntryKind::Meaning } else { EntryKind::Enhance };
        match storage::record_history(self.history_store, original, &text, entry_kind).await {
            Ok(Some(entry)) => info!("Saved history entry {}", entry.id),
            Ok(None) => {}
            Err(e) => warn!("Failed to save history: {}", e),
        }

        Ok((text, settings.markdown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::Tone;

    #[test]
    fn test_pending_messages() {
        assert_eq!(pending_message(PromptKind::Enhance), "Enhancing your prompt...");
        assert_eq!(pending_message(PromptKind::Tone(Tone::Casual)), "Applying Casual tone...");
        assert_eq!(pending_message(PromptKind::Meaning), "Getting meaning...");
    }

    #[test]
    fn test_state_wire_format() {
        let state = RequestState::Success {
            kind: PromptKind::Enhance,
            original_text: "a".into(),
            text: "b".into(),
            markdown: true,
        };
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["state"], "success");
        assert_eq!(value["originalText"], "a");
        assert!(state.is_terminal());
    }
}
