//! Error types
//!
//! Each component has its own error enum; [`LevelUpError`] is what a user
//! gesture ends with. Every variant renders as a message fit for a blocking
//! notice.

use thiserror::Error;

use crate::generation::GenerationError;
use crate::models::messages::MessageError;
use crate::selection::HostError;
use crate::storage::StorageError;

/// Terminal outcome of a failed user gesture
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LevelUpError {
    /// Action attempted with empty or whitespace-only captured text
    #[error("Please select some text first")]
    NoSelection,

    /// A generation request is already running
    #[error("A request is already in progress. Please wait for it to finish.")]
    RequestPending,

    /// Missing credential, transport or API failure
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// None of the replacement strategies applied
    #[error("Cannot replace text: the original selection is no longer available. Please copy the text manually.")]
    ReplacementFailed,

    #[error("DOM operation failed: {0}")]
    Host(#[from] HostError),

    #[error("Invalid message: {0}")]
    Message(#[from] MessageError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl LevelUpError {
    /// Whether the failure happened before any network call was issued
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            LevelUpError::NoSelection
                | LevelUpError::RequestPending
                | LevelUpError::Generation(GenerationError::MissingCredential)
        )
    }
}
