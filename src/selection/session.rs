//! Single-owner selection session
//!
//! Holds the one active anchor for a page context and the in-flight flag for
//! generation requests. Every transition is an explicit method; nothing else
//! in the crate keeps a copy of the anchor.

use log::debug;

use super::anchor::SelectionAnchor;
use crate::error::LevelUpError;

/// Per-page selection state
#[derive(Debug)]
pub struct SelectionSession<N, E> {
    anchor: Option<SelectionAnchor<N, E>>,
    sequence: u64,
    request_pending: bool,
}

impl<N, E> Default for SelectionSession<N, E> {
    fn default() -> Self {
        Self {
            anchor: None,
            sequence: 0,
            request_pending: false,
        }
    }
}

impl<N, E> SelectionSession<N, E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next logical capture time
    pub fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// Store a new anchor, superseding any previous one
    pub fn capture(&mut self, anchor: SelectionAnchor<N, E>) {
        if let Some(previous) = &self.anchor {
            debug!(
                "Anchor #{} superseded by #{}",
                previous.captured_at(),
                anchor.captured_at()
            );
        }
        self.anchor = Some(anchor);
    }

    pub fn anchor(&self) -> Option<&SelectionAnchor<N, E>> {
        self.anchor.as_ref()
    }

    /// Captured text of the active anchor (empty without one)
    pub fn captured_text(&self) -> &str {
        self.anchor.as_ref().map(|a| a.captured_text()).unwrap_or("")
    }

    /// Remove and return the active anchor
    pub fn take(&mut self) -> Option<SelectionAnchor<N, E>> {
        self.anchor.take()
    }

    /// Drop the active anchor
    pub fn invalidate(&mut self) {
        if let Some(anchor) = self.anchor.take() {
            debug!("Anchor #{} invalidated", anchor.captured_at());
        }
    }

    /// Text for a generation action, rejecting empty or whitespace captures
    pub fn text_for_action(&self) -> Result<String, LevelUpError> {
        let text = self.captured_text();
        if text.trim().is_empty() {
            return Err(LevelUpError::NoSelection);
        }
        Ok(text.to_string())
    }

    pub fn is_request_pending(&self) -> bool {
        self.request_pending
    }

    /// Mark a generation request as in flight.
    ///
    /// Fails while another request is still pending.
    pub fn begin_request(&mut self) -> Result<(), LevelUpError> {
        if self.request_pending {
            return Err(LevelUpError::RequestPending);
        }
        self.request_pending = true;
        Ok(())
    }

    /// Release the in-flight flag (success or failure)
    pub fn finish_request(&mut self) {
        self.request_pending = false;
    }
}
