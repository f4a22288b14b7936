//! Selection tracking
//!
//! Turns raw pointer events into toolbar decisions. Timers live in the
//! browser glue; the tracker only hands out debounce tickets and decides what
//! a settled selection means. A ticket that is no longer the latest is stale
//! and its evaluation is skipped, so a burst of pointer releases produces one
//! evaluation.

use log::{debug, info};

use super::anchor::{slice_utf16, AnchorBoundary, FloatingAnchorPosition, SelectionAnchor};
use super::host::DocumentHost;
use super::session::SelectionSession;
use crate::error::LevelUpError;

/// Delay between the last pointer release and selection evaluation (ms)
pub const DEBOUNCE_MS: i32 = 100;

/// Interval of the "still selected?" check while the toolbar is shown (ms)
pub const LIVENESS_POLL_MS: i32 = 1000;

/// What the UI should do after a tracker event
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TrackerAction {
    /// Show (or move) the floating toolbar
    ShowToolbar(FloatingAnchorPosition),
    /// Tear the toolbar down and clear its timers
    DismissToolbar,
    /// Nothing to do
    None,
}

/// Debounce and visibility state for the floating toolbar
#[derive(Debug, Default)]
pub struct SelectionTracker {
    latest_ticket: u64,
    toolbar_visible: bool,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toolbar_visible(&self) -> bool {
        self.toolbar_visible
    }

    /// Register a pointer release; returns the ticket to settle after
    /// [`DEBOUNCE_MS`]. Any earlier ticket becomes stale.
    pub fn pointer_released(&mut self) -> u64 {
        self.latest_ticket += 1;
        self.latest_ticket
    }

    /// Whether `ticket` is still the most recent one
    pub fn is_current(&self, ticket: u64) -> bool {
        ticket == self.latest_ticket
    }

    /// Evaluate the selection once the debounce window for `ticket` ends
    pub fn settle<H: DocumentHost>(
        &mut self,
        ticket: u64,
        host: &H,
        session: &mut SelectionSession<H::Node, H::Element>,
    ) -> TrackerAction {
        if !self.is_current(ticket) {
            debug!("Skipping stale selection evaluation #{}", ticket);
            return TrackerAction::None;
        }
        self.evaluate(host, session)
    }

    /// Evaluate the current selection immediately
    pub fn evaluate<H: DocumentHost>(
        &mut self,
        host: &H,
        session: &mut SelectionSession<H::Node, H::Element>,
    ) -> TrackerAction {
        let text = selected_text(host);
        debug!("Selection settled, text length: {}", text.chars().count());

        // One character or less is an accidental click, not a selection
        if text.chars().count() <= 1 {
            if self.toolbar_visible && !has_live_selection(host) {
                self.toolbar_visible = false;
                return TrackerAction::DismissToolbar;
            }
            return TrackerAction::None;
        }

        let position = self.capture(host, session, text);
        TrackerAction::ShowToolbar(position)
    }

    /// Alt+I: show the toolbar for the current selection without debounce
    pub fn shortcut<H: DocumentHost>(
        &mut self,
        host: &H,
        session: &mut SelectionSession<H::Node, H::Element>,
    ) -> Result<TrackerAction, LevelUpError> {
        let text = selected_text(host);
        if text.is_empty() {
            return Err(LevelUpError::NoSelection);
        }
        let position = self.capture(host, session, text);
        Ok(TrackerAction::ShowToolbar(position))
    }

    /// Periodic check while the toolbar is visible
    pub fn poll_liveness<H: DocumentHost>(&mut self, host: &H) -> TrackerAction {
        if !self.toolbar_visible {
            return TrackerAction::DismissToolbar;
        }
        if !has_live_selection(host) {
            info!("Selection no longer active, removing floating bar");
            self.toolbar_visible = false;
            return TrackerAction::DismissToolbar;
        }
        TrackerAction::None
    }

    /// Pointer pressed somewhere on the page
    pub fn pointer_pressed<H: DocumentHost>(&mut self, host: &H, inside_toolbar: bool) -> TrackerAction {
        if self.toolbar_visible && !inside_toolbar && !has_live_selection(host) {
            self.toolbar_visible = false;
            return TrackerAction::DismissToolbar;
        }
        TrackerAction::None
    }

    /// The toolbar was removed by the UI (action taken or dismissed).
    ///
    /// Pending debounce tickets are invalidated.
    pub fn toolbar_dismissed(&mut self) {
        self.toolbar_visible = false;
        self.latest_ticket += 1;
    }

    fn capture<H: DocumentHost>(
        &mut self,
        host: &H,
        session: &mut SelectionSession<H::Node, H::Element>,
        text: String,
    ) -> FloatingAnchorPosition {
        let captured_at = session.next_sequence();

        let anchor = match host.form_selection() {
            Some(form) => {
                let element = form.element.clone();
                SelectionAnchor::new(
                    Some(AnchorBoundary::FormControl {
                        element: form.element,
                        start: form.start,
                        end: form.end,
                    }),
                    Some(element),
                    text,
                    captured_at,
                )
            }
            None => SelectionAnchor::new(
                host.live_range().map(AnchorBoundary::Range),
                host.selection_element(),
                text,
                captured_at,
            ),
        };
        session.capture(anchor);

        let position = host
            .selection_rect()
            .filter(|r| r.width > 0.0 || r.height > 0.0)
            .map(|r| FloatingAnchorPosition::above(&r))
            .unwrap_or_else(|| {
                let (w, h) = host.viewport_size();
                FloatingAnchorPosition::viewport_fallback(w, h)
            });

        debug!("Anchor #{} captured, toolbar at ({}, {})", captured_at, position.x, position.y);
        self.toolbar_visible = true;
        position
    }
}

/// Trimmed selection text, falling back to the focused form control's
/// selected substring when the document selection reports nothing
fn selected_text<H: DocumentHost>(host: &H) -> String {
    let text = host.selection_text().trim().to_string();
    if !text.is_empty() {
        return text;
    }
    host.form_selection()
        .and_then(|form| slice_utf16(&form.value, form.start, form.end))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Whether anything is still selected, in the document or a form control
fn has_live_selection<H: DocumentHost>(host: &H) -> bool {
    !selected_text(host).is_empty()
}
