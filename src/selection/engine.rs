//! Replacement engine
//!
//! Writes replacement text back into the page. The live DOM can drift
//! between capture and insertion, so the engine walks an ordered list of
//! strategies and stops at the first that succeeds:
//!
//! 1. the anchor's stored boundaries,
//! 2. the live selection, if non-empty,
//! 3. the anchor element's value, if it is a form control,
//! 4. the anchor element's full contents.
//!
//! When none applies the caller gets [`LevelUpError::ReplacementFailed`].
//! After any success the live selection is cleared.

use log::{info, warn};
use serde::Serialize;

use super::anchor::{splice_utf16, AnchorBoundary, SelectionAnchor};
use super::host::{DocumentHost, HostError};
use super::session::SelectionSession;
use crate::error::LevelUpError;

/// Which strategy performed the replacement
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReplacementPath {
    StoredAnchor,
    LiveSelection,
    FormControlValue,
    ElementContents,
}

/// Replace the session's captured selection with `text`.
///
/// The anchor is consumed whatever the outcome.
pub fn replace_selection<H: DocumentHost>(
    host: &mut H,
    session: &mut SelectionSession<H::Node, H::Element>,
    text: &str,
) -> Result<ReplacementPath, LevelUpError> {
    let anchor = session.take();
    let path = run_chain(host, anchor.as_ref(), text)?;
    host.clear_selection();
    info!("Text replaced via {:?}", path);
    Ok(path)
}

fn run_chain<H: DocumentHost>(
    host: &mut H,
    anchor: Option<&SelectionAnchor<H::Node, H::Element>>,
    text: &str,
) -> Result<ReplacementPath, LevelUpError> {
    if let Some(boundary) = anchor.and_then(|a| a.boundary()) {
        match replace_at_boundary(host, boundary, text) {
            Ok(()) => return Ok(ReplacementPath::StoredAnchor),
            Err(e) => warn!("Stored anchor unusable: {}", e),
        }
    }

    if !host.selection_text().is_empty() {
        match host.replace_live_selection(text) {
            Ok(()) => return Ok(ReplacementPath::LiveSelection),
            Err(e) => warn!("Live selection replacement failed: {}", e),
        }
    }

    let element = match anchor.and_then(|a| a.element()) {
        Some(element) => element,
        None => return Err(LevelUpError::ReplacementFailed),
    };

    if host.is_form_control(element) {
        return host
            .set_form_value(element, text)
            .map(|()| ReplacementPath::FormControlValue)
            .map_err(|e| {
                warn!("Setting form value failed: {}", e);
                LevelUpError::ReplacementFailed
            });
    }

    host.replace_element_contents(element, text)
        .map(|()| ReplacementPath::ElementContents)
        .map_err(|e| {
            warn!("Element replacement failed: {}", e);
            LevelUpError::ReplacementFailed
        })
}

fn replace_at_boundary<H: DocumentHost>(
    host: &mut H,
    boundary: &AnchorBoundary<H::Node, H::Element>,
    text: &str,
) -> Result<(), HostError> {
    match boundary {
        AnchorBoundary::Range(range) => {
            if !host.boundaries_valid(range) {
                return Err(HostError::StaleBoundary);
            }
            host.replace_range(range, text)
        }
        AnchorBoundary::FormControl { element, start, end } => {
            let value = host.form_value(element).ok_or(HostError::NotFormControl)?;
            let spliced = splice_utf16(&value, *start, *end, text).ok_or(HostError::StaleBoundary)?;
            host.set_form_value(element, &spliced)
        }
    }
}
