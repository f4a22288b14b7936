//! Captured selection anchors
//!
//! An anchor is an immutable snapshot of where the user's selection was when
//! it settled. Boundaries are copied out of the live range at capture time;
//! nothing here holds a live range across a suspension point.

use serde::{Deserialize, Serialize};

/// Gap between the toolbar and the top of the selection (px)
pub const TOOLBAR_OFFSET_Y: f64 = 50.0;

/// Minimum distance between the toolbar and the viewport top (px)
pub const VIEWPORT_MARGIN: f64 = 10.0;

/// Half the toolbar width, used to center the fallback position (px)
const TOOLBAR_HALF_WIDTH: f64 = 85.0;

/// One end of a range: a node plus an offset into it
#[derive(Clone, Debug, PartialEq)]
pub struct Boundary<N> {
    pub node: N,
    pub offset: u32,
}

impl<N> Boundary<N> {
    pub fn new(node: N, offset: u32) -> Self {
        Self { node, offset }
    }
}

/// Start and end of a document range
#[derive(Clone, Debug, PartialEq)]
pub struct RangeBoundaries<N> {
    pub start: Boundary<N>,
    pub end: Boundary<N>,
}

impl<N> RangeBoundaries<N> {
    pub fn new(start: Boundary<N>, end: Boundary<N>) -> Self {
        Self { start, end }
    }
}

/// Where the captured text lives
#[derive(Clone, Debug, PartialEq)]
pub enum AnchorBoundary<N, E> {
    /// A range in the document tree
    Range(RangeBoundaries<N>),

    /// A selection inside an `<input>` or `<textarea>` (UTF-16 offsets)
    FormControl { element: E, start: u32, end: u32 },
}

/// A captured selection
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionAnchor<N, E> {
    boundary: Option<AnchorBoundary<N, E>>,
    element: Option<E>,
    captured_text: String,
    captured_at: u64,
}

impl<N, E> SelectionAnchor<N, E> {
    pub fn new(
        boundary: Option<AnchorBoundary<N, E>>,
        element: Option<E>,
        captured_text: String,
        captured_at: u64,
    ) -> Self {
        Self {
            boundary,
            element,
            captured_text,
            captured_at,
        }
    }

    /// Stored boundaries, if the selection had a range
    pub fn boundary(&self) -> Option<&AnchorBoundary<N, E>> {
        self.boundary.as_ref()
    }

    /// Nearest element containing the selection start
    pub fn element(&self) -> Option<&E> {
        self.element.as_ref()
    }

    pub fn captured_text(&self) -> &str {
        &self.captured_text
    }

    /// Logical capture sequence number
    pub fn captured_at(&self) -> u64 {
        self.captured_at
    }
}

/// Bounding rectangle of a selection in viewport coordinates
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Viewport position of the floating toolbar
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloatingAnchorPosition {
    pub x: f64,
    pub y: f64,
}

impl FloatingAnchorPosition {
    /// Place the toolbar above the selection, never closer than the margin
    /// to the top of the viewport.
    pub fn above(rect: &SelectionRect) -> Self {
        Self {
            x: rect.left,
            y: (rect.top - TOOLBAR_OFFSET_Y).max(VIEWPORT_MARGIN),
        }
    }

    /// Position used when the selection has no usable rectangle
    pub fn viewport_fallback(viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            x: viewport_width / 2.0 - TOOLBAR_HALF_WIDTH,
            y: viewport_height / 3.0,
        }
    }
}

/// Replace the UTF-16 range `[start, end)` of `value` with `replacement`.
///
/// Offsets are the ones the DOM reports for form controls. Returns `None`
/// when the range does not fit the value.
pub fn splice_utf16(value: &str, start: u32, end: u32, replacement: &str) -> Option<String> {
    let units: Vec<u16> = value.encode_utf16().collect();
    let (start, end) = (start as usize, end as usize);
    if start > end || end > units.len() {
        return None;
    }

    let mut out: Vec<u16> = Vec::with_capacity(units.len() + replacement.len());
    out.extend_from_slice(&units[..start]);
    out.extend(replacement.encode_utf16());
    out.extend_from_slice(&units[end..]);
    Some(String::from_utf16_lossy(&out))
}

/// Extract the UTF-16 range `[start, end)` of `value`
pub fn slice_utf16(value: &str, start: u32, end: u32) -> Option<String> {
    let units: Vec<u16> = value.encode_utf16().collect();
    let (start, end) = (start as usize, end as usize);
    if start > end || end > units.len() {
        return None;
    }
    Some(String::from_utf16_lossy(&units[start..end]))
}
