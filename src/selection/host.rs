//! Page access used by the selection tracker and replacement engine
//!
//! [`DocumentHost`] is the seam between the selection logic and the page.
//! The browser implementation lives in `api::dom`; tests use an in-memory
//! page. Node and element handles are opaque to the core.

use thiserror::Error;

use super::anchor::{RangeBoundaries, SelectionRect};

/// A DOM operation failed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    #[error("range boundary is detached or out of bounds")]
    StaleBoundary,

    #[error("no selection range available")]
    NoRange,

    #[error("element does not accept a value")]
    NotFormControl,

    #[error("DOM error: {0}")]
    Dom(String),
}

/// The selection inside a focused `<input>` or `<textarea>`
#[derive(Clone, Debug, PartialEq)]
pub struct FormSelection<E> {
    pub element: E,
    pub value: String,
    /// UTF-16 offsets
    pub start: u32,
    pub end: u32,
}

/// Read and mutate the page's selection and content
pub trait DocumentHost {
    /// Handle to a node that can serve as a range boundary container
    type Node: Clone + PartialEq;

    /// Handle to an element
    type Element: Clone + PartialEq;

    /// Text of the live selection, untrimmed (empty when there is none)
    fn selection_text(&self) -> String;

    /// Boundaries of the first live selection range
    fn live_range(&self) -> Option<RangeBoundaries<Self::Node>>;

    /// Parent element of the selection's anchor node
    fn selection_element(&self) -> Option<Self::Element>;

    /// Selection inside the focused form control, if one is focused and has
    /// a non-collapsed selection
    fn form_selection(&self) -> Option<FormSelection<Self::Element>>;

    /// Bounding rectangle of the first live selection range
    fn selection_rect(&self) -> Option<SelectionRect>;

    /// Viewport size as `(width, height)`
    fn viewport_size(&self) -> (f64, f64);

    /// Whether the element is an `<input>` or `<textarea>`
    fn is_form_control(&self, element: &Self::Element) -> bool;

    /// Current value of a form control
    fn form_value(&self, element: &Self::Element) -> Option<String>;

    /// Whether both boundaries still address attached nodes within bounds
    fn boundaries_valid(&self, range: &RangeBoundaries<Self::Node>) -> bool;

    /// Delete the range's contents and insert one text node with `text`
    fn replace_range(&mut self, range: &RangeBoundaries<Self::Node>, text: &str) -> Result<(), HostError>;

    /// Delete the live selection's contents and insert one text node
    fn replace_live_selection(&mut self, text: &str) -> Result<(), HostError>;

    /// Set a form control's value
    fn set_form_value(&mut self, element: &Self::Element, value: &str) -> Result<(), HostError>;

    /// Replace all of an element's contents with one text node
    fn replace_element_contents(&mut self, element: &Self::Element, text: &str) -> Result<(), HostError>;

    /// Remove every live selection range
    fn clear_selection(&mut self);
}
