//! Selection capture and replacement
//!
//! Browser-independent core of the content script. Everything here works
//! against the [`DocumentHost`] trait, so the same logic runs on the real
//! page and on the in-memory page used by the tests.
//!
//! ## Modules
//!
//! - `anchor`: captured selection snapshots and toolbar positioning
//! - `host`: the page access trait
//! - `session`: single owner of the active anchor
//! - `tracker`: debounce and toolbar visibility decisions
//! - `engine`: ordered replacement fallback chain

pub mod anchor;
pub mod engine;
pub mod host;
pub mod session;
pub mod tracker;

pub use anchor::{
    AnchorBoundary, Boundary, FloatingAnchorPosition, RangeBoundaries, SelectionAnchor, SelectionRect,
};
pub use engine::{replace_selection, ReplacementPath};
pub use host::{DocumentHost, FormSelection, HostError};
pub use session::SelectionSession;
pub use tracker::{SelectionTracker, TrackerAction, DEBOUNCE_MS, LIVENESS_POLL_MS};
