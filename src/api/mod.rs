//! LevelUp WASM API
//!
//! JavaScript-facing entry points, one module per extension context.
//!
//! # Module Structure
//!
//! - `helpers`: serialization across the boundary, error conversion, notices
//! - `dom`: the web-sys page host
//! - `toolbar`: floating toolbar, loading indicator and result dialog widgets
//! - `content`: content script controller and its exports
//! - `background`: service worker message and context-menu handling
//! - `popup`: history and settings operations for the popup page

pub mod helpers;
pub mod dom;
pub mod toolbar;
pub mod content;
pub mod background;
pub mod popup;

pub use background::{context_menu_item, handle_background_message, merge_install_settings, route_context_menu_click};
pub use content::{
    apply_tone, close_result_dialog, copy_selection, enhance_selection, handle_content_message, init_content_script, insert_result,
    meaning_of_selection, regenerate, set_lifecycle_listener,
};
pub use dom::WebPage;
pub use toolbar::{DialogAction, DialogLayout, FloatingToolbar, ResultDialog, ToolbarAction};
