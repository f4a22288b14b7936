//! LevelUp WASM Module
//!
//! Core of the LevelUp browser extension: captures the user's text
//! selection, sends it to the Gemini API for enhancement, and writes the
//! result back where the selection was.

pub mod api;
pub mod error;
pub mod flow;
pub mod generation;
pub mod models;
pub mod selection;
pub mod storage;

pub use error::LevelUpError;

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    init_logging();

    log::info!("LevelUp WASM module initialized");
}

#[cfg(feature = "console_log")]
fn init_logging() {
    if console_log::init_with_level(log::Level::Debug).is_err() {
        web_sys::console::warn_1(&"LevelUp logger already initialized".into());
    }
}

#[cfg(not(feature = "console_log"))]
fn init_logging() {}
