//! Browser entry point wiring the headless controllers to the live page.
//!
//! Compiled to WebAssembly with wasm-bindgen. Site behaviors attach on every
//! page; the deck controller only where a presentation container exists.
//! Each behavior no-ops when its target elements are missing, and a failure
//! in one controller never takes down the other.

mod presentation;
mod site;

use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    site::init(&window, &document);
    presentation::init(&window, &document);
}
