//! SoloSphere - authentication surface
//!
//! Sign-up, sign-in, social sign-in, password recovery and protected pages
//! for the SoloSphere freelance platform, on top of a hosted GoTrue identity
//! service. Built with Leptos; the server renders and the wasm bundle hydrates.

#![recursion_limit = "4096"]

pub mod app;
pub mod core;
#[cfg(feature = "ssr")]
pub mod server;
pub mod ui;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::app::*;
    console_error_panic_hook::set_once();
    // Core code logs through `tracing`; without a subscriber its events
    // reach the browser console through `log`
    if let Err(error) = console_log::init_with_level(log::Level::Info) {
        leptos::logging::warn!("Console logging unavailable: {}", error);
    }
    leptos::mount::hydrate_body(App);
}
