//! Browser front end for the in-browser LLM chat widget
//!
//! Binds `llm-widget-core` to the page: web-llm as the engine, the DOM as
//! the chat log and status line, Cache Storage as the weight cache, and
//! `fetch` for `config.json`. Everything here is `wasm32`-only.

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
pub mod dom;
#[cfg(target_arch = "wasm32")]
pub mod engine;
#[cfg(target_arch = "wasm32")]
mod fetch;
#[cfg(target_arch = "wasm32")]
pub mod logger;
#[cfg(target_arch = "wasm32")]
mod storage;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{prelude::*, JsCast};

/// Entry point run by `wasm-bindgen` once the module is instantiated
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    logger::init(log::LevelFilter::Info);
    app::mount()
}

/// Best human-readable description of a thrown JS value
#[cfg(target_arch = "wasm32")]
pub(crate) fn js_error(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{:?}", value)
}
