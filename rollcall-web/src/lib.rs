#![forbid(unsafe_code)]
//! Browser shell for Rollcall: `localStorage` persistence, `fetch` transport,
//! a `setTimeout` pick delay and the [`bindings::Rollcall`] handle the page
//! scripts against.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod bindings;
pub mod dom;
pub mod platform;

pub use bindings::Rollcall;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    log::debug!("rollcall-web started");
}
