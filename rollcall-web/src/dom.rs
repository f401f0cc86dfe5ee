//! Thin wrappers over the browser globals the collaborators need.

use std::time::Duration;

use js_sys::Promise;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Response, Storage, Window};

/// The global `window`.
///
/// # Panics
/// Panics outside a browser context.
#[must_use]
pub fn window() -> Window {
    web_sys::window().expect("`window` should be available in web context")
}

/// Best-effort text for a thrown JS value.
#[must_use]
pub fn js_error_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    match value.dyn_ref::<js_sys::Error>() {
        Some(err) => String::from(err.message()),
        None => format!("{value:?}"),
    }
}

pub fn console_error(message: &str) {
    web_sys::console::error_1(&JsValue::from_str(message));
}

/// Resolve after `duration` via `setTimeout`. Durations past `i32::MAX`
/// milliseconds are capped.
///
/// # Errors
/// Returns the JS exception if the timer cannot be scheduled.
#[allow(clippy::future_not_send)] // `JsFuture` is not `Send`.
pub async fn sleep(duration: Duration) -> Result<(), JsValue> {
    let millis = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
    let mut scheduled = Ok(0);
    let timer = Promise::new(&mut |resolve, _reject| {
        scheduled = window()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis);
    });
    scheduled?;
    JsFuture::from(timer).await.map(drop)
}

/// GET `url` and return the status with the body text. Non-2xx statuses are
/// not errors.
///
/// # Errors
/// Returns the JS exception if the request never completes or the body cannot
/// be read as text.
#[allow(clippy::future_not_send)]
pub async fn fetch_text(url: &str) -> Result<(u16, String), JsValue> {
    let response: Response = JsFuture::from(window().fetch_with_str(url))
        .await?
        .dyn_into()?;
    let body = JsFuture::from(response.text()?).await?;
    let body = body
        .as_string()
        .ok_or_else(|| JsValue::from_str("response body is not text"))?;
    Ok((response.status(), body))
}

/// The page's `localStorage`.
///
/// # Errors
/// Returns an error when storage is disabled or blocked.
pub fn local_storage() -> Result<Storage, JsValue> {
    window()
        .local_storage()?
        .ok_or_else(|| JsValue::from_str("localStorage unavailable"))
}
