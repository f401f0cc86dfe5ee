//! Browser implementations of the rollcall-core collaborator traits.

use std::time::Duration;

use async_trait::async_trait;
use rollcall_core::{ConfigFetcher, ConfigStorage, FetchResponse, PickDelay};

use crate::dom;

/// The page's `localStorage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageSlot;

#[derive(Debug, thiserror::Error)]
pub enum WebStorageError {
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ConfigStorage for LocalStorageSlot {
    type Error = WebStorageError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        dom::local_storage()
            .and_then(|storage| storage.get_item(key))
            .map_err(|err| WebStorageError::Storage(dom::js_error_message(&err)))
    }

    fn set(&self, key: &str, text: &str) -> Result<(), Self::Error> {
        dom::local_storage()
            .and_then(|storage| storage.set_item(key, text))
            .map_err(|err| WebStorageError::Storage(dom::js_error_message(&err)))
    }
}

/// `window.fetch`, one attempt, no retries.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserFetcher;

#[derive(Debug, thiserror::Error)]
pub enum WebFetchError {
    #[error("Network error: {0}")]
    Network(String),
}

#[async_trait(?Send)]
impl ConfigFetcher for BrowserFetcher {
    type Error = WebFetchError;

    async fn fetch(&self, url: &str) -> Result<FetchResponse, Self::Error> {
        let (status, body) = dom::fetch_text(url)
            .await
            .map_err(|err| WebFetchError::Network(dom::js_error_message(&err)))?;
        Ok(FetchResponse { status, body })
    }
}

/// `setTimeout`-backed pick delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeoutDelay;

#[async_trait(?Send)]
impl PickDelay for TimeoutDelay {
    async fn wait(&self, duration: Duration) {
        if let Err(err) = dom::sleep(duration).await {
            // Pick proceeds without the pause.
            dom::console_error(&dom::js_error_message(&err));
        }
    }
}
