//! Filesystem and tokio collaborators for running the roster store natively.

use std::io::ErrorKind;
use std::time::Duration;

use async_trait::async_trait;
use rollcall_core::{ConfigFetcher, FetchResponse, PickDelay};

/// Treats the "url" as a local path. Missing files answer 404.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

#[async_trait(?Send)]
impl ConfigFetcher for FileFetcher {
    type Error = std::io::Error;

    async fn fetch(&self, url: &str) -> Result<FetchResponse, Self::Error> {
        match tokio::fs::read_to_string(url).await {
            Ok(body) => Ok(FetchResponse { status: 200, body }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(FetchResponse {
                status: 404,
                body: String::new(),
            }),
            Err(err) => Err(err),
        }
    }
}

/// Sleeps for the requested duration, or not at all when disabled.
#[derive(Debug, Clone, Copy)]
pub struct TokioDelay {
    pub enabled: bool,
}

#[async_trait(?Send)]
impl PickDelay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        if self.enabled {
            tokio::time::sleep(duration).await;
        }
    }
}
