#![allow(dead_code)]

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use rollcall_core::{ConfigFetcher, Entry, FetchResponse};

/// Serves canned bodies by URL; unknown URLs answer 404.
#[derive(Debug, Default, Clone)]
pub struct StubFetcher {
    routes: HashMap<String, FetchResponse>,
}

#[derive(Debug)]
pub struct Unreachable;

impl fmt::Display for Unreachable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("connection refused")
    }
}

impl std::error::Error for Unreachable {}

impl StubFetcher {
    #[must_use]
    pub fn serve(mut self, url: &str, body: impl Into<String>) -> Self {
        self.routes.insert(
            url.to_string(),
            FetchResponse {
                status: 200,
                body: body.into(),
            },
        );
        self
    }

    #[must_use]
    pub fn status(mut self, url: &str, status: u16) -> Self {
        self.routes.insert(
            url.to_string(),
            FetchResponse {
                status,
                body: String::new(),
            },
        );
        self
    }
}

#[async_trait(?Send)]
impl ConfigFetcher for StubFetcher {
    type Error = Unreachable;

    async fn fetch(&self, url: &str) -> Result<FetchResponse, Self::Error> {
        if url.starts_with("offline:") {
            return Err(Unreachable);
        }
        Ok(self.routes.get(url).cloned().unwrap_or(FetchResponse {
            status: 404,
            body: String::new(),
        }))
    }
}

pub fn entry(id: &str, weight: f64) -> Entry {
    Entry {
        id: id.to_string(),
        name: id.to_uppercase(),
        weight,
        group: None,
        info: None,
    }
}
