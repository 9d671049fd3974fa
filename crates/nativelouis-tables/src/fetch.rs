// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Where table sources are downloaded from.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use nativelouis_core::error::{LouisError, Result};

/// Source of table files by name.
#[async_trait]
pub trait TableFetcher: Send + Sync {
    /// Text of the table called `name`.
    async fn fetch(&self, name: &str) -> Result<String>;
}

/// Downloads tables over HTTP from a directory URL.
pub struct HttpFetcher {
    client: Client,
    base_url: String,
}

impl HttpFetcher {
    /// The `tables/` directory of the upstream liblouis repository.
    pub const DEFAULT_BASE_URL: &'static str =
        "https://raw.githubusercontent.com/liblouis/liblouis/master/tables/";

    pub fn new() -> Self {
        Self::with_base_url(Self::DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn url_for(&self, name: &str) -> String {
        format!("{}/{name}", self.base_url.trim_end_matches('/'))
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TableFetcher for HttpFetcher {
    async fn fetch(&self, name: &str) -> Result<String> {
        let url = self.url_for(name);
        debug!(%url, "downloading table");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LouisError::Download(format!("{url}: {e}")))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(LouisError::Download(format!(
                "HTTP {} for {url}",
                status.as_u16()
            )));
        }
        response
            .text()
            .await
            .map_err(|e| LouisError::Download(format!("{url}: {e}")))
    }
}
