// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! HTTP client for payload downloads

use std::time::Duration;

use reqwest::{Client as HttpClient, Response};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{FetchError, FetchResult};

const USER_AGENT: &str = concat!("trace-viewer/", env!("CARGO_PKG_VERSION"));

/// Client tunables. There is deliberately no retry policy here.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub user_agent: String,
    pub timeout: Option<Duration>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            timeout: Some(Duration::from_secs(60)),
        }
    }
}

/// One-shot payload downloader
#[derive(Debug, Clone)]
pub struct PayloadClient {
    http_client: HttpClient,
}

impl PayloadClient {
    pub fn new() -> FetchResult<Self> {
        Self::with_options(FetchOptions::default())
    }

    pub fn with_options(options: FetchOptions) -> FetchResult<Self> {
        let mut builder = HttpClient::builder().user_agent(options.user_agent);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http_client: builder.build()?,
        })
    }

    /// GET `url` once and decode the body as JSON.
    pub async fn fetch_json(&self, url: &Url) -> FetchResult<Value> {
        debug!(%url, "requesting payload");
        let response = self.http_client.get(url.clone()).send().await?;
        self.handle_response(url, response).await
    }

    async fn handle_response(&self, url: &Url, response: Response) -> FetchResult<Value> {
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        response.json::<Value>().await.map_err(|err| {
            if err.is_decode() {
                FetchError::Decode(err)
            } else {
                FetchError::Transport(err)
            }
        })
    }
}
