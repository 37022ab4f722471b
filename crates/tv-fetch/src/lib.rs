// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Payload fetch source for the trace viewer
//!
//! Reads the `payload` query parameter, checks it is an absolute URL and
//! downloads it exactly once. Retries, caching and de-duplication are left
//! to the caller; superseded downloads are discarded by the session store.

pub mod client;
pub mod error;
pub mod query;

pub use client::*;
pub use error::*;
pub use query::{PATH_PREFIX_PARAM, PAYLOAD_PARAM, PayloadQuery, parse_payload_url};
pub use reqwest::StatusCode;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

/// Anything that can turn a payload URL into a decoded JSON body.
///
/// The session controller depends on this seam rather than on
/// [`PayloadClient`] directly so that tests can stage responses.
#[async_trait]
pub trait PayloadFetch: Send + Sync {
    async fn fetch(&self, url: &Url) -> FetchResult<Value>;
}

#[async_trait]
impl PayloadFetch for client::PayloadClient {
    async fn fetch(&self, url: &Url) -> FetchResult<Value> {
        self.fetch_json(url).await
    }
}
