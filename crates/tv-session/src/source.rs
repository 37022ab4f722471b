// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Where payloads come from: a remote URL or a user-picked file.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;
use tv_fetch::PayloadFetch;
use tv_payload::RawPayload;
use url::Url;

use crate::error::Result;
use crate::store::Origin;

/// A decoded payload that has not been validated yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Acquisition {
    pub origin: Origin,
    pub payload: RawPayload,
}

/// Payload behind a URL. The label is the trimmed query value.
#[derive(Clone)]
pub struct FetchSource {
    pub url: Url,
    pub label: String,
    fetcher: Arc<dyn PayloadFetch>,
}

impl fmt::Debug for FetchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchSource")
            .field("url", &self.url.as_str())
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl FetchSource {
    pub fn new(url: Url, label: impl Into<String>, fetcher: Arc<dyn PayloadFetch>) -> Self {
        Self {
            url,
            label: label.into(),
            fetcher,
        }
    }

    pub async fn acquire(&self) -> Result<Acquisition> {
        let body = self.fetcher.fetch(&self.url).await?;
        let payload = RawPayload::from_value(body)?;
        Ok(Acquisition {
            origin: Origin::fetch(self.label.clone()),
            payload,
        })
    }
}

/// File contents the user supplied, named after the file.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadSource {
    pub file_name: String,
    contents: Vec<u8>,
}

impl UploadSource {
    pub fn from_bytes(file_name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            contents: contents.into(),
        }
    }

    pub fn from_json(file_name: impl Into<String>, text: &str) -> Self {
        Self::from_bytes(file_name, text.as_bytes())
    }

    /// Read `path` from disk; the label is its final component.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        debug!(path = %path.display(), bytes = contents.len(), "payload file read");
        Ok(Self::from_bytes(file_name, contents))
    }

    pub fn acquire(&self) -> Result<Acquisition> {
        let payload = RawPayload::from_slice(&self.contents)?;
        Ok(Acquisition {
            origin: Origin::upload(self.file_name.clone()),
            payload,
        })
    }
}

/// Either acquisition path.
#[derive(Debug, Clone)]
pub enum AcquisitionSource {
    Fetch(FetchSource),
    Upload(UploadSource),
}

impl AcquisitionSource {
    pub async fn acquire(&self) -> Result<Acquisition> {
        match self {
            Self::Fetch(source) => source.acquire().await,
            Self::Upload(source) => source.acquire(),
        }
    }
}

impl From<FetchSource> for AcquisitionSource {
    fn from(source: FetchSource) -> Self {
        Self::Fetch(source)
    }
}

impl From<UploadSource> for AcquisitionSource {
    fn from(source: UploadSource) -> Self {
        Self::Upload(source)
    }
}
