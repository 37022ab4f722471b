// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Fetch error types

use reqwest::StatusCode;
use thiserror::Error;

pub type FetchResult<T> = Result<T, FetchError>;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The `payload` query value is not a well-formed absolute URL.
    #[error("Invalid payload URL {value:?}: {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    /// The server answered with a non-success status.
    #[error("Failed to load the data from {url}: HTTP {status}")]
    Status { url: String, status: StatusCode },

    /// The request never produced a response.
    #[error("Failed to load the data: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not JSON.
    #[error("Payload response is not valid JSON: {0}")]
    Decode(#[source] reqwest::Error),
}

impl FetchError {
    /// Everything past URL parsing counts as a failed fetch.
    pub fn is_fetch_failure(&self) -> bool {
        !matches!(self, Self::InvalidUrl { .. })
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }
}
