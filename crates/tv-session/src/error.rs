// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use thiserror::Error;
use tv_fetch::FetchError;
use tv_payload::PayloadError;

pub type Result<T> = std::result::Result<T, SessionError>;

/// Failures reported while acquiring or loading a payload.
///
/// None of them touch the currently loaded payload.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid url: {0}")]
    InvalidUrl(#[source] FetchError),

    #[error("Payload fetch failed: {0}")]
    FetchFailed(#[source] FetchError),

    #[error("Invalid payload: {0}")]
    SchemaRejected(#[source] PayloadError),

    /// Body or uploaded file is not JSON.
    #[error("Unreadable payload: {0}")]
    Decode(#[source] PayloadError),

    #[error("Cannot read payload file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Event index {index} is out of range ({len} events loaded)")]
    SelectionOutOfRange { index: usize, len: usize },
}

impl From<FetchError> for SessionError {
    fn from(err: FetchError) -> Self {
        if err.is_fetch_failure() {
            Self::FetchFailed(err)
        } else {
            Self::InvalidUrl(err)
        }
    }
}

impl From<PayloadError> for SessionError {
    fn from(err: PayloadError) -> Self {
        if let PayloadError::Io(io) = err {
            return Self::Io(io);
        }
        if err.is_schema_rejection() {
            Self::SchemaRejected(err)
        } else {
            Self::Decode(err)
        }
    }
}
