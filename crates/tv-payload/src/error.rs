// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use thiserror::Error;

/// Convenient result alias for payload operations.
pub type Result<T> = std::result::Result<T, PayloadError>;

/// Errors that can occur while decoding or admitting a payload.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// Underlying IO error while reading an uploaded payload file.
    #[error("Payload IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Body was not valid JSON.
    #[error("Payload decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Top-level JSON value was not an object.
    #[error("Payload rejected: expected a JSON object at the top level, got {0}")]
    NotAnObject(&'static str),

    /// Payload carried top-level keys outside the recognized set.
    #[error("Payload rejected: unrecognized top-level keys {}", .0.join(", "))]
    SchemaRejected(Vec<String>),
}

impl PayloadError {
    /// True for errors raised by the schema gate rather than by IO or decoding.
    pub fn is_schema_rejection(&self) -> bool {
        matches!(self, Self::NotAnObject(_) | Self::SchemaRejected(_))
    }
}
