// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use crate::{
    PayloadError, RawPayload, Result,
    model::{
        KEY_ARCHIVE, KEY_BROWSER_LOGS, KEY_EVENTS, KEY_ID, KEY_META, KEY_PLUGIN_META, KEY_REPLAY,
    },
};

/// Top-level keys a payload may carry.
pub const RECOGNIZED_KEYS: [&str; 7] = [
    KEY_ID,
    KEY_META,
    KEY_EVENTS,
    KEY_REPLAY,
    KEY_ARCHIVE,
    KEY_PLUGIN_META,
    KEY_BROWSER_LOGS,
];

pub fn is_recognized_key(key: &str) -> bool {
    RECOGNIZED_KEYS.contains(&key)
}

/// True iff every top-level key belongs to [`RECOGNIZED_KEYS`]. Values are
/// not inspected, and an empty payload is valid.
pub fn validate(payload: &RawPayload) -> bool {
    payload.keys().all(is_recognized_key)
}

/// Keys that make `payload` fail [`validate`], sorted.
pub fn unknown_keys(payload: &RawPayload) -> Vec<String> {
    let mut unknown: Vec<String> =
        payload.keys().filter(|key| !is_recognized_key(key)).map(str::to_string).collect();
    unknown.sort();
    unknown
}

pub fn ensure_valid(payload: &RawPayload) -> Result<()> {
    let unknown = unknown_keys(payload);
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(PayloadError::SchemaRejected(unknown))
    }
}
