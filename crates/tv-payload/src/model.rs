// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

use crate::{PayloadError, Result};

pub(crate) const KEY_ID: &str = "id";
pub(crate) const KEY_META: &str = "meta";
pub(crate) const KEY_EVENTS: &str = "cy";
pub(crate) const KEY_REPLAY: &str = "rr";
pub(crate) const KEY_ARCHIVE: &str = "har";
pub(crate) const KEY_PLUGIN_META: &str = "pluginMeta";
pub(crate) const KEY_BROWSER_LOGS: &str = "browserLogs";

/// Untrusted payload exactly as decoded from an upload or a fetch body.
///
/// Only the top-level key names are ever checked (see [`crate::validate`]);
/// the values are carried as plain JSON until normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPayload(Map<String, Value>);

impl RawPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept an already-decoded JSON value. Anything but an object is rejected.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(PayloadError::NotAnObject(json_kind(&other))),
        }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Self::from_slice(text.as_bytes())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for RawPayload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// One captured UI-interaction event (a Cypress command log entry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event(Value);

impl Event {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    pub fn payload(&self) -> Option<&Value> {
        self.0.get("payload")
    }

    /// Parsed stack frames of the error attached to this event. An empty
    /// `parsedStack` counts as no stack.
    pub fn parsed_stack(&self) -> Option<&[Value]> {
        self.0
            .pointer("/payload/err/parsedStack")
            .and_then(Value::as_array)
            .filter(|frames| !frames.is_empty())
            .map(Vec::as_slice)
    }
}

impl From<Value> for Event {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Opaque session-replay frame handed to the external replay engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frame(Value);

impl Frame {
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for Frame {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// HTTP archive captured alongside the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Archive(Value);

impl Archive {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Request/response records under `log.entries`; empty when the archive
    /// has no such list.
    pub fn entries(&self) -> &[Value] {
        self.0.pointer("/log/entries").and_then(Value::as_array).map_or(&[], Vec::as_slice)
    }

    pub fn entry_count(&self) -> usize {
        self.entries().len()
    }
}

impl From<Value> for Archive {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Browser console output captured over the DevTools protocol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserLogs {
    #[serde(default)]
    pub log_entry: Vec<Value>,
    #[serde(default)]
    pub runtime_console_api_called: Vec<Value>,
}

impl BrowserLogs {
    /// Lenient projection of a raw `browserLogs` value. Non-object values
    /// produce `None`; a list of the wrong shape is read as empty.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut map) = value else {
            return None;
        };
        let mut take = |key: &str| match map.remove(key) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        Some(Self {
            log_entry: take("logEntry"),
            runtime_console_api_called: take("runtimeConsoleApiCalled"),
        })
    }

    pub fn total(&self) -> usize {
        self.log_entry.len() + self.runtime_console_api_called.len()
    }
}

/// Final outcome label of the captured test.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TestState {
    Passed,
    Failed,
    Pending,
    Skipped,
    /// A label outside the known set, kept verbatim.
    Unknown(String),
    #[default]
    Missing,
}

impl TestState {
    pub fn parse(label: &str) -> Self {
        match label {
            "passed" => Self::Passed,
            "failed" => Self::Failed,
            "pending" => Self::Pending,
            "skipped" => Self::Skipped,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Pending => "pending",
            Self::Skipped => "skipped",
            Self::Unknown(label) => label,
            Self::Missing => "",
        }
    }
}

impl fmt::Display for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TestState {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Source location derived from the first captured stack trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    /// Project-relative path; empty when it could not be resolved.
    pub absolute_file: String,
    pub line: u32,
    pub column: u32,
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self {
            absolute_file: String::new(),
            line: 1,
            column: 1,
        }
    }
}

const META_SPEC: &str = "spec";
const META_TEST: &str = "test";
const META_STATE: &str = "state";
const META_RETRY: &str = "retryAttempt";
const META_ABSOLUTE_FILE: &str = "absoluteFile";
const META_LINE: &str = "line";
const META_COLUMN: &str = "column";

/// Per-payload test metadata, shallow-merged with the derived location.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub spec: String,
    /// Suite and test titles, outermost first.
    pub test: Vec<String>,
    pub state: TestState,
    pub retry_attempt: u32,
    pub source_location: SourceLocation,
    /// Raw meta keys this model does not interpret, carried through untouched.
    pub extra: Map<String, Value>,
}

impl Metadata {
    pub fn from_raw(raw: Value, source_location: SourceLocation) -> Self {
        let Value::Object(mut map) = raw else {
            return Self {
                source_location,
                ..Self::default()
            };
        };

        let spec = match map.remove(META_SPEC) {
            Some(Value::String(spec)) => spec,
            _ => String::new(),
        };
        let test = match map.remove(META_TEST) {
            Some(Value::Array(titles)) => titles
                .into_iter()
                .filter_map(|title| match title {
                    Value::String(title) => Some(title),
                    _ => None,
                })
                .collect(),
            Some(Value::String(title)) => vec![title],
            _ => Vec::new(),
        };
        let state = match map.remove(META_STATE) {
            Some(Value::String(label)) => TestState::parse(&label),
            _ => TestState::Missing,
        };
        let retry_attempt = map
            .remove(META_RETRY)
            .and_then(|v| v.as_u64())
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0);

        // Derived fields win over whatever the capture put there.
        for key in [META_ABSOLUTE_FILE, META_LINE, META_COLUMN] {
            map.remove(key);
        }

        Self {
            spec,
            test,
            state,
            retry_attempt,
            source_location,
            extra: map,
        }
    }

    /// Test titles joined the way the panel header shows them.
    pub fn title_path(&self) -> String {
        self.test.join(" > ")
    }

    /// One-based attempt number, only when the test was retried.
    pub fn display_attempt(&self) -> Option<u32> {
        (self.retry_attempt > 0).then(|| self.retry_attempt.saturating_add(1))
    }

    pub fn to_json(&self) -> Map<String, Value> {
        let mut map = self.extra.clone();
        map.insert(META_SPEC.into(), Value::String(self.spec.clone()));
        map.insert(
            META_TEST.into(),
            Value::Array(self.test.iter().cloned().map(Value::String).collect()),
        );
        if self.state != TestState::Missing {
            map.insert(META_STATE.into(), Value::String(self.state.to_string()));
        }
        map.insert(META_RETRY.into(), Value::from(self.retry_attempt));
        map.insert(
            META_ABSOLUTE_FILE.into(),
            Value::String(self.source_location.absolute_file.clone()),
        );
        map.insert(META_LINE.into(), Value::from(self.source_location.line));
        map.insert(META_COLUMN.into(), Value::from(self.source_location.column));
        map
    }
}

impl Serialize for Metadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Trusted, fully populated projection of a validated payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalModel {
    pub events: Vec<Event>,
    pub replay_frames: Vec<Frame>,
    pub archive: Option<Archive>,
    pub meta: Option<Metadata>,
    pub browser_logs: Option<BrowserLogs>,
}

impl CanonicalModel {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn log_count(&self) -> usize {
        self.browser_logs.as_ref().map_or(0, BrowserLogs::total)
    }

    pub fn archive_entry_count(&self) -> usize {
        self.archive.as_ref().map_or(0, Archive::entry_count)
    }

    /// Project the model back onto the wire shape, e.g. to re-export a
    /// loaded payload.
    pub fn to_raw(&self) -> RawPayload {
        let mut raw = RawPayload::new();
        raw.insert(
            KEY_EVENTS,
            Value::Array(self.events.iter().map(|e| e.as_value().clone()).collect()),
        );
        raw.insert(
            KEY_REPLAY,
            Value::Array(self.replay_frames.iter().map(|f| f.as_value().clone()).collect()),
        );
        if let Some(archive) = &self.archive {
            raw.insert(KEY_ARCHIVE, archive.as_value().clone());
        }
        if let Some(meta) = &self.meta {
            raw.insert(KEY_META, Value::Object(meta.to_json()));
        }
        if let Some(logs) = &self.browser_logs {
            let mut map = Map::new();
            map.insert("logEntry".into(), Value::Array(logs.log_entry.clone()));
            map.insert(
                "runtimeConsoleApiCalled".into(),
                Value::Array(logs.runtime_console_api_called.clone()),
            );
            raw.insert(KEY_BROWSER_LOGS, Value::Object(map));
        }
        raw
    }
}
