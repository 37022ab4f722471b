// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Typed view of the resolved preferences, also the source of the schema
//! that every config file is validated against.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const FILEPATH_PREFIX: &str = "filepath-prefix";
pub const EDITOR_ROOT: &str = "editor-root";
pub const LOG_LEVEL: &str = "log-level";

/// Every key a config layer may set.
pub const KEYS: [&str; 3] = [FILEPATH_PREFIX, EDITOR_ROOT, LOG_LEVEL];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Prefix stripped from recorded spec paths when the `pathPrefix` query
    /// parameter is absent.
    pub filepath_prefix: Option<String>,

    /// Local checkout root used to build editor links.
    pub editor_root: Option<String>,

    pub log_level: Option<LogLevel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl Settings {
    /// String value of `key`, `None` when unset or unknown.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            FILEPATH_PREFIX => self.filepath_prefix.clone(),
            EDITOR_ROOT => self.editor_root.clone(),
            LOG_LEVEL => self.log_level.map(|level| level.as_str().to_string()),
            _ => None,
        }
    }
}

pub fn is_known_key(key: &str) -> bool {
    KEYS.contains(&key)
}
