// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Preferences for the trace viewer.
//!
//! Layers are merged in precedence order: user file < `TV_*` environment <
//! CLI flags. The user file is validated against the schema derived from
//! [`Settings`]; the merged result is extracted into the same type.

pub mod env;
pub mod loader;
pub mod merge;
pub mod paths;
pub mod settings;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::Result;
use serde_json::Value as J;

pub use loader::set_preference;
pub use paths::user_config_path;
pub use settings::{EDITOR_ROOT, FILEPATH_PREFIX, KEYS, LOG_LEVEL, LogLevel, Settings};

/// Where a resolved value came from.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum Scope {
    User,
    Env,
    Flags,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Scope::User => "user config",
            Scope::Env => "environment",
            Scope::Flags => "command line",
        })
    }
}

#[derive(Debug, Clone)]
pub struct Resolved {
    pub settings: Settings,
    /// Winning scope per key.
    pub winner: BTreeMap<String, Scope>,
}

impl Resolved {
    pub fn source_of(&self, key: &str) -> Option<Scope> {
        self.winner.get(key).copied()
    }
}

/// Resolve the user file at its standard location plus the process
/// environment and `flag_sets`.
pub fn load(flag_sets: &[(&str, &str)]) -> Result<Resolved> {
    load_layers(&user_config_path(), env::env_overlay()?, flag_sets)
}

/// Merge the layers starting from an explicit user file and env overlay.
pub fn load_layers(user_file: &Path, env_layer: J, flag_sets: &[(&str, &str)]) -> Result<Resolved> {
    let user_layer = loader::read_layer_from_file(user_file)?;
    let flags_layer = env::flags_overlay(flag_sets);

    let layers = [
        (user_layer, Scope::User),
        (Some(env_layer), Scope::Env),
        (Some(flags_layer), Scope::Flags),
    ];

    let mut json = J::Object(Default::default());
    let mut winner = BTreeMap::new();
    for (layer, scope) in layers {
        let Some(layer) = layer else { continue };
        if let J::Object(map) = &layer {
            for (key, value) in map {
                if !value.is_null() {
                    winner.insert(key.clone(), scope);
                }
            }
        }
        merge::merge_two_json(&mut json, layer);
    }

    let settings = serde_path_to_error::deserialize(json)
        .map_err(|e| anyhow::anyhow!("Settings extraction failed: {e}"))?;
    Ok(Resolved { settings, winner })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn precedence_user_env_flags() {
        let dir = tempfile::tempdir().expect("temp dir");
        let user = dir.path().join("config.toml");
        std::fs::write(
            &user,
            "filepath-prefix = \"/user\"\neditor-root = \"/src\"\nlog-level = \"warn\"\n",
        )
        .expect("write");

        let resolved = load_layers(
            &user,
            json!({"filepath-prefix": "/env", "log-level": "debug"}),
            &[("filepath-prefix", "/flag")],
        )
        .expect("resolve");

        assert_eq!(resolved.settings.filepath_prefix.as_deref(), Some("/flag"));
        assert_eq!(resolved.settings.editor_root.as_deref(), Some("/src"));
        assert_eq!(resolved.settings.log_level, Some(LogLevel::Debug));
        assert_eq!(resolved.source_of(FILEPATH_PREFIX), Some(Scope::Flags));
        assert_eq!(resolved.source_of(EDITOR_ROOT), Some(Scope::User));
        assert_eq!(resolved.source_of(LOG_LEVEL), Some(Scope::Env));
    }

    #[test]
    fn nothing_configured() {
        let dir = tempfile::tempdir().expect("temp dir");
        let resolved =
            load_layers(&dir.path().join("config.toml"), json!({}), &[]).expect("resolve");
        assert_eq!(resolved.settings, Settings::default());
        assert!(resolved.winner.is_empty());
        assert_eq!(resolved.settings.get(FILEPATH_PREFIX), None);
    }

    #[test]
    fn invalid_user_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let user = dir.path().join("config.toml");
        std::fs::write(&user, "theme = \"dark\"\n").expect("write");
        let err = load_layers(&user, json!({}), &[]).unwrap_err();
        assert!(format!("{err:#}").contains("validating"));
    }

    #[test]
    fn invalid_env_value_fails_extraction() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = load_layers(&dir.path().join("none.toml"), json!({"log-level": "loud"}), &[])
            .unwrap_err();
        assert!(err.to_string().contains("log-level"));
    }
}
