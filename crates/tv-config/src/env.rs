// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Environment and CLI flag overlays

use anyhow::Result;
use serde_json::{Map, Value as J};

use crate::settings::is_known_key;

pub const ENV_PREFIX: &str = "TV";

/// Overlay built from `TV_*` variables, e.g. `TV_FILEPATH_PREFIX` sets
/// `filepath-prefix`. Variables that name no preference (such as `TV_HOME`)
/// are skipped.
pub fn env_overlay() -> Result<J> {
    env_overlay_from(None)
}

/// Like [`env_overlay`], reading from `vars` instead of the process
/// environment when given.
pub fn env_overlay_from(vars: Option<config::Map<String, String>>) -> Result<J> {
    let built = config::Config::builder()
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .convert_case(config::Case::Kebab)
                .source(vars),
        )
        .build()?;

    let all = built.try_deserialize::<Map<String, J>>()?;
    let known = all.into_iter().filter(|(key, _)| is_known_key(key)).collect();
    Ok(J::Object(known))
}

/// Overlay built from CLI `key=value` pairs. Blank values are skipped.
pub fn flags_overlay(kv_pairs: &[(&str, &str)]) -> J {
    let mut root = Map::new();
    for (k, v) in kv_pairs {
        let v = v.trim();
        if !v.is_empty() {
            root.insert((*k).to_string(), J::String(v.to_string()));
        }
    }
    J::Object(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn vars(pairs: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    #[test]
    fn env_names_map_to_kebab_keys() {
        let overlay = env_overlay_from(vars(&[
            ("TV_FILEPATH_PREFIX", "/ci/s"),
            ("TV_HOME", "/opt/tv"),
            ("PATH", "/usr/bin"),
        ]))
        .expect("overlay");
        assert_eq!(overlay, json!({"filepath-prefix": "/ci/s"}));
    }

    #[test]
    fn empty_environment_is_empty_overlay() {
        assert_eq!(env_overlay_from(vars(&[])).expect("overlay"), json!({}));
    }

    #[test]
    fn flags_skip_blank_values() {
        let overlay = flags_overlay(&[("filepath-prefix", " /x "), ("editor-root", "  ")]);
        assert_eq!(overlay, json!({"filepath-prefix": "/x"}));
    }
}
