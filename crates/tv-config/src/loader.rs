// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! TOML loading, schema validation and preference persistence

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result, bail};
use jsonschema::{Draft, JSONSchema};
use serde_json::Value as J;

use crate::settings::{KEYS, Settings, is_known_key};

/// Parse TOML text into JSON for validation and merging.
pub fn parse_toml_to_json(toml_str: &str) -> Result<J> {
    let table: toml::Table = toml_str.parse()?;
    Ok(serde_json::to_value(table)?)
}

fn validator() -> Result<&'static JSONSchema> {
    static VALIDATOR: OnceLock<JSONSchema> = OnceLock::new();
    if let Some(validator) = VALIDATOR.get() {
        return Ok(validator);
    }
    let schema = serde_json::to_value(schemars::schema_for!(Settings))?;
    let compiled = JSONSchema::options()
        .with_draft(Draft::Draft202012)
        .compile(&schema)
        .map_err(|err| anyhow::anyhow!("settings schema does not compile: {err}"))?;
    Ok(VALIDATOR.get_or_init(|| compiled))
}

/// Validate a layer against the [`Settings`] schema.
pub fn validate_against_schema(v: &J) -> Result<()> {
    let validator = validator()?;
    if let Err(errors) = validator.validate(v) {
        let error_msg = errors.map(|e| e.to_string()).collect::<Vec<_>>().join("\n  - ");
        bail!("Config schema validation failed:\n  - {error_msg}");
    }
    Ok(())
}

/// Read and validate the layer at `path`; `None` when the file is absent.
pub fn read_layer_from_file(path: &Path) -> Result<Option<J>> {
    if !path.exists() {
        return Ok(None);
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("reading config file {path:?}"))?;
    let json = parse_toml_to_json(&content).with_context(|| format!("parsing {path:?}"))?;
    validate_against_schema(&json).with_context(|| format!("validating {path:?}"))?;
    Ok(Some(json))
}

/// Persist `key = value` into the file at `path`, keeping the other keys.
///
/// A blank value removes the key.
pub fn set_preference(path: &Path, key: &str, value: &str) -> Result<()> {
    if !is_known_key(key) {
        bail!("unknown preference '{key}' (expected one of: {})", KEYS.join(", "));
    }

    let mut table = if path.exists() {
        let content =
            fs::read_to_string(path).with_context(|| format!("reading config file {path:?}"))?;
        content.parse::<toml::Table>().with_context(|| format!("parsing {path:?}"))?
    } else {
        toml::Table::new()
    };

    let value = value.trim();
    if value.is_empty() {
        table.remove(key);
    } else {
        table.insert(key.to_string(), toml::Value::String(value.to_string()));
    }
    validate_against_schema(&serde_json::to_value(&table)?)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {parent:?}"))?;
    }
    fs::write(path, toml::to_string_pretty(&table)?)
        .with_context(|| format!("writing config file {path:?}"))?;
    Ok(())
}
