// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Preference commands

use std::io::Write;
use std::path::Path;

use anyhow::{Result, bail};
use clap::Subcommand;
use tv_config::{KEYS, Resolved, set_preference};

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Print the resolved value of a preference and where it came from
    Get {
        /// Preference key, e.g. filepath-prefix
        key: String,
    },
    /// Persist a preference in the user config file (blank value removes it)
    Set {
        key: String,
        value: String,
    },
    /// Print every preference
    Show,
}

impl ConfigCommands {
    pub fn run(self, resolved: &Resolved, user_file: &Path, out: &mut impl Write) -> Result<()> {
        match self {
            ConfigCommands::Get { key } => {
                if !KEYS.contains(&key.as_str()) {
                    bail!("unknown preference '{key}' (expected one of: {})", KEYS.join(", "));
                }
                match resolved.settings.get(&key) {
                    Some(value) => print_entry(out, resolved, &key, &value)?,
                    None => writeln!(out, "{key} is not set")?,
                }
            }
            ConfigCommands::Set { key, value } => {
                set_preference(user_file, &key, &value)?;
                writeln!(out, "{key} saved to {}", user_file.display())?;
            }
            ConfigCommands::Show => {
                for key in KEYS {
                    if let Some(value) = resolved.settings.get(key) {
                        print_entry(out, resolved, key, &value)?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn print_entry(out: &mut impl Write, resolved: &Resolved, key: &str, value: &str) -> Result<()> {
    match resolved.source_of(key) {
        Some(scope) => writeln!(out, "{key}={value} (from {scope})")?,
        None => writeln!(out, "{key}={value}")?,
    }
    Ok(())
}
