// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use clap::Subcommand;
use tv_logging::CliLoggingArgs;

pub use clap::Parser;

pub mod commands;
pub mod summary;

pub use commands::config::ConfigCommands;
pub use commands::{FetchArgs, OpenArgs, ValidateArgs};

#[derive(clap::Parser, Debug)]
#[command(
    name = "tv",
    about = "Inspect Cypress debugger payloads",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub logging: CliLoggingArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a payload file from disk
    Open(OpenArgs),
    /// Download the payload named by a viewer URL, query string or payload URL
    Fetch(FetchArgs),
    /// Check a payload file's top-level keys without loading it
    Validate(ValidateArgs),
    /// Read or persist preferences
    Config {
        #[command(subcommand)]
        subcommand: ConfigCommands,
    },
}

impl Cli {
    /// `key=value` pairs for the command-line configuration layer.
    pub fn config_overrides(&self) -> Vec<(&str, &str)> {
        let mut flags = Vec::new();
        let prefix = match &self.command {
            Commands::Open(args) => args.prefix.as_deref(),
            Commands::Fetch(args) => args.prefix.as_deref(),
            Commands::Validate(_) | Commands::Config { .. } => None,
        };
        if let Some(prefix) = prefix {
            flags.push((tv_config::FILEPATH_PREFIX, prefix));
        }
        if let Some(level) = self.logging.log_level {
            flags.push((tv_config::LOG_LEVEL, level_name(level)));
        }
        flags
    }
}

fn level_name(level: tv_logging::CliLogLevel) -> &'static str {
    use tv_logging::CliLogLevel::*;
    match level {
        Error => "error",
        Warn => "warn",
        Info => "info",
        Debug => "debug",
        Trace => "trace",
    }
}

/// Fallback verbosity when neither `--log-level` nor `RUST_LOG` is set.
pub fn default_log_level(settings: &tv_config::Settings) -> tv_logging::CliLogLevel {
    use tv_config::LogLevel;
    use tv_logging::CliLogLevel;
    match settings.log_level {
        Some(LogLevel::Error) => CliLogLevel::Error,
        Some(LogLevel::Warn) | None => CliLogLevel::Warn,
        Some(LogLevel::Info) => CliLogLevel::Info,
        Some(LogLevel::Debug) => CliLogLevel::Debug,
        Some(LogLevel::Trace) => CliLogLevel::Trace,
    }
}
