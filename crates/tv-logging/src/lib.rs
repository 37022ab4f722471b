// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Logging setup for the trace viewer
//!
//! Binaries flatten [`CliLoggingArgs`] into their clap parser and call
//! [`CliLoggingArgs::init`]. Output goes to stderr unless a log file or log
//! directory is given.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub use tracing::Level;

/// Directory name used under the platform data dir.
pub const APP_DIR: &str = "trace-viewer";

/// Output format for log messages
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable plaintext format
    #[default]
    Plaintext,
    /// Structured JSON format
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Plaintext => write!(f, "plaintext"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CliLogLevel {
    /// Only error conditions
    Error,
    /// Errors and warnings
    Warn,
    /// Errors, warnings, and informational messages
    #[default]
    Info,
    /// All above plus debug information
    Debug,
    /// All above plus detailed tracing
    Trace,
}

impl From<CliLogLevel> for Level {
    fn from(level: CliLogLevel) -> Self {
        match level {
            CliLogLevel::Error => Level::ERROR,
            CliLogLevel::Warn => Level::WARN,
            CliLogLevel::Info => Level::INFO,
            CliLogLevel::Debug => Level::DEBUG,
            CliLogLevel::Trace => Level::TRACE,
        }
    }
}

impl std::fmt::Display for CliLogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliLogLevel::Error => write!(f, "error"),
            CliLogLevel::Warn => write!(f, "warn"),
            CliLogLevel::Info => write!(f, "info"),
            CliLogLevel::Debug => write!(f, "debug"),
            CliLogLevel::Trace => write!(f, "trace"),
        }
    }
}

/// Logging flags shared by every `tv` subcommand.
#[derive(Clone, Debug, Default, clap::Args, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CliLoggingArgs {
    /// Log verbosity level
    #[arg(long, global = true, value_enum, help = "Log verbosity level (default: warn)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<CliLogLevel>,

    /// Log output format
    #[arg(long, global = true, value_enum, help = "Log output format (default: plaintext)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_format: Option<LogFormat>,

    /// Directory for log files
    #[arg(long, global = true, help = "Directory for log files (default: platform specific)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,

    /// Log filename
    #[arg(long, global = true, help = "Log filename")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

impl CliLoggingArgs {
    /// Install the global subscriber, falling back to `default_level` when
    /// neither `--log-level` nor `RUST_LOG` is given.
    pub fn init(self, component: &str, default_level: CliLogLevel) -> anyhow::Result<()> {
        let level = self.log_level.unwrap_or(default_level).into();
        let format = self.log_format.unwrap_or_default();

        match self.resolve_log_path(component) {
            Some(log_path) => init_to_file(component, level, format, &log_path),
            None => init_with_writer(component, level, format, io::stderr),
        }
    }

    /// Resolve the log file path, or `None` when logging to the console:
    /// 1. an absolute `log_file` is used as is
    /// 2. a relative `log_file` is placed under `log_dir` when given
    /// 3. a bare `log_file` name without `log_dir` goes to the platform log directory
    /// 4. without `log_file`, `<log_dir>/<component>.log`
    pub fn resolve_log_path(&self, component: &str) -> Option<PathBuf> {
        let path = match (&self.log_file, &self.log_dir) {
            (Some(file), _) if Path::new(file).is_absolute() => PathBuf::from(file),
            (Some(file), Some(dir)) => Path::new(dir).join(file),
            (Some(file), None) if is_bare_file_name(file) => standard_log_dir().join(file),
            (Some(file), None) => PathBuf::from(file),
            (None, Some(dir)) => Path::new(dir).join(format!("{component}.log")),
            (None, None) => return None,
        };
        Some(path)
    }
}

fn is_bare_file_name(file: &str) -> bool {
    Path::new(file).parent().map_or(true, |parent| parent.as_os_str().is_empty())
}

/// Platform log directory:
/// - macOS: ~/Library/Logs/trace-viewer
/// - elsewhere: <data dir>/trace-viewer
pub fn standard_log_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    let mut path = {
        let mut path = dirs::home_dir().unwrap_or_else(std::env::temp_dir);
        path.push("Library");
        path.push("Logs");
        path
    };

    #[cfg(not(target_os = "macos"))]
    let mut path = dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir);

    path.push(APP_DIR);
    path
}

/// Append log output to `log_path`, creating parent directories.
pub fn init_to_file(
    component: &str,
    default_level: Level,
    format: LogFormat,
    log_path: &Path,
) -> anyhow::Result<()> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let log_file = fs::OpenOptions::new().create(true).append(true).open(log_path)?;
    init_with_writer(component, default_level, format, log_file)
}

/// `RUST_LOG` wins; otherwise `default_level` applies to everything.
pub fn env_filter(component: &str, default_level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{default_level},{}={default_level}", component.replace('-', "_")))
    })
}

pub fn init_with_writer<W>(
    component: &str,
    default_level: Level,
    format: LogFormat,
    writer: W,
) -> anyhow::Result<()>
where
    W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = env_filter(component, default_level);

    match format {
        LogFormat::Json => {
            let layer = tracing_subscriber::fmt::layer().with_writer(writer).json();
            #[cfg(debug_assertions)]
            let layer = layer.with_file(true).with_line_number(true);

            tracing_subscriber::registry().with(filter).with(layer).try_init()?;
        }
        LogFormat::Plaintext => {
            let layer = tracing_subscriber::fmt::layer().with_writer(writer);
            #[cfg(debug_assertions)]
            let layer = layer.with_file(true).with_line_number(true);

            tracing_subscriber::registry().with(filter).with(layer).try_init()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[derive(Parser)]
    struct Args {
        #[command(flatten)]
        logging: CliLoggingArgs,
    }

    #[test]
    fn cli_log_level_conversion() {
        assert_eq!(Level::from(CliLogLevel::Error), Level::ERROR);
        assert_eq!(Level::from(CliLogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(CliLogLevel::Info), Level::INFO);
        assert_eq!(Level::from(CliLogLevel::Debug), Level::DEBUG);
        assert_eq!(Level::from(CliLogLevel::Trace), Level::TRACE);
        assert_eq!(CliLogLevel::default(), CliLogLevel::Info);
        assert_eq!(CliLogLevel::Warn.to_string(), "warn");
    }

    #[test]
    fn console_unless_a_file_option_is_given() {
        let args = Args::parse_from(["tv", "--log-level", "debug"]);
        assert_eq!(args.logging.log_level, Some(CliLogLevel::Debug));
        assert_eq!(args.logging.resolve_log_path("tv"), None);

        let args = Args::parse_from(["tv", "--log-dir", "/tmp/logs", "--log-format", "json"]);
        assert_eq!(args.logging.resolve_log_path("tv"), Some(PathBuf::from("/tmp/logs/tv.log")));
        assert_eq!(args.logging.log_format, Some(LogFormat::Json));
    }

    #[test]
    fn log_path_resolution() {
        let dir = tempfile::tempdir().expect("temp dir");
        let dir_str = dir.path().to_string_lossy().into_owned();

        let only_dir = CliLoggingArgs {
            log_dir: Some(dir_str.clone()),
            ..Default::default()
        };
        assert_eq!(only_dir.resolve_log_path("tv"), Some(dir.path().join("tv.log")));

        let relative = CliLoggingArgs {
            log_dir: Some(dir_str),
            log_file: Some("runs/viewer.log".into()),
            ..Default::default()
        };
        assert_eq!(
            relative.resolve_log_path("tv"),
            Some(dir.path().join("runs/viewer.log"))
        );

        let absolute_path = dir.path().join("abs.log");
        let absolute = CliLoggingArgs {
            log_dir: Some("/ignored".into()),
            log_file: Some(absolute_path.to_string_lossy().into_owned()),
            ..Default::default()
        };
        assert_eq!(absolute.resolve_log_path("tv"), Some(absolute_path));
    }

    #[test]
    fn bare_file_name_goes_to_platform_log_dir() {
        let bare = CliLoggingArgs {
            log_file: Some("viewer.log".into()),
            ..Default::default()
        };
        let path = bare.resolve_log_path("tv").expect("file logging");
        assert!(path.ends_with("trace-viewer/viewer.log"));
        assert_eq!(path.parent(), Some(standard_log_dir().as_path()));

        let nested = CliLoggingArgs {
            log_file: Some("logs/viewer.log".into()),
            ..Default::default()
        };
        assert_eq!(nested.resolve_log_path("tv"), Some(PathBuf::from("logs/viewer.log")));
    }
}
