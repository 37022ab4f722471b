// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Configuration file location

use std::path::{Path, PathBuf};

/// Overrides the directory holding `config.toml`.
pub const HOME_ENV: &str = "TV_HOME";

const APP_DIR: &str = "trace-viewer";
const FILE_NAME: &str = "config.toml";

/// `$TV_HOME/config.toml`, else `<platform config dir>/trace-viewer/config.toml`.
pub fn user_config_path() -> PathBuf {
    user_config_path_from(std::env::var_os(HOME_ENV).as_deref().map(Path::new))
}

pub fn user_config_path_from(home: Option<&Path>) -> PathBuf {
    if let Some(home) = home.filter(|h| !h.as_os_str().is_empty()) {
        return home.join(FILE_NAME);
    }
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
        .join(FILE_NAME)
}
