//! Configuration directory resolution
//!
//! `DRLENS_CONFIG_DIR` wins. Otherwise Unix uses `$XDG_CONFIG_HOME/drlens`
//! (or `~/.config/drlens`) and Windows the roaming AppData folder.

use std::path::{Path, PathBuf};

/// Environment variable overriding the configuration directory
pub const ENV_CONFIG_DIR: &str = "DRLENS_CONFIG_DIR";

const APP_NAME: &str = "drlens";

/// Get the configuration directory path
pub fn config_dir() -> PathBuf {
    match std::env::var_os(ENV_CONFIG_DIR) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => default_config_dir(),
    }
}

#[cfg(windows)]
fn default_config_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".config").join(APP_NAME))
}

#[cfg(not(windows))]
fn default_config_dir() -> PathBuf {
    std::env::var_os("XDG_CONFIG_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(".config")))
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join(APP_NAME)
}

/// Path of the root configuration file
pub fn root_config_path() -> PathBuf {
    config_dir().join("config.yaml")
}

/// Create `path` and its parents when missing
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(path)
}
