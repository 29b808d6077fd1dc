//! Configuration file locations
//!
//! A project-local `testmybot.toml` takes precedence over the per-user file:
//! - Linux: `~/.config/testmybot/config.toml`
//! - macOS: `~/Library/Application Support/testmybot/config.toml`
//! - Windows: `%APPDATA%\testmybot\config.toml`

use std::path::{Path, PathBuf};

/// Application name used for platform directories
const APP_NAME: &str = "testmybot";

/// File name of the project-local configuration file
pub const LOCAL_CONFIG_FILE: &str = "testmybot.toml";

/// Get the per-user configuration directory
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the per-user configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Path of the project-local configuration file inside `dir`
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(LOCAL_CONFIG_FILE)
}

/// First configuration file that exists, local before per-user
pub fn find_config_file(cwd: &Path) -> Option<PathBuf> {
    let local = local_config_path(cwd);
    if local.is_file() {
        return Some(local);
    }
    config_path().filter(|p| p.is_file())
}
