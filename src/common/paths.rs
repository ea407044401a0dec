//! Platform configuration paths

use std::io;
use std::path::PathBuf;

/// Name used for platform directories
const APP_NAME: &str = "randomuser-harness";

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/randomuser-harness/`
/// - macOS: `~/Library/Application Support/randomuser-harness/`
/// - Windows: `%APPDATA%\randomuser-harness\`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
///
/// `RANDOMUSER_CONFIG` overrides the platform location.
pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("RANDOMUSER_CONFIG") {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Resolve the configuration file path, creating its directory
pub fn ensure_config_path() -> io::Result<Option<PathBuf>> {
    let Some(path) = config_path() else {
        return Ok(None);
    };
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)?;
        }
    }
    Ok(Some(path))
}
