//! Unified path management for cadence files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/cadence/           # Config directory
//! ├── config.toml              # Application configuration
//! └── secret.json              # API keys
//!
//! ~/.local/share/cadence/      # Data directory (FileStore root)
//! ├── members/
//! ├── sessions/
//! ├── turns/
//! ├── profiles/
//! └── records/
//! ```

use std::path::PathBuf;

const APP_DIR: &str = "cadence";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for cadence_core::CadenceError {
    fn from(err: PathError) -> Self {
        cadence_core::CadenceError::config(err.to_string())
    }
}

/// Default locations of cadence files.
pub struct CadencePaths;

impl CadencePaths {
    /// Returns the cadence configuration directory (e.g. `~/.config/cadence/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the cadence data directory (e.g. `~/.local/share/cadence/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    ///
    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600).
    pub fn secret_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("secret.json"))
    }
}
