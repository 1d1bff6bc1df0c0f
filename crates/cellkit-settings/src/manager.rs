//! Platform config directory resolution.

use std::path::PathBuf;

use crate::error::{SettingsError, SettingsResult};

const APP_DIR_NAME: &str = "cellkit";
const CONFIG_FILE_NAME: &str = "config.json";

/// Locates the per-user configuration directory
pub struct SettingsManager;

impl SettingsManager {
    /// Platform config directory for the application
    pub fn config_dir() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no config directory on this platform".to_string())
            })
    }

    /// Default location of the options file
    pub fn config_file_path() -> SettingsResult<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Create the config directory if needed and return it
    pub fn ensure_config_dir() -> SettingsResult<PathBuf> {
        let dir = Self::config_dir()?;
        std::fs::create_dir_all(&dir).map_err(|e| {
            SettingsError::ConfigDirectory(format!("{}: {}", dir.display(), e))
        })?;
        Ok(dir)
    }
}
