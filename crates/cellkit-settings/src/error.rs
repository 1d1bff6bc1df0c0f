//! Error types for the settings crate.
//!
//! Errors raised while locating, reading and writing configuration files.
//! They convert into the core's `PersistenceError` at the collaborator
//! boundary.

use std::io;
use thiserror::Error;

use cellkit_core::PersistenceError;

/// Errors that can occur during settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The configuration file could not be loaded.
    #[error("Failed to load settings: {0}")]
    LoadError(String),

    /// The configuration file could not be saved.
    #[error("Failed to save settings: {0}")]
    SaveError(String),

    /// The configuration directory could not be found or created.
    #[error("Config directory error: {0}")]
    ConfigDirectory(String),

    /// The configuration file format is not supported.
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML error: {0}")]
    TomlWriteError(#[from] toml::ser::Error),
}

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

impl From<SettingsError> for PersistenceError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::IoError(_)
            | SettingsError::LoadError(_)
            | SettingsError::SaveError(_) => PersistenceError::Io(err.to_string()),
            SettingsError::JsonError(_)
            | SettingsError::TomlError(_)
            | SettingsError::TomlWriteError(_)
            | SettingsError::UnsupportedFormat(_) => {
                PersistenceError::Serialization(err.to_string())
            }
            SettingsError::ConfigDirectory(_) => PersistenceError::Unavailable(err.to_string()),
        }
    }
}
