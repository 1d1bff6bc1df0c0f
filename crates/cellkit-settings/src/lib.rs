//! Cellkit Settings Crate
//!
//! Persistence adapters for Cellkit: a file-backed config store in the
//! platform config directory, and in-memory config and document stores.

pub mod error;
pub mod manager;
pub mod persistence;

pub use error::{SettingsError, SettingsResult};
pub use manager::SettingsManager;
pub use persistence::{
    ConfigFormat, FileConfigPersistence, MemoryConfigPersistence, MemoryDocumentPersistence,
};
