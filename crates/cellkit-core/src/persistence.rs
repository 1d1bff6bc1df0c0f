//! Persistence collaborator interfaces
//!
//! Epics call these to perform the actual writes; the core only guarantees
//! the save signal is emitted and the outcome reported as an action.

use async_trait::async_trait;

use crate::config::Config;
use crate::document::{ContentRef, Notebook};
use crate::error::PersistenceError;

/// Storage for the live configuration
#[async_trait]
pub trait ConfigPersistence: Send + Sync {
    /// Read the stored configuration; an absent store is an empty config
    async fn load(&self) -> Result<Config, PersistenceError>;

    /// Replace the stored configuration
    async fn save(&self, config: &Config) -> Result<(), PersistenceError>;
}

/// Storage for notebook documents
#[async_trait]
pub trait DocumentPersistence: Send + Sync {
    async fn save(
        &self,
        content_ref: &ContentRef,
        notebook: &Notebook,
    ) -> Result<(), PersistenceError>;
}
