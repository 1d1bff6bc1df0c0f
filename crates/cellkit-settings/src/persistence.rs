//! Configuration persistence adapters
//!
//! `FileConfigPersistence` keeps the option map in a JSON or TOML file,
//! chosen by extension. `MemoryConfigPersistence` and
//! `MemoryDocumentPersistence` keep data in memory for headless runs and
//! tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use cellkit_core::{
    Config, ConfigPersistence, ContentRef, DocumentPersistence, Notebook, PersistenceError,
};

use crate::error::{SettingsError, SettingsResult};
use crate::manager::SettingsManager;

/// On-disk encoding of the option map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(ConfigFormat::Json),
            Some("toml") => Ok(ConfigFormat::Toml),
            other => Err(SettingsError::UnsupportedFormat(format!(
                "{} (config file must be .json or .toml)",
                other.unwrap_or("no extension")
            ))),
        }
    }

    pub fn parse(&self, content: &str) -> SettingsResult<Config> {
        let config = match self {
            ConfigFormat::Json => serde_json::from_str(content)?,
            ConfigFormat::Toml => toml::from_str(content)?,
        };
        Ok(config)
    }

    pub fn render(&self, config: &Config) -> SettingsResult<String> {
        let content = match self {
            ConfigFormat::Json => serde_json::to_string_pretty(config)?,
            ConfigFormat::Toml => toml::to_string_pretty(config)?,
        };
        Ok(content)
    }
}

/// Options stored in a file
#[derive(Debug, Clone)]
pub struct FileConfigPersistence {
    path: PathBuf,
    format: ConfigFormat,
}

impl FileConfigPersistence {
    pub fn new(path: impl Into<PathBuf>) -> SettingsResult<Self> {
        let path = path.into();
        let format = ConfigFormat::from_path(&path)?;
        Ok(Self { path, format })
    }

    /// Options file in the platform config directory
    pub fn default_location() -> SettingsResult<Self> {
        Self::new(SettingsManager::config_file_path()?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ConfigFormat {
        self.format
    }

    /// Read the file; a missing file is an empty option map
    pub async fn read(&self) -> SettingsResult<Config> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config file at {}, using empty config", self.path.display());
                return Ok(Config::new());
            }
            Err(e) => {
                return Err(SettingsError::LoadError(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )))
            }
        };
        self.format.parse(&content)
    }

    /// Replace the file contents, creating its directory if needed
    pub async fn write(&self, config: &Config) -> SettingsResult<()> {
        let content = self.format.render(config)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // Write beside the target and rename so readers never see a partial file.
        let staging = self.path.with_extension("tmp");
        tokio::fs::write(&staging, content)
            .await
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", staging.display(), e)))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", self.path.display(), e)))?;

        tracing::debug!("Wrote {} options to {}", config.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl ConfigPersistence for FileConfigPersistence {
    async fn load(&self) -> Result<Config, PersistenceError> {
        Ok(self.read().await?)
    }

    async fn save(&self, config: &Config) -> Result<(), PersistenceError> {
        Ok(self.write(config).await?)
    }
}

/// Options kept in memory
#[derive(Debug, Default)]
pub struct MemoryConfigPersistence {
    stored: Mutex<Config>,
    saves: AtomicUsize,
    failure: Mutex<Option<PersistenceError>>,
}

impl MemoryConfigPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            stored: Mutex::new(config),
            ..Self::default()
        }
    }

    /// Last saved (or initial) options
    pub fn stored(&self) -> Config {
        self.stored.lock().clone()
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Make every following load and save fail with `error`, or succeed again with `None`
    pub fn fail_with(&self, error: Option<PersistenceError>) {
        *self.failure.lock() = error;
    }

    fn check(&self) -> Result<(), PersistenceError> {
        match self.failure.lock().as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ConfigPersistence for MemoryConfigPersistence {
    async fn load(&self) -> Result<Config, PersistenceError> {
        self.check()?;
        Ok(self.stored())
    }

    async fn save(&self, config: &Config) -> Result<(), PersistenceError> {
        self.check()?;
        *self.stored.lock() = config.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Notebooks kept in memory, keyed by content reference
#[derive(Debug, Default)]
pub struct MemoryDocumentPersistence {
    saved: Mutex<HashMap<ContentRef, Notebook>>,
    saves: AtomicUsize,
}

impl MemoryDocumentPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last saved copy of a document
    pub fn saved(&self, content_ref: &ContentRef) -> Option<Notebook> {
        self.saved.lock().get(content_ref).cloned()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentPersistence for MemoryDocumentPersistence {
    async fn save(
        &self,
        content_ref: &ContentRef,
        notebook: &Notebook,
    ) -> Result<(), PersistenceError> {
        self.saved.lock().insert(*content_ref, notebook.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("a/config.json")).ok(),
            Some(ConfigFormat::Json)
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("config.toml")).ok(),
            Some(ConfigFormat::Toml)
        );
        assert!(matches!(
            ConfigFormat::from_path(Path::new("config.yaml")),
            Err(SettingsError::UnsupportedFormat(_))
        ));
        assert!(FileConfigPersistence::new("config").is_err());
    }

    #[test]
    fn test_toml_keeps_nested_options() {
        let mut config = Config::new();
        config.set("markdownOptions", json!({ "linkTarget": "_self", "breaks": true }));
        config.set("theme", json!("dark"));

        let rendered = ConfigFormat::Toml.render(&config).expect("render");
        let parsed = ConfigFormat::Toml.parse(&rendered).expect("parse");
        assert_eq!(parsed, config);
    }

    #[tokio::test]
    async fn test_memory_persistence_counts_saves() {
        let persistence = MemoryConfigPersistence::new();
        let mut config = Config::new();
        config.set("theme", json!("light"));

        persistence.save(&config).await.expect("save");
        assert_eq!(persistence.save_count(), 1);
        assert_eq!(persistence.load().await.expect("load"), config);

        persistence.fail_with(Some(PersistenceError::Unavailable("offline".to_string())));
        assert!(persistence.save(&config).await.is_err());
        assert!(persistence.load().await.is_err());
        assert_eq!(persistence.save_count(), 1);

        persistence.fail_with(None);
        assert!(persistence.load().await.is_ok());
    }

    #[tokio::test]
    async fn test_memory_documents_keep_latest_copy() {
        let persistence = MemoryDocumentPersistence::new();
        let content_ref = ContentRef::new();
        let mut notebook = Notebook::new();

        persistence.save(&content_ref, &notebook).await.expect("save");
        notebook
            .append_cell(cellkit_core::Cell::empty(cellkit_core::CellType::Code))
            .expect("append");
        persistence.save(&content_ref, &notebook).await.expect("save");

        assert_eq!(persistence.save_count(), 2);
        assert_eq!(persistence.saved(&content_ref).map(|saved| saved.len()), Some(1));
        assert!(persistence.saved(&ContentRef::new()).is_none());
    }
}
