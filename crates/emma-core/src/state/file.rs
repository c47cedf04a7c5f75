// # File Settings Store
//
// File-based implementation of SettingsStore with crash recovery.
//
// ## Crash Recovery
//
// - Atomic writes: Uses write-then-rename for atomicity
// - Corruption detection: Validates JSON on load
// - Automatic backup: Keeps .backup of last known good document
// - Recovery: Falls back to backup if corruption detected
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "plugin": {
//     "account_id": "1234",
//     "public_api_key": "...",
//     "private_api_key": "..."
//   },
//   "feeds": {
//     "1": { "id": 1, "form_id": 2, "is_active": true, "meta": { ... } }
//   },
//   "next_feed_id": 2
// }
// ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use super::{SETTINGS_DOCUMENT_VERSION, SettingsDocument};
use crate::Error;
use crate::config::PluginSettings;
use crate::model::{Feed, FeedMeta};
use crate::traits::SettingsStore;

/// File-based settings store
///
/// Every change is written to disk immediately. The in-memory document only
/// changes once the write has succeeded.
///
/// # Example
///
/// ```rust,no_run
/// use emma_core::state::FileSettingsStore;
/// use emma_core::traits::SettingsStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileSettingsStore::new("/var/lib/emma-feed/settings.json").await?;
///     let settings = store.plugin_settings().await?;
///     println!("configured: {}", settings.is_configured());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileSettingsStore {
    path: PathBuf,
    document: Arc<RwLock<SettingsDocument>>,
}

impl FileSettingsStore {
    /// Create or load a file settings store
    ///
    /// This will:
    /// 1. Create parent directories if needed
    /// 2. Try to load the existing document
    /// 3. If it is corrupted, fall back to the backup
    /// 4. If both fail, start with an empty document
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create settings directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let document = Self::load_with_recovery(&path).await?;

        Ok(Self {
            path,
            document: Arc::new(RwLock::new(document)),
        })
    }

    /// Load the document, recovering from the backup on corruption
    async fn load_with_recovery(path: &Path) -> Result<SettingsDocument, Error> {
        match Self::load(path).await {
            Ok(document) => {
                tracing::debug!("Loaded settings: {} feeds", document.feeds.len());
                Ok(document)
            }
            Err(Error::Json(e)) => {
                tracing::warn!(
                    "Settings file appears corrupted: {}. Attempting recovery from backup.",
                    e
                );

                let backup_path = Self::backup_path(path);
                if !backup_path.exists() {
                    tracing::warn!("No backup file found. Starting with empty settings.");
                    return Ok(SettingsDocument::default());
                }

                match Self::load(&backup_path).await {
                    Ok(document) => {
                        tracing::info!("Recovered settings from backup");
                        if let Err(restore_err) = fs::copy(&backup_path, path).await {
                            tracing::error!(
                                "Failed to restore settings file from backup: {}",
                                restore_err
                            );
                        }
                        Ok(document)
                    }
                    Err(backup_err) => {
                        tracing::error!(
                            "Backup also corrupted: {}. Starting with empty settings.",
                            backup_err
                        );
                        Ok(SettingsDocument::default())
                    }
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Load the document from `path` (empty document if missing)
    async fn load(path: &Path) -> Result<SettingsDocument, Error> {
        if !path.exists() {
            tracing::debug!("Settings file does not exist: {}", path.display());
            return Ok(SettingsDocument::default());
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::settings_store(format!(
                "Failed to read settings file {}: {}",
                path.display(),
                e
            ))
        })?;

        let document: SettingsDocument = serde_json::from_str(&content)?;

        if document.version != SETTINGS_DOCUMENT_VERSION {
            tracing::warn!(
                "Settings file version mismatch: expected {}, got {}. Attempting to load anyway.",
                SETTINGS_DOCUMENT_VERSION,
                document.version
            );
        }

        Ok(document)
    }

    /// Write `document` atomically
    async fn write(&self, document: &SettingsDocument) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(document)?;

        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::settings_store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            file.write_all(json.as_bytes()).await?;
            file.flush().await?;
        }

        if self.path.exists() {
            let backup_path = Self::backup_path(&self.path);
            if let Err(e) = fs::copy(&self.path, &backup_path).await {
                tracing::warn!("Failed to create backup: {}", e);
            }
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::settings_store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("Settings written to file: {}", self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn plugin_settings(&self) -> Result<PluginSettings, Error> {
        Ok(self.document.read().await.plugin.clone())
    }

    async fn save_plugin_settings(&self, settings: &PluginSettings) -> Result<(), Error> {
        let mut document = self.document.write().await;
        let mut next = document.clone();
        next.plugin = settings.clone();

        self.write(&next).await?;
        *document = next;
        Ok(())
    }

    async fn get_feed(&self, feed_id: u64) -> Result<Option<Feed>, Error> {
        Ok(self.document.read().await.feeds.get(&feed_id).cloned())
    }

    async fn list_feeds(&self, form_id: Option<u64>) -> Result<Vec<Feed>, Error> {
        Ok(self.document.read().await.list_feeds(form_id))
    }

    async fn save_feed(
        &self,
        feed_id: Option<u64>,
        form_id: u64,
        meta: &FeedMeta,
    ) -> Result<u64, Error> {
        let mut document = self.document.write().await;
        let mut next = document.clone();
        let id = next.save_feed(feed_id, form_id, meta)?;

        self.write(&next).await?;
        *document = next;
        Ok(id)
    }
}
