// # Memory Settings Store
//
// In-memory implementation of SettingsStore.
//
// ## When to Use
//
// - Tests
// - Embedding the add-on in a host that persists settings itself

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::SettingsDocument;
use crate::Error;
use crate::config::PluginSettings;
use crate::model::{Feed, FeedMeta};
use crate::traits::SettingsStore;

/// In-memory settings store
///
/// # Example
///
/// ```rust,no_run
/// use emma_core::state::MemorySettingsStore;
/// use emma_core::traits::SettingsStore;
/// use emma_core::FeedMeta;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemorySettingsStore::new();
///     let id = store.save_feed(None, 2, &FeedMeta::new("Newsletter", "3")).await?;
///     assert!(store.get_feed(id).await?.is_some());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    inner: Arc<RwLock<SettingsDocument>>,
}

impl MemorySettingsStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given credentials
    pub fn with_plugin_settings(settings: PluginSettings) -> Self {
        let document = SettingsDocument {
            plugin: settings,
            ..SettingsDocument::default()
        };
        Self {
            inner: Arc::new(RwLock::new(document)),
        }
    }

    /// Number of stored feeds
    pub async fn feed_count(&self) -> usize {
        self.inner.read().await.feeds.len()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn plugin_settings(&self) -> Result<PluginSettings, Error> {
        Ok(self.inner.read().await.plugin.clone())
    }

    async fn save_plugin_settings(&self, settings: &PluginSettings) -> Result<(), Error> {
        self.inner.write().await.plugin = settings.clone();
        Ok(())
    }

    async fn get_feed(&self, feed_id: u64) -> Result<Option<Feed>, Error> {
        Ok(self.inner.read().await.feeds.get(&feed_id).cloned())
    }

    async fn list_feeds(&self, form_id: Option<u64>) -> Result<Vec<Feed>, Error> {
        Ok(self.inner.read().await.list_feeds(form_id))
    }

    async fn save_feed(
        &self,
        feed_id: Option<u64>,
        form_id: u64,
        meta: &FeedMeta,
    ) -> Result<u64, Error> {
        self.inner.write().await.save_feed(feed_id, form_id, meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_feeds() {
        let store = MemorySettingsStore::new();
        assert_eq!(store.feed_count().await, 0);

        let first = store.save_feed(None, 2, &FeedMeta::new("A", "3")).await.unwrap();
        let second = store.save_feed(None, 5, &FeedMeta::new("B", "1")).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(store.feed_count().await, 2);

        let for_form = store.list_feeds(Some(2)).await.unwrap();
        assert_eq!(for_form.len(), 1);
        assert_eq!(for_form[0].meta.feed_name, "A");

        let updated = store.save_feed(Some(first), 2, &FeedMeta::new("A2", "3")).await.unwrap();
        assert_eq!(updated, first);
        assert_eq!(store.get_feed(first).await.unwrap().unwrap().meta.feed_name, "A2");
        assert_eq!(store.list_feeds(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_memory_store_rejects_unknown_or_foreign_feed() {
        let store = MemorySettingsStore::new();
        assert!(store.save_feed(Some(42), 2, &FeedMeta::default()).await.is_err());

        let id = store.save_feed(None, 2, &FeedMeta::new("A", "3")).await.unwrap();
        assert!(store.save_feed(Some(id), 3, &FeedMeta::new("A", "3")).await.is_err());
    }

    #[tokio::test]
    async fn test_memory_store_plugin_settings() {
        let store = MemorySettingsStore::with_plugin_settings(PluginSettings::new("1", "p", "k"));
        assert!(store.plugin_settings().await.unwrap().is_configured());

        store.save_plugin_settings(&PluginSettings::default()).await.unwrap();
        assert!(!store.plugin_settings().await.unwrap().is_configured());
    }
}
