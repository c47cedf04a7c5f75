// # Settings Store Trait
//
// Defines the persistence boundary owned by the host framework.
//
// ## Purpose
//
// The host stores the plugin credentials and every feed. The add-on only
// reads them, and hands rewritten feed settings back after a save.
//
// ## Implementations
//
// - `MemorySettingsStore`: tests and embedding
// - `FileSettingsStore`: single JSON document, used by the CLI

use async_trait::async_trait;

use crate::config::PluginSettings;
use crate::model::{Feed, FeedMeta};

/// Trait for settings store implementations
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load the plugin-level credentials (defaults when never saved)
    async fn plugin_settings(&self) -> Result<PluginSettings, crate::Error>;

    /// Replace the plugin-level credentials
    async fn save_plugin_settings(&self, settings: &PluginSettings) -> Result<(), crate::Error>;

    /// Get a feed by id
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Feed))`: The feed
    /// - `Ok(None)`: No feed with this id
    /// - `Err(Error)`: Storage error
    async fn get_feed(&self, feed_id: u64) -> Result<Option<Feed>, crate::Error>;

    /// List feeds, optionally restricted to one form, ordered by id
    async fn list_feeds(&self, form_id: Option<u64>) -> Result<Vec<Feed>, crate::Error>;

    /// Create or update a feed
    ///
    /// With `feed_id = None` a new id is assigned. Returns the saved id.
    async fn save_feed(
        &self,
        feed_id: Option<u64>,
        form_id: u64,
        meta: &FeedMeta,
    ) -> Result<u64, crate::Error>;
}
