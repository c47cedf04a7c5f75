// # Settings Store Implementations
//
// This module provides implementations of the SettingsStore trait for
// different persistence strategies. Both keep the same in-memory document;
// the file store additionally writes it to disk after every change.

pub mod file;
pub mod memory;

pub use file::FileSettingsStore;
pub use memory::MemorySettingsStore;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::PluginSettings;
use crate::error::{Error, Result};
use crate::model::{Feed, FeedMeta};

/// Settings document format version
const SETTINGS_DOCUMENT_VERSION: &str = "1.0";

/// Everything the host persists for the add-on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct SettingsDocument {
    version: String,
    #[serde(default)]
    plugin: PluginSettings,
    #[serde(default)]
    feeds: BTreeMap<u64, Feed>,
    #[serde(default = "first_feed_id")]
    next_feed_id: u64,
}

impl Default for SettingsDocument {
    fn default() -> Self {
        Self {
            version: SETTINGS_DOCUMENT_VERSION.to_string(),
            plugin: PluginSettings::default(),
            feeds: BTreeMap::new(),
            next_feed_id: first_feed_id(),
        }
    }
}

impl SettingsDocument {
    fn list_feeds(&self, form_id: Option<u64>) -> Vec<Feed> {
        self.feeds
            .values()
            .filter(|feed| form_id.is_none_or(|id| feed.form_id == id))
            .cloned()
            .collect()
    }

    fn save_feed(&mut self, feed_id: Option<u64>, form_id: u64, meta: &FeedMeta) -> Result<u64> {
        match feed_id {
            Some(id) => {
                let feed = self
                    .feeds
                    .get_mut(&id)
                    .ok_or_else(|| Error::settings_store(format!("Feed {} does not exist", id)))?;
                if feed.form_id != form_id {
                    return Err(Error::settings_store(format!(
                        "Feed {} belongs to form {}, not {}",
                        id, feed.form_id, form_id
                    )));
                }
                feed.meta = meta.clone();
                Ok(id)
            }
            None => {
                let id = self.next_feed_id;
                self.next_feed_id += 1;
                self.feeds.insert(id, Feed::new(id, form_id, meta.clone()));
                Ok(id)
            }
        }
    }
}

fn first_feed_id() -> u64 {
    1
}
