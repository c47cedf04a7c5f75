//! Architectural Contract Test: Feed Settings Save
//!
//! Constraints verified:
//! - Requested fields are provisioned before validation
//! - Settings with unresolved mappings are never persisted
//! - Newly created fields show up in the field choices right away
//! - Raw posted settings come back patched for re-rendering
//!
//! If this test fails, the settings page and the stored feed can disagree.

mod common;

use common::*;
use emma_core::admin::{self, Choice};
use emma_core::model::CustomFieldMapping;
use emma_core::settings::{SAVE_ERROR_MESSAGE, SAVE_SUCCESS_MESSAGE};
use emma_core::traits::SettingsStore;
use emma_core::{ApiSession, FeedMeta, FeedSettingsSaver, MemorySettingsStore};
use std::sync::Arc;

#[tokio::test]
async fn save_provisions_then_persists_corrected_settings() {
    let api = Arc::new(RecordingEmmaApi::new().with_field("first_name", "First Name"));
    let session = ApiSession::with_client(api.clone());
    let store = MemorySettingsStore::new();

    let posted = FeedMeta::new("Newsletter", "3")
        .with_custom_field(CustomFieldMapping::new("first_name", "1.3"))
        .with_custom_field(CustomFieldMapping::create("Favorite Color", "5"));

    let report = FeedSettingsSaver::new()
        .save(&session, &store, None, 2, posted)
        .await
        .unwrap();

    assert!(report.is_saved());
    assert_eq!(report.message, SAVE_SUCCESS_MESSAGE);
    assert!(report.errors.is_empty());
    assert_eq!(report.created.len(), 1);

    let stored = store.get_feed(report.feed_id.unwrap()).await.unwrap().unwrap();
    let shortcut = &report.created[0].shortcut_name;
    assert_eq!(&stored.meta.custom_fields[1].key, shortcut);
    assert!(stored.meta.custom_fields[1].custom_key.is_empty());
    assert_eq!(report.posted, stored.meta);
}

#[tokio::test]
async fn failed_provisioning_blocks_the_save() {
    let api = Arc::new(RecordingEmmaApi::new().failing_field("Favorite Color"));
    let session = ApiSession::with_client(api.clone());
    let store = MemorySettingsStore::new();

    let posted = FeedMeta::new("Newsletter", "3")
        .with_custom_field(CustomFieldMapping::create("Favorite Color", "5"));

    let report = FeedSettingsSaver::new()
        .save(&session, &store, None, 2, posted)
        .await
        .unwrap();

    assert!(!report.is_saved());
    assert_eq!(report.message, SAVE_ERROR_MESSAGE);
    assert_eq!(report.provision_failures.len(), 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].field, "custom_fields[0]");
    assert_eq!(store.feed_count().await, 0);
}

#[tokio::test]
async fn unconfigured_credentials_cannot_provision_and_block_the_save() {
    let store = MemorySettingsStore::new();
    let posted = FeedMeta::new("Newsletter", "3")
        .with_custom_field(CustomFieldMapping::create("Favorite Color", "5"));

    let report = FeedSettingsSaver::new()
        .save(&ApiSession::Unconfigured, &store, None, 2, posted.clone())
        .await
        .unwrap();

    assert!(!report.is_saved());
    assert_eq!(report.posted, posted);
    assert_eq!(store.feed_count().await, 0);
}

#[tokio::test]
async fn created_fields_join_the_choice_list_after_save() {
    // The listing predates the new field, as a cached or lagging listing would
    let api = Arc::new(
        RecordingEmmaApi::new()
            .with_field("first_name", "First Name")
            .with_field("last_name", "Last Name"),
    );
    let session = ApiSession::with_client(api.clone());
    let store = MemorySettingsStore::new();

    let posted = FeedMeta::new("Newsletter", "3")
        .with_custom_field(CustomFieldMapping::create("Favorite Color", "5"));
    let report = FeedSettingsSaver::new()
        .save(&session, &store, None, 2, posted)
        .await
        .unwrap();

    let choices = admin::custom_field_choices(&session, &report.created).await;
    let shortcut = report.created[0].shortcut_name.clone();

    assert_eq!(
        choices,
        vec![
            Choice::new("Select Emma Field", ""),
            Choice::new("First Name", "first_name"),
            Choice::new("Last Name", "last_name"),
            Choice::new("Favorite Color", shortcut),
            Choice::new("Add Custom Field", "gf_custom"),
        ]
    );
}

#[tokio::test]
async fn existing_feed_update_keeps_its_id() {
    let api = Arc::new(RecordingEmmaApi::new());
    let session = ApiSession::with_client(api.clone());
    let store = MemorySettingsStore::new();
    let id = store
        .save_feed(None, 2, &FeedMeta::new("Old Name", "3"))
        .await
        .unwrap();

    let report = FeedSettingsSaver::new()
        .save(&session, &store, Some(id), 2, FeedMeta::new("New Name", "3").with_group("42"))
        .await
        .unwrap();

    assert_eq!(report.feed_id, Some(id));
    assert_eq!(report.previous.map(|m| m.feed_name), Some("Old Name".to_string()));
    assert_eq!(store.feed_count().await, 1);
    assert_eq!(store.get_feed(id).await.unwrap().unwrap().meta.group, "42");
}
