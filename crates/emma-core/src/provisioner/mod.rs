//! Custom field provisioning on settings save
//!
//! When the admin picks "Add Custom Field" in the field map and types a
//! label, the feed settings arrive with that label in `custom_key`. Before
//! the settings are validated and persisted, each such request is turned
//! into a real Emma field and the mapping is rewritten to point at it.
//!
//! ## Flow
//!
//! ```text
//! posted settings ──▶ for each mapping with a label
//!                      ├─ generate shortcut (slug + unique suffix)
//!                      ├─ EmmaApi::create_field
//!                      ├─ ok  → key = shortcut, custom_key = ""
//!                      └─ err → log, leave unresolved
//!                     ──▶ ProvisionReport { settings, created, patches, failures }
//! ```
//!
//! Mappings are handled independently. There is no rollback: fields created
//! before a failure stay created.

use std::collections::HashSet;
use tracing::{debug, error, info};

use crate::credentials::ApiSession;
use crate::model::{FeedMeta, FieldDefinition};

/// Length of the unique suffix appended to generated shortcuts
const SUFFIX_LEN: usize = 13;

/// Shortcut used when a label has no word characters at all
const FALLBACK_SLUG: &str = "field";

/// Generates remote-safe, unique field shortcuts for one batch
#[derive(Debug, Default)]
pub struct ShortcutNameGenerator {
    issued: HashSet<String>,
}

impl ShortcutNameGenerator {
    /// Create a generator with no issued names
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a label: trim, spaces → `_`, drop non-word characters, lowercase
    pub fn slug(label: &str) -> String {
        label
            .trim()
            .replace(' ', "_")
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect::<String>()
            .to_lowercase()
    }

    /// Generate a shortcut for `label`, never repeating one from this batch
    pub fn generate(&mut self, label: &str) -> String {
        let mut slug = Self::slug(label);
        if slug.is_empty() {
            slug = FALLBACK_SLUG.to_string();
        }

        loop {
            let suffix = uuid::Uuid::new_v4().simple().to_string();
            let candidate = format!("{}_{}", slug, &suffix[..SUFFIX_LEN]);
            if self.issued.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

/// A field created during this request
///
/// The field listing shown on the settings page may have been fetched
/// before the field existed; these descriptors fill that gap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomField {
    /// Display name (the admin's label)
    pub label: String,
    /// Generated shortcut
    pub shortcut_name: String,
}

/// Change to apply to the raw posted settings so the re-rendered form
/// reflects the new field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingPatch {
    /// Position in `custom_fields`
    pub index: usize,
    /// New key for that mapping
    pub key: String,
}

/// A creation request that did not go through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionFailure {
    /// Position in `custom_fields`
    pub index: usize,
    /// Label the admin typed
    pub label: String,
    /// Error message
    pub error: String,
}

/// Everything the settings-save caller needs after provisioning
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionReport {
    /// Corrected settings
    pub settings: FeedMeta,
    /// Fields created in this request
    pub created: Vec<NewCustomField>,
    /// Patches for the raw posted settings
    pub patches: Vec<MappingPatch>,
    /// Requests that failed and remain unresolved
    pub failures: Vec<ProvisionFailure>,
}

impl ProvisionReport {
    fn unchanged(settings: FeedMeta) -> Self {
        Self {
            settings,
            created: Vec::new(),
            patches: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Apply the patches to another copy of the posted settings
    pub fn apply_to(&self, posted: &mut FeedMeta) {
        for patch in &self.patches {
            if let Some(mapping) = posted.custom_fields.get_mut(patch.index) {
                mapping.key = patch.key.clone();
                mapping.custom_key.clear();
            }
        }
    }
}

/// Creates the Emma custom fields requested in posted feed settings
#[derive(Debug, Default)]
pub struct CustomFieldProvisioner;

impl CustomFieldProvisioner {
    /// Create a provisioner
    pub fn new() -> Self {
        Self
    }

    /// Provision every requested field and rewrite the settings
    ///
    /// Returns the settings unchanged when there are no custom field
    /// mappings or the session is not valid. Never fails: remote faults are
    /// logged and reported in [`ProvisionReport::failures`].
    pub async fn provision(&self, session: &ApiSession, settings: FeedMeta) -> ProvisionReport {
        if settings.custom_fields.is_empty() {
            return ProvisionReport::unchanged(settings);
        }

        let Some(client) = session.client() else {
            debug!(
                "Skipping custom field provisioning, credentials are {:?}",
                session.status()
            );
            return ProvisionReport::unchanged(settings);
        };

        let mut report = ProvisionReport::unchanged(settings);
        let mut names = ShortcutNameGenerator::new();

        for (index, mapping) in report.settings.custom_fields.iter_mut().enumerate() {
            if !mapping.requests_new_field() {
                continue;
            }

            let label = mapping.custom_key.clone();
            let field = FieldDefinition::text(label.clone(), names.generate(&label));

            match client.create_field(&field).await {
                Ok(field_id) => {
                    info!(
                        "Custom field {} created (id {})",
                        field.shortcut_name, field_id
                    );

                    mapping.key = field.shortcut_name.clone();
                    mapping.custom_key.clear();

                    report.patches.push(MappingPatch {
                        index,
                        key: field.shortcut_name.clone(),
                    });
                    report.created.push(NewCustomField {
                        label: field.display_name,
                        shortcut_name: field.shortcut_name,
                    });
                }
                Err(e) => {
                    error!("Custom field not created; {}", e);
                    report.failures.push(ProvisionFailure {
                        index,
                        label,
                        error: e.to_string(),
                    });
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CustomFieldMapping;

    #[test]
    fn test_slug() {
        assert_eq!(ShortcutNameGenerator::slug("Favorite Color!"), "favorite_color");
        assert_eq!(ShortcutNameGenerator::slug("  Zip Code  "), "zip_code");
        assert_eq!(ShortcutNameGenerator::slug("Café-Name"), "cafname");
        assert_eq!(ShortcutNameGenerator::slug("!!!"), "");
    }

    #[test]
    fn test_same_label_twice_gives_distinct_names() {
        let mut names = ShortcutNameGenerator::new();
        let first = names.generate("Favorite Color!");
        let second = names.generate("Favorite Color!");

        assert_ne!(first, second);
        assert!(first.starts_with("favorite_color_"));
        assert!(second.starts_with("favorite_color_"));
        assert_eq!(first.len(), "favorite_color_".len() + SUFFIX_LEN);
    }

    #[test]
    fn test_label_without_word_characters() {
        let mut names = ShortcutNameGenerator::new();
        assert!(names.generate("???").starts_with("field_"));
    }

    #[test]
    fn test_apply_patches_to_posted_copy() {
        let mut posted = FeedMeta::new("Feed", "3")
            .with_custom_field(CustomFieldMapping::new("first_name", "1.3"))
            .with_custom_field(CustomFieldMapping::create("Favorite Color", "5"));

        let report = ProvisionReport {
            settings: posted.clone(),
            created: Vec::new(),
            patches: vec![MappingPatch {
                index: 1,
                key: "favorite_color_abc".to_string(),
            }],
            failures: Vec::new(),
        };
        report.apply_to(&mut posted);

        assert_eq!(posted.custom_fields[0].key, "first_name");
        assert_eq!(posted.custom_fields[1].key, "favorite_color_abc");
        assert_eq!(posted.custom_fields[1].custom_key, "");
    }

    #[tokio::test]
    async fn test_unconfigured_session_leaves_settings_alone() {
        let settings = FeedMeta::new("Feed", "3")
            .with_custom_field(CustomFieldMapping::create("Favorite Color", "5"));

        let report = CustomFieldProvisioner::new()
            .provision(&ApiSession::Unconfigured, settings.clone())
            .await;

        assert_eq!(report.settings, settings);
        assert!(report.created.is_empty());
        assert!(report.patches.is_empty());
    }
}
