//! Feed settings validation and the settings-save orchestrator
//!
//! ## Save Flow
//!
//! 1. Snapshot the previously stored settings
//! 2. Provision requested custom fields (rewrites the posted settings)
//! 3. Validate the corrected settings
//! 4. Persist through the [`SettingsStore`]
//! 5. Report back everything the settings page needs to re-render

use tracing::{debug, error, info};

use crate::credentials::ApiSession;
use crate::error::Result;
use crate::model::FeedMeta;
use crate::provisioner::{CustomFieldProvisioner, NewCustomField, ProvisionFailure};
use crate::traits::SettingsStore;

/// Admin message after a successful save
pub const SAVE_SUCCESS_MESSAGE: &str = "Emma feed settings have been updated.";

/// Admin message after a failed save
pub const SAVE_ERROR_MESSAGE: &str = "There was an error while saving your settings.";

/// A single validation problem, tied to a setting name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Setting name (`custom_fields[1]` for map rows)
    pub field: String,
    /// Message for the admin
    pub message: String,
}

impl FieldError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate posted feed settings
///
/// Required: `feed_name`, `group`, `email_address`. Every custom field row
/// must point at a real Emma field; a row still carrying the "create new"
/// sentinel means provisioning failed.
pub fn validate_feed_settings(settings: &FeedMeta) -> std::result::Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if settings.feed_name.trim().is_empty() {
        errors.push(FieldError::new("feed_name", "This field is required."));
    }
    if settings.group.trim().is_empty() {
        errors.push(FieldError::new("group", "This field is required."));
    }
    if settings.email_address.trim().is_empty() {
        errors.push(FieldError::new("email_address", "This field is required."));
    }

    for (index, mapping) in settings.custom_fields.iter().enumerate() {
        if mapping.is_resolved() {
            continue;
        }
        let message = if mapping.requests_new_field() {
            format!("Unable to create Emma field \"{}\".", mapping.custom_key.trim())
        } else {
            "Select an Emma field.".to_string()
        };
        errors.push(FieldError::new(format!("custom_fields[{}]", index), message));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Result of a settings save
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReport {
    /// Saved feed id; `None` when validation failed
    pub feed_id: Option<u64>,
    /// Settings stored before this save, if the feed existed
    pub previous: Option<FeedMeta>,
    /// Corrected posted settings, for re-rendering the form
    pub posted: FeedMeta,
    /// Fields created in this request, for the field choice list
    pub created: Vec<NewCustomField>,
    /// Field creation requests that failed
    pub provision_failures: Vec<ProvisionFailure>,
    /// Validation problems
    pub errors: Vec<FieldError>,
    /// Message for the admin
    pub message: &'static str,
}

impl SaveReport {
    /// True when the settings were persisted
    pub fn is_saved(&self) -> bool {
        self.feed_id.is_some()
    }
}

/// Settings-save orchestrator for feed settings
#[derive(Debug, Default)]
pub struct FeedSettingsSaver {
    provisioner: CustomFieldProvisioner,
}

impl FeedSettingsSaver {
    /// Create a saver
    pub fn new() -> Self {
        Self::default()
    }

    /// Provision, validate, and persist posted feed settings
    ///
    /// Only storage failures are returned as errors; validation problems
    /// are part of the report.
    pub async fn save(
        &self,
        session: &ApiSession,
        store: &dyn SettingsStore,
        feed_id: Option<u64>,
        form_id: u64,
        posted: FeedMeta,
    ) -> Result<SaveReport> {
        let previous = match feed_id {
            Some(id) => store.get_feed(id).await?.map(|feed| feed.meta),
            None => None,
        };

        let mut raw_posted = posted.clone();
        let provisioned = self.provisioner.provision(session, posted).await;
        provisioned.apply_to(&mut raw_posted);

        let (saved_id, errors) = match validate_feed_settings(&provisioned.settings) {
            Ok(()) => {
                let id = store.save_feed(feed_id, form_id, &provisioned.settings).await?;
                info!("Feed {} saved for form {}", id, form_id);
                (Some(id), Vec::new())
            }
            Err(errors) => {
                debug!("Feed settings rejected: {:?}", errors);
                (None, errors)
            }
        };

        let message = if saved_id.is_some() {
            SAVE_SUCCESS_MESSAGE
        } else {
            error!("Feed settings for form {} not saved", form_id);
            SAVE_ERROR_MESSAGE
        };

        Ok(SaveReport {
            feed_id: saved_id,
            previous,
            posted: raw_posted,
            created: provisioned.created,
            provision_failures: provisioned.failures,
            errors,
            message,
        })
    }
}
