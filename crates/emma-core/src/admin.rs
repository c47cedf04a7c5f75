//! Admin surface: choice lists, feed list columns, status messages
//!
//! Everything here degrades to a usable default when the credentials are
//! not valid or the listing call fails; the settings page must still render.

use serde::Serialize;
use tracing::{debug, warn};

use crate::credentials::ApiSession;
use crate::model::{CREATE_CUSTOM_FIELD, Feed, GroupFilter, RemoteField};
use crate::provisioner::NewCustomField;

/// Short title used in admin messages
pub const SHORT_TITLE: &str = "Emma";

/// One option of a select control
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    /// Text shown to the admin
    pub label: String,
    /// Submitted value
    pub value: String,
}

impl Choice {
    /// Create a choice
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Feeds may only be listed or created once the account check passes
pub fn can_create_feed(account_check: Option<bool>) -> bool {
    account_check == Some(true)
}

/// Message shown instead of the feed list when feeds cannot be created
pub fn configure_addon_message(account_check: Option<bool>) -> String {
    let settings_label = format!("{} Settings", SHORT_TITLE);
    match account_check {
        None => format!("To get started, please configure your {}.", settings_label),
        Some(_) => format!(
            "Please make sure you have entered valid API credentials on the {} page.",
            settings_label
        ),
    }
}

/// Columns of the feed list page
pub fn feed_list_columns() -> Vec<(&'static str, &'static str)> {
    vec![("feed_name", "Feed Name"), ("group", "Emma Group")]
}

/// Group choices for the feed settings
///
/// Regular and test groups; empty when the session is not valid, the
/// listing fails, or there are no groups.
pub async fn group_choices(session: &ApiSession) -> Vec<Choice> {
    let Some(client) = session.client() else {
        return Vec::new();
    };

    match client.list_groups(&GroupFilter::regular_and_test()).await {
        Ok(groups) => groups
            .into_iter()
            .map(|group| Choice::new(group.name, group.id))
            .collect(),
        Err(e) => {
            warn!("Unable to list Emma groups; {}", e);
            Vec::new()
        }
    }
}

/// Custom field choices for the field map
///
/// `"Select Emma Field"` first, then the remote fields merged with the
/// fields created during this request, then `"Add Custom Field"`. Only the
/// placeholder is returned when the session is not valid.
pub async fn custom_field_choices(
    session: &ApiSession,
    created: &[NewCustomField],
) -> Vec<Choice> {
    let mut choices = vec![Choice::new("Select Emma Field", "")];

    let Some(client) = session.client() else {
        return choices;
    };

    let remote = match client.list_fields().await {
        Ok(fields) => fields,
        Err(e) => {
            warn!("Unable to list Emma fields; {}", e);
            return choices;
        }
    };

    choices.extend(merge_field_choices(&remote, created));
    choices.push(Choice::new("Add Custom Field", CREATE_CUSTOM_FIELD));
    choices
}

/// Remote fields in listed order, then newly created fields whose shortcut
/// is not already listed
pub fn merge_field_choices(remote: &[RemoteField], created: &[NewCustomField]) -> Vec<Choice> {
    let mut choices: Vec<Choice> = remote
        .iter()
        .map(|f| Choice::new(f.display_name.clone(), f.shortcut_name.clone()))
        .collect();

    for field in created {
        if choices.iter().any(|c| c.value == field.shortcut_name) {
            continue;
        }
        choices.push(Choice::new(field.label.clone(), field.shortcut_name.clone()));
    }

    choices
}

/// Value of the "Emma Group" column for one feed
///
/// The group's name when it can be looked up, otherwise the stored value.
/// Feeds without a target group are never looked up.
pub async fn group_column_value(session: &ApiSession, feed: &Feed) -> String {
    let Some(group_id) = feed.meta.target_group() else {
        return feed.meta.group.clone();
    };

    let Some(client) = session.client() else {
        return group_id.to_string();
    };

    match client.get_group(group_id).await {
        Ok(Some(group)) => group.name,
        Ok(None) => group_id.to_string(),
        Err(e) => {
            debug!("Unable to look up group {}; {}", group_id, e);
            group_id.to_string()
        }
    }
}
