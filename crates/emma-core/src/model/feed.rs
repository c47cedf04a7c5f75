// # Feed
//
// A saved configuration linking one form to one Emma action.
//
// ## Wire Format
//
// ```json
// {
//   "id": 7,
//   "form_id": 2,
//   "is_active": true,
//   "meta": {
//     "feed_name": "Newsletter",
//     "group": "1024",
//     "email_address": "3",
//     "custom_fields": [
//       { "key": "first_name", "value": "1.3", "custom_key": "" }
//     ],
//     "feed_condition": null,
//     "double_optin": "1"
//   }
// }
// ```

use serde::{Deserialize, Deserializer, Serialize};

/// Group setting meaning "do not add the member to any group"
pub const GROUP_NONE: &str = "none";

/// Custom field key meaning "create a new Emma field with my label"
pub const CREATE_CUSTOM_FIELD: &str = "gf_custom";

/// A persisted feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    /// Unique feed identifier
    pub id: u64,

    /// Owning form identifier
    pub form_id: u64,

    /// Whether the host should run this feed at all
    #[serde(default = "default_active")]
    pub is_active: bool,

    /// Feed settings
    pub meta: FeedMeta,
}

impl Feed {
    /// Create an active feed
    pub fn new(id: u64, form_id: u64, meta: FeedMeta) -> Self {
        Self {
            id,
            form_id,
            is_active: true,
            meta,
        }
    }
}

/// Per-feed settings, as posted by the settings page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedMeta {
    /// Human-readable feed name
    #[serde(default)]
    pub feed_name: String,

    /// Target Emma group id, or [`GROUP_NONE`]
    #[serde(default = "default_group")]
    pub group: String,

    /// Field reference holding the member's email address
    #[serde(default)]
    pub email_address: String,

    /// Ordered remote-key → source-field mappings
    #[serde(default)]
    pub custom_fields: Vec<CustomFieldMapping>,

    /// Conditional-logic predicate, evaluated by the host
    #[serde(default)]
    pub feed_condition: Option<serde_json::Value>,

    /// Use the signup (double opt-in) operation instead of a direct add
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub double_optin: bool,
}

impl FeedMeta {
    /// Create settings targeting `email_address` with no group or custom fields
    pub fn new(feed_name: impl Into<String>, email_address: impl Into<String>) -> Self {
        Self {
            feed_name: feed_name.into(),
            group: default_group(),
            email_address: email_address.into(),
            custom_fields: Vec::new(),
            feed_condition: None,
            double_optin: false,
        }
    }

    /// Set the target group
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Append a custom field mapping
    pub fn with_custom_field(mut self, mapping: CustomFieldMapping) -> Self {
        self.custom_fields.push(mapping);
        self
    }

    /// Enable or disable double opt-in
    pub fn with_double_optin(mut self, double_optin: bool) -> Self {
        self.double_optin = double_optin;
        self
    }

    /// The configured group, unless it is the "none" sentinel or blank
    pub fn target_group(&self) -> Option<&str> {
        let group = self.group.trim();
        if group.is_empty() || group == GROUP_NONE {
            None
        } else {
            Some(group)
        }
    }
}

impl Default for FeedMeta {
    fn default() -> Self {
        Self::new("", "")
    }
}

/// One row of the custom field map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFieldMapping {
    /// Emma field shortcut, or [`CREATE_CUSTOM_FIELD`]
    #[serde(default)]
    pub key: String,

    /// Source field reference in the entry
    #[serde(default)]
    pub value: String,

    /// Label typed by the admin when asking for a new Emma field
    #[serde(default)]
    pub custom_key: String,
}

impl CustomFieldMapping {
    /// Map an existing Emma field to a source field
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            custom_key: String::new(),
        }
    }

    /// Ask for a new Emma field labelled `label`, fed from `value`
    pub fn create(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: CREATE_CUSTOM_FIELD.to_string(),
            value: value.into(),
            custom_key: label.into(),
        }
    }

    /// A non-blank label means the admin asked for a new remote field
    pub fn requests_new_field(&self) -> bool {
        !self.custom_key.trim().is_empty()
    }

    /// The key points at a real Emma field
    pub fn is_resolved(&self) -> bool {
        let key = self.key.trim();
        !key.is_empty() && key != CREATE_CUSTOM_FIELD
    }
}

fn default_group() -> String {
    GROUP_NONE.to_string()
}

fn default_active() -> bool {
    true
}

/// Accepts `true`/`false`, `0`/`1`, and their string forms
///
/// Checkbox settings arrive as `"1"`/`"0"` from the settings page.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        serde_json::Value::String(s) => matches!(s.trim(), "1" | "true" | "on" | "yes"),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_group_sentinel() {
        assert_eq!(FeedMeta::new("f", "3").target_group(), None);
        assert_eq!(FeedMeta::new("f", "3").with_group("").target_group(), None);
        assert_eq!(
            FeedMeta::new("f", "3").with_group("1024").target_group(),
            Some("1024")
        );
    }

    #[test]
    fn test_double_optin_accepts_checkbox_strings() {
        let meta: FeedMeta =
            serde_json::from_str(r#"{"email_address":"3","double_optin":"1"}"#).unwrap();
        assert!(meta.double_optin);

        let meta: FeedMeta =
            serde_json::from_str(r#"{"email_address":"3","double_optin":"0"}"#).unwrap();
        assert!(!meta.double_optin);

        let meta: FeedMeta =
            serde_json::from_str(r#"{"email_address":"3","double_optin":true}"#).unwrap();
        assert!(meta.double_optin);

        let meta: FeedMeta = serde_json::from_str(r#"{"email_address":"3"}"#).unwrap();
        assert!(!meta.double_optin);
        assert_eq!(meta.group, GROUP_NONE);
    }

    #[test]
    fn test_mapping_state() {
        let existing = CustomFieldMapping::new("first_name", "1.3");
        assert!(existing.is_resolved());
        assert!(!existing.requests_new_field());

        let new_field = CustomFieldMapping::create("Favorite Color!", "5");
        assert!(!new_field.is_resolved());
        assert!(new_field.requests_new_field());

        assert!(!CustomFieldMapping::new("", "5").is_resolved());
    }

    #[test]
    fn test_feed_defaults_to_active() {
        let feed: Feed =
            serde_json::from_str(r#"{"id":1,"form_id":2,"meta":{"email_address":"3"}}"#).unwrap();
        assert!(feed.is_active);
        assert_eq!(feed.meta.email_address, "3");
    }
}
