//! Outbound member payload and remote group/field records

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Member payload sent to the add / signup operations
///
/// `fields` and `group_ids` are omitted from the payload when absent:
/// the service treats "no fields" differently from "empty fields".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Member email address (never empty)
    pub email: String,

    /// Custom field shortcut → value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,

    /// Groups to add the member to (zero or one in practice)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_ids: Option<Vec<String>>,
}

impl Member {
    /// Create a member with only an email address
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            fields: None,
            group_ids: None,
        }
    }
}

/// Result of an add or signup call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberResponse {
    /// `true`: member newly added; `false`: member existed and was updated
    pub status: bool,
}

/// Group types accepted by the group listing filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupType {
    /// Regular group
    #[serde(rename = "g")]
    Group,
    /// Test group
    #[serde(rename = "t")]
    Test,
}

impl GroupType {
    /// Single-letter code used by the API
    pub fn code(&self) -> &'static str {
        match self {
            GroupType::Group => "g",
            GroupType::Test => "t",
        }
    }
}

/// Filter for the group listing
///
/// An empty filter leaves the choice to the service (regular groups only).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupFilter {
    /// Group types to include
    pub group_types: Vec<GroupType>,
}

impl GroupFilter {
    /// Regular and test groups, as offered in the feed settings
    pub fn regular_and_test() -> Self {
        Self {
            group_types: vec![GroupType::Group, GroupType::Test],
        }
    }

    /// Comma-separated type codes (`"g,t"`), or `None` for the default
    pub fn query_value(&self) -> Option<String> {
        if self.group_types.is_empty() {
            return None;
        }
        Some(
            self.group_types
                .iter()
                .map(GroupType::code)
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

/// An Emma member group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group id
    pub id: String,
    /// Group display name
    pub name: String,
}

/// An Emma custom field as listed by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteField {
    /// Stable machine key
    pub shortcut_name: String,
    /// Human-readable name
    pub display_name: String,
}

/// Definition of a custom field to create
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Human-readable name (the admin's label, unmodified)
    pub display_name: String,
    /// Generated machine key
    pub shortcut_name: String,
    /// Field type
    pub field_type: String,
    /// Widget type
    pub widget_type: String,
    /// Ordering hint
    pub column_order: u32,
}

impl FieldDefinition {
    /// A plain text field with default ordering
    pub fn text(display_name: impl Into<String>, shortcut_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            shortcut_name: shortcut_name.into(),
            field_type: "text".to_string(),
            widget_type: "text".to_string(),
            column_order: 0,
        }
    }
}
