//! Data model shared by the add-on components
//!
//! - [`feed`]: persisted feed configuration
//! - [`entry`]: submitted entry and the form it belongs to
//! - [`member`]: outbound member payload and remote group/field records

pub mod entry;
pub mod feed;
pub mod member;

pub use entry::{Entry, FieldInput, Form, FormField};
pub use feed::{CREATE_CUSTOM_FIELD, CustomFieldMapping, Feed, FeedMeta, GROUP_NONE};
pub use member::{FieldDefinition, Group, GroupFilter, GroupType, Member, MemberResponse, RemoteField};
