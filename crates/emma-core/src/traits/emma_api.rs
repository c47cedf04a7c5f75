// # Emma API Trait
//
// Defines the small slice of the Emma API the add-on talks to.
//
// ## Implementations
//
// - HTTP: `emma-api` crate
// - Tests: call-recording doubles in `tests/common`
//
// ## Usage
//
// ```rust,ignore
// use emma_core::{EmmaApi, Member};
//
// async fn subscribe(api: &dyn EmmaApi) -> emma_core::Result<()> {
//     let response = api.add_or_update_member(&Member::new("a@b.com")).await?;
//     println!("newly added: {}", response.status);
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::PluginSettings;
use crate::model::{FieldDefinition, Group, GroupFilter, Member, MemberResponse, RemoteField};

/// Trait for Emma API client implementations
///
/// Every method performs exactly one authenticated HTTP call. Faults come
/// back as [`crate::Error::Api`] (carrying the HTTP status) or
/// [`crate::Error::Transport`] (no status was received).
///
/// # Contract
///
/// ## Allowed
/// - ✅ One HTTP call per method invocation
/// - ✅ Parse and normalize the service's JSON responses
///
/// ## Forbidden
/// - ❌ Retry or back off (delivery is at most once per submission)
/// - ❌ Cache listings across calls (callers decide what is fresh)
/// - ❌ Log credentials
#[async_trait]
pub trait EmmaApi: Send + Sync {
    /// List member groups
    ///
    /// Also used as the lightweight read-only credential test.
    async fn list_groups(&self, filter: &GroupFilter) -> Result<Vec<Group>, crate::Error>;

    /// Fetch one group by id
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Group))`: The group exists
    /// - `Ok(None)`: The service does not know this id
    /// - `Err(Error)`: The request failed
    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, crate::Error>;

    /// List custom fields
    async fn list_fields(&self) -> Result<Vec<RemoteField>, crate::Error>;

    /// Create a custom field, returning the new field's id
    async fn create_field(&self, field: &FieldDefinition) -> Result<String, crate::Error>;

    /// Add a member, or update it when the email is already known
    async fn add_or_update_member(&self, member: &Member) -> Result<MemberResponse, crate::Error>;

    /// Sign a member up through the double opt-in flow
    ///
    /// The member has to confirm via an email sent by the service before
    /// becoming fully active.
    async fn signup_member(&self, member: &Member) -> Result<MemberResponse, crate::Error>;

    /// The account this client is bound to (for logging)
    fn account_id(&self) -> &str;
}

/// Helper trait for constructing clients from plugin credentials
///
/// Construction must not touch the network; the credential check is a
/// separate call made by [`crate::CredentialValidator`].
pub trait EmmaApiFactory: Send + Sync {
    /// Create a client bound to the given credentials
    fn create(&self, settings: &PluginSettings) -> Result<Arc<dyn EmmaApi>, crate::Error>;
}
