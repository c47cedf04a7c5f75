//! Test doubles and common utilities for contract tests
//!
//! The doubles record every remote call so tests can assert exactly what
//! reached the (fake) Emma API.

#![allow(dead_code)]

use emma_core::config::PluginSettings;
use emma_core::error::{Error, Result};
use emma_core::model::{
    FieldDefinition, Group, GroupFilter, Member, MemberResponse, RemoteField,
};
use emma_core::traits::{EmmaApi, EmmaApiFactory};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A call that reached the fake API
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    ListGroups(Option<String>),
    GetGroup(String),
    ListFields,
    CreateField(FieldDefinition),
    AddOrUpdateMember(Member),
    SignupMember(Member),
}

/// How a faked call fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Status(u16),
    Transport,
}

impl Fault {
    fn to_error(self) -> Error {
        match self {
            Fault::Status(status) => Error::api(status, format!("HTTP {}", status)),
            Fault::Transport => Error::transport("connection timed out"),
        }
    }
}

/// A configurable EmmaApi that records calls
pub struct RecordingEmmaApi {
    groups: Vec<Group>,
    fields: Vec<RemoteField>,
    list_groups_fault: Option<Fault>,
    list_fields_fault: Option<Fault>,
    member_fault: Option<Fault>,
    member_status: bool,
    failing_field_labels: Vec<String>,
    calls: Arc<Mutex<Vec<ApiCall>>>,
    field_ids: AtomicUsize,
}

impl RecordingEmmaApi {
    pub fn new() -> Self {
        Self {
            groups: Vec::new(),
            fields: Vec::new(),
            list_groups_fault: None,
            list_fields_fault: None,
            member_fault: None,
            member_status: true,
            failing_field_labels: Vec::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            field_ids: AtomicUsize::new(100),
        }
    }

    pub fn with_group(mut self, id: &str, name: &str) -> Self {
        self.groups.push(Group {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn with_field(mut self, shortcut_name: &str, display_name: &str) -> Self {
        self.fields.push(RemoteField {
            shortcut_name: shortcut_name.to_string(),
            display_name: display_name.to_string(),
        });
        self
    }

    /// Every group listing (including the credential check) fails
    pub fn failing_list_groups(mut self, fault: Fault) -> Self {
        self.list_groups_fault = Some(fault);
        self
    }

    pub fn failing_list_fields(mut self, fault: Fault) -> Self {
        self.list_fields_fault = Some(fault);
        self
    }

    pub fn failing_members(mut self, fault: Fault) -> Self {
        self.member_fault = Some(fault);
        self
    }

    /// Status flag returned by add/signup (`false` = existing member updated)
    pub fn with_member_status(mut self, status: bool) -> Self {
        self.member_status = status;
        self
    }

    /// Field creation fails for fields with this display name
    pub fn failing_field(mut self, label: &str) -> Self {
        self.failing_field_labels.push(label.to_string());
        self
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Calls other than group listings (i.e. anything past the credential check)
    pub fn calls_after_check(&self) -> Vec<ApiCall> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, ApiCall::ListGroups(_)))
            .collect()
    }

    pub fn created_fields(&self) -> Vec<FieldDefinition> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ApiCall::CreateField(field) => Some(field),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl EmmaApi for RecordingEmmaApi {
    async fn list_groups(&self, filter: &GroupFilter) -> Result<Vec<Group>> {
        self.record(ApiCall::ListGroups(filter.query_value()));
        match self.list_groups_fault {
            Some(fault) => Err(fault.to_error()),
            None => Ok(self.groups.clone()),
        }
    }

    async fn get_group(&self, group_id: &str) -> Result<Option<Group>> {
        self.record(ApiCall::GetGroup(group_id.to_string()));
        Ok(self.groups.iter().find(|g| g.id == group_id).cloned())
    }

    async fn list_fields(&self) -> Result<Vec<RemoteField>> {
        self.record(ApiCall::ListFields);
        match self.list_fields_fault {
            Some(fault) => Err(fault.to_error()),
            None => Ok(self.fields.clone()),
        }
    }

    async fn create_field(&self, field: &FieldDefinition) -> Result<String> {
        self.record(ApiCall::CreateField(field.clone()));
        if self.failing_field_labels.contains(&field.display_name) {
            return Err(Error::api(400, "Shortcut name already in use"));
        }
        Ok(self.field_ids.fetch_add(1, Ordering::SeqCst).to_string())
    }

    async fn add_or_update_member(&self, member: &Member) -> Result<MemberResponse> {
        self.record(ApiCall::AddOrUpdateMember(member.clone()));
        match self.member_fault {
            Some(fault) => Err(fault.to_error()),
            None => Ok(MemberResponse {
                status: self.member_status,
            }),
        }
    }

    async fn signup_member(&self, member: &Member) -> Result<MemberResponse> {
        self.record(ApiCall::SignupMember(member.clone()));
        match self.member_fault {
            Some(fault) => Err(fault.to_error()),
            None => Ok(MemberResponse {
                status: self.member_status,
            }),
        }
    }

    fn account_id(&self) -> &str {
        "1234"
    }
}

/// Factory handing out one shared RecordingEmmaApi
pub struct StaticClientFactory {
    client: Arc<RecordingEmmaApi>,
    create_count: AtomicUsize,
}

impl StaticClientFactory {
    pub fn new(client: Arc<RecordingEmmaApi>) -> Self {
        Self {
            client,
            create_count: AtomicUsize::new(0),
        }
    }

    pub fn create_count(&self) -> usize {
        self.create_count.load(Ordering::SeqCst)
    }
}

impl EmmaApiFactory for StaticClientFactory {
    fn create(&self, _settings: &PluginSettings) -> Result<Arc<dyn EmmaApi>> {
        self.create_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.client.clone())
    }
}

/// Credentials that pass the blank check
pub fn configured_settings() -> PluginSettings {
    PluginSettings::new("1234", "public-key", "private-key")
}

/// Wire a recording API into a validator
pub fn validator_for(
    api: RecordingEmmaApi,
) -> (
    emma_core::CredentialValidator,
    Arc<RecordingEmmaApi>,
    Arc<StaticClientFactory>,
) {
    let api = Arc::new(api);
    let factory = Arc::new(StaticClientFactory::new(api.clone()));
    let validator = emma_core::CredentialValidator::new(factory.clone());
    (validator, api, factory)
}
