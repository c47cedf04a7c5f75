// # Emma API Client
//
// reqwest implementation of `emma_core::traits::EmmaApi`.
//
// ## Behavior
//
// - One HTTP request per trait call; no retries, no caching
// - HTTP timeout comes from `ClientConfig` (30 seconds by default)
// - Non-2xx responses become `Error::Api { status, .. }` so callers can
//   classify 401 / 403 / everything else
// - Connection failures and timeouts become `Error::Transport`
//
// ## Security Requirements
//
// - The private API key NEVER appears in logs or `Debug` output
// - Credentials are sent as HTTP basic auth (public key : private key)
//
// ## API Reference
//
// All paths are relative to `{base_url}/{account_id}`.
//
// - List groups: GET `/groups?group_types=g,t`
// - Get group: GET `/groups/:member_group_id`
// - List fields: GET `/fields`
// - Create field: POST `/fields`
// - Add or update member: POST `/members/add`
// - Signup member (double opt-in): POST `/members/signup`

use async_trait::async_trait;
use emma_core::config::{ClientConfig, PluginSettings};
use emma_core::model::{FieldDefinition, Group, GroupFilter, Member, MemberResponse, RemoteField};
use emma_core::traits::{EmmaApi, EmmaApiFactory};
use emma_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Emma REST API client
///
/// Stateless apart from the connection pool; safe to share behind `Arc`.
pub struct EmmaClient {
    account_id: String,

    public_api_key: String,

    /// ⚠️ NEVER log this value
    private_api_key: String,

    /// `{base_url}/{account_id}`, no trailing slash
    account_url: String,

    client: reqwest::Client,
}

// Custom Debug implementation that hides the private key
impl std::fmt::Debug for EmmaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmmaClient")
            .field("account_id", &self.account_id)
            .field("public_api_key", &self.public_api_key)
            .field("private_api_key", &"<REDACTED>")
            .field("account_url", &self.account_url)
            .finish()
    }
}

impl EmmaClient {
    /// Create a client for one account
    ///
    /// # Errors
    ///
    /// `Error::Config` when a credential is blank, the client configuration
    /// is invalid, or the HTTP client cannot be built.
    pub fn new(settings: &PluginSettings, config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        if !settings.is_configured() {
            return Err(Error::config(
                "Emma account ID, public API key and private API key are required",
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        let account_id = settings.account_id.trim().to_string();
        let account_url = format!("{}/{}", config.base_url.trim_end_matches('/'), account_id);

        Ok(Self {
            account_id,
            public_api_key: settings.public_api_key.trim().to_string(),
            private_api_key: settings.private_api_key.trim().to_string(),
            account_url,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.account_url, path.trim_start_matches('/'))
    }

    /// Send an authenticated request and reject non-2xx responses
    async fn send(&self, request: reqwest::RequestBuilder, action: &str) -> Result<reqwest::Response> {
        let response = request
            .basic_auth(&self.public_api_key, Some(&self.private_api_key))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::transport(format!("HTTP request failed: {}", e)))?;

        check_response(response, action).await
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        action: &str,
    ) -> Result<T> {
        response.json().await.map_err(|e| {
            Error::unexpected_response(format!("Failed to parse {} response: {}", action, e))
        })
    }
}

/// Map a non-success response to `Error::Api`
async fn check_response(response: reqwest::Response, action: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error response".to_string());

    let message = match status.as_u16() {
        401 => format!(
            "Authentication failed: invalid public or private API key. Status: {}",
            status
        ),
        403 => format!(
            "Access denied: the account ID does not match the API keys. Status: {}",
            status
        ),
        404 => format!("{} failed: not found", action),
        429 => format!("Rate limit exceeded. Please retry later. Status: {}", status),
        500..=599 => format!("Emma server error: {} - {}", status, error_text),
        _ => format!("{} failed: {} - {}", action, status, error_text),
    };

    Err(Error::api(status.as_u16(), message))
}

#[derive(Debug, Deserialize)]
struct GroupRecord {
    member_group_id: Value,
    #[serde(default)]
    group_name: String,
}

impl GroupRecord {
    fn into_group(self) -> Result<Group> {
        Ok(Group {
            id: id_text(&self.member_group_id)
                .ok_or_else(|| Error::unexpected_response("Group without member_group_id"))?,
            name: self.group_name,
        })
    }
}

#[derive(Debug, Deserialize)]
struct FieldRecord {
    shortcut_name: String,
    #[serde(default)]
    display_name: String,
}

/// Outbound member body
///
/// Numeric group ids are sent as numbers.
#[derive(Debug, Serialize)]
struct MemberBody<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group_ids: Option<Vec<Value>>,
}

impl<'a> From<&'a Member> for MemberBody<'a> {
    fn from(member: &'a Member) -> Self {
        Self {
            email: &member.email,
            fields: member.fields.as_ref(),
            group_ids: member.group_ids.as_ref().map(|ids| {
                ids.iter()
                    .map(|id| match id.parse::<u64>() {
                        Ok(n) => Value::from(n),
                        Err(_) => Value::from(id.as_str()),
                    })
                    .collect()
            }),
        }
    }
}

/// Render an id the service may send as a number or a string
fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Read the added/updated flag of a member response
///
/// `added` wins when present; otherwise `status` is read as a loose boolean
/// (`0`, `""`, `"0"`, `false` and null are false).
fn member_response(body: &Value) -> MemberResponse {
    let flag = body.get("added").or_else(|| body.get("status"));
    MemberResponse {
        status: flag.is_some_and(truthy),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0" && !s.eq_ignore_ascii_case("false"),
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

#[async_trait]
impl EmmaApi for EmmaClient {
    async fn list_groups(&self, filter: &GroupFilter) -> Result<Vec<Group>> {
        tracing::debug!("Listing Emma groups for account {}", self.account_id);

        let mut request = self.client.get(self.url("groups"));
        if let Some(types) = filter.query_value() {
            request = request.query(&[("group_types", types)]);
        }

        let response = self.send(request, "Group listing").await?;
        let records: Vec<GroupRecord> = Self::read_json(response, "group listing").await?;
        records.into_iter().map(GroupRecord::into_group).collect()
    }

    async fn get_group(&self, group_id: &str) -> Result<Option<Group>> {
        let group_id = group_id.trim();
        if group_id.is_empty() {
            return Ok(None);
        }

        let request = self.client.get(self.url(&format!("groups/{}", group_id)));
        let response = match self.send(request, "Group lookup").await {
            Ok(response) => response,
            Err(e) if e.http_status() == Some(404) => {
                tracing::debug!("Emma group {} not found", group_id);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let record: GroupRecord = Self::read_json(response, "group lookup").await?;
        record.into_group().map(Some)
    }

    async fn list_fields(&self) -> Result<Vec<RemoteField>> {
        tracing::debug!("Listing Emma fields for account {}", self.account_id);

        let response = self.send(self.client.get(self.url("fields")), "Field listing").await?;
        let records: Vec<FieldRecord> = Self::read_json(response, "field listing").await?;

        Ok(records
            .into_iter()
            .map(|record| RemoteField {
                shortcut_name: record.shortcut_name,
                display_name: record.display_name,
            })
            .collect())
    }

    async fn create_field(&self, field: &FieldDefinition) -> Result<String> {
        tracing::debug!("Creating Emma field {}", field.shortcut_name);

        let request = self.client.post(self.url("fields")).json(field);
        let response = self.send(request, "Field creation").await?;
        let body: Value = Self::read_json(response, "field creation").await?;

        id_text(&body).ok_or_else(|| {
            Error::unexpected_response(format!("Field creation returned no field id: {}", body))
        })
    }

    async fn add_or_update_member(&self, member: &Member) -> Result<MemberResponse> {
        let request = self
            .client
            .post(self.url("members/add"))
            .json(&MemberBody::from(member));
        let response = self.send(request, "Member add").await?;
        let body: Value = Self::read_json(response, "member add").await?;
        Ok(member_response(&body))
    }

    async fn signup_member(&self, member: &Member) -> Result<MemberResponse> {
        let request = self
            .client
            .post(self.url("members/signup"))
            .json(&MemberBody::from(member));
        let response = self.send(request, "Member signup").await?;
        let body: Value = Self::read_json(response, "member signup").await?;
        Ok(member_response(&body))
    }

    fn account_id(&self) -> &str {
        &self.account_id
    }
}

/// Factory for creating Emma clients
#[derive(Debug, Clone, Default)]
pub struct EmmaClientFactory {
    config: ClientConfig,
}

impl EmmaClientFactory {
    /// Create a factory building clients with `config`
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }
}

impl EmmaApiFactory for EmmaClientFactory {
    fn create(&self, settings: &PluginSettings) -> Result<Arc<dyn EmmaApi>> {
        Ok(Arc::new(EmmaClient::new(settings, &self.config)?))
    }
}
