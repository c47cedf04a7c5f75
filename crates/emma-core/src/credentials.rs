//! Credential validation and the per-request API session
//!
//! A request (one submission, one settings save, one admin page render)
//! validates the credentials once via [`CredentialValidator::validate`] and
//! passes the resulting [`ApiSession`] to every component that needs the
//! remote client.
//!
//! ## Classification
//!
//! | Situation                    | Status         |
//! |------------------------------|----------------|
//! | any credential blank         | `Unconfigured` |
//! | test call succeeds           | `Valid`        |
//! | HTTP 403 (account mismatch)  | `Valid`        |
//! | HTTP 401                     | `Invalid`      |
//! | any other fault              | `Invalid`      |

use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::config::PluginSettings;
use crate::model::GroupFilter;
use crate::traits::{EmmaApi, EmmaApiFactory};

/// Three-state outcome of a credential check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStatus {
    /// One or more credentials are blank; nothing was sent
    Unconfigured,
    /// The service rejected the credentials, or could not be asked
    Invalid,
    /// The credentials authenticate
    Valid,
}

/// Why a session ended up `Invalid`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    /// HTTP 401 from the test call
    Rejected(String),
    /// Any other fault (transport, 5xx, unexpected body)
    Unclassified {
        /// HTTP status, when one was received
        status: Option<u16>,
        /// Error message
        message: String,
    },
    /// The client could not be built from the settings
    ClientSetup(String),
}

/// Validated access to the Emma API for the duration of one request
#[derive(Clone)]
pub enum ApiSession {
    /// Credentials missing
    Unconfigured,
    /// Credentials unusable
    Invalid(InvalidReason),
    /// Credentials authenticate
    Valid {
        /// Client to use for the rest of the request
        client: Arc<dyn EmmaApi>,
        /// `false` when the service answered 403 (account id does not resolve)
        account_verified: bool,
    },
}

impl std::fmt::Debug for ApiSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiSession::Unconfigured => f.write_str("ApiSession::Unconfigured"),
            ApiSession::Invalid(reason) => f.debug_tuple("ApiSession::Invalid").field(reason).finish(),
            ApiSession::Valid {
                client,
                account_verified,
            } => f
                .debug_struct("ApiSession::Valid")
                .field("account_id", &client.account_id())
                .field("account_verified", account_verified)
                .finish(),
        }
    }
}

impl ApiSession {
    /// Wrap an already-trusted client (embedding and tests)
    pub fn with_client(client: Arc<dyn EmmaApi>) -> Self {
        ApiSession::Valid {
            client,
            account_verified: true,
        }
    }

    /// Three-state status of this session
    pub fn status(&self) -> CredentialStatus {
        match self {
            ApiSession::Unconfigured => CredentialStatus::Unconfigured,
            ApiSession::Invalid(_) => CredentialStatus::Invalid,
            ApiSession::Valid { .. } => CredentialStatus::Valid,
        }
    }

    /// True when the credentials authenticate
    pub fn is_valid(&self) -> bool {
        matches!(self, ApiSession::Valid { .. })
    }

    /// The validated client, if any
    pub fn client(&self) -> Option<&dyn EmmaApi> {
        match self {
            ApiSession::Valid { client, .. } => Some(client.as_ref()),
            _ => None,
        }
    }

    /// Tri-state account check used to gate feed creation
    ///
    /// # Returns
    ///
    /// - `None`: credentials are not configured
    /// - `Some(true)`: the test call succeeded
    /// - `Some(false)`: any fault, including 403
    pub fn account_check(&self) -> Option<bool> {
        match self {
            ApiSession::Unconfigured => None,
            ApiSession::Valid {
                account_verified: true,
                ..
            } => Some(true),
            _ => Some(false),
        }
    }

    /// Why the session is invalid, if it is
    pub fn invalid_reason(&self) -> Option<&InvalidReason> {
        match self {
            ApiSession::Invalid(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Checks plugin credentials against the Emma API
pub struct CredentialValidator {
    factory: Arc<dyn EmmaApiFactory>,
}

impl CredentialValidator {
    /// Create a validator building clients with `factory`
    pub fn new(factory: Arc<dyn EmmaApiFactory>) -> Self {
        Self { factory }
    }

    /// Validate the credentials and open a session
    ///
    /// Makes no remote call when any credential is blank, otherwise exactly
    /// one group listing.
    pub async fn validate(&self, settings: &PluginSettings) -> ApiSession {
        if !settings.is_configured() {
            debug!("Emma credentials are not configured");
            return ApiSession::Unconfigured;
        }

        debug!("Validating API info for account {}", settings.account_id);

        let client = match self.factory.create(settings) {
            Ok(client) => client,
            Err(e) => {
                error!("Unable to build Emma client; {}", e);
                return ApiSession::Invalid(InvalidReason::ClientSetup(e.to_string()));
            }
        };

        match client.list_groups(&GroupFilter::default()).await {
            Ok(_) => {
                debug!("API credentials are valid");
                ApiSession::Valid {
                    client,
                    account_verified: true,
                }
            }
            Err(e) if e.is_unauthorized() => {
                error!("API credentials are invalid; {}", e);
                ApiSession::Invalid(InvalidReason::Rejected(e.to_string()))
            }
            Err(e) if e.is_forbidden() => {
                warn!("API credentials are valid, Account ID is invalid; {}", e);
                ApiSession::Valid {
                    client,
                    account_verified: false,
                }
            }
            Err(e) => {
                error!("Unable to validate API credentials; {}", e);
                ApiSession::Invalid(InvalidReason::Unclassified {
                    status: e.http_status(),
                    message: e.to_string(),
                })
            }
        }
    }

    /// Stricter check used to gate feed creation
    ///
    /// Same as [`ApiSession::account_check`] on a fresh session; callers that
    /// already hold a session should ask it instead.
    pub async fn check_account(&self, settings: &PluginSettings) -> Option<bool> {
        self.validate(settings).await.account_check()
    }
}
