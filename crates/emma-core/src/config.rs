//! Configuration types for the Emma add-on
//!
//! Plugin-level credentials and the pass-through options of the HTTP client.

use serde::{Deserialize, Serialize};

/// Default Emma API endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://api.e2ma.net";

/// Default network timeout for API requests (in seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Plugin-level settings: the Emma credential triple
///
/// The three values are treated as a unit. If any of them is blank the
/// add-on is considered unconfigured and no remote call is attempted.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginSettings {
    /// Emma account id
    #[serde(default)]
    pub account_id: String,

    /// Public API key
    #[serde(default)]
    pub public_api_key: String,

    /// Private API key
    /// ⚠️ NEVER log this value
    #[serde(default)]
    pub private_api_key: String,
}

// Custom Debug implementation that hides the API keys
impl std::fmt::Debug for PluginSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginSettings")
            .field("account_id", &self.account_id)
            .field("public_api_key", &"<REDACTED>")
            .field("private_api_key", &"<REDACTED>")
            .finish()
    }
}

impl PluginSettings {
    /// Create plugin settings from the three credential strings
    pub fn new(
        account_id: impl Into<String>,
        public_api_key: impl Into<String>,
        private_api_key: impl Into<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            public_api_key: public_api_key.into(),
            private_api_key: private_api_key.into(),
        }
    }

    /// True when none of the three values is blank
    pub fn is_configured(&self) -> bool {
        !self.account_id.trim().is_empty()
            && !self.public_api_key.trim().is_empty()
            && !self.private_api_key.trim().is_empty()
    }
}

/// HTTP client options
///
/// The core has no timeout or cancellation layer of its own; the timeout
/// here is handed straight to the HTTP client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API base URL (no trailing slash needed)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ClientConfig {
    /// Point the client at a different endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Validate the client configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.base_url.trim().is_empty() {
            return Err(crate::Error::config("API base URL cannot be empty"));
        }
        if !self.base_url.starts_with("https://") && !self.base_url.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "API base URL must use HTTP or HTTPS scheme. Got: {}",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("HTTP timeout must be > 0"));
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
