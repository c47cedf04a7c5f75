// # emma-feed - Emma form-feed host
//
// Thin integration layer over emma-core:
// - Reading configuration from environment variables
// - Initializing logging and the runtime
// - Wiring the settings store and the Emma client factory
// - Dispatching one subcommand
//
// All feed logic lives in emma-core; this binary only moves files and
// settings in and out.
//
// ## Configuration
//
// - `EMMA_ACCOUNT_ID`, `EMMA_PUBLIC_API_KEY`, `EMMA_PRIVATE_API_KEY`:
//   override the stored credentials for this run (all three or none)
// - `EMMA_API_BASE_URL`: API endpoint (default https://api.e2ma.net)
// - `EMMA_HTTP_TIMEOUT_SECS`: request timeout (default 30)
// - `EMMA_STORE_PATH`: settings file (default ./emma-settings.json)
// - `EMMA_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// emma-feed configure --account-id 1234 --public-key pub --private-key priv
// emma-feed check
// emma-feed save-feed --form-id 2 --settings feed.json
// emma-feed process --feed 1 --entry entry.json --form form.json
// ```

mod args;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use emma_core::config::{DEFAULT_API_BASE_URL, DEFAULT_TIMEOUT_SECS};
use emma_core::{ClientConfig, PluginSettings};
use std::env;
use std::process::ExitCode;
use tracing::{Level, error};
use tracing_subscriber::FmtSubscriber;

use crate::args::Cli;

/// Default settings file
const DEFAULT_STORE_PATH: &str = "emma-settings.json";

/// Exit codes for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedExitCode {
    /// Command completed
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Command failed or the feed outcome was not a success
    RuntimeError = 2,
}

impl From<FeedExitCode> for ExitCode {
    fn from(code: FeedExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Environment configuration
struct Config {
    account_id: Option<String>,
    public_api_key: Option<String>,
    private_api_key: Option<String>,
    base_url: String,
    timeout_secs: u64,
    store_path: String,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let timeout_secs = match lookup("EMMA_HTTP_TIMEOUT_SECS") {
            Some(value) => value.trim().parse().with_context(|| {
                format!("EMMA_HTTP_TIMEOUT_SECS must be a number of seconds. Got: {}", value)
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            account_id: lookup("EMMA_ACCOUNT_ID"),
            public_api_key: lookup("EMMA_PUBLIC_API_KEY"),
            private_api_key: lookup("EMMA_PRIVATE_API_KEY"),
            base_url: lookup("EMMA_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            timeout_secs,
            store_path: lookup("EMMA_STORE_PATH")
                .unwrap_or_else(|| DEFAULT_STORE_PATH.to_string()),
            log_level: lookup("EMMA_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        let present = [&self.account_id, &self.public_api_key, &self.private_api_key]
            .iter()
            .filter(|v| v.as_ref().is_some_and(|s| !s.trim().is_empty()))
            .count();
        if present != 0 && present != 3 {
            anyhow::bail!(
                "EMMA_ACCOUNT_ID, EMMA_PUBLIC_API_KEY and EMMA_PRIVATE_API_KEY must be set together. \
                Unset all three to use the stored credentials."
            );
        }

        if let Some(ref account_id) = self.account_id
            && !account_id.trim().is_empty()
            && !account_id.trim().chars().all(|c| c.is_ascii_digit())
        {
            anyhow::bail!("EMMA_ACCOUNT_ID must be numeric. Got: {}", account_id);
        }

        self.client_config()
            .validate()
            .map_err(|e| anyhow::anyhow!("EMMA_API_BASE_URL / EMMA_HTTP_TIMEOUT_SECS: {}", e))?;

        if !(1..=300).contains(&self.timeout_secs) {
            anyhow::bail!(
                "EMMA_HTTP_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                self.timeout_secs
            );
        }

        if self.base_url.starts_with("http://") {
            eprintln!(
                "WARNING: EMMA_API_BASE_URL uses HTTP (not HTTPS). \
                API keys will be sent in clear text."
            );
        }

        if self.store_path.trim().is_empty() {
            anyhow::bail!("EMMA_STORE_PATH cannot be empty");
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "EMMA_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Credentials from the environment, when all three are set
    fn credential_override(&self) -> Option<PluginSettings> {
        match (&self.account_id, &self.public_api_key, &self.private_api_key) {
            (Some(account_id), Some(public_key), Some(private_key)) => {
                let settings = PluginSettings::new(account_id, public_key, private_key);
                settings.is_configured().then_some(settings)
            }
            _ => None,
        }
    }

    fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_base_url(self.base_url.trim())
            .with_timeout_secs(self.timeout_secs)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return FeedExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return FeedExitCode::ConfigError.into();
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr, command output to stdout
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return FeedExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return FeedExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match commands::run(cli.command, &config).await {
            Ok(code) => code,
            Err(e) => {
                error!("Command failed: {:#}", e);
                FeedExitCode::RuntimeError
            }
        }
    });

    code.into()
}
