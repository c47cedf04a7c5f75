// # emma-core
//
// Core library for the Emma form-feed add-on.
//
// When a form is submitted, the add-on maps the submitted values onto an
// Emma member record and group, then creates or updates that member via
// the Emma API. When feed settings are saved, it provisions any new
// custom fields the admin asked for before the settings are persisted.
//
// ## Architecture Overview
//
// - **EmmaApi**: Trait for the remote member/group/field operations
// - **EmmaApiFactory**: Builds a client from the plugin credentials
// - **CredentialValidator / ApiSession**: One credential check per request
// - **mapper**: Feed + entry → outbound `Member` payload
// - **CustomFieldProvisioner**: Creates remote fields requested on settings save
// - **FeedProcessor**: Orchestrates a submission end to end
// - **SettingsStore**: Host persistence boundary (memory and file stores)
// - **admin / settings**: Choice lists, feed validation, save orchestration
//
// ## Design Principles
//
// 1. **Never fail the host**: boundary operations log and return outcomes
// 2. **Explicit context**: the validated client is passed, never memoized globally
// 3. **At most once**: no retries against the remote service
// 4. **Library-First**: the CLI is a thin shell over this crate

pub mod admin;
pub mod config;
pub mod credentials;
pub mod error;
pub mod mapper;
pub mod model;
pub mod processor;
pub mod provisioner;
pub mod settings;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::{ClientConfig, PluginSettings};
pub use credentials::{ApiSession, CredentialStatus, CredentialValidator, InvalidReason};
pub use error::{Error, Result};
pub use model::{Entry, Feed, FeedMeta, Form, Member};
pub use processor::{FeedProcessor, ProcessOutcome};
pub use provisioner::{CustomFieldProvisioner, NewCustomField, ProvisionReport};
pub use settings::{FeedSettingsSaver, SaveReport};
pub use state::{FileSettingsStore, MemorySettingsStore};
pub use traits::{EmmaApi, EmmaApiFactory, SettingsStore};
