//! Feed processor
//!
//! The FeedProcessor is responsible for:
//! - Refusing to run without valid credentials
//! - Building the member payload from the feed and the entry
//! - Choosing the add or signup operation
//! - Classifying the outcome
//!
//! ## Event Flow
//!
//! ```text
//! submission ──▶ ApiSession valid? ──no──▶ Skipped
//!                     │ yes
//!                     ▼
//!               build_member ──InvalidEmail──▶ Skipped
//!                     │
//!                     ▼
//!      double_optin ? signup_member : add_or_update_member
//!                     │
//!        ┌────────────┼──────────────┐
//!        ▼            ▼              ▼
//!     Added        Updated         Failed
//! ```
//!
//! Nothing is raised to the caller: a submission pipeline must never fail
//! because of this add-on. There are no retries.

use tracing::{debug, error, info};

use crate::credentials::{ApiSession, CredentialStatus};
use crate::error::Error;
use crate::mapper;
use crate::model::{Entry, Feed, Form};

/// Why a submission was not sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Credentials are unconfigured or invalid
    Credentials(CredentialStatus),
    /// The email field resolved to an empty or malformed address
    InvalidEmail(String),
}

/// Outcome of processing one feed for one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Member was newly added
    Added {
        /// Member email
        email: String,
    },

    /// Member already existed and was updated
    Updated {
        /// Member email
        email: String,
    },

    /// Nothing was sent
    Skipped(SkipReason),

    /// The remote call failed
    Failed {
        /// Member email
        email: String,
        /// Error message
        error: String,
    },
}

impl ProcessOutcome {
    /// Added or updated
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessOutcome::Added { .. } | ProcessOutcome::Updated { .. })
    }
}

/// Orchestrates one submission
#[derive(Debug, Default)]
pub struct FeedProcessor;

impl FeedProcessor {
    /// Create a processor
    pub fn new() -> Self {
        Self
    }

    /// Process `feed` for `entry`
    ///
    /// Makes at most one remote call.
    pub async fn process(
        &self,
        session: &ApiSession,
        feed: &Feed,
        entry: &Entry,
        form: &Form,
    ) -> ProcessOutcome {
        debug!("Processing feed {} for form {}", feed.id, feed.form_id);

        let Some(client) = session.client() else {
            error!("Failed to set up the API (credentials {:?})", session.status());
            return ProcessOutcome::Skipped(SkipReason::Credentials(session.status()));
        };

        let member = match mapper::build_member(&feed.meta, entry, form) {
            Ok(member) => member,
            Err(e) => {
                error!("Aborting. Email address invalid; {}", e);
                let email = match e {
                    Error::InvalidEmail(email) => email,
                    _ => String::new(),
                };
                return ProcessOutcome::Skipped(SkipReason::InvalidEmail(email));
            }
        };

        debug!("Member to be added => {:?}", member);

        let result = if feed.meta.double_optin {
            client.signup_member(&member).await
        } else {
            client.add_or_update_member(&member).await
        };

        match result {
            Ok(response) if response.status => {
                info!("Member {} added", member.email);
                ProcessOutcome::Added { email: member.email }
            }
            Ok(_) => {
                info!("Member {} already existed and has been updated", member.email);
                ProcessOutcome::Updated { email: member.email }
            }
            Err(e) => {
                error!("Unable to add member {}; {}", member.email, e);
                ProcessOutcome::Failed {
                    email: member.email,
                    error: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FeedMeta;

    #[test]
    fn test_outcome_success() {
        assert!(ProcessOutcome::Added { email: "a@b.com".into() }.is_success());
        assert!(ProcessOutcome::Updated { email: "a@b.com".into() }.is_success());
        assert!(!ProcessOutcome::Skipped(SkipReason::InvalidEmail(String::new())).is_success());
    }

    #[tokio::test]
    async fn test_invalid_session_skips() {
        let feed = Feed::new(1, 2, FeedMeta::new("Feed", "3"));
        let entry = Entry::new().with_value("3", "a@b.com");

        let outcome = FeedProcessor::new()
            .process(&ApiSession::Unconfigured, &feed, &entry, &Form::default())
            .await;

        assert_eq!(
            outcome,
            ProcessOutcome::Skipped(SkipReason::Credentials(CredentialStatus::Unconfigured))
        );
    }
}
