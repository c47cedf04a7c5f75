//! Architectural Contract Test: Credential Validation
//!
//! Constraints verified:
//! - Blank credentials never reach the network
//! - One test call decides Valid / Invalid
//! - 401 is Invalid, 403 is Valid (the keys authenticate)
//! - Any other fault is Invalid with an unclassified reason
//!
//! If this test fails, feeds may be processed with unusable credentials.

mod common;

use common::*;
use emma_core::{CredentialStatus, InvalidReason, PluginSettings};

#[tokio::test]
async fn blank_credentials_are_unconfigured_without_remote_calls() {
    let (validator, api, factory) = validator_for(RecordingEmmaApi::new());

    for settings in [
        PluginSettings::default(),
        PluginSettings::new("1234", "public-key", ""),
        PluginSettings::new("   ", "public-key", "private-key"),
    ] {
        let session = validator.validate(&settings).await;
        assert_eq!(session.status(), CredentialStatus::Unconfigured);
        assert!(session.client().is_none());
    }

    assert_eq!(factory.create_count(), 0, "no client for blank credentials");
    assert_eq!(api.call_count(), 0, "no remote call for blank credentials");
}

#[tokio::test]
async fn successful_test_call_is_valid() {
    let (validator, api, _factory) = validator_for(RecordingEmmaApi::new().with_group("3", "Newsletter"));

    let session = validator.validate(&configured_settings()).await;

    assert_eq!(session.status(), CredentialStatus::Valid);
    assert!(session.client().is_some());
    assert_eq!(api.calls(), vec![ApiCall::ListGroups(None)]);
}

#[tokio::test]
async fn unauthorized_is_invalid() {
    let (validator, api, _factory) =
        validator_for(RecordingEmmaApi::new().failing_list_groups(Fault::Status(401)));

    let session = validator.validate(&configured_settings()).await;

    assert_eq!(session.status(), CredentialStatus::Invalid);
    assert!(matches!(session.invalid_reason(), Some(InvalidReason::Rejected(_))));
    assert!(session.client().is_none());
    assert_eq!(api.call_count(), 1);
}

#[tokio::test]
async fn forbidden_is_still_valid() {
    let (validator, _api, _factory) =
        validator_for(RecordingEmmaApi::new().failing_list_groups(Fault::Status(403)));

    let session = validator.validate(&configured_settings()).await;

    assert_eq!(session.status(), CredentialStatus::Valid);
    assert!(matches!(
        session,
        emma_core::ApiSession::Valid {
            account_verified: false,
            ..
        }
    ));
}

#[tokio::test]
async fn other_faults_are_invalid_with_unclassified_reason() {
    let (validator, _api, _factory) =
        validator_for(RecordingEmmaApi::new().failing_list_groups(Fault::Status(500)));
    let session = validator.validate(&configured_settings()).await;
    assert_eq!(session.status(), CredentialStatus::Invalid);
    assert!(matches!(
        session.invalid_reason(),
        Some(InvalidReason::Unclassified {
            status: Some(500),
            ..
        })
    ));

    let (validator, _api, _factory) =
        validator_for(RecordingEmmaApi::new().failing_list_groups(Fault::Transport));
    let session = validator.validate(&configured_settings()).await;
    assert_eq!(session.status(), CredentialStatus::Invalid);
    assert!(matches!(
        session.invalid_reason(),
        Some(InvalidReason::Unclassified { status: None, .. })
    ));
}

#[tokio::test]
async fn each_validation_makes_exactly_one_test_call() {
    let (validator, api, factory) = validator_for(RecordingEmmaApi::new());

    validator.validate(&configured_settings()).await;
    validator.validate(&configured_settings()).await;

    assert_eq!(factory.create_count(), 2);
    assert_eq!(api.call_count(), 2);
}

#[tokio::test]
async fn account_check_is_tri_state() {
    let (validator, _api, _factory) = validator_for(RecordingEmmaApi::new());
    assert_eq!(validator.check_account(&PluginSettings::default()).await, None);
    assert_eq!(validator.check_account(&configured_settings()).await, Some(true));

    let (validator, _api, _factory) =
        validator_for(RecordingEmmaApi::new().failing_list_groups(Fault::Status(403)));
    assert_eq!(validator.check_account(&configured_settings()).await, Some(false));

    let (validator, _api, _factory) =
        validator_for(RecordingEmmaApi::new().failing_list_groups(Fault::Transport));
    assert_eq!(validator.check_account(&configured_settings()).await, Some(false));
}
