//! Core traits for the Emma add-on
//!
//! This module defines the abstract interfaces at the add-on's seams.
//!
//! - [`EmmaApi`]: Remote member/group/field operations
//! - [`EmmaApiFactory`]: Build an [`EmmaApi`] client from plugin credentials
//! - [`SettingsStore`]: Host persistence for plugin settings and feeds

pub mod emma_api;
pub mod settings_store;

pub use emma_api::{EmmaApi, EmmaApiFactory};
pub use settings_store::SettingsStore;
