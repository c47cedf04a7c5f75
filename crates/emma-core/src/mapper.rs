//! Feed + entry → member payload
//!
//! Pure functions: no remote calls, no side effects.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{Entry, FeedMeta, Form, Member};

/// Entry metadata keys that can be referenced like fields
const ENTRY_META_KEYS: &[&str] = &["id", "form_id", "date_created", "ip", "source_url", "user_agent"];

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("email pattern is valid")
});

/// Basic email syntax check
pub fn is_valid_email(email: &str) -> bool {
    !email.is_empty() && email.len() <= 254 && EMAIL_RE.is_match(email)
}

/// Resolve a field reference against an entry
///
/// Lookup order:
/// 1. the exact entry key (`"3"`, `"1.3"`, `"field_3"`)
/// 2. a multi-input form field with that id: its non-empty input values
///    joined by a space (`", "` for checkbox fields)
/// 3. `form_title`
///
/// Anything else resolves to the empty string.
pub fn resolve_field_value(form: &Form, entry: &Entry, reference: &str) -> String {
    let reference = reference.trim();
    if reference.is_empty() {
        return String::new();
    }

    if let Some(value) = entry.text(reference) {
        return value;
    }

    if let Some(field) = form.field(reference)
        && !field.inputs.is_empty()
    {
        let separator = if field.field_type == "checkbox" { ", " } else { " " };
        return field
            .inputs
            .iter()
            .filter_map(|input| entry.text(&input.id))
            .filter(|v| !v.trim().is_empty())
            .collect::<Vec<_>>()
            .join(separator);
    }

    if reference == "form_title" {
        return form.title.clone();
    }

    if !ENTRY_META_KEYS.contains(&reference) {
        debug!("Field reference {} not found in entry", reference);
    }
    String::new()
}

/// Build the member payload for a submission
///
/// # Errors
///
/// [`Error::InvalidEmail`] when the configured email field resolves to an
/// empty or malformed address.
pub fn build_member(meta: &FeedMeta, entry: &Entry, form: &Form) -> Result<Member> {
    let email = resolve_field_value(form, entry, &meta.email_address)
        .trim()
        .to_string();

    if !is_valid_email(&email) {
        return Err(Error::invalid_email(email));
    }

    let mut member = Member::new(email);

    if let Some(group) = meta.target_group() {
        member.group_ids = Some(vec![group.to_string()]);
    }

    let mut fields = BTreeMap::new();
    for mapping in &meta.custom_fields {
        if !mapping.is_resolved() {
            debug!("Skipping unresolved custom field mapping for {}", mapping.value);
            continue;
        }
        let value = resolve_field_value(form, entry, &mapping.value);
        fields.insert(mapping.key.trim().to_string(), value);
    }

    if !fields.is_empty() {
        member.fields = Some(fields);
    }

    Ok(member)
}
