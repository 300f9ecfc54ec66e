use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// One directory listing as stored in the `schools` table.
///
/// `id` and `created_at` are assigned by the backend on insert and never
/// change afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub contact: String,
    pub email_id: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert payload: a `School` without the backend-assigned columns.
/// `image` is serialized as `null` when no upload succeeded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolDraft {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub contact: String,
    pub email_id: String,
    pub image: Option<String>,
}

impl SchoolDraft {
    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }

    /// Check the form rules for a new listing, stopping at the first failure.
    ///
    /// The store does not call this; it trusts its caller.
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_min_len("name", &self.name, 2)?;
        validate_contact(&self.contact)?;
        validate_min_len("address", &self.address, 10)?;
        validate_min_len("city", &self.city, 2)?;
        validate_min_len("state", &self.state, 2)?;
        validate_email(&self.email_id)?;
        Ok(())
    }

    /// Like [`validate`](Self::validate) but reports every failing field.
    pub fn validation_errors(&self) -> Vec<ModelError> {
        [
            validate_min_len("name", &self.name, 2),
            validate_contact(&self.contact),
            validate_min_len("address", &self.address, 10),
            validate_min_len("city", &self.city, 2),
            validate_min_len("state", &self.state, 2),
            validate_email(&self.email_id),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect()
    }
}

pub fn validate_min_len(field: &'static str, value: &str, min: usize) -> Result<(), ModelError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ModelError::validation(field, "is required"));
    }
    if trimmed.chars().count() < min {
        return Err(ModelError::validation(field, format!("must be at least {min} characters")));
    }
    Ok(())
}

/// Exactly ten ASCII digits.
pub fn validate_contact(contact: &str) -> Result<(), ModelError> {
    if contact.is_empty() {
        return Err(ModelError::validation("contact", "is required"));
    }
    if contact.len() != 10 || !contact.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ModelError::validation("contact", "must be a valid 10-digit phone number"));
    }
    Ok(())
}

/// `local@domain.tld` with a letters-only top-level label of two or more.
pub fn validate_email(email: &str) -> Result<(), ModelError> {
    if email.is_empty() {
        return Err(ModelError::validation("email_id", "is required"));
    }
    let invalid = || ModelError::validation("email_id", "must be a valid email address");

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    let local_ok = !local.is_empty()
        && local.chars().all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c));
    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    let host_ok = !host.is_empty()
        && host.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    let tld_ok = tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic());

    if local_ok && host_ok && tld_ok {
        Ok(())
    } else {
        Err(invalid())
    }
}

impl School {
    /// Case-insensitive substring match over name, city and state.
    pub fn matches(&self, needle_lower: &str) -> bool {
        [&self.name, &self.city, &self.state]
            .iter()
            .any(|field| field.to_lowercase().contains(needle_lower))
    }
}

/// Filter a listing for the search box. A blank query keeps every school;
/// the input order is preserved.
pub fn filter_schools<'a>(schools: &'a [School], query: &str) -> Vec<&'a School> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return schools.iter().collect();
    }
    schools.iter().filter(|s| s.matches(&needle)).collect()
}
