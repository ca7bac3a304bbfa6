#![forbid(unsafe_code)]

//! Contact form rules.
//!
//! Validation is pure: the controller reads the three raw field values, runs
//! [`validate`] and then writes whatever it reports into the page. No rule
//! short-circuits another.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// `local@domain.tld`: no whitespace or `@` in any part, at least one dot after `@`.
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// The three validated fields, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Name,
    Email,
    Message,
}

impl ContactField {
    pub const ALL: [Self; 3] = [Self::Name, Self::Email, Self::Message];
}

/// Raw field values as read at submit time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactSubmission {
    #[must_use]
    pub fn new(name: &str, email: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        }
    }
}

/// Whether `email` looks like `local@domain.tld`.
///
/// The value is matched as typed; surrounding whitespace makes it invalid.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Fields that fail their rule, in [`ContactField::ALL`] order.
#[must_use]
pub fn validate(submission: &ContactSubmission, min_message_chars: usize) -> Vec<ContactField> {
    let mut failed = Vec::new();
    if submission.name.trim().is_empty() {
        failed.push(ContactField::Name);
    }
    if !is_valid_email(&submission.email) {
        failed.push(ContactField::Email);
    }
    let message = submission.message.trim();
    if message.is_empty() || message.chars().count() < min_message_chars {
        failed.push(ContactField::Message);
    }
    failed
}
