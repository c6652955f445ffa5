//! Input validation for API requests.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating email shape (local@domain.tld)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[^@\s]+@[^@\s]+\.[^@\s]+$"
    ).unwrap();
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long (max 254 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Pull a required field out of an optional request value, rejecting
/// absent or empty strings.
pub fn require_field(value: &Option<String>) -> Option<&str> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Some(v),
        _ => None,
    }
}
