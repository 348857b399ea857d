//! Input validation helpers shared by the domain services.

use std::sync::LazyLock;

use regex::Regex;
use tracing::error;

static EMAIL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .inspect_err(|source| error!("invalid email pattern: {source}"))
        .ok()
});

/// Loose email shape check: something, `@`, something, `.`, something.
/// Rejects everything if the pattern failed to compile.
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    EMAIL.as_ref().is_some_and(|pattern| pattern.is_match(value))
}

/// Trimmed copy of `value`, or a validation message naming `field`.
pub(crate) fn required(field: &str, value: &str) -> Result<String, String> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        Err(format!("{field} is required"))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Trimmed copy of an email address, or a validation message naming `field`.
pub(crate) fn email(field: &str, value: &str) -> Result<String, String> {
    let trimmed = required(field, value)?;

    if is_valid_email(&trimmed) {
        Ok(trimmed)
    } else {
        Err(format!("{field} is not a valid email address: {trimmed}"))
    }
}
