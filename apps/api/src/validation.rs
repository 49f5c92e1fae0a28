//! Small input checks shared by the JSON handlers.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::AppError;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Trimmed value, or `None` when absent or blank.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trimmed value, or a 400 carrying `message`.
pub fn require(value: Option<String>, message: &str) -> Result<String, AppError> {
    non_blank(value).ok_or_else(|| AppError::Validation(message.to_string()))
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}

/// At least `min` characters once trimmed (counted as chars, not bytes).
pub fn has_min_chars(value: &str, min: usize) -> bool {
    value.trim().chars().count() >= min
}
