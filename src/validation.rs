use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CrmError, CrmResult};

static SEARCH_UNSAFE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s\-\.']").expect("valid search sanitizer regex"));

/// Validates that a string is not blank (empty or whitespace-only).
/// Returns the trimmed string on success.
pub fn non_blank(value: &str, field: &str) -> CrmResult<String> {
    let trimmed = value.trim().to_string();
    if trimmed.is_empty() {
        Err(CrmError::BlankField {
            field: field.to_string(),
        })
    } else {
        Ok(trimmed)
    }
}

/// Trims an optional string, returning None if blank.
pub fn trim_optional(value: Option<&str>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Strips everything but word characters, whitespace, hyphens, periods and
/// apostrophes from a search query, then trims it.
pub fn sanitize_search_query(query: &str) -> String {
    SEARCH_UNSAFE_RE.replace_all(query, "").trim().to_string()
}

/// Sanitized query split into the words to match.
pub fn search_words(query: &str) -> Vec<String> {
    sanitize_search_query(query)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
