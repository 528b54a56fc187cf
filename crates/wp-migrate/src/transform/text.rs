//! Free-text normalization shared by the transformers.

/// Decodes HTML entities and trims surrounding whitespace.
#[must_use]
pub fn clean_text(raw: &str) -> String {
    html_escape::decode_html_entities(raw).trim().to_string()
}

/// Like [`clean_text`], but `None` for absent or blank input.
#[must_use]
pub fn clean_optional(raw: Option<&str>) -> Option<String> {
    raw.map(clean_text).filter(|s| !s.is_empty())
}

/// Passes through a non-empty string unchanged.
#[must_use]
pub fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.filter(|s| !s.is_empty()).map(str::to_string)
}
