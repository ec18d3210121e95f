//! Form text helpers

/// Normalize a submitted form value
///
/// Surrounding whitespace is removed and an empty value becomes `None`.
pub fn clean_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parse the `page` query parameter
///
/// A missing or non-numeric value means the first page. Values below one
/// are passed through so the caller can reject them.
pub fn parse_page(value: Option<&str>) -> i64 {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(1)
}

/// Check that a value is an absolute http(s) URL
pub fn is_http_url(value: &str) -> bool {
    match url::Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}

/// Count characters the way PostgreSQL `char_length` does
pub fn char_length(value: &str) -> usize {
    value.chars().count()
}
