//! Utility functions for common operations.

use crate::error::ScraperError;
use regex::Regex;
use std::sync::LazyLock;

/// Anything that is not a letter, digit, whitespace, hyphen or underscore.
static SLUG_STRIP_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s_-]").expect("Invalid SLUG_STRIP_REGEX"));

/// Runs of separators that collapse into a single hyphen.
static SEPARATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s_-]+").expect("Invalid SEPARATOR_REGEX"));

/// Converts a human-readable title into a URL-safe slug.
///
/// Lowercases the text, drops punctuation, collapses whitespace, hyphen and
/// underscore runs into one hyphen and trims hyphens from both ends.
///
/// ```
/// use goodreader::utils::title_to_slug;
///
/// assert_eq!(title_to_slug("Science  Fiction!"), "science-fiction");
/// ```
pub fn title_to_slug(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let stripped = SLUG_STRIP_REGEX.replace_all(&lowered, "");
    let joined = SEPARATOR_REGEX.replace_all(&stripped, "-");
    joined.trim_matches('-').to_string()
}

/// Converts a slug back into a title-cased, space separated string.
///
/// ```
/// use goodreader::utils::slug_to_title;
///
/// assert_eq!(slug_to_title("science-fiction"), "Science Fiction");
/// ```
pub fn slug_to_title(slug: &str) -> String {
    SEPARATOR_REGEX
        .split(slug.trim())
        .filter(|token| !token.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Resolves a possibly relative link against a base URL.
pub fn resolve_url(base: &str, relative: &str) -> String {
    if relative.is_empty() {
        return String::new();
    }

    if relative.starts_with("http://") || relative.starts_with("https://") {
        return relative.to_string();
    }

    if let Ok(base_url) = url::Url::parse(base)
        && let Ok(resolved) = base_url.join(relative)
    {
        return resolved.to_string();
    }

    let base = base.trim_end_matches('/');
    format!("{}/{}", base, relative.trim_start_matches('/'))
}

/// Validates a URL before any request is made.
///
/// Empty URLs and schemes other than `http`/`https` are rejected.
pub fn validate_url(raw: &str) -> Result<url::Url, ScraperError> {
    if raw.trim().is_empty() {
        return Err(ScraperError::EmptyUrl);
    }

    let parsed = url::Url::parse(raw).map_err(|e| ScraperError::InvalidUrl(format!("{raw}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ScraperError::UnsupportedScheme(other.to_string())),
    }
}

/// Checks if an HTTP response is successful, and if not, returns a detailed error.
pub fn check_response_status(response: reqwest::Response) -> Result<reqwest::Response, ScraperError> {
    if !response.status().is_success() {
        return Err(ScraperError::HttpStatus {
            status: response.status().as_u16(),
            url: response.url().to_string(),
        });
    }
    Ok(response)
}
