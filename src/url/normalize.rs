use url::{ParseError, Url};

/// Parses a user-supplied URL, assuming `https://` when no scheme is given
///
/// # Examples
///
/// ```
/// use harrow::url::normalize_input_url;
///
/// let url = normalize_input_url("example.com/products").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/products");
///
/// let url = normalize_input_url("http://example.com").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/");
/// ```
pub fn normalize_input_url(input: &str) -> Result<Url, ParseError> {
    let input = input.trim();

    if input.starts_with("http://") || input.starts_with("https://") {
        Url::parse(input)
    } else {
        Url::parse(&format!("https://{}", input))
    }
}

/// Resolves a link href against a base URL
///
/// Returns None if the link should be excluded:
/// - empty hrefs
/// - fragment-only links (same page anchors)
/// - javascript:, mailto:, tel: and data: schemes
/// - hrefs that fail to resolve
/// - non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
        Some(absolute_url)
    } else {
        None
    }
}
