use crate::{UrlError, UrlResult};
use url::Url;

/// Resolves a candidate URL against a base URL
///
/// Absolute candidates are returned as parsed; relative candidates are joined
/// against `base` following standard URL resolution.
///
/// # Examples
///
/// ```
/// use listing_harvest::url::resolve_url;
/// use url::Url;
///
/// let base = Url::parse("https://site.test/search").unwrap();
/// let url = resolve_url("/p/123", &base).unwrap();
/// assert_eq!(url.as_str(), "https://site.test/p/123");
/// ```
pub fn resolve_url(candidate: &str, base: &Url) -> UrlResult<Url> {
    let candidate = candidate.trim();
    match Url::parse(candidate) {
        Ok(absolute) => Ok(absolute),
        Err(url::ParseError::RelativeUrlWithoutBase) => base
            .join(candidate)
            .map_err(|e| UrlError::Parse(format!("{}: {}", candidate, e))),
        Err(e) => Err(UrlError::Parse(format!("{}: {}", candidate, e))),
    }
}

/// Resolves an `href` attribute to an absolute HTTP(S) URL
///
/// Returns None if the link should not be followed:
/// - empty or fragment-only hrefs
/// - javascript:, mailto:, tel: and data: links
/// - anything that does not resolve to http or https
pub fn resolve_href(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute = resolve_url(href, base).ok()?;
    match absolute.scheme() {
        "http" | "https" => Some(absolute),
        _ => None,
    }
}
