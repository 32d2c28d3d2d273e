use url::Url;

/// Path prefix under which individual listing pages live
pub const DEFAULT_LISTING_PREFIX: &str = "/p/";

/// Reduces a resolved link to the canonical form of a listing URL
///
/// A link looks like a real listing when it is HTTP(S), has a host, and its
/// path continues past `listing_prefix`. The canonical form drops the query
/// string and fragment, so card links that carry tracking parameters still
/// join with the page's JSON state.
///
/// # Examples
///
/// ```
/// use listing_harvest::url::canonical_listing_url;
/// use url::Url;
///
/// let link = Url::parse("https://site.test/p/ct/hartford/999?src=card#photos").unwrap();
/// let canonical = canonical_listing_url(&link, "/p/").unwrap();
/// assert_eq!(canonical.as_str(), "https://site.test/p/ct/hartford/999");
///
/// let search = Url::parse("https://site.test/for_rent/CT/").unwrap();
/// assert!(canonical_listing_url(&search, "/p/").is_none());
/// ```
pub fn canonical_listing_url(url: &Url, listing_prefix: &str) -> Option<Url> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.host_str()?;

    let rest = url.path().strip_prefix(listing_prefix)?;
    if rest.trim_matches('/').is_empty() {
        return None;
    }

    let mut canonical = url.clone();
    canonical.set_query(None);
    canonical.set_fragment(None);
    Some(canonical)
}
