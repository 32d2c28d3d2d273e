use url::Url;

/// Returns the lowercase `host[:port]` authority of a URL
///
/// This is the key robots.txt rules are cached under: one robots.txt per
/// origin, and test servers on different ports must not share rules.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use listing_harvest::url::extract_authority;
///
/// let url = Url::parse("https://WWW.Site.test/p/1").unwrap();
/// assert_eq!(extract_authority(&url), Some("www.site.test".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/p/1").unwrap();
/// assert_eq!(extract_authority(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_authority(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}
