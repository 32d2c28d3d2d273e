//! In-scope link discovery
//!
//! Pure and page-local: the page's hyperlinks are resolved, filtered through
//! the scope rule, and deduplicated within the page. Deciding what has
//! already been visited or queued is the controller's job.

use crate::url::{resolve_href, ScopePattern};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts every in-scope link on a page
///
/// # Link Extraction Rules
///
/// **Include:** `<a href="...">` whose absolute form matches `scope`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:`, data URIs and fragment-only hrefs
/// - links that resolve outside HTTP(S)
///
/// Relative hrefs are resolved against `page_url`. The result keeps document
/// order and lists each URL once.
///
/// # Example
///
/// ```
/// use listing_harvest::extract::discover_links;
/// use listing_harvest::url::ScopePattern;
/// use scraper::Html;
/// use url::Url;
///
/// let html = Html::parse_document(r#"<a href="2_p/">Next</a><a href="/about">About</a>"#);
/// let page = Url::parse("https://site.test/search/").unwrap();
/// let scope = ScopePattern::new(r"^https://site\.test/search/\d+_p/").unwrap();
///
/// let links = discover_links(&html, &page, &scope);
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].as_str(), "https://site.test/search/2_p/");
/// ```
pub fn discover_links(document: &Html, page_url: &Url, scope: &ScopePattern) -> Vec<Url> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        // Skip if it has the download attribute
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let Some(absolute) = resolve_href(href, page_url) else {
            continue;
        };

        if scope.matches(&absolute) && seen.insert(absolute.as_str().to_string()) {
            links.push(absolute);
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://site.test/search/1_p/").unwrap()
    }

    fn scope() -> ScopePattern {
        ScopePattern::new(r"^https://site\.test/search/\d+_p/").unwrap()
    }

    fn discover(html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        discover_links(&document, &page_url(), &scope())
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_absolute_in_scope() {
        let links = discover(r#"<a href="https://site.test/search/2_p/">2</a>"#);
        assert_eq!(links, vec!["https://site.test/search/2_p/"]);
    }

    #[test]
    fn test_relative_resolved_against_page() {
        let links = discover(r#"<a href="/search/3_p/">3</a><a href="../4_p/">4</a>"#);
        assert_eq!(
            links,
            vec![
                "https://site.test/search/3_p/",
                "https://site.test/search/4_p/"
            ]
        );
    }

    #[test]
    fn test_out_of_scope_dropped() {
        let links = discover(
            r#"
            <a href="/p/ct/hartford/999">Listing</a>
            <a href="https://other.test/search/2_p/">Other host</a>
            <a href="/search/">No page number</a>
            "#,
        );
        assert!(links.is_empty());
    }

    #[test]
    fn test_special_links_dropped() {
        let links = discover(
            r##"
            <a href="javascript:void(0)">js</a>
            <a href="mailto:x@site.test">mail</a>
            <a href="#top">top</a>
            <a href="/search/5_p/" download>download</a>
            "##,
        );
        assert!(links.is_empty());
    }

    #[test]
    fn test_deduplicated_in_document_order() {
        let links = discover(
            r#"
            <a href="/search/3_p/">3</a>
            <a href="/search/2_p/">2</a>
            <a href="https://site.test/search/3_p/">3 again</a>
            "#,
        );
        assert_eq!(
            links,
            vec![
                "https://site.test/search/3_p/",
                "https://site.test/search/2_p/"
            ]
        );
    }

    #[test]
    fn test_self_link_is_returned() {
        // Page-local: the controller filters pages it has already visited.
        let links = discover(r#"<a href="/search/1_p/">1</a>"#);
        assert_eq!(links, vec!["https://site.test/search/1_p/"]);
    }
}
