//! Per-page parsing: links, JSON index and listing cards
//!
//! Everything here is synchronous. The parsed document is dropped before the
//! controller awaits anything else.

use crate::extract::{
    app_data_text, discover_links, ListingExtractor, ListingIndex, ListingRecord, PageContext,
    SkipReason,
};
use crate::url::ScopePattern;
use chrono::{DateTime, Utc};
use scraper::Html;
use url::Url;

/// Everything the controller needs from one result page
#[derive(Debug)]
pub struct ParsedPage {
    /// In-scope absolute links, deduplicated, in document order
    pub links: Vec<Url>,

    /// One outcome per listing card, in document order
    pub outcomes: Vec<Result<ListingRecord, SkipReason>>,

    /// Number of entries in the page's JSON listing index
    pub index_len: usize,
}

/// Parses a fetched result page
///
/// Links are discovered first, then the JSON index is built once and every
/// card is extracted against it.
pub fn parse_page(
    body: &str,
    page_url: &Url,
    scope: &ScopePattern,
    extractor: &ListingExtractor,
    crawl_timestamp: DateTime<Utc>,
) -> ParsedPage {
    let document = Html::parse_document(body);

    let links = discover_links(&document, page_url, scope);

    let index = ListingIndex::build(app_data_text(&document).as_deref(), page_url);

    let context = PageContext {
        page_url,
        crawl_timestamp,
    };
    let outcomes = extractor
        .fragments(&document)
        .map(|fragment| extractor.extract(fragment, &context, &index))
        .collect();

    ParsedPage {
        links,
        outcomes,
        index_len: index.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn scope() -> ScopePattern {
        ScopePattern::new(r"^https://site\.test/for_rent/.+/\d+_p/").unwrap()
    }

    fn page_url() -> Url {
        Url::parse("https://site.test/for_rent/CT/1_p/").unwrap()
    }

    const PAGE: &str = r#"<html><head>
        <script id="__NEXT_DATA__" type="application/json">{"props":{"searchData":{"homes":[
            {"url":"/p/ct/1","media":{"heroImage":{"url":{"small":"https://img.test/1.jpg"}}}},
            {"url":"/p/ct/2"}
        ]}}}</script>
        </head><body>
        <ul>
          <li><div data-testid="home-card-rent">
            <a href="/p/ct/1">One</a>
            <script type="application/ld+json" data-testid="srp-seo-breadcrumbs-list">
              {"address":{"streetAddress":"1 Main St","addressLocality":"Hartford","addressRegion":"CT","postalCode":"06101"},
               "geo":{"latitude":41.76,"longitude":-72.68}}
            </script>
            <div data-testid="property-price">$2,100</div>
          </div></li>
          <li><div data-testid="home-card-rent">
            <a href="/p/ct/2">Two</a>
            <script type="application/ld+json" data-testid="srp-seo-breadcrumbs-list">
              {"address":{"streetAddress":"2 Elm St","addressLocality":"Hartford","addressRegion":"CT","postalCode":"06101"},
               "geo":null}
            </script>
          </div></li>
          <li>Advertisement</li>
        </ul>
        <nav>
          <a href="/for_rent/CT/2_p/">2</a>
          <a href="/for_rent/CT/3_p/">3</a>
          <a href="/for_rent/CT/2_p/">next</a>
          <a href="/about">About</a>
        </nav>
        </body></html>"#;

    #[test]
    fn test_parse_page() {
        let extractor = ListingExtractor::new("/p/").unwrap();
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let parsed = parse_page(PAGE, &page_url(), &scope(), &extractor, ts);

        assert_eq!(parsed.index_len, 2);
        assert_eq!(
            parsed.links,
            vec![
                Url::parse("https://site.test/for_rent/CT/2_p/").unwrap(),
                Url::parse("https://site.test/for_rent/CT/3_p/").unwrap(),
            ]
        );

        assert_eq!(parsed.outcomes.len(), 2);
        let first = parsed.outcomes[0].as_ref().unwrap();
        assert_eq!(first.url, "https://site.test/p/ct/1");
        assert_eq!(first.thumbnail_url.as_deref(), Some("https://img.test/1.jpg"));
        assert_eq!(first.price, Some(2100));
        assert_eq!(first.referrer_url, page_url().as_str());
        assert_eq!(first.crawl_timestamp, ts);

        assert_eq!(parsed.outcomes[1], Err(SkipReason::MissingAddressOrGeo));
    }

    #[test]
    fn test_page_without_cards_or_json() {
        let extractor = ListingExtractor::new("/p/").unwrap();
        let parsed = parse_page(
            "<html><body><p>No results</p></body></html>",
            &page_url(),
            &scope(),
            &extractor,
            Utc::now(),
        );
        assert!(parsed.links.is_empty());
        assert!(parsed.outcomes.is_empty());
        assert_eq!(parsed.index_len, 0);
    }
}
