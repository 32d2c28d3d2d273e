//! Integration tests for the crawler
//!
//! These tests use wiremock to serve paginated result pages and run the full
//! fetch, parse, extract and store cycle end-to-end.

use listing_harvest::config::{
    Config, CrawlerConfig, OutputConfig, ScopeConfig, SearchConfig, UserAgentConfig,
};
use listing_harvest::crawler::{crawl, Coordinator, HttpFetcher, StopReason};
use listing_harvest::storage::{JsonLinesSink, SinkSet, SqliteListingStore, Storage};
use listing_harvest::ListingRecord;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling the mock server's result pages
fn create_test_config(base_url: &str, db_path: &str) -> Config {
    Config {
        crawler: CrawlerConfig {
            minimum_delay_ms: 0, // no pacing in tests
            max_requests: None,
            max_duration_secs: None,
            request_timeout_secs: 5,
            obey_robots: true,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            database_path: db_path.to_string(),
            jsonl_path: None,
        },
        scope: ScopeConfig {
            pattern: format!(r"^{}/for_rent/.+/\d+_p/", regex::escape(base_url)),
            listing_prefix: "/p/".to_string(),
        },
        search: SearchConfig {
            seed_url: Some(format!("{}/for_rent/CT/1_p/", base_url)),
            ..Default::default()
        },
    }
}

/// Renders one listing card
fn card(id: u32, price: u32) -> String {
    format!(
        r#"<li><div data-testid="home-card-rent">
            <a href="/p/ct/{id}-main-st/{id}">{id} Main St</a>
            <script type="application/ld+json" data-testid="srp-seo-breadcrumbs-list">
              {{"address":{{"streetAddress":"{id} Main St","addressLocality":"Hartford","addressRegion":"CT","postalCode":"06103"}},
               "geo":{{"latitude":41.76,"longitude":-72.68}}}}
            </script>
            <div data-testid="property-price">${price}</div>
            <div data-testid="property-beds">3bd</div>
            <div data-testid="property-baths">2ba</div>
        </div></li>"#
    )
}

/// Renders a result page with embedded app data, cards and pagination links
fn results_page(cards: &[(u32, u32)], pages: &[u32]) -> String {
    let homes: Vec<String> = cards
        .iter()
        .map(|(id, _)| {
            format!(
                r#"{{"url":"/p/ct/{id}-main-st/{id}","media":{{"heroImage":{{"url":{{"small":"https://img.test/{id}-small.jpg"}}}}}}}}"#
            )
        })
        .collect();
    let items: String = cards.iter().map(|(id, price)| card(*id, *price)).collect();
    let nav: String = pages
        .iter()
        .map(|n| format!(r#"<a href="/for_rent/CT/{n}_p/">{n}</a>"#))
        .collect();

    format!(
        r#"<html><head>
        <script id="__NEXT_DATA__" type="application/json">{{"props":{{"searchData":{{"homes":[{}]}}}}}}</script>
        </head><body><ul>{}</ul><nav>{}</nav></body></html>"#,
        homes.join(","),
        items,
        nav
    )
}

async fn mount_page(server: &MockServer, page_path: &str, body: String, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_stores_each_listing_once() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("listings.db");

    mount_robots(&server, "User-agent: *\nAllow: /").await;
    // Page 1 links to 2 and 3; page 2 links to 3 and back to 1.
    mount_page(&server, "/for_rent/CT/1_p/", results_page(&[(1, 2100), (2, 2500)], &[2, 3]), 1).await;
    mount_page(&server, "/for_rent/CT/2_p/", results_page(&[(3, 3000), (1, 1999)], &[1, 3]), 1).await;
    mount_page(&server, "/for_rent/CT/3_p/", results_page(&[(4, 4200)], &[]), 1).await;

    let config = create_test_config(&base_url, db_path.to_str().unwrap());
    let mut store = SqliteListingStore::new(&db_path).unwrap();
    let run_id = store.create_run("test-hash").unwrap();

    let summary = crawl(&config, &mut store).await.unwrap();

    assert_eq!(summary.pages_fetched, 3);
    assert_eq!(summary.total_fetch_failures(), 0);
    assert_eq!(summary.records_emitted, 5);
    assert_eq!(summary.stop_reason, Some(StopReason::FrontierExhausted));

    // listing 1 appears on two pages but is stored once, with the later values
    assert_eq!(store.count_listings().unwrap(), 4);
    let listing = store
        .get_listing(&format!("{}/p/ct/1-main-st/1", base_url))
        .unwrap()
        .unwrap();
    assert_eq!(listing.price, Some(1999));
    assert_eq!(listing.referrer_url, format!("{}/for_rent/CT/2_p/", base_url));
    assert_eq!(
        listing.thumbnail_url.as_deref(),
        Some("https://img.test/1-small.jpg")
    );
    assert_eq!(listing.bedrooms, Some(3));
    assert_eq!(listing.bathrooms, Some(2));
    assert_eq!(listing.city, "Hartford");

    store
        .finish_run(run_id, listing_harvest::storage::RunStatus::Completed, 3, 5)
        .unwrap();
    assert_eq!(store.get_run(run_id).unwrap().records_emitted, 5);
}

#[tokio::test]
async fn test_robots_txt_respect() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_robots(&server, "User-agent: *\nDisallow: /for_rent/CT/2_p/").await;
    mount_page(&server, "/for_rent/CT/1_p/", results_page(&[(1, 2100)], &[2, 3]), 1).await;
    mount_page(&server, "/for_rent/CT/2_p/", results_page(&[(2, 2200)], &[]), 0).await;
    mount_page(&server, "/for_rent/CT/3_p/", results_page(&[(3, 2300)], &[]), 1).await;

    let config = create_test_config(&base_url, "unused.db");
    let mut records: Vec<ListingRecord> = Vec::new();
    let summary = crawl(&config, &mut records).await.unwrap();

    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.fetch_failures.get("robots_denied"), Some(&1));
    assert_eq!(summary.total_fetch_failures(), 1);
    let ids: Vec<&str> = records.iter().map(|r| r.address.as_str()).collect();
    assert_eq!(ids, vec!["1 Main St", "3 Main St"]);
}

#[tokio::test]
async fn test_failed_page_is_dropped_and_crawl_continues() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_robots(&server, "").await;
    mount_page(&server, "/for_rent/CT/1_p/", results_page(&[(1, 2100)], &[2, 3]), 1).await;
    Mock::given(method("GET"))
        .and(path("/for_rent/CT/2_p/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/for_rent/CT/3_p/", results_page(&[(3, 2300)], &[2]), 1).await;

    let config = create_test_config(&base_url, "unused.db");
    let mut records: Vec<ListingRecord> = Vec::new();
    let summary = crawl(&config, &mut records).await.unwrap();

    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.fetch_failures.get("status"), Some(&1));
    assert_eq!(summary.total_fetch_failures(), 1);
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_content_type_handling() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_robots(&server, "").await;
    mount_page(&server, "/for_rent/CT/1_p/", results_page(&[], &[2]), 1).await;
    Mock::given(method("GET"))
        .and(path("/for_rent/CT/2_p/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(b"%PDF-1.4".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&base_url, "unused.db");
    let summary = crawl(&config, &mut Vec::<ListingRecord>::new()).await.unwrap();

    assert_eq!(summary.pages_fetched, 1);
    assert_eq!(summary.fetch_failures.get("content_type"), Some(&1));
    assert_eq!(summary.total_fetch_failures(), 1);
}

#[tokio::test]
async fn test_request_budget_limits_fetches() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(&server, "/for_rent/CT/1_p/", results_page(&[(1, 2100)], &[2]), 1).await;
    mount_page(&server, "/for_rent/CT/2_p/", results_page(&[], &[]), 0).await;

    let mut config = create_test_config(&base_url, "unused.db");
    config.crawler.max_requests = Some(1);
    config.crawler.obey_robots = false;

    let fetcher = HttpFetcher::from_config(&config).unwrap();
    let mut coordinator = Coordinator::new(&config, fetcher).unwrap();
    let summary = coordinator.run(&mut Vec::<ListingRecord>::new()).await.unwrap();

    assert_eq!(summary.pages_fetched, 1);
    assert_eq!(summary.stop_reason, Some(StopReason::RequestBudget));
}

#[tokio::test]
async fn test_records_fan_out_to_jsonl_and_sqlite() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("listings.db");

    mount_robots(&server, "").await;
    mount_page(&server, "/for_rent/CT/1_p/", results_page(&[(1, 2100), (2, 2500)], &[]), 1).await;

    let config = create_test_config(&base_url, db_path.to_str().unwrap());
    let mut store = SqliteListingStore::new(&db_path).unwrap();
    let mut jsonl = JsonLinesSink::new(Vec::new());

    let summary = {
        let mut sinks = SinkSet::new().with(&mut store).with(&mut jsonl);
        crawl(&config, &mut sinks).await.unwrap()
    };

    assert_eq!(summary.records_emitted, 2);
    assert_eq!(store.count_listings().unwrap(), 2);

    let output = String::from_utf8(jsonl.into_inner()).unwrap();
    let lines: Vec<serde_json::Value> = output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["price"], 2100);
    assert_eq!(lines[1]["zipcode"], "06103");
}
