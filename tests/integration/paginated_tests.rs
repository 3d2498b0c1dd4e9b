//! Paginated search-and-filter discovery

use crate::fixture::{
    careers_card, careers_page, careers_page_with_filter, FixtureBrowser, FixturePage,
    DISABLED_NEXT, ENABLED_NEXT,
};
use job_harvest::config::{parse_config, Config};
use job_harvest::discovery::{DiscoveryEnd, ListingDiscovery, Paginated};
use job_harvest::output::NoopProgress;
use job_harvest::Deduplicator;

const START_URL: &str = "https://careers.example.com/search-results";

fn test_config(max_pages: u32) -> Config {
    config_in(max_pages, None)
}

fn config_in(max_pages: u32, location: Option<&str>) -> Config {
    let location = location
        .map(|l| format!("location = \"{}\"", l))
        .unwrap_or_default();
    parse_config(&format!(
        r#"
[site]
strategy = "paginated"
start-url = "{START_URL}"
company = "Example Corp"

[search]
keyword = "Software Engineer"
{location}

[limits]
max-pages = {max_pages}
enrichment-cap = 0

[timing]
results-timeout-secs = 2
page-load-timeout-secs = 1
control-timeout-secs = 1
"#
    ))
    .unwrap()
}

fn page_url(n: usize) -> String {
    format!("{}?page={}", START_URL, n)
}

/// Page one has ten cards, page two four, one of which repeats page one
fn two_page_listing(last_next: Option<&str>) -> Vec<FixturePage> {
    let first: Vec<String> = (1..=10)
        .map(|id| {
            let title = if id == 1 {
                "SWE II".to_string()
            } else {
                format!("Software Engineer {}", id)
            };
            careers_card(id, &title, "Austin, TX")
        })
        .collect();
    let second = vec![
        careers_card(11, "Software Engineer 11", "Seattle, WA"),
        careers_card(1, "SWE II", "Austin, TX"),
        careers_card(12, "Software Engineer 12", "Seattle, WA"),
        careers_card(13, "Software Engineer 13", "Remote, US"),
    ];

    vec![
        FixturePage::single(&page_url(1), careers_page(&first, Some(ENABLED_NEXT))),
        FixturePage::single(&page_url(2), careers_page(&second, last_next)),
    ]
}

async fn discover(
    config: &Config,
    browser: &mut FixtureBrowser,
) -> (Deduplicator, job_harvest::discovery::DiscoveryReport) {
    let strategy = Paginated::from_config(config);
    let mut dedup = Deduplicator::new();
    let report = strategy
        .discover(browser, &mut dedup, &NoopProgress)
        .await
        .unwrap();
    (dedup, report)
}

#[tokio::test]
async fn test_two_pages_with_duplicate_across_pages() {
    let config = test_config(5);
    let mut browser = FixtureBrowser::new(START_URL, two_page_listing(Some(DISABLED_NEXT)));

    let (dedup, report) = discover(&config, &mut browser).await;

    assert_eq!(dedup.len(), 13);
    assert_eq!(dedup.duplicates(), 1);
    assert_eq!(report.pages, 2);
    assert_eq!(report.cards_seen, 14);
    assert_eq!(report.end, DiscoveryEnd::NoNextPage);

    // Discovery order is preserved: page one first, then the new cards of page two
    let records = dedup.records();
    assert_eq!(records[0].title, "SWE II");
    assert_eq!(records[0].url, "https://careers.example.com/job/1");
    assert_eq!(records[10].title, "Software Engineer 11");
    assert_eq!(records[12].title, "Software Engineer 13");

    assert_eq!(browser.typed, vec!["Software Engineer".to_string()]);
}

#[tokio::test]
async fn test_location_filter_search_over_two_pages() {
    let config = config_in(3, Some("Austin"));
    let mut browser = FixtureBrowser::new(START_URL, two_page_listing(Some(DISABLED_NEXT)));

    let (dedup, report) = discover(&config, &mut browser).await;

    assert_eq!(dedup.len(), 13);
    assert_eq!(dedup.duplicates(), 1);
    assert_eq!(report.pages, 2);
    assert_eq!(report.end, DiscoveryEnd::NoNextPage);
    assert_eq!(browser.typed, vec!["Software Engineer".to_string()]);
    assert_eq!(
        browser.clicked,
        vec!["Location", "Austin, Texas", "Apply", "Search", "Next"]
    );
}

#[tokio::test]
async fn test_missing_location_filter_does_not_block_search() {
    let config = config_in(3, Some("Austin"));
    let cards: Vec<String> = (1..=3)
        .map(|id| careers_card(id, &format!("Software Engineer {}", id), "Austin, TX"))
        .collect();
    let pages = vec![FixturePage::single(
        &page_url(1),
        careers_page_with_filter(&cards, None, ""),
    )];
    let mut browser = FixtureBrowser::new(START_URL, pages);

    let (dedup, report) = discover(&config, &mut browser).await;

    assert_eq!(dedup.len(), 3);
    assert_eq!(report.end, DiscoveryEnd::NoNextPage);
    assert_eq!(browser.clicked, vec!["Search"]);
}

#[tokio::test]
async fn test_card_fields_and_company_fallback() {
    let config = test_config(1);
    let mut browser = FixtureBrowser::new(START_URL, two_page_listing(None));

    let (dedup, _) = discover(&config, &mut browser).await;

    let record = &dedup.records()[1];
    assert_eq!(record.title, "Software Engineer 2");
    assert_eq!(record.location, "Austin, TX");
    assert_eq!(record.posted_age, "2 days ago");
    assert_eq!(record.department_or_company, "Example Corp");
    assert_eq!(record.url, "https://careers.example.com/job/2");
}

#[tokio::test]
async fn test_missing_next_control_ends_discovery() {
    let config = test_config(5);
    let mut browser = FixtureBrowser::new(START_URL, two_page_listing(None));

    let (dedup, report) = discover(&config, &mut browser).await;

    assert_eq!(report.end, DiscoveryEnd::NoNextPage);
    assert_eq!(report.pages, 2);
    assert_eq!(dedup.len(), 13);
}

#[tokio::test]
async fn test_page_ceiling_stops_before_advancing() {
    let config = test_config(1);
    let mut browser = FixtureBrowser::new(START_URL, two_page_listing(Some(DISABLED_NEXT)));

    let (dedup, report) = discover(&config, &mut browser).await;

    assert_eq!(report.end, DiscoveryEnd::PageLimit);
    assert_eq!(report.pages, 1);
    assert_eq!(dedup.len(), 10);
    assert!(!browser.clicked.iter().any(|text| text == "Next"));
}

#[tokio::test]
async fn test_results_timeout_yields_empty_partial_run() {
    let config = test_config(5);
    let empty = careers_page(&[], None).replace(r#"<div class="jobs-list"></div>"#, "");
    let mut browser = FixtureBrowser::new(START_URL, vec![FixturePage::single(START_URL, empty)]);

    let (dedup, report) = discover(&config, &mut browser).await;

    assert!(dedup.is_empty());
    assert_eq!(report.pages, 0);
    assert_eq!(report.end, DiscoveryEnd::ResultsTimeout);
    assert!(report.end.is_failure());
}

#[tokio::test]
async fn test_unreachable_listing() {
    let config = test_config(5);
    let mut browser = FixtureBrowser::new(START_URL, Vec::new()).with_failing(START_URL);

    let (dedup, report) = discover(&config, &mut browser).await;

    assert!(dedup.is_empty());
    assert_eq!(report.end, DiscoveryEnd::ListingUnavailable);
}

#[tokio::test]
async fn test_cards_without_identity_are_rejected() {
    let config = test_config(1);
    let cards = vec![
        careers_card(1, "SWE II", "Austin, TX"),
        // No title and no link
        r#"<div class="job-card"><span class="job-location">Austin, TX</span></div>"#.to_string(),
    ];
    let mut browser = FixtureBrowser::new(
        START_URL,
        vec![FixturePage::single(START_URL, careers_page(&cards, None))],
    );

    let (dedup, report) = discover(&config, &mut browser).await;

    assert_eq!(report.cards_seen, 2);
    assert_eq!(dedup.len(), 1);
    assert_eq!(dedup.rejected(), 1);
}
