//! Infinite-scroll discovery

use crate::fixture::{board_card, board_page, FixtureBrowser, FixturePage, Frame};
use job_harvest::config::{parse_config, Config};
use job_harvest::discovery::{DiscoveryEnd, DiscoveryReport, InfiniteScroll, ListingDiscovery};
use job_harvest::output::NoopProgress;
use job_harvest::Deduplicator;

const BOARD_URL: &str = "https://boards.example.com/acme";

fn test_config(keyword: &str, max_pages: u32, max_scrolls: u32) -> Config {
    parse_config(&format!(
        r#"
[site]
strategy = "infinite-scroll"
start-url = "{BOARD_URL}"

[search]
keyword = "{keyword}"

[limits]
max-pages = {max_pages}
max-scrolls = {max_scrolls}

[timing]
results-timeout-secs = 2
page-load-timeout-secs = 1
"#
    ))
    .unwrap()
}

fn cards(ids: std::ops::RangeInclusive<u32>) -> Vec<String> {
    ids.map(|id| board_card(id, &format!("Engineer {}", id)))
        .collect()
}

fn frame(height: i64, count: u32, extra: &str) -> Frame {
    Frame {
        height,
        html: board_page(&cards(1..=count), extra),
    }
}

async fn discover(
    config: &Config,
    browser: &mut FixtureBrowser,
) -> (Deduplicator, DiscoveryReport) {
    let strategy = InfiniteScroll::from_config(config);
    let mut dedup = Deduplicator::new();
    let report = strategy
        .discover(browser, &mut dedup, &NoopProgress)
        .await
        .unwrap();
    (dedup, report)
}

#[tokio::test]
async fn test_scrolling_halts_three_reads_after_last_change() {
    let config = test_config("", 5, 20);
    let frames = vec![
        frame(100, 5, ""),
        frame(200, 8, ""),
        frame(200, 8, ""),
        frame(200, 8, ""),
    ];
    let mut browser = FixtureBrowser::new(
        BOARD_URL,
        vec![FixturePage::scrolling(BOARD_URL, frames)],
    );

    let (dedup, report) = discover(&config, &mut browser).await;

    // The page last changed on the first read, so the fourth read is the third stable one
    assert_eq!(report.scrolls, 4);
    assert_eq!(browser.scrolls_total, 4);
    assert_eq!(report.pages, 1);
    assert_eq!(report.end, DiscoveryEnd::NoNextPage);
    assert_eq!(dedup.len(), 8);
    assert_eq!(dedup.records()[0].url, "https://boards.example.com/jobs/1");
    assert_eq!(dedup.records()[0].department_or_company, "Engineering");
}

#[tokio::test]
async fn test_scroll_ceiling_bounds_a_growing_page() {
    let config = test_config("", 1, 6);
    let frames = (1..=10).map(|n| frame(100 * n as i64, n, "")).collect();
    let mut browser = FixtureBrowser::new(
        BOARD_URL,
        vec![FixturePage::scrolling(BOARD_URL, frames)],
    );

    let (dedup, report) = discover(&config, &mut browser).await;

    assert_eq!(report.scrolls, 6);
    assert_eq!(report.end, DiscoveryEnd::PageLimit);
    assert_eq!(dedup.len(), 7);
}

#[tokio::test]
async fn test_paginates_after_each_page_is_stable() {
    let config = test_config("", 5, 20);
    let next = r#"<a class="next_page" href="?page=2" data-action="next">Next →</a>"#;
    let first = FixturePage::scrolling(BOARD_URL, vec![frame(100, 3, next)]);
    let second = FixturePage::single(
        "https://boards.example.com/acme?page=2",
        board_page(&cards(3..=5), ""),
    );
    let mut browser = FixtureBrowser::new(BOARD_URL, vec![first, second]);

    let (dedup, report) = discover(&config, &mut browser).await;

    assert_eq!(report.pages, 2);
    assert_eq!(report.end, DiscoveryEnd::NoNextPage);
    assert_eq!(dedup.len(), 5);
    assert_eq!(dedup.duplicates(), 1);
    assert_eq!(dedup.records()[4].title, "Engineer 5");
}

#[tokio::test]
async fn test_load_more_button_is_clicked() {
    let config = test_config("", 1, 20);
    let load_more = r#"<button data-action="load-more">Load More Jobs</button>"#;
    let frames = vec![
        frame(100, 2, load_more),
        frame(200, 4, load_more),
        frame(300, 6, ""),
    ];
    let mut browser = FixtureBrowser::new(
        BOARD_URL,
        vec![FixturePage::scrolling(BOARD_URL, frames)],
    );

    let (dedup, _) = discover(&config, &mut browser).await;

    assert!(browser.clicked.iter().any(|text| text == "Load More Jobs"));
    assert_eq!(dedup.len(), 6);
}

#[tokio::test]
async fn test_keyword_filters_titles_without_search_box() {
    let config = test_config("engineer", 1, 20);
    let openings = vec![
        board_card(1, "Senior Software ENGINEER"),
        board_card(2, "Product Manager"),
        board_card(3, "Data Engineer"),
        board_card(4, "Designer"),
    ];
    let mut browser = FixtureBrowser::new(
        BOARD_URL,
        vec![FixturePage::single(BOARD_URL, board_page(&openings, ""))],
    );

    let (dedup, report) = discover(&config, &mut browser).await;

    assert_eq!(report.filtered_out, 2);
    let titles: Vec<_> = dedup.records().iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Senior Software ENGINEER", "Data Engineer"]);
    assert!(browser.typed.is_empty());
}

#[tokio::test]
async fn test_native_search_box_is_used_and_filter_still_applies() {
    let config = test_config("Engineer", 1, 20);
    let search = r#"<input id="search_keywords" data-goto="1">"#;
    let everything = vec![board_card(1, "Engineer 1"), board_card(2, "Recruiter")];
    let results = vec![board_card(1, "Engineer 1"), board_card(3, "Engineering Manager")];
    let mut browser = FixtureBrowser::new(
        BOARD_URL,
        vec![
            FixturePage::single(BOARD_URL, board_page(&everything, search)),
            FixturePage::single(
                "https://boards.example.com/acme?q=Engineer",
                board_page(&results, search),
            ),
        ],
    );

    let (dedup, report) = discover(&config, &mut browser).await;

    assert_eq!(browser.typed, vec!["Engineer".to_string()]);
    assert_eq!(dedup.len(), 2);
    assert_eq!(report.filtered_out, 0);
    assert_eq!(dedup.records()[1].title, "Engineering Manager");
}

#[tokio::test]
async fn test_board_without_openings_times_out() {
    let config = test_config("", 5, 20);
    let mut browser = FixtureBrowser::new(
        BOARD_URL,
        vec![FixturePage::single(BOARD_URL, board_page(&[], ""))],
    );

    let (dedup, report) = discover(&config, &mut browser).await;

    assert!(dedup.is_empty());
    assert_eq!(report.end, DiscoveryEnd::ResultsTimeout);
}
