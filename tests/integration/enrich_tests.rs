//! Detail page enrichment and full harvest runs

use crate::fixture::{careers_card, careers_page, FixtureBrowser, FixturePage};
use job_harvest::config::parse_config;
use job_harvest::enrich::Enricher;
use job_harvest::output::csv::{parse_records, write_records};
use job_harvest::output::NoopProgress;
use job_harvest::records::{DetailRecord, JobRecord, UNKNOWN_URL};
use job_harvest::Harvester;
use std::time::Duration;

const START_URL: &str = "https://careers.example.com/search-results";

const DETAIL_WITH_SECTIONS: &str = r#"<html><body>
    <nav class="site-nav">Jobs</nav>
    <div class="job-description">
        <p><strong>About the role</strong></p>
        <p>Build the platform.</p>
        <p><strong>Minimum qualifications:</strong></p>
        <p>Bachelor's degree or equivalent practical experience.</p>
        <p>3 years of experience with Rust.</p>
        <p><strong>Preferred qualifications:</strong></p>
        <p>Experience with async runtimes.</p>
        <div class="footer-links">Privacy</div>
    </div>
</body></html>"#;

const DETAIL_WITHOUT_MARKERS: &str = r#"<html><body>
    <h2>About us</h2>
    <p>We are hiring.</p>
</body></html>"#;

fn record(title: &str, url: &str) -> DetailRecord {
    DetailRecord::from(JobRecord {
        title: title.to_string(),
        url: url.to_string(),
        ..Default::default()
    })
}

#[tokio::test]
async fn test_detail_without_markers_leaves_fields_empty() {
    let url = "https://careers.example.com/job/7";
    let mut browser =
        FixtureBrowser::new(START_URL, Vec::new()).with_detail(url, DETAIL_WITHOUT_MARKERS);
    let enricher = Enricher::new(5, Duration::ZERO);

    let (records, report) = enricher
        .enrich(&mut browser, vec![record("SWE II", url)], &NoopProgress)
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].record.title, "SWE II");
    assert!(records[0].minimum_qualifications.is_empty());
    assert!(records[0].preferred_qualifications.is_empty());
    assert_eq!(report.attempted, 1);
    assert_eq!(report.enriched, 0);
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn test_failing_detail_page_does_not_abort_batch() {
    let good = "https://careers.example.com/job/1";
    let bad = "https://careers.example.com/job/2";
    let later = "https://careers.example.com/job/3";
    let mut browser = FixtureBrowser::new(START_URL, Vec::new())
        .with_detail(good, DETAIL_WITH_SECTIONS)
        .with_failing(bad)
        .with_detail(later, DETAIL_WITH_SECTIONS);
    let enricher = Enricher::new(10, Duration::ZERO);

    let input = vec![
        record("SWE I", good),
        record("SWE II", bad),
        record("SWE III", later),
    ];
    let (records, report) = enricher
        .enrich(&mut browser, input, &NoopProgress)
        .await
        .unwrap();

    assert_eq!(report.attempted, 3);
    assert_eq!(report.failed, 1);
    assert_eq!(report.enriched, 2);
    assert_eq!(
        records[0].minimum_qualifications,
        "Bachelor's degree or equivalent practical experience.\n3 years of experience with Rust."
    );
    assert_eq!(records[0].preferred_qualifications, "Experience with async runtimes.");
    assert!(!records[1].is_enriched());
    assert!(records[2].is_enriched());
}

#[tokio::test]
async fn test_cap_and_sentinel_urls() {
    let first = "https://careers.example.com/job/1";
    let mut browser =
        FixtureBrowser::new(START_URL, Vec::new()).with_detail(first, DETAIL_WITH_SECTIONS);
    let enricher = Enricher::new(2, Duration::ZERO);

    let input = vec![
        record("No link", UNKNOWN_URL),
        record("SWE I", first),
        record("Beyond cap", "https://careers.example.com/job/9"),
    ];
    let (records, report) = enricher
        .enrich(&mut browser, input, &NoopProgress)
        .await
        .unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(report.attempted, 1);
    assert_eq!(report.beyond_cap, 1);
    assert_eq!(browser.navigations, vec![first.to_string()]);
    assert!(records[1].is_enriched());
    assert!(!records[2].is_enriched());
    assert_eq!(records[2].record.title, "Beyond cap");
}

#[tokio::test]
async fn test_full_harvest_run_and_csv_export() {
    let config = parse_config(&format!(
        r#"
[site]
strategy = "paginated"
start-url = "{START_URL}"

[search]
keyword = "Engineer"

[limits]
max-pages = 3
enrichment-cap = 1

[timing]
results-timeout-secs = 1
page-load-timeout-secs = 1
"#
    ))
    .unwrap();

    let cards = vec![
        careers_card(1, "Platform Engineer", "Austin, TX"),
        careers_card(2, "Data Engineer", "Denver, CO"),
    ];
    let browser = FixtureBrowser::new(
        START_URL,
        vec![FixturePage::single(START_URL, careers_page(&cards, None))],
    )
    .with_detail("https://careers.example.com/job/1", DETAIL_WITH_SECTIONS);

    let mut harvester = Harvester::new(config, browser).with_progress(Box::new(NoopProgress));
    let report = harvester.run().await.unwrap();

    assert_eq!(report.strategy, "paginated");
    assert_eq!(report.records.len(), 2);
    assert!(report.enriched());
    assert!(!report.is_partial());
    assert_eq!(report.enrichment.enriched, 1);
    assert!(report.records[0].is_enriched());
    assert!(!report.records[1].is_enriched());

    // Unknown department with no configured company
    assert_eq!(report.records[0].record.department_or_company, "Unknown Department");

    let mut csv = Vec::new();
    write_records(&mut csv, &report.records, report.enriched()).unwrap();
    let reread = parse_records(&String::from_utf8(csv).unwrap()).unwrap();
    assert_eq!(reread, report.records);

    let browser = harvester.into_browser();
    assert_eq!(
        browser.navigations,
        vec![
            START_URL.to_string(),
            "https://careers.example.com/job/1".to_string()
        ]
    );
}
