//! Scripted browser for integration tests
//!
//! `FixtureBrowser` serves static HTML through `scraper` and reacts to a few
//! `data-*` attributes:
//!
//! - `data-action="next"`: clicking loads the next listing page
//! - `data-action="search"`: clicking (or submitting into) re-renders the page
//! - `data-action="load-more"`: clicking advances the page by one frame
//! - `data-goto="N"`: clicking loads listing page `N`
//!
//! A listing page is a list of frames, one per scroll: the page shows
//! `frames[min(scrolls + loads, last)]`. Every page change bumps an epoch,
//! and handles from an older epoch fail with `StaleReference`. Pauses
//! return immediately.

use async_trait::async_trait;
use job_harvest::browser::{BrowserError, BrowserSession};
use scraper::{Html, Selector};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// One rendering of a listing page
#[derive(Debug, Clone)]
pub struct Frame {
    pub height: i64,
    pub html: String,
}

#[derive(Debug, Clone)]
pub struct FixturePage {
    pub url: String,
    pub frames: Vec<Frame>,
}

impl FixturePage {
    pub fn single(url: &str, html: String) -> Self {
        Self {
            url: url.to_string(),
            frames: vec![Frame { height: 1000, html }],
        }
    }

    pub fn scrolling(url: &str, frames: Vec<Frame>) -> Self {
        Self {
            url: url.to_string(),
            frames,
        }
    }
}

/// Snapshot of an element at the time it was found
#[derive(Debug, Clone)]
pub struct FixtureElement {
    epoch: u64,
    tag: String,
    text: String,
    attrs: HashMap<String, String>,
}

impl FixtureElement {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Location {
    Blank,
    Listing { page: usize, scrolls: usize, loads: usize },
    Detail(String),
}

pub struct FixtureBrowser {
    start_url: String,
    listing: Vec<FixturePage>,
    details: HashMap<String, String>,
    failing: HashSet<String>,
    location: Location,
    epoch: u64,

    pub navigations: Vec<String>,
    pub typed: Vec<String>,
    pub clicked: Vec<String>,
    pub scrolls_total: usize,
}

impl FixtureBrowser {
    pub fn new(start_url: &str, listing: Vec<FixturePage>) -> Self {
        Self {
            start_url: start_url.to_string(),
            listing,
            details: HashMap::new(),
            failing: HashSet::new(),
            location: Location::Blank,
            epoch: 0,
            navigations: Vec::new(),
            typed: Vec::new(),
            clicked: Vec::new(),
            scrolls_total: 0,
        }
    }

    pub fn with_detail(mut self, url: &str, html: &str) -> Self {
        self.details.insert(url.to_string(), html.to_string());
        self
    }

    /// Navigating to `url` fails with a protocol error
    pub fn with_failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    fn load_listing(&mut self, page: usize) {
        self.location = Location::Listing {
            page,
            scrolls: 0,
            loads: 0,
        };
        self.epoch += 1;
    }

    fn current_html(&self) -> &str {
        match &self.location {
            Location::Blank => "<html><body></body></html>",
            Location::Listing {
                page,
                scrolls,
                loads,
            } => {
                let frames = &self.listing[*page].frames;
                let index = (scrolls + loads).min(frames.len() - 1);
                &frames[index].html
            }
            Location::Detail(url) => self.details.get(url).map(String::as_str).unwrap_or(""),
        }
    }

    fn check_live(&self, element: &FixtureElement) -> Result<(), BrowserError> {
        if element.epoch == self.epoch {
            Ok(())
        } else {
            Err(BrowserError::StaleReference(format!(
                "<{}> from an earlier page",
                element.tag
            )))
        }
    }

    /// Applies the page change an element triggers when activated
    fn activate(&mut self, element: &FixtureElement) {
        if let Some(target) = element.attr("data-goto").and_then(|v| v.parse().ok()) {
            self.load_listing(target);
            return;
        }

        match element.attr("data-action") {
            Some("next") => {
                if let Location::Listing { page, .. } = self.location {
                    if page + 1 < self.listing.len() {
                        self.load_listing(page + 1);
                    }
                }
            }
            Some("search") => self.epoch += 1,
            Some("load-more") => {
                if let Location::Listing { loads, .. } = &mut self.location {
                    *loads += 1;
                }
            }
            _ => {}
        }
    }
}

/// Parses `html` and snapshots every element matching `css`
fn snapshot(html: &str, css: &str, epoch: u64) -> Result<Vec<FixtureElement>, BrowserError> {
    let selector = Selector::parse(css)
        .map_err(|e| BrowserError::Protocol(format!("invalid selector {}: {:?}", css, e)))?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&selector)
        .map(|el| FixtureElement {
            epoch,
            tag: el.value().name().to_string(),
            text: el
                .text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" "),
            attrs: el
                .value()
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        })
        .collect())
}

#[async_trait]
impl BrowserSession for FixtureBrowser {
    type Element = FixtureElement;

    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        self.navigations.push(url.to_string());

        if self.failing.contains(url) {
            return Err(BrowserError::Protocol(format!(
                "net::ERR_CONNECTION_REFUSED at {}",
                url
            )));
        }
        if url == self.start_url && !self.listing.is_empty() {
            self.load_listing(0);
            return Ok(());
        }
        if self.details.contains_key(url) {
            self.location = Location::Detail(url.to_string());
            self.epoch += 1;
            return Ok(());
        }

        Err(BrowserError::Protocol(format!("no fixture for {}", url)))
    }

    async fn current_url(&mut self) -> Result<String, BrowserError> {
        Ok(match &self.location {
            Location::Blank => "about:blank".to_string(),
            Location::Listing { page, .. } => self.listing[*page].url.clone(),
            Location::Detail(url) => url.clone(),
        })
    }

    async fn page_source(&mut self) -> Result<String, BrowserError> {
        Ok(self.current_html().to_string())
    }

    async fn find_all(&mut self, css: &str) -> Result<Vec<FixtureElement>, BrowserError> {
        snapshot(self.current_html(), css, self.epoch)
    }

    async fn text(&mut self, element: &FixtureElement) -> Result<String, BrowserError> {
        self.check_live(element)?;
        Ok(element.text.clone())
    }

    async fn attribute(
        &mut self,
        element: &FixtureElement,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        self.check_live(element)?;
        Ok(element.attr(name).map(str::to_string))
    }

    async fn is_interactable(&mut self, element: &FixtureElement) -> Result<bool, BrowserError> {
        self.check_live(element)?;
        let hidden = element.attr("hidden").is_some()
            || element
                .attr("style")
                .map(|s| s.replace(' ', "").contains("display:none"))
                .unwrap_or(false);
        Ok(!hidden && element.attr("disabled").is_none())
    }

    async fn click(&mut self, element: &FixtureElement) -> Result<(), BrowserError> {
        self.check_live(element)?;
        self.clicked.push(element.text.clone());
        self.activate(element);
        Ok(())
    }

    async fn type_text(
        &mut self,
        element: &FixtureElement,
        text: &str,
        submit: bool,
    ) -> Result<(), BrowserError> {
        self.check_live(element)?;
        self.typed.push(text.to_string());
        if submit {
            self.activate(element);
        }
        Ok(())
    }

    async fn scroll_into_view(&mut self, element: &FixtureElement) -> Result<(), BrowserError> {
        self.check_live(element)
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), BrowserError> {
        if let Location::Listing { scrolls, .. } = &mut self.location {
            *scrolls += 1;
            self.scrolls_total += 1;
        }
        Ok(())
    }

    async fn scroll_height(&mut self) -> Result<i64, BrowserError> {
        Ok(match &self.location {
            Location::Listing {
                page,
                scrolls,
                loads,
            } => {
                let frames = &self.listing[*page].frames;
                frames[(scrolls + loads).min(frames.len() - 1)].height
            }
            _ => 0,
        })
    }

    async fn handle_alert(&mut self, _accept: bool) -> Result<bool, BrowserError> {
        Ok(false)
    }

    async fn pause(&mut self, _duration: Duration) {}
}

// ===== HTML builders =====

/// A card on the paginated careers search surface
pub fn careers_card(id: u32, title: &str, location: &str) -> String {
    format!(
        r#"<div class="job-card" data-job-id="{id}">
            <h3>{title}</h3>
            <span class="job-location">{location}</span>
            <span class="posted-date">{id} days ago</span>
            <a href="/job/{id}">View job</a>
        </div>"#
    )
}

/// Location filter of the careers search form: a toggle, the options, and Apply
pub const LOCATION_FILTER: &str = r#"<div class="location-filter">
            <button data-ph-at-id="jobs-location-filter">Location</button>
            <ul class="location-options">
                <li><span>Austin, Texas</span></li>
                <li><span>Seattle, Washington</span></li>
            </ul>
            <button class="filter-apply">Apply</button>
        </div>"#;

/// A careers search results page with the location filter
///
/// `next` is the markup of the pagination control, if any.
pub fn careers_page(cards: &[String], next: Option<&str>) -> String {
    careers_page_with_filter(cards, next, LOCATION_FILTER)
}

/// A careers search results page; `filter` is the location filter markup
pub fn careers_page_with_filter(cards: &[String], next: Option<&str>, filter: &str) -> String {
    format!(
        r#"<html><body>
            <input id="keyword-search" type="text">
            {}
            <button data-ph-at-id="jobs-search-button" data-action="search">Search</button>
            <div class="jobs-list">{}</div>
            <nav class="pagination">{}</nav>
        </body></html>"#,
        filter,
        cards.join("\n"),
        next.unwrap_or("")
    )
}

pub const ENABLED_NEXT: &str =
    r#"<button aria-label="Next page" data-action="next">Next</button>"#;

pub const DISABLED_NEXT: &str =
    r#"<button aria-label="Next page" class="btn disabled" aria-disabled="true">Next</button>"#;

/// A posting on the infinite-scroll job board
pub fn board_card(id: u32, title: &str) -> String {
    format!(
        r#"<div class="opening">
            <a href="/jobs/{id}">{title}</a>
            <span class="location">Remote</span>
            <span class="department">Engineering</span>
        </div>"#
    )
}

/// A job board page; `extra` is appended after the openings
pub fn board_page(cards: &[String], extra: &str) -> String {
    format!(
        r#"<html><body>
            <section class="openings">{}</section>
            {}
        </body></html>"#,
        cards.join("\n"),
        extra
    )
}

// ===== Fixture self-checks =====

#[tokio::test]
async fn test_handles_go_stale_after_page_change() {
    let pages = vec![
        FixturePage::single(
            "https://careers.example.com/search?page=1",
            careers_page(&[careers_card(1, "SWE II", "Austin, TX")], Some(ENABLED_NEXT)),
        ),
        FixturePage::single(
            "https://careers.example.com/search?page=2",
            careers_page(&[careers_card(2, "SWE III", "Austin, TX")], None),
        ),
    ];
    let mut browser = FixtureBrowser::new("https://careers.example.com/search?page=1", pages);
    browser
        .navigate("https://careers.example.com/search?page=1")
        .await
        .unwrap();

    let next = browser.find_all("button[aria-label='Next page']").await.unwrap();
    let card = browser.find_all("div.job-card").await.unwrap();
    browser.click(&next[0]).await.unwrap();

    assert!(matches!(
        browser.text(&card[0]).await,
        Err(BrowserError::StaleReference(_))
    ));
    assert_eq!(
        browser.current_url().await.unwrap(),
        "https://careers.example.com/search?page=2"
    );
}

#[tokio::test]
async fn test_frames_follow_scrolls() {
    let frames = vec![
        Frame {
            height: 100,
            html: board_page(&[board_card(1, "A")], ""),
        },
        Frame {
            height: 200,
            html: board_page(&[board_card(1, "A"), board_card(2, "B")], ""),
        },
    ];
    let mut browser = FixtureBrowser::new(
        "https://boards.example.com/acme",
        vec![FixturePage::scrolling("https://boards.example.com/acme", frames)],
    );
    browser.navigate("https://boards.example.com/acme").await.unwrap();

    assert_eq!(browser.scroll_height().await.unwrap(), 100);
    browser.scroll_to_bottom().await.unwrap();
    browser.scroll_to_bottom().await.unwrap();
    assert_eq!(browser.scroll_height().await.unwrap(), 200);
    assert_eq!(browser.find_all(".opening").await.unwrap().len(), 2);
}
