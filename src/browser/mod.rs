//! Browser automation surface
//!
//! The harvester only talks to the browser through [`BrowserSession`], so
//! the discovery strategies and the enricher run unchanged against a real
//! Chrome instance or a scripted test double.
//!
//! # Components
//!
//! - `BrowserSession`: The primitives the harvester needs
//! - `ChromeSession`: Chrome DevTools Protocol implementation
//! - `wait_for` / `wait_for_clickable`: Bounded polling waits
//! - `popups`: Consent and cookie banner dismissal

mod chrome;
pub mod popups;

pub use chrome::ChromeSession;

use crate::extract::selectors::{Query, SelectorList};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Interval between polls of a bounded wait
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Failures reported by the browser layer
///
/// Only `SessionFailure` and a listing-load `Timeout` are run-level; every
/// other variant is absorbed where it happens.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("No element matched {0}")]
    ElementNotFound(String),

    #[error("Timed out waiting for {0}")]
    Timeout(String),

    #[error("Element reference is stale: {0}")]
    StaleReference(String),

    #[error("Browser session failed: {0}")]
    SessionFailure(String),

    #[error("Browser protocol error: {0}")]
    Protocol(String),
}

/// Operations the harvester performs on a browser
///
/// All element handles become invalid after a navigation or a page change;
/// using one afterwards yields `StaleReference`.
#[async_trait]
pub trait BrowserSession: Send {
    /// Live element handle
    type Element: Send + Sync;

    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError>;

    async fn current_url(&mut self) -> Result<String, BrowserError>;

    /// Serialized DOM of the current page
    async fn page_source(&mut self) -> Result<String, BrowserError>;

    /// All elements matching a CSS selector in the current document
    async fn find_all(&mut self, css: &str) -> Result<Vec<Self::Element>, BrowserError>;

    async fn text(&mut self, element: &Self::Element) -> Result<String, BrowserError>;

    async fn attribute(
        &mut self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, BrowserError>;

    /// Returns true if the element is displayed and enabled
    async fn is_interactable(&mut self, element: &Self::Element) -> Result<bool, BrowserError>;

    async fn click(&mut self, element: &Self::Element) -> Result<(), BrowserError>;

    /// Clears the element, types `text`, and presses Enter when `submit` is set
    async fn type_text(
        &mut self,
        element: &Self::Element,
        text: &str,
        submit: bool,
    ) -> Result<(), BrowserError>;

    async fn scroll_into_view(&mut self, element: &Self::Element) -> Result<(), BrowserError>;

    async fn scroll_to_bottom(&mut self) -> Result<(), BrowserError>;

    /// Current `document.body.scrollHeight`
    async fn scroll_height(&mut self) -> Result<i64, BrowserError>;

    /// Accepts or dismisses a pending JavaScript dialog
    ///
    /// Returns false when no dialog was open.
    async fn handle_alert(&mut self, accept: bool) -> Result<bool, BrowserError>;

    /// Settle delay
    async fn pause(&mut self, duration: Duration);
}

/// Matches of a single query on the live page
async fn query_live<B: BrowserSession>(
    browser: &mut B,
    query: &Query,
) -> Result<Vec<B::Element>, BrowserError> {
    let found = browser.find_all(query.css()).await?;
    if query.required_text().is_none() {
        return Ok(found);
    }

    let mut matching = Vec::new();
    for element in found {
        match browser.text(&element).await {
            Ok(text) if query.accepts_text(&text) => matching.push(element),
            Ok(_) => {}
            Err(e) => debug!("Skipping element while reading text: {}", e),
        }
    }
    Ok(matching)
}

/// Returns the first non-empty match set of `list` on the live page
///
/// Query failures are treated as "no match" for that query and logged.
pub async fn resolve_live<B: BrowserSession>(
    browser: &mut B,
    list: &SelectorList,
) -> Vec<B::Element> {
    for query in list.queries {
        match query_live(browser, query).await {
            Ok(found) if !found.is_empty() => return found,
            Ok(_) => debug!("{}: no match for {:?}", list.name, query),
            Err(e) => debug!("{}: query {:?} failed: {}", list.name, query, e),
        }
    }

    Vec::new()
}

/// Polls until `list` matches at least one element
///
/// # Arguments
///
/// * `browser` - The session to poll
/// * `list` - Queries that identify the awaited element
/// * `timeout` - Total time to keep polling
///
/// # Returns
///
/// * `Ok(Vec<Element>)` - The non-empty match set
/// * `Err(BrowserError::Timeout)` - Nothing matched before the timeout
pub async fn wait_for<B: BrowserSession>(
    browser: &mut B,
    list: &SelectorList,
    timeout: Duration,
) -> Result<Vec<B::Element>, BrowserError> {
    let mut waited = Duration::ZERO;
    loop {
        let found = resolve_live(browser, list).await;
        if !found.is_empty() {
            return Ok(found);
        }

        if waited >= timeout {
            return Err(BrowserError::Timeout(list.name.to_string()));
        }

        browser.pause(POLL_INTERVAL).await;
        waited += POLL_INTERVAL;
    }
}

/// Polls until `list` matches an element that is displayed and enabled
pub async fn wait_for_clickable<B: BrowserSession>(
    browser: &mut B,
    list: &SelectorList,
    timeout: Duration,
) -> Result<B::Element, BrowserError> {
    let mut waited = Duration::ZERO;
    loop {
        for element in resolve_live(browser, list).await {
            if browser.is_interactable(&element).await.unwrap_or(false) {
                return Ok(element);
            }
        }

        if waited >= timeout {
            return Err(BrowserError::Timeout(format!("clickable {}", list.name)));
        }

        browser.pause(POLL_INTERVAL).await;
        waited += POLL_INTERVAL;
    }
}
