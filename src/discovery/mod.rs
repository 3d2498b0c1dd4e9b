//! Listing discovery strategies
//!
//! A strategy drives the browser across one listing surface and feeds every
//! card it finds through the shared [`Deduplicator`]. Strategies are picked
//! from the configuration, so supporting another site means adding a new
//! implementation of [`ListingDiscovery`] without touching the existing ones.
//!
//! # Strategies
//!
//! - `Paginated`: search form, then numbered result pages
//! - `InfiniteScroll`: scroll each page until stable, then paginate

mod infinite_scroll;
mod paginated;

pub use infinite_scroll::InfiniteScroll;
pub use paginated::Paginated;

use crate::browser::{resolve_live, BrowserError, BrowserSession};
use crate::config::{Config, Strategy};
use crate::dedup::Deduplicator;
use crate::extract::{extract_cards, CardContext, SelectorList};
use crate::output::ProgressSink;
use async_trait::async_trait;
use std::fmt;

/// Why discovery stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryEnd {
    /// The last page had no usable next control
    NoNextPage,

    /// The page ceiling was reached
    PageLimit,

    /// Listing cards did not appear within the bounded wait
    ResultsTimeout,

    /// The listing page or its search form could not be loaded
    ListingUnavailable,
}

impl DiscoveryEnd {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoNextPage => "no_next_page",
            Self::PageLimit => "page_limit",
            Self::ResultsTimeout => "results_timeout",
            Self::ListingUnavailable => "listing_unavailable",
        }
    }

    /// Returns true if discovery ended without reaching the listing's end or the ceiling
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::ResultsTimeout | Self::ListingUnavailable)
    }
}

impl fmt::Display for DiscoveryEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one discovery pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Listing pages extracted
    pub pages: u32,

    /// Scroll iterations across all pages
    pub scrolls: u32,

    /// Cards seen, before deduplication
    pub cards_seen: usize,

    /// Records removed by the title keyword filter
    pub filtered_out: usize,

    pub end: DiscoveryEnd,
}

impl DiscoveryReport {
    pub fn new(end: DiscoveryEnd) -> Self {
        Self {
            pages: 0,
            scrolls: 0,
            cards_seen: 0,
            filtered_out: 0,
            end,
        }
    }
}

/// A way of walking a listing surface
#[async_trait]
pub trait ListingDiscovery<B: BrowserSession>: Send + Sync {
    /// Strategy name used in logs and reports
    fn name(&self) -> &'static str;

    /// Walks the listing and adds every card to `dedup`
    ///
    /// Per-card and per-page failures are absorbed; a listing-load timeout
    /// ends discovery with whatever was gathered. Only a session failure is
    /// returned as an error.
    async fn discover(
        &self,
        browser: &mut B,
        dedup: &mut Deduplicator,
        progress: &dyn ProgressSink,
    ) -> crate::Result<DiscoveryReport>;
}

/// Builds the strategy named by the configuration
pub fn strategy_for<B: BrowserSession>(config: &Config) -> Box<dyn ListingDiscovery<B>> {
    match config.site.strategy {
        Strategy::Paginated => Box::new(Paginated::from_config(config)),
        Strategy::InfiniteScroll => Box::new(InfiniteScroll::from_config(config)),
    }
}

// ===== Shared steps =====

/// Cards found on one page and how many of them were new
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PageHarvest {
    pub found: usize,
    pub added: usize,
}

/// Extracts the cards of the current page into `dedup`
///
/// A failure to snapshot the page skips the page; only a session failure
/// propagates.
pub(crate) async fn harvest_page<B: BrowserSession>(
    browser: &mut B,
    selectors: &crate::extract::SiteSelectors,
    ctx: &CardContext,
    dedup: &mut Deduplicator,
) -> crate::Result<PageHarvest> {
    let source = match browser.page_source().await {
        Ok(source) => source,
        Err(e @ BrowserError::SessionFailure(_)) => return Err(e.into()),
        Err(e) => {
            tracing::warn!("Skipping page, snapshot failed: {}", e);
            return Ok(PageHarvest::default());
        }
    };

    let mut ctx = ctx.clone();
    if let Ok(url) = browser.current_url().await {
        if let Ok(parsed) = url::Url::parse(&url) {
            ctx.page_url = Some(parsed);
        }
    }

    let records = extract_cards(&source, selectors, &ctx);
    let found = records.len();
    let added = dedup.extend(records);

    Ok(PageHarvest { found, added })
}

/// Returns true if the control reports a disabled state
///
/// Any of a `disabled` attribute, a `disabled` class, or
/// `aria-disabled="true"`. A control whose attributes cannot be read counts
/// as disabled, so a stale handle ends pagination instead of looping.
pub(crate) async fn is_disabled<B: BrowserSession>(browser: &mut B, control: &B::Element) -> bool {
    let attributes = async {
        let disabled = browser.attribute(control, "disabled").await?;
        let class = browser.attribute(control, "class").await?;
        let aria = browser.attribute(control, "aria-disabled").await?;
        Ok::<_, BrowserError>((disabled, class, aria))
    }
    .await;

    match attributes {
        Ok((disabled, class, aria)) => {
            disabled.is_some()
                || class
                    .unwrap_or_default()
                    .split_whitespace()
                    .any(|token| token.eq_ignore_ascii_case("disabled"))
                || aria.map(|v| v.trim().eq_ignore_ascii_case("true")).unwrap_or(false)
        }
        Err(e) => {
            tracing::debug!("Treating unreadable control as disabled: {}", e);
            true
        }
    }
}

/// Finds the first next-page candidate that is enabled
///
/// With `require_interactable`, hidden candidates are skipped too.
pub(crate) async fn find_next_control<B: BrowserSession>(
    browser: &mut B,
    next: &SelectorList,
    require_interactable: bool,
) -> Option<B::Element> {
    for candidate in resolve_live(browser, next).await {
        if require_interactable && !browser.is_interactable(&candidate).await.unwrap_or(false) {
            continue;
        }
        if is_disabled(browser, &candidate).await {
            continue;
        }
        return Some(candidate);
    }
    None
}

/// Fraction of the page ceiling used so far
pub(crate) fn page_fraction(pages: u32, max_pages: u32) -> f64 {
    if max_pages == 0 {
        1.0
    } else {
        (pages as f64 / max_pages as f64).min(1.0)
    }
}
