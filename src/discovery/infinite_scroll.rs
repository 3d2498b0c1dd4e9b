//! Infinite-scroll strategy
//!
//! Each listing page is scrolled (clicking any "load more" control on the
//! way) until its height and card count stop changing, then extracted; only
//! then does the strategy move to the next page. The scroll loop is bounded
//! by the stall rule and by `max-scrolls`, the page loop by `max-pages`.

use crate::browser::popups::dismiss_popups;
use crate::browser::{resolve_live, wait_for, BrowserError, BrowserSession};
use crate::config::{Config, LimitsConfig, SearchConfig, TimingConfig};
use crate::dedup::Deduplicator;
use crate::discovery::{
    find_next_control, harvest_page, page_fraction, DiscoveryEnd, DiscoveryReport,
    ListingDiscovery,
};
use crate::extract::{CardContext, SiteSelectors, JOB_BOARD};
use crate::output::ProgressSink;
use crate::records::JobRecord;
use crate::state::PageLoadState;
use async_trait::async_trait;

/// Strategy for job boards that load openings on scroll and paginate afterwards
#[derive(Debug, Clone)]
pub struct InfiniteScroll {
    start_url: String,
    search: SearchConfig,
    limits: LimitsConfig,
    timing: TimingConfig,
    card_context: CardContext,
    selectors: &'static SiteSelectors,
}

/// Returns true if the title contains `keyword`, ignoring case
pub fn title_matches(record: &JobRecord, keyword: &str) -> bool {
    record.title.to_lowercase().contains(&keyword.to_lowercase())
}

impl InfiniteScroll {
    pub fn from_config(config: &Config) -> Self {
        Self {
            start_url: config.site.start_url.clone(),
            search: config.search.clone(),
            limits: config.limits.clone(),
            timing: config.timing.clone(),
            card_context: CardContext::new(&config.site.start_url)
                .with_company(config.site.company.clone())
                .with_job_url_template(config.site.job_url_template.clone()),
            selectors: &JOB_BOARD,
        }
    }

    fn keyword(&self) -> Option<&str> {
        let keyword = self.search.keyword.trim();
        (!keyword.is_empty()).then_some(keyword)
    }

    /// Uses the board's own search box when it has one
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Cards are present after the search (or no search was needed)
    /// * `Ok(false)` - The search produced no cards within the page-load timeout
    async fn native_search<B: BrowserSession>(
        &self,
        browser: &mut B,
        keyword: &str,
    ) -> crate::Result<bool> {
        let Some(input) = resolve_live(browser, &self.selectors.search_input)
            .await
            .into_iter()
            .next()
        else {
            tracing::info!("No search box found, filtering titles after harvest");
            return Ok(true);
        };

        match browser.type_text(&input, keyword, true).await {
            Ok(()) => tracing::info!("Searched the board for '{}'", keyword),
            Err(e @ BrowserError::SessionFailure(_)) => return Err(e.into()),
            Err(e) => {
                tracing::warn!("Search box unusable ({}), filtering titles after harvest", e);
                return Ok(true);
            }
        }
        browser.pause(self.timing.action_settle()).await;

        match wait_for(browser, &self.selectors.cards, self.timing.page_load_timeout()).await {
            Ok(_) => Ok(true),
            Err(BrowserError::Timeout(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Scrolls the current page until it stops growing
    ///
    /// # Returns
    ///
    /// The number of scroll iterations performed
    async fn scroll_until_stable<B: BrowserSession>(
        &self,
        browser: &mut B,
        progress: &dyn ProgressSink,
    ) -> u32 {
        let initial_height = browser.scroll_height().await.unwrap_or_else(|e| {
            tracing::debug!("Could not read initial scroll height: {}", e);
            0
        });
        let mut state = PageLoadState::baseline(initial_height);
        let mut scrolls = 0;

        while scrolls < self.limits.max_scrolls {
            if let Err(e) = browser.scroll_to_bottom().await {
                tracing::debug!("Scroll failed: {}", e);
            }
            browser.pause(self.timing.scroll_settle()).await;

            self.click_load_more(browser).await;

            let height = browser
                .scroll_height()
                .await
                .unwrap_or(state.scroll_height);
            let job_count = resolve_live(browser, &self.selectors.cards).await.len();
            scrolls += 1;

            tracing::debug!(
                "Scroll {}: height {} -> {}, jobs {}",
                scrolls,
                state.scroll_height,
                height,
                job_count
            );
            progress.status(&format!("Scrolling to load all jobs... found {} so far", job_count));
            progress.fraction(scrolls as f64 / self.limits.max_scrolls as f64);

            if state.observe(height, job_count) {
                tracing::info!(
                    "Page stable after {} scrolls ({} jobs loaded)",
                    scrolls,
                    job_count
                );
                return scrolls;
            }
            if state.stall_count > 0 {
                tracing::debug!(
                    "No change detected ({}/{})",
                    state.stall_count,
                    crate::state::STALL_LIMIT
                );
            }
        }

        tracing::info!("Stopped scrolling at the limit of {}", self.limits.max_scrolls);
        scrolls
    }

    /// Clicks every visible load-more control
    async fn click_load_more<B: BrowserSession>(&self, browser: &mut B) {
        for button in resolve_live(browser, &self.selectors.load_more).await {
            if !browser.is_interactable(&button).await.unwrap_or(false) {
                continue;
            }
            match browser.click(&button).await {
                Ok(()) => {
                    tracing::info!("Clicked load-more control");
                    browser.pause(self.timing.action_settle()).await;
                }
                Err(e) => tracing::debug!("Load-more click failed: {}", e),
            }
        }
    }

    /// Walks every page, scrolling each to the end before extracting it
    async fn walk_pages<B: BrowserSession>(
        &self,
        browser: &mut B,
        dedup: &mut Deduplicator,
        progress: &dyn ProgressSink,
        report: &mut DiscoveryReport,
    ) -> crate::Result<()> {
        loop {
            report.scrolls += self.scroll_until_stable(browser, progress).await;

            let harvest = harvest_page(browser, self.selectors, &self.card_context, dedup).await?;
            report.pages += 1;
            report.cards_seen += harvest.found;

            tracing::info!(
                "Page {}: {} cards, {} new ({} unique so far)",
                report.pages,
                harvest.found,
                harvest.added,
                dedup.len()
            );
            progress.status(&format!(
                "Processed page {}: {} jobs so far",
                report.pages,
                dedup.len()
            ));
            progress.fraction(page_fraction(report.pages, self.limits.max_pages));

            if report.pages >= self.limits.max_pages {
                tracing::info!("Reached page limit of {}", self.limits.max_pages);
                report.end = DiscoveryEnd::PageLimit;
                return Ok(());
            }

            let Some(next) = find_next_control(browser, &self.selectors.next, true).await else {
                tracing::info!("No next page control, reached the last page");
                report.end = DiscoveryEnd::NoNextPage;
                return Ok(());
            };

            match browser.click(&next).await {
                Ok(()) => {}
                Err(e @ BrowserError::SessionFailure(_)) => return Err(e.into()),
                Err(e) => {
                    tracing::warn!("Error clicking next page: {}", e);
                    report.end = DiscoveryEnd::NoNextPage;
                    return Ok(());
                }
            }
            browser.pause(self.timing.action_settle()).await;

            let loaded =
                wait_for(browser, &self.selectors.cards, self.timing.page_load_timeout()).await;
            match loaded {
                Ok(_) => {}
                Err(BrowserError::Timeout(_)) => {
                    tracing::warn!("Next page did not load any jobs");
                    report.end = DiscoveryEnd::ResultsTimeout;
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[async_trait]
impl<B: BrowserSession> ListingDiscovery<B> for InfiniteScroll {
    fn name(&self) -> &'static str {
        "infinite-scroll"
    }

    async fn discover(
        &self,
        browser: &mut B,
        dedup: &mut Deduplicator,
        progress: &dyn ProgressSink,
    ) -> crate::Result<DiscoveryReport> {
        let mut report = DiscoveryReport::new(DiscoveryEnd::NoNextPage);

        tracing::info!(
            "Harvesting job board {}{}",
            self.start_url,
            self.keyword()
                .map(|k| format!(", filtering by keyword '{}'", k))
                .unwrap_or_default()
        );
        progress.status("Opening job board");

        match browser.navigate(&self.start_url).await {
            Ok(()) => {}
            Err(e @ BrowserError::SessionFailure(_)) => return Err(e.into()),
            Err(e) => {
                tracing::error!("Could not open {}: {}", self.start_url, e);
                report.end = DiscoveryEnd::ListingUnavailable;
                return Ok(report);
            }
        }
        dismiss_popups(browser).await;

        let loaded = wait_for(
            browser,
            &self.selectors.results_ready,
            self.timing.results_timeout(),
        )
        .await;
        match loaded {
            Ok(_) => tracing::info!("Job listings loaded"),
            Err(BrowserError::Timeout(_)) => {
                tracing::warn!("Timed out waiting for job listings to load");
                report.end = DiscoveryEnd::ResultsTimeout;
                return Ok(report);
            }
            Err(e) => return Err(e.into()),
        }

        let searched = match self.keyword() {
            Some(keyword) => self.native_search(browser, keyword).await?,
            None => true,
        };

        if searched {
            self.walk_pages(browser, dedup, progress, &mut report).await?;
        } else {
            tracing::warn!("Search returned no job listings");
            report.end = DiscoveryEnd::ResultsTimeout;
        }

        // Applied whether or not the board searched natively, so both paths
        // keep exactly the titles containing the keyword
        if let Some(keyword) = self.keyword() {
            let before = dedup.len();
            dedup.retain(|record| title_matches(record, keyword));
            report.filtered_out = before - dedup.len();
            tracing::info!(
                "Filtered from {} to {} jobs matching '{}'",
                before,
                dedup.len(),
                keyword
            );
        }

        Ok(report)
    }
}
