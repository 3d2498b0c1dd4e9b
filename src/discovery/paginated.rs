//! Paginated search-and-filter strategy
//!
//! Fills the search form, waits for results, then extracts page after page
//! through the next control. The page counter is a hard ceiling, so the loop
//! ends even if the disabled state of the next control is never detected.

use crate::browser::{
    resolve_live, wait_for, wait_for_clickable, BrowserError, BrowserSession,
};
use crate::config::{Config, LimitsConfig, SearchConfig, TimingConfig};
use crate::dedup::Deduplicator;
use crate::discovery::{
    find_next_control, harvest_page, page_fraction, DiscoveryEnd, DiscoveryReport,
    ListingDiscovery,
};
use crate::extract::{CardContext, SiteSelectors, CAREERS_SEARCH};
use crate::output::ProgressSink;
use crate::state::PaginatedPhase;
use async_trait::async_trait;
use std::time::Duration;

/// Pause between form interactions
const FORM_STEP: Duration = Duration::from_secs(1);

/// Result of trying to move to the next page
enum Advance {
    Moved,
    NoNextPage,
    LoadTimeout,
}

/// Strategy for search-and-filter careers sites with numbered result pages
#[derive(Debug, Clone)]
pub struct Paginated {
    start_url: String,
    search: SearchConfig,
    limits: LimitsConfig,
    timing: TimingConfig,
    card_context: CardContext,
    selectors: &'static SiteSelectors,
}

impl Paginated {
    pub fn from_config(config: &Config) -> Self {
        Self {
            start_url: config.site.start_url.clone(),
            search: config.search.clone(),
            limits: config.limits.clone(),
            timing: config.timing.clone(),
            card_context: CardContext::new(&config.site.start_url)
                .with_company(config.site.company.clone())
                .with_job_url_template(config.site.job_url_template.clone()),
            selectors: &CAREERS_SEARCH,
        }
    }

    /// Types the keyword, applies the location filter, and triggers the search
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The search was submitted
    /// * `Ok(false)` - The search form never appeared
    async fn submit_search<B: BrowserSession>(&self, browser: &mut B) -> crate::Result<bool> {
        let inputs = match wait_for(
            browser,
            &self.selectors.search_input,
            self.timing.search_form_timeout(),
        )
        .await
        {
            Ok(inputs) => inputs,
            Err(BrowserError::Timeout(what)) => {
                tracing::warn!("Search form did not appear (waited for {})", what);
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        let Some(input) = inputs.first() else {
            return Ok(false);
        };
        match browser.type_text(input, &self.search.keyword, false).await {
            Ok(()) => {}
            Err(e @ BrowserError::SessionFailure(_)) => return Err(e.into()),
            Err(e) => {
                tracing::warn!("Could not type into the search input: {}", e);
                return Ok(false);
            }
        }
        browser.pause(FORM_STEP).await;

        if let Some(location) = &self.search.location {
            if let Err(e) = self.select_location(browser, location).await {
                tracing::warn!("Could not set location filter to '{}': {}", location, e);
            }
        }

        let submitted = match wait_for_clickable(
            browser,
            &self.selectors.search_button,
            self.timing.control_timeout(),
        )
        .await
        {
            Ok(button) => browser.click(&button).await,
            Err(e) => {
                tracing::warn!("Search button unavailable ({}), submitting from the input", e);
                self.submit_from_input(browser).await
            }
        };
        match submitted {
            Ok(()) => {}
            Err(e @ BrowserError::SessionFailure(_)) => return Err(e.into()),
            Err(e) => tracing::warn!("Search submission failed: {}", e),
        }

        browser.pause(self.timing.action_settle()).await;
        Ok(true)
    }

    /// Presses Enter in a freshly located search input
    async fn submit_from_input<B: BrowserSession>(
        &self,
        browser: &mut B,
    ) -> Result<(), BrowserError> {
        let input = resolve_live(browser, &self.selectors.search_input)
            .await
            .into_iter()
            .next()
            .ok_or_else(|| BrowserError::ElementNotFound("search input".to_string()))?;
        browser.type_text(&input, &self.search.keyword, true).await
    }

    /// Opens the location filter and picks the option naming `location`
    ///
    /// Best effort: the caller logs the error and carries on.
    async fn select_location<B: BrowserSession>(
        &self,
        browser: &mut B,
        location: &str,
    ) -> Result<(), BrowserError> {
        let filter = wait_for_clickable(
            browser,
            &self.selectors.location_filter,
            self.timing.control_timeout(),
        )
        .await?;
        browser.click(&filter).await?;
        browser.pause(FORM_STEP).await;

        let mut chosen = None;
        for option in browser.find_all(self.selectors.location_option).await? {
            let text = browser.text(&option).await.unwrap_or_default();
            if text.contains(location) && browser.is_interactable(&option).await.unwrap_or(false) {
                chosen = Some(option);
                break;
            }
        }
        let option = chosen.ok_or_else(|| {
            BrowserError::ElementNotFound(format!("location option '{}'", location))
        })?;
        browser.click(&option).await?;
        browser.pause(FORM_STEP).await;

        // Some filters apply immediately and have no Apply button
        let apply =
            wait_for_clickable(browser, &self.selectors.apply, self.timing.control_timeout()).await;
        match apply {
            Ok(apply) => browser.click(&apply).await?,
            Err(e) => tracing::debug!("No apply button: {}", e),
        }

        tracing::info!("Location filter set to '{}'", location);
        Ok(())
    }

    /// Clicks the next control and waits for the new page
    async fn advance<B: BrowserSession>(&self, browser: &mut B) -> crate::Result<Advance> {
        let Some(next) = find_next_control(browser, &self.selectors.next, false).await else {
            return Ok(Advance::NoNextPage);
        };

        if let Err(e) = browser.scroll_into_view(&next).await {
            tracing::debug!("Could not scroll next control into view: {}", e);
        }
        browser.pause(FORM_STEP).await;

        match browser.click(&next).await {
            Ok(()) => {}
            Err(e @ BrowserError::SessionFailure(_)) => return Err(e.into()),
            Err(e) => {
                tracing::warn!("Next control could not be clicked: {}", e);
                return Ok(Advance::NoNextPage);
            }
        }
        browser.pause(self.timing.action_settle()).await;

        match wait_for(browser, &self.selectors.cards, self.timing.page_load_timeout()).await {
            Ok(_) => Ok(Advance::Moved),
            Err(BrowserError::Timeout(_)) => Ok(Advance::LoadTimeout),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl<B: BrowserSession> ListingDiscovery<B> for Paginated {
    fn name(&self) -> &'static str {
        "paginated"
    }

    async fn discover(
        &self,
        browser: &mut B,
        dedup: &mut Deduplicator,
        progress: &dyn ProgressSink,
    ) -> crate::Result<DiscoveryReport> {
        let mut report = DiscoveryReport::new(DiscoveryEnd::NoNextPage);
        let mut phase = PaginatedPhase::Init;

        tracing::info!(
            "Searching '{}' for '{}'{}",
            self.start_url,
            self.search.keyword,
            self.search
                .location
                .as_deref()
                .map(|l| format!(" in {}", l))
                .unwrap_or_default()
        );
        progress.status("Opening search page");

        match browser.navigate(&self.start_url).await {
            Ok(()) => {}
            Err(e @ BrowserError::SessionFailure(_)) => return Err(e.into()),
            Err(e) => {
                tracing::error!("Could not open {}: {}", self.start_url, e);
                report.end = DiscoveryEnd::ListingUnavailable;
                return Ok(report);
            }
        }

        if !self.submit_search(browser).await? {
            phase.transition(PaginatedPhase::Terminal)?;
            report.end = DiscoveryEnd::ListingUnavailable;
            return Ok(report);
        }
        phase = phase.transition(PaginatedPhase::SearchSubmitted)?;
        progress.status("Search submitted, waiting for results");

        let results =
            wait_for(browser, &self.selectors.results_ready, self.timing.results_timeout()).await;
        match results {
            Ok(_) => {}
            Err(BrowserError::Timeout(_)) => {
                tracing::warn!("No search results within {:?}", self.timing.results_timeout());
                phase.transition(PaginatedPhase::Terminal)?;
                report.end = DiscoveryEnd::ResultsTimeout;
                return Ok(report);
            }
            Err(e) => return Err(e.into()),
        }
        phase = phase.transition(PaginatedPhase::ResultsLoaded)?;

        loop {
            phase = phase.transition(PaginatedPhase::ExtractPage)?;
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
                "Page {} of at most {}: {} jobs so far",
                report.pages,
                self.limits.max_pages,
                dedup.len()
            ));
            progress.fraction(page_fraction(report.pages, self.limits.max_pages));

            if report.pages >= self.limits.max_pages {
                tracing::info!("Reached page limit of {}", self.limits.max_pages);
                report.end = DiscoveryEnd::PageLimit;
                break;
            }

            phase = phase.transition(PaginatedPhase::AdvancePage)?;
            browser.pause(self.timing.page_delay()).await;

            match self.advance(browser).await? {
                Advance::Moved => {
                    phase = phase.transition(PaginatedPhase::ResultsLoaded)?;
                }
                Advance::NoNextPage => {
                    tracing::info!("No further result pages");
                    report.end = DiscoveryEnd::NoNextPage;
                    break;
                }
                Advance::LoadTimeout => {
                    tracing::warn!(
                        "Next page did not load within {:?}",
                        self.timing.page_load_timeout()
                    );
                    report.end = DiscoveryEnd::ResultsTimeout;
                    break;
                }
            }
        }

        let phase = phase.transition(PaginatedPhase::Terminal)?;
        tracing::debug!("Paginated discovery finished in phase {}", phase);

        Ok(report)
    }
}
