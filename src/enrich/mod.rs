//! Detail page enrichment
//!
//! Visits the detail page of each harvested record, up to a cap, and fills
//! in the minimum and preferred qualification sections. A page that fails
//! to load or has no recognizable headings leaves the record's fields empty;
//! the batch always carries on with the next record.

mod markers;

pub use markers::{classify, SectionKind, MINIMUM_MARKERS, PREFERRED_MARKERS};

use crate::browser::{BrowserError, BrowserSession};
use crate::config::Config;
use crate::extract::{element_text, extract_section, HEADING_SELECTOR};
use crate::output::ProgressSink;
use crate::records::{is_sentinel, DetailRecord};
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Qualification text found on one detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Qualifications {
    pub minimum: String,
    pub preferred: String,
}

/// Counters for one enrichment pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    /// Detail pages visited
    pub attempted: usize,

    /// Records that received at least one qualification section
    pub enriched: usize,

    /// Records within the cap that had no usable URL
    pub skipped: usize,

    /// Detail pages that failed to load or snapshot
    pub failed: usize,

    /// Records left untouched because of the cap
    pub beyond_cap: usize,
}

/// Extracts both qualification sections from a detail page snapshot
///
/// Headings are examined in document order; the first heading of each kind
/// wins and later ones are ignored.
pub fn enrich_from_html(html: &str) -> Qualifications {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse(HEADING_SELECTOR) else {
        return Qualifications::default();
    };

    let mut minimum = None;
    let mut preferred = None;

    for heading in document.select(&selector) {
        match classify(&element_text(heading)) {
            Some(SectionKind::Minimum) if minimum.is_none() => {
                minimum = Some(extract_section(heading));
            }
            Some(SectionKind::Preferred) if preferred.is_none() => {
                preferred = Some(extract_section(heading));
            }
            _ => {}
        }

        if minimum.is_some() && preferred.is_some() {
            break;
        }
    }

    Qualifications {
        minimum: minimum.unwrap_or_default(),
        preferred: preferred.unwrap_or_default(),
    }
}

/// Visits detail pages and fills in qualification sections
#[derive(Debug, Clone)]
pub struct Enricher {
    cap: usize,
    detail_settle: Duration,
}

impl Enricher {
    pub fn new(cap: usize, detail_settle: Duration) -> Self {
        Self { cap, detail_settle }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.limits.enrichment_cap as usize,
            config.timing.detail_settle(),
        )
    }

    /// Enriches `records` in order, up to the cap
    ///
    /// # Arguments
    ///
    /// * `browser` - Session used to open each detail page
    /// * `records` - Records to enrich; order is preserved
    /// * `progress` - Receives a status line per record
    ///
    /// # Returns
    ///
    /// * `Ok((records, report))` - Every input record, enriched where possible
    /// * `Err(HarvestError::Browser)` - The browser session itself failed
    pub async fn enrich<B: BrowserSession>(
        &self,
        browser: &mut B,
        mut records: Vec<DetailRecord>,
        progress: &dyn ProgressSink,
    ) -> crate::Result<(Vec<DetailRecord>, EnrichmentReport)> {
        let mut report = EnrichmentReport::default();
        let limit = self.cap.min(records.len());
        report.beyond_cap = records.len() - limit;

        info!("Enriching {} of {} records", limit, records.len());

        for (index, detail) in records.iter_mut().take(limit).enumerate() {
            progress.status(&format!(
                "Extracting details for job {}/{}: {}",
                index + 1,
                limit,
                detail.record.title
            ));
            progress.fraction(index as f64 / limit as f64);

            if is_sentinel(&detail.record.url) {
                debug!("Skipping '{}': no detail URL", detail.record.title);
                report.skipped += 1;
                continue;
            }

            report.attempted += 1;
            match self.fetch(browser, &detail.record.url).await {
                Ok(found) => {
                    detail.minimum_qualifications = found.minimum;
                    detail.preferred_qualifications = found.preferred;
                    if detail.is_enriched() {
                        report.enriched += 1;
                    } else {
                        debug!("No qualification headings on {}", detail.record.url);
                    }
                }
                Err(e @ BrowserError::SessionFailure(_)) => return Err(e.into()),
                Err(e) => {
                    warn!(
                        "Failed to enrich '{}' ({}): {}",
                        detail.record.title, detail.record.url, e
                    );
                    report.failed += 1;
                }
            }
        }

        if limit > 0 {
            progress.fraction(1.0);
        }
        info!(
            "Enrichment finished: {} enriched, {} failed, {} skipped",
            report.enriched, report.failed, report.skipped
        );

        Ok((records, report))
    }

    async fn fetch<B: BrowserSession>(
        &self,
        browser: &mut B,
        url: &str,
    ) -> Result<Qualifications, BrowserError> {
        browser.navigate(url).await?;
        browser.pause(self.detail_settle).await;
        let source = browser.page_source().await?;
        Ok(enrich_from_html(&source))
    }
}
