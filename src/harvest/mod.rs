//! Harvest coordinator - run orchestration
//!
//! This module ties the phases of a run together:
//! - Listing discovery with the configured strategy
//! - Deduplication in first-seen order
//! - Detail enrichment of the surviving records, up to the cap
//!
//! The browser session is owned by the coordinator and handed to one phase
//! at a time.

use crate::browser::BrowserSession;
use crate::config::Config;
use crate::dedup::Deduplicator;
use crate::discovery::{strategy_for, DiscoveryReport};
use crate::enrich::{Enricher, EnrichmentReport};
use crate::output::{LogProgress, ProgressSink};
use crate::records::DetailRecord;
use chrono::{DateTime, Utc};

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct HarvestReport {
    /// Discovery strategy name, or "enrich-only" for CSV enrichment
    pub strategy: &'static str,
    pub keyword: String,
    pub location: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Absent when the run only enriched existing records
    pub discovery: Option<DiscoveryReport>,

    /// Cards dropped because their (title, url) pair was already seen
    pub duplicates: usize,

    /// Cards dropped because they had no title or no url
    pub rejected: usize,

    pub enrichment: EnrichmentReport,

    /// Harvested records in discovery order
    pub records: Vec<DetailRecord>,
}

impl HarvestReport {
    /// Returns true if the enricher looked at any record
    pub fn enriched(&self) -> bool {
        self.enrichment.attempted > 0 || self.enrichment.skipped > 0
    }

    /// Returns true if discovery stopped on a listing-load failure
    pub fn is_partial(&self) -> bool {
        self.discovery
            .as_ref()
            .map(|d| d.end.is_failure())
            .unwrap_or(false)
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Runs discovery and enrichment over one browser session
pub struct Harvester<B: BrowserSession> {
    config: Config,
    browser: B,
    progress: Box<dyn ProgressSink>,
}

impl<B: BrowserSession> Harvester<B> {
    /// Creates a harvester that reports progress through the log
    ///
    /// # Arguments
    ///
    /// * `config` - Validated harvest configuration
    /// * `browser` - The session every phase drives
    pub fn new(config: Config, browser: B) -> Self {
        Self {
            config,
            browser,
            progress: Box::new(LogProgress),
        }
    }

    pub fn with_progress(mut self, progress: Box<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the browser session, e.g. to close it
    pub fn into_browser(self) -> B {
        self.browser
    }

    /// Harvests the configured site
    ///
    /// # Returns
    ///
    /// * `Ok(HarvestReport)` - The run finished, possibly with partial results
    /// * `Err(HarvestError)` - The browser session failed
    pub async fn run(&mut self) -> crate::Result<HarvestReport> {
        let started_at = Utc::now();
        let strategy = strategy_for::<B>(&self.config);

        tracing::info!(
            "Starting {} harvest of {}",
            strategy.name(),
            self.config.site.start_url
        );

        let mut dedup = Deduplicator::new();
        let discovery = strategy
            .discover(&mut self.browser, &mut dedup, self.progress.as_ref())
            .await?;

        tracing::info!(
            "Discovery ended ({}): {} pages, {} unique records, {} duplicates, {} rejected",
            discovery.end,
            discovery.pages,
            dedup.len(),
            dedup.duplicates(),
            dedup.rejected()
        );

        let duplicates = dedup.duplicates();
        let rejected = dedup.rejected();
        let records: Vec<DetailRecord> = dedup
            .into_records()
            .into_iter()
            .map(DetailRecord::from)
            .collect();

        let (records, enrichment) = self.enrich_records(records).await?;

        Ok(HarvestReport {
            strategy: strategy.name(),
            keyword: self.config.search.keyword.clone(),
            location: self.config.search.location.clone(),
            started_at,
            finished_at: Utc::now(),
            discovery: Some(discovery),
            duplicates,
            rejected,
            enrichment,
            records,
        })
    }

    /// Enriches records loaded from an earlier run, skipping discovery
    pub async fn enrich_existing(
        &mut self,
        records: Vec<DetailRecord>,
    ) -> crate::Result<HarvestReport> {
        let started_at = Utc::now();
        tracing::info!("Enriching {} existing records", records.len());

        let (records, enrichment) = self.enrich_records(records).await?;

        Ok(HarvestReport {
            strategy: "enrich-only",
            keyword: self.config.search.keyword.clone(),
            location: self.config.search.location.clone(),
            started_at,
            finished_at: Utc::now(),
            discovery: None,
            duplicates: 0,
            rejected: 0,
            enrichment,
            records,
        })
    }

    async fn enrich_records(
        &mut self,
        records: Vec<DetailRecord>,
    ) -> crate::Result<(Vec<DetailRecord>, EnrichmentReport)> {
        if self.config.limits.enrichment_cap == 0 || records.is_empty() {
            tracing::info!("Skipping enrichment");
            return Ok((records, EnrichmentReport::default()));
        }

        self.progress.status("Extracting detailed job information");
        Enricher::from_config(&self.config)
            .enrich(&mut self.browser, records, self.progress.as_ref())
            .await
    }
}
