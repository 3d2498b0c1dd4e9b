use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Main configuration structure for Job Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub search: SearchConfig,
    pub limits: LimitsConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Which listing surface is being harvested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Search form, then numbered result pages
    Paginated,
    /// Scroll until stable, then paginate
    InfiniteScroll,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paginated => "paginated",
            Self::InfiniteScroll => "infinite-scroll",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Discovery strategy for this site
    pub strategy: Strategy,

    /// Page the harvest starts from
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Company name used when a card carries no department
    #[serde(default)]
    pub company: Option<String>,

    /// Canonical job URL with an `{id}` placeholder, used when a card has no anchor
    #[serde(rename = "job-url-template", default)]
    pub job_url_template: Option<String>,
}

/// Search parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchConfig {
    /// Keyword typed into the search box (or used as a title filter)
    #[serde(default)]
    pub keyword: String,

    /// Location filter, best-effort
    #[serde(default)]
    pub location: Option<String>,
}

/// Hard ceilings that guarantee termination
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum number of listing pages to extract
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Maximum scroll iterations per listing page
    #[serde(rename = "max-scrolls", default = "default_max_scrolls")]
    pub max_scrolls: u32,

    /// Maximum number of records to enrich from their detail pages
    #[serde(rename = "enrichment-cap", default)]
    pub enrichment_cap: u32,
}

/// Browser session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Explicit Chrome/Chromium executable
    #[serde(rename = "chrome-path", default)]
    pub chrome_path: Option<String>,

    #[serde(rename = "window-width", default = "default_window_width")]
    pub window_width: u32,

    #[serde(rename = "window-height", default = "default_window_height")]
    pub window_height: u32,

    #[serde(rename = "user-agent", default)]
    pub user_agent: Option<String>,

    /// Timeout for a single DevTools request
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            window_width: default_window_width(),
            window_height: default_window_height(),
            user_agent: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Settle delays and bounded-wait timeouts
#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    /// Pause after each scroll before re-measuring the page
    #[serde(rename = "scroll-settle-ms", default = "default_scroll_settle")]
    pub scroll_settle_ms: u64,

    /// Pause before advancing to the next listing page
    #[serde(rename = "page-delay-ms", default = "default_page_delay")]
    pub page_delay_ms: u64,

    /// Pause after clicking a control that changes the page (search, next, load more)
    #[serde(rename = "action-settle-ms", default = "default_action_settle")]
    pub action_settle_ms: u64,

    /// Pause after opening a detail page
    #[serde(rename = "detail-settle-ms", default = "default_detail_settle")]
    pub detail_settle_ms: u64,

    /// Wait for the search form to appear
    #[serde(rename = "search-form-timeout-secs", default = "default_search_form_timeout")]
    pub search_form_timeout_secs: u64,

    /// Wait for the first listing cards to appear
    #[serde(rename = "results-timeout-secs", default = "default_results_timeout")]
    pub results_timeout_secs: u64,

    /// Wait for an individual control (filter, apply, next)
    #[serde(rename = "control-timeout-secs", default = "default_control_timeout")]
    pub control_timeout_secs: u64,

    /// Wait for cards to reappear after a page change
    #[serde(rename = "page-load-timeout-secs", default = "default_page_load_timeout")]
    pub page_load_timeout_secs: u64,
}

impl TimingConfig {
    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn action_settle(&self) -> Duration {
        Duration::from_millis(self.action_settle_ms)
    }

    pub fn detail_settle(&self) -> Duration {
        Duration::from_millis(self.detail_settle_ms)
    }

    pub fn search_form_timeout(&self) -> Duration {
        Duration::from_secs(self.search_form_timeout_secs)
    }

    pub fn results_timeout(&self) -> Duration {
        Duration::from_secs(self.results_timeout_secs)
    }

    pub fn control_timeout(&self) -> Duration {
        Duration::from_secs(self.control_timeout_secs)
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            scroll_settle_ms: default_scroll_settle(),
            page_delay_ms: default_page_delay(),
            action_settle_ms: default_action_settle(),
            detail_settle_ms: default_detail_settle(),
            search_form_timeout_secs: default_search_form_timeout(),
            results_timeout_secs: default_results_timeout(),
            control_timeout_secs: default_control_timeout(),
            page_load_timeout_secs: default_page_load_timeout(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// CSV file for the harvested records; timestamped name when absent
    #[serde(rename = "csv-path", default)]
    pub csv_path: Option<String>,

    /// SQLite archive of runs and records
    #[serde(rename = "database-path", default)]
    pub database_path: Option<String>,

    /// Markdown run report
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_max_scrolls() -> u32 {
    20
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_scroll_settle() -> u64 {
    1500
}

fn default_page_delay() -> u64 {
    2000
}

fn default_action_settle() -> u64 {
    3000
}

fn default_detail_settle() -> u64 {
    3000
}

fn default_search_form_timeout() -> u64 {
    20
}

fn default_results_timeout() -> u64 {
    15
}

fn default_control_timeout() -> u64 {
    5
}

fn default_page_load_timeout() -> u64 {
    10
}
