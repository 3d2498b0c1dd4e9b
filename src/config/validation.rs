use crate::config::types::{
    BrowserConfig, Config, LimitsConfig, SiteConfig, Strategy, TimingConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_search(config)?;
    validate_limits(&config.limits)?;
    validate_browser_config(&config.browser)?;
    validate_timing(&config.timing)?;
    Ok(())
}

/// Validates the target site
fn validate_site_config(site: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&site.start_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid start-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "start-url '{}' must use http or https",
            site.start_url
        )));
    }

    if let Some(company) = &site.company {
        if company.trim().is_empty() {
            return Err(ConfigError::Validation(
                "company cannot be blank when set".to_string(),
            ));
        }
    }

    if let Some(template) = &site.job_url_template {
        if !template.contains("{id}") {
            return Err(ConfigError::Validation(format!(
                "job-url-template must contain an {{id}} placeholder, got '{}'",
                template
            )));
        }

        Url::parse(&template.replace("{id}", "0")).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid job-url-template '{}': {}", template, e))
        })?;
    }

    Ok(())
}

/// The search form of the paginated surface cannot be submitted without a keyword
fn validate_search(config: &Config) -> Result<(), ConfigError> {
    if config.site.strategy == Strategy::Paginated && config.search.keyword.trim().is_empty() {
        return Err(ConfigError::Validation(
            "keyword is required for the paginated strategy".to_string(),
        ));
    }

    Ok(())
}

/// Validates the termination ceilings
fn validate_limits(limits: &LimitsConfig) -> Result<(), ConfigError> {
    if limits.max_pages < 1 || limits.max_pages > 100 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be between 1 and 100, got {}",
            limits.max_pages
        )));
    }

    if limits.max_scrolls < 1 || limits.max_scrolls > 500 {
        return Err(ConfigError::Validation(format!(
            "max-scrolls must be between 1 and 500, got {}",
            limits.max_scrolls
        )));
    }

    if limits.enrichment_cap > 500 {
        return Err(ConfigError::Validation(format!(
            "enrichment-cap must be <= 500, got {}",
            limits.enrichment_cap
        )));
    }

    Ok(())
}

/// Validates browser launch options
fn validate_browser_config(browser: &BrowserConfig) -> Result<(), ConfigError> {
    if browser.window_width < 320 || browser.window_height < 240 {
        return Err(ConfigError::Validation(format!(
            "window size must be at least 320x240, got {}x{}",
            browser.window_width, browser.window_height
        )));
    }

    if browser.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    if let Some(path) = &browser.chrome_path {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "chrome-path cannot be blank when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Every bounded wait needs a non-zero timeout
fn validate_timing(timing: &TimingConfig) -> Result<(), ConfigError> {
    let timeouts = [
        ("search-form-timeout-secs", timing.search_form_timeout_secs),
        ("results-timeout-secs", timing.results_timeout_secs),
        ("control-timeout-secs", timing.control_timeout_secs),
        ("page-load-timeout-secs", timing.page_load_timeout_secs),
    ];

    for (name, value) in timeouts {
        if value == 0 || value > 120 {
            return Err(ConfigError::Validation(format!(
                "{} must be between 1 and 120, got {}",
                name, value
            )));
        }
    }

    Ok(())
}
