use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Command-line values that take precedence over the configuration file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub keyword: Option<String>,
    pub location: Option<String>,
    pub max_pages: Option<u32>,
    pub enrichment_cap: Option<u32>,
    pub headless: Option<bool>,
}

impl ConfigOverrides {
    /// Returns true if no override is set
    pub fn is_empty(&self) -> bool {
        self.keyword.is_none()
            && self.location.is_none()
            && self.max_pages.is_none()
            && self.enrichment_cap.is_none()
            && self.headless.is_none()
    }
}

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use job_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Max pages: {}", config.limits.max_pages);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The hash identifies which configuration produced an archived run.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Applies command-line overrides and re-validates the result
///
/// # Arguments
///
/// * `config` - The configuration loaded from file
/// * `overrides` - Values supplied on the command line
///
/// # Returns
///
/// * `Ok(Config)` - The merged configuration
/// * `Err(ConfigError)` - The merged configuration is invalid
pub fn apply_overrides(
    mut config: Config,
    overrides: &ConfigOverrides,
) -> Result<Config, ConfigError> {
    if let Some(keyword) = &overrides.keyword {
        config.search.keyword = keyword.clone();
    }
    if let Some(location) = &overrides.location {
        config.search.location = Some(location.clone());
    }
    if let Some(max_pages) = overrides.max_pages {
        config.limits.max_pages = max_pages;
    }
    if let Some(cap) = overrides.enrichment_cap {
        config.limits.enrichment_cap = cap;
    }
    if let Some(headless) = overrides.headless {
        config.browser.headless = headless;
    }

    validate(&config)?;
    Ok(config)
}
