//! Job Harvest: a browser-driven job listing harvester
//!
//! This crate drives a browser session across career sites that render their
//! listings client-side, turns each listing card into a [`JobRecord`], removes
//! repeats, and enriches every record with the qualification sections found on
//! its detail page.

pub mod browser;
pub mod config;
pub mod dedup;
pub mod discovery;
pub mod enrich;
pub mod extract;
pub mod harvest;
pub mod output;
pub mod records;
pub mod state;
pub mod storage;

use thiserror::Error;

pub use browser::BrowserError;

/// Main error type for run-level failures
///
/// Per-card and per-field problems never surface here; they are absorbed
/// where they happen. Only session failures and the errors of the ambient
/// layers (configuration, storage, output) reach the caller.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Invalid phase transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::PaginatedPhase,
        to: state::PaginatedPhase,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use dedup::Deduplicator;
pub use harvest::{HarvestReport, Harvester};
pub use records::{DetailRecord, JobRecord};
