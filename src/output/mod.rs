//! Output module for run results
//!
//! This module handles:
//! - Progress reporting while a run is underway
//! - Exporting and re-importing records as CSV
//! - Generating a markdown report of a finished run

pub mod csv;
mod markdown;
mod progress;

pub use markdown::{format_markdown_report, write_markdown_report};
pub use progress::{LogProgress, NoopProgress, ProgressSink};

use thiserror::Error;

/// Errors that can occur while writing or reading output files
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed input: {0}")]
    Format(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
