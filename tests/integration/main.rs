//! Integration tests for listing discovery and enrichment
//!
//! Every test drives the real strategies and enricher against
//! `FixtureBrowser`, so no Chrome instance is needed.

mod enrich_tests;
mod fixture;
mod infinite_scroll_tests;
mod paginated_tests;
