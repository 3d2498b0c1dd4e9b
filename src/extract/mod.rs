//! Field extraction from DOM snapshots
//!
//! Listing cards and detail pages are read from a snapshot of the page
//! source rather than through live element handles, so extraction cannot be
//! interrupted by stale references and is testable without a browser.
//!
//! # Components
//!
//! - `selectors`: Static selector tables per listing surface
//! - `resolver`: Ordered-fallback query resolution
//! - `card`: Listing card to `JobRecord`
//! - `section`: Heading-bounded qualification text

pub mod card;
pub mod resolver;
pub mod section;
pub mod selectors;

pub use card::{extract_card, extract_cards, CardContext};
pub use resolver::{element_text, resolve, resolve_text};
pub use section::{extract_section, is_heading, HEADING_SELECTOR};
pub use selectors::{Query, SelectorList, SiteSelectors, CAREERS_SEARCH, JOB_BOARD};
