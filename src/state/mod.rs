//! State module for tracking discovery progress
//!
//! # Components
//!
//! - `PageLoadState`: Stall detection for the infinite-scroll loop
//! - `PaginatedPhase`: The phase machine driving the paginated strategy

mod page_load;
mod paginated_phase;

// Re-export main types
pub use page_load::{PageLoadState, STALL_LIMIT};
pub use paginated_phase::PaginatedPhase;
