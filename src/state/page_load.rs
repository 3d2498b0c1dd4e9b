//! Scroll progress tracking for the infinite-scroll strategy
//!
//! A single unchanged reading is ambiguous (a slow network tick looks the
//! same as an exhausted list), so the scroll loop only stops after
//! [`STALL_LIMIT`] consecutive readings without progress.

/// Consecutive no-progress readings that end the scroll loop
pub const STALL_LIMIT: u8 = 3;

/// Snapshot of how much content the listing page has loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLoadState {
    /// `document.body.scrollHeight` at the last reading
    pub scroll_height: i64,

    /// Number of job cards visible at the last reading
    pub visible_job_count: usize,

    /// Consecutive readings in which neither value changed (0..=STALL_LIMIT)
    pub stall_count: u8,
}

impl PageLoadState {
    /// Creates the state measured before the first scroll
    ///
    /// The job count starts at zero so that the first reading which finds
    /// cards always counts as progress.
    pub fn baseline(scroll_height: i64) -> Self {
        Self {
            scroll_height,
            visible_job_count: 0,
            stall_count: 0,
        }
    }

    /// Records a new reading
    ///
    /// # Arguments
    ///
    /// * `scroll_height` - Page height after the scroll settled
    /// * `visible_job_count` - Number of cards currently in the DOM
    ///
    /// # Returns
    ///
    /// * `true` - The page has stopped loading and the loop should end
    /// * `false` - Keep scrolling
    pub fn observe(&mut self, scroll_height: i64, visible_job_count: usize) -> bool {
        if scroll_height == self.scroll_height && visible_job_count == self.visible_job_count {
            self.stall_count = (self.stall_count + 1).min(STALL_LIMIT);
        } else {
            self.stall_count = 0;
        }

        self.scroll_height = scroll_height;
        self.visible_job_count = visible_job_count;
        self.is_stable()
    }

    /// Returns true once the stall limit has been reached
    pub fn is_stable(&self) -> bool {
        self.stall_count >= STALL_LIMIT
    }
}
