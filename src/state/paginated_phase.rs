//! Phases of the paginated search-and-filter strategy
//!
//! ```text
//! Init -> SearchSubmitted -> ResultsLoaded -> (ExtractPage -> AdvancePage -> ResultsLoaded)* -> Terminal
//! ```
//!
//! Every non-terminal phase may also jump straight to `Terminal` when a
//! bounded wait expires or the page ceiling is reached.

use crate::HarvestError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaginatedPhase {
    /// Search form not yet submitted
    Init,

    /// Keyword typed, location filter attempted, search triggered
    SearchSubmitted,

    /// Job cards are present on the current page
    ResultsLoaded,

    /// Cards on the current page are being extracted
    ExtractPage,

    /// Looking for and clicking the next-page control
    AdvancePage,

    /// No further pages will be visited
    Terminal,
}

impl PaginatedPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal)
    }

    /// Returns true if `next` is a legal successor of this phase
    pub fn can_transition_to(&self, next: PaginatedPhase) -> bool {
        use PaginatedPhase::*;

        match (self, next) {
            (Terminal, _) => false,
            (_, Terminal) => true,
            (Init, SearchSubmitted) => true,
            (SearchSubmitted, ResultsLoaded) => true,
            (ResultsLoaded, ExtractPage) => true,
            (ExtractPage, AdvancePage) => true,
            (AdvancePage, ResultsLoaded) => true,
            _ => false,
        }
    }

    /// Moves to `next`, rejecting transitions the state machine does not allow
    ///
    /// # Returns
    ///
    /// * `Ok(PaginatedPhase)` - The new phase
    /// * `Err(HarvestError::InvalidTransition)` - `next` is not a successor of `self`
    pub fn transition(self, next: PaginatedPhase) -> Result<PaginatedPhase, HarvestError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(HarvestError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::SearchSubmitted => "search_submitted",
            Self::ResultsLoaded => "results_loaded",
            Self::ExtractPage => "extract_page",
            Self::AdvancePage => "advance_page",
            Self::Terminal => "terminal",
        }
    }
}

impl fmt::Display for PaginatedPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
