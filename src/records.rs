//! Harvested record types
//!
//! Every field of a [`JobRecord`] is always populated: data that cannot be
//! extracted is replaced by one of the sentinel strings below, never left
//! empty.

// ===== Sentinels =====

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_LOCATION: &str = "Unknown Location";
pub const UNKNOWN_DATE: &str = "Unknown Date";
pub const UNKNOWN_URL: &str = "Unknown URL";
pub const UNKNOWN_DEPARTMENT: &str = "Unknown Department";

/// Returns true if `value` is one of the sentinel placeholders
pub fn is_sentinel(value: &str) -> bool {
    matches!(
        value,
        UNKNOWN_TITLE | UNKNOWN_LOCATION | UNKNOWN_DATE | UNKNOWN_URL | UNKNOWN_DEPARTMENT
    )
}

/// One job listing as read from a listing card
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobRecord {
    pub title: String,
    pub location: String,
    pub department_or_company: String,
    /// Free text such as "3 days ago"
    pub posted_age: String,
    pub url: String,
}

impl JobRecord {
    /// Returns true if the record carries a real (title, url) identity pair
    pub fn has_identity(&self) -> bool {
        self.title != UNKNOWN_TITLE
            && self.url != UNKNOWN_URL
            && !self.title.is_empty()
            && !self.url.is_empty()
    }
}

impl Default for JobRecord {
    fn default() -> Self {
        Self {
            title: UNKNOWN_TITLE.to_string(),
            location: UNKNOWN_LOCATION.to_string(),
            department_or_company: UNKNOWN_DEPARTMENT.to_string(),
            posted_age: UNKNOWN_DATE.to_string(),
            url: UNKNOWN_URL.to_string(),
        }
    }
}

/// A job record plus the qualification sections of its detail page
///
/// The qualification fields stay empty until the enricher finds the
/// corresponding heading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailRecord {
    pub record: JobRecord,
    pub minimum_qualifications: String,
    pub preferred_qualifications: String,
}

impl DetailRecord {
    pub fn is_enriched(&self) -> bool {
        !self.minimum_qualifications.is_empty() || !self.preferred_qualifications.is_empty()
    }
}

impl From<JobRecord> for DetailRecord {
    fn from(record: JobRecord) -> Self {
        Self {
            record,
            minimum_qualifications: String::new(),
            preferred_qualifications: String::new(),
        }
    }
}
