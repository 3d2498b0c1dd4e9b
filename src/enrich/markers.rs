//! Heading marker vocabularies
//!
//! Matching is a substring test on the lower-cased heading text.

/// Phrases that open the minimum-qualifications section
pub const MINIMUM_MARKERS: &[&str] = &["what we're looking for", "minimum qualifications"];

/// Phrases that open the preferred-qualifications section
pub const PREFERRED_MARKERS: &[&str] =
    &["what will make you stand out", "preferred qualifications"];

/// Which qualification field a heading introduces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Minimum,
    Preferred,
}

/// Classifies a heading by its text
///
/// # Returns
///
/// * `Some(SectionKind)` - The heading contains one of the marker phrases
/// * `None` - The heading is unrelated to qualifications
pub fn classify(heading_text: &str) -> Option<SectionKind> {
    // Typographic apostrophes are common in rendered headings
    let text = heading_text.to_lowercase().replace('\u{2019}', "'");

    if MINIMUM_MARKERS.iter().any(|m| text.contains(m)) {
        Some(SectionKind::Minimum)
    } else if PREFERRED_MARKERS.iter().any(|m| text.contains(m)) {
        Some(SectionKind::Preferred)
    } else {
        None
    }
}
