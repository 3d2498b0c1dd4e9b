//! Heading-bounded section extraction for detail pages
//!
//! Starting from a heading, the extractor walks forward through the sibling
//! elements of the heading's container and collects their text until the
//! next section heading, a navigation/footer block, or the end of the
//! container. The walk only moves forward, so it visits each node at most
//! once and is bounded by the length of the document.

use crate::extract::resolver::element_text;
use scraper::{ElementRef, Selector};

/// Words that mark the heading of the next section
const TERMINATING_MARKERS: &[&str] = &["qualifications", "what"];

/// Inline emphasis used as a heading inside a paragraph
const INLINE_HEADINGS: &[&str] = &["strong", "b"];

const BLOCK_HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// CSS selector for every heading-shaped element
pub const HEADING_SELECTOR: &str = "strong, b, h1, h2, h3, h4, h5, h6";

/// Returns true if the element itself is heading-shaped
pub fn is_heading(element: ElementRef<'_>) -> bool {
    let name = element.value().name();
    INLINE_HEADINGS.contains(&name) || BLOCK_HEADINGS.contains(&name)
}

/// Collects the text of the section introduced by `heading`
///
/// # Arguments
///
/// * `heading` - A heading element (`strong`, `b` or `h1`-`h6`)
///
/// # Returns
///
/// The trimmed text of each sibling block in the section joined by
/// newlines, with empty fragments omitted. Empty if the heading has no
/// following content.
pub fn extract_section(heading: ElementRef<'_>) -> String {
    let Some(container) = section_container(heading) else {
        return String::new();
    };

    let mut fragments = Vec::new();
    for sibling in container.next_siblings().filter_map(ElementRef::wrap) {
        if starts_next_section(sibling) || is_nav_or_footer(sibling) {
            break;
        }

        let text = element_text(sibling);
        if !text.is_empty() {
            fragments.push(text);
        }
    }

    fragments.join("\n")
}

/// Inline headings live inside a paragraph-like block, which is the container;
/// block headings are their own container
fn section_container(heading: ElementRef<'_>) -> Option<ElementRef<'_>> {
    if INLINE_HEADINGS.contains(&heading.value().name()) {
        heading.parent().and_then(ElementRef::wrap)
    } else {
        Some(heading)
    }
}

/// Returns true if `element` is a heading whose text names another section
///
/// Besides real headings, only a paragraph led by inline emphasis counts;
/// emphasis inside lists or other blocks is content.
fn starts_next_section(element: ElementRef<'_>) -> bool {
    let heading_text = if is_heading(element) {
        Some(element_text(element))
    } else if element.value().name() == "p" {
        Selector::parse("strong, b")
            .ok()
            .and_then(|selector| element.select(&selector).next().map(element_text))
    } else {
        None
    };

    match heading_text {
        Some(text) => {
            let lower = text.to_lowercase();
            TERMINATING_MARKERS.iter().any(|marker| lower.contains(marker))
        }
        None => false,
    }
}

/// Navigation and footer blocks end the content area
fn is_nav_or_footer(element: ElementRef<'_>) -> bool {
    let value = element.value();
    if matches!(value.name(), "nav" | "footer") {
        return true;
    }

    value.classes().any(|class| {
        let class = class.to_lowercase();
        class == "nav"
            || class.starts_with("nav-")
            || class.ends_with("-nav")
            || class.contains("footer")
    })
}
