//! Selector strategy resolver over a DOM snapshot
//!
//! Tries each query of a [`SelectorList`] in order and returns the first
//! non-empty match set. A query that fails to parse or matches nothing is an
//! `ElementNotFound` for that hypothesis only; the resolver moves on and never
//! reports it to the caller.

use crate::extract::selectors::{Query, SelectorList};
use scraper::{ElementRef, Selector};
use tracing::debug;

/// Returns the matches of `query` below `scope`
fn query_matches<'a>(scope: ElementRef<'a>, query: &Query) -> Vec<ElementRef<'a>> {
    let selector = match Selector::parse(query.css()) {
        Ok(selector) => selector,
        Err(e) => {
            debug!("Skipping unparsable selector '{}': {:?}", query.css(), e);
            return Vec::new();
        }
    };

    scope
        .select(&selector)
        .filter(|el| query.accepts_text(&element_text(*el)))
        .collect()
}

/// Returns the first non-empty match set of `list` below `scope`
///
/// # Arguments
///
/// * `scope` - Element to search under (a card, or the document root)
/// * `list` - Ordered queries to try
///
/// # Returns
///
/// The matches of the first query that found anything, or an empty vector
/// once the list is exhausted
pub fn resolve<'a>(scope: ElementRef<'a>, list: &SelectorList) -> Vec<ElementRef<'a>> {
    for query in list.queries {
        let matches = query_matches(scope, query);
        if !matches.is_empty() {
            return matches;
        }
        debug!("{}: no match for {:?}", list.name, query);
    }

    Vec::new()
}

/// Resolves a single text field
///
/// Takes the first element of each query's match set and advances to the
/// next query when its text is empty or rejected by `accept`.
pub fn resolve_text_where<F>(
    scope: ElementRef<'_>,
    list: &SelectorList,
    accept: F,
) -> Option<String>
where
    F: Fn(&str) -> bool,
{
    list.queries.iter().find_map(|query| {
        let first = query_matches(scope, query).into_iter().next()?;
        let text = element_text(first);
        (!text.is_empty() && accept(&text)).then_some(text)
    })
}

/// Resolves a single text field, accepting any non-empty text
pub fn resolve_text(scope: ElementRef<'_>, list: &SelectorList) -> Option<String> {
    resolve_text_where(scope, list, |_| true)
}

/// Elements whose boundaries break the rendered text onto a new line
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Elements whose content is never rendered
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Visible text of an element: lines trimmed, inner whitespace collapsed,
/// blank lines dropped
///
/// Block elements and `<br>` start a new line, and adjacent inline elements
/// are kept apart by a space, so minified markup reads like pretty-printed
/// markup.
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);
    normalize_text(&raw)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            continue;
        }
        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };

        let name = child.value().name();
        if name == "br" {
            out.push('\n');
        } else if HIDDEN_ELEMENTS.contains(&name) {
            continue;
        } else if BLOCK_ELEMENTS.contains(&name) {
            out.push('\n');
            collect_text(child, out);
            out.push('\n');
        } else {
            out.push(' ');
            collect_text(child, out);
            out.push(' ');
        }
    }
}

pub fn normalize_text(raw: &str) -> String {
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
