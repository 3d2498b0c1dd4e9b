//! Card field extraction
//!
//! Turns one listing card into a [`JobRecord`]. Each field is resolved
//! independently; a field that cannot be read falls back to its sentinel and
//! never prevents the other fields or cards from being extracted.

use crate::extract::resolver::{resolve, resolve_text, resolve_text_where};
use crate::extract::selectors::SiteSelectors;
use crate::records::{
    JobRecord, UNKNOWN_DATE, UNKNOWN_DEPARTMENT, UNKNOWN_LOCATION, UNKNOWN_TITLE, UNKNOWN_URL,
};
use scraper::{ElementRef, Html};
use tracing::debug;
use url::Url;

/// Longest text accepted as a card location
const MAX_LOCATION_LEN: usize = 50;

/// Page-level facts the card extractor needs beyond the card itself
#[derive(Debug, Clone, Default)]
pub struct CardContext {
    /// URL of the listing page, for resolving relative links
    pub page_url: Option<Url>,
    /// Fallback for the department/company field
    pub company: Option<String>,
    /// Canonical job URL with an `{id}` placeholder
    pub job_url_template: Option<String>,
}

impl CardContext {
    pub fn new(page_url: &str) -> Self {
        Self {
            page_url: Url::parse(page_url).ok(),
            ..Default::default()
        }
    }

    pub fn with_company(mut self, company: Option<String>) -> Self {
        self.company = company;
        self
    }

    pub fn with_job_url_template(mut self, template: Option<String>) -> Self {
        self.job_url_template = template;
        self
    }
}

/// Extracts every card found in a page snapshot
///
/// # Arguments
///
/// * `html` - Page source captured from the browser
/// * `selectors` - Selector tables for the listing surface
/// * `ctx` - Page URL and fallbacks
///
/// # Returns
///
/// One record per card, in document order
pub fn extract_cards(
    html: &str,
    selectors: &SiteSelectors,
    ctx: &CardContext,
) -> Vec<JobRecord> {
    let document = Html::parse_document(html);
    let cards = resolve(document.root_element(), &selectors.cards);
    debug!("Extracting {} cards", cards.len());

    cards
        .into_iter()
        .map(|card| extract_card(card, selectors, ctx))
        .collect()
}

/// Extracts one record from one card element
pub fn extract_card(
    card: ElementRef<'_>,
    selectors: &SiteSelectors,
    ctx: &CardContext,
) -> JobRecord {
    let title = resolve_text(card, &selectors.title).unwrap_or_else(|| UNKNOWN_TITLE.to_string());

    let location = resolve_text_where(card, &selectors.location, is_plausible_location)
        .unwrap_or_else(|| UNKNOWN_LOCATION.to_string());

    let posted_age =
        resolve_text(card, &selectors.posted_age).unwrap_or_else(|| UNKNOWN_DATE.to_string());

    let department_or_company = resolve_text(card, &selectors.department)
        .or_else(|| ctx.company.clone())
        .unwrap_or_else(|| UNKNOWN_DEPARTMENT.to_string());

    let url = extract_url(card, selectors, ctx).unwrap_or_else(|| UNKNOWN_URL.to_string());

    JobRecord {
        title,
        location,
        department_or_company,
        posted_age,
        url,
    }
}

/// Anchor href first, then an identifier attribute expanded through the template
fn extract_url(
    card: ElementRef<'_>,
    selectors: &SiteSelectors,
    ctx: &CardContext,
) -> Option<String> {
    let href = resolve(card, &selectors.url)
        .into_iter()
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(str::trim)
        .find(|href| {
            !href.is_empty() && !href.starts_with('#') && !href.starts_with("javascript:")
        });

    if let Some(href) = href {
        return Some(absolutize(href, ctx.page_url.as_ref()));
    }

    let attribute = selectors.job_id_attribute?;
    let job_id = card
        .value()
        .attr(attribute)
        .map(str::trim)
        .filter(|id| !id.is_empty())?;
    let template = ctx.job_url_template.as_deref()?;
    Some(template.replace("{id}", job_id))
}

/// Resolves `href` against the page URL when possible
fn absolutize(href: &str, base: Option<&Url>) -> String {
    match base.and_then(|base| base.join(href).ok()) {
        Some(url) => url.to_string(),
        None => href.to_string(),
    }
}

/// Rejects texts that are too long or clearly come from the page chrome
fn is_plausible_location(text: &str) -> bool {
    text.chars().count() <= MAX_LOCATION_LEN && !text.to_lowercase().contains("footer")
}
