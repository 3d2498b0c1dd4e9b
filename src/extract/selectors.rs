//! Static selector tables for the known listing surfaces
//!
//! Each logical field gets an ordered [`SelectorList`]; the resolver tries
//! the queries in order and stops at the first one that matches. The tables
//! are data, so a markup change on a target site means editing a list here
//! rather than the extraction code.

/// One DOM query hypothesis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    /// Plain CSS selector
    Css(&'static str),

    /// CSS selector whose matches must also contain `text` in their visible text
    CssContaining {
        css: &'static str,
        text: &'static str,
    },

    /// CSS selector whose matches must contain `word` as a whole word,
    /// ignoring case ("ago" matches "3 days ago" but not "Chicago")
    CssContainingWord {
        css: &'static str,
        word: &'static str,
    },
}

impl Query {
    pub fn css(&self) -> &'static str {
        match self {
            Self::Css(css) => css,
            Self::CssContaining { css, .. } => css,
            Self::CssContainingWord { css, .. } => css,
        }
    }

    /// Text the match must contain, if any
    pub fn required_text(&self) -> Option<&'static str> {
        match self {
            Self::Css(_) => None,
            Self::CssContaining { text, .. } => Some(text),
            Self::CssContainingWord { word, .. } => Some(word),
        }
    }

    /// Returns true if `visible_text` satisfies the text constraint of this query
    pub fn accepts_text(&self, visible_text: &str) -> bool {
        match self {
            Self::Css(_) => true,
            Self::CssContaining { text, .. } => visible_text.contains(text),
            Self::CssContainingWord { word, .. } => visible_text
                .split(|c: char| !c.is_alphanumeric())
                .any(|candidate| candidate.eq_ignore_ascii_case(word)),
        }
    }
}

/// Ordered fallback queries for one logical field
#[derive(Debug, Clone, Copy)]
pub struct SelectorList {
    /// Field name, used in log messages
    pub name: &'static str,
    pub queries: &'static [Query],
}

impl SelectorList {
    pub const fn new(name: &'static str, queries: &'static [Query]) -> Self {
        Self { name, queries }
    }

    pub const fn empty(name: &'static str) -> Self {
        Self { name, queries: &[] }
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

/// Every selector list needed to harvest one listing surface
#[derive(Debug, Clone, Copy)]
pub struct SiteSelectors {
    /// Repeating job card containers
    pub cards: SelectorList,
    pub title: SelectorList,
    pub location: SelectorList,
    pub posted_age: SelectorList,
    pub department: SelectorList,
    /// Anchor carrying the job link
    pub url: SelectorList,
    /// Card attribute holding a job identifier, used with the URL template
    pub job_id_attribute: Option<&'static str>,

    /// Any element proving the result list has rendered
    pub results_ready: SelectorList,
    pub next: SelectorList,
    pub load_more: SelectorList,
    pub search_input: SelectorList,
    pub search_button: SelectorList,
    pub location_filter: SelectorList,
    /// Elements scanned for the configured location text once the filter is open
    pub location_option: &'static str,
    pub apply: SelectorList,
}

use Query::{Css, CssContaining, CssContainingWord};

/// Search-and-filter careers site with numbered result pages
pub const CAREERS_SEARCH: SiteSelectors = SiteSelectors {
    cards: SelectorList::new(
        "job card",
        &[
            Css("div.job-card"),
            Css("div[data-ph-at-id='job-tile']"),
            Css("div.jobs-list > div"),
            Css("li.search-result-item"),
        ],
    ),
    title: SelectorList::new(
        "title",
        &[
            Css("h3"),
            Css("h2"),
            Css("a[data-ph-at-id*='job-title']"),
            Css("div[class*='title']"),
            Css("a[class*='job-title']"),
        ],
    ),
    location: SelectorList::new(
        "location",
        &[
            Css("span[class*='location']"),
            CssContaining {
                css: "span",
                text: ",",
            },
            Css("div[class*='location']"),
            Css("span[data-ph-id*='location']"),
        ],
    ),
    posted_age: SelectorList::new(
        "posted age",
        &[
            CssContainingWord {
                css: "span",
                word: "ago",
            },
            Css("span[class*='date']"),
            Css("div[class*='date']"),
            Css("span[data-ph-id*='date']"),
        ],
    ),
    department: SelectorList::new(
        "department",
        &[Css("span[class*='department']"), Css("div[class*='department']")],
    ),
    url: SelectorList::new("url", &[Css("a[href]")]),
    job_id_attribute: Some("data-job-id"),

    results_ready: SelectorList::new(
        "results",
        &[
            Css("div.job-card"),
            Css("div.jobs-list"),
            Css("div[data-ph-at-id='job-list']"),
        ],
    ),
    next: SelectorList::new(
        "next page",
        &[
            Css("button[aria-label*='Next page'], button[aria-label*='next page']"),
            Css("a[aria-label*='Next page'], a[aria-label*='next page']"),
            CssContaining {
                css: "button",
                text: "Next",
            },
            CssContaining {
                css: "a",
                text: "Next",
            },
            Css("li[class*='next'] > a"),
            Css("div[class*='pagination'] li:last-child > a"),
            Css("button[class*='next']"),
        ],
    ),
    load_more: SelectorList::empty("load more"),
    search_input: SelectorList::new("search input", &[Css("input#keyword-search")]),
    search_button: SelectorList::new(
        "search button",
        &[Css("button[data-ph-at-id='jobs-search-button']")],
    ),
    location_filter: SelectorList::new(
        "location filter",
        &[Css("button[data-ph-at-id='jobs-location-filter']")],
    ),
    location_option: "span",
    apply: SelectorList::new(
        "apply",
        &[CssContaining {
            css: "button",
            text: "Apply",
        }],
    ),
};

/// Hosted job board that loads openings on scroll and paginates afterwards
pub const JOB_BOARD: SiteSelectors = SiteSelectors {
    cards: SelectorList::new("job card", &[Css(".opening"), Css("tr.job-post")]),
    title: SelectorList::new("title", &[Css("a"), Css(".job-title")]),
    location: SelectorList::new("location", &[Css(".location")]),
    posted_age: SelectorList::new(
        "posted age",
        &[CssContainingWord {
            css: "span",
            word: "ago",
        }],
    ),
    department: SelectorList::new("department", &[Css(".department")]),
    url: SelectorList::new("url", &[Css("a[href]")]),
    job_id_attribute: None,

    results_ready: SelectorList::new("results", &[Css(".opening"), Css("tr.job-post")]),
    next: SelectorList::new(
        "next page",
        &[
            CssContaining {
                css: "a",
                text: "Next",
            },
            Css("a[class*='next']"),
            Css("a[aria-label*='Next']"),
        ],
    ),
    load_more: SelectorList::new(
        "load more",
        &[
            CssContaining {
                css: "button",
                text: "Load More",
            },
            CssContaining {
                css: "button",
                text: "View More",
            },
        ],
    ),
    search_input: SelectorList::new("search input", &[Css("#search_keywords")]),
    search_button: SelectorList::empty("search button"),
    location_filter: SelectorList::empty("location filter"),
    location_option: "span",
    apply: SelectorList::empty("apply"),
};
