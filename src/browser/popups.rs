//! Consent, cookie and modal dismissal
//!
//! A fixed table of button queries; every visible match is clicked. All
//! failures are absorbed since a banner that cannot be closed rarely blocks
//! the listing underneath.

use crate::browser::{resolve_live, BrowserSession};
use crate::extract::selectors::{Query, SelectorList};
use std::time::Duration;
use tracing::{debug, info};

use Query::{Css, CssContaining};

const POPUP_BUTTONS: &[SelectorList] = &[
    SelectorList::new("accept", &[CssContaining { css: "button", text: "Accept" }]),
    SelectorList::new("agree", &[CssContaining { css: "button", text: "I agree" }]),
    SelectorList::new("accept id", &[Css("button[id*='accept']")]),
    SelectorList::new("accept class", &[Css("button[class*='accept']")]),
    SelectorList::new("continue", &[CssContaining { css: "button", text: "Continue" }]),
    SelectorList::new("got it", &[CssContaining { css: "button", text: "Got it" }]),
    SelectorList::new("close", &[CssContaining { css: "button", text: "Close" }]),
    SelectorList::new("close label", &[Css("button[aria-label='Close']")]),
    SelectorList::new("cookie banner", &[Css("div[class*='cookie'] button")]),
    SelectorList::new("consent banner", &[Css("div[id*='consent'] button")]),
];

const AFTER_CLICK: Duration = Duration::from_secs(1);

/// Clicks every visible popup button, then accepts any pending alert
///
/// # Returns
///
/// The number of buttons clicked and alerts accepted
pub async fn dismiss_popups<B: BrowserSession>(browser: &mut B) -> usize {
    let mut dismissed = 0;

    for list in POPUP_BUTTONS {
        for button in resolve_live(browser, list).await {
            match browser.is_interactable(&button).await {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    debug!("Popup button '{}' unreadable: {}", list.name, e);
                    continue;
                }
            }

            match browser.click(&button).await {
                Ok(()) => {
                    info!("Dismissed popup via '{}' button", list.name);
                    dismissed += 1;
                    browser.pause(AFTER_CLICK).await;
                }
                Err(e) => debug!("Popup button '{}' click failed: {}", list.name, e),
            }
        }
    }

    match browser.handle_alert(true).await {
        Ok(true) => {
            info!("Accepted alert popup");
            dismissed += 1;
        }
        Ok(false) => {}
        Err(e) => debug!("Alert handling failed: {}", e),
    }

    dismissed
}
