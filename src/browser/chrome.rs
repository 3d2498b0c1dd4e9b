use crate::browser::{BrowserError, BrowserSession};
use crate::config::BrowserConfig;
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::{
    AddScriptToEvaluateOnNewDocumentParams, HandleJavaScriptDialogParams,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, BrowserConfig as CdpConfig, Element, Page};
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Hides the automation flag that some career sites check before rendering
const HIDE_WEBDRIVER_SCRIPT: &str =
    "Object.defineProperty(navigator, 'webdriver', { get: () => undefined });";

const IS_INTERACTABLE_FN: &str = r#"function() {
    const rect = this.getBoundingClientRect();
    const style = window.getComputedStyle(this);
    return rect.width > 0 && rect.height > 0
        && style.visibility !== 'hidden'
        && style.display !== 'none'
        && !this.disabled;
}"#;

const CLEAR_VALUE_FN: &str = "function() { this.value = ''; }";

/// A Chrome instance driven over the DevTools Protocol
///
/// Owns one browser process and a single tab. The protocol handler runs on
/// its own task for the lifetime of the session.
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl ChromeSession {
    /// Launches Chrome with the configured options
    ///
    /// # Arguments
    ///
    /// * `config` - Browser section of the harvest configuration
    ///
    /// # Returns
    ///
    /// * `Ok(ChromeSession)` - A browser with one blank tab
    /// * `Err(BrowserError::SessionFailure)` - Chrome could not be started or connected to
    pub async fn launch(config: &BrowserConfig) -> Result<Self, BrowserError> {
        let mut builder = CdpConfig::builder()
            .window_size(config.window_width, config.window_height)
            .request_timeout(Duration::from_secs(config.request_timeout_secs))
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-notifications")
            .arg("--disable-extensions")
            .arg(format!(
                "--window-size={},{}",
                config.window_width, config.window_height
            ));

        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &config.chrome_path {
            builder = builder.chrome_executable(path);
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.arg(format!("--user-agent={}", user_agent));
        }

        let cdp_config = builder.build().map_err(BrowserError::SessionFailure)?;

        let (browser, mut handler) = Browser::launch(cdp_config)
            .await
            .map_err(|e| BrowserError::SessionFailure(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler event error: {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::SessionFailure(e.to_string()))?;

        page.execute(AddScriptToEvaluateOnNewDocumentParams::new(
            HIDE_WEBDRIVER_SCRIPT,
        ))
        .await
        .map_err(|e| BrowserError::SessionFailure(e.to_string()))?;

        info!(
            "Launched Chrome ({}, {}x{})",
            if config.headless { "headless" } else { "headed" },
            config.window_width,
            config.window_height
        );

        Ok(Self {
            browser,
            page,
            handler_task,
        })
    }

    /// Closes the browser and stops the protocol handler
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }
        let _ = self.browser.wait().await;
        self.handler_task.abort();
    }
}

/// Calls `function` with the element bound to `this` and returns its value
async fn call_on(element: &Element, function: &str) -> Result<serde_json::Value, BrowserError> {
    let returns = element
        .call_js_fn(function, false)
        .await
        .map_err(classify)?;
    Ok(returns.result.value.unwrap_or(serde_json::Value::Null))
}

/// Maps a CDP error onto the harvester's error taxonomy
fn classify(error: CdpError) -> BrowserError {
    if matches!(error, CdpError::Timeout) {
        return BrowserError::Timeout("browser request".to_string());
    }

    let message = error.to_string();
    let lower = message.to_lowercase();
    let node_gone =
        lower.contains("detached") || lower.contains("no node") || lower.contains("could not find");
    if lower.contains("node") && node_gone {
        BrowserError::StaleReference(message)
    } else {
        BrowserError::Protocol(message)
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    type Element = Element;

    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        debug!("Navigating to {}", url);
        self.page.goto(url).await.map_err(classify)?;
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, BrowserError> {
        let url = self.page.url().await.map_err(classify)?;
        Ok(url.unwrap_or_default())
    }

    async fn page_source(&mut self) -> Result<String, BrowserError> {
        self.page.content().await.map_err(classify)
    }

    async fn find_all(&mut self, css: &str) -> Result<Vec<Element>, BrowserError> {
        self.page.find_elements(css).await.map_err(classify)
    }

    async fn text(&mut self, element: &Element) -> Result<String, BrowserError> {
        let text = element.inner_text().await.map_err(classify)?;
        Ok(text.unwrap_or_default().trim().to_string())
    }

    async fn attribute(
        &mut self,
        element: &Element,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        element.attribute(name).await.map_err(classify)
    }

    async fn is_interactable(&mut self, element: &Element) -> Result<bool, BrowserError> {
        let value = call_on(element, IS_INTERACTABLE_FN).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn click(&mut self, element: &Element) -> Result<(), BrowserError> {
        element.click().await.map_err(classify)?;
        Ok(())
    }

    async fn type_text(
        &mut self,
        element: &Element,
        text: &str,
        submit: bool,
    ) -> Result<(), BrowserError> {
        call_on(element, CLEAR_VALUE_FN).await?;
        element.click().await.map_err(classify)?;
        element.type_str(text).await.map_err(classify)?;
        if submit {
            element.press_key("Enter").await.map_err(classify)?;
        }
        Ok(())
    }

    async fn scroll_into_view(&mut self, element: &Element) -> Result<(), BrowserError> {
        element.scroll_into_view().await.map_err(classify)?;
        Ok(())
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), BrowserError> {
        self.page
            .evaluate("window.scrollTo(0, document.body.scrollHeight)")
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn scroll_height(&mut self) -> Result<i64, BrowserError> {
        let result = self
            .page
            .evaluate("document.body.scrollHeight")
            .await
            .map_err(classify)?;
        result
            .into_value::<i64>()
            .map_err(|e| BrowserError::Protocol(format!("scrollHeight: {}", e)))
    }

    async fn handle_alert(&mut self, accept: bool) -> Result<bool, BrowserError> {
        match self.page.execute(HandleJavaScriptDialogParams::new(accept)).await {
            Ok(_) => Ok(true),
            Err(CdpError::Timeout) => Err(BrowserError::Timeout("dialog".to_string())),
            Err(e) => {
                debug!("No dialog to handle: {}", e);
                Ok(false)
            }
        }
    }

    async fn pause(&mut self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
