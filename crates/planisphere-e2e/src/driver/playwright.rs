// Playwright backend for BrowserTab
//
// Wraps a `playwright_rs::Page`. The engine has no load-state or popup
// waits, so both are built here from polling loops.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use playwright_rs::{GotoOptions, Locator, Page, ScreenshotOptions, WaitUntil};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::{BrowserTab, Selector, TabHandle};
use crate::error::{Error, Result};

/// How long the resource count must stay unchanged to count as idle.
/// Same quiet window Playwright uses for `networkidle`.
const NETWORK_QUIET_WINDOW: Duration = Duration::from_millis(500);

const POLL_INTERVAL: Duration = Duration::from_millis(100);

const LOAD_STATE_JS: &str = "() => ({ \
    ready: document.readyState, \
    resources: performance.getEntriesByType('resource').length \
})";

const DISPLAYED_COUNT_JS: &str = "(css) => Array.from(document.querySelectorAll(css)) \
    .filter(el => window.getComputedStyle(el).display !== 'none').length";

const DISPLAYED_FEEDBACK_JS: &str = "({ id, css }) => { \
    const field = document.getElementById(id); \
    if (!field || !field.parentElement) return null; \
    const feedback = field.parentElement.querySelector(css); \
    if (!feedback) return null; \
    return window.getComputedStyle(feedback).display !== 'none' ? feedback.textContent : null; \
}";

#[derive(Debug, Deserialize)]
struct LoadState {
    ready: String,
    resources: usize,
}

#[derive(Serialize)]
struct FeedbackQuery<'a> {
    id: &'a str,
    css: &'a str,
}

/// A live browser tab.
#[derive(Clone)]
pub struct PlaywrightTab {
    page: Page,
}

impl PlaywrightTab {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// Wraps the page into a shareable handle.
    pub fn handle(page: Page) -> TabHandle {
        Arc::new(Self::new(page))
    }

    /// Underlying engine page, for calls the seam does not cover.
    pub fn page(&self) -> &Page {
        &self.page
    }

    async fn locator(&self, selector: &Selector) -> Locator {
        self.page.locator(&selector.to_string()).await
    }

    async fn wait_for_new_page(&self, known_pages: usize, timeout: Duration) -> Result<Page> {
        let context = self.page.context()?;
        let start = Instant::now();
        loop {
            let pages = context.pages();
            if pages.len() > known_pages {
                if let Some(page) = pages.into_iter().last() {
                    return Ok(page);
                }
            }
            if start.elapsed() >= timeout {
                return Err(Error::Timeout(format!(
                    "no new tab opened within {:?} (tabs open: {})",
                    timeout, known_pages
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl BrowserTab for PlaywrightTab {
    fn url(&self) -> String {
        self.page.url()
    }

    async fn title(&self) -> Result<String> {
        Ok(self.page.title().await?)
    }

    async fn goto(&self, url: &str, timeout: Duration) -> Result<()> {
        tracing::debug!("goto {}", url);
        let options = GotoOptions::new()
            .timeout(timeout)
            .wait_until(WaitUntil::Load);
        self.page.goto(url, Some(options)).await?;
        Ok(())
    }

    async fn wait_for_network_idle(&self, timeout: Duration) -> Result<()> {
        let start = Instant::now();
        let mut last_resources: Option<usize> = None;
        let mut quiet_since = Instant::now();

        loop {
            // A navigation in flight tears down the execution context;
            // treat that like "not idle yet" and keep polling.
            let sample = self
                .page
                .evaluate::<(), LoadState>(LOAD_STATE_JS, None::<&()>)
                .await;

            match sample {
                Ok(sample) if sample.ready == "complete" => {
                    if last_resources != Some(sample.resources) {
                        last_resources = Some(sample.resources);
                        quiet_since = Instant::now();
                    } else if quiet_since.elapsed() >= NETWORK_QUIET_WINDOW {
                        return Ok(());
                    }
                }
                Ok(_) => last_resources = None,
                Err(e) => {
                    tracing::debug!("load state check failed, retrying: {}", e);
                    last_resources = None;
                }
            }

            if start.elapsed() >= timeout {
                return Err(Error::Timeout(format!(
                    "network not idle after {:?} at {}",
                    timeout,
                    self.page.url()
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn count(&self, selector: &Selector) -> Result<usize> {
        Ok(self.locator(selector).await.count().await?)
    }

    async fn is_visible(&self, selector: &Selector) -> Result<bool> {
        Ok(self.locator(selector).await.is_visible().await?)
    }

    async fn text_content(&self, selector: &Selector) -> Result<Option<String>> {
        Ok(self.locator(selector).await.text_content().await?)
    }

    async fn all_text_contents(&self, selector: &Selector) -> Result<Vec<String>> {
        let locator = self.locator(selector).await;
        let count = locator.count().await?;
        let mut texts = Vec::with_capacity(count);
        for index in 0..count {
            let text = locator.nth(index as i32).text_content().await?;
            texts.push(text.unwrap_or_default());
        }
        Ok(texts)
    }

    async fn click(&self, selector: &Selector) -> Result<()> {
        tracing::debug!("click {}", selector);
        Ok(self.locator(selector).await.click(None).await?)
    }

    async fn fill(&self, selector: &Selector, value: &str) -> Result<()> {
        tracing::debug!("fill {} = {:?}", selector, value);
        Ok(self.locator(selector).await.fill(value, None).await?)
    }

    async fn check(&self, selector: &Selector) -> Result<()> {
        Ok(self.locator(selector).await.check(None).await?)
    }

    async fn select_option(&self, selector: &Selector, value: &str) -> Result<()> {
        self.locator(selector)
            .await
            .select_option(value, None)
            .await?;
        Ok(())
    }

    async fn displayed_count(&self, css: &str) -> Result<usize> {
        let count: usize = self
            .page
            .evaluate(DISPLAYED_COUNT_JS, Some(&css))
            .await?;
        Ok(count)
    }

    async fn displayed_feedback(
        &self,
        field_id: &str,
        feedback_css: &str,
    ) -> Result<Option<String>> {
        let query = FeedbackQuery {
            id: field_id,
            css: feedback_css,
        };
        let text: Option<String> = self
            .page
            .evaluate(DISPLAYED_FEEDBACK_JS, Some(&query))
            .await?;
        Ok(text)
    }

    async fn screenshot(&self, full_page: bool) -> Result<Vec<u8>> {
        let options = ScreenshotOptions::builder().full_page(full_page).build();
        Ok(self.page.screenshot(Some(options)).await?)
    }

    async fn click_expecting_popup(
        &self,
        selector: &Selector,
        timeout: Duration,
    ) -> Result<TabHandle> {
        let known_pages = self.page.context()?.pages().len();
        let locator = self.locator(selector).await;

        let page = click_then_popup(
            async { Ok(locator.click(None).await?) },
            self.wait_for_new_page(known_pages, timeout),
        )
        .await?;
        tracing::debug!("popup opened at {}", page.url());
        Ok(Self::handle(page))
    }
}

/// Runs `click`, then `popup`. The popup wait counts tabs against a snapshot
/// taken before the click, so a tab that opened while the click was still
/// resolving is found on the first poll. A failed click returns at once.
async fn click_then_popup<T>(
    click: impl Future<Output = Result<()>>,
    popup: impl Future<Output = Result<T>>,
) -> Result<T> {
    click.await?;
    popup.await
}
