//! Page-interaction helpers used by the UI suites.
//!
//! [`PageHelper`] wraps one [`PageDriver`] with the waits, pauses and
//! narration the suites share. [`Locator`] is a lazy handle: it stores a
//! selector and re-queries the page on every call, so it never goes stale.
//!
//! Only [`safe_get_text`] downgrades failures to a default value; every
//! other operation returns `Err` for the test body to propagate.

use crate::config::{HarnessConfig, Timeouts};
use crate::driver::{ElementSnapshot, PageDriver};
use crate::locator::Selector;
use crate::result::{HarnessError, HarnessResult};
use crate::wait::{
    poll_until, LoadState, UrlPattern, DEFAULT_POLL_INTERVAL_MS, NETWORK_IDLE_THRESHOLD_MS,
    PAGE_LOAD_PAUSE_MS,
};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(DEFAULT_POLL_INTERVAL_MS);

/// Log a test step
pub fn log_test_step(description: &str) {
    info!(">>> STEP: {description}");
}

/// Helper for common page operations
#[derive(Clone, Copy)]
pub struct PageHelper<'a> {
    page: &'a dyn PageDriver,
    timeouts: Timeouts,
    slow_mo: Duration,
}

impl std::fmt::Debug for PageHelper<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageHelper")
            .field("timeouts", &self.timeouts)
            .field("slow_mo", &self.slow_mo)
            .finish_non_exhaustive()
    }
}

impl<'a> PageHelper<'a> {
    /// Wrap a page using the run's timeouts and slow-motion delay
    #[must_use]
    pub fn new(page: &'a dyn PageDriver, config: &HarnessConfig) -> Self {
        Self {
            page,
            timeouts: config.timeouts,
            slow_mo: Duration::from_millis(config.browser.slow_mo_ms),
        }
    }

    /// Timeouts in effect
    #[must_use]
    pub const fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    /// Start loading a URL without waiting for any load state
    pub async fn goto(&self, url: &str) -> HarnessResult<()> {
        debug!("Loading: {url}");
        self.page.navigate(url).await?;
        self.slow_mo().await;
        Ok(())
    }

    /// Navigate, wait for DOMContentLoaded, then wait the settle interval
    pub async fn navigate_and_wait(&self, url: &str, timeout: Duration) -> HarnessResult<()> {
        info!("Navigating to: {url}");
        self.goto(url).await?;
        self.wait_for_load_state(LoadState::DomContentLoaded, timeout)
            .await?;
        self.settle().await;
        info!("Page loaded successfully");
        Ok(())
    }

    /// [`PageHelper::navigate_and_wait`] with the configured navigation timeout
    pub async fn open(&self, url: &str) -> HarnessResult<()> {
        self.navigate_and_wait(url, self.timeouts.navigation).await
    }

    /// Wait until the page reaches `state`
    pub async fn wait_for_load_state(&self, state: LoadState, timeout: Duration) -> HarnessResult<()> {
        let start = Instant::now();
        let page = self.page;
        poll_until(timeout, POLL_INTERVAL, &format!("load state '{state}'"), || async move {
            let ready = page.ready_state().await?;
            Ok(state.is_reached_by(&ready).then_some(()))
        })
        .await?;

        if state == LoadState::NetworkIdle {
            self.wait_for_network_quiet(timeout.saturating_sub(start.elapsed()))
                .await?;
        }
        debug!("Reached load state '{state}' in {:?}", start.elapsed());
        Ok(())
    }

    async fn wait_for_network_quiet(&self, budget: Duration) -> HarnessResult<()> {
        let threshold = Duration::from_millis(NETWORK_IDLE_THRESHOLD_MS);
        let deadline = Instant::now() + budget;
        let mut last = self.page.resource_count().await?;
        let mut quiet_since = Instant::now();

        while quiet_since.elapsed() < threshold {
            if Instant::now() >= deadline {
                return Err(HarnessError::Timeout {
                    ms: budget.as_millis() as u64,
                    waited_for: "network idle".to_string(),
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
            let count = self.page.resource_count().await?;
            if count != last {
                last = count;
                quiet_since = Instant::now();
            }
        }
        Ok(())
    }

    /// Lenient load wait: DOMContentLoaded plus a short pause; a timeout
    /// is only logged
    pub async fn wait_for_page_load(&self, timeout: Duration) {
        info!("Waiting for page load (timeout: {}ms)", timeout.as_millis());
        match self
            .wait_for_load_state(LoadState::DomContentLoaded, timeout)
            .await
        {
            Ok(()) => {
                sleep_nonzero(self.timeouts.pause.min(Duration::from_millis(PAGE_LOAD_PAUSE_MS))).await;
                info!("Page loaded successfully");
            }
            Err(e) => warn!("Page load timeout: {e}"),
        }
    }

    /// Wait until the current URL matches `pattern`
    pub async fn wait_for_url(&self, pattern: impl Into<UrlPattern>, timeout: Duration) -> HarnessResult<String> {
        let pattern = pattern.into();
        let page = self.page;
        let url = poll_until(timeout, POLL_INTERVAL, &format!("URL matching {pattern}"), || {
            let pattern = pattern.clone();
            async move {
                let url = page.current_url().await?;
                Ok(pattern.matches(&url).then_some(url))
            }
        })
        .await?;
        debug!("URL matched {pattern}: {url}");
        Ok(url)
    }

    /// Assert the current URL contains `expected_path`
    pub async fn verify_url_contains(&self, expected_path: &str) -> HarnessResult<()> {
        let current = self.page.current_url().await?;
        if !current.contains(expected_path) {
            return Err(HarnessError::assertion(format!(
                "Expected '{expected_path}' in URL, got: {current}"
            )));
        }
        info!("URL verified contains: {expected_path}");
        Ok(())
    }

    /// Handle to the first element matching `selector`, without waiting
    #[must_use]
    pub fn get_element(&self, selector: impl Into<Selector>) -> Locator<'a> {
        let selector = selector.into();
        debug!("Locating element: {selector}");
        Locator {
            page: self.page,
            selector,
            slow_mo: self.slow_mo,
        }
    }

    /// Wait until the element is visible and return its handle
    pub async fn verify_element_visible(
        &self,
        selector: impl Into<Selector>,
        timeout: Duration,
    ) -> HarnessResult<Locator<'a>> {
        let element = self.get_element(selector);
        element.wait_for_visible(timeout).await?;
        debug!("Element visible: {}", element.selector());
        Ok(element)
    }

    /// Assert the element's rendered text contains `expected`
    pub async fn verify_text_contains(&self, element: &Locator<'_>, expected: &str) -> HarnessResult<()> {
        let text = element.inner_text().await?;
        if !text.contains(expected) {
            return Err(HarnessError::assertion(format!(
                "Expected {} to contain '{expected}', got '{text}'",
                element.selector()
            )));
        }
        debug!("Text verified: '{expected}'");
        Ok(())
    }

    /// Serialized document markup
    pub async fn content(&self) -> HarnessResult<String> {
        self.page.content().await
    }

    /// Current URL
    pub async fn url(&self) -> HarnessResult<String> {
        self.page.current_url().await
    }

    /// Wait the settle interval for client-side rendering
    pub async fn settle(&self) {
        sleep_nonzero(self.timeouts.settle).await;
    }

    /// Wait the short pause interval
    pub async fn pause(&self) {
        sleep_nonzero(self.timeouts.pause).await;
    }

    /// Wait for a dialog opened by a click
    pub async fn click_pause(&self) {
        sleep_nonzero(self.timeouts.click_pause).await;
    }

    async fn slow_mo(&self) {
        sleep_nonzero(self.slow_mo).await;
    }
}

async fn sleep_nonzero(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

/// Lazy handle to the first element matching a selector
#[derive(Clone)]
pub struct Locator<'a> {
    page: &'a dyn PageDriver,
    selector: Selector,
    slow_mo: Duration,
}

impl std::fmt::Debug for Locator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Locator")
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}

impl<'a> Locator<'a> {
    /// Selector this handle resolves
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Descendants of this element matching `child`
    #[must_use]
    pub fn locator(&self, child: impl Into<Selector>) -> Self {
        Self {
            selector: self.selector.clone().within(child),
            ..self.clone()
        }
    }

    /// Only matches whose text contains `text`
    #[must_use]
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            selector: self.selector.clone().with_text(text),
            ..self.clone()
        }
    }

    /// Current snapshot, or `ElementNotFound`
    pub async fn snapshot(&self) -> HarnessResult<ElementSnapshot> {
        self.page
            .query(&self.selector)
            .await?
            .ok_or_else(|| HarnessError::ElementNotFound {
                selector: self.selector.to_string(),
            })
    }

    /// Rendered text
    pub async fn inner_text(&self) -> HarnessResult<String> {
        Ok(self.snapshot().await?.inner_text)
    }

    /// Inner markup
    pub async fn inner_html(&self) -> HarnessResult<String> {
        Ok(self.snapshot().await?.inner_html)
    }

    /// Attribute value, `None` when the attribute is absent
    pub async fn get_attribute(&self, name: &str) -> HarnessResult<Option<String>> {
        Ok(self.snapshot().await?.attributes.get(name).cloned())
    }

    /// Number of matching elements
    pub async fn count(&self) -> HarnessResult<usize> {
        Ok(self
            .page
            .query(&self.selector)
            .await?
            .map_or(0, |s| s.match_count))
    }

    /// Whether the element becomes visible within `timeout`
    pub async fn is_visible(&self, timeout: Duration) -> HarnessResult<bool> {
        match self.wait_for_visible(timeout).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_timeout() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Wait until the element is attached to the document
    pub async fn wait_for_attached(&self, timeout: Duration) -> HarnessResult<ElementSnapshot> {
        let (page, selector) = (self.page, &self.selector);
        poll_until(timeout, POLL_INTERVAL, &format!("{selector} to be attached"), || async move {
            page.query(selector).await
        })
        .await
    }

    /// Wait until the element is visible
    pub async fn wait_for_visible(&self, timeout: Duration) -> HarnessResult<()> {
        let (page, selector) = (self.page, &self.selector);
        poll_until(timeout, POLL_INTERVAL, &format!("{selector} to be visible"), || async move {
            let snapshot = page.query(selector).await?;
            Ok(snapshot.filter(|s| s.visible).map(|_| ()))
        })
        .await
    }

    /// Click the element
    pub async fn click(&self) -> HarnessResult<()> {
        debug!("Clicking: {}", self.selector);
        self.page.click(&self.selector).await?;
        sleep_nonzero(self.slow_mo).await;
        Ok(())
    }

    /// Replace the element's value with `text`
    pub async fn fill(&self, text: &str) -> HarnessResult<()> {
        debug!("Filling {} with '{text}'", self.selector);
        self.page.fill(&self.selector, text).await?;
        sleep_nonzero(self.slow_mo).await;
        Ok(())
    }

    /// Press a named key on the element
    pub async fn press(&self, key: &str) -> HarnessResult<()> {
        debug!("Pressing {key} on {}", self.selector);
        self.page.press(&self.selector, key).await?;
        sleep_nonzero(self.slow_mo).await;
        Ok(())
    }
}

/// Inner text of the first match if it becomes visible within the helper's
/// safe-text timeout, otherwise `default`. Never fails.
pub async fn safe_get_text(helper: &PageHelper<'_>, selector: impl Into<Selector>, default: &str) -> String {
    let element = helper.get_element(selector);
    let selector = element.selector().to_string();

    let visible = match element.is_visible(helper.timeouts().safe_text).await {
        Ok(visible) => visible,
        Err(e) => {
            warn!("Could not get text from '{selector}': {e}");
            return default.to_string();
        }
    };
    if !visible {
        warn!("Element '{selector}' not visible, returning default");
        return default.to_string();
    }

    match element.inner_text().await {
        Ok(text) => {
            let preview: String = text.chars().take(50).collect();
            debug!("Got text from '{selector}': {preview}...");
            text
        }
        Err(e) => {
            warn!("Could not get text from '{selector}': {e}");
            default.to_string()
        }
    }
}
