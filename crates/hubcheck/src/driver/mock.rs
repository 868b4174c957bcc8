//! In-memory site for offline tests.
//!
//! A [`MockSite`] maps URLs to [`MockDocument`]s. A document answers queries
//! for the selectors registered on it (compared by value; an `Any` list
//! falls back to its first registered branch) and can follow links on click
//! and key presses. Every driver call is appended to a shared call history.
//!
//! Ready state, resource count and element visibility can change over time:
//! each is advanced by the number of times the page has been asked for it
//! since the last navigation, so polling loops see deterministic
//! transitions.
//!
//! Selectors are never rendered to JavaScript here; the in-page queries
//! from [`Selector::to_query_all`] only run against a real browser.

use super::{Browser, BrowserContext, ContextOptions, ElementSnapshot, PageDriver};
use crate::locator::Selector;
use crate::result::{HarnessError, HarnessResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

/// An element on a mock document
#[derive(Debug, Clone)]
pub struct MockElement {
    /// What queries report
    pub snapshot: ElementSnapshot,
    /// URL loaded when the element is clicked
    pub link: Option<String>,
    /// Queries answered with `visible: false` before the snapshot is reported
    pub hidden_for: usize,
}

/// A page the mock site can serve
#[derive(Debug, Clone)]
pub struct MockDocument {
    ready_states: Vec<String>,
    content: String,
    resource_counts: Vec<u64>,
    elements: Vec<(Selector, MockElement)>,
    key_actions: Vec<(String, String)>,
}

impl Default for MockDocument {
    fn default() -> Self {
        Self {
            ready_states: vec!["complete".to_string()],
            content: "<html><head></head><body></body></html>".to_string(),
            resource_counts: vec![0],
            elements: Vec::new(),
            key_actions: Vec::new(),
        }
    }
}

impl MockDocument {
    /// Empty, fully loaded document
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document markup returned by `content()`
    #[must_use]
    pub fn with_content(mut self, html: impl Into<String>) -> Self {
        self.content = html.into();
        self
    }

    /// Set `document.readyState`
    #[must_use]
    pub fn with_ready_state(mut self, state: impl Into<String>) -> Self {
        self.ready_states = vec![state.into()];
        self
    }

    /// Report these ready states on successive polls, then stay on the last
    #[must_use]
    pub fn with_ready_states<S: Into<String>>(mut self, states: impl IntoIterator<Item = S>) -> Self {
        let states: Vec<String> = states.into_iter().map(Into::into).collect();
        if !states.is_empty() {
            self.ready_states = states;
        }
        self
    }

    /// Report these resource counts on successive polls, then stay on the last
    #[must_use]
    pub fn with_resource_counts(mut self, counts: impl IntoIterator<Item = u64>) -> Self {
        let counts: Vec<u64> = counts.into_iter().collect();
        if !counts.is_empty() {
            self.resource_counts = counts;
        }
        self
    }

    /// Report elements under `selector` as hidden for their first `queries`
    /// lookups
    #[must_use]
    pub fn visible_after(mut self, selector: impl Into<Selector>, queries: usize) -> Self {
        let selector = selector.into();
        for (s, element) in &mut self.elements {
            if *s == selector {
                element.hidden_for = queries;
            }
        }
        self
    }

    /// Register an element under `selector`
    #[must_use]
    pub fn with_element(mut self, selector: impl Into<Selector>, snapshot: ElementSnapshot) -> Self {
        self.elements.push((
            selector.into(),
            MockElement {
                snapshot,
                link: None,
                hidden_for: 0,
            },
        ));
        self
    }

    /// Register an element that loads `url` when clicked
    #[must_use]
    pub fn with_link(
        mut self,
        selector: impl Into<Selector>,
        snapshot: ElementSnapshot,
        url: impl Into<String>,
    ) -> Self {
        self.elements.push((
            selector.into(),
            MockElement {
                snapshot,
                link: Some(url.into()),
                hidden_for: 0,
            },
        ));
        self
    }

    /// Load `url` when `key` is pressed on any element
    #[must_use]
    pub fn on_key(mut self, key: impl Into<String>, url: impl Into<String>) -> Self {
        self.key_actions.push((key.into(), url.into()));
        self
    }

    fn position(&self, selector: &Selector) -> Option<usize> {
        if let Some(index) = self.elements.iter().position(|(s, _)| s == selector) {
            return Some(index);
        }
        match selector {
            Selector::Any(branches) => branches.iter().find_map(|b| self.position(b)),
            _ => None,
        }
    }
}

fn step<T: Clone + Default>(values: &[T], polls: &mut usize) -> T {
    let value = values
        .get(*polls)
        .or_else(|| values.last())
        .cloned()
        .unwrap_or_default();
    *polls += 1;
    value
}

/// URL-to-document map plus failure switches
#[derive(Debug, Clone, Default)]
pub struct MockSite {
    documents: HashMap<String, MockDocument>,
    unreachable: HashSet<String>,
    fail_page_close: bool,
    fail_context_close: bool,
    history: Arc<Mutex<Vec<String>>>,
}

impl MockSite {
    /// Empty site; unknown URLs load a blank document
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `document` at `url`
    #[must_use]
    pub fn with_page(mut self, url: impl Into<String>, document: MockDocument) -> Self {
        self.documents.insert(url.into(), document);
        self
    }

    /// Make navigation to `url` fail
    #[must_use]
    pub fn with_unreachable(mut self, url: impl Into<String>) -> Self {
        self.unreachable.insert(url.into());
        self
    }

    /// Make `PageDriver::close` fail
    #[must_use]
    pub const fn with_failing_page_close(mut self) -> Self {
        self.fail_page_close = true;
        self
    }

    /// Make `BrowserContext::close` fail
    #[must_use]
    pub const fn with_failing_context_close(mut self) -> Self {
        self.fail_context_close = true;
        self
    }

    /// Calls recorded so far
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    /// Whether any recorded call starts with `prefix`
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.history().iter().any(|call| call.starts_with(prefix))
    }

    fn record(&self, call: impl Into<String>) {
        if let Ok(mut history) = self.history.lock() {
            history.push(call.into());
        }
    }

    fn document(&self, url: &str) -> MockDocument {
        self.documents.get(url).cloned().unwrap_or_default()
    }
}

/// Browser backed by a [`MockSite`]
#[derive(Debug, Clone)]
pub struct MockBrowser {
    site: MockSite,
}

impl MockBrowser {
    /// Create a browser serving `site`
    #[must_use]
    pub const fn new(site: MockSite) -> Self {
        Self { site }
    }
}

#[async_trait]
impl Browser for MockBrowser {
    fn name(&self) -> &str {
        "mock"
    }

    async fn new_context(&self, options: &ContextOptions) -> HarnessResult<Box<dyn BrowserContext>> {
        self.site.record(format!(
            "new_context:{}x{}",
            options.viewport_width, options.viewport_height
        ));
        Ok(Box::new(MockContext {
            site: self.site.clone(),
        }))
    }

    async fn close(&self) -> HarnessResult<()> {
        self.site.record("close_browser");
        Ok(())
    }
}

#[derive(Debug)]
struct MockContext {
    site: MockSite,
}

#[async_trait]
impl BrowserContext for MockContext {
    async fn new_page(&self) -> HarnessResult<Box<dyn PageDriver>> {
        self.site.record("new_page");
        Ok(Box::new(MockPage {
            site: self.site.clone(),
            state: Mutex::new(PageState::new("about:blank", MockDocument::new())),
        }))
    }

    async fn close(&self) -> HarnessResult<()> {
        self.site.record("close_context");
        if self.site.fail_context_close {
            return Err(HarnessError::page("context already disposed"));
        }
        Ok(())
    }
}

#[derive(Debug)]
struct PageState {
    url: String,
    document: MockDocument,
    ready_polls: usize,
    resource_polls: usize,
    element_queries: HashMap<usize, usize>,
}

impl PageState {
    fn new(url: &str, document: MockDocument) -> Self {
        Self {
            url: url.to_string(),
            document,
            ready_polls: 0,
            resource_polls: 0,
            element_queries: HashMap::new(),
        }
    }

    fn query(&mut self, selector: &Selector) -> Option<ElementSnapshot> {
        let index = self.document.position(selector)?;
        let element = &self.document.elements[index].1;
        let seen = self.element_queries.entry(index).or_insert(0);
        let mut snapshot = element.snapshot.clone();
        if *seen < element.hidden_for {
            snapshot.visible = false;
        }
        *seen += 1;
        Some(snapshot)
    }
}

#[derive(Debug)]
struct MockPage {
    site: MockSite,
    state: Mutex<PageState>,
}

impl MockPage {
    fn state(&self) -> HarnessResult<MutexGuard<'_, PageState>> {
        self.state
            .lock()
            .map_err(|_| HarnessError::page("mock page state poisoned"))
    }

    fn load(&self, url: &str) -> HarnessResult<()> {
        if self.site.unreachable.contains(url) {
            return Err(HarnessError::NavigationError {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }
        *self.state()? = PageState::new(url, self.site.document(url));
        Ok(())
    }

    fn element(&self, selector: &Selector) -> HarnessResult<MockElement> {
        let state = self.state()?;
        state
            .document
            .position(selector)
            .map(|index| state.document.elements[index].1.clone())
            .ok_or_else(|| HarnessError::ElementNotFound {
                selector: selector.to_string(),
            })
    }
}

#[async_trait]
impl PageDriver for MockPage {
    async fn navigate(&self, url: &str) -> HarnessResult<()> {
        self.site.record(format!("navigate:{url}"));
        self.load(url)
    }

    async fn ready_state(&self) -> HarnessResult<String> {
        let mut state = self.state()?;
        let PageState {
            document, ready_polls, ..
        } = &mut *state;
        Ok(step(&document.ready_states, ready_polls))
    }

    async fn resource_count(&self) -> HarnessResult<u64> {
        let mut state = self.state()?;
        let PageState {
            document,
            resource_polls,
            ..
        } = &mut *state;
        Ok(step(&document.resource_counts, resource_polls))
    }

    async fn current_url(&self) -> HarnessResult<String> {
        Ok(self.state()?.url.clone())
    }

    async fn content(&self) -> HarnessResult<String> {
        Ok(self.state()?.document.content.clone())
    }

    async fn query(&self, selector: &Selector) -> HarnessResult<Option<ElementSnapshot>> {
        Ok(self.state()?.query(selector))
    }

    async fn click(&self, selector: &Selector) -> HarnessResult<()> {
        self.site.record(format!("click:{selector}"));
        let element = self.element(selector)?;
        if let Some(url) = element.link {
            self.load(&url)?;
        }
        Ok(())
    }

    async fn fill(&self, selector: &Selector, text: &str) -> HarnessResult<()> {
        self.site.record(format!("fill:{selector}={text}"));
        self.element(selector).map(|_| ())
    }

    async fn press(&self, selector: &Selector, key: &str) -> HarnessResult<()> {
        self.site.record(format!("press:{selector}:{key}"));
        self.element(selector)?;
        let target = self
            .state()?
            .document
            .key_actions
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, url)| url.clone());
        if let Some(url) = target {
            self.load(&url)?;
        }
        Ok(())
    }

    async fn close(&self) -> HarnessResult<()> {
        self.site.record("close_page");
        if self.site.fail_page_close {
            return Err(HarnessError::page("target closed"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open(site: &MockSite) -> Box<dyn PageDriver> {
        let browser = MockBrowser::new(site.clone());
        let context = browser.new_context(&ContextOptions::default()).await.unwrap();
        context.new_page().await.unwrap()
    }

    #[tokio::test]
    async fn test_unknown_url_is_blank_and_complete() {
        let site = MockSite::new();
        let page = open(&site).await;
        page.navigate("https://github.com/nowhere").await.unwrap();
        assert_eq!(page.ready_state().await.unwrap(), "complete");
        assert_eq!(page.current_url().await.unwrap(), "https://github.com/nowhere");
        assert!(page.query(&Selector::css("h1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_any_falls_back_to_registered_branch() {
        let site = MockSite::new().with_page(
            "https://x.test/",
            MockDocument::new().with_element(
                r#"a[href*="/topics/"]"#,
                ElementSnapshot::new("a").with_text("editor"),
            ),
        );
        let page = open(&site).await;
        page.navigate("https://x.test/").await.unwrap();
        let any = Selector::any([
            Selector::css(r#"a[data-octo-click="topic"]"#),
            Selector::css(r#"a[href*="/topics/"]"#),
        ]);
        let snap = page.query(&any).await.unwrap().unwrap();
        assert_eq!(snap.inner_text, "editor");
    }

    #[tokio::test]
    async fn test_click_follows_link_and_press_follows_key_action() {
        let site = MockSite::new()
            .with_page(
                "https://x.test/",
                MockDocument::new()
                    .with_link("a.next", ElementSnapshot::new("a"), "https://x.test/next")
                    .with_element("input", ElementSnapshot::new("input"))
                    .on_key("Enter", "https://x.test/search?q=a"),
            );
        let page = open(&site).await;
        page.navigate("https://x.test/").await.unwrap();
        page.press(&Selector::css("input"), "Enter").await.unwrap();
        assert_eq!(page.current_url().await.unwrap(), "https://x.test/search?q=a");

        page.navigate("https://x.test/").await.unwrap();
        page.click(&Selector::css("a.next")).await.unwrap();
        assert_eq!(page.current_url().await.unwrap(), "https://x.test/next");
        assert!(site.was_called("click:a.next"));
    }

    #[tokio::test]
    async fn test_transitions_advance_per_poll_and_reset_on_navigation() {
        let site = MockSite::new().with_page(
            "https://x.test/",
            MockDocument::new()
                .with_ready_states(["loading", "interactive", "complete"])
                .with_resource_counts([4, 9])
                .with_element("#late", ElementSnapshot::new("span").with_text("172k"))
                .visible_after("#late", 2),
        );
        let page = open(&site).await;
        page.navigate("https://x.test/").await.unwrap();

        let mut states = Vec::new();
        for _ in 0..4 {
            states.push(page.ready_state().await.unwrap());
        }
        assert_eq!(states, ["loading", "interactive", "complete", "complete"]);

        assert_eq!(page.resource_count().await.unwrap(), 4);
        assert_eq!(page.resource_count().await.unwrap(), 9);
        assert_eq!(page.resource_count().await.unwrap(), 9);

        let late = Selector::css("#late");
        let mut visible = Vec::new();
        for _ in 0..3 {
            visible.push(page.query(&late).await.unwrap().unwrap().visible);
        }
        assert_eq!(visible, [false, false, true]);

        page.navigate("https://x.test/").await.unwrap();
        assert_eq!(page.ready_state().await.unwrap(), "loading");
        assert!(!page.query(&late).await.unwrap().unwrap().visible);
    }

    #[tokio::test]
    async fn test_actions_on_missing_elements_fail() {
        let site = MockSite::new();
        let page = open(&site).await;
        let err = page.click(&Selector::css("#missing")).await.unwrap_err();
        assert!(matches!(err, HarnessError::ElementNotFound { .. }));
        assert!(page.fill(&Selector::css("#missing"), "x").await.is_err());
    }

    #[tokio::test]
    async fn test_failure_switches() {
        let site = MockSite::new()
            .with_unreachable("https://down.test/")
            .with_failing_page_close()
            .with_failing_context_close();
        let browser = MockBrowser::new(site.clone());
        let context = browser.new_context(&ContextOptions::default()).await.unwrap();
        let page = context.new_page().await.unwrap();
        assert!(matches!(
            page.navigate("https://down.test/").await,
            Err(HarnessError::NavigationError { .. })
        ));
        assert!(page.close().await.is_err());
        assert!(context.close().await.is_err());
        assert_eq!(
            site.history(),
            vec![
                "new_context:1920x1080",
                "new_page",
                "navigate:https://down.test/",
                "close_page",
                "close_context",
            ]
        );
    }
}
