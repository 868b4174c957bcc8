//! Browser driver seams.
//!
//! ```text
//! ┌──────────────┐ new_context ┌────────────────┐ new_page ┌──────────────┐
//! │   Browser    │ ──────────► │ BrowserContext │ ───────► │  PageDriver  │
//! │ (one per run)│             │ (one per test) │          │(one per test)│
//! └──────────────┘             └────────────────┘          └──────────────┘
//!        │                                                        ▲
//!        ├── CDP implementation (chromiumoxide, `browser` feature)│
//!        └── MockBrowser (in-memory site for offline tests) ──────┘
//! ```
//!
//! Drivers are deliberately thin: they run one query or one action and
//! report what they saw. Waiting, polling and logging live in
//! [`crate::page`].

pub mod mock;

use crate::locator::Selector;
use crate::result::HarnessResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use mock::{MockBrowser, MockDocument, MockElement, MockSite};

/// Observable state of the first element matching a selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    /// Lower-case tag name
    pub tag_name: String,
    /// Non-empty bounding box and not hidden by style
    pub visible: bool,
    /// Rendered text (`innerText`)
    pub inner_text: String,
    /// Inner markup (`innerHTML`)
    pub inner_html: String,
    /// Raw text content (`textContent`)
    pub text_content: String,
    /// Attribute values by name
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Number of elements the selector matched
    pub match_count: usize,
}

impl ElementSnapshot {
    /// Visible element with no content
    #[must_use]
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            visible: true,
            inner_text: String::new(),
            inner_html: String::new(),
            text_content: String::new(),
            attributes: BTreeMap::new(),
            match_count: 1,
        }
    }

    /// Set rendered and raw text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.inner_text = text.into();
        self.text_content.clone_from(&self.inner_text);
        self
    }

    /// Set inner markup
    #[must_use]
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.inner_html = html.into();
        self
    }

    /// Add an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the number of matches
    #[must_use]
    pub const fn with_match_count(mut self, count: usize) -> Self {
        self.match_count = count;
        self
    }

    /// Mark as present but not visible
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Per-context settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextOptions {
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            viewport_width: 1920,
            viewport_height: 1080,
        }
    }
}

/// A launched browser
#[async_trait]
pub trait Browser: Send + Sync {
    /// Engine name
    fn name(&self) -> &str;

    /// Open an isolated context (own cookies and storage)
    async fn new_context(&self, options: &ContextOptions) -> HarnessResult<Box<dyn BrowserContext>>;

    /// Shut the browser down
    async fn close(&self) -> HarnessResult<()>;
}

/// An isolated browsing session
#[async_trait]
pub trait BrowserContext: Send + Sync {
    /// Open a blank page in this context
    async fn new_page(&self) -> HarnessResult<Box<dyn PageDriver>>;

    /// Dispose the context and everything in it
    async fn close(&self) -> HarnessResult<()>;
}

/// One page (tab)
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Start loading `url`; returns once the navigation is committed
    async fn navigate(&self, url: &str) -> HarnessResult<()>;

    /// Current `document.readyState`
    async fn ready_state(&self) -> HarnessResult<String>;

    /// Number of resources fetched so far (network-idle detection)
    async fn resource_count(&self) -> HarnessResult<u64>;

    /// Current URL
    async fn current_url(&self) -> HarnessResult<String>;

    /// Serialized document markup
    async fn content(&self) -> HarnessResult<String>;

    /// Snapshot of the first match, `None` when nothing matches
    async fn query(&self, selector: &Selector) -> HarnessResult<Option<ElementSnapshot>>;

    /// Click the first match
    async fn click(&self, selector: &Selector) -> HarnessResult<()>;

    /// Replace the value of the first match with `text`
    async fn fill(&self, selector: &Selector, text: &str) -> HarnessResult<()>;

    /// Press a named key (`"Enter"`) on the first match
    async fn press(&self, selector: &Selector, key: &str) -> HarnessResult<()>;

    /// Close the page
    async fn close(&self) -> HarnessResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_builder() {
        let snap = ElementSnapshot::new("a")
            .with_text("MIT license")
            .with_attribute("href", "/microsoft/vscode/blob/main/LICENSE.txt")
            .with_match_count(2);
        assert!(snap.visible);
        assert_eq!(snap.text_content, "MIT license");
        assert_eq!(snap.attributes["href"], "/microsoft/vscode/blob/main/LICENSE.txt");
        assert_eq!(snap.match_count, 2);
        assert!(!snap.hidden().visible);
    }

    #[test]
    fn test_snapshot_deserializes_from_page_json() {
        let json = r#"{"tag_name":"span","visible":true,"inner_text":"172k","inner_html":"172k","text_content":"172k","attributes":{"id":"repo-stars-counter-star"},"match_count":1}"#;
        let snap: ElementSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.inner_text, "172k");
        assert_eq!(snap.attributes["id"], "repo-stars-counter-star");
    }

    #[test]
    fn test_default_viewport() {
        let options = ContextOptions::default();
        assert_eq!((options.viewport_width, options.viewport_height), (1920, 1080));
    }
}
