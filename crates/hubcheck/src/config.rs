//! Configuration for the suites.
//!
//! Constants name the live targets; [`HarnessConfig`] carries them (plus
//! browser, timeout, logging and selector settings) through a run so that
//! nothing reads process-global state.

use crate::browser::{BrowserConfig, BrowserKind};
use crate::logging::LogConfig;
use crate::selectors::SelectorCatalog;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Web front end under test
pub const GITHUB_BASE_URL: &str = "https://github.com";
/// REST API under test
pub const GITHUB_API_BASE_URL: &str = "https://api.github.com";

/// Owner of the repository the UI suites visit
pub const TEST_REPO_OWNER: &str = "microsoft";
/// Repository the UI suites visit
pub const TEST_REPO_NAME: &str = "vscode";

/// Owner of the repository the API suite queries
pub const API_TEST_OWNER: &str = "facebook";
/// Repository the API suite queries
pub const API_TEST_REPO: &str = "react";
/// `owner/repo` path that does not exist
pub const API_NONEXISTENT_REPO: &str = "microsoft/nonexistent-repo-12345";

/// Minimum star count both the page and the API must report
pub const MIN_STAR_COUNT: u64 = 100_000;

/// Log directory, relative to the working directory
pub const LOG_DIR: &str = "logs";
/// Log file inside [`LOG_DIR`]
pub const LOG_FILE_NAME: &str = "tests.log";

/// Default timeout for navigation and element waits (10 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Pause after DOMContentLoaded for client-side rendering
pub const SETTLE_INTERVAL_MS: u64 = 3_000;
/// Shorter pause for menus, filters and lazily rendered sidebars
pub const PAUSE_INTERVAL_MS: u64 = 2_000;
/// Pause after clicking something that opens a dialog
pub const CLICK_PAUSE_MS: u64 = 1_000;
/// Visibility budget for best-effort text extraction
pub const SAFE_TEXT_TIMEOUT_MS: u64 = 5_000;

/// An `owner/name` repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoTarget {
    /// Owner login
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepoTarget {
    /// Create a repository target
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse `owner/name`
    #[must_use]
    pub fn parse(slug: &str) -> Option<Self> {
        let (owner, name) = slug.split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self::new(owner, name))
    }

    /// Web URL of the repository under `base_url`
    #[must_use]
    pub fn web_url(&self, base_url: &str) -> String {
        format!("{}/{self}", base_url.trim_end_matches('/'))
    }
}

impl fmt::Display for RepoTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Operation timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Navigation and load-state waits
    pub navigation: Duration,
    /// Element visibility waits
    pub element: Duration,
    /// Pause after DOMContentLoaded
    pub settle: Duration,
    /// Shorter pause for menus and lazily rendered regions
    pub pause: Duration,
    /// Pause after opening a dialog
    pub click_pause: Duration,
    /// Visibility budget for [`crate::page::safe_get_text`]
    pub safe_text: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            element: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            settle: Duration::from_millis(SETTLE_INTERVAL_MS),
            pause: Duration::from_millis(PAUSE_INTERVAL_MS),
            click_pause: Duration::from_millis(CLICK_PAUSE_MS),
            safe_text: Duration::from_millis(SAFE_TEXT_TIMEOUT_MS),
        }
    }
}

impl Timeouts {
    /// Short timeouts and no pauses, for offline tests
    #[must_use]
    pub const fn fast() -> Self {
        Self {
            navigation: Duration::from_millis(300),
            element: Duration::from_millis(300),
            settle: Duration::ZERO,
            pause: Duration::ZERO,
            click_pause: Duration::ZERO,
            safe_text: Duration::from_millis(200),
        }
    }
}

/// Full configuration for one run
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Web front end base URL
    pub web_base_url: String,
    /// REST API base URL
    pub api_base_url: String,
    /// Repository the UI suites visit
    pub ui_target: RepoTarget,
    /// Repository the API suite queries
    pub api_target: RepoTarget,
    /// `owner/repo` path expected to 404
    pub api_missing_repo: String,
    /// Minimum star count
    pub min_star_count: u64,
    /// Browser launch settings
    pub browser: BrowserConfig,
    /// Operation timeouts
    pub timeouts: Timeouts,
    /// Log sink settings
    pub log: LogConfig,
    /// Selectors for the target markup
    pub selectors: SelectorCatalog,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        let ui_target = RepoTarget::new(TEST_REPO_OWNER, TEST_REPO_NAME);
        Self {
            web_base_url: GITHUB_BASE_URL.to_string(),
            api_base_url: GITHUB_API_BASE_URL.to_string(),
            selectors: SelectorCatalog::for_repo(&ui_target),
            ui_target,
            api_target: RepoTarget::new(API_TEST_OWNER, API_TEST_REPO),
            api_missing_repo: API_NONEXISTENT_REPO.to_string(),
            min_star_count: MIN_STAR_COUNT,
            browser: BrowserConfig::default(),
            timeouts: Timeouts::default(),
            log: LogConfig::new(PathBuf::from(LOG_DIR), LOG_FILE_NAME),
        }
    }
}

impl HarnessConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the browser engine
    #[must_use]
    pub fn with_browser_kind(mut self, kind: BrowserKind) -> Self {
        self.browser.kind = kind;
        self
    }

    /// Replace browser settings
    #[must_use]
    pub fn with_browser(mut self, browser: BrowserConfig) -> Self {
        self.browser = browser;
        self
    }

    /// Point the UI suites at another web host
    #[must_use]
    pub fn with_web_base_url(mut self, url: impl Into<String>) -> Self {
        self.web_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Point the API suite at another API host
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the selector catalog
    #[must_use]
    pub fn with_selectors(mut self, selectors: SelectorCatalog) -> Self {
        self.selectors = selectors;
        self
    }

    /// Replace timeouts
    #[must_use]
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Replace log settings
    #[must_use]
    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Web URL of the UI target repository
    #[must_use]
    pub fn test_repo_url(&self) -> String {
        self.ui_target.web_url(&self.web_base_url)
    }

    /// Web URL below the web base
    #[must_use]
    pub fn web_url(&self, path: &str) -> String {
        format!("{}/{}", self.web_base_url, path.trim_start_matches('/'))
    }
}
