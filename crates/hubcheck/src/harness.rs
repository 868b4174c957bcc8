//! Test registry and runner.
//!
//! Cases run one at a time. API cases share one [`ApiClient`]; UI cases each
//! get a fresh [`PageSession`]. A failing case is recorded and the run moves
//! on, unless fail-fast is set.

use crate::api::ApiClient;
use crate::config::HarnessConfig;
use crate::driver::PageDriver;
use crate::fixture::{BrowserSlot, PageSession};
use crate::page::PageHelper;
use crate::result::{HarnessError, HarnessResult};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Selection tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    /// REST API checks, no browser
    Api,
    /// Needs a browser
    Ui,
    /// Extra coverage beyond the core battery
    Bonus,
}

impl Tag {
    /// Lower-case name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Ui => "ui",
            Self::Bonus => "bonus",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tag {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" => Ok(Self::Api),
            "ui" => Ok(Self::Ui),
            "bonus" => Ok(Self::Bonus),
            other => Err(HarnessError::config(format!(
                "unknown tag '{other}', expected api, ui or bonus"
            ))),
        }
    }
}

/// What an API body receives
#[derive(Debug, Clone, Copy)]
pub struct ApiContext<'a> {
    /// Client for the configured API base URL
    pub client: &'a ApiClient,
    /// Run configuration
    pub config: &'a HarnessConfig,
}

/// What a UI body receives
#[derive(Clone, Copy)]
pub struct UiContext<'a> {
    /// The test's own page
    pub page: &'a dyn PageDriver,
    /// Run configuration
    pub config: &'a HarnessConfig,
}

impl fmt::Debug for UiContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiContext").finish_non_exhaustive()
    }
}

impl<'a> UiContext<'a> {
    /// Page helper bound to this context
    #[must_use]
    pub fn helper(&self) -> PageHelper<'a> {
        PageHelper::new(self.page, self.config)
    }
}

/// Body of an API case
pub type ApiBody = for<'a> fn(ApiContext<'a>) -> BoxFuture<'a, HarnessResult<()>>;

/// Body of a UI case
pub type UiBody = for<'a> fn(UiContext<'a>) -> BoxFuture<'a, HarnessResult<()>>;

/// Test body
#[derive(Clone, Copy)]
pub enum TestBody {
    /// Runs against the REST API
    Api(ApiBody),
    /// Runs against a browser page
    Ui(UiBody),
}

impl fmt::Debug for TestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(_) => f.write_str("Api(..)"),
            Self::Ui(_) => f.write_str("Ui(..)"),
        }
    }
}

/// A single test case
#[derive(Debug, Clone)]
pub struct TestCase {
    /// Suite the case belongs to
    pub suite: &'static str,
    /// Test name
    pub name: &'static str,
    /// Selection tags
    pub tags: Vec<Tag>,
    /// Body
    pub body: TestBody,
}

impl TestCase {
    /// API case tagged `api`
    #[must_use]
    pub fn api(suite: &'static str, name: &'static str, body: ApiBody) -> Self {
        Self {
            suite,
            name,
            tags: vec![Tag::Api],
            body: TestBody::Api(body),
        }
    }

    /// UI case tagged `ui`
    #[must_use]
    pub fn ui(suite: &'static str, name: &'static str, body: UiBody) -> Self {
        Self {
            suite,
            name,
            tags: vec![Tag::Ui],
            body: TestBody::Ui(body),
        }
    }

    /// Add a tag
    #[must_use]
    pub fn with_tag(mut self, tag: Tag) -> Self {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    /// `suite::name`
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}::{}", self.suite, self.name)
    }

    /// Whether the case needs a browser page
    #[must_use]
    pub const fn needs_browser(&self) -> bool {
        matches!(self.body, TestBody::Ui(_))
    }

    /// Whether the case carries `tag`
    #[must_use]
    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }
}

/// Case selection by tag and id substring
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestFilter {
    /// Keep cases carrying any of these tags (empty = all)
    pub tags: Vec<Tag>,
    /// Keep cases whose id contains this
    pub substring: Option<String>,
}

impl TestFilter {
    /// Select everything
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Require one of `tags`
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags.extend(tags);
        self
    }

    /// Require `substring` in the case id
    #[must_use]
    pub fn with_substring(mut self, substring: impl Into<String>) -> Self {
        self.substring = Some(substring.into());
        self
    }

    /// Whether `case` is selected
    #[must_use]
    pub fn matches(&self, case: &TestCase) -> bool {
        let tag_ok = self.tags.is_empty() || self.tags.iter().any(|t| case.has_tag(*t));
        let name_ok = self
            .substring
            .as_deref()
            .map_or(true, |s| case.id().contains(s));
        tag_ok && name_ok
    }

    /// Selected cases, in registry order
    #[must_use]
    pub fn apply(&self, cases: Vec<TestCase>) -> Vec<TestCase> {
        cases.into_iter().filter(|c| self.matches(c)).collect()
    }
}

/// Result of running a single test
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test id
    pub name: String,
    /// Whether test passed
    pub passed: bool,
    /// Error message if failed
    pub error: Option<String>,
    /// Test duration
    pub duration: Duration,
}

impl TestResult {
    /// Create a passing test result
    #[must_use]
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            error: None,
            duration: Duration::ZERO,
        }
    }

    /// Create a failing test result
    #[must_use]
    pub fn fail(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            error: Some(error.into()),
            duration: Duration::ZERO,
        }
    }

    /// Set duration
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Results from one run
#[derive(Debug, Clone)]
pub struct SuiteResults {
    /// Suite name
    pub suite_name: String,
    /// Individual test results
    pub results: Vec<TestResult>,
    /// Total duration
    pub duration: Duration,
}

impl SuiteResults {
    /// Check if all tests passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    /// Count passed tests
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    /// Count failed tests
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.passed).count()
    }

    /// Get total test count
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Get failed tests
    #[must_use]
    pub fn failures(&self) -> Vec<&TestResult> {
        self.results.iter().filter(|r| !r.passed).collect()
    }
}

/// Progress callbacks
pub trait RunObserver {
    /// A case is about to run
    fn on_start(&mut self, _case: &TestCase) {}

    /// A case finished
    fn on_finish(&mut self, _result: &TestResult) {}
}

/// Observer that ignores everything
#[derive(Debug, Default)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

/// Sequential runner
#[derive(Debug)]
pub struct TestRunner {
    config: HarnessConfig,
    fail_fast: bool,
}

impl TestRunner {
    /// Create a runner for `config`
    #[must_use]
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            fail_fast: false,
        }
    }

    /// Stop after the first failure
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Run configuration
    #[must_use]
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run `cases`, launching a browser if any of them needs one
    pub async fn run(&self, cases: &[TestCase], observer: &mut dyn RunObserver) -> SuiteResults {
        let needs_browser = cases.iter().any(TestCase::needs_browser);
        let slot = BrowserSlot::launch_for(needs_browser, &self.config.browser).await;
        self.run_with(cases, slot, observer).await
    }

    /// Run `cases` with an already prepared browser slot
    pub async fn run_with(
        &self,
        cases: &[TestCase],
        slot: BrowserSlot,
        observer: &mut dyn RunObserver,
    ) -> SuiteResults {
        let start = Instant::now();
        let api = ApiClient::new(&self.config.api_base_url).map_err(|e| e.to_string());
        let mut results = Vec::with_capacity(cases.len());

        for case in cases {
            observer.on_start(case);
            let result = self.run_case(case, &api, &slot).await;
            observer.on_finish(&result);
            let stop = self.fail_fast && !result.passed;
            results.push(result);
            if stop {
                info!("Fail-fast: stopping after first failure");
                break;
            }
        }

        slot.close().await;
        SuiteResults {
            suite_name: "hubcheck".to_string(),
            results,
            duration: start.elapsed(),
        }
    }

    async fn run_case(
        &self,
        case: &TestCase,
        api: &Result<ApiClient, String>,
        slot: &BrowserSlot,
    ) -> TestResult {
        let id = case.id();
        info!("========== Starting test: {id} ==========");
        let start = Instant::now();

        let outcome = match case.body {
            TestBody::Api(body) => match api {
                Ok(client) => {
                    body(ApiContext {
                        client,
                        config: &self.config,
                    })
                    .await
                }
                Err(message) => Err(HarnessError::config(format!(
                    "API client unavailable: {message}"
                ))),
            },
            TestBody::Ui(body) => self.run_ui(body, slot).await,
        };

        let result = match outcome {
            Ok(()) => TestResult::pass(&id),
            Err(e) => {
                error!("Test {id} failed: {e}");
                TestResult::fail(&id, e.to_string())
            }
        }
        .with_duration(start.elapsed());

        info!("========== Finished test: {id} ==========");
        result
    }

    async fn run_ui(&self, body: UiBody, slot: &BrowserSlot) -> HarnessResult<()> {
        let browser = slot.browser()?;
        let session = PageSession::open(browser, &self.config.browser.context_options()).await?;
        let outcome = body(UiContext {
            page: session.page(),
            config: &self.config,
        })
        .await;
        session.close().await;
        outcome
    }
}
