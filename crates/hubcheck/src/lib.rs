//! Hubcheck: end-to-end checks for public GitHub repository pages and the
//! REST API behind them.
//!
//! A fixed battery of cases drives a real browser over the DevTools
//! protocol and issues unauthenticated REST requests, asserting on what the
//! live site renders and returns today.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       HUBCHECK Architecture                      │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐    ┌────────────┐    ┌────────────┐               │
//! │  │  suites   │───►│ TestRunner │───►│ BrowserSlot│──► chromium   │
//! │  │ (cases)   │    │ (harness)  │    │ PageSession│    (CDP)      │
//! │  └───────────┘    └─────┬──────┘    └────────────┘               │
//! │                         │                                        │
//! │                         ├──────────► ApiClient ──► api.github.com│
//! │                         ▼                                        │
//! │                  SuiteResults ──► RunReport (JSON)               │
//! │                                                                  │
//! │  tracing ──► stdout + logs/tests.log (rotated)                   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use hubcheck::{suites, HarnessConfig, NoopObserver, TestFilter, Tag, TestRunner};
//!
//! # async fn run() {
//! let cases = TestFilter::all().with_tags([Tag::Api]).apply(suites::all());
//! let runner = TestRunner::new(HarnessConfig::default());
//! let results = runner.run(&cases, &mut NoopObserver).await;
//! assert!(results.all_passed());
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

pub mod api;
pub mod assertion;
pub mod browser;
pub mod config;
pub mod count;
pub mod driver;
pub mod fixture;
pub mod harness;
pub mod locator;
pub mod logging;
pub mod page;
pub mod report;
pub mod result;
pub mod selectors;
pub mod suites;
pub mod wait;

pub use api::{ApiClient, ApiResponse};
pub use assertion::{Assertion, AssertionResult};
pub use browser::{BrowserConfig, BrowserKind};
pub use config::{HarnessConfig, RepoTarget, Timeouts};
pub use count::extract_number_from_text;
pub use driver::{Browser, BrowserContext, ContextOptions, ElementSnapshot, PageDriver};
pub use fixture::{BrowserSlot, PageSession};
pub use harness::{
    ApiContext, NoopObserver, RunObserver, SuiteResults, Tag, TestBody, TestCase, TestFilter,
    TestResult, TestRunner, UiContext,
};
pub use locator::Selector;
pub use logging::LogConfig;
pub use page::{log_test_step, safe_get_text, Locator, PageHelper};
pub use report::RunReport;
pub use result::{HarnessError, HarnessResult};
pub use selectors::SelectorCatalog;
pub use wait::{LoadState, UrlPattern};
