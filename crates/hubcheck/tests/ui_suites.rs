//! The browser suites run against an in-memory copy of the pages they visit.

use hubcheck::driver::{MockBrowser, MockDocument, MockSite};
use hubcheck::suites::{repository_ui, search};
use hubcheck::{
    BrowserSlot, ElementSnapshot, HarnessConfig, NoopObserver, RunObserver, SelectorCatalog,
    SuiteResults, TestCase, TestResult, TestRunner, Timeouts,
};
use std::time::Duration;

const REPO: &str = "https://github.com/microsoft/vscode";
const TS_HREF: &str = "/microsoft/vscode/blob/main/src/vs/nls.ts";
const SEARCH_URL: &str = "https://github.com/search?q=python&type=repositories";

fn config() -> HarnessConfig {
    let mut config = HarnessConfig::default().with_timeouts(Timeouts::fast());
    config.browser.slow_mo_ms = 0;
    config
}

fn padded(body: &str) -> String {
    format!("<html><body>{body}{}</body></html>", "<div></div>".repeat(150))
}

fn repo_page(stars: &str) -> MockDocument {
    let s = SelectorCatalog::default();
    MockDocument::new()
        .with_content(padded("<h1>vscode</h1>"))
        .with_element(s.repo_name_link, ElementSnapshot::new("a").with_text("vscode"))
        .with_element(s.owner_link, ElementSnapshot::new("a").with_text("microsoft"))
        .with_element(s.star_counter, ElementSnapshot::new("span").with_text(stars))
        .with_element(s.fork_counter, ElementSnapshot::new("span").with_text("30.1k"))
        .with_element(
            s.readme,
            ElementSnapshot::new("article").with_html(format!(
                "<h1>Visual Studio Code - Open Source (\"Code - OSS\")</h1>{}",
                "<p>The repository where we develop the product together.</p>".repeat(3)
            )),
        )
        .with_element(s.about_section.clone(), ElementSnapshot::new("div").with_text("About"))
        .with_element(
            s.about_section.within(s.about_description),
            ElementSnapshot::new("p").with_text("Visual Studio Code"),
        )
        .with_element(
            hubcheck::Selector::css(r#"a[href*="LICENSE"]"#),
            ElementSnapshot::new("a").with_text("MIT license"),
        )
        .with_element(
            hubcheck::Selector::css(r#"a[href*="/topics/"]"#),
            ElementSnapshot::new("a").with_text("editor").with_match_count(8),
        )
}

fn github(stars: &str) -> MockSite {
    let s = SelectorCatalog::default();
    MockSite::new()
        .with_page(REPO, repo_page(stars))
        .with_page(
            format!("{REPO}/tree/main/src"),
            MockDocument::new().with_content(padded("<a href=\"/microsoft/vscode/tree/main/src/vs\">src/vs</a>")),
        )
        .with_page(
            format!("{REPO}/tree/main/src/vs"),
            MockDocument::new().with_element(
                s.typescript_file_link,
                ElementSnapshot::new("a").with_text("nls.ts").with_attribute("href", TS_HREF),
            ),
        )
        .with_page(
            format!("https://github.com{TS_HREF}"),
            MockDocument::new()
                .with_element(s.line_numbers, ElementSnapshot::new("div").with_text("1"))
                .with_element(s.code_lines, ElementSnapshot::new("div").with_text("export function localize()"))
                .with_element(s.code_container, ElementSnapshot::new("div")),
        )
        .with_page(
            "https://github.com/",
            MockDocument::new()
                .with_element(s.search_button, ElementSnapshot::new("button"))
                .with_element(s.search_input, ElementSnapshot::new("input"))
                .on_key("Enter", SEARCH_URL),
        )
        .with_page(
            SEARCH_URL,
            MockDocument::new().with_content(padded("python")).with_element(
                s.search_results.with_text("python"),
                ElementSnapshot::new("a").with_text("python/cpython").with_match_count(10),
            ),
        )
        .with_page(
            "https://github.com/search?q=react&type=repositories",
            MockDocument::new().with_content(padded("facebook/react")),
        )
        .with_page(
            format!("https://github.com{}", search::MISSING_REPO_PATH),
            MockDocument::new().with_content("<html><title>Page not found · GitHub</title></html>"),
        )
        .with_page(
            format!("https://github.com{}", search::MISSING_USER_PATH),
            MockDocument::new().with_content("<html><body><img alt=\"404 “This is not the web page you are looking for”\"></body></html>"),
        )
}

async fn run(site: &MockSite, cases: &[TestCase]) -> SuiteResults {
    run_configured(site, cases, config()).await
}

async fn run_configured(site: &MockSite, cases: &[TestCase], config: HarnessConfig) -> SuiteResults {
    let slot = BrowserSlot::Ready(Box::new(MockBrowser::new(site.clone())));
    TestRunner::new(config)
        .run_with(cases, slot, &mut NoopObserver)
        .await
}

fn assert_all_passed(results: &SuiteResults) {
    let failures: Vec<_> = results
        .failures()
        .iter()
        .map(|r| format!("{}: {}", r.name, r.error.as_deref().unwrap_or_default()))
        .collect();
    assert!(results.all_passed(), "failures: {failures:#?}");
}

// ============================================================================
// Repository page
// ============================================================================

#[tokio::test]
async fn repository_ui_suite_passes_on_expected_markup() {
    let site = github("172k");
    let results = run(&site, &repository_ui::cases()).await;
    assert_all_passed(&results);
    assert_eq!(results.total(), 9);
}

#[tokio::test]
async fn low_star_count_is_reported() {
    let site = github("99.9k");
    let cases: Vec<_> = repository_ui::cases()
        .into_iter()
        .filter(|c| c.name == "test_star_count_visible_and_significant")
        .collect();
    let results = run(&site, &cases).await;
    let error = results.failures()[0].error.clone().unwrap();
    assert!(error.contains("star count > 100000"), "{error}");
    assert!(error.contains("99900"), "{error}");
}

#[tokio::test]
async fn missing_element_fails_with_timeout() {
    let site = MockSite::new().with_page(REPO, MockDocument::new());
    let cases: Vec<_> = repository_ui::cases()
        .into_iter()
        .filter(|c| c.name == "test_fork_count_visible")
        .collect();
    let results = run(&site, &cases).await;
    let error = results.failures()[0].error.clone().unwrap();
    assert!(error.contains("#repo-network-counter to be visible"), "{error}");
}

#[tokio::test]
async fn typescript_case_follows_link_href() {
    let site = github("172k");
    let cases: Vec<_> = repository_ui::cases()
        .into_iter()
        .filter(|c| c.name.contains("typescript"))
        .collect();
    assert_all_passed(&run(&site, &cases).await);
    assert!(site.was_called(&format!("navigate:https://github.com{TS_HREF}")));
}

// ============================================================================
// Search and not-found pages
// ============================================================================

#[tokio::test]
async fn search_suite_passes_on_expected_markup() {
    let site = github("172k");
    let results = run(&site, &search::cases()).await;
    assert_all_passed(&results);
    assert_eq!(results.total(), 5);
}

#[tokio::test]
async fn search_types_term_and_submits() {
    let site = github("172k");
    let cases: Vec<_> = search::cases()
        .into_iter()
        .filter(|c| c.name == "test_search_for_specific_repository")
        .collect();
    assert_all_passed(&run(&site, &cases).await);
    let history = site.history();
    assert!(history.iter().any(|c| c.starts_with("fill:") && c.ends_with("=microsoft/vscode")));
    assert!(history.iter().any(|c| c.starts_with("press:") && c.ends_with(":Enter")));
}

#[tokio::test]
async fn page_without_not_found_marker_fails() {
    let site = MockSite::new();
    let cases: Vec<_> = search::cases()
        .into_iter()
        .filter(|c| c.name == "test_nonexistent_repository_shows_404")
        .collect();
    let results = run(&site, &cases).await;
    let error = results.failures()[0].error.clone().unwrap();
    assert!(error.contains("404"), "{error}");
}

// ============================================================================
// Runner behavior across suites
// ============================================================================

#[derive(Default)]
struct Progress {
    finished: Vec<TestResult>,
}

impl RunObserver for Progress {
    fn on_finish(&mut self, result: &TestResult) {
        self.finished.push(result.clone());
    }
}

#[tokio::test]
async fn every_case_gets_a_fresh_context_and_cleans_up() {
    let site = github("172k");
    let cases = repository_ui::cases();
    let slot = BrowserSlot::Ready(Box::new(MockBrowser::new(site.clone())));
    let mut progress = Progress::default();
    TestRunner::new(config())
        .run_with(&cases, slot, &mut progress)
        .await;

    assert_eq!(progress.finished.len(), cases.len());
    let history = site.history();
    let opened = history.iter().filter(|c| c.starts_with("new_context:")).count();
    let closed = history.iter().filter(|c| *c == "close_context").count();
    assert_eq!(opened, cases.len());
    assert_eq!(closed, cases.len());
}

#[tokio::test]
async fn search_dialog_waits_click_pause_not_page_pause() {
    let site = github("172k");
    let cases: Vec<TestCase> = search::cases()
        .into_iter()
        .filter(|c| c.name == "test_search_for_specific_repository")
        .collect();
    assert_eq!(cases.len(), 1);

    let mut slow_click = config();
    slow_click.timeouts.click_pause = Duration::from_millis(250);
    let results = run_configured(&site, &cases, slow_click).await;
    assert_all_passed(&results);
    assert!(results.duration >= Duration::from_millis(250));

    let mut slow_page = config();
    slow_page.timeouts.pause = Duration::from_millis(500);
    let results = run_configured(&site, &cases, slow_page).await;
    assert_all_passed(&results);
    assert!(results.duration >= Duration::from_millis(500));
    assert!(results.duration < Duration::from_millis(1000));
}
