//! Search flow and not-found page checks.

use crate::assertion::Assertion;
use crate::harness::{Tag, TestCase, UiContext};
use crate::page::{log_test_step, PageHelper};
use crate::result::HarnessResult;
use crate::wait::LoadState;
use futures::future::BoxFuture;
use std::time::Duration;
use tracing::info;

/// Suite name
pub const SUITE: &str = "search";

/// Repository path that does not exist
pub const MISSING_REPO_PATH: &str = "/nonexistent-user-12345/nonexistent-repo-67890";
/// User path that does not exist
pub const MISSING_USER_PATH: &str = "/nonexistent-user-xyz-12345-abcde";

const SEARCH_INPUT_TIMEOUT: Duration = Duration::from_secs(5);
const RESULTS_TIMEOUT: Duration = Duration::from_secs(10);
const NETWORK_IDLE_TIMEOUT: Duration = Duration::from_secs(15);
const NOT_FOUND_MARKERS: [&str; 2] = ["404", "not found"];

/// Cases in this suite
#[must_use]
pub fn cases() -> Vec<TestCase> {
    [
        TestCase::ui(SUITE, "test_search_for_python_repositories", python_repositories),
        TestCase::ui(SUITE, "test_search_with_filters", with_filters),
        TestCase::ui(SUITE, "test_search_for_specific_repository", specific_repository),
        TestCase::ui(SUITE, "test_nonexistent_repository_shows_404", missing_repository),
        TestCase::ui(SUITE, "test_nonexistent_user_profile_shows_404", missing_user),
    ]
    .into_iter()
    .map(|case| case.with_tag(Tag::Bonus))
    .collect()
}

/// Open the search dialog from the home page, submit `term` and wait for
/// the results URL
async fn submit_search(ctx: &UiContext<'_>, helper: &PageHelper<'_>, term: &str) -> HarnessResult<String> {
    let selectors = &ctx.config.selectors;
    info!("Navigating to GitHub homepage: {}", ctx.config.web_base_url);
    helper.goto(&ctx.config.web_url("/")).await?;
    helper
        .wait_for_load_state(LoadState::DomContentLoaded, helper.timeouts().navigation)
        .await?;
    helper.pause().await;

    info!("Clicking search button to open search");
    helper.get_element(selectors.search_button.clone()).click().await?;
    helper.click_pause().await;

    info!("Locating search input field");
    let input = helper
        .verify_element_visible(selectors.search_input.clone(), SEARCH_INPUT_TIMEOUT)
        .await?;

    info!("Searching for: {term}");
    input.fill(term).await?;
    input.press("Enter").await?;

    info!("Waiting for search results page to load");
    helper.wait_for_url("**/search?**", RESULTS_TIMEOUT).await
}

fn python_repositories(ctx: UiContext<'_>) -> BoxFuture<'_, HarnessResult<()>> {
    Box::pin(async move {
        let helper = ctx.helper();
        let term = "python";
        log_test_step("Search for Python repositories");

        let url = submit_search(&ctx, &helper, term).await?;
        Assertion::contains(&url, "/search?").check()?;
        info!("Navigated to search results: {url}");

        info!("Waiting for search results to appear");
        helper.settle().await;
        let results = helper
            .get_element(ctx.config.selectors.search_results.clone())
            .with_text(term);
        results.wait_for_visible(RESULTS_TIMEOUT).await?;

        let count = results.count().await?;
        info!("Found {count} search results for '{term}'");
        Ok(())
    })
}

fn with_filters(ctx: UiContext<'_>) -> BoxFuture<'_, HarnessResult<()>> {
    Box::pin(async move {
        let helper = ctx.helper();
        log_test_step("Search with filters");

        info!("Navigating to GitHub search page directly");
        helper
            .goto(&ctx.config.web_url("/search?q=react&type=repositories"))
            .await?;
        info!("Waiting for search results to load");
        helper
            .wait_for_load_state(LoadState::NetworkIdle, NETWORK_IDLE_TIMEOUT)
            .await?;

        helper.verify_url_contains("q=react").await?;
        info!("Search query present in URL");

        helper.pause().await;
        let content = helper.content().await?;
        Assertion::greater_than(content.len(), 1000, "page content length").check()?;
        info!("Search results page loaded successfully");
        Ok(())
    })
}

fn specific_repository(ctx: UiContext<'_>) -> BoxFuture<'_, HarnessResult<()>> {
    Box::pin(async move {
        let helper = ctx.helper();
        let term = ctx.config.ui_target.to_string();
        log_test_step(&format!("Search for repository {term}"));

        submit_search(&ctx, &helper, &term).await?;
        info!("Search results page loaded");
        helper.settle().await;

        helper.verify_url_contains("search").await?;
        info!("Search executed successfully for '{term}'");
        Ok(())
    })
}

fn missing_repository(ctx: UiContext<'_>) -> BoxFuture<'_, HarnessResult<()>> {
    Box::pin(async move {
        let helper = ctx.helper();
        let url = ctx.config.web_url(MISSING_REPO_PATH);
        log_test_step("Nonexistent repository shows 404");

        info!("Navigating to nonexistent repository: {url}");
        helper.goto(&url).await?;
        helper
            .wait_for_load_state(LoadState::DomContentLoaded, helper.timeouts().navigation)
            .await?;
        helper.pause().await;

        info!("Checking for 404 error indicators");
        let content = helper.content().await?;
        Assertion::contains_any_ignore_case(&content, &NOT_FOUND_MARKERS).check()?;
        info!("404 error page displayed correctly");
        Ok(())
    })
}

fn missing_user(ctx: UiContext<'_>) -> BoxFuture<'_, HarnessResult<()>> {
    Box::pin(async move {
        let helper = ctx.helper();
        let url = ctx.config.web_url(MISSING_USER_PATH);
        log_test_step("Nonexistent user profile shows 404");

        info!("Navigating to nonexistent user: {url}");
        helper.goto(&url).await?;
        helper
            .wait_for_load_state(LoadState::NetworkIdle, NETWORK_IDLE_TIMEOUT)
            .await?;

        info!("Verifying 404 response");
        let content = helper.content().await?;
        Assertion::contains_any_ignore_case(&content, &NOT_FOUND_MARKERS).check()?;
        info!("Nonexistent user profile shows 404 error");
        Ok(())
    })
}
