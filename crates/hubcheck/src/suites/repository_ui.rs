//! Repository page checks against the configured UI target.
//!
//! Every case opens the repository page (DOMContentLoaded plus the settle
//! interval) before locating anything.

use crate::assertion::Assertion;
use crate::count::extract_number_from_text;
use crate::harness::{TestCase, UiContext};
use crate::page::log_test_step;
use crate::result::{HarnessError, HarnessResult};
use futures::future::BoxFuture;
use std::time::Duration;
use tracing::info;

/// Suite name
pub const SUITE: &str = "repository_ui";

const CODE_CONTAINER_TIMEOUT: Duration = Duration::from_secs(5);
const LICENSE_TIMEOUT: Duration = Duration::from_secs(10);
const README_TAGS: [&str; 4] = ["<h1", "<h2", "<p>", "<a"];

/// Cases in this suite
#[must_use]
pub fn cases() -> Vec<TestCase> {
    vec![
        TestCase::ui(SUITE, "test_repository_loads_and_displays_basic_info", basic_info),
        TestCase::ui(SUITE, "test_star_count_visible_and_significant", star_count),
        TestCase::ui(SUITE, "test_fork_count_visible", fork_count),
        TestCase::ui(SUITE, "test_readme_content_rendered", readme_rendered),
        TestCase::ui(SUITE, "test_navigate_to_src_folder", src_folder),
        TestCase::ui(SUITE, "test_navigate_to_typescript_file_with_line_numbers", typescript_file),
        TestCase::ui(SUITE, "test_about_section_has_description", about_description),
        TestCase::ui(SUITE, "test_license_information_displayed", license_displayed),
        TestCase::ui(SUITE, "test_topics_tags_visible", topics_visible),
    ]
}

fn basic_info(ctx: UiContext<'_>) -> BoxFuture<'_, HarnessResult<()>> {
    Box::pin(async move {
        let helper = ctx.helper();
        let (target, selectors) = (&ctx.config.ui_target, &ctx.config.selectors);
        let timeout = helper.timeouts().element;
        log_test_step("Load repository page and verify basic information");
        helper.open(&ctx.config.test_repo_url()).await?;

        info!("Verifying repository name: {}", target.name);
        let name = helper
            .verify_element_visible(selectors.repo_name_link.clone(), timeout)
            .await?;
        helper.verify_text_contains(&name, &target.name).await?;

        info!("Verifying owner: {}", target.owner);
        let owner = helper
            .verify_element_visible(selectors.owner_link.clone(), timeout)
            .await?;
        helper.verify_text_contains(&owner, &target.owner).await?;

        info!("Repository name and owner verified");
        Ok(())
    })
}

fn star_count(ctx: UiContext<'_>) -> BoxFuture<'_, HarnessResult<()>> {
    Box::pin(async move {
        let helper = ctx.helper();
        log_test_step("Check repository star count");
        helper.open(&ctx.config.test_repo_url()).await?;

        let stars = helper
            .verify_element_visible(ctx.config.selectors.star_counter.clone(), helper.timeouts().element)
            .await?;
        let count = extract_number_from_text(&stars.inner_text().await?);
        info!("Star count: {count}");
        Assertion::greater_than(count, ctx.config.min_star_count, "star count").check()?;
        info!("Star count exceeds {}", ctx.config.min_star_count);
        Ok(())
    })
}

fn fork_count(ctx: UiContext<'_>) -> BoxFuture<'_, HarnessResult<()>> {
    Box::pin(async move {
        let helper = ctx.helper();
        log_test_step("Check repository fork count");
        helper.open(&ctx.config.test_repo_url()).await?;

        let forks = helper
            .verify_element_visible(ctx.config.selectors.fork_counter.clone(), helper.timeouts().element)
            .await?;
        let count = extract_number_from_text(&forks.inner_text().await?);
        info!("Fork count: {count}");
        Assertion::greater_than(count, 0, "fork count").check()
    })
}

fn readme_rendered(ctx: UiContext<'_>) -> BoxFuture<'_, HarnessResult<()>> {
    Box::pin(async move {
        let helper = ctx.helper();
        log_test_step("Check README content rendering");
        helper.open(&ctx.config.test_repo_url()).await?;

        let readme = helper
            .verify_element_visible(ctx.config.selectors.readme.clone(), helper.timeouts().element)
            .await?;
        let html = readme.inner_html().await?;
        info!("README HTML length: {} characters", html.len());
        Assertion::greater_than(html.len(), 100, "README HTML length").check()?;
        Assertion::contains_any(&html, &README_TAGS).check()?;
        info!("README content properly rendered");
        Ok(())
    })
}

fn src_folder(ctx: UiContext<'_>) -> BoxFuture<'_, HarnessResult<()>> {
    Box::pin(async move {
        let helper = ctx.helper();
        let repo_url = ctx.config.test_repo_url();
        log_test_step("Navigate to src folder");
        helper.open(&repo_url).await?;
        helper.pause().await;

        info!("Navigating to src folder");
        helper.goto(&format!("{repo_url}/tree/main/src")).await?;
        helper
            .wait_for_url("**/src", helper.timeouts().navigation)
            .await?;
        helper.verify_url_contains("/src").await?;

        let content = helper.content().await?;
        Assertion::contains(&content, "src").check()?;
        info!("Successfully navigated to src folder");
        Ok(())
    })
}

fn typescript_file(ctx: UiContext<'_>) -> BoxFuture<'_, HarnessResult<()>> {
    Box::pin(async move {
        let helper = ctx.helper();
        let selectors = &ctx.config.selectors;
        let timeout = helper.timeouts().element;
        log_test_step("Navigate to TypeScript file and verify display");

        info!("Navigating to src/vs folder");
        helper
            .goto(&format!("{}/tree/main/src/vs", ctx.config.test_repo_url()))
            .await?;
        helper.settle().await;

        info!("Finding TypeScript file");
        let href = helper
            .get_element(selectors.typescript_file_link.clone())
            .get_attribute("href")
            .await?
            .ok_or_else(|| HarnessError::assertion("TypeScript file link has no href"))?;
        helper.goto(&ctx.config.web_url(&href)).await?;
        helper.settle().await;

        info!("Verifying line numbers displayed");
        helper
            .verify_element_visible(selectors.line_numbers.clone(), timeout)
            .await?;
        info!("Verifying code content displayed");
        helper
            .verify_element_visible(selectors.code_lines.clone(), timeout)
            .await?;
        info!("Verifying syntax highlighting present");
        helper
            .verify_element_visible(selectors.code_container.clone(), CODE_CONTAINER_TIMEOUT)
            .await?;

        info!("TypeScript file displays with line numbers and highlighting");
        Ok(())
    })
}

fn about_description(ctx: UiContext<'_>) -> BoxFuture<'_, HarnessResult<()>> {
    Box::pin(async move {
        let helper = ctx.helper();
        let selectors = &ctx.config.selectors;
        let timeout = helper.timeouts().element;
        log_test_step("Check About section description");
        helper.open(&ctx.config.test_repo_url()).await?;

        let about = helper
            .verify_element_visible(selectors.about_section.clone(), timeout)
            .await?;
        let description = about.locator(selectors.about_description.clone());
        description.wait_for_visible(timeout).await?;

        let text = description.inner_text().await?;
        Assertion::greater_than(text.chars().count(), 10, "description length").check()?;
        let preview: String = text.chars().take(50).collect();
        info!("About section has description: {preview}...");
        Ok(())
    })
}

fn license_displayed(ctx: UiContext<'_>) -> BoxFuture<'_, HarnessResult<()>> {
    Box::pin(async move {
        let helper = ctx.helper();
        log_test_step("Check license information");
        helper.open(&ctx.config.test_repo_url()).await?;
        helper.pause().await;

        let license = helper
            .get_element(ctx.config.selectors.license.clone())
            .wait_for_attached(LICENSE_TIMEOUT)
            .await?;
        let text = license.text_content;
        info!("License found: {text}");
        Assertion::is_false(text.is_empty(), "License information should not be empty").check()?;
        Ok(())
    })
}

fn topics_visible(ctx: UiContext<'_>) -> BoxFuture<'_, HarnessResult<()>> {
    Box::pin(async move {
        let helper = ctx.helper();
        log_test_step("Check repository topics/tags");
        helper.open(&ctx.config.test_repo_url()).await?;

        let topics = helper.get_element(ctx.config.selectors.topics.clone());
        let count = topics.count().await?;
        info!("Found {count} topics");
        Assertion::greater_than(count, 0, "topic count").check()?;

        let first = topics.inner_text().await?;
        info!("Topics visible, first topic: {first}");
        Ok(())
    })
}
