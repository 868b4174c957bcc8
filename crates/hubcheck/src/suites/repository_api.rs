//! REST contract checks for a public repository.

use crate::api::{ApiErrorBody, ContentEntry, Repository};
use crate::assertion::Assertion;
use crate::harness::{ApiContext, TestCase};
use crate::result::{HarnessError, HarnessResult};
use futures::future::BoxFuture;
use tracing::info;

/// Suite name
pub const SUITE: &str = "repository_api";

const RATE_LIMIT_LIMIT: &str = "X-RateLimit-Limit";
const RATE_LIMIT_REMAINING: &str = "X-RateLimit-Remaining";

/// Cases in this suite
#[must_use]
pub fn cases() -> Vec<TestCase> {
    vec![
        TestCase::api(SUITE, "test_get_react_repository_success", repository_success),
        TestCase::api(SUITE, "test_get_react_repository_contents", repository_contents),
        TestCase::api(SUITE, "test_get_nonexistent_repository_404", nonexistent_repository),
        TestCase::api(SUITE, "test_rate_limit_headers_present", rate_limit_headers),
    ]
}

fn repository_success(ctx: ApiContext<'_>) -> BoxFuture<'_, HarnessResult<()>> {
    Box::pin(async move {
        let target = &ctx.config.api_target;
        let resp = ctx.client.repository(&target.to_string()).await?;
        resp.expect_status(200)?;
        info!("Status code is 200");

        let repo: Repository = resp.json()?;
        Assertion::equals(target.name.as_str(), repo.name.as_str()).check()?;
        info!("Repository name verified: {}", repo.name);

        Assertion::equals(target.owner.as_str(), repo.owner.login.as_str()).check()?;
        info!("Owner login verified: {}", repo.owner.login);

        info!("Stargazers count: {}", repo.stargazers_count);
        Assertion::greater_than(repo.stargazers_count, ctx.config.min_star_count, "stargazers_count")
            .check()?;

        Assertion::is_false(repo.private, "expected private=false").check()?;
        info!("Repository is public");
        Ok(())
    })
}

fn repository_contents(ctx: ApiContext<'_>) -> BoxFuture<'_, HarnessResult<()>> {
    Box::pin(async move {
        let resp = ctx
            .client
            .contents(&ctx.config.api_target.to_string())
            .await?;
        resp.expect_status(200)?;

        if !resp.body.is_array() {
            return Err(HarnessError::assertion(format!(
                "expected a JSON array, got {}",
                resp.body
            )));
        }
        let entries: Vec<ContentEntry> = resp.json()?;
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        info!(
            "Response is an array with {} items: {}...",
            names.len(),
            names.iter().take(10).copied().collect::<Vec<_>>().join(", ")
        );

        for required in ["README.md", "package.json"] {
            Assertion::is_true(
                names.contains(&required),
                &format!("{required} not found in repository contents"),
            )
            .check()?;
            info!("{required} found in contents");
        }
        Ok(())
    })
}

fn nonexistent_repository(ctx: ApiContext<'_>) -> BoxFuture<'_, HarnessResult<()>> {
    Box::pin(async move {
        let resp = ctx.client.repository(&ctx.config.api_missing_repo).await?;
        resp.expect_status(404)?;
        info!("Status code is 404 for nonexistent repository");

        let body: ApiErrorBody = resp.json()?;
        info!("Error message: {}", body.message);
        Assertion::contains(&body.message, "Not Found").check()
    })
}

fn rate_limit_headers(ctx: ApiContext<'_>) -> BoxFuture<'_, HarnessResult<()>> {
    Box::pin(async move {
        let resp = ctx
            .client
            .repository(&ctx.config.api_target.to_string())
            .await?;

        let mut values = Vec::with_capacity(2);
        for name in [RATE_LIMIT_LIMIT, RATE_LIMIT_REMAINING] {
            let value = resp.header(name);
            Assertion::is_some(&value, name).check()?;
            let value = value.unwrap_or_default();
            info!("{name} header found: {value}");
            values.push(value);
        }
        info!("Rate limit info - Limit: {}, Remaining: {}", values[0], values[1]);
        Ok(())
    })
}
