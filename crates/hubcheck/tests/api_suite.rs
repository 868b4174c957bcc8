//! The `repository_api` suite run end to end against a local mock API.

use httpmock::prelude::*;
use hubcheck::suites::repository_api;
use hubcheck::{BrowserSlot, HarnessConfig, NoopObserver, SuiteResults, TestRunner};
use serde_json::json;

fn repo_body(private: bool, stars: u64) -> serde_json::Value {
    json!({
        "id": 10270250,
        "name": "react",
        "full_name": "facebook/react",
        "owner": {"login": "facebook", "id": 69631},
        "stargazers_count": stars,
        "forks_count": 47000,
        "private": private,
        "description": "The library for web and native user interfaces."
    })
}

async fn mount_contents(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/facebook/react/contents");
            then.status(200).json_body(json!([
                {"name": ".github", "path": ".github", "type": "dir"},
                {"name": "README.md", "path": "README.md", "type": "file"},
                {"name": "package.json", "path": "package.json", "type": "file"},
                {"name": "packages", "path": "packages", "type": "dir"}
            ]));
        })
        .await;
}

async fn mount_missing(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/microsoft/nonexistent-repo-12345");
            then.status(404).json_body(json!({
                "message": "Not Found",
                "documentation_url": "https://docs.github.com/rest/repos/repos#get-a-repository",
                "status": "404"
            }));
        })
        .await;
}

async fn run_suite(server: &MockServer) -> SuiteResults {
    let config = HarnessConfig::default().with_api_base_url(server.base_url());
    TestRunner::new(config)
        .run_with(&repository_api::cases(), BrowserSlot::NotNeeded, &mut NoopObserver)
        .await
}

fn failure_of<'a>(results: &'a SuiteResults, name: &str) -> Option<&'a str> {
    results
        .results
        .iter()
        .find(|r| r.name.ends_with(name))
        .and_then(|r| r.error.as_deref())
}

// ============================================================================
// Healthy API
// ============================================================================

#[tokio::test]
async fn all_cases_pass_against_healthy_api() {
    let server = MockServer::start_async().await;
    let repo = server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/facebook/react");
            then.status(200)
                .header("X-RateLimit-Limit", "60")
                .header("X-RateLimit-Remaining", "57")
                .json_body(repo_body(false, 230_000));
        })
        .await;
    mount_contents(&server).await;
    mount_missing(&server).await;

    let results = run_suite(&server).await;
    let failures: Vec<_> = results.failures().iter().map(|r| r.name.clone()).collect();
    assert!(results.all_passed(), "unexpected failures: {failures:?}");
    assert_eq!(results.total(), 4);
    // the success and rate-limit cases both query the repository
    repo.assert_hits_async(2).await;
}

// ============================================================================
// Contract violations
// ============================================================================

#[tokio::test]
async fn private_repository_fails_success_case() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/facebook/react");
            then.status(200)
                .header("X-RateLimit-Limit", "60")
                .header("X-RateLimit-Remaining", "57")
                .json_body(repo_body(true, 230_000));
        })
        .await;
    mount_contents(&server).await;
    mount_missing(&server).await;

    let results = run_suite(&server).await;
    assert_eq!(results.failed_count(), 1);
    let error = failure_of(&results, "test_get_react_repository_success").unwrap();
    assert!(error.contains("private=false"), "{error}");
}

#[tokio::test]
async fn low_star_count_fails_success_case() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/facebook/react");
            then.status(200)
                .header("X-RateLimit-Limit", "60")
                .header("X-RateLimit-Remaining", "57")
                .json_body(repo_body(false, 99_999));
        })
        .await;
    mount_contents(&server).await;
    mount_missing(&server).await;

    let results = run_suite(&server).await;
    let error = failure_of(&results, "test_get_react_repository_success").unwrap();
    assert!(error.contains("stargazers_count > 100000"), "{error}");
}

#[tokio::test]
async fn missing_rate_limit_headers_fail_only_that_case() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/facebook/react");
            then.status(200).json_body(repo_body(false, 230_000));
        })
        .await;
    mount_contents(&server).await;
    mount_missing(&server).await;

    let results = run_suite(&server).await;
    assert_eq!(results.failed_count(), 1);
    let error = failure_of(&results, "test_rate_limit_headers_present").unwrap();
    assert!(error.contains("X-RateLimit-Limit"), "{error}");
}

#[tokio::test]
async fn wrong_status_fails_with_unexpected_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/microsoft/nonexistent-repo-12345");
            then.status(200).json_body(json!({"name": "nonexistent-repo-12345"}));
        })
        .await;

    let results = run_suite(&server).await;
    let error = failure_of(&results, "test_get_nonexistent_repository_404").unwrap();
    assert!(error.contains("Expected HTTP 404"), "{error}");
    assert!(error.contains("got 200"), "{error}");
}

#[tokio::test]
async fn unreachable_api_fails_every_case_without_panicking() {
    let config = HarnessConfig::default().with_api_base_url("http://127.0.0.1:1");
    let results = TestRunner::new(config)
        .run_with(&repository_api::cases(), BrowserSlot::NotNeeded, &mut NoopObserver)
        .await;
    assert_eq!(results.failed_count(), 4);
}
