//! JSON run report.

use crate::harness::SuiteResults;
use crate::result::HarnessResult;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One test in the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseReport {
    /// `suite::name`
    pub id: String,
    /// Whether it passed
    pub passed: bool,
    /// Failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall time in milliseconds
    pub duration_ms: u64,
}

/// Serializable summary of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// When the report was produced
    pub generated_at: DateTime<Local>,
    /// Browser engine requested for the run
    pub browser: String,
    /// Total cases run
    pub total: usize,
    /// Passed cases
    pub passed: usize,
    /// Failed cases
    pub failed: usize,
    /// Wall time in milliseconds
    pub duration_ms: u64,
    /// Per-case results, in run order
    pub cases: Vec<CaseReport>,
}

impl RunReport {
    /// Build a report from run results
    #[must_use]
    pub fn from_results(results: &SuiteResults, browser: &str) -> Self {
        Self {
            generated_at: Local::now(),
            browser: browser.to_string(),
            total: results.total(),
            passed: results.passed_count(),
            failed: results.failed_count(),
            duration_ms: results.duration.as_millis() as u64,
            cases: results
                .results
                .iter()
                .map(|r| CaseReport {
                    id: r.name.clone(),
                    passed: r.passed,
                    error: r.error.clone(),
                    duration_ms: r.duration.as_millis() as u64,
                })
                .collect(),
        }
    }

    /// Pretty JSON
    pub fn to_json(&self) -> HarnessResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write pretty JSON to `path`, creating parent directories
    pub fn write_json(&self, path: &Path) -> HarnessResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::TestResult;
    use std::time::Duration;

    fn results() -> SuiteResults {
        SuiteResults {
            suite_name: "hubcheck".to_string(),
            results: vec![
                TestResult::pass("repository_api::test_rate_limit_headers_present")
                    .with_duration(Duration::from_millis(120)),
                TestResult::fail("search::test_search_with_filters", "Timeout after 15000ms")
                    .with_duration(Duration::from_millis(15_004)),
            ],
            duration: Duration::from_millis(15_200),
        }
    }

    #[test]
    fn test_counts_and_cases() {
        let report = RunReport::from_results(&results(), "chromium");
        assert_eq!(report.total, 2);
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.cases[1].duration_ms, 15_004);
    }

    #[test]
    fn test_json_omits_error_for_passing_cases() {
        let json = RunReport::from_results(&results(), "chromium").to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["cases"][0].get("error").is_none());
        assert_eq!(value["cases"][1]["error"], "Timeout after 15000ms");
        assert_eq!(value["browser"], "chromium");
    }

    #[test]
    fn test_write_json_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/run.json");
        let report = RunReport::from_results(&results(), "chromium");
        report.write_json(&path).unwrap();
        let back: RunReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.cases, report.cases);
    }
}
