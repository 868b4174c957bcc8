//! Output formatting and progress reporting

use console::{style, Style, Term};
use hubcheck::{RunObserver, TestCase, TestResult};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter for a check run
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar for `total` checks
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Increment progress
    pub fn increment(&self, delta: u64) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(delta);
        }
    }

    /// Update progress message
    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(message.to_string());
        }
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_with_message("Done");
        }
    }

    fn line(&self, message: &str) {
        match self.progress_bar {
            Some(ref pb) if !pb.is_finished() => pb.suspend(|| {
                let _ = self.term.write_line(message);
            }),
            _ => {
                let _ = self.term.write_line(message);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };

        self.line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // shown in quiet mode too
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        self.line(&format!("{prefix} {message}"));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("⚠").yellow().bold().to_string()
        } else {
            "WARN".to_string()
        };

        self.line(&format!("{prefix} {message}"));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        self.line("");
        self.line(&styled);
    }

    /// Print run summary
    pub fn summary(&self, passed: usize, failed: usize, duration: Duration) {
        if self.quiet && failed == 0 {
            return;
        }

        let _ = self.term.write_line("");

        let total = passed + failed;
        let duration_secs = duration.as_secs_f64();

        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();

            let status = if failed > 0 {
                failed_style.apply_to("FAILED")
            } else {
                passed_style.apply_to("PASSED")
            };

            let _ = self.term.write_line(&format!(
                "{} {} checks in {:.2}s ({} passed, {} failed)",
                status,
                total,
                duration_secs,
                passed_style.apply_to(passed),
                if failed > 0 {
                    failed_style.apply_to(failed).to_string()
                } else {
                    failed.to_string()
                },
            ));
        } else {
            let status = if failed > 0 { "FAILED" } else { "PASSED" };
            let _ = self.term.write_line(&format!(
                "{status} {total} checks in {duration_secs:.2}s ({passed} passed, {failed} failed)"
            ));
        }
    }
}

impl RunObserver for ProgressReporter {
    fn on_start(&mut self, case: &TestCase) {
        self.set_message(&case.id());
    }

    fn on_finish(&mut self, result: &TestResult) {
        if result.passed {
            self.success(&format!(
                "{} ({:.1}s)",
                result.name,
                result.duration.as_secs_f64()
            ));
        } else {
            self.failure(&format!(
                "{}: {}",
                result.name,
                result.error.as_deref().unwrap_or("unknown error")
            ));
        }
        self.increment(1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod progress_reporter_tests {
        use super::*;

        #[test]
        fn test_new_reporter() {
            let reporter = ProgressReporter::new(true, false);
            assert!(reporter.use_color);
            assert!(!reporter.quiet);
        }

        #[test]
        fn test_messages_without_color() {
            let reporter = ProgressReporter::new(false, false);
            reporter.header("Running Checks");
            reporter.success("repository_api::test_rate_limit_headers_present");
            reporter.failure("search::test_search_with_filters: timed out");
            reporter.warning("No checks selected");
            reporter.summary(17, 1, Duration::from_secs(42));
        }

        #[test]
        fn test_progress_bar() {
            let mut reporter = ProgressReporter::new(false, false);
            reporter.start_progress(2, "Starting...");
            reporter.on_finish(&TestResult::pass("a::b"));
            reporter.on_finish(&TestResult::fail("a::c", "boom"));
            reporter.finish();
            assert_eq!(reporter.progress_bar.as_ref().unwrap().position(), 2);
        }

        #[test]
        fn test_quiet_mode_has_no_progress_bar() {
            let mut reporter = ProgressReporter::new(false, true);
            reporter.start_progress(10, "Starting...");
            assert!(reporter.progress_bar.is_none());
            reporter.failure("still shown");
        }
    }
}
