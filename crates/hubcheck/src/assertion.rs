//! Hard-fail assertions for test bodies.
//!
//! Each helper builds an [`AssertionResult`]; `check()` turns a failure into
//! [`HarnessError::AssertionFailed`] so bodies can write
//! `Assertion::greater_than(stars, 100_000, "stars").check()?`.

use crate::result::{HarnessError, HarnessResult};
use std::fmt::Debug;

/// Result of an assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// Human-readable message
    pub message: String,
}

impl AssertionResult {
    /// Create a passing assertion result
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            message: String::new(),
        }
    }

    /// Create a failing assertion result
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }

    /// Convert into a `HarnessResult`, failing with the message
    pub fn check(self) -> HarnessResult<()> {
        if self.passed {
            Ok(())
        } else {
            Err(HarnessError::assertion(self.message))
        }
    }
}

/// Assertion helpers for testing
#[derive(Debug)]
pub struct Assertion;

impl Assertion {
    /// Assert two values are equal
    #[must_use]
    pub fn equals<T: PartialEq + Debug + ?Sized>(expected: &T, actual: &T) -> AssertionResult {
        if expected == actual {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected {expected:?}, got {actual:?}"))
        }
    }

    /// Assert a string contains a substring
    #[must_use]
    pub fn contains(haystack: &str, needle: &str) -> AssertionResult {
        if haystack.contains(needle) {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!(
                "expected '{}' to contain '{needle}'",
                preview(haystack)
            ))
        }
    }

    /// Assert a string contains at least one of several substrings
    #[must_use]
    pub fn contains_any(haystack: &str, needles: &[&str]) -> AssertionResult {
        if needles.iter().any(|n| haystack.contains(n)) {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!(
                "expected '{}' to contain one of {needles:?}",
                preview(haystack)
            ))
        }
    }

    /// Case-insensitive variant of [`Assertion::contains_any`]
    #[must_use]
    pub fn contains_any_ignore_case(haystack: &str, needles: &[&str]) -> AssertionResult {
        let lower = haystack.to_lowercase();
        if needles.iter().any(|n| lower.contains(&n.to_lowercase())) {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!(
                "expected '{}' to contain one of {needles:?} (ignoring case)",
                preview(haystack)
            ))
        }
    }

    /// Assert `value > threshold`
    #[must_use]
    pub fn greater_than<T: PartialOrd + Debug>(value: T, threshold: T, what: &str) -> AssertionResult {
        if value > threshold {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected {what} > {threshold:?}, got {value:?}"))
        }
    }

    /// Assert a condition is true
    #[must_use]
    pub fn is_true(condition: bool, message: &str) -> AssertionResult {
        if condition {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(message)
        }
    }

    /// Assert a condition is false
    #[must_use]
    pub fn is_false(condition: bool, message: &str) -> AssertionResult {
        if condition {
            AssertionResult::fail(message)
        } else {
            AssertionResult::pass()
        }
    }

    /// Assert an Option is Some
    #[must_use]
    pub fn is_some<T>(opt: &Option<T>, what: &str) -> AssertionResult {
        if opt.is_some() {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected {what} to be present"))
        }
    }
}

/// First 200 characters of long page text
fn preview(text: &str) -> String {
    const LIMIT: usize = 200;
    if text.chars().count() <= LIMIT {
        text.to_string()
    } else {
        let head: String = text.chars().take(LIMIT).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_passes_through() {
        assert!(Assertion::equals(&"react", &"react").check().is_ok());
    }

    #[test]
    fn test_check_fails_with_message() {
        let err = Assertion::equals(&"react", &"vue").check().unwrap_err();
        assert!(matches!(err, HarnessError::AssertionFailed { .. }));
        assert!(err.to_string().contains(r#"expected "react", got "vue""#));
    }

    #[test]
    fn test_greater_than() {
        assert!(Assertion::greater_than(160_000u64, 100_000, "stars").passed);
        let result = Assertion::greater_than(0u64, 0, "forks");
        assert!(!result.passed);
        assert_eq!(result.message, "expected forks > 0, got 0");
    }

    #[test]
    fn test_contains_any() {
        assert!(Assertion::contains_any("<p>hello</p>", &["<h1", "<p>"]).passed);
        assert!(!Assertion::contains_any("plain", &["<h1", "<p>"]).passed);
    }

    #[test]
    fn test_contains_any_ignore_case() {
        assert!(Assertion::contains_any_ignore_case("Page NOT FOUND", &["404", "not found"]).passed);
        assert!(!Assertion::contains_any_ignore_case("Welcome", &["404", "not found"]).passed);
    }

    #[test]
    fn test_long_haystack_is_truncated_in_message() {
        let page = "x".repeat(5000);
        let result = Assertion::contains(&page, "needle");
        assert!(result.message.len() < 300);
        assert!(result.message.contains("..."));
    }

    #[test]
    fn test_is_some_and_bools() {
        assert!(Assertion::is_some(&Some(1), "value").passed);
        assert!(!Assertion::is_some::<u8>(&None, "header").passed);
        assert!(Assertion::is_true(true, "x").passed);
        assert!(Assertion::is_false(false, "x").passed);
    }
}
