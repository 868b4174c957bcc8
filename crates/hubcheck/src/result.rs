//! Result and error types for hubcheck.

use thiserror::Error;

/// Result type for hubcheck operations
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Errors that can occur while driving the site or the API
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// The selected engine cannot be driven by this build
    #[error("Browser engine '{engine}' is not supported: {reason}")]
    UnsupportedBrowser {
        /// Engine name as given on the command line
        engine: String,
        /// Why it cannot be launched
        reason: String,
    },

    /// Page or context error
    #[error("Page error: {message}")]
    PageError {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Operation timed out
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// What was being waited for
        waited_for: String,
    },

    /// No element matched a selector
    #[error("No element matches {selector}")]
    ElementNotFound {
        /// Selector description
        selector: String,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned a status the caller did not expect
    #[error("Expected HTTP {expected} from {url}, got {actual}")]
    UnexpectedStatus {
        /// Requested URL
        url: String,
        /// Expected status code
        expected: u16,
        /// Actual status code
        actual: u16,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl HarnessError {
    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create a page error
    #[must_use]
    pub fn page(message: impl Into<String>) -> Self {
        Self::PageError {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error came from an elapsed timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_names_target() {
        let err = HarnessError::Timeout {
            ms: 5000,
            waited_for: "#repo-stars-counter-star to be visible".to_string(),
        };
        assert!(err.is_timeout());
        assert!(err.to_string().contains("5000ms"));
        assert!(err.to_string().contains("#repo-stars-counter-star"));
    }

    #[test]
    fn test_unexpected_status_message() {
        let err = HarnessError::UnexpectedStatus {
            url: "https://api.github.com/repos/x/y".to_string(),
            expected: 200,
            actual: 404,
        };
        assert!(!err.is_timeout());
        assert_eq!(
            err.to_string(),
            "Expected HTTP 200 from https://api.github.com/repos/x/y, got 404"
        );
    }

    #[test]
    fn test_helper_constructors() {
        assert!(HarnessError::assertion("boom")
            .to_string()
            .starts_with("Assertion failed"));
        assert!(HarnessError::page("closed").to_string().contains("closed"));
        assert!(HarnessError::config("bad").to_string().contains("bad"));
    }
}
