//! Wait mechanisms: load states, URL patterns and a polling loop.
//!
//! Every wait is bounded by a timeout; an elapsed timeout is the only way a
//! wait gives up, and it surfaces as [`HarnessError::Timeout`].

use crate::result::{HarnessError, HarnessResult};
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::trace;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Network idle threshold (500ms without new resources)
pub const NETWORK_IDLE_THRESHOLD_MS: u64 = 500;

/// Pause used by the lenient page-load wait
pub const PAGE_LOAD_PAUSE_MS: u64 = 2_000;

// =============================================================================
// LOAD STATE
// =============================================================================

/// Page load states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadState {
    /// `load` event has fired (`readyState == "complete"`)
    Load,
    /// DOMContentLoaded has fired (`readyState` is `interactive` or later)
    #[default]
    DomContentLoaded,
    /// Loaded and no new resources for [`NETWORK_IDLE_THRESHOLD_MS`]
    NetworkIdle,
}

impl LoadState {
    /// Get the event name for this load state
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::DomContentLoaded => "domcontentloaded",
            Self::NetworkIdle => "networkidle",
        }
    }

    /// Whether a `document.readyState` value satisfies the document part of
    /// this state. `NetworkIdle` additionally needs a quiet resource count.
    #[must_use]
    pub fn is_reached_by(&self, ready_state: &str) -> bool {
        match self {
            Self::DomContentLoaded => matches!(ready_state, "interactive" | "complete"),
            Self::Load | Self::NetworkIdle => ready_state == "complete",
        }
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.event_name())
    }
}

// =============================================================================
// URL PATTERN
// =============================================================================

/// URL pattern for navigation waits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlPattern {
    /// Exact URL match
    Exact(String),
    /// URL contains the string
    Contains(String),
    /// Glob where `*` (and `**`) match any run of characters
    Glob(String),
}

impl UrlPattern {
    /// Check whether a URL matches this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(expected) => url == expected,
            Self::Contains(needle) => url.contains(needle.as_str()),
            Self::Glob(pattern) => glob_matches(pattern, url),
        }
    }
}

impl From<&str> for UrlPattern {
    /// Strings containing `*` become globs, anything else an exact match
    fn from(pattern: &str) -> Self {
        if pattern.contains('*') {
            Self::Glob(pattern.to_string())
        } else {
            Self::Exact(pattern.to_string())
        }
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(s) | Self::Glob(s) => write!(f, "{s}"),
            Self::Contains(s) => write!(f, "*{s}*"),
        }
    }
}

fn glob_matches(pattern: &str, url: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    let last = parts.len() - 1;
    let mut pos = 0;

    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if i == 0 {
            if !url.starts_with(part) {
                return false;
            }
            pos = part.len();
        } else if i == last {
            // Anchored at the end, and must not overlap what came before.
            return url.len() >= pos + part.len() && url.ends_with(part);
        } else if let Some(found) = url[pos..].find(part) {
            pos += found + part.len();
        } else {
            return false;
        }
    }

    pattern.ends_with('*') || pos == url.len()
}

// =============================================================================
// POLLING
// =============================================================================

/// Poll `check` until it yields `Some`, or fail with a timeout.
///
/// The check runs at least once. Check errors count as "not yet"; the last
/// one is traced and the loop keeps polling until `timeout` has elapsed.
pub async fn poll_until<T, F, Fut>(
    timeout: Duration,
    interval: Duration,
    waited_for: &str,
    mut check: F,
) -> HarnessResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = HarnessResult<Option<T>>>,
{
    let start = Instant::now();
    loop {
        match check().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(e) => trace!("Check for {waited_for} failed: {e}"),
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Err(HarnessError::Timeout {
                ms: timeout.as_millis() as u64,
                waited_for: waited_for.to_string(),
            });
        }
        tokio::time::sleep(interval.min(timeout - elapsed)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    mod load_state_tests {
        use super::*;

        #[test]
        fn test_default_is_dom_content_loaded() {
            assert_eq!(LoadState::default(), LoadState::DomContentLoaded);
        }

        #[test]
        fn test_ready_state_mapping() {
            assert!(LoadState::DomContentLoaded.is_reached_by("interactive"));
            assert!(LoadState::DomContentLoaded.is_reached_by("complete"));
            assert!(!LoadState::DomContentLoaded.is_reached_by("loading"));
            assert!(!LoadState::Load.is_reached_by("interactive"));
            assert!(LoadState::NetworkIdle.is_reached_by("complete"));
        }

        #[test]
        fn test_display() {
            assert_eq!(LoadState::NetworkIdle.to_string(), "networkidle");
        }
    }

    mod url_pattern_tests {
        use super::*;

        #[test]
        fn test_search_glob() {
            let p = UrlPattern::from("**/search?**");
            assert!(p.matches("https://github.com/search?q=python&type=repositories"));
            assert!(!p.matches("https://github.com/microsoft/vscode"));
        }

        #[test]
        fn test_suffix_glob() {
            let p = UrlPattern::from("**/src");
            assert!(p.matches("https://github.com/microsoft/vscode/tree/main/src"));
            assert!(p.matches("https://github.com/a/src/b/src"));
            assert!(!p.matches("https://github.com/microsoft/vscode/tree/main/src/vs"));
        }

        #[test]
        fn test_prefix_glob() {
            let p = UrlPattern::Glob("https://github.com/*".to_string());
            assert!(p.matches("https://github.com/microsoft"));
            assert!(!p.matches("http://example.com/"));
        }

        #[test]
        fn test_exact_and_contains() {
            assert!(UrlPattern::from("https://github.com/").matches("https://github.com/"));
            assert!(!UrlPattern::from("https://github.com/").matches("https://github.com/x"));
            assert!(UrlPattern::Contains("q=react".into()).matches("https://github.com/search?q=react"));
        }

        #[test]
        fn test_suffix_must_not_overlap_prefix() {
            assert!(!glob_matches("ab*ba", "aba"));
            assert!(glob_matches("ab*ba", "abba"));
        }
    }

    mod poll_tests {
        use super::*;

        #[tokio::test]
        async fn test_returns_first_some() {
            let calls = AtomicUsize::new(0);
            let value = poll_until(Duration::from_secs(1), Duration::from_millis(1), "third call", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok((n >= 2).then_some(n)) }
            })
            .await
            .unwrap();
            assert_eq!(value, 2);
        }

        #[tokio::test]
        async fn test_errors_keep_polling() {
            let calls = AtomicUsize::new(0);
            let value = poll_until(Duration::from_secs(1), Duration::from_millis(1), "recovery", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(HarnessError::page("detached"))
                    } else {
                        Ok(Some("ok"))
                    }
                }
            })
            .await
            .unwrap();
            assert_eq!(value, "ok");
        }

        #[tokio::test]
        async fn test_times_out() {
            let err = poll_until::<(), _, _>(
                Duration::from_millis(30),
                Duration::from_millis(5),
                "never",
                || async { Ok(None) },
            )
            .await
            .unwrap_err();
            assert!(err.is_timeout());
            assert!(err.to_string().contains("30ms"));
            assert!(err.to_string().contains("never"));
        }

        #[tokio::test]
        async fn test_zero_timeout_still_checks_once() {
            let value = poll_until(Duration::ZERO, Duration::from_millis(5), "now", || async {
                Ok(Some(7))
            })
            .await
            .unwrap();
            assert_eq!(value, 7);
        }
    }
}
