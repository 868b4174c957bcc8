//! Selector model and its rendering to in-page queries.
//!
//! Selectors are plain data so they can live in the YAML selector catalog.
//! Each variant renders to a JavaScript expression that evaluates to an
//! array of matching elements in document order; the first entry is the
//! element a locator acts on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    /// CSS selector; comma-separated lists act as fallbacks
    Css(String),
    /// Elements whose text contains the given string
    Text(String),
    /// Test ID selector (data-testid attribute)
    TestId(String),
    /// CSS selector filtered by rendered text
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
    /// Union of several selectors, in document order
    Any(Vec<Selector>),
    /// Descendants of the first element matching `parent`
    Within {
        /// Scope selector
        parent: Box<Selector>,
        /// Selector evaluated inside the scope
        child: Box<Selector>,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a test ID selector
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Union of selectors
    #[must_use]
    pub fn any(selectors: impl IntoIterator<Item = Self>) -> Self {
        Self::Any(selectors.into_iter().collect())
    }

    /// Filter by text content
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        let text = text.into();
        match self {
            Self::Css(css) => Self::CssWithText { css, text },
            Self::Any(list) => Self::Any(list.into_iter().map(|s| s.with_text(text.clone())).collect()),
            Self::Within { parent, child } => Self::Within {
                parent,
                child: Box::new(child.with_text(text)),
            },
            Self::TestId(id) => Self::CssWithText {
                css: format!("[data-testid={}]", js_string(&id)),
                text,
            },
            first @ (Self::CssWithText { .. } | Self::Text(_)) => Self::Within {
                parent: Box::new(first),
                child: Box::new(Self::CssWithText {
                    css: ":scope".to_string(),
                    text,
                }),
            },
        }
    }

    /// Scope `child` to the first element matching this selector
    #[must_use]
    pub fn within(self, child: impl Into<Self>) -> Self {
        Self::Within {
            parent: Box::new(self),
            child: Box::new(child.into()),
        }
    }

    /// JavaScript expression evaluating to the array of matches under `document`
    #[must_use]
    pub fn to_query_all(&self) -> String {
        self.render("document", 0)
    }

    fn render(&self, root: &str, depth: usize) -> String {
        match self {
            Self::Css(css) => format!("Array.from({root}.querySelectorAll({}))", js_string(css)),
            Self::Text(text) => format!(
                "Array.from({root}.querySelectorAll('*')).filter(el => el.children.length === 0 && (el.innerText || el.textContent || '').includes({}))",
                js_string(text)
            ),
            Self::TestId(id) => format!(
                "Array.from({root}.querySelectorAll({}))",
                js_string(&format!("[data-testid=\"{id}\"]"))
            ),
            Self::CssWithText { css, text } => {
                // `:scope` lets a nested text filter apply to the scope element itself.
                let base = if css.trim() == ":scope" {
                    format!("({root} === document ? [] : [{root}])")
                } else {
                    format!("Array.from({root}.querySelectorAll({}))", js_string(css))
                };
                format!(
                    "{base}.filter(el => (el.innerText || el.textContent || '').includes({}))",
                    js_string(text)
                )
            }
            Self::Any(list) => {
                let parts: Vec<String> = list.iter().map(|s| s.render(root, depth)).collect();
                format!(
                    "Array.from(new Set([].concat({}))).sort((a, b) => (a.compareDocumentPosition(b) & Node.DOCUMENT_POSITION_FOLLOWING) ? -1 : 1)",
                    parts.join(", ")
                )
            }
            Self::Within { parent, child } => {
                let var = format!("scope{depth}");
                format!(
                    "(({var}) => {var} ? {} : [])(({})[0] || null)",
                    child.render(&var, depth + 1),
                    parent.render(root, depth + 1)
                )
            }
        }
    }
}

impl From<&str> for Selector {
    fn from(css: &str) -> Self {
        Self::Css(css.to_string())
    }
}

impl From<String> for Selector {
    fn from(css: String) -> Self {
        Self::Css(css)
    }
}

impl From<&Selector> for Selector {
    fn from(selector: &Selector) -> Self {
        selector.clone()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => write!(f, "{css}"),
            Self::Text(text) => write!(f, "text={text:?}"),
            Self::TestId(id) => write!(f, "[data-testid=\"{id}\"]"),
            Self::CssWithText { css, text } => write!(f, "{css} >> has-text={text:?}"),
            Self::Any(list) => {
                let parts: Vec<String> = list.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join(" | "))
            }
            Self::Within { parent, child } => write!(f, "{parent} >> {child}"),
        }
    }
}

/// Quote a string as a JavaScript string literal
pub(crate) fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod construction_tests {
        use super::*;

        #[test]
        fn test_from_str_is_css() {
            let s: Selector = "#repo-network-counter".into();
            assert_eq!(s, Selector::Css("#repo-network-counter".to_string()));
        }

        #[test]
        fn test_with_text_on_css() {
            let s = Selector::css("div.BorderGrid-cell").with_text("About");
            assert_eq!(
                s,
                Selector::CssWithText {
                    css: "div.BorderGrid-cell".to_string(),
                    text: "About".to_string()
                }
            );
        }

        #[test]
        fn test_with_text_distributes_over_any() {
            let s = Selector::any([Selector::css("a.one"), Selector::css("a.two")]).with_text("x");
            match s {
                Selector::Any(list) => {
                    assert_eq!(list.len(), 2);
                    assert!(list
                        .iter()
                        .all(|s| matches!(s, Selector::CssWithText { text, .. } if text == "x")));
                }
                other => panic!("unexpected selector {other:?}"),
            }
        }

        #[test]
        fn test_with_text_on_text_filters_the_same_element() {
            let s = Selector::Text("MIT".to_string()).with_text("License");
            assert_eq!(
                s,
                Selector::Within {
                    parent: Box::new(Selector::Text("MIT".to_string())),
                    child: Box::new(Selector::CssWithText {
                        css: ":scope".to_string(),
                        text: "License".to_string(),
                    }),
                }
            );
            let q = s.to_query_all();
            assert!(q.contains("(scope0 === document ? [] : [scope0]).filter("));
            assert!(!q.contains("scope0.querySelectorAll('*')"));
        }

        #[test]
        fn test_within() {
            let s = Selector::css("div.BorderGrid-cell").within("p");
            assert!(matches!(s, Selector::Within { .. }));
            assert_eq!(s.to_string(), "div.BorderGrid-cell >> p");
        }
    }

    mod render_tests {
        use super::*;

        #[test]
        fn test_css_query_is_quoted() {
            let q = Selector::css(r#"a[href="/microsoft"]"#).to_query_all();
            assert_eq!(
                q,
                r#"Array.from(document.querySelectorAll("a[href=\"/microsoft\"]"))"#
            );
        }

        #[test]
        fn test_text_filter_rendering() {
            let q = Selector::css("a").with_text("MIT License").to_query_all();
            assert!(q.contains("querySelectorAll(\"a\")"));
            assert!(q.contains(".includes(\"MIT License\")"));
        }

        #[test]
        fn test_any_rendering_dedupes_and_sorts() {
            let q = Selector::any([Selector::css("a.x"), Selector::css("a.y")]).to_query_all();
            assert!(q.starts_with("Array.from(new Set([].concat("));
            assert!(q.contains("compareDocumentPosition"));
        }

        #[test]
        fn test_within_uses_scope_variable() {
            let q = Selector::css("div.cell").within("p").to_query_all();
            assert!(q.contains("scope0.querySelectorAll(\"p\")"));
            assert!(q.contains("document.querySelectorAll(\"div.cell\")"));
        }

        #[test]
        fn test_any_within_full_expression() {
            let q = Selector::css("div.cell")
                .within(Selector::any([Selector::css("p.a"), Selector::css("p")]))
                .to_query_all();
            let expected = concat!(
                "((scope0) => scope0 ? ",
                "Array.from(new Set([].concat(",
                "Array.from(scope0.querySelectorAll(\"p.a\")), ",
                "Array.from(scope0.querySelectorAll(\"p\"))",
                "))).sort((a, b) => (a.compareDocumentPosition(b) & Node.DOCUMENT_POSITION_FOLLOWING) ? -1 : 1)",
                " : [])((Array.from(document.querySelectorAll(\"div.cell\")))[0] || null)",
            );
            assert_eq!(q, expected);
        }

        #[test]
        fn test_test_id_rendering() {
            let q = Selector::test_id("search-result-item").to_query_all();
            assert!(q.contains(r#"[data-testid=\"search-result-item\"]"#));
        }
    }

    mod serde_tests {
        use super::*;

        #[test]
        fn test_yaml_shape() {
            let yaml = "any:\n  - css: a[href*=\"LICENSE\"]\n  - css_with_text:\n      css: a\n      text: MIT License\n";
            let s: Selector = serde_yaml_ng::from_str(yaml).unwrap();
            assert_eq!(
                s,
                Selector::any([
                    Selector::css(r#"a[href*="LICENSE"]"#),
                    Selector::css("a").with_text("MIT License"),
                ])
            );
        }
    }
}
