//! Selector catalog for the target site's markup.
//!
//! github.com markup changes without notice, so every selector the suites use
//! lives here as data. Defaults track the current markup and list several
//! fallbacks per query; a YAML file can override any subset of them.

use crate::config::RepoTarget;
use crate::locator::Selector;
use crate::result::HarnessResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Every selector used by the UI suites
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorCatalog {
    /// Repository name link in the page header
    pub repo_name_link: Selector,
    /// Owner link in the page header
    pub owner_link: Selector,
    /// Star counter
    pub star_counter: Selector,
    /// Fork counter
    pub fork_counter: Selector,
    /// Rendered README article
    pub readme: Selector,
    /// Any link to a TypeScript file in a tree listing
    pub typescript_file_link: Selector,
    /// Line-number gutter of the file viewer
    pub line_numbers: Selector,
    /// Code lines of the file viewer
    pub code_lines: Selector,
    /// Syntax-highlighted code container
    pub code_container: Selector,
    /// Sidebar cell holding the About section
    pub about_section: Selector,
    /// Description paragraph inside the About section
    pub about_description: Selector,
    /// License link or label
    pub license: Selector,
    /// Topic tags
    pub topics: Selector,
    /// Button opening the search dialog
    pub search_button: Selector,
    /// Search query input inside the dialog
    pub search_input: Selector,
    /// Search result entries (filtered by the search term at use)
    pub search_results: Selector,
}

impl SelectorCatalog {
    /// Default catalog for a repository target
    #[must_use]
    pub fn for_repo(target: &RepoTarget) -> Self {
        Self {
            repo_name_link: Selector::css(format!(
                r#"a[data-testid="repository-name-link"], strong a[href="/{}/{}"]"#,
                target.owner, target.name
            )),
            owner_link: Selector::css(format!(r#"a[href="/{}"]"#, target.owner)),
            ..Self::default()
        }
    }

    /// Load a catalog from YAML; missing keys keep their defaults
    pub fn from_yaml(yaml: &str) -> HarnessResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load a catalog from a YAML file
    pub fn load(path: &Path) -> HarnessResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Render the catalog as YAML
    pub fn to_yaml(&self) -> HarnessResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}

impl Default for SelectorCatalog {
    fn default() -> Self {
        Self {
            repo_name_link: Selector::css(
                r#"a[data-testid="repository-name-link"], strong a[href="/microsoft/vscode"]"#,
            ),
            owner_link: Selector::css(r#"a[href="/microsoft"]"#),
            star_counter: Selector::css("#repo-stars-counter-star"),
            fork_counter: Selector::css("#repo-network-counter"),
            readme: Selector::css(r#"article[itemprop="text"]"#),
            typescript_file_link: Selector::css(r#"a[href*=".ts"]"#),
            line_numbers: Selector::css("[data-line-number], .blob-num, td.blob-num"),
            code_lines: Selector::css("td.blob-code, .blob-code, .react-code-text"),
            code_container: Selector::css(
                r#"[role="presentation"], .react-code-lines, .blob-wrapper"#,
            ),
            about_section: Selector::css("div.BorderGrid-cell").with_text("About"),
            about_description: Selector::css("p"),
            license: Selector::any([
                Selector::css(r#"a[href*="LICENSE"]"#),
                Selector::css("a").with_text("MIT License"),
                Selector::css(r#"[aria-label*="License"]"#),
            ]),
            topics: Selector::any([
                Selector::css(r#"a[data-octo-click="topic"]"#),
                Selector::css(r#"a[href*="/topics/"]"#),
            ]),
            search_button: Selector::css(
                r#"[aria-label*="Search"], [data-target="qbsearch-input.inputButton"]"#,
            ),
            search_input: Selector::css(
                r#"#query-builder-test, [name="query-builder-test"], [role="combobox"]"#,
            ),
            search_results: Selector::css(
                r#"[data-testid="search-result-item"], .search-title, a[href*="/"]"#,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_repo_rewrites_repo_specific_selectors() {
        let catalog = SelectorCatalog::for_repo(&RepoTarget::new("rust-lang", "rust"));
        assert_eq!(
            catalog.owner_link,
            Selector::css(r#"a[href="/rust-lang"]"#)
        );
        assert!(catalog
            .repo_name_link
            .to_string()
            .contains(r#"strong a[href="/rust-lang/rust"]"#));
        assert_eq!(catalog.star_counter, SelectorCatalog::default().star_counter);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let catalog = SelectorCatalog::from_yaml("star_counter:\n  css: \"#stars\"\n").unwrap();
        assert_eq!(catalog.star_counter, Selector::css("#stars"));
        assert_eq!(catalog.fork_counter, SelectorCatalog::default().fork_counter);
    }

    #[test]
    fn test_yaml_round_trip_of_defaults() {
        let catalog = SelectorCatalog::default();
        let yaml = catalog.to_yaml().unwrap();
        assert!(yaml.contains("repo-stars-counter-star"));
        assert_eq!(SelectorCatalog::from_yaml(&yaml).unwrap(), catalog);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selectors.yaml");
        std::fs::write(&path, "readme:\n  css: \"div.markdown-body\"\n").unwrap();
        let catalog = SelectorCatalog::load(&path).unwrap();
        assert_eq!(catalog.readme, Selector::css("div.markdown-body"));
    }

    #[test]
    fn test_bad_yaml_is_an_error() {
        assert!(SelectorCatalog::from_yaml("star_counter: [1, 2").is_err());
    }
}
