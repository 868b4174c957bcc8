//! Browser selection and launch.
//!
//! Chromium is driven over the Chrome `DevTools` Protocol when compiled with
//! the `browser` feature (chromiumoxide). Firefox and WebKit are accepted as
//! engine names so a run can be configured for them, but launching them
//! fails with [`HarnessError::UnsupportedBrowser`].

use crate::driver::{Browser, ContextOptions};
use crate::result::{HarnessError, HarnessResult};
use std::fmt;
use std::str::FromStr;

/// Launch flags applied to every Chromium launch
pub const DEFAULT_LAUNCH_ARGS: [&str; 2] = [
    "--start-maximized",
    "--disable-blink-features=AutomationControlled",
];

/// Browser engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BrowserKind {
    /// Chromium / Chrome
    #[default]
    Chromium,
    /// Firefox
    Firefox,
    /// WebKit
    Webkit,
}

impl BrowserKind {
    /// All engines, in command-line order
    pub const ALL: [Self; 3] = [Self::Chromium, Self::Firefox, Self::Webkit];

    /// Command-line name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Chromium => "chromium",
            Self::Firefox => "firefox",
            Self::Webkit => "webkit",
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrowserKind {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                HarnessError::config(format!(
                    "unknown browser '{s}', expected one of chromium, firefox, webkit"
                ))
            })
    }
}

/// Browser configuration, fixed for a whole run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserConfig {
    /// Engine to launch
    pub kind: BrowserKind,
    /// Run in headless mode
    pub headless: bool,
    /// Pause after every navigation and element action (ms)
    pub slow_mo_ms: u64,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Extra launch flags
    pub args: Vec<String>,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            kind: BrowserKind::Chromium,
            headless: false,
            slow_mo_ms: 500,
            viewport_width: 1920,
            viewport_height: 1080,
            args: DEFAULT_LAUNCH_ARGS.iter().map(ToString::to_string).collect(),
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set the slow-motion delay
    #[must_use]
    pub const fn with_slow_mo(mut self, ms: u64) -> Self {
        self.slow_mo_ms = ms;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Options for each per-test context
    #[must_use]
    pub const fn context_options(&self) -> ContextOptions {
        ContextOptions {
            viewport_width: self.viewport_width,
            viewport_height: self.viewport_height,
        }
    }
}

/// Launch the configured engine
pub async fn launch(config: &BrowserConfig) -> HarnessResult<Box<dyn Browser>> {
    match config.kind {
        BrowserKind::Chromium => launch_chromium(config).await,
        other => Err(HarnessError::UnsupportedBrowser {
            engine: other.to_string(),
            reason: "only chromium can be driven over the DevTools protocol".to_string(),
        }),
    }
}

#[cfg(feature = "browser")]
async fn launch_chromium(config: &BrowserConfig) -> HarnessResult<Box<dyn Browser>> {
    Ok(Box::new(cdp::CdpBrowser::launch(config).await?))
}

#[cfg(not(feature = "browser"))]
async fn launch_chromium(_config: &BrowserConfig) -> HarnessResult<Box<dyn Browser>> {
    Err(HarnessError::BrowserLaunchError {
        message: "hubcheck was built without the `browser` feature".to_string(),
    })
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
mod cdp {
    use super::BrowserConfig;
    use crate::driver::{Browser, BrowserContext, ContextOptions, ElementSnapshot, PageDriver};
    use crate::locator::Selector;
    use crate::result::{HarnessError, HarnessResult};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as RawBrowser, BrowserConfig as RawConfig};
    use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
    use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
    use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
    use chromiumoxide::cdp::browser_protocol::target::{
        CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
    };
    use chromiumoxide::element::Element;
    use chromiumoxide::page::Page as RawPage;
    use futures::StreamExt;
    use serde::de::DeserializeOwned;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tokio::task::JoinHandle;
    use tracing::debug;

    /// Attribute used to hand a JS-resolved element over to CDP input
    const TARGET_ATTRIBUTE: &str = "data-hubcheck-target";

    static NEXT_TARGET: AtomicU64 = AtomicU64::new(1);

    fn page_err(e: impl std::fmt::Display) -> HarnessError {
        HarnessError::page(e.to_string())
    }

    /// Browser instance with real CDP connection
    #[derive(Debug)]
    pub(super) struct CdpBrowser {
        inner: Arc<Mutex<RawBrowser>>,
        handle: JoinHandle<()>,
    }

    impl CdpBrowser {
        pub(super) async fn launch(config: &BrowserConfig) -> HarnessResult<Self> {
            let mut builder = RawConfig::builder()
                .window_size(config.viewport_width, config.viewport_height)
                .args(config.args.iter().map(String::as_str));

            if !config.headless {
                builder = builder.with_head();
            }
            if !config.sandbox {
                builder = builder.no_sandbox();
            }
            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let raw_config = builder
                .build()
                .map_err(|message| HarnessError::BrowserLaunchError { message })?;

            let (browser, mut handler) = RawBrowser::launch(raw_config).await.map_err(|e| {
                HarnessError::BrowserLaunchError {
                    message: e.to_string(),
                }
            })?;

            // Spawn handler task
            let handle = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if let Err(e) = event {
                        debug!("CDP handler stopped: {e}");
                        break;
                    }
                }
            });

            Ok(Self {
                inner: Arc::new(Mutex::new(browser)),
                handle,
            })
        }
    }

    #[async_trait]
    impl Browser for CdpBrowser {
        fn name(&self) -> &str {
            "chromium"
        }

        async fn new_context(
            &self,
            options: &ContextOptions,
        ) -> HarnessResult<Box<dyn BrowserContext>> {
            let id = {
                let browser = self.inner.lock().await;
                browser
                    .execute(CreateBrowserContextParams::default())
                    .await
                    .map_err(page_err)?
                    .result
                    .browser_context_id
            };
            Ok(Box::new(CdpContext {
                browser: Arc::clone(&self.inner),
                id,
                options: *options,
            }))
        }

        async fn close(&self) -> HarnessResult<()> {
            let mut browser = self.inner.lock().await;
            let result = browser
                .close()
                .await
                .map(|_| ())
                .map_err(|e| HarnessError::BrowserLaunchError {
                    message: e.to_string(),
                });
            self.handle.abort();
            result
        }
    }

    #[derive(Debug)]
    struct CdpContext {
        browser: Arc<Mutex<RawBrowser>>,
        id: BrowserContextId,
        options: ContextOptions,
    }

    #[async_trait]
    impl BrowserContext for CdpContext {
        async fn new_page(&self) -> HarnessResult<Box<dyn PageDriver>> {
            let params = CreateTargetParams::builder()
                .url("about:blank")
                .browser_context_id(self.id.clone())
                .build()
                .map_err(HarnessError::page)?;
            let page = {
                let browser = self.browser.lock().await;
                browser.new_page(params).await.map_err(page_err)?
            };
            page.execute(SetDeviceMetricsOverrideParams::new(
                i64::from(self.options.viewport_width),
                i64::from(self.options.viewport_height),
                1.0,
                false,
            ))
            .await
            .map_err(page_err)?;
            Ok(Box::new(CdpPage { page }))
        }

        async fn close(&self) -> HarnessResult<()> {
            let browser = self.browser.lock().await;
            browser
                .execute(DisposeBrowserContextParams::new(self.id.clone()))
                .await
                .map(|_| ())
                .map_err(page_err)
        }
    }

    #[derive(Debug)]
    struct CdpPage {
        page: RawPage,
    }

    impl CdpPage {
        /// Evaluate `expr`, which must produce a JSON string, and decode it
        async fn eval_json<T: DeserializeOwned>(&self, expr: &str) -> HarnessResult<T> {
            let raw: String = self
                .page
                .evaluate(expr)
                .await
                .map_err(page_err)?
                .into_value()
                .map_err(page_err)?;
            Ok(serde_json::from_str(&raw)?)
        }

        /// Tag the first match and resolve it as a CDP element
        async fn target(&self, selector: &Selector) -> HarnessResult<Element> {
            let token = NEXT_TARGET.fetch_add(1, Ordering::Relaxed);
            let script = format!(
                "(() => {{ const el = ({})[0]; if (!el) return JSON.stringify(false); \
                 el.setAttribute('{TARGET_ATTRIBUTE}', '{token}'); \
                 el.scrollIntoView({{ block: 'center', inline: 'center' }}); \
                 return JSON.stringify(true); }})()",
                selector.to_query_all()
            );
            let found: bool = self.eval_json(&script).await?;
            if !found {
                return Err(HarnessError::ElementNotFound {
                    selector: selector.to_string(),
                });
            }
            self.page
                .find_element(format!("[{TARGET_ATTRIBUTE}=\"{token}\"]"))
                .await
                .map_err(page_err)
        }
    }

    #[async_trait]
    impl PageDriver for CdpPage {
        async fn navigate(&self, url: &str) -> HarnessResult<()> {
            let response = self
                .page
                .execute(NavigateParams::new(url))
                .await
                .map_err(|e| HarnessError::NavigationError {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            match response.result.error_text {
                Some(message) if !message.is_empty() => Err(HarnessError::NavigationError {
                    url: url.to_string(),
                    message,
                }),
                _ => Ok(()),
            }
        }

        async fn ready_state(&self) -> HarnessResult<String> {
            self.eval_json("JSON.stringify(document.readyState)").await
        }

        async fn resource_count(&self) -> HarnessResult<u64> {
            self.eval_json("JSON.stringify(performance.getEntriesByType('resource').length)")
                .await
        }

        async fn current_url(&self) -> HarnessResult<String> {
            Ok(self
                .page
                .url()
                .await
                .map_err(page_err)?
                .unwrap_or_else(|| "about:blank".to_string()))
        }

        async fn content(&self) -> HarnessResult<String> {
            self.page.content().await.map_err(page_err)
        }

        async fn query(&self, selector: &Selector) -> HarnessResult<Option<ElementSnapshot>> {
            let script = format!(
                "(() => {{ const all = {}; const el = all[0]; \
                 if (!el) return JSON.stringify(null); \
                 const style = window.getComputedStyle(el); \
                 const rect = el.getBoundingClientRect(); \
                 const attributes = {{}}; \
                 for (const a of el.attributes) attributes[a.name] = a.value; \
                 return JSON.stringify({{ \
                   tag_name: el.tagName.toLowerCase(), \
                   visible: style.visibility !== 'hidden' && rect.width > 0 && rect.height > 0, \
                   inner_text: el.innerText || '', \
                   inner_html: el.innerHTML || '', \
                   text_content: el.textContent || '', \
                   attributes, \
                   match_count: all.length }}); }})()",
                selector.to_query_all()
            );
            self.eval_json(&script).await
        }

        async fn click(&self, selector: &Selector) -> HarnessResult<()> {
            self.target(selector)
                .await?
                .click()
                .await
                .map(|_| ())
                .map_err(page_err)
        }

        async fn fill(&self, selector: &Selector, text: &str) -> HarnessResult<()> {
            let element = self.target(selector).await?;
            element
                .call_js_fn("function() { if ('value' in this) { this.value = ''; } }", false)
                .await
                .map_err(page_err)?;
            element.focus().await.map_err(page_err)?;
            element.type_str(text).await.map_err(page_err)?;
            Ok(())
        }

        async fn press(&self, selector: &Selector, key: &str) -> HarnessResult<()> {
            let element = self.target(selector).await?;
            element.focus().await.map_err(page_err)?;
            element.press_key(key).await.map(|_| ()).map_err(page_err)
        }

        async fn close(&self) -> HarnessResult<()> {
            self.page.clone().close().await.map_err(page_err)
        }
    }
}
