//! Browser and per-test page lifecycle.
//!
//! The browser is launched once per run, and only when a selected case
//! needs it. Each UI case gets its own context and page:
//!
//! ```text
//! open:   new_context ──► new_page ──► (test body runs)
//! close:  close page ──► close context      (errors logged, never raised)
//! ```

use crate::browser::{self, BrowserConfig};
use crate::driver::{Browser, BrowserContext, ContextOptions, PageDriver};
use crate::result::{HarnessError, HarnessResult};
use tracing::{debug, info, warn};

/// The run's browser, if one was needed
pub enum BrowserSlot {
    /// No selected case needs a browser
    NotNeeded,
    /// Browser is up
    Ready(Box<dyn Browser>),
    /// Launch failed; every UI case reports this message
    Failed(String),
}

impl std::fmt::Debug for BrowserSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotNeeded => f.write_str("NotNeeded"),
            Self::Ready(browser) => f.debug_tuple("Ready").field(&browser.name()).finish(),
            Self::Failed(message) => f.debug_tuple("Failed").field(message).finish(),
        }
    }
}

impl BrowserSlot {
    /// Launch the configured engine when `needed`
    pub async fn launch_for(needed: bool, config: &BrowserConfig) -> Self {
        if !needed {
            debug!("No UI cases selected, browser not launched");
            return Self::NotNeeded;
        }
        info!("Configuring browser launch arguments");
        debug!(
            "engine={} headless={} slow_mo={}ms args={:?}",
            config.kind, config.headless, config.slow_mo_ms, config.args
        );
        match browser::launch(config).await {
            Ok(browser) => Self::Ready(browser),
            Err(e) => {
                warn!("Browser launch failed: {e}");
                Self::Failed(e.to_string())
            }
        }
    }

    /// The launched browser
    pub fn browser(&self) -> HarnessResult<&dyn Browser> {
        match self {
            Self::Ready(browser) => Ok(browser.as_ref()),
            Self::Failed(message) => Err(HarnessError::BrowserLaunchError {
                message: message.clone(),
            }),
            Self::NotNeeded => Err(HarnessError::BrowserLaunchError {
                message: "browser was not launched for this run".to_string(),
            }),
        }
    }

    /// Shut the browser down, ignoring errors
    pub async fn close(self) {
        if let Self::Ready(browser) = self {
            if let Err(e) = browser.close().await {
                debug!("Ignoring browser close error: {e}");
            }
        }
    }
}

/// An isolated context with one page
pub struct PageSession {
    context: Box<dyn BrowserContext>,
    page: Box<dyn PageDriver>,
}

impl std::fmt::Debug for PageSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageSession").finish_non_exhaustive()
    }
}

impl PageSession {
    /// Create a context, then a page inside it
    pub async fn open(browser: &dyn Browser, options: &ContextOptions) -> HarnessResult<Self> {
        let context = browser.new_context(options).await?;
        match context.new_page().await {
            Ok(page) => Ok(Self { context, page }),
            Err(e) => {
                if let Err(close_err) = context.close().await {
                    debug!("Ignoring context close error: {close_err}");
                }
                Err(e)
            }
        }
    }

    /// The session's page
    pub fn page(&self) -> &dyn PageDriver {
        self.page.as_ref()
    }

    /// Close the page, then the context; errors are logged and dropped
    pub async fn close(self) {
        if let Err(e) = self.page.close().await {
            debug!("Ignoring page close error: {e}");
        }
        if let Err(e) = self.context.close().await {
            debug!("Ignoring context close error: {e}");
        }
    }
}
