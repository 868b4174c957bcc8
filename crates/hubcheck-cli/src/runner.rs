//! Command execution: build the harness configuration from flags, run the
//! selected checks, report.

use crate::commands::{ListArgs, RunArgs, SelectorsArgs, TagArg};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use hubcheck::{
    logging, suites, BrowserKind, HarnessConfig, LogConfig, RunReport, SelectorCatalog,
    SuiteResults, TestCase, TestFilter, TestRunner,
};
use std::path::Path;
use tracing::info;

/// Build the harness configuration for a run
pub fn harness_config(config: &CliConfig, args: &RunArgs) -> CliResult<HarnessConfig> {
    let mut harness = HarnessConfig::default().with_browser_kind(BrowserKind::from(args.browser_name));

    harness.browser = harness
        .browser
        .with_headless(args.headless)
        .with_slow_mo(args.slow_mo);
    if let Some(ref path) = args.chromium_path {
        harness.browser = harness.browser.with_chromium_path(path.clone());
    }
    if args.no_sandbox {
        harness.browser = harness.browser.with_no_sandbox();
    }

    if let Some(ref url) = args.web_base_url {
        harness = harness.with_web_base_url(url.clone());
    }
    if let Some(ref url) = args.api_base_url {
        harness = harness.with_api_base_url(url.clone());
    }
    if let Some(ref path) = args.selectors {
        harness = harness.with_selectors(load_selectors(path)?);
    }

    let log = LogConfig::new(args.log_dir.clone(), hubcheck::config::LOG_FILE_NAME)
        .with_level(config.verbosity.log_level())
        .with_ansi(config.color.should_color());
    Ok(harness.with_log(log))
}

fn load_selectors(path: &Path) -> CliResult<SelectorCatalog> {
    SelectorCatalog::load(path)
        .map_err(|e| CliError::config(format!("cannot load selectors from {}: {e}", path.display())))
}

fn selected(tags: &[TagArg], substring: Option<&str>) -> Vec<TestCase> {
    let mut filter = TestFilter::all().with_tags(tags.iter().copied().map(Into::into));
    if let Some(s) = substring {
        filter = filter.with_substring(s);
    }
    filter.apply(suites::all())
}

/// Execute the `run` command
pub fn run_checks(config: &CliConfig, args: &RunArgs) -> CliResult<SuiteResults> {
    let harness = harness_config(config, args)?;
    logging::init(&harness.log)?;

    let cases = selected(&args.tags, args.filter.as_deref());
    let mut reporter =
        ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
    if cases.is_empty() {
        reporter.warning("No checks selected");
    }

    info!(
        "Running {} checks with {} (log: {})",
        cases.len(),
        harness.browser.kind,
        harness.log.path().display()
    );
    let browser = harness.browser.kind.to_string();
    let runner = TestRunner::new(harness).with_fail_fast(args.fail_fast);

    reporter.header("Running Checks");
    reporter.start_progress(cases.len() as u64, "Starting...");
    let runtime = tokio::runtime::Runtime::new()?;
    let results = runtime.block_on(runner.run(&cases, &mut reporter));
    reporter.finish();
    reporter.summary(results.passed_count(), results.failed_count(), results.duration);

    if let Some(ref path) = args.report {
        RunReport::from_results(&results, &browser).write_json(path)?;
        info!("Report written to {}", path.display());
    }

    Ok(results)
}

/// Execute the `list` command
pub fn list_checks(args: &ListArgs) -> Vec<String> {
    selected(&args.tags, args.filter.as_deref())
        .iter()
        .map(|case| {
            let tags: Vec<&str> = case.tags.iter().map(|t| t.as_str()).collect();
            format!("{} [{}]", case.id(), tags.join(","))
        })
        .collect()
}

/// Execute the `selectors` command
pub fn render_selectors(args: &SelectorsArgs) -> CliResult<String> {
    let catalog = match args.file {
        Some(ref path) => load_selectors(path)?,
        None => HarnessConfig::default().selectors,
    };
    Ok(catalog.to_yaml()?)
}
