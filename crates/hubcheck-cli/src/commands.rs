//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use hubcheck::{BrowserKind, Tag};
use std::path::PathBuf;

/// Hubcheck: end-to-end checks for GitHub repository pages and the REST API
#[derive(Parser, Debug)]
#[command(name = "hubcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the selected checks against the live site
    Run(RunArgs),

    /// List registered checks and their tags
    List(ListArgs),

    /// Print the effective selector catalog as YAML
    Selectors(SelectorsArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunArgs {
    /// Browser engine to drive
    #[arg(
        long = "browser-name",
        env = "HUBCHECK_BROWSER",
        default_value = "chromium",
        ignore_case = true
    )]
    pub browser_name: BrowserArg,

    /// Only run checks carrying one of these tags
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<TagArg>,

    /// Only run checks whose id contains this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// YAML file overriding the built-in selectors
    #[arg(long, value_name = "FILE")]
    pub selectors: Option<PathBuf>,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// Delay after every navigation and element action, in milliseconds
    #[arg(long, default_value = "500")]
    pub slow_mo: u64,

    /// Path to the chromium executable
    #[arg(long, env = "CHROME", value_name = "PATH")]
    pub chromium_path: Option<String>,

    /// Disable the chromium sandbox (containers, CI)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Stop after the first failing check
    #[arg(long)]
    pub fail_fast: bool,

    /// Write a JSON report to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Directory for the rotated log file
    #[arg(long, default_value = "logs", value_name = "DIR")]
    pub log_dir: PathBuf,

    /// Web front end base URL
    #[arg(long, env = "HUBCHECK_WEB_URL", value_name = "URL")]
    pub web_base_url: Option<String>,

    /// REST API base URL
    #[arg(long, env = "HUBCHECK_API_URL", value_name = "URL")]
    pub api_base_url: Option<String>,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only list checks carrying one of these tags
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<TagArg>,

    /// Only list checks whose id contains this text
    #[arg(short, long)]
    pub filter: Option<String>,
}

/// Arguments for the selectors command
#[derive(Parser, Debug)]
pub struct SelectorsArgs {
    /// YAML file overriding the built-in selectors
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,
}

/// Browser engine argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BrowserArg {
    /// Chromium over the DevTools protocol
    #[default]
    Chromium,
    /// Firefox (not drivable by this build)
    Firefox,
    /// WebKit (not drivable by this build)
    Webkit,
}

impl From<BrowserArg> for BrowserKind {
    fn from(arg: BrowserArg) -> Self {
        match arg {
            BrowserArg::Chromium => Self::Chromium,
            BrowserArg::Firefox => Self::Firefox,
            BrowserArg::Webkit => Self::Webkit,
        }
    }
}

/// Selection tag argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagArg {
    /// REST API checks
    Api,
    /// Browser checks
    Ui,
    /// Extra search and 404 checks
    Bonus,
}

impl From<TagArg> for Tag {
    fn from(arg: TagArg) -> Self {
        match arg {
            TagArg::Api => Self::Api,
            TagArg::Ui => Self::Ui,
            TagArg::Bonus => Self::Bonus,
        }
    }
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
