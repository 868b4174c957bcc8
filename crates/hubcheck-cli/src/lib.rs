//! Hubcheck CLI Library
//!
//! Command-line surface for the hubcheck checks: flag parsing, progress
//! output and the mapping from a run's results to an exit code.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
mod output;
mod runner;

pub use commands::{BrowserArg, Cli, ColorArg, Commands, ListArgs, RunArgs, SelectorsArgs, TagArg};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::ProgressReporter;
pub use runner::{harness_config, list_checks, render_selectors, run_checks};
