//! Hubcheck CLI: run the GitHub UI and REST API checks
//!
//! ## Usage
//!
//! ```bash
//! hubcheck run                            # Run every check in chromium
//! hubcheck run --tag api                  # REST checks only, no browser
//! hubcheck run --tag ui --headless        # Browser checks without a window
//! hubcheck run --filter search:: --report target/hubcheck.json
//! hubcheck list --tag bonus               # Show check ids and tags
//! hubcheck selectors > selectors.yaml     # Dump the selector catalog
//! ```

use clap::Parser;
use hubcheck_cli::{
    list_checks, render_selectors, run_checks, Cli, CliConfig, CliError, CliResult, ColorChoice,
    Commands, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);

    match cli.command {
        Commands::Run(args) => {
            let results = run_checks(&config, &args)?;
            if results.all_passed() {
                Ok(())
            } else {
                Err(CliError::test_execution(format!(
                    "{} of {} checks failed",
                    results.failed_count(),
                    results.total()
                )))
            }
        }
        Commands::List(args) => {
            for line in list_checks(&args) {
                println!("{line}");
            }
            Ok(())
        }
        Commands::Selectors(args) => {
            print!("{}", render_selectors(&args)?);
            Ok(())
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.clone().into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color)
}
