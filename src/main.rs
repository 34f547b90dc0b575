//! modmajor - Major version upgrade tool for Go modules
//!
//! Subcommands:
//! - get: upgrade a dependency to a major version and rewrite its imports
//! - list: show available updates for direct dependencies
//! - path: change the module path of the current module

use clap::Parser;
use modmajor::cli::{CliArgs, Command};
use modmajor::commands::{CommandStatus, Commands};
use modmajor::config::Config;
use modmajor::output::{create_formatter, OutputConfig, OutputFormatter, TextFormatter};
use modmajor::progress::ListProgress;
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    // Run the main logic and handle errors
    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; RUST_LOG overrides the verbosity flag
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("modmajor=debug")
        } else {
            EnvFilter::new("modmajor=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    // only proxy lookups depend on the environment
    let config = match &args.command {
        Command::Path(_) => Config::default(),
        _ => Config::from_env()?,
    };
    let commands = Commands::new(config)?;

    let json = matches!(&args.command, Command::List(list) if list.json);
    let output_config = OutputConfig::from_cli(json, args.verbose, args.quiet)
        .with_color(io::stdout().is_terminal());
    let text = TextFormatter::with_color(output_config.verbosity, output_config.color);
    let mut stdout = io::stdout().lock();

    match &args.command {
        Command::Get(get) => {
            let outcome = commands.get(get, &text, &mut stdout).await?;
            if outcome.status() == CommandStatus::NothingToDo {
                debug!(spec = %outcome.plan.fetch_spec, "nothing changed");
            }
        }
        Command::Path(path) => {
            let outcome = commands.path(path, &text, &mut stdout)?;
            if outcome.status() == CommandStatus::NothingToDo {
                debug!(module = %outcome.plan.new_module_path, "nothing changed");
            }
        }
        Command::List(list) => {
            let show_progress = !args.quiet && !list.json && io::stderr().is_terminal();
            let mut progress = ListProgress::new(show_progress);
            let report = commands.list(list, &mut progress).await?;

            let formatter = create_formatter(output_config.clone());
            formatter.format_list(&report, &mut stdout)?;
            stdout.flush()?;

            if !list.json && report.has_failures() {
                let errors = TextFormatter::with_color(
                    output_config.verbosity,
                    io::stderr().is_terminal(),
                );
                errors.format_failures(&report.failures, &mut io::stderr().lock())?;
            }

            if report.has_failures() {
                // Partial success - some lookups failed
                return Ok(ExitCode::from(2));
            }
        }
    }

    stdout.flush()?;
    Ok(ExitCode::SUCCESS)
}
