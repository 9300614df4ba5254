use anyhow::Context;
use clap::Parser;
use services::AppServices;

mod cli;
mod commands;
mod output;

use commands::{Outcome, ViewContext};

const EXIT_NOT_FOUND: i32 = 2;

fn main() {
    match run() {
        Ok(Outcome::Shown) => {}
        Ok(Outcome::NotFound(what)) => {
            eprintln!("lex: {what} not found");
            std::process::exit(EXIT_NOT_FOUND);
        }
        Err(error) => {
            eprintln!("lex error: {error:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> anyhow::Result<Outcome> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let settings = cli.settings().context("invalid layout settings")?;
    let clock = cli.clock();
    let app = AppServices::in_memory(&settings, clock).context("failed to load start-up data")?;

    let ctx = ViewContext {
        app: &app,
        settings: &settings,
        clock,
        format: cli.format,
    };
    commands::dispatch(&cli.command, &ctx)
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("LEX_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
