mod analyzer;
mod cli;
mod commands;
mod engine;
mod error;
mod extract;
mod model;
mod prompt;
mod rubric;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

fn main() {
    dotenv::dotenv().ok();
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => commands::analyze::run(args),
        Commands::Raw(args) => commands::raw::run(args),
        Commands::Extract(args) => commands::extract::run(args),
        Commands::Interactive(args) => commands::interactive::run(args),
        Commands::Prompt(args) => commands::prompt::run(args),
        Commands::Rubric(args) => commands::rubric::run(args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
