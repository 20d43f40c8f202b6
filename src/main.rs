//! build_firefly - Build firefly polyline data from a DotTrack race replay
//!
//! Fetches the team roster and replay locations for a project, caching the
//! raw responses, and writes `<output>/firefly.json`.

use std::process::ExitCode;

use clap::Parser;

use dottrack_firefly::cli::{BuildConfig, Cli};
use dottrack_firefly::logging::init_logging;
use dottrack_firefly::run_build;

async fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = BuildConfig::from_cli(cli)?;
    run_build(&config).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbosity());

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
