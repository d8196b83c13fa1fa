//! Sluice command-line entry point.

use anyhow::Result;
use clap::{ColorChoice, Parser};

use sluice::cli::{Cli, Commands, build::run_build, watch::run_watch};
use sluice::config::SluiceConfig;

fn main() -> Result<()> {
    // Before any blocking operation
    sluice::core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {}
    }

    let config = SluiceConfig::load(&cli)?;

    match &cli.command {
        Commands::Build { .. } => run_build(&config),
        Commands::Watch { .. } => run_watch(config),
    }
}
