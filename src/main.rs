//! Stagehand - module staging and dev proxy for a backing GWT-style compiler.

#![allow(dead_code)]

mod backend;
mod cli;
mod config;
mod core;
mod descriptor;
mod logger;
mod proxy;
mod resource;
mod stage;
mod utils;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::{StageConfig, init_config};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {}
    }
    logger::set_verbose(cli.verbose);

    let config = init_config(StageConfig::load(&cli)?);

    match &cli.command {
        Commands::Stage => cli::stage::stage_modules(config),
        Commands::Serve { .. } => cli::serve::serve(),
    }
}
