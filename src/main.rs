//! whitelabel - self-healing content overrides for pre-built web pages.

#![allow(dead_code)]

mod cli;
mod config;
mod dom;
mod embed;
mod host;
mod localize;
mod logger;
mod overrider;
mod rules;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::WhitelabelConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    if let Commands::Init { dir, force, dry } = &cli.command {
        let dir = match dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        return cli::init::init_config(&dir, *force, *dry);
    }

    let config = WhitelabelConfig::load(&std::env::current_dir()?, &cli.config)?;

    match &cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Apply { page } => cli::apply::run(page, &config).map(|_| ()),
        Commands::Check { json } => cli::check::run(&config, *json),
        Commands::Replay { page, script } => cli::replay::run(page, script, &config).map(|_| ()),
        Commands::Watch { page } => cli::watch::run(page, config),
    }
}
