//! Reefer Hub - Report / Monitor consolidation for reefer containers
//!
//! A CLI tool that joins terminal Report exports with Monitor sensor readings
//! and times the plug-in processes of each container.

mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::Cli;
use env_logger::{Builder, Env};

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "info" } else { "warn" };
    Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    if let Err(e) = commands::execute(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
