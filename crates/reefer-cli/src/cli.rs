//! CLI definition using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use reefer_types::OutputFormat;

#[derive(Parser)]
#[command(name = "reefer-hub")]
#[command(author = "yuuji")]
#[command(version)]
#[command(about = "Reefer container Report / Monitor consolidation")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Consolidate Report files with Monitor files
    Process {
        /// Report spreadsheet(s)
        #[arg(long, short = 'r', required = true, num_args = 1..)]
        report: Vec<PathBuf>,

        /// Monitor spreadsheet(s)
        #[arg(long, short = 'm', num_args = 1..)]
        monitor: Vec<PathBuf>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Consolidate every spreadsheet in the configured Report and Monitor folders
    Scan {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Show the vessel, rotation and date found in a Report banner
    Metadata {
        /// Report spreadsheet
        file: PathBuf,
    },

    /// Inspect or reset the accumulated monitor history
    History {
        /// Show the stored units
        #[arg(long)]
        show: bool,

        /// Delete the history file
        #[arg(long)]
        clear: bool,

        /// Limit number of units shown
        #[arg(long, short = 'n', default_value = "20")]
        limit: usize,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set the Report folder used by `scan`
        #[arg(long)]
        set_report_dir: Option<PathBuf>,

        /// Set the Monitor folder used by `scan`
        #[arg(long)]
        set_monitor_dir: Option<PathBuf>,

        /// Set the export folder
        #[arg(long)]
        set_output_dir: Option<PathBuf>,

        /// Set the monitor history file
        #[arg(long)]
        set_history_path: Option<PathBuf>,

        /// Set the terminal timezone (IANA name, e.g. America/Santiago)
        #[arg(long)]
        set_timezone: Option<String>,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Enable/disable the legacy per-container forward fill
        #[arg(long)]
        set_legacy_ffill: Option<bool>,

        /// Allow/refuse report-only results when no monitor data exists
        #[arg(long)]
        set_report_only: Option<bool>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}

/// Options shared by `process` and `scan`
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Output folder for the consolidated workbook. Uses config value if not specified.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Only keep containers of this rotation (code or "vessel / rotation")
    #[arg(long)]
    pub rotation: Option<String>,

    /// Evaluate pending processes at this time instead of now (DD/MM/YYYY HH:MM)
    #[arg(long)]
    pub now: Option<String>,

    /// Do not read or update the stored monitor history
    #[arg(long)]
    pub no_history: bool,

    /// Skip writing the consolidated workbook
    #[arg(long)]
    pub no_export: bool,
}
