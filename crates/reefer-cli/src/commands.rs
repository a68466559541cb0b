//! Command handlers

use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;

use crate::cli::{Cli, Commands, OutputFormat, RunArgs};
use crate::output::{output_history, output_metadata, output_outcome};
use reefer_app::app::{ConsolidationError, ConsolidationService};
use reefer_app::config::Config;
use reefer_app::export::export_to_excel;
use reefer_app::repository::{open_history_repo, open_run_history};
use reefer_app::scanner::scan_spreadsheets;
use reefer_domain::{
    filter_rotation, group_by_rotation, summarize, Clock, FixedClock, MetadataExtractor,
    MonitorHistoryRepository,
};
use reefer_infra::load_sheet;
use reefer_types::{parse_timestamp, Error};

/// Anything a command can fail with
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] Error),

    #[error(transparent)]
    Consolidation(#[from] ConsolidationError),

    #[error("{0}")]
    Usage(String),
}

pub type Result<T> = std::result::Result<T, CliError>;

pub fn execute(cli: Cli) -> Result<()> {
    // Load config
    let config = Config::load()?;
    let output_format = cli.format.unwrap_or(config.output_format);

    match &cli.command {
        Commands::Process {
            report,
            monitor,
            run,
        } => cmd_process(&config, report, monitor, run, output_format),

        Commands::Scan { run } => cmd_scan(&config, run, output_format),

        Commands::Metadata { file } => cmd_metadata(&config, file, output_format),

        Commands::History { show, clear, limit } => {
            cmd_history(&config, *show, *clear, *limit, output_format)
        }

        Commands::Config {
            show,
            set_report_dir,
            set_monitor_dir,
            set_output_dir,
            set_history_path,
            set_timezone,
            set_output,
            set_legacy_ffill,
            set_report_only,
            reset,
        } => cmd_config(
            *show,
            ConfigUpdate {
                report_dir: set_report_dir.clone(),
                monitor_dir: set_monitor_dir.clone(),
                output_dir: set_output_dir.clone(),
                history_path: set_history_path.clone(),
                timezone: set_timezone.clone(),
                output_format: *set_output,
                legacy_forward_fill: *set_legacy_ffill,
                allow_report_only: *set_report_only,
            },
            *reset,
        ),
    }
}

fn cmd_process(
    config: &Config,
    reports: &[PathBuf],
    monitors: &[PathBuf],
    run: &RunArgs,
    output_format: OutputFormat,
) -> Result<()> {
    run_consolidation(config, reports, monitors, run, output_format)
}

fn cmd_scan(config: &Config, run: &RunArgs, output_format: OutputFormat) -> Result<()> {
    let report_dir = config.report_dir.as_ref().ok_or_else(|| {
        CliError::Usage(
            "Report folder not configured. Set it with: reefer-hub config --set-report-dir <DIR>"
                .to_string(),
        )
    })?;
    let reports = scan_spreadsheets(report_dir)?;
    if reports.is_empty() {
        return Err(Error::FileNotFound(format!(
            "No spreadsheets found in {}",
            report_dir.display()
        ))
        .into());
    }

    let monitors = match config.monitor_dir {
        Some(ref dir) => scan_spreadsheets(dir)?,
        None => Vec::new(),
    };
    log::info!(
        "scan: {} report file(s), {} monitor file(s)",
        reports.len(),
        monitors.len()
    );

    run_consolidation(config, &reports, &monitors, run, output_format)
}

fn run_consolidation(
    config: &Config,
    reports: &[PathBuf],
    monitors: &[PathBuf],
    run: &RunArgs,
    output_format: OutputFormat,
) -> Result<()> {
    let clock: Box<dyn Clock> = match run.now {
        Some(ref text) => Box::new(FixedClock(parse_timestamp(text).ok_or_else(|| {
            CliError::Usage(format!("Invalid --now timestamp: {}", text))
        })?)),
        None => Box::new(config.clock()?),
    };
    let history = open_run_history(config, !run.no_history)?;

    let mut service = ConsolidationService::new(config, history.as_ref(), clock.as_ref());

    let total = reports.len() + monitors.len();
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map_err(|e| CliError::Usage(e.to_string()))?
            .progress_chars("#>-"),
    );
    if output_format == OutputFormat::Json {
        pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }

    let mut started = false;
    let result = service.run(reports, monitors, |path| {
        if started {
            pb.inc(1);
        }
        started = true;
        pb.set_message(file_name(path));
    });
    pb.finish_and_clear();
    let mut outcome = result?;

    if let Some(ref label) = run.rotation {
        outcome.table = filter_rotation(&outcome.table, label);
        if outcome.table.is_empty() {
            return Err(CliError::Usage(format!("No containers for rotation '{}'", label)));
        }
        let matched = outcome
            .table
            .column(&config.unit_column())
            .map(|cells| cells.filter(|c| !c.is_blank()).count())
            .unwrap_or(0);
        outcome.summary = summarize(
            &outcome.table,
            &config.processes,
            &config.normalized_sensor_columns(),
            matched,
        );
    }

    let rotations = group_by_rotation(&outcome.table);

    let exported = if run.no_export {
        None
    } else {
        let output_dir = run.output.clone().unwrap_or_else(|| config.output_dir());
        let rotation = export_rotation_name(run, &outcome.metadata.rotation, rotations.len());
        Some(export_to_excel(&outcome.table, &rotation, &output_dir)?)
    };

    output_outcome(output_format, &outcome, &rotations, exported.as_deref())?;
    Ok(())
}

/// Rotation code used for the workbook name
fn export_rotation_name(run: &RunArgs, first_rotation: &str, batches: usize) -> String {
    match run.rotation {
        Some(ref label) => label
            .rsplit_once(" / ")
            .map(|(_, code)| code.to_string())
            .unwrap_or_else(|| label.clone()),
        None if batches > 1 => "multiple".to_string(),
        None => first_rotation.to_string(),
    }
}

fn cmd_metadata(config: &Config, file: &Path, output_format: OutputFormat) -> Result<()> {
    let sheet = load_sheet(file)?;
    let metadata = MetadataExtractor::new(config.metadata_scan_rows).extract(&sheet);
    output_metadata(output_format, &metadata)?;
    Ok(())
}

fn cmd_history(
    config: &Config,
    show: bool,
    clear: bool,
    limit: usize,
    output_format: OutputFormat,
) -> Result<()> {
    let repo = open_history_repo(config)?;

    if clear {
        repo.clear()?;
        println!("Monitor history cleared ({})", repo.path().display());
    }

    if show || !clear {
        let history = repo.load()?;
        output_history(output_format, &history, &config.unit_column(), limit)?;
    }

    Ok(())
}

/// Values given with `config --set-*`
struct ConfigUpdate {
    report_dir: Option<PathBuf>,
    monitor_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    history_path: Option<PathBuf>,
    timezone: Option<String>,
    output_format: Option<OutputFormat>,
    legacy_forward_fill: Option<bool>,
    allow_report_only: Option<bool>,
}

fn cmd_config(show: bool, update: ConfigUpdate, reset: bool) -> Result<()> {
    if reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    let mut config = Config::load()?;
    let mut modified = false;

    if let Some(dir) = update.report_dir {
        config.report_dir = Some(dir);
        modified = true;
    }

    if let Some(dir) = update.monitor_dir {
        config.monitor_dir = Some(dir);
        modified = true;
    }

    if let Some(dir) = update.output_dir {
        config.output_dir = Some(dir);
        modified = true;
    }

    if let Some(path) = update.history_path {
        config.history_path = Some(path);
        modified = true;
    }

    if let Some(timezone) = update.timezone {
        config.timezone = timezone;
        // Reject unknown zones before saving
        config.clock()?;
        modified = true;
    }

    if let Some(output_format) = update.output_format {
        config.output_format = output_format;
        modified = true;
    }

    if let Some(enabled) = update.legacy_forward_fill {
        config.legacy_forward_fill = enabled;
        modified = true;
    }

    if let Some(allowed) = update.allow_report_only {
        config.allow_report_only = allowed;
        modified = true;
    }

    if modified {
        config.save()?;
        println!("Configuration updated");
    }

    if show || !modified {
        println!("{}", config);
    }

    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_rotation_name() {
        let mut run = RunArgs::default();
        assert_eq!(export_rotation_name(&run, "2401-E", 1), "2401-E");
        assert_eq!(export_rotation_name(&run, "2401-E", 2), "multiple");

        run.rotation = Some("MSC ANNA / 2401-E".into());
        assert_eq!(export_rotation_name(&run, "x", 2), "2401-E");
    }

    #[test]
    fn test_core_errors_are_transparent() {
        let err: CliError = Error::FileNotFound("a.xlsx".into()).into();
        assert_eq!(err.to_string(), "File not found: a.xlsx");
    }
}
