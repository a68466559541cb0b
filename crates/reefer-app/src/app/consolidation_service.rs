//! Consolidation Service - Core Use Case for Report/Monitor reconciliation
//!
//! This service orchestrates one processing run:
//! 1. Read each Report file, extract its banner metadata and parse its table
//! 2. Tag rows with their rotation and stack all Reports
//! 3. Fold uploaded Monitor sheets into the persisted history
//! 4. Left-join Reports against the Monitor units and classify CT / General
//! 5. Compute process status, duration, semáforo and compliance
//! 6. Summarize and return the result with every non-fatal warning

use std::fs;
use std::path::Path;

use thiserror::Error;

use reefer_domain::{
    apply_process_timers, concat_reports, parse_with_keyword, reconcile, summarize, tag_rotation,
    Clock, ConsolidationSummary, MetadataExtractor, MonitorAccumulator, MonitorHistoryRepository,
    ReportMetadata,
};
use reefer_infra::{read_sheet_bytes, ParseCache};
use reefer_types::{Error, RawSheet, Table, Warning};

use crate::config::Config;

/// Errors specific to the consolidation service
#[derive(Debug, Error)]
pub enum ConsolidationError {
    #[error("No report data: {0}")]
    NoReportData(String),

    #[error("No monitor data available and report-only output is disabled")]
    NoMonitorData,

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Consolidation failed: {0}")]
    Failed(String),
}

impl From<Error> for ConsolidationError {
    fn from(err: Error) -> Self {
        match err {
            Error::NoReportData => ConsolidationError::NoReportData(err.to_string()),
            Error::NoMonitorData => ConsolidationError::NoMonitorData,
            Error::FileNotFound(_) | Error::Spreadsheet(_) | Error::HeaderNotFound { .. } => {
                ConsolidationError::Spreadsheet(err.to_string())
            }
            Error::Config(e) => ConsolidationError::ConfigError(e.to_string()),
            _ => ConsolidationError::Failed(err.to_string()),
        }
    }
}

/// One Report file after header detection
#[derive(Debug, Clone)]
pub struct ParsedReport {
    pub source: String,
    pub metadata: ReportMetadata,
    /// Data rows, tagged with the rotation label
    pub table: Table,
}

/// Result of a consolidation run
#[derive(Debug, Clone)]
pub struct ConsolidationOutcome {
    pub table: Table,
    /// Metadata of the first Report, used for the export name
    pub metadata: ReportMetadata,
    pub reports: Vec<ReportMetadata>,
    pub summary: ConsolidationSummary,
    pub warnings: Vec<Warning>,
    /// True when no Monitor data took part in the join
    pub report_only: bool,
}

/// Orchestrates one processing run over a history store and a clock
pub struct ConsolidationService<'a> {
    config: &'a Config,
    history: &'a dyn MonitorHistoryRepository,
    clock: &'a dyn Clock,
    extractor: MetadataExtractor,
    report_cache: ParseCache<ParsedReport>,
    monitor_cache: ParseCache<RawSheet>,
}

impl<'a> ConsolidationService<'a> {
    pub fn new(
        config: &'a Config,
        history: &'a dyn MonitorHistoryRepository,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            config,
            history,
            clock,
            extractor: MetadataExtractor::new(config.metadata_scan_rows),
            report_cache: ParseCache::new(),
            monitor_cache: ParseCache::new(),
        }
    }

    /// Parse one Report sheet: metadata from the banner, table from the header row
    pub fn parse_report(&self, sheet: &RawSheet) -> Result<ParsedReport, Error> {
        parse_report_sheet(&self.extractor, &self.config.container_column(), sheet)
    }

    /// Read and parse a Report file, reusing an earlier parse of identical bytes
    pub fn load_report(&mut self, path: &Path) -> Result<ParsedReport, Error> {
        let bytes = read_file(path)?;
        let source = file_label(path);
        let keyword = self.config.container_column();

        let extractor = &self.extractor;
        let mut parsed = self.report_cache.get_or_try_insert_with(&bytes, &keyword, || {
            let sheet = read_sheet_bytes(bytes.clone(), &source)?;
            parse_report_sheet(extractor, &keyword, &sheet)
        })?;
        parsed.source = source;
        Ok(parsed)
    }

    /// Read a Monitor file, reusing an earlier decode of identical bytes
    pub fn load_monitor(&mut self, path: &Path) -> Result<RawSheet, Error> {
        let bytes = read_file(path)?;
        let source = file_label(path);
        let keyword = self.config.unit_column();
        let mut sheet = self
            .monitor_cache
            .get_or_try_insert_with(&bytes, &keyword, || read_sheet_bytes(bytes.clone(), &source))?;
        sheet.source = source;
        Ok(sheet)
    }

    /// Load every file, then consolidate.
    ///
    /// Unreadable Report files and Monitor files are skipped with a warning;
    /// the run fails only when no Report survives. `on_file` is called before
    /// each file is read.
    pub fn run<F>(
        &mut self,
        report_paths: &[impl AsRef<Path>],
        monitor_paths: &[impl AsRef<Path>],
        mut on_file: F,
    ) -> Result<ConsolidationOutcome, ConsolidationError>
    where
        F: FnMut(&Path),
    {
        let mut warnings = Vec::new();

        let mut reports = Vec::new();
        for path in report_paths {
            let path = path.as_ref();
            on_file(path);
            match self.load_report(path) {
                Ok(report) => reports.push(report),
                Err(e) => {
                    log::warn!("report {} skipped: {}", path.display(), e);
                    warnings.push(Warning::ReportSkipped {
                        source: file_label(path),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let mut monitors = Vec::new();
        for path in monitor_paths {
            let path = path.as_ref();
            on_file(path);
            match self.load_monitor(path) {
                Ok(sheet) => monitors.push(sheet),
                Err(e) => {
                    log::warn!("monitor {} skipped: {}", path.display(), e);
                    warnings.push(Warning::MonitorFileSkipped {
                        source: file_label(path),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if reports.is_empty() {
            let reason = warnings
                .first()
                .map(|w| w.to_string())
                .unwrap_or_else(|| "no report file given".to_string());
            return Err(ConsolidationError::NoReportData(reason));
        }

        let mut outcome = self.consolidate(&reports, &monitors)?;
        warnings.append(&mut outcome.warnings);
        outcome.warnings = warnings;
        Ok(outcome)
    }

    /// Reconcile already-parsed Reports with uploaded Monitor sheets.
    ///
    /// Without uploads the stored history is used as is, read-only.
    pub fn consolidate(
        &self,
        reports: &[ParsedReport],
        monitors: &[RawSheet],
    ) -> Result<ConsolidationOutcome, ConsolidationError> {
        let mut warnings = Vec::new();

        let report = concat_reports(reports.iter().map(|r| &r.table));
        if report.is_empty() {
            return Err(Error::NoReportData.into());
        }

        let monitor = if monitors.is_empty() {
            self.stored_history(&mut warnings)
        } else {
            let accumulator = MonitorAccumulator::new(self.history, self.config.monitor_layout());
            let mut accumulation = accumulator.accumulate(monitors);
            warnings.append(&mut accumulation.warnings);
            accumulation.table
        };

        let report_only = monitor.is_none();
        if report_only {
            if !self.config.allow_report_only {
                return Err(ConsolidationError::NoMonitorData);
            }
            warnings.push(Warning::ReportOnly);
        }

        let options = self.config.reconcile_options();
        let reconciliation = reconcile(&report, monitor.as_ref(), &options);
        if reconciliation.table.is_empty() {
            return Err(Error::NoReportData.into());
        }

        let mut table = reconciliation.table;
        warnings.extend(apply_process_timers(&mut table, &self.config.processes, self.clock));

        let summary = summarize(
            &table,
            &self.config.processes,
            &options.sensor_columns,
            reconciliation.matched,
        );

        log::info!(
            "consolidated {} containers from {} report(s), {} CT",
            summary.total,
            reports.len(),
            summary.ct
        );

        Ok(ConsolidationOutcome {
            table,
            metadata: reports
                .first()
                .map(|r| r.metadata.clone())
                .unwrap_or_default(),
            reports: reports.iter().map(|r| r.metadata.clone()).collect(),
            summary,
            warnings,
            report_only,
        })
    }

    fn stored_history(&self, warnings: &mut Vec<Warning>) -> Option<Table> {
        match self.history.load() {
            Ok(table) if table.has_column(&self.config.unit_column()) && !table.is_empty() => {
                log::info!("using stored monitor history ({} units)", table.len());
                Some(table)
            }
            Ok(_) => None,
            Err(e) => {
                log::warn!("monitor history unreadable: {}", e);
                warnings.push(Warning::HistoryUnreadable {
                    reason: e.to_string(),
                });
                None
            }
        }
    }
}

fn parse_report_sheet(
    extractor: &MetadataExtractor,
    keyword: &str,
    sheet: &RawSheet,
) -> Result<ParsedReport, Error> {
    let metadata = extractor.extract(sheet);
    let mut table = parse_with_keyword(sheet, keyword)?;
    tag_rotation(&mut table, &metadata);
    Ok(ParsedReport {
        source: sheet.source.clone(),
        metadata,
        table,
    })
}

fn read_file(path: &Path) -> Result<Vec<u8>, Error> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.display().to_string()));
    }
    Ok(fs::read(path)?)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
        .unwrap_or_else(|| path.display().to_string())
}
