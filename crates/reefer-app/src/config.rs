//! Configuration management for reefer-hub
//!
//! Config stored at: ~/.config/reefer-hub/config.json

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use reefer_domain::service::column_normalizer::normalize_name;
use reefer_domain::service::metadata_extractor::DEFAULT_SCAN_ROWS;
use reefer_domain::{
    MonitorLayout, ProcessDefinition, ReconcileOptions, ZonedClock, CONTAINER_COLUMN,
    DEFAULT_SENSOR_COLUMNS, UNIT_COLUMN,
};
use reefer_types::{ConfigError, OutputFormat, Result};

const APP_DIR: &str = "reefer-hub";
const HISTORY_FILE: &str = "historial_monitor.xlsx";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Folder of Report exports used by `scan`
    #[serde(default)]
    pub report_dir: Option<PathBuf>,

    /// Folder of Monitor exports used by `scan`
    #[serde(default)]
    pub monitor_dir: Option<PathBuf>,

    /// Accumulated monitor history override
    #[serde(default)]
    pub history_path: Option<PathBuf>,

    /// Where consolidated workbooks are written
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// IANA timezone of the terminal
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Header keyword of the Report export
    #[serde(default = "default_report_keyword")]
    pub report_keyword: String,

    /// Header keyword (unit id column) of the Monitor export
    #[serde(default = "default_monitor_keyword")]
    pub monitor_keyword: String,

    /// Conventional Monitor header row, 0-based
    #[serde(default)]
    pub monitor_header_row: usize,

    /// Banner rows searched for vessel / rotation / date
    #[serde(default = "default_metadata_scan_rows")]
    pub metadata_scan_rows: usize,

    #[serde(default = "default_sensor_columns")]
    pub sensor_columns: Vec<String>,

    #[serde(default = "ProcessDefinition::standard")]
    pub processes: Vec<ProcessDefinition>,

    /// Sort and forward-fill sensor columns per container (old single-file mode)
    #[serde(default)]
    pub legacy_forward_fill: bool,

    /// Produce a report-only result when no monitor data is available
    #[serde(default = "default_true")]
    pub allow_report_only: bool,

    /// Default output format (json, table)
    #[serde(default = "default_output_format")]
    pub output_format: OutputFormat,
}

fn default_timezone() -> String {
    "America/Santiago".to_string()
}

fn default_report_keyword() -> String {
    CONTAINER_COLUMN.to_string()
}

fn default_monitor_keyword() -> String {
    UNIT_COLUMN.to_string()
}

fn default_metadata_scan_rows() -> usize {
    DEFAULT_SCAN_ROWS
}

fn default_sensor_columns() -> Vec<String> {
    DEFAULT_SENSOR_COLUMNS.iter().map(|s| s.to_string()).collect()
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report_dir: None,
            monitor_dir: None,
            history_path: None,
            output_dir: None,
            timezone: default_timezone(),
            report_keyword: default_report_keyword(),
            monitor_keyword: default_monitor_keyword(),
            monitor_header_row: 0,
            metadata_scan_rows: default_metadata_scan_rows(),
            sensor_columns: default_sensor_columns(),
            processes: ProcessDefinition::standard(),
            legacy_forward_fill: false,
            allow_report_only: true,
            output_format: default_output_format(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join(APP_DIR);
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Get the monitor history file path
    pub fn history_path(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.history_path {
            return Ok(path.clone());
        }

        let data_dir = dirs::data_dir()
            .ok_or(ConfigError::NotFound)?
            .join(APP_DIR);
        Ok(data_dir.join(HISTORY_FILE))
    }

    /// Output directory, the working directory when unset
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn clock(&self) -> Result<ZonedClock> {
        ZonedClock::from_name(&self.timezone)
    }

    /// Report container column as it appears after header normalization
    pub fn container_column(&self) -> String {
        normalize_name(&self.report_keyword)
    }

    /// Monitor unit column as it appears after header normalization
    pub fn unit_column(&self) -> String {
        normalize_name(&self.monitor_keyword)
    }

    pub fn normalized_sensor_columns(&self) -> Vec<String> {
        self.sensor_columns.iter().map(|s| normalize_name(s)).collect()
    }

    pub fn monitor_layout(&self) -> MonitorLayout {
        MonitorLayout {
            unit_column: self.unit_column(),
            header_row: self.monitor_header_row,
            sensor_columns: self.normalized_sensor_columns(),
        }
    }

    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            container_column: self.container_column(),
            unit_column: self.unit_column(),
            sensor_columns: self.normalized_sensor_columns(),
            legacy_forward_fill: self.legacy_forward_fill,
        }
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        // Ensure directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }
}

fn display_dir(dir: &Option<PathBuf>) -> String {
    dir.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(not set)".to_string())
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Reefer Hub Configuration")?;
        writeln!(f, "========================")?;
        writeln!(f)?;
        writeln!(f, "Report dir:       {}", display_dir(&self.report_dir))?;
        writeln!(f, "Monitor dir:      {}", display_dir(&self.monitor_dir))?;
        writeln!(f, "Output dir:       {}", self.output_dir().display())?;
        writeln!(
            f,
            "History file:     {}",
            self.history_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "(error)".to_string())
        )?;
        writeln!(f, "Timezone:         {}", self.timezone)?;
        writeln!(f, "Report keyword:   {}", self.report_keyword)?;
        writeln!(f, "Monitor keyword:  {}", self.monitor_keyword)?;
        writeln!(f, "Monitor header:   row {}", self.monitor_header_row)?;
        writeln!(f, "Sensor columns:   {}", self.sensor_columns.join(", "))?;
        for process in &self.processes {
            writeln!(
                f,
                "Process:          {} ({} -> {}, green <= {}, yellow <= {})",
                process.kind.label(),
                process.start_column,
                process.end_column,
                process.green_max,
                process.yellow_max
            )?;
        }
        writeln!(f, "Legacy ffill:     {}", self.legacy_forward_fill)?;
        writeln!(f, "Report only:      {}", self.allow_report_only)?;
        writeln!(f, "Output format:    {}", self.output_format)?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:      {}", path.display())?;
        }

        Ok(())
    }
}
