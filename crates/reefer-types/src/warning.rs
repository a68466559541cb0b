//! Non-fatal conditions reported alongside a consolidation result

use serde::{Deserialize, Serialize};
use std::fmt;

/// Something went wrong but the pipeline carried on with a degraded result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A process start or end column is absent; the process is NotRequested for every row
    MissingProcessColumn { process: String, column: String },

    /// A monitor sheet without the unit column was ignored
    MonitorSheetSkipped { source: String },

    /// A monitor file could not be read at all
    MonitorFileSkipped { source: String, reason: String },

    /// A report file could not be used
    ReportSkipped { source: String, reason: String },

    /// The accumulated monitor history could not be read and was treated as empty
    HistoryUnreadable { reason: String },

    /// The accumulated monitor history could not be written; the in-memory result was used
    HistoryNotSaved { reason: String },

    /// No monitor data was available; only report columns are shown
    ReportOnly,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MissingProcessColumn { process, column } => write!(
                f,
                "Column '{}' not found; process '{}' marked as not requested",
                column, process
            ),
            Warning::MonitorSheetSkipped { source } => {
                write!(f, "Monitor file {} has no unit column and was skipped", source)
            }
            Warning::MonitorFileSkipped { source, reason } => {
                write!(f, "Monitor file {} skipped: {}", source, reason)
            }
            Warning::ReportSkipped { source, reason } => {
                write!(f, "Report file {} skipped: {}", source, reason)
            }
            Warning::HistoryUnreadable { reason } => {
                write!(f, "Monitor history unreadable, starting empty: {}", reason)
            }
            Warning::HistoryNotSaved { reason } => {
                write!(f, "Monitor history not saved: {}", reason)
            }
            Warning::ReportOnly => write!(f, "No monitor data available; showing report only"),
        }
    }
}
