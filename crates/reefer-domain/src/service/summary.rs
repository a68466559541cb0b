//! Aggregate counts over a consolidated table

use serde::Serialize;

use reefer_types::Table;

use crate::model::process::{NOT_REQUESTED_LABEL, PENDING_LABEL};
use crate::model::{ContainerType, ProcessDefinition, ProcessKind, TYPE_COLUMN};

use super::monitor_accumulator::has_sensor_reading;
use super::reconciler::joined_sensor_columns;

/// Per-process counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessSummary {
    pub kind: Option<ProcessKind>,
    pub label: String,
    pub completed: usize,
    pub pending: usize,
    pub not_requested: usize,
    /// Mean minutes of completed processes, `None` when none completed
    pub average_completed_minutes: Option<f64>,
    pub green: usize,
    pub yellow: usize,
    pub red: usize,
    pub compliant: usize,
    /// Share of requested processes within the limit, `None` when none requested
    pub compliance_rate: Option<f64>,
}

impl ProcessSummary {
    pub fn requested(&self) -> usize {
        self.completed + self.pending
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConsolidationSummary {
    pub total: usize,
    pub ct: usize,
    pub general: usize,
    pub matched: usize,
    pub columns: usize,
    pub with_sensor_data: usize,
    pub processes: Vec<ProcessSummary>,
}

/// Count containers, types and process outcomes of a timed table
pub fn summarize<S: AsRef<str>>(
    table: &Table,
    definitions: &[ProcessDefinition],
    sensor_columns: &[S],
    matched: usize,
) -> ConsolidationSummary {
    let mut summary = ConsolidationSummary {
        total: table.len(),
        matched,
        columns: table.width(),
        ..Default::default()
    };
    let sensors = joined_sensor_columns(table, sensor_columns);

    for row in 0..table.len() {
        let ty = table
            .value(row, TYPE_COLUMN)
            .map(|cell| ContainerType::from_label(&cell.to_string()))
            .unwrap_or_default();
        match ty {
            ContainerType::Ct => summary.ct += 1,
            ContainerType::General => summary.general += 1,
        }
        if has_sensor_reading(table, row, &sensors) {
            summary.with_sensor_data += 1;
        }
    }

    summary.processes = definitions
        .iter()
        .map(|def| summarize_process(table, def))
        .collect();
    summary
}

fn summarize_process(table: &Table, definition: &ProcessDefinition) -> ProcessSummary {
    let mut summary = ProcessSummary {
        kind: Some(definition.kind),
        label: definition.kind.label().to_string(),
        ..Default::default()
    };

    let status_column = definition.status_column();
    let minutes_column = definition.minutes_column();
    let semaforo_column = definition.semaforo_column();
    let compliance_column = definition.compliance_column();
    let mut completed_minutes = 0.0;

    for row in 0..table.len() {
        let status = table
            .value(row, &status_column)
            .map(|c| c.to_string())
            .unwrap_or_default();
        if status.is_empty() || status == NOT_REQUESTED_LABEL {
            summary.not_requested += 1;
            continue;
        }
        if status == PENDING_LABEL {
            summary.pending += 1;
        } else {
            summary.completed += 1;
            completed_minutes += table
                .value(row, &minutes_column)
                .and_then(|c| c.as_f64())
                .unwrap_or(0.0);
        }

        match table.value(row, &semaforo_column).map(|c| c.to_string()).as_deref() {
            Some("Verde") => summary.green += 1,
            Some("Amarillo") => summary.yellow += 1,
            Some("Rojo") => summary.red += 1,
            _ => {}
        }
        if table
            .value(row, &compliance_column)
            .map(|c| c.to_string() == "SI")
            .unwrap_or(false)
        {
            summary.compliant += 1;
        }
    }

    if summary.completed > 0 {
        summary.average_completed_minutes = Some(completed_minutes / summary.completed as f64);
    }
    let requested = summary.requested();
    if requested > 0 {
        summary.compliance_rate = Some(summary.compliant as f64 / requested as f64);
    }
    summary
}
