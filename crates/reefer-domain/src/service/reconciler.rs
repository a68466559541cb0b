//! Report / Monitor reconciliation
//!
//! Left join of the Report rows (container id) against the accumulated
//! Monitor units (unit id). Every Report row survives; unmatched rows carry
//! empty Monitor columns.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use reefer_types::{CellValue, Table};

use crate::model::{normalize_container_id, ContainerType, TYPE_COLUMN};

use super::monitor_accumulator::has_sensor_reading;

/// Suffix for Monitor columns whose name is already used by the Report
pub const MONITOR_SUFFIX: &str = "_MON";

static BLANK_COLUMN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(UNNAMED|\s*$)").expect("valid blank column pattern"));

/// Name fragments of sensor-like columns for the legacy forward fill
const LEGACY_SENSOR_TOKENS: [&str; 4] = ["SENSOR", "OUT", "IN", "TEMP"];

/// Join settings
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOptions {
    pub container_column: String,
    pub unit_column: String,
    pub sensor_columns: Vec<String>,
    /// Forward-fill sensor columns within each container (single-file mode)
    pub legacy_forward_fill: bool,
}

/// Joined table and match count
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    pub table: Table,
    pub matched: usize,
}

/// Whether a normalized column name is an export artefact with no header
pub fn is_blank_column(name: &str) -> bool {
    BLANK_COLUMN.is_match(name)
}

/// Remove rows whose container id is blank or a "Total" line.
///
/// Returns the number of rows removed.
pub fn filter_report_rows(table: &mut Table, container_column: &str) -> usize {
    let Some(col) = table.column_index(container_column) else {
        return 0;
    };
    let before = table.len();
    table.retain_rows(|row| {
        let cell = &row[col];
        !cell.is_blank() && !cell.normalized_text().contains("TOTAL")
    });
    before - table.len()
}

/// Stack several Report tables, aligning columns by name
pub fn concat_reports<'a, I>(tables: I) -> Table
where
    I: IntoIterator<Item = &'a Table>,
{
    let mut combined = Table::default();
    for table in tables {
        combined.append(table);
    }
    combined
}

/// Left-join the Report against Monitor units and classify every row.
///
/// `TIPO` comes from the Monitor table's own classification when present,
/// otherwise from the sensor columns found in the joined row.
pub fn reconcile(report: &Table, monitor: Option<&Table>, options: &ReconcileOptions) -> Reconciliation {
    let mut report = report.clone();
    let removed = filter_report_rows(&mut report, &options.container_column);
    if removed > 0 {
        log::debug!("{} blank or total rows removed from report", removed);
    }

    let (mut table, matched, monitor_types) = match monitor {
        Some(monitor) if monitor.has_column(&options.unit_column) => {
            join(&report, monitor, options)
        }
        _ => (report, 0, None),
    };

    // Precomputed types must be attached before the legacy sort reorders rows
    let precomputed = monitor_types.is_some();
    if let Some(types) = monitor_types {
        let labels = types
            .into_iter()
            .map(|ty| CellValue::text(ty.label()))
            .collect();
        table.set_column(TYPE_COLUMN, labels);
    }

    if options.legacy_forward_fill {
        forward_fill_sensors(&mut table, &options.container_column);
    }

    table.retain_columns(|name| !is_blank_column(name));

    if !precomputed {
        let sensors = joined_sensor_columns(&table, &options.sensor_columns);
        let types = (0..table.len())
            .map(|row| {
                let ty = ContainerType::from_has_sensor(has_sensor_reading(&table, row, &sensors));
                CellValue::text(ty.label())
            })
            .collect();
        table.set_column(TYPE_COLUMN, types);
    }

    log::info!(
        "reconciled {} containers, {} matched monitor units",
        table.len(),
        matched
    );
    Reconciliation { table, matched }
}

type JoinResult = (Table, usize, Option<Vec<ContainerType>>);

fn join(report: &Table, monitor: &Table, options: &ReconcileOptions) -> JoinResult {
    let unit_col = monitor.column_index(&options.unit_column);
    let type_col = monitor.column_index(TYPE_COLUMN);

    let mut index: HashMap<String, usize> = HashMap::new();
    if let Some(unit_col) = unit_col {
        for row in 0..monitor.len() {
            let cell = monitor.cell(row, unit_col);
            if !cell.is_blank() {
                index
                    .entry(normalize_container_id(&cell.to_string()))
                    .or_insert(row);
            }
        }
    }

    let monitor_columns: Vec<(usize, String)> = monitor
        .columns()
        .iter()
        .enumerate()
        .filter(|(col, _)| Some(*col) != type_col)
        .map(|(col, name)| {
            let output = if report.has_column(name) {
                format!("{}{}", name, MONITOR_SUFFIX)
            } else {
                name.clone()
            };
            (col, output)
        })
        .collect();

    let mut columns = report.columns().to_vec();
    columns.extend(monitor_columns.iter().map(|(_, name)| name.clone()));
    let mut table = Table::new(columns);

    let container_col = report.column_index(&options.container_column);
    let mut matched = 0;
    let mut types = Vec::with_capacity(report.len());

    for (row_idx, row) in report.rows().iter().enumerate() {
        let hit = container_col
            .map(|col| normalize_container_id(&report.cell(row_idx, col).to_string()))
            .and_then(|key| index.get(&key).copied());

        let mut out = row.clone();
        match hit {
            Some(m) => {
                matched += 1;
                out.extend(monitor_columns.iter().map(|(col, _)| monitor.cell(m, *col).clone()));
                if let Some(tc) = type_col {
                    types.push(ContainerType::from_label(&monitor.cell(m, tc).to_string()));
                }
            }
            None => {
                out.extend(monitor_columns.iter().map(|_| CellValue::Empty));
                types.push(ContainerType::General);
            }
        }
        table.push_row(out);
    }

    // Without a precomputed classification the joined sensor columns decide
    let types = type_col.map(|_| types);
    (table, matched, types)
}

/// Sensor columns as named in the joined table, including suffixed Monitor copies
pub fn joined_sensor_columns<S: AsRef<str>>(table: &Table, sensors: &[S]) -> Vec<String> {
    sensors
        .iter()
        .map(AsRef::as_ref)
        .flat_map(|s| [s.to_string(), format!("{}{}", s, MONITOR_SUFFIX)])
        .filter(|name| table.has_column(name))
        .collect()
}

/// Legacy single-file strategy: sort by container and carry sensor readings
/// forward within each container's rows.
pub fn forward_fill_sensors(table: &mut Table, container_column: &str) {
    let sensor_cols: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, name)| {
            name.as_str() != container_column
                && LEGACY_SENSOR_TOKENS.iter().any(|t| name.contains(t))
        })
        .map(|(col, _)| col)
        .collect();
    let Some(container_col) = table.column_index(container_column) else {
        return;
    };
    if sensor_cols.is_empty() {
        return;
    }

    table.sort_rows_by_key(container_column, |cell| normalize_container_id(&cell.to_string()));

    let mut previous_key: Option<String> = None;
    let mut carried: Vec<CellValue> = vec![CellValue::Empty; sensor_cols.len()];
    for row in 0..table.len() {
        let key = normalize_container_id(&table.cell(row, container_col).to_string());
        if previous_key.as_deref() != Some(key.as_str()) {
            carried.iter_mut().for_each(|c| *c = CellValue::Empty);
            previous_key = Some(key);
        }
        for (slot, &col) in carried.iter_mut().zip(&sensor_cols) {
            let cell = table.cell(row, col);
            if cell.is_blank() {
                if !slot.is_blank() {
                    table.set_cell(row, col, slot.clone());
                }
            } else {
                *slot = cell.clone();
            }
        }
    }
}
