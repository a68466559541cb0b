//! Monitor history accumulation
//!
//! Each Monitor upload is a snapshot of the reefer sensor log. Snapshots are
//! folded into a per-unit history with fill-missing-only semantics: a value
//! recorded for a unit is never replaced, and never erased by a later blank.

use std::collections::HashMap;

use reefer_types::{CellValue, RawSheet, Table, Warning};

use crate::model::{normalize_container_id, ContainerType, TYPE_COLUMN};
use crate::repository::MonitorHistoryRepository;

use super::column_normalizer::split_suffix;
use super::header_locator::parse_at_offset;

/// How Monitor sheets are laid out
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorLayout {
    pub unit_column: String,
    /// Conventional header row; a keyword scan is used when it does not match
    pub header_row: usize,
    pub sensor_columns: Vec<String>,
}

/// Result of one accumulation run
#[derive(Debug, Clone, Default)]
pub struct Accumulation {
    /// Merged history with `TIPO`; `None` when no sheet had the unit column
    pub table: Option<Table>,
    pub warnings: Vec<Warning>,
}

/// True when any sensor column of the row holds a value
pub fn has_sensor_reading<S: AsRef<str>>(table: &Table, row: usize, sensor_columns: &[S]) -> bool {
    sensor_columns.iter().any(|name| {
        table
            .value(row, name.as_ref())
            .map(|cell| !cell.is_blank())
            .unwrap_or(false)
    })
}

/// Tidy one parsed Monitor snapshot.
///
/// Suffixed columns that repeat their base column exactly are dropped;
/// repeated sensor columns are folded into the first one, filling its blanks;
/// rows without a unit id go away and only the first row per unit is kept.
pub fn clean_batch(mut table: Table, layout: &MonitorLayout) -> Table {
    drop_duplicate_columns(&mut table);
    for sensor in &layout.sensor_columns {
        fold_sensor_duplicates(&mut table, sensor);
    }
    dedupe_units(&mut table, &layout.unit_column);
    table
}

fn drop_duplicate_columns(table: &mut Table) {
    let duplicates: Vec<String> = table
        .columns()
        .iter()
        .filter(|name| {
            let (base, suffix) = split_suffix(name);
            suffix.is_some()
                && table.column_index(base).is_some_and(|base_col| {
                    let col = table.column_index(name).unwrap_or(base_col);
                    (0..table.len()).all(|row| table.cell(row, base_col) == table.cell(row, col))
                })
        })
        .cloned()
        .collect();

    for name in duplicates {
        log::debug!("dropping duplicate column {}", name);
        table.remove_column(&name);
    }
}

fn fold_sensor_duplicates(table: &mut Table, sensor: &str) {
    let repeats: Vec<String> = table
        .columns()
        .iter()
        .filter(|name| {
            let (base, suffix) = split_suffix(name);
            base == sensor && suffix.is_some()
        })
        .cloned()
        .collect();

    for repeat in repeats {
        let Some(values) = table.remove_column(&repeat) else {
            continue;
        };
        match table.column_index(sensor) {
            Some(col) => {
                for (row, value) in values.into_iter().enumerate() {
                    if table.cell(row, col).is_blank() && !value.is_blank() {
                        table.set_cell(row, col, value);
                    }
                }
            }
            None => table.set_column(sensor, values),
        }
    }
}

fn dedupe_units(table: &mut Table, unit_column: &str) {
    let Some(col) = table.column_index(unit_column) else {
        return;
    };
    let mut seen = std::collections::HashSet::new();
    table.retain_rows(|row| {
        let cell = &row[col];
        !cell.is_blank() && seen.insert(normalize_container_id(&cell.to_string()))
    });
}

/// Fold `batch` into `history`, keyed by unit id.
///
/// Existing history rows keep their position and every populated cell; a
/// blank history cell takes the batch value. Units first seen in `batch` are
/// appended in batch order. Merging the same batch twice changes nothing.
pub fn merge_history(history: &Table, batch: &Table, unit_column: &str) -> Table {
    let mut merged = history.clone();
    for name in batch.columns() {
        if !merged.has_column(name) {
            merged.set_column(name, Vec::new());
        }
    }

    let Some(unit_col) = merged.column_index(unit_column) else {
        return merged;
    };
    let Some(batch_unit_col) = batch.column_index(unit_column) else {
        return merged;
    };

    let mut index: HashMap<String, usize> = HashMap::new();
    for row in 0..merged.len() {
        let cell = merged.cell(row, unit_col);
        if !cell.is_blank() {
            index
                .entry(normalize_container_id(&cell.to_string()))
                .or_insert(row);
        }
    }

    let positions: Vec<usize> = batch
        .columns()
        .iter()
        .filter_map(|name| merged.column_index(name))
        .collect();

    for row in batch.rows() {
        let unit = &row[batch_unit_col];
        if unit.is_blank() {
            continue;
        }
        let key = normalize_container_id(&unit.to_string());

        match index.get(&key) {
            Some(&target) => {
                for (value, &col) in row.iter().zip(&positions) {
                    if merged.cell(target, col).is_blank() && !value.is_blank() {
                        merged.set_cell(target, col, value.clone());
                    }
                }
            }
            None => {
                let mut new_row = vec![CellValue::Empty; merged.width()];
                for (value, &col) in row.iter().zip(&positions) {
                    new_row[col] = value.clone();
                }
                merged.push_row(new_row);
                index.insert(key, merged.len() - 1);
            }
        }
    }

    merged
}

/// Set `TIPO` for every unit from its sensor columns
pub fn classify_units<S: AsRef<str>>(table: &mut Table, sensor_columns: &[S]) {
    let types: Vec<CellValue> = (0..table.len())
        .map(|row| {
            let ty = ContainerType::from_has_sensor(has_sensor_reading(table, row, sensor_columns));
            CellValue::text(ty.label())
        })
        .collect();
    table.set_column(TYPE_COLUMN, types);
}

/// Merges Monitor snapshots into the persisted history
pub struct MonitorAccumulator<'a, R: MonitorHistoryRepository + ?Sized> {
    repository: &'a R,
    layout: MonitorLayout,
}

impl<'a, R: MonitorHistoryRepository + ?Sized> MonitorAccumulator<'a, R> {
    pub fn new(repository: &'a R, layout: MonitorLayout) -> Self {
        Self { repository, layout }
    }

    /// Parse every sheet, merge the usable ones into the history and persist.
    ///
    /// Sheets lacking the unit column are skipped with a warning. An
    /// unreadable history is treated as empty and a failed save keeps the
    /// in-memory result; both only produce warnings.
    pub fn accumulate(&self, sheets: &[RawSheet]) -> Accumulation {
        let mut warnings = Vec::new();

        let batches: Vec<Table> = sheets
            .iter()
            .filter_map(|sheet| {
                match parse_at_offset(sheet, self.layout.header_row, &self.layout.unit_column) {
                    Ok(table) => Some(clean_batch(table, &self.layout)),
                    Err(e) => {
                        log::warn!("{}", e);
                        warnings.push(Warning::MonitorSheetSkipped {
                            source: sheet.source.clone(),
                        });
                        None
                    }
                }
            })
            .collect();

        if batches.is_empty() {
            log::warn!("no monitor sheet contains column {}", self.layout.unit_column);
            return Accumulation {
                table: None,
                warnings,
            };
        }

        let mut history = match self.repository.load() {
            Ok(table) => table,
            Err(e) => {
                log::warn!("monitor history unreadable, starting empty: {}", e);
                warnings.push(Warning::HistoryUnreadable {
                    reason: e.to_string(),
                });
                Table::default()
            }
        };
        if !history.has_column(&self.layout.unit_column) {
            history = Table::default();
        }

        let before = history.len();
        for batch in &batches {
            history = merge_history(&history, batch, &self.layout.unit_column);
        }
        classify_units(&mut history, &self.layout.sensor_columns);
        log::info!(
            "monitor history: {} units ({} new) from {} sheet(s)",
            history.len(),
            history.len() - before,
            batches.len()
        );

        if let Err(e) = self.repository.save(&history) {
            log::warn!("monitor history not saved: {}", e);
            warnings.push(Warning::HistoryNotSaved {
                reason: e.to_string(),
            });
        }

        Accumulation {
            table: Some(history),
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reefer_types::Error;
    use std::cell::RefCell;

    #[derive(Default)]
    struct MemoryRepo {
        table: RefCell<Table>,
        fail_load: bool,
        fail_save: bool,
    }

    impl MonitorHistoryRepository for MemoryRepo {
        fn load(&self) -> Result<Table, Error> {
            if self.fail_load {
                return Err(Error::Persistence("corrupted".into()));
            }
            Ok(self.table.borrow().clone())
        }

        fn save(&self, table: &Table) -> Result<(), Error> {
            if self.fail_save {
                return Err(Error::Persistence("read-only".into()));
            }
            *self.table.borrow_mut() = table.clone();
            Ok(())
        }

        fn clear(&self) -> Result<(), Error> {
            *self.table.borrow_mut() = Table::default();
            Ok(())
        }
    }

    fn layout() -> MonitorLayout {
        MonitorLayout {
            unit_column: "UNIDAD".to_string(),
            header_row: 0,
            sensor_columns: vec!["SENSOR1_TMP".to_string(), "SENSOR2_TMP".to_string()],
        }
    }

    fn monitor_sheet(name: &str, rows: &[[&str; 3]]) -> RawSheet {
        let mut grid = vec![vec![
            CellValue::text("Unidad"),
            CellValue::text("SENSOR1_TMP"),
            CellValue::text("FECHA CONEXION"),
        ]];
        for r in rows {
            grid.push(r.iter().map(|c| CellValue::from(*c)).collect());
        }
        RawSheet::new(name, grid)
    }

    #[test]
    fn test_sensor_value_is_sticky_across_uploads() {
        let repo = MemoryRepo::default();
        let acc = MonitorAccumulator::new(&repo, layout());

        acc.accumulate(&[monitor_sheet("m1.xlsx", &[["XYZ111", "-20", ""]])]);
        let second = acc.accumulate(&[monitor_sheet(
            "m2.xlsx",
            &[["XYZ111", "", "10/01/2024 09:00"]],
        )]);

        let table = second.table.unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.value(0, "SENSOR1_TMP"), Some(&CellValue::text("-20")));
        assert_eq!(
            table.value(0, "FECHA CONEXION"),
            Some(&CellValue::text("10/01/2024 09:00"))
        );
        assert_eq!(table.value(0, TYPE_COLUMN), Some(&CellValue::text("CT")));
    }

    #[test]
    fn test_existing_value_not_overwritten() {
        let history = Table::from_rows(
            vec!["UNIDAD".into(), "SENSOR1_TMP".into()],
            vec![vec!["ABCU1".into(), "-18".into()]],
        );
        let batch = Table::from_rows(
            vec!["UNIDAD".into(), "SENSOR1_TMP".into()],
            vec![vec!["abcu1".into(), "-5".into()], vec!["NEW2".into(), "3".into()]],
        );
        let merged = merge_history(&history, &batch, "UNIDAD");
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.value(0, "SENSOR1_TMP"), Some(&CellValue::text("-18")));
        assert_eq!(merged.value(1, "UNIDAD"), Some(&CellValue::text("NEW2")));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let history = Table::from_rows(
            vec!["UNIDAD".into(), "SENSOR1_TMP".into()],
            vec![vec!["A1".into(), CellValue::Empty]],
        );
        let batch = Table::from_rows(
            vec!["UNIDAD".into(), "SENSOR1_TMP".into(), "FECHA CONEXION".into()],
            vec![
                vec!["A1".into(), "-1".into(), CellValue::Empty],
                vec!["B2".into(), CellValue::Empty, "10/01/2024 08:00".into()],
            ],
        );
        let once = merge_history(&history, &batch, "UNIDAD");
        let twice = merge_history(&once, &batch, "UNIDAD");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_clean_batch_folds_sensor_duplicates_and_dedupes() {
        let table = Table::from_rows(
            vec![
                "UNIDAD".into(),
                "SENSOR1_TMP".into(),
                "SENSOR1_TMP.1".into(),
                "NOTA".into(),
                "NOTA.1".into(),
            ],
            vec![
                vec!["U1".into(), CellValue::Empty, "-3".into(), "x".into(), "x".into()],
                vec!["U2".into(), "-4".into(), "-9".into(), "y".into(), "y".into()],
                vec!["U1".into(), "7".into(), CellValue::Empty, "z".into(), "z".into()],
                vec![CellValue::Empty, "1".into(), CellValue::Empty, "w".into(), "w".into()],
            ],
        );
        let cleaned = clean_batch(table, &layout());
        assert_eq!(cleaned.columns(), ["UNIDAD", "SENSOR1_TMP", "NOTA"]);
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned.value(0, "SENSOR1_TMP"), Some(&CellValue::text("-3")));
        assert_eq!(cleaned.value(1, "SENSOR1_TMP"), Some(&CellValue::text("-4")));
    }

    #[test]
    fn test_no_valid_sheet_returns_no_data() {
        let repo = MemoryRepo::default();
        let acc = MonitorAccumulator::new(&repo, layout());
        let sheet = RawSheet::new("otro.xlsx", vec![vec![CellValue::text("CONTENEDOR")]]);

        let result = acc.accumulate(&[sheet]);
        assert!(result.table.is_none());
        assert_eq!(
            result.warnings,
            vec![Warning::MonitorSheetSkipped {
                source: "otro.xlsx".into()
            }]
        );
    }

    #[test]
    fn test_persistence_failures_are_not_fatal() {
        let repo = MemoryRepo {
            fail_load: true,
            fail_save: true,
            ..Default::default()
        };
        let acc = MonitorAccumulator::new(&repo, layout());
        let result = acc.accumulate(&[monitor_sheet("m.xlsx", &[["U9", "", ""]])]);

        let table = result.table.unwrap();
        assert_eq!(table.value(0, TYPE_COLUMN), Some(&CellValue::text("General")));
        assert_eq!(result.warnings.len(), 2);
        assert!(matches!(result.warnings[0], Warning::HistoryUnreadable { .. }));
        assert!(matches!(result.warnings[1], Warning::HistoryNotSaved { .. }));
    }
}
