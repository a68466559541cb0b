//! Process timing: status, minutes, semáforo and compliance
//!
//! Status is recomputed from the timestamps on every run; nothing about a
//! process is stored between runs.
//!
//! | start | end   | status       | minutes             |
//! |-------|-------|--------------|---------------------|
//! | none  | any   | NotRequested | 0                   |
//! | set   | none  | Pending      | max(0, now - start) |
//! | set   | set   | Completed    | max(0, end - start) |

use chrono::NaiveDateTime;

use reefer_types::{CellValue, Table, Warning};

use crate::clock::Clock;
use crate::model::{
    ContainerType, ProcessDefinition, ProcessStatus, ProcessTiming, Semaforo, TYPE_COLUMN,
};

/// Status and non-negative minutes for a start/end pair
pub fn evaluate(
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> (ProcessStatus, f64) {
    match (start, end) {
        (None, _) => (ProcessStatus::NotRequested, 0.0),
        (Some(start), None) => (ProcessStatus::Pending, minutes_between(start, now)),
        (Some(start), Some(end)) => (ProcessStatus::Completed, minutes_between(start, end)),
    }
}

/// Reversed timestamps come from data entry errors and count as zero
fn minutes_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    let seconds = (to - from).num_seconds();
    (seconds as f64 / 60.0).max(0.0)
}

/// Full timing of one process for one container
pub fn time_process(
    definition: &ProcessDefinition,
    container_type: ContainerType,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> ProcessTiming {
    let (status, minutes) = evaluate(start, end, now);
    if status == ProcessStatus::NotRequested {
        return ProcessTiming::not_requested();
    }

    ProcessTiming {
        status,
        minutes,
        semaforo: Some(Semaforo::classify(
            minutes,
            definition.green_max,
            definition.yellow_max,
        )),
        compliant: Some(minutes <= definition.kind.compliance_limit(container_type)),
    }
}

/// Display form of a duration, e.g. `1h 05m`
pub fn format_minutes(minutes: f64) -> String {
    let total = minutes.max(0.0).round() as i64;
    format!("{}h {:02}m", total / 60, total % 60)
}

/// Add the derived columns of every process to the reconciled table.
///
/// A process whose start or end column is missing from the table is marked
/// NotRequested for every row and reported as a warning; no row is dropped.
pub fn apply_process_timers(
    table: &mut Table,
    definitions: &[ProcessDefinition],
    clock: &dyn Clock,
) -> Vec<Warning> {
    let now = clock.now();
    let mut warnings = Vec::new();

    let types: Vec<ContainerType> = (0..table.len())
        .map(|row| {
            table
                .value(row, TYPE_COLUMN)
                .map(|cell| ContainerType::from_label(&cell.to_string()))
                .unwrap_or_default()
        })
        .collect();

    for definition in definitions {
        let missing: Vec<&String> = [&definition.start_column, &definition.end_column]
            .into_iter()
            .filter(|column| !table.has_column(column))
            .collect();

        for column in &missing {
            log::warn!(
                "column {} missing, {} marked as not requested",
                column,
                definition.kind.label()
            );
            warnings.push(Warning::MissingProcessColumn {
                process: definition.kind.label().to_string(),
                column: (*column).clone(),
            });
        }

        let timings: Vec<ProcessTiming> = if missing.is_empty() {
            (0..table.len())
                .map(|row| {
                    let start = timestamp(table, row, &definition.start_column);
                    let end = timestamp(table, row, &definition.end_column);
                    time_process(definition, types[row], start, end, now)
                })
                .collect()
        } else {
            vec![ProcessTiming::not_requested(); table.len()]
        };

        write_timings(table, definition, &timings);
    }

    warnings
}

fn timestamp(table: &Table, row: usize, column: &str) -> Option<NaiveDateTime> {
    table.value(row, column).and_then(CellValue::as_datetime)
}

fn write_timings(table: &mut Table, definition: &ProcessDefinition, timings: &[ProcessTiming]) {
    let status: Vec<CellValue> = timings
        .iter()
        .map(|t| CellValue::text(t.status.label(&definition.completed_label)))
        .collect();
    let minutes: Vec<CellValue> = timings
        .iter()
        .map(|t| CellValue::Number((t.minutes * 100.0).round() / 100.0))
        .collect();
    let durations: Vec<CellValue> = timings
        .iter()
        .map(|t| match t.status {
            ProcessStatus::NotRequested => CellValue::Empty,
            _ => CellValue::text(format_minutes(t.minutes)),
        })
        .collect();
    let semaforo: Vec<CellValue> = timings
        .iter()
        .map(|t| t.semaforo.map(|s| CellValue::text(s.label())).into())
        .collect();
    let compliance: Vec<CellValue> = timings
        .iter()
        .map(|t| {
            t.compliant
                .map(|ok| CellValue::text(if ok { "SI" } else { "NO" }))
                .into()
        })
        .collect();

    table.set_column(&definition.status_column(), status);
    table.set_column(&definition.minutes_column(), minutes);
    table.set_column(&definition.duration_column(), durations);
    table.set_column(&definition.semaforo_column(), semaforo);
    table.set_column(&definition.compliance_column(), compliance);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::model::ProcessKind;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn onboard() -> ProcessDefinition {
        ProcessDefinition::new(
            ProcessKind::ConnectionOnBoard,
            "FECHA EMBARQUE",
            "CONEXION A BORDO",
            "Conectado a Bordo",
        )
    }

    #[test]
    fn test_no_start_is_not_requested() {
        let now = ts("2024-01-10 12:00");
        for end in [None, Some(ts("2024-01-10 09:00"))] {
            let (status, minutes) = evaluate(None, end, now);
            assert_eq!(status, ProcessStatus::NotRequested);
            assert_eq!(minutes, 0.0);
        }
    }

    #[test]
    fn test_pending_counts_until_now() {
        let timing = time_process(
            &onboard(),
            ContainerType::Ct,
            Some(ts("2024-01-10 08:00")),
            None,
            ts("2024-01-10 08:20"),
        );
        assert_eq!(timing.status, ProcessStatus::Pending);
        assert_eq!(timing.minutes, 20.0);
        assert_eq!(timing.semaforo, Some(Semaforo::Yellow));
        assert_eq!(timing.compliant, Some(true));
    }

    #[test]
    fn test_completed_duration() {
        let (status, minutes) = evaluate(
            Some(ts("2024-01-10 08:00")),
            Some(ts("2024-01-10 09:15")),
            ts("2024-01-11 00:00"),
        );
        assert_eq!(status, ProcessStatus::Completed);
        assert_eq!(minutes, 75.0);
    }

    #[test]
    fn test_reversed_timestamps_clamp_to_zero() {
        let (status, minutes) = evaluate(
            Some(ts("2024-01-10 09:00")),
            Some(ts("2024-01-10 08:00")),
            ts("2024-01-10 10:00"),
        );
        assert_eq!(status, ProcessStatus::Completed);
        assert_eq!(minutes, 0.0);
    }

    #[test]
    fn test_pending_in_future_clamps_to_zero() {
        let (status, minutes) = evaluate(Some(ts("2024-01-10 09:00")), None, ts("2024-01-10 08:00"));
        assert_eq!(status, ProcessStatus::Pending);
        assert_eq!(minutes, 0.0);
    }

    #[test]
    fn test_compliance_depends_on_type_except_onboard() {
        let stacking = ProcessDefinition::new(ProcessKind::ConnectionToStacking, "A", "B", "Conectado");
        let start = Some(ts("2024-01-10 08:00"));
        let end = Some(ts("2024-01-10 08:45"));
        let now = ts("2024-01-10 10:00");

        assert_eq!(time_process(&stacking, ContainerType::Ct, start, end, now).compliant, Some(false));
        assert_eq!(time_process(&stacking, ContainerType::General, start, end, now).compliant, Some(true));
        assert_eq!(time_process(&onboard(), ContainerType::General, start, end, now).compliant, Some(false));
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(0.0), "0h 00m");
        assert_eq!(format_minutes(65.4), "1h 05m");
        assert_eq!(format_minutes(20.0), "0h 20m");
    }

    #[test]
    fn test_apply_adds_columns() {
        let mut table = Table::from_rows(
            vec![
                "CONTENEDOR".into(),
                TYPE_COLUMN.into(),
                "FECHA EMBARQUE".into(),
                "CONEXION A BORDO".into(),
            ],
            vec![
                vec!["A1".into(), "CT".into(), "10/01/2024 08:00".into(), CellValue::Empty],
                vec!["B2".into(), "General".into(), CellValue::Empty, CellValue::Empty],
                vec![
                    "C3".into(),
                    "General".into(),
                    ts("2024-01-10 07:00").into(),
                    ts("2024-01-10 07:50").into(),
                ],
            ],
        );
        let clock = FixedClock(ts("2024-01-10 08:20"));
        let warnings = apply_process_timers(&mut table, &[onboard()], &clock);

        assert!(warnings.is_empty());
        assert_eq!(table.value(0, "Estado_OnBoard"), Some(&CellValue::text("Pendiente")));
        assert_eq!(table.value(0, "Min_OnBoard"), Some(&CellValue::Number(20.0)));
        assert_eq!(table.value(0, "Semaforo_OnBoard"), Some(&CellValue::text("Amarillo")));
        assert_eq!(table.value(1, "Estado_OnBoard"), Some(&CellValue::text("No Solicitado")));
        assert_eq!(table.value(1, "Semaforo_OnBoard"), Some(&CellValue::Empty));
        assert_eq!(table.value(2, "Estado_OnBoard"), Some(&CellValue::text("Conectado a Bordo")));
        assert_eq!(table.value(2, "Cumple_OnBoard"), Some(&CellValue::text("NO")));
        assert_eq!(table.value(2, "Tiempo_OnBoard"), Some(&CellValue::text("0h 50m")));
    }

    #[test]
    fn test_missing_column_marks_all_not_requested() {
        let mut table = Table::from_rows(
            vec!["CONTENEDOR".into(), "FECHA EMBARQUE".into()],
            vec![vec!["A1".into(), "10/01/2024 08:00".into()]],
        );
        let warnings = apply_process_timers(&mut table, &[onboard()], &FixedClock(ts("2024-01-10 09:00")));

        assert_eq!(
            warnings,
            vec![Warning::MissingProcessColumn {
                process: "Conexión OnBoard".into(),
                column: "CONEXION A BORDO".into(),
            }]
        );
        assert_eq!(table.len(), 1);
        assert_eq!(table.value(0, "Estado_OnBoard"), Some(&CellValue::text("No Solicitado")));
        assert_eq!(table.value(0, "Min_OnBoard"), Some(&CellValue::Number(0.0)));
    }
}
