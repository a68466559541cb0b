//! End-to-end runs over real xlsx files

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use rust_xlsxwriter::{Format, Workbook};
use tempfile::tempdir;

use reefer_app::app::{ConsolidationError, ConsolidationService};
use reefer_app::config::Config;
use reefer_app::export::export_to_excel;
use reefer_app::repository::open_history_repo;
use reefer_domain::{filter_rotation, group_by_rotation, FixedClock, MonitorHistoryRepository};
use reefer_infra::load_sheet;
use reefer_types::{CellValue, Warning};

fn now() -> FixedClock {
    FixedClock(NaiveDateTime::parse_from_str("2024-01-10 08:20", "%Y-%m-%d %H:%M").unwrap())
}

fn write_report(path: &Path, vessel: &str, rotation: &str, containers: &[(&str, Option<f64>)]) {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("dd/mm/yyyy hh:mm");
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Reporte de contenedores reefer").unwrap();
    sheet.write_string(1, 0, format!("Nave: {}", vessel)).unwrap();
    sheet.write_string(2, 0, "Rotación").unwrap();
    sheet.write_string(2, 1, rotation).unwrap();
    sheet.write_string(3, 0, "Fecha consulta 10/01/2024 08:15").unwrap();

    let header = ["Contenedor", "Peso", "Fecha Embarque", "Conexion a Bordo"];
    for (col, name) in header.iter().enumerate() {
        sheet.write_string(5, col as u16, *name).unwrap();
    }
    for (i, (id, embarque)) in containers.iter().enumerate() {
        let row = 6 + i as u32;
        sheet.write_string(row, 0, *id).unwrap();
        sheet.write_number(row, 1, 20000.0).unwrap();
        if let Some(serial) = embarque {
            sheet.write_number_with_format(row, 2, *serial, &date_format).unwrap();
        }
    }
    let total_row = 6 + containers.len() as u32;
    sheet.write_string(total_row, 0, "Total").unwrap();
    workbook.save(path).unwrap();
}

fn write_monitor(path: &Path, units: &[(&str, Option<f64>)]) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in ["Unidad", "Sensor1_Tmp", "Sensor2_Tmp"].iter().enumerate() {
        sheet.write_string(0, col as u16, *name).unwrap();
    }
    for (i, (unit, temp)) in units.iter().enumerate() {
        let row = 1 + i as u32;
        sheet.write_string(row, 0, *unit).unwrap();
        if let Some(t) = temp {
            sheet.write_number(row, 1, *t).unwrap();
        }
    }
    workbook.save(path).unwrap();
}

/// 10/01/2024 08:00 as an Excel serial
const EMBARQUE_0800: f64 = 45301.0 + 8.0 / 24.0;

fn config_for(dir: &Path) -> Config {
    Config {
        history_path: Some(dir.join("historial_monitor.xlsx")),
        output_dir: Some(dir.join("salida")),
        ..Default::default()
    }
}

#[test]
fn test_full_run_and_export() {
    let dir = tempdir().unwrap();
    let report = dir.path().join("reporte.xlsx");
    let monitor = dir.path().join("monitor.xlsx");
    write_report(
        &report,
        "MSC ANNA",
        "2401-E",
        &[("ABCD123456", Some(EMBARQUE_0800)), ("EFGH 765432", None)],
    );
    write_monitor(&monitor, &[("ABCD123456", Some(-18.0)), ("EFGH765432", None)]);

    let config = config_for(dir.path());
    let repo = open_history_repo(&config).unwrap();
    let clock = now();
    let mut service = ConsolidationService::new(&config, &repo, &clock);

    let mut seen: Vec<PathBuf> = Vec::new();
    let outcome = service
        .run(&[&report], &[&monitor], |p| seen.push(p.to_path_buf()))
        .unwrap();
    assert_eq!(seen.len(), 2);

    assert_eq!(outcome.metadata.vessel, "MSC ANNA");
    assert_eq!(outcome.metadata.rotation, "2401-E");
    assert_eq!(outcome.metadata.consulted_at, "10/01/2024 08:15");

    let t = &outcome.table;
    assert_eq!(t.len(), 2);
    assert_eq!(t.value(0, "TIPO"), Some(&CellValue::text("CT")));
    assert_eq!(t.value(1, "TIPO"), Some(&CellValue::text("General")));
    assert_eq!(t.value(0, "Min_OnBoard"), Some(&CellValue::Number(20.0)));
    assert_eq!(t.value(0, "Semaforo_OnBoard"), Some(&CellValue::text("Amarillo")));
    assert_eq!(t.value(0, "Cumple_OnBoard"), Some(&CellValue::text("SI")));
    assert_eq!(
        t.value(1, "ROTACION_REPORTE"),
        Some(&CellValue::text("MSC ANNA / 2401-E"))
    );
    assert!(!outcome.report_only);

    assert!(config.history_path().unwrap().exists());

    let out = export_to_excel(t, &outcome.metadata.rotation, &config.output_dir()).unwrap();
    let written = load_sheet(&out).unwrap();
    assert_eq!(written.rows.len(), 3);
    assert_eq!(written.rows[0][0], CellValue::text("CONTENEDOR"));
}

#[test]
fn test_history_is_sticky_across_runs() {
    let dir = tempdir().unwrap();
    let report = dir.path().join("reporte.xlsx");
    let first = dir.path().join("monitor_1.xlsx");
    let second = dir.path().join("monitor_2.xlsx");
    write_report(&report, "MSC ANNA", "2401-E", &[("ABCD123456", None)]);
    write_monitor(&first, &[("ABCD123456", Some(-18.0))]);
    write_monitor(&second, &[("ABCD123456", None), ("ZZZZ000001", Some(2.0))]);

    let config = config_for(dir.path());
    let repo = open_history_repo(&config).unwrap();
    let clock = now();

    let mut service = ConsolidationService::new(&config, &repo, &clock);
    service.run(&[&report], &[&first], |_| {}).unwrap();

    let mut service = ConsolidationService::new(&config, &repo, &clock);
    let outcome = service.run(&[&report], &[&second], |_| {}).unwrap();

    // the later blank reading does not erase the recorded one
    assert_eq!(outcome.table.value(0, "TIPO"), Some(&CellValue::text("CT")));
    assert_eq!(
        outcome.table.value(0, "SENSOR1_TMP"),
        Some(&CellValue::Number(-18.0))
    );
    assert_eq!(repo.load().unwrap().len(), 2);
}

#[test]
fn test_two_reports_group_by_rotation() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.xlsx");
    let b = dir.path().join("b.xlsx");
    write_report(&a, "MSC ANNA", "2401-E", &[("ABCD123456", None), ("ABCD000002", None)]);
    write_report(&b, "MAERSK ONE", "88W", &[("WXYZ111111", None)]);

    let config = config_for(dir.path());
    let repo = open_history_repo(&config).unwrap();
    let clock = now();
    let mut service = ConsolidationService::new(&config, &repo, &clock);
    let outcome = service.run(&[&a, &b], &[] as &[&Path], |_| {}).unwrap();

    assert!(outcome.report_only);
    assert!(outcome.warnings.contains(&Warning::ReportOnly));
    assert_eq!(outcome.reports.len(), 2);

    let batches = group_by_rotation(&outcome.table);
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[1].label, "MAERSK ONE / 88W");
    assert_eq!(filter_rotation(&outcome.table, "88W").len(), 1);
}

#[test]
fn test_unreadable_files_are_skipped() {
    let dir = tempdir().unwrap();
    let report = dir.path().join("reporte.xlsx");
    let broken = dir.path().join("roto.xlsx");
    write_report(&report, "MSC ANNA", "2401-E", &[("ABCD123456", None)]);
    std::fs::write(&broken, b"not a workbook").unwrap();

    let config = config_for(dir.path());
    let repo = open_history_repo(&config).unwrap();
    let clock = now();
    let mut service = ConsolidationService::new(&config, &repo, &clock);

    let outcome = service.run(&[&report, &broken], &[&broken], |_| {}).unwrap();
    assert_eq!(outcome.table.len(), 1);
    assert!(outcome
        .warnings
        .iter()
        .any(|w| matches!(w, Warning::ReportSkipped { source, .. } if source == "roto.xlsx")));
    assert!(outcome
        .warnings
        .iter()
        .any(|w| matches!(w, Warning::MonitorFileSkipped { .. })));

    let err = service.run(&[&broken], &[&broken], |_| {}).unwrap_err();
    assert!(matches!(err, ConsolidationError::NoReportData(_)));
}
