//! Spreadsheet loading
//!
//! Reads the first worksheet of an `.xls` or `.xlsx` file into a
//! [`RawSheet`]. Cell positions are absolute: leading empty rows and columns
//! the workbook does not store are restored so row offsets match what a user
//! sees in Excel.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use reefer_types::{excel_serial_to_datetime, parse_timestamp, CellValue, Error, RawSheet, Result};

/// Read a spreadsheet file from disk
pub fn load_sheet(path: &Path) -> Result<RawSheet> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.display().to_string()));
    }
    let bytes = fs::read(path)?;
    let source = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    read_sheet_bytes(bytes, &source)
}

/// Decode in-memory workbook bytes; the format is sniffed from the content
pub fn read_sheet_bytes(bytes: Vec<u8>, source: &str) -> Result<RawSheet> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| Error::Spreadsheet(format!("{}: {}", source, e)))?;

    let Some(first) = workbook.sheet_names().first().cloned() else {
        return Ok(RawSheet::new(source, Vec::new()));
    };
    let range = workbook
        .worksheet_range(&first)
        .map_err(|e| Error::Spreadsheet(format!("{}: {}", source, e)))?;

    let (start_row, start_col) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); start_row];
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; start_col];
        cells.extend(row.iter().map(convert_cell));
        rows.push(cells);
    }

    log::debug!("{}: sheet '{}' with {} rows", source, first, rows.len());
    Ok(RawSheet::new(source, rows))
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) if s.trim().is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64())
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) => parse_timestamp(s)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_scalars() {
        assert_eq!(convert_cell(&Data::Empty), CellValue::Empty);
        assert_eq!(convert_cell(&Data::String("  ".into())), CellValue::Empty);
        assert_eq!(convert_cell(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(
            convert_cell(&Data::String("ABCD123456".into())),
            CellValue::text("ABCD123456")
        );
    }

    #[test]
    fn test_iso_datetime_string() {
        let cell = convert_cell(&Data::DateTimeIso("2024-01-10T08:20:00".into()));
        assert!(matches!(cell, CellValue::DateTime(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_sheet(Path::new("/nonexistent/reporte.xlsx")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[test]
    fn test_garbage_bytes() {
        let err = read_sheet_bytes(b"not a workbook".to_vec(), "x.xlsx").unwrap_err();
        assert!(matches!(err, Error::Spreadsheet(_)));
    }
}
