//! Writing a [`Table`] as a single-sheet xlsx workbook

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use reefer_types::{datetime_to_excel_serial, CellValue, Error, Result, Table};

/// Excel display format for timestamp cells
pub const DATETIME_FORMAT: &str = "dd/mm/yyyy hh:mm";

/// Longest sheet name Excel accepts
const MAX_SHEET_NAME: usize = 31;

/// Make a string usable as a worksheet name
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .collect();
    let trimmed: String = cleaned
        .trim()
        .trim_matches('\'')
        .chars()
        .take(MAX_SHEET_NAME)
        .collect();
    if trimmed.trim().is_empty() {
        "Sheet1".to_string()
    } else {
        trimmed
    }
}

/// Write `table` to `path`, header in bold, no index column
pub fn write_table_xlsx(table: &Table, sheet_name: &str, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet
        .set_name(sanitize_sheet_name(sheet_name))
        .map_err(|e| Error::Excel(e.to_string()))?;

    write_table(sheet, table)?;

    workbook
        .save(path)
        .map_err(|e| Error::Excel(e.to_string()))?;
    log::debug!("wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

fn write_table(sheet: &mut Worksheet, table: &Table) -> Result<()> {
    let header_format = Format::new().set_bold();
    let datetime_format = Format::new().set_num_format(DATETIME_FORMAT);

    for (col, name) in table.columns().iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, name, &header_format)
            .map_err(|e| Error::Excel(e.to_string()))?;
    }

    for (row_idx, row) in table.rows().iter().enumerate() {
        let row_num = (row_idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            let written = match cell {
                CellValue::Empty => continue,
                CellValue::Text(s) => sheet.write_string(row_num, col, s),
                CellValue::Number(n) if n.is_finite() => sheet.write_number(row_num, col, *n),
                CellValue::Number(_) => continue,
                CellValue::Bool(b) => sheet.write_boolean(row_num, col, *b),
                CellValue::DateTime(dt) => sheet.write_number_with_format(
                    row_num,
                    col,
                    datetime_to_excel_serial(dt),
                    &datetime_format,
                ),
            };
            written.map_err(|e| Error::Excel(e.to_string()))?;
        }
    }

    for col in 0..table.width() {
        sheet
            .set_column_width(col as u16, 16)
            .map_err(|e| Error::Excel(e.to_string()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("MSC ANNA / 2401-E"), "MSC ANNA _ 2401-E");
        assert_eq!(sanitize_sheet_name("   "), "Sheet1");
        assert_eq!(sanitize_sheet_name(&"X".repeat(40)).len(), 31);
    }
}
