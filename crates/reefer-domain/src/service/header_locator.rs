//! Header row detection for loosely structured sheets
//!
//! Report exports start with a banner of vessel and query details, so the
//! real header row moves from file to file. The header is the first row with
//! a cell whose whole value equals the key column name.

use reefer_types::{CellValue, Error, RawSheet, Result, Table};

use super::column_normalizer::{header_name, normalize_columns, normalize_name};

/// Index of the first row holding `keyword` as an entire cell value.
///
/// Comparison is case-insensitive and ignores surrounding whitespace.
/// Substrings do not count: "CONTENEDORES REEFER" is not a match for
/// "CONTENEDOR".
pub fn locate_header(rows: &[Vec<CellValue>], keyword: &str) -> Option<usize> {
    let keyword = normalize_name(keyword);
    rows.iter()
        .position(|row| row.iter().any(|cell| cell.normalized_text() == keyword))
}

/// Build a table using `header_row` as the column names.
///
/// Column names are normalized and de-duplicated; rows below the header that
/// hold no value at all are dropped.
pub fn table_from_header(sheet: &RawSheet, header_row: usize) -> Table {
    let Some(header) = sheet.rows.get(header_row) else {
        return Table::default();
    };

    let width = sheet
        .rows
        .iter()
        .skip(header_row)
        .map(Vec::len)
        .max()
        .unwrap_or(0);

    let raw_names: Vec<String> = (0..width)
        .map(|col| {
            header
                .get(col)
                .map(|cell| header_name(cell, col))
                .unwrap_or_else(|| header_name(&CellValue::Empty, col))
        })
        .collect();

    let rows = sheet
        .rows
        .iter()
        .skip(header_row + 1)
        .filter(|row| row.iter().any(|cell| !cell.is_blank()))
        .cloned()
        .collect();

    Table::from_rows(normalize_columns(&raw_names), rows)
}

/// Locate the header row for `keyword` and re-read the sheet from it
pub fn parse_with_keyword(sheet: &RawSheet, keyword: &str) -> Result<Table> {
    let header_row = locate_header(&sheet.rows, keyword).ok_or_else(|| Error::HeaderNotFound {
        keyword: keyword.to_string(),
        source_name: sheet.source.clone(),
    })?;
    log::debug!(
        "{}: header '{}' found at row {}",
        sheet.source,
        keyword,
        header_row
    );
    Ok(table_from_header(sheet, header_row))
}

/// Read the sheet with a known header offset, falling back to a keyword scan
/// when that row does not hold the keyword.
pub fn parse_at_offset(sheet: &RawSheet, header_row: usize, keyword: &str) -> Result<Table> {
    let keyword_norm = normalize_name(keyword);
    let offset_matches = sheet
        .rows
        .get(header_row)
        .map(|row| row.iter().any(|cell| cell.normalized_text() == keyword_norm))
        .unwrap_or(false);

    if offset_matches {
        Ok(table_from_header(sheet, header_row))
    } else {
        log::debug!(
            "{}: row {} lacks '{}', scanning for header",
            sheet.source,
            header_row,
            keyword
        );
        parse_with_keyword(sheet, keyword)
    }
}
