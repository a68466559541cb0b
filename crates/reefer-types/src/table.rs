//! Untyped tabular data shared by every layer
//!
//! Spreadsheets exported by the terminal system carry no fixed schema, so the
//! pipeline works on a loose grid of [`CellValue`]s. [`RawSheet`] is the grid as
//! read from the file; [`Table`] is the same data once a header row has been
//! chosen and the column names are known.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Days between the Excel epoch (1899-12-30) and the Unix epoch
const EXCEL_UNIX_EPOCH_DAYS: f64 = 25_569.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Timestamp layouts seen in the exports, most specific first
const DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d", "%Y/%m/%d"];

static EMPTY_CELL: CellValue = CellValue::Empty;

/// A single spreadsheet cell
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    DateTime(NaiveDateTime),
    Text(String),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// Empty cells and whitespace-only text both count as blank
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    /// Trimmed, upper-cased text form used for keyword and label matching
    pub fn normalized_text(&self) -> String {
        self.to_string().trim().to_uppercase()
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Text(s) => s.trim().replace(',', ".").parse().ok(),
            _ => None,
        }
    }

    /// Interpret the cell as a timestamp.
    ///
    /// Native date cells pass through, numbers are read as Excel serials and
    /// text is tried against the day-first layouts used by the exports.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::DateTime(dt) => Some(*dt),
            CellValue::Number(n) if *n > 0.0 => excel_serial_to_datetime(*n),
            CellValue::Text(s) => parse_timestamp(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::DateTime(dt) => {
                if dt.and_utc().timestamp() % 60 == 0 {
                    write!(f, "{}", dt.format("%d/%m/%Y %H:%M"))
                } else {
                    write!(f, "{}", dt.format("%d/%m/%Y %H:%M:%S"))
                }
            }
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

/// Parse a timestamp written as text
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Convert an Excel serial day number (1900 date system) to a timestamp
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let millis = ((serial - EXCEL_UNIX_EPOCH_DAYS) * MILLIS_PER_DAY).round() as i64;
    DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}

/// Convert a timestamp to an Excel serial day number (1900 date system)
pub fn datetime_to_excel_serial(dt: &NaiveDateTime) -> f64 {
    dt.and_utc().timestamp_millis() as f64 / MILLIS_PER_DAY + EXCEL_UNIX_EPOCH_DAYS
}

/// A worksheet exactly as read, before any header row is chosen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    /// Source label (file name and sheet) used in messages
    pub source: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawSheet {
    pub fn new(source: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            source: source.into(),
            rows,
        }
    }
}

/// Named columns over rows of cells. Every row has exactly one cell per column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table, padding short rows and truncating long ones
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell at (row, column index); out-of-range positions read as empty
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Cell at (row, column name), `None` when the column does not exist
    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        self.column_index(column).map(|col| self.cell(row, col))
    }

    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: CellValue) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = value;
        }
    }

    /// Values of a column, top to bottom
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &CellValue> + '_> {
        let col = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| &r[col]))
    }

    /// Replace a column's values, or append it as the last column
    pub fn set_column(&mut self, name: &str, mut values: Vec<CellValue>) {
        values.resize(self.rows.len(), CellValue::Empty);
        match self.column_index(name) {
            Some(col) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[col] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    pub fn remove_column(&mut self, name: &str) -> Option<Vec<CellValue>> {
        let col = self.column_index(name)?;
        self.columns.remove(col);
        Some(self.rows.iter_mut().map(|r| r.remove(col)).collect())
    }

    /// Keep only the columns whose name satisfies the predicate
    pub fn retain_columns<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        let kept: Vec<bool> = self.columns.iter().map(|c| keep(c)).collect();
        if kept.iter().all(|k| *k) {
            return;
        }

        let mut flags = kept.iter();
        self.columns.retain(|_| *flags.next().unwrap_or(&true));
        for row in &mut self.rows {
            let mut flags = kept.iter();
            row.retain(|_| *flags.next().unwrap_or(&true));
        }
    }

    /// Keep only the rows satisfying the predicate
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[CellValue]) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }

    /// Copy of the given rows, in the given order
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        let rows = indices
            .iter()
            .filter_map(|i| self.rows.get(*i).cloned())
            .collect();
        Table {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Stack another table below this one, aligning columns by name.
    ///
    /// Columns present only in `other` are appended; cells missing on either
    /// side stay empty.
    pub fn append(&mut self, other: &Table) {
        let positions: Vec<usize> = other
            .columns
            .iter()
            .map(|name| match self.column_index(name) {
                Some(col) => col,
                None => {
                    self.columns.push(name.clone());
                    for row in &mut self.rows {
                        row.push(CellValue::Empty);
                    }
                    self.columns.len() - 1
                }
            })
            .collect();

        for source in &other.rows {
            let mut row = vec![CellValue::Empty; self.columns.len()];
            for (value, &col) in source.iter().zip(&positions) {
                row[col] = value.clone();
            }
            self.rows.push(row);
        }
    }

    /// Stable sort of the rows by a key derived from one column
    pub fn sort_rows_by_key<K, F>(&mut self, column: &str, mut key: F)
    where
        K: Ord,
        F: FnMut(&CellValue) -> K,
    {
        if let Some(col) = self.column_index(column) {
            self.rows.sort_by_key(|row| key(&row[col]));
        }
    }
}
