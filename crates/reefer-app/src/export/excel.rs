//! Excel export of the consolidated table

use std::fs;
use std::path::{Path, PathBuf};

use reefer_infra::{sanitize_sheet_name, write_table_xlsx};
use reefer_types::{Result, Table};

/// `consolidado_<rotation>.xlsx`, with characters unsafe in file names replaced
pub fn export_file_name(rotation: &str) -> String {
    let safe: String = rotation
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe = if safe.is_empty() { "sin_rotacion".to_string() } else { safe };
    format!("consolidado_{}.xlsx", safe)
}

/// Write the consolidated table to `output_dir` as a one-sheet workbook.
///
/// Returns the path of the written file.
pub fn export_to_excel(table: &Table, rotation: &str, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(export_file_name(rotation));
    write_table_xlsx(table, &sanitize_sheet_name(rotation), &path)?;
    log::info!("exported {} rows to {}", table.len(), path.display());
    Ok(path)
}
