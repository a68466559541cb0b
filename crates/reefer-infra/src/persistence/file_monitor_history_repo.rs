//! File-based monitor history repository implementation
//!
//! The history is an ordinary xlsx workbook so operators can open it in
//! Excel. Saves go through a temporary file and a rename.

use std::fs;
use std::path::{Path, PathBuf};

use reefer_domain::repository::MonitorHistoryRepository;
use reefer_domain::service::header_locator::table_from_header;
use reefer_types::{Error, Result, Table};

use crate::sheet_loader::load_sheet;
use crate::xlsx_writer::write_table_xlsx;

pub const HISTORY_SHEET_NAME: &str = "Historial";

/// File-based implementation of MonitorHistoryRepository
pub struct FileMonitorHistoryRepository {
    path: PathBuf,
}

impl FileMonitorHistoryRepository {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl MonitorHistoryRepository for FileMonitorHistoryRepository {
    fn load(&self) -> Result<Table> {
        if !self.path.exists() {
            return Ok(Table::default());
        }
        let sheet = load_sheet(&self.path)
            .map_err(|e| Error::Persistence(format!("{}: {}", self.path.display(), e)))?;
        if sheet.rows.is_empty() {
            return Ok(Table::default());
        }
        let table = table_from_header(&sheet, 0);
        log::debug!("loaded {} history rows from {}", table.len(), self.path.display());
        Ok(table)
    }

    fn save(&self, table: &Table) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let temp = self.temp_path();
        write_table_xlsx(table, HISTORY_SHEET_NAME, &temp)
            .map_err(|e| Error::Persistence(e.to_string()))?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            log::info!("removed monitor history {}", self.path.display());
        }
        Ok(())
    }
}
