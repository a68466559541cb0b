//! In-memory monitor history, for `--no-history` runs and tests

use std::cell::RefCell;

use reefer_domain::repository::MonitorHistoryRepository;
use reefer_types::{Result, Table};

#[derive(Debug, Default)]
pub struct MemoryMonitorHistoryRepository {
    table: RefCell<Table>,
}

impl MemoryMonitorHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(table: Table) -> Self {
        Self {
            table: RefCell::new(table),
        }
    }

    pub fn snapshot(&self) -> Table {
        self.table.borrow().clone()
    }
}

impl MonitorHistoryRepository for MemoryMonitorHistoryRepository {
    fn load(&self) -> Result<Table> {
        Ok(self.table.borrow().clone())
    }

    fn save(&self, table: &Table) -> Result<()> {
        *self.table.borrow_mut() = table.clone();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.table.borrow_mut() = Table::default();
        Ok(())
    }
}
