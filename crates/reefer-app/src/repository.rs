//! Repository adapters for persistence layer

use reefer_domain::MonitorHistoryRepository;
use reefer_infra::{FileMonitorHistoryRepository, MemoryMonitorHistoryRepository};
use reefer_types::Result;

use crate::config::Config;

/// Open the file-based monitor history at the configured path
pub fn open_history_repo(config: &Config) -> Result<FileMonitorHistoryRepository> {
    Ok(FileMonitorHistoryRepository::new(config.history_path()?))
}

/// History store for a run: the configured file, or a throwaway in-memory
/// store when `persist` is false
pub fn open_run_history(config: &Config, persist: bool) -> Result<Box<dyn MonitorHistoryRepository>> {
    if persist {
        Ok(Box::new(open_history_repo(config)?))
    } else {
        Ok(Box::new(MemoryMonitorHistoryRepository::new()))
    }
}
