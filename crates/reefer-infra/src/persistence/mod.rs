//! Persistence implementations
//!
//! This module provides the storage backends of the monitor history.

mod file_monitor_history_repo;
mod memory_monitor_history_repo;

pub use file_monitor_history_repo::{FileMonitorHistoryRepository, HISTORY_SHEET_NAME};
pub use memory_monitor_history_repo::MemoryMonitorHistoryRepository;
