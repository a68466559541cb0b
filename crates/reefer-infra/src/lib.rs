//! Infrastructure layer - spreadsheet reading/writing, persistence implementations

pub mod parse_cache;
pub mod persistence;
pub mod sheet_loader;
pub mod xlsx_writer;

pub use parse_cache::{content_hash, ParseCache};
pub use persistence::{FileMonitorHistoryRepository, MemoryMonitorHistoryRepository};
pub use sheet_loader::{load_sheet, read_sheet_bytes};
pub use xlsx_writer::{sanitize_sheet_name, write_table_xlsx};
