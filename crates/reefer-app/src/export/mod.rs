//! Export functionality

pub mod excel;

pub use excel::{export_file_name, export_to_excel};
