//! Spreadsheet discovery for folder-driven runs

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use reefer_types::{Error, Result};

/// Supported spreadsheet extensions
const SPREADSHEET_EXTENSIONS: &[&str] = &["xls", "xlsx"];

/// Prefix of the lock files Excel leaves next to open workbooks
const LOCK_FILE_PREFIX: &str = "~$";

/// Check if a path is a supported spreadsheet file
pub fn is_spreadsheet(path: &Path) -> bool {
    let is_lock_file = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with(LOCK_FILE_PREFIX))
        .unwrap_or(true);

    !is_lock_file
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| SPREADSHEET_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
}

/// Spreadsheets directly inside `dir`, sorted by file name
pub fn scan_spreadsheets(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::FileNotFound(dir.display().to_string()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && is_spreadsheet(path))
        .collect();

    // Sort by filename for consistent ordering
    files.sort_by(|a, b| {
        a.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .cmp(b.file_name().and_then(|n| n.to_str()).unwrap_or(""))
    });

    log::debug!("{} spreadsheet(s) in {}", files.len(), dir.display());
    Ok(files)
}
