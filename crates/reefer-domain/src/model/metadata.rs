//! Report header metadata

use serde::{Deserialize, Serialize};

pub const VESSEL_PLACEHOLDER: &str = "---";
pub const ROTATION_PLACEHOLDER: &str = "Indefinida";
pub const DATE_PLACEHOLDER: &str = "---";

/// Vessel, rotation and query timestamp found in a Report banner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub vessel: String,
    pub rotation: String,
    /// `DD/MM/YYYY[ HH:MM]` as written in the sheet
    pub consulted_at: String,
}

impl Default for ReportMetadata {
    fn default() -> Self {
        Self {
            vessel: VESSEL_PLACEHOLDER.to_string(),
            rotation: ROTATION_PLACEHOLDER.to_string(),
            consulted_at: DATE_PLACEHOLDER.to_string(),
        }
    }
}

impl ReportMetadata {
    /// Label shared by all containers of one vessel call
    pub fn rotation_label(&self) -> String {
        format!("{} / {}", self.vessel, self.rotation)
    }

    pub fn has_rotation(&self) -> bool {
        self.rotation != ROTATION_PLACEHOLDER
    }
}
