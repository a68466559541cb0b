//! Container identity and classification

use serde::{Deserialize, Serialize};

/// Key column of the Report export
pub const CONTAINER_COLUMN: &str = "CONTENEDOR";
/// Key column of the Monitor export
pub const UNIT_COLUMN: &str = "UNIDAD";
/// Derived sensor classification column
pub const TYPE_COLUMN: &str = "TIPO";
/// Vessel / rotation label of the report a row came from
pub const ROTATION_COLUMN: &str = "ROTACION_REPORTE";

/// Reefer sensor temperature columns of the Monitor export
pub const DEFAULT_SENSOR_COLUMNS: [&str; 4] =
    ["SENSOR1_TMP", "SENSOR2_TMP", "SENSOR3_TMP", "SENSOR4_TMP"];

/// Whether a container reported reefer sensor data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerType {
    /// Controlled temperature: at least one sensor reading
    #[serde(rename = "CT")]
    Ct,
    #[default]
    General,
}

impl ContainerType {
    pub fn from_has_sensor(has_sensor: bool) -> Self {
        if has_sensor {
            ContainerType::Ct
        } else {
            ContainerType::General
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContainerType::Ct => "CT",
            ContainerType::General => "General",
        }
    }

    /// Parse a stored label; anything other than "CT" is General
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("CT") {
            ContainerType::Ct
        } else {
            ContainerType::General
        }
    }
}

impl std::fmt::Display for ContainerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Join key for container / unit ids.
///
/// Exports disagree on spacing and check-digit separators
/// ("ABCU 123456-7" vs "ABCU1234567"), so whitespace and dashes are dropped.
pub fn normalize_container_id(id: &str) -> String {
    id.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_container_id() {
        assert_eq!(normalize_container_id("abcu 123456-7"), "ABCU1234567");
        assert_eq!(normalize_container_id(" ABCU1234567 "), "ABCU1234567");
        assert_eq!(normalize_container_id("ABCU\u{3000}1234567"), "ABCU1234567");
    }

    #[test]
    fn test_type_labels() {
        assert_eq!(ContainerType::from_label("ct"), ContainerType::Ct);
        assert_eq!(ContainerType::from_label("General"), ContainerType::General);
        assert_eq!(ContainerType::from_label(""), ContainerType::General);
        assert_eq!(ContainerType::from_has_sensor(true).label(), "CT");
    }
}
