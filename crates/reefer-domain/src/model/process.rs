//! Operational process definitions and timing results

use serde::{Deserialize, Serialize};

use super::container::ContainerType;

/// Default upper bound of the green band, in minutes
pub const DEFAULT_GREEN_MAX: f64 = 15.0;
/// Default upper bound of the yellow band, in minutes
pub const DEFAULT_YELLOW_MAX: f64 = 30.0;

pub const PENDING_LABEL: &str = "Pendiente";
pub const NOT_REQUESTED_LABEL: &str = "No Solicitado";

/// The three timed reefer operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessKind {
    /// Yard stacking until the unit is plugged in
    ConnectionToStacking,
    /// Disconnection request until the unit is unplugged for loading
    DisconnectionForLoading,
    /// Loading on board until the unit is plugged in on the vessel
    ConnectionOnBoard,
}

impl ProcessKind {
    pub const ALL: [ProcessKind; 3] = [
        ProcessKind::ConnectionToStacking,
        ProcessKind::DisconnectionForLoading,
        ProcessKind::ConnectionOnBoard,
    ];

    /// Suffix of the derived columns (`Estado_<suffix>`, `Min_<suffix>`, ...)
    pub fn suffix(&self) -> &'static str {
        match self {
            ProcessKind::ConnectionToStacking => "Conexion",
            ProcessKind::DisconnectionForLoading => "Desconexion",
            ProcessKind::ConnectionOnBoard => "OnBoard",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProcessKind::ConnectionToStacking => "Conexión a Stacking",
            ProcessKind::DisconnectionForLoading => "Desconexión para Embarque",
            ProcessKind::ConnectionOnBoard => "Conexión OnBoard",
        }
    }

    /// Compliance limit in minutes.
    ///
    /// On-board connection is held to 30 minutes for every unit; the yard
    /// processes allow General containers 60.
    pub fn compliance_limit(&self, container_type: ContainerType) -> f64 {
        match (self, container_type) {
            (ProcessKind::ConnectionOnBoard, _) => 30.0,
            (_, ContainerType::Ct) => 30.0,
            (_, ContainerType::General) => 60.0,
        }
    }
}

/// Columns and thresholds of one timed process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessDefinition {
    pub kind: ProcessKind,
    pub start_column: String,
    pub end_column: String,
    #[serde(default = "default_green_max")]
    pub green_max: f64,
    #[serde(default = "default_yellow_max")]
    pub yellow_max: f64,
    /// Status text shown once the process has finished
    pub completed_label: String,
}

fn default_green_max() -> f64 {
    DEFAULT_GREEN_MAX
}

fn default_yellow_max() -> f64 {
    DEFAULT_YELLOW_MAX
}

impl ProcessDefinition {
    pub fn new(
        kind: ProcessKind,
        start_column: &str,
        end_column: &str,
        completed_label: &str,
    ) -> Self {
        Self {
            kind,
            start_column: start_column.to_string(),
            end_column: end_column.to_string(),
            green_max: DEFAULT_GREEN_MAX,
            yellow_max: DEFAULT_YELLOW_MAX,
            completed_label: completed_label.to_string(),
        }
    }

    /// The Monitor export's column layout
    pub fn standard() -> Vec<Self> {
        vec![
            Self::new(
                ProcessKind::ConnectionToStacking,
                "FECHA STACKING",
                "FECHA CONEXION",
                "Conectado",
            ),
            Self::new(
                ProcessKind::DisconnectionForLoading,
                "SOLICITUD DESCONEXION",
                "FECHA DESCONEXION",
                "Desconectado",
            ),
            Self::new(
                ProcessKind::ConnectionOnBoard,
                "FECHA EMBARQUE",
                "CONEXION A BORDO",
                "Conectado a Bordo",
            ),
        ]
    }

    pub fn status_column(&self) -> String {
        format!("Estado_{}", self.kind.suffix())
    }

    pub fn minutes_column(&self) -> String {
        format!("Min_{}", self.kind.suffix())
    }

    pub fn duration_column(&self) -> String {
        format!("Tiempo_{}", self.kind.suffix())
    }

    pub fn semaforo_column(&self) -> String {
        format!("Semaforo_{}", self.kind.suffix())
    }

    pub fn compliance_column(&self) -> String {
        format!("Cumple_{}", self.kind.suffix())
    }
}

/// Exactly one of these holds per process per container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessStatus {
    /// Start and end timestamps present
    Completed,
    /// Started, not yet finished; minutes keep growing
    Pending,
    /// No start timestamp
    NotRequested,
}

impl ProcessStatus {
    pub fn label<'a>(&self, completed_label: &'a str) -> &'a str {
        match self {
            ProcessStatus::Completed => completed_label,
            ProcessStatus::Pending => PENDING_LABEL,
            ProcessStatus::NotRequested => NOT_REQUESTED_LABEL,
        }
    }
}

/// Green / yellow / red bucketing of elapsed minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Semaforo {
    Green,
    Yellow,
    Red,
}

impl Semaforo {
    pub fn classify(minutes: f64, green_max: f64, yellow_max: f64) -> Self {
        if minutes <= green_max {
            Semaforo::Green
        } else if minutes <= yellow_max {
            Semaforo::Yellow
        } else {
            Semaforo::Red
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Semaforo::Green => "Verde",
            Semaforo::Yellow => "Amarillo",
            Semaforo::Red => "Rojo",
        }
    }
}

/// Timing of one process for one container
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessTiming {
    pub status: ProcessStatus,
    /// Never negative; elapsed so far when pending
    pub minutes: f64,
    /// None when the process was not requested
    pub semaforo: Option<Semaforo>,
    /// None when the process was not requested
    pub compliant: Option<bool>,
}

impl ProcessTiming {
    pub fn not_requested() -> Self {
        Self {
            status: ProcessStatus::NotRequested,
            minutes: 0.0,
            semaforo: None,
            compliant: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semaforo_bands() {
        assert_eq!(Semaforo::classify(0.0, 15.0, 30.0), Semaforo::Green);
        assert_eq!(Semaforo::classify(15.0, 15.0, 30.0), Semaforo::Green);
        assert_eq!(Semaforo::classify(15.5, 15.0, 30.0), Semaforo::Yellow);
        assert_eq!(Semaforo::classify(30.0, 15.0, 30.0), Semaforo::Yellow);
        assert_eq!(Semaforo::classify(30.1, 15.0, 30.0), Semaforo::Red);
    }

    #[test]
    fn test_compliance_limits() {
        let onboard = ProcessKind::ConnectionOnBoard;
        assert_eq!(onboard.compliance_limit(ContainerType::Ct), 30.0);
        assert_eq!(onboard.compliance_limit(ContainerType::General), 30.0);

        let stacking = ProcessKind::ConnectionToStacking;
        assert_eq!(stacking.compliance_limit(ContainerType::Ct), 30.0);
        assert_eq!(stacking.compliance_limit(ContainerType::General), 60.0);
    }

    #[test]
    fn test_derived_column_names() {
        let defs = ProcessDefinition::standard();
        assert_eq!(defs.len(), 3);
        assert_eq!(defs[2].status_column(), "Estado_OnBoard");
        assert_eq!(defs[0].minutes_column(), "Min_Conexion");
        assert!(defs.iter().all(|d| d.green_max == 15.0 && d.yellow_max == 30.0));
    }

    #[test]
    fn test_definition_thresholds_default_when_missing() {
        let json = r#"{
            "kind": "connection_on_board",
            "start_column": "A",
            "end_column": "B",
            "completed_label": "Listo"
        }"#;
        let def: ProcessDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.green_max, DEFAULT_GREEN_MAX);
        assert_eq!(def.yellow_max, DEFAULT_YELLOW_MAX);
    }
}
