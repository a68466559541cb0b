//! Domain model types

pub mod container;
pub mod metadata;
pub mod process;

pub use container::{
    normalize_container_id, ContainerType, CONTAINER_COLUMN, DEFAULT_SENSOR_COLUMNS,
    ROTATION_COLUMN, TYPE_COLUMN, UNIT_COLUMN,
};
pub use metadata::ReportMetadata;
pub use process::{ProcessDefinition, ProcessKind, ProcessStatus, ProcessTiming, Semaforo};
