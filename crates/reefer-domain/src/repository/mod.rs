//! Repository trait definitions for data persistence

use reefer_types::{Error, Table};

/// Durable store of the accumulated per-unit monitor table
pub trait MonitorHistoryRepository {
    /// Load the whole history; an absent store is an empty table
    fn load(&self) -> Result<Table, Error>;

    /// Overwrite the store with `table`
    fn save(&self, table: &Table) -> Result<(), Error>;

    /// Forget all accumulated history
    fn clear(&self) -> Result<(), Error>;
}
