//! Reconciliation core: header detection, monitor accumulation, join and
//! process timing over in-memory tables

pub mod clock;
pub mod model;
pub mod repository;
pub mod service;

pub use clock::{Clock, FixedClock, ZonedClock};
pub use model::*;
pub use repository::*;
pub use service::*;
