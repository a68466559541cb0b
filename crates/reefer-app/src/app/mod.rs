//! Application use cases

pub mod consolidation_service;

pub use consolidation_service::{
    ConsolidationError, ConsolidationOutcome, ConsolidationService, ParsedReport,
};
