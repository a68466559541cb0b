//! Domain services

pub mod column_normalizer;
pub mod header_locator;
pub mod metadata_extractor;
pub mod monitor_accumulator;
pub mod process_timer;
pub mod reconciler;
pub mod rotation;
pub mod summary;

pub use header_locator::{locate_header, parse_at_offset, parse_with_keyword};
pub use metadata_extractor::{ExtractionRule, MetadataExtractor, MetadataField};
pub use monitor_accumulator::{Accumulation, MonitorAccumulator, MonitorLayout};
pub use process_timer::{apply_process_timers, format_minutes, time_process};
pub use reconciler::{concat_reports, reconcile, ReconcileOptions, Reconciliation};
pub use rotation::{filter_rotation, group_by_rotation, tag_rotation, RotationBatch};
pub use summary::{summarize, ConsolidationSummary, ProcessSummary};
