//! Application service layer - consolidation use case, config, scanning, export

pub mod app;
pub mod config;
pub mod export;
pub mod repository;
pub mod scanner;
