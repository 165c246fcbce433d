// CDR Mapper Library
// Re-export modules for use in main.rs

pub mod columns;
pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod report;
pub mod sanitize;
pub mod workflow;

pub use error::{Error, Result};
