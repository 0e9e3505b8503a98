//! Core types and configuration for relink.
//!
//! This crate provides the data structures shared by the scanner, the
//! matching engine and the report writers: file records, match results,
//! the run report and the run configuration.

mod config;
mod error;
mod record;

pub use config::{ReconcileConfig, ReconcileConfigBuilder, RenameRule, SimilarityMode};
pub use error::{RelinkError, ScanWarning, WarningKind};
pub use record::{
    Category, Caveats, FileRecord, MatchResult, ReconciliationReport, Summary, path_stem,
};
