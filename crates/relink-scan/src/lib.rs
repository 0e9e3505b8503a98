//! Source tree scanning for relink.
//!
//! This crate enumerates the files of an archive tree and a current tree
//! using jwalk for parallel traversal, and reads file contents tolerantly.
//!
//! # Overview
//!
//! - **Extension allow-list** matched case-insensitively
//! - **Excluded directories** pruned before descent, at any depth
//! - **Soft failures**: unreadable directories become [`ScanWarning`]s and
//!   unreadable files read as empty text
//!
//! # Example
//!
//! ```rust,no_run
//! use relink_scan::{ReconcileConfig, TreeScanner, read_text};
//!
//! let config = ReconcileConfig::new("/snapshots/2025-08-25", "/srv/app");
//! let scanner = TreeScanner::from_config(&config);
//! let outcome = scanner.scan(&config.archive_root).unwrap();
//!
//! for file in &outcome.files {
//!     let text = read_text(&outcome.root.join(&file.relative_path));
//!     println!("{} ({} chars)", file.relative_path, text.len());
//! }
//! println!("{} directories skipped", outcome.skipped_dirs());
//! ```

mod reader;
mod scanner;

pub use reader::read_text;
pub use scanner::{ScanOutcome, TreeScanner};

// Re-export core types for convenience
pub use relink_core::{FileRecord, ReconcileConfig, RelinkError, ScanWarning, WarningKind};
