//! Path resolution and similarity matching for relink.
//!
//! This crate decides, for every archived file, whether and where an
//! equivalent file exists in the current tree:
//!
//! - **Path resolution** - the archived path under the target prefix, then
//!   with each legacy rename rule applied; exact before case-insensitive
//! - **Similarity matching** - when no path matches, same-named files
//!   anywhere in the current tree are scored by content similarity
//! - **Classification** - exactly one category per archived file
//!
//! Archived files are resolved independently and in parallel with rayon;
//! results are returned in archive path order.
//!
//! ```rust,ignore
//! use relink_analyze::{Reconciler, ReconcileConfig};
//!
//! let config = ReconcileConfig::new("/snapshots/2025-08-25", "/srv/app");
//! let report = Reconciler::new(config)?.run()?;
//!
//! for (category, count) in report.summary.iter() {
//!     println!("{category}: {count}");
//! }
//! ```
//!
//! # Largest files
//!
//! [`Reconciler::run_top`] resolves only the N largest archived files and
//! annotates each with a guessed purpose:
//!
//! ```rust,ignore
//! use relink_analyze::{Reconciler, ReconcileConfig, TopConfig};
//!
//! let reconciler = Reconciler::new(ReconcileConfig::new("/old", "/new"))?;
//! for entry in reconciler.run_top(&TopConfig::default())? {
//!     println!("{} {} {}", entry.archive_rel, entry.size_human, entry.purpose);
//! }
//! ```

mod engine;
mod matcher;
mod resolver;
pub mod similarity;
mod top;

pub use engine::{Reconciler, ScannedTrees, classify};
pub use matcher::{SimilarMatch, SimilarityMatcher};
pub use resolver::{CurrentIndex, PathResolver, Resolution};
pub use top::{TopConfig, TopConfigBuilder, TopFileEntry, infer_purpose, largest};

// Re-export core types
pub use relink_core::{
    Category, FileRecord, MatchResult, ReconcileConfig, ReconciliationReport, RelinkError,
};
