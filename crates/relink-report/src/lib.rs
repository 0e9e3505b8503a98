//! Report rendering and output for relink.
//!
//! A [`ReconciliationReport`] is rendered into three independent views:
//!
//! - **JSON** - the full structured result
//! - **CSV** - one row per archived file
//! - **Markdown** - a categorized document for people
//!
//! [`ReportWriter`] writes all of them into an output directory. Any failure
//! there is fatal, since the run has nothing else to show for itself.

mod render;
mod writer;

pub use render::{CSV_HEADER, render_csv, render_json, render_markdown, render_top_json};
pub use writer::{
    CSV_FILE, JSON_FILE, MARKDOWN_FILE, ReportPaths, ReportWriter, TOP_FILE,
};

// Re-export core types
pub use relink_core::{ReconciliationReport, RelinkError};
