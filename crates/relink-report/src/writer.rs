//! Writes rendered reports into an output directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use relink_analyze::TopFileEntry;
use relink_core::{ReconciliationReport, RelinkError};

use crate::render::{render_csv, render_json, render_markdown, render_top_json};

/// File name of the JSON report.
pub const JSON_FILE: &str = "integration_report.json";
/// File name of the CSV report.
pub const CSV_FILE: &str = "integration_report.csv";
/// File name of the Markdown report.
pub const MARKDOWN_FILE: &str = "integration_report.md";
/// File name of the top-N report.
pub const TOP_FILE: &str = "top_files_report.json";

/// Paths of the files written for a full run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub csv: PathBuf,
    pub markdown: PathBuf,
}

impl ReportPaths {
    /// All paths, in write order.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        [&self.json, &self.csv, &self.markdown]
            .into_iter()
            .map(PathBuf::as_path)
    }
}

/// Writes reports into one output directory, creating it if needed.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    out_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// The output directory.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Render and write the JSON, CSV and Markdown views.
    ///
    /// Everything is rendered before the first file is written, so a
    /// serialization failure leaves no partial output behind.
    pub fn write_reports(&self, report: &ReconciliationReport) -> Result<ReportPaths, RelinkError> {
        let json = render_json(report)?;
        let csv = render_csv(report)?;
        let markdown = render_markdown(report)?;

        self.ensure_dir()?;
        let paths = ReportPaths {
            json: self.write_file(JSON_FILE, &json)?,
            csv: self.write_file(CSV_FILE, &csv)?,
            markdown: self.write_file(MARKDOWN_FILE, &markdown)?,
        };

        info!(out_dir = %self.out_dir.display(), items = report.total, "reports written");
        Ok(paths)
    }

    /// Write the top-N JSON array.
    pub fn write_top_report(&self, entries: &[TopFileEntry]) -> Result<PathBuf, RelinkError> {
        let json = render_top_json(entries)?;
        self.ensure_dir()?;
        let path = self.write_file(TOP_FILE, &json)?;
        info!(path = %path.display(), entries = entries.len(), "top files report written");
        Ok(path)
    }

    fn ensure_dir(&self) -> Result<(), RelinkError> {
        fs::create_dir_all(&self.out_dir).map_err(|e| RelinkError::report_write(&self.out_dir, e))
    }

    fn write_file(&self, name: &str, contents: &str) -> Result<PathBuf, RelinkError> {
        let path = self.out_dir.join(name);
        fs::write(&path, contents).map_err(|e| RelinkError::report_write(&path, e))?;
        Ok(path)
    }
}
