//! Renderers for the three report views.

use std::fmt::Write as _;

use humansize::{BINARY, format_size};
use itertools::Itertools;

use relink_analyze::TopFileEntry;
use relink_core::{Category, MatchResult, ReconciliationReport, RelinkError};

/// Column names of the CSV view.
pub const CSV_HEADER: [&str; 5] = [
    "archive_rel",
    "size_bytes",
    "category",
    "target_rel",
    "similarity",
];

/// Pretty-printed JSON of the whole report.
pub fn render_json(report: &ReconciliationReport) -> Result<String, RelinkError> {
    serde_json::to_string_pretty(report).map_err(|e| RelinkError::Serialize {
        format: "json",
        message: e.to_string(),
    })
}

/// Pretty-printed JSON array of top-N entries.
pub fn render_top_json(entries: &[TopFileEntry]) -> Result<String, RelinkError> {
    serde_json::to_string_pretty(entries).map_err(|e| RelinkError::Serialize {
        format: "json",
        message: e.to_string(),
    })
}

/// One CSV row per item; absent fields are empty strings.
pub fn render_csv(report: &ReconciliationReport) -> Result<String, RelinkError> {
    let csv_err = |message: String| RelinkError::Serialize {
        format: "csv",
        message,
    };

    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(CSV_HEADER)
        .map_err(|e| csv_err(e.to_string()))?;

    for item in &report.items {
        let size = item.size_bytes.to_string();
        let similarity = item
            .similarity
            .map(|s| format!("{s:.4}"))
            .unwrap_or_default();
        wtr.write_record([
            item.archive_rel.as_str(),
            size.as_str(),
            item.category.as_ref(),
            item.target_rel.as_deref().unwrap_or(""),
            similarity.as_str(),
        ])
        .map_err(|e| csv_err(e.to_string()))?;
    }

    let bytes = wtr.into_inner().map_err(|e| csv_err(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| csv_err(e.to_string()))
}

/// Human-readable Markdown document.
pub fn render_markdown(report: &ReconciliationReport) -> Result<String, RelinkError> {
    write_markdown(report).map_err(|e| RelinkError::Serialize {
        format: "markdown",
        message: e.to_string(),
    })
}

fn write_markdown(report: &ReconciliationReport) -> Result<String, std::fmt::Error> {
    let mut out = String::new();

    writeln!(out, "# Integration report")?;
    writeln!(out)?;
    writeln!(out, "- Archive: `{}`", report.archive_root.display())?;
    writeln!(out, "- Current: `{}`", report.current_root.display())?;
    writeln!(out, "- Generated: {}", report.generated_at.to_rfc3339())?;
    writeln!(out, "- Archived files: {}", report.total)?;
    writeln!(out)?;

    writeln!(out, "## Summary")?;
    writeln!(out)?;
    writeln!(out, "| Category | Files |")?;
    writeln!(out, "|---|---:|")?;
    for (category, count) in report.summary.iter() {
        writeln!(out, "| {category} | {count} |")?;
    }
    writeln!(out)?;

    if !report.caveats.is_empty() {
        writeln!(
            out,
            "> Unreadable directories were skipped: {} in the archive, {} in the current tree. \
             Files below them are not listed.",
            report.caveats.archive_skipped_dirs, report.caveats.current_skipped_dirs
        )?;
        writeln!(out)?;
    }

    let missing = report.items_in(Category::Missing).collect_vec();
    writeln!(out, "## Missing ({})", missing.len())?;
    writeln!(out)?;
    for item in &missing {
        writeln!(
            out,
            "- `{}` ({})",
            item.archive_rel,
            format_size(item.size_bytes, BINARY)
        )?;
    }
    writeln!(out)?;

    // Stable sort keeps archive path order among equal scores.
    let similar = report
        .items_in(Category::BasenameSimilar)
        .sorted_by(|a, b| score(b).total_cmp(&score(a)))
        .collect_vec();
    writeln!(out, "## Basename similar ({})", similar.len())?;
    writeln!(out)?;
    if !similar.is_empty() {
        writeln!(out, "| Archived | Candidate | Similarity |")?;
        writeln!(out, "|---|---|---:|")?;
        for item in &similar {
            writeln!(
                out,
                "| `{}` | `{}` | {:.4} |",
                cell(&item.archive_rel),
                cell(item.target_rel.as_deref().unwrap_or("")),
                score(item)
            )?;
        }
        writeln!(out)?;
    }

    let resolved = report
        .items
        .iter()
        .filter(|i| matches!(i.category, Category::Exact | Category::CaseInsensitive))
        .collect_vec();
    writeln!(out, "## Exact and case-insensitive ({})", resolved.len())?;
    writeln!(out)?;
    if !resolved.is_empty() {
        writeln!(out, "| Archived | Current | Category |")?;
        writeln!(out, "|---|---|---|")?;
        for item in &resolved {
            writeln!(
                out,
                "| `{}` | `{}` | {} |",
                cell(&item.archive_rel),
                cell(item.target_rel.as_deref().unwrap_or("")),
                item.category
            )?;
        }
    }

    Ok(out)
}

/// Escape pipes so a path cannot split a table row.
fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn score(item: &MatchResult) -> f64 {
    item.similarity.unwrap_or(0.0)
}
