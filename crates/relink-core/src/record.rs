//! File records, match outcomes and the run report.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, IntoEnumIterator};

/// One file discovered during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path relative to the scanned root, `/`-separated.
    pub relative_path: String,
    /// Size in bytes; 0 when it could not be determined.
    pub size_bytes: u64,
}

impl FileRecord {
    /// Create a new file record.
    pub fn new(relative_path: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            relative_path: relative_path.into(),
            size_bytes,
        }
    }

    /// File name without directories or the final extension.
    pub fn stem(&self) -> &str {
        path_stem(&self.relative_path)
    }
}

/// Base name of a `/`-separated path with the last extension removed.
///
/// A leading dot is part of the name, so `.eslintrc` has no extension.
pub fn path_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    }
}

/// Reconciliation outcome for one archived file.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Category {
    /// Found at the expected path.
    Exact,
    /// Found at the expected path modulo letter case.
    CaseInsensitive,
    /// Linked to a same-named file elsewhere by content similarity.
    BasenameSimilar,
    /// No counterpart in the current tree.
    Missing,
}

/// Match result for a single archived file.
///
/// Construct through [`MatchResult::resolved`], [`MatchResult::similar`] or
/// [`MatchResult::missing`] so the target and similarity fields always agree
/// with the category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Archived path, relative to the archive root.
    pub archive_rel: String,
    /// Size copied from the archive record.
    pub size_bytes: u64,
    /// Outcome category.
    pub category: Category,
    /// Current-tree path; absent only for `missing`.
    pub target_rel: Option<String>,
    /// Similarity score; present only for `basename-similar`.
    pub similarity: Option<f64>,
}

impl MatchResult {
    /// A path-based match (`exact` or `case-insensitive`).
    pub fn resolved(record: &FileRecord, category: Category, target: impl Into<String>) -> Self {
        debug_assert!(matches!(category, Category::Exact | Category::CaseInsensitive));
        Self {
            archive_rel: record.relative_path.clone(),
            size_bytes: record.size_bytes,
            category,
            target_rel: Some(target.into()),
            similarity: None,
        }
    }

    /// A content-similarity match.
    pub fn similar(record: &FileRecord, target: impl Into<String>, score: f64) -> Self {
        Self {
            archive_rel: record.relative_path.clone(),
            size_bytes: record.size_bytes,
            category: Category::BasenameSimilar,
            target_rel: Some(target.into()),
            similarity: Some(score.clamp(0.0, 1.0)),
        }
    }

    /// No counterpart found.
    pub fn missing(record: &FileRecord) -> Self {
        Self {
            archive_rel: record.relative_path.clone(),
            size_bytes: record.size_bytes,
            category: Category::Missing,
            target_rel: None,
            similarity: None,
        }
    }

    /// Check the category/target/similarity invariants.
    pub fn is_consistent(&self) -> bool {
        let target_ok = self.target_rel.is_none() == (self.category == Category::Missing);
        let score_ok = self.similarity.is_some() == (self.category == Category::BasenameSimilar);
        target_ok && score_ok
    }
}

/// Per-category counts, always listing every category in a fixed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Summary(IndexMap<Category, usize>);

impl Summary {
    /// Count the categories of a result set.
    pub fn from_results(results: &[MatchResult]) -> Self {
        let mut counts: IndexMap<Category, usize> = Category::iter().map(|c| (c, 0)).collect();
        for result in results {
            *counts.entry(result.category).or_default() += 1;
        }
        Self(counts)
    }

    /// Count for one category.
    pub fn get(&self, category: Category) -> usize {
        self.0.get(&category).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Iterate categories with their counts.
    pub fn iter(&self) -> impl Iterator<Item = (Category, usize)> + '_ {
        self.0.iter().map(|(c, n)| (*c, *n))
    }
}

/// Scan caveats that are not part of the category summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caveats {
    /// Archive directories skipped because they could not be read.
    pub archive_skipped_dirs: usize,
    /// Current-tree directories skipped because they could not be read.
    pub current_skipped_dirs: usize,
}

impl Caveats {
    /// Whether any part of either tree was left out.
    pub fn is_empty(&self) -> bool {
        self.archive_skipped_dirs == 0 && self.current_skipped_dirs == 0
    }
}

/// Full output of a reconciliation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
    /// Archive root that was scanned.
    pub archive_root: PathBuf,
    /// Current root that was scanned.
    pub current_root: PathBuf,
    /// Per-category counts.
    pub summary: Summary,
    /// Number of archived files considered.
    pub total: usize,
    /// Directories skipped during scanning.
    pub caveats: Caveats,
    /// One result per archived file.
    pub items: Vec<MatchResult>,
}

impl ReconciliationReport {
    /// Build a report from finished results, computing the summary.
    pub fn new(
        archive_root: impl Into<PathBuf>,
        current_root: impl Into<PathBuf>,
        items: Vec<MatchResult>,
        caveats: Caveats,
    ) -> Self {
        let summary = Summary::from_results(&items);
        Self {
            generated_at: Utc::now(),
            archive_root: archive_root.into(),
            current_root: current_root.into(),
            total: items.len(),
            summary,
            caveats,
            items,
        }
    }

    /// Items of one category, in report order.
    pub fn items_in(&self, category: Category) -> impl Iterator<Item = &MatchResult> {
        self.items.iter().filter(move |item| item.category == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_stem() {
        assert_eq!(path_stem("components/Booking.vue"), "Booking");
        assert_eq!(path_stem("a/b/file.test.ts"), "file.test");
        assert_eq!(path_stem("a/.eslintrc"), ".eslintrc");
        assert_eq!(path_stem("Makefile"), "Makefile");
    }

    #[test]
    fn test_category_names() {
        assert_eq!(Category::CaseInsensitive.to_string(), "case-insensitive");
        assert_eq!(Category::BasenameSimilar.as_ref(), "basename-similar");
    }

    #[test]
    fn test_match_result_constructors_are_consistent() {
        let record = FileRecord::new("a/B.vue", 10);
        assert!(MatchResult::resolved(&record, Category::Exact, "a/B.vue").is_consistent());
        assert!(MatchResult::similar(&record, "c/B.vue", 0.5).is_consistent());
        assert!(MatchResult::missing(&record).is_consistent());
    }

    #[test]
    fn test_summary_lists_every_category() {
        let record = FileRecord::new("x.js", 1);
        let results = vec![MatchResult::missing(&record), MatchResult::missing(&record)];
        let summary = Summary::from_results(&results);

        assert_eq!(summary.iter().count(), 4);
        assert_eq!(summary.get(Category::Missing), 2);
        assert_eq!(summary.get(Category::Exact), 0);
        assert_eq!(summary.total(), 2);
    }
}
