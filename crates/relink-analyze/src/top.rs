//! Largest-files variant with a coarse purpose annotation.

use derive_builder::Builder;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use relink_core::{Category, FileRecord, MatchResult, RelinkError, path_stem};

use crate::engine::{Reconciler, ScannedTrees};
use crate::resolver::CurrentIndex;

const DEFAULT_LIMIT: usize = 20;
const DEFAULT_MAX_CANDIDATES: usize = 3;

/// Configuration for the top-N run.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct TopConfig {
    /// Number of archived files to report.
    #[builder(default = "DEFAULT_LIMIT")]
    pub limit: usize,

    /// Maximum same-named candidates listed per entry.
    #[builder(default = "DEFAULT_MAX_CANDIDATES")]
    pub max_candidates: usize,
}

impl Default for TopConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }
}

impl TopConfig {
    /// Create a new config builder.
    pub fn builder() -> TopConfigBuilder {
        TopConfigBuilder::default()
    }
}

/// One of the largest archived files, with its resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopFileEntry {
    /// 1-based position by size.
    pub rank: usize,
    /// Archived path.
    pub archive_rel: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Size in binary units, e.g. `12.5 KiB`.
    pub size_human: String,
    /// Guessed role of the file.
    pub purpose: String,
    /// Outcome category.
    pub category: Category,
    /// Current-tree path, if any.
    pub target_rel: Option<String>,
    /// Similarity score for `basename-similar`.
    pub similarity: Option<f64>,
    /// Same-named current files, sorted, at most `max_candidates`.
    pub candidates: Vec<String>,
}

/// Guess what a file is for from its directories and extension.
///
/// Directory names are compared case-insensitively; the first recognised
/// segment from the root wins.
pub fn infer_purpose(path: &str) -> &'static str {
    let mut segments = path.split('/').collect_vec();
    segments.pop();

    for segment in segments {
        match segment.to_lowercase().as_str() {
            "pages" => return "page",
            "components" => return "UI component",
            "features" => return "feature module",
            "entities" => return "entity/UI",
            _ => {}
        }
    }

    let ext = path
        .rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "vue" => "Vue component",
        "tsx" => "TSX component",
        "ts" => "TypeScript module",
        "js" => "JavaScript module",
        "css" | "scss" | "less" => "stylesheet",
        _ => "file",
    }
}

/// The `limit` largest records, biggest first; equal sizes keep input order.
pub fn largest(files: &[FileRecord], limit: usize) -> Vec<FileRecord> {
    files
        .iter()
        .sorted_by(|a, b| b.size_bytes.cmp(&a.size_bytes))
        .take(limit)
        .cloned()
        .collect()
}

impl Reconciler {
    /// Scan both trees and resolve the largest archived files.
    pub fn run_top(&self, top: &TopConfig) -> Result<Vec<TopFileEntry>, RelinkError> {
        let trees = self.scan()?;
        Ok(self.top_files(&trees, top, |_| {}))
    }

    /// Resolve the largest archived files of already-scanned trees.
    pub fn top_files<F>(
        &self,
        trees: &ScannedTrees,
        top: &TopConfig,
        on_item: F,
    ) -> Vec<TopFileEntry>
    where
        F: Fn(&MatchResult) + Sync,
    {
        let selected = largest(&trees.archive.files, top.limit);
        let index = CurrentIndex::new(&trees.current.files);
        let results =
            self.reconcile_indexed(&trees.archive, &trees.current, &index, &selected, on_item);

        results
            .into_iter()
            .enumerate()
            .map(|(i, result)| {
                let candidates = index
                    .same_stem(path_stem(&result.archive_rel))
                    .iter()
                    .take(top.max_candidates)
                    .cloned()
                    .collect();

                TopFileEntry {
                    rank: i + 1,
                    size_human: humansize::format_size(result.size_bytes, humansize::BINARY),
                    purpose: infer_purpose(&result.archive_rel).to_string(),
                    archive_rel: result.archive_rel,
                    size_bytes: result.size_bytes,
                    category: result.category,
                    target_rel: result.target_rel,
                    similarity: result.similarity,
                    candidates,
                }
            })
            .collect()
    }
}
