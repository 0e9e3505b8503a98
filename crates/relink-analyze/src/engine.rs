//! The reconciliation engine: scan, resolve, match, classify.

use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use relink_core::{
    Category, Caveats, FileRecord, MatchResult, ReconcileConfig, ReconciliationReport,
    RelinkError,
};
use relink_scan::{ScanOutcome, TreeScanner};

use crate::matcher::{SimilarMatch, SimilarityMatcher};
use crate::resolver::{CurrentIndex, PathResolver, Resolution};

/// Both trees of a run, scanned.
#[derive(Debug, Clone)]
pub struct ScannedTrees {
    /// Archive scan.
    pub archive: ScanOutcome,
    /// Current-tree scan.
    pub current: ScanOutcome,
}

impl ScannedTrees {
    /// Skipped-directory counts for the report.
    pub fn caveats(&self) -> Caveats {
        Caveats {
            archive_skipped_dirs: self.archive.skipped_dirs(),
            current_skipped_dirs: self.current.skipped_dirs(),
        }
    }
}

/// Combine the resolver and matcher outcomes into one result.
pub fn classify(
    record: &FileRecord,
    resolution: Option<Resolution>,
    similar: Option<SimilarMatch>,
) -> MatchResult {
    match (resolution, similar) {
        (Some(res), _) => MatchResult::resolved(record, res.category, res.target),
        (None, Some(m)) => MatchResult::similar(record, m.target, m.score),
        (None, None) => MatchResult::missing(record),
    }
}

/// Runs a full reconciliation for one config.
pub struct Reconciler {
    config: ReconcileConfig,
    resolver: PathResolver,
}

impl Reconciler {
    /// Create a reconciler. The config is validated here.
    pub fn new(mut config: ReconcileConfig) -> Result<Self, RelinkError> {
        config.normalize();
        config.validate()?;
        let resolver = PathResolver::new(&config);
        Ok(Self { config, resolver })
    }

    /// The normalized config in use.
    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Scan both roots.
    pub fn scan(&self) -> Result<ScannedTrees, RelinkError> {
        let scanner = TreeScanner::from_config(&self.config);

        let archive = scanner.scan(&self.config.archive_root)?;
        info!(
            root = %archive.root.display(),
            files = archive.files.len(),
            skipped_dirs = archive.skipped_dirs(),
            "scanned archive tree"
        );

        let current = scanner.scan(&self.config.current_root)?;
        info!(
            root = %current.root.display(),
            files = current.files.len(),
            skipped_dirs = current.skipped_dirs(),
            "scanned current tree"
        );

        Ok(ScannedTrees { archive, current })
    }

    /// Scan both trees and reconcile every archived file.
    pub fn run(&self) -> Result<ReconciliationReport, RelinkError> {
        let trees = self.scan()?;
        Ok(self.report(&trees, |_| {}))
    }

    /// Reconcile every archived file of already-scanned trees.
    ///
    /// `on_item` is called once per finished file, from worker threads.
    pub fn report<F>(&self, trees: &ScannedTrees, on_item: F) -> ReconciliationReport
    where
        F: Fn(&MatchResult) + Sync,
    {
        let items = self.reconcile_files(
            &trees.archive,
            &trees.current,
            &trees.archive.files,
            on_item,
        );
        let report = ReconciliationReport::new(
            &trees.archive.root,
            &trees.current.root,
            items,
            trees.caveats(),
        );

        info!(
            total = report.total,
            exact = report.summary.get(Category::Exact),
            case_insensitive = report.summary.get(Category::CaseInsensitive),
            basename_similar = report.summary.get(Category::BasenameSimilar),
            missing = report.summary.get(Category::Missing),
            "reconciliation finished"
        );
        report
    }

    /// Reconcile a chosen subset of archived files.
    ///
    /// Results come back in the order of `records`, whatever order the
    /// workers finish in.
    pub fn reconcile_files<F>(
        &self,
        archive: &ScanOutcome,
        current: &ScanOutcome,
        records: &[FileRecord],
        on_item: F,
    ) -> Vec<MatchResult>
    where
        F: Fn(&MatchResult) + Sync,
    {
        let index = CurrentIndex::new(&current.files);
        self.reconcile_indexed(archive, current, &index, records, on_item)
    }

    /// Reconcile `records` against a prebuilt index of `current`.
    pub(crate) fn reconcile_indexed<F>(
        &self,
        archive: &ScanOutcome,
        current: &ScanOutcome,
        index: &CurrentIndex,
        records: &[FileRecord],
        on_item: F,
    ) -> Vec<MatchResult>
    where
        F: Fn(&MatchResult) + Sync,
    {
        let matcher = SimilarityMatcher::new(&current.root, self.config.similarity);

        let work = || {
            records
                .par_iter()
                .map(|record| {
                    let result = self.reconcile_one(&archive.root, record, index, &matcher);
                    on_item(&result);
                    result
                })
                .collect::<Vec<_>>()
        };

        match self.thread_pool() {
            Some(pool) => pool.install(work),
            None => work(),
        }
    }

    /// Resolve one archived file; the matcher only runs when no path matches.
    pub fn reconcile_one(
        &self,
        archive_root: &Path,
        record: &FileRecord,
        index: &CurrentIndex,
        matcher: &SimilarityMatcher,
    ) -> MatchResult {
        let resolution = self.resolver.resolve(&record.relative_path, index);
        let similar = match resolution {
            Some(_) => None,
            None => matcher.match_by_similarity(
                &archive_root.join(&record.relative_path),
                &record.relative_path,
                index,
            ),
        };

        let result = classify(record, resolution, similar);
        debug!(
            archive = %result.archive_rel,
            category = %result.category,
            target = result.target_rel.as_deref().unwrap_or(""),
            "resolved"
        );
        result
    }

    fn thread_pool(&self) -> Option<rayon::ThreadPool> {
        if self.config.threads == 0 {
            return None;
        }
        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()
        {
            Ok(pool) => Some(pool),
            Err(err) => {
                warn!(error = %err, "falling back to the global thread pool");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_prefers_resolution() {
        let record = FileRecord::new("a/B.vue", 5);
        let result = classify(
            &record,
            Some(Resolution {
                category: Category::Exact,
                target: "a/B.vue".to_string(),
            }),
            Some(SimilarMatch {
                target: "z/B.vue".to_string(),
                score: 1.0,
            }),
        );
        assert_eq!(result.category, Category::Exact);
        assert_eq!(result.target_rel.as_deref(), Some("a/B.vue"));
        assert_eq!(result.similarity, None);
    }

    #[test]
    fn test_classify_similar_and_missing() {
        let record = FileRecord::new("a/B.vue", 5);

        let similar = classify(
            &record,
            None,
            Some(SimilarMatch {
                target: "z/B.vue".to_string(),
                score: 0.25,
            }),
        );
        assert_eq!(similar.category, Category::BasenameSimilar);
        assert_eq!(similar.similarity, Some(0.25));

        let missing = classify(&record, None, None);
        assert_eq!(missing.category, Category::Missing);
        assert!(missing.target_rel.is_none());
        assert!(missing.is_consistent());
    }

    #[test]
    fn test_new_rejects_incomplete_config() {
        let config = ReconcileConfig::new("", "/current");
        assert!(Reconciler::new(config).is_err());
    }
}
