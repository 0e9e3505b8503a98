//! Content-similarity fallback among same-named current files.

use std::path::{Path, PathBuf};

use relink_core::{SimilarityMode, path_stem};
use relink_scan::read_text;

use crate::resolver::CurrentIndex;
use crate::similarity::text_similarity;

/// Best same-named candidate for an archived file.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarMatch {
    /// Winning current-tree path.
    pub target: String,
    /// Score of the winner. `0.0` with unreadable archived content means
    /// "unverified", not "dissimilar".
    pub score: f64,
}

/// Scores same-named current files against an archived file's content.
#[derive(Debug, Clone)]
pub struct SimilarityMatcher {
    current_root: PathBuf,
    mode: SimilarityMode,
}

impl SimilarityMatcher {
    /// Create a matcher reading candidates from `current_root`.
    pub fn new(current_root: impl Into<PathBuf>, mode: SimilarityMode) -> Self {
        Self {
            current_root: current_root.into(),
            mode,
        }
    }

    /// Same-named current files for an archived path, in sorted order.
    pub fn candidates<'i>(&self, archive_rel: &str, index: &'i CurrentIndex) -> &'i [String] {
        index.same_stem(path_stem(archive_rel))
    }

    /// Find the most similar same-named file, reading the archived copy from disk.
    pub fn match_by_similarity(
        &self,
        archive_file: &Path,
        archive_rel: &str,
        index: &CurrentIndex,
    ) -> Option<SimilarMatch> {
        let candidates = self.candidates(archive_rel, index);
        if candidates.is_empty() {
            return None;
        }
        let archived = read_text(archive_file);
        self.best_candidate(&archived, candidates, |rel| {
            read_text(&self.current_root.join(rel))
        })
    }

    /// Pick the highest-scoring candidate.
    ///
    /// Empty archived content links to the first candidate with score `0.0`.
    /// Otherwise only a strictly higher score replaces the current best, so
    /// ties keep the earlier candidate.
    pub fn best_candidate<F>(
        &self,
        archived: &str,
        candidates: &[String],
        mut load: F,
    ) -> Option<SimilarMatch>
    where
        F: FnMut(&str) -> String,
    {
        let first = candidates.first()?;
        if archived.is_empty() {
            return Some(SimilarMatch {
                target: first.clone(),
                score: 0.0,
            });
        }

        let mut best: Option<SimilarMatch> = None;
        for candidate in candidates {
            let score = text_similarity(self.mode, archived, &load(candidate));
            if best.as_ref().is_none_or(|b| score > b.score) {
                best = Some(SimilarMatch {
                    target: candidate.clone(),
                    score,
                });
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn matcher() -> SimilarityMatcher {
        SimilarityMatcher::new("/unused", SimilarityMode::Ratio)
    }

    fn names(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_no_candidates() {
        assert!(matcher().best_candidate("x", &[], |_| String::new()).is_none());
    }

    #[test]
    fn test_empty_archive_content_takes_first() {
        let candidates = names(&["a/Card.vue", "b/Card.vue"]);
        let m = matcher()
            .best_candidate("", &candidates, |_| "anything".to_string())
            .unwrap();
        assert_eq!(m.target, "a/Card.vue");
        assert_eq!(m.score, 0.0);
    }

    #[test]
    fn test_highest_score_wins() {
        let contents: HashMap<&str, &str> = [
            ("helpers/formatDate.js", "export const formatDate = () => 'unrelated';"),
            ("legacy/formatDate.js", "export function formatDate(d) { return d.toISOString(); }"),
        ]
        .into_iter()
        .collect();
        let candidates = names(&["helpers/formatDate.js", "legacy/formatDate.js"]);

        let m = matcher()
            .best_candidate(
                "export function formatDate(d) { return d.toISOString(); }",
                &candidates,
                |rel| contents[rel].to_string(),
            )
            .unwrap();
        assert_eq!(m.target, "legacy/formatDate.js");
        assert_eq!(m.score, 1.0);
    }

    #[test]
    fn test_ties_keep_first() {
        let candidates = names(&["a/x.js", "b/x.js"]);
        let m = matcher()
            .best_candidate("same", &candidates, |_| "same".to_string())
            .unwrap();
        assert_eq!(m.target, "a/x.js");
    }

    #[test]
    fn test_all_zero_scores_keep_first() {
        let candidates = names(&["a/x.js", "b/x.js"]);
        let m = matcher()
            .best_candidate("abc", &candidates, |_| String::new())
            .unwrap();
        assert_eq!(m.target, "a/x.js");
        assert_eq!(m.score, 0.0);
    }
}
