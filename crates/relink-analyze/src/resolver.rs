//! Path-based resolution of archived files against the current tree.

use std::collections::{HashMap, HashSet};

use relink_core::{Category, FileRecord, ReconcileConfig, RenameRule};

/// Lookup tables over the current tree's files.
#[derive(Debug, Clone, Default)]
pub struct CurrentIndex {
    paths: HashSet<String>,
    lowercase: HashMap<String, String>,
    by_stem: HashMap<String, Vec<String>>,
}

impl CurrentIndex {
    /// Index a current-tree scan.
    ///
    /// Files are taken in sorted path order, so when two paths differ only
    /// by case, the lowercase lookup resolves to the one that sorts first,
    /// and stem candidates are listed in sorted order.
    pub fn new(files: &[FileRecord]) -> Self {
        let mut sorted: Vec<&str> = files.iter().map(|f| f.relative_path.as_str()).collect();
        sorted.sort_unstable();
        sorted.dedup();

        let mut index = Self::default();
        for path in sorted {
            index.paths.insert(path.to_string());
            index
                .lowercase
                .entry(path.to_lowercase())
                .or_insert_with(|| path.to_string());
            index
                .by_stem
                .entry(relink_core::path_stem(path).to_lowercase())
                .or_default()
                .push(path.to_string());
        }
        index
    }

    /// Whether the exact path exists.
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Correctly-cased path for a case-insensitive match.
    pub fn lookup_ignore_case(&self, path: &str) -> Option<&str> {
        self.lowercase.get(&path.to_lowercase()).map(String::as_str)
    }

    /// Current files sharing a base name (case-folded, extension stripped).
    pub fn same_stem(&self, stem: &str) -> &[String] {
        self.by_stem
            .get(&stem.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of indexed files.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// A path-based match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// `Exact` or `CaseInsensitive`.
    pub category: Category,
    /// Path in the current tree.
    pub target: String,
}

/// Resolves archived paths through the expected prefix and rename rules.
#[derive(Debug, Clone)]
pub struct PathResolver {
    config: ReconcileConfig,
}

impl PathResolver {
    /// Create a resolver from a run config.
    pub fn new(config: &ReconcileConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Candidate paths in the order they are tried.
    ///
    /// The first guess is the archived path under the target prefix; each
    /// rename rule that changes it adds one more guess.
    pub fn guesses(&self, archive_rel: &str) -> Vec<String> {
        let direct = self.config.expected_path(archive_rel);
        let renamed = self
            .config
            .rename_rules
            .iter()
            .filter_map(|rule: &RenameRule| rule.apply(&direct));

        let mut guesses = vec![direct.clone()];
        for guess in renamed {
            if !guesses.contains(&guess) {
                guesses.push(guess);
            }
        }
        guesses
    }

    /// Resolve an archived path, or `None` when no guess exists in any casing.
    ///
    /// For each guess in turn an exact hit wins over a case-insensitive one;
    /// an earlier guess wins over a later one.
    pub fn resolve(&self, archive_rel: &str, index: &CurrentIndex) -> Option<Resolution> {
        self.guesses(archive_rel).into_iter().find_map(|guess| {
            if index.contains(&guess) {
                return Some(Resolution {
                    category: Category::Exact,
                    target: guess,
                });
            }
            index
                .lookup_ignore_case(&guess)
                .map(|target| Resolution {
                    category: Category::CaseInsensitive,
                    target: target.to_string(),
                })
        })
    }
}
