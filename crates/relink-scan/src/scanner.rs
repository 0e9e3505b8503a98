//! JWalk-based parallel source tree scanner.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use jwalk::{Parallelism, WalkDir};
use tracing::{debug, warn};

use relink_core::{FileRecord, ReconcileConfig, RelinkError, ScanWarning, WarningKind};

/// Files found under one root, plus what could not be read.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Canonical root that was scanned.
    pub root: PathBuf,
    /// Matching files, sorted by relative path.
    pub files: Vec<FileRecord>,
    /// Non-fatal problems hit during traversal.
    pub warnings: Vec<ScanWarning>,
    /// Time spent walking the tree.
    pub duration: Duration,
}

impl ScanOutcome {
    /// Number of directories whose subtrees were left out.
    pub fn skipped_dirs(&self) -> usize {
        self.warnings.iter().filter(|w| w.is_skipped_dir()).count()
    }
}

/// Scanner applying an extension allow-list and excluded directory names.
pub struct TreeScanner {
    filters: ReconcileConfig,
    excluded_dirs: Arc<Vec<String>>,
    threads: usize,
}

impl TreeScanner {
    /// Create a scanner using the filters of a run config.
    pub fn from_config(config: &ReconcileConfig) -> Self {
        Self {
            filters: config.clone(),
            excluded_dirs: Arc::new(config.excluded_dirs.clone()),
            threads: config.threads,
        }
    }

    /// Scan `root` and return every allowed file under it.
    ///
    /// Unreadable directories are skipped and reported as warnings; only a
    /// missing or non-directory root is an error.
    pub fn scan(&self, root: &Path) -> Result<ScanOutcome, RelinkError> {
        let start = Instant::now();
        let root_path = root.canonicalize().map_err(|e| RelinkError::io(root, e))?;

        if !root_path.is_dir() {
            return Err(RelinkError::NotADirectory { path: root_path });
        }

        let parallelism = match self.threads {
            0 => Parallelism::RayonDefaultPool {
                busy_timeout: Duration::from_millis(100),
            },
            n => Parallelism::RayonNewPool(n),
        };

        let excluded = Arc::clone(&self.excluded_dirs);
        let walker = WalkDir::new(&root_path)
            .parallelism(parallelism)
            .skip_hidden(false)
            .follow_links(false)
            .sort(true)
            .process_read_dir(move |_depth, _path, _state, children| {
                // Pruning here keeps jwalk from ever descending into them.
                children.retain(|child| match child {
                    Ok(entry) => {
                        !(entry.file_type().is_dir()
                            && entry
                                .file_name()
                                .to_str()
                                .is_some_and(|name| excluded.iter().any(|x| x == name)))
                    }
                    Err(_) => true,
                });
            });

        let mut files = Vec::new();
        let mut warnings = Vec::new();
        let mut skipped: BTreeSet<PathBuf> = BTreeSet::new();

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                    if skipped.insert(path.clone()) {
                        warn!(path = %path.display(), error = %err, "skipping directory");
                        warnings.push(ScanWarning::skipped_dir(path, &err));
                    }
                    continue;
                }
            };

            if let Some(err) = &entry.read_children_error {
                let path = entry.path();
                if skipped.insert(path.clone()) {
                    warn!(path = %path.display(), error = %err, "skipping directory");
                    warnings.push(ScanWarning::skipped_dir(path, err));
                }
                continue;
            }

            let file_type = entry.file_type();
            if !file_type.is_file() && !file_type.is_symlink() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            if !self.filters.allows_file(&file_name) {
                continue;
            }

            let path = entry.path();
            let Some(relative) = relative_key(&root_path, &path) else {
                continue;
            };

            let metadata = if file_type.is_symlink() {
                // Links are followed for files only; linked directories are not walked.
                match std::fs::metadata(&path) {
                    Ok(metadata) if metadata.is_file() => Ok(metadata),
                    Ok(_) => continue,
                    Err(_) => {
                        let target = std::fs::read_link(&path)
                            .map(|p| p.to_string_lossy().to_string())
                            .unwrap_or_default();
                        warn!(path = %path.display(), target = %target, "broken symlink");
                        warnings.push(ScanWarning::broken_symlink(&path, &target));
                        continue;
                    }
                }
            } else {
                entry.metadata().map_err(|e| e.to_string())
            };

            let size = match metadata {
                Ok(metadata) => metadata.len(),
                Err(err) => {
                    warnings.push(ScanWarning::new(&path, err, WarningKind::MetadataError));
                    0
                }
            };

            files.push(FileRecord::new(relative, size));
        }

        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        let duration = start.elapsed();
        debug!(
            root = %root_path.display(),
            files = files.len(),
            skipped_dirs = skipped.len(),
            elapsed_ms = duration.as_millis() as u64,
            "scan finished"
        );

        Ok(ScanOutcome {
            root: root_path,
            files,
            warnings,
            duration,
        })
    }
}

/// `/`-joined path of `path` relative to `root`.
fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments: Vec<_> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect();

    (!segments.is_empty()).then(|| segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join("components/ui")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::create_dir_all(root.join("pages")).unwrap();

        fs::write(root.join("components/ui/Button.vue"), "<template/>").unwrap();
        fs::write(root.join("components/Card.VUE"), "<template/>").unwrap();
        fs::write(root.join("pages/index.ts"), "export {}").unwrap();
        fs::write(root.join("pages/notes.md"), "# notes").unwrap();
        fs::write(root.join("node_modules/pkg/index.js"), "module.exports = 1").unwrap();

        temp
    }

    fn scan(root: &Path) -> ScanOutcome {
        let config = ReconcileConfig::new(root, root);
        TreeScanner::from_config(&config).scan(root).unwrap()
    }

    #[test]
    fn test_basic_scan() {
        let temp = create_test_tree();
        let outcome = scan(temp.path());

        let paths: Vec<&str> = outcome.files.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["components/Card.VUE", "components/ui/Button.vue", "pages/index.ts"]
        );
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_sizes_recorded() {
        let temp = create_test_tree();
        let outcome = scan(temp.path());

        let index = outcome
            .files
            .iter()
            .find(|f| f.relative_path == "pages/index.ts")
            .unwrap();
        assert_eq!(index.size_bytes, "export {}".len() as u64);
    }

    #[test]
    fn test_excluded_dirs_pruned_at_any_depth() {
        let temp = create_test_tree();
        fs::create_dir_all(temp.path().join("pages/nested/vendor")).unwrap();
        fs::write(temp.path().join("pages/nested/vendor/lib.js"), "x").unwrap();

        let outcome = scan(temp.path());
        assert!(!outcome.files.iter().any(|f| f.relative_path.contains("vendor")));
        assert!(!outcome.files.iter().any(|f| f.relative_path.contains("node_modules")));
    }

    #[test]
    fn test_missing_root_is_error() {
        let temp = TempDir::new().unwrap();
        let config = ReconcileConfig::new(temp.path(), temp.path());
        let result = TreeScanner::from_config(&config).scan(&temp.path().join("nope"));
        assert!(matches!(result, Err(RelinkError::NotFound { .. })));
    }

    #[test]
    fn test_file_root_is_error() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.js");
        fs::write(&file, "x").unwrap();

        let config = ReconcileConfig::new(temp.path(), temp.path());
        let result = TreeScanner::from_config(&config).scan(&file);
        assert!(matches!(result, Err(RelinkError::NotADirectory { .. })));
    }

    #[test]
    fn test_relative_key() {
        let root = Path::new("/tmp/root");
        assert_eq!(
            relative_key(root, Path::new("/tmp/root/a/b.vue")).as_deref(),
            Some("a/b.vue")
        );
        assert_eq!(relative_key(root, root), None);
        assert_eq!(relative_key(root, Path::new("/elsewhere/x.js")), None);
    }
}
