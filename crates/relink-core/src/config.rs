//! Reconciliation configuration types.

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::RelinkError;

/// A legacy directory rename, applied segment-wise to candidate paths.
///
/// Every path segment equal to `from` (case-sensitive) is replaced by `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameRule {
    /// Segment name in the archived layout.
    pub from: String,
    /// Segment name in the current layout.
    pub to: String,
}

impl RenameRule {
    /// Create a new rename rule.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Parse a `FROM=TO` rule.
    pub fn parse(rule: &str) -> Result<Self, RelinkError> {
        let (from, to) = rule.split_once('=').ok_or_else(|| {
            RelinkError::invalid_config(format!("rename rule `{rule}` must look like FROM=TO"))
        })?;
        let rule = Self::new(from.trim(), to.trim());
        rule.validate()?;
        Ok(rule)
    }

    /// Apply the rule to a `/`-separated path.
    ///
    /// Returns `None` when no segment matched, so callers can skip guesses
    /// identical to ones already tried.
    pub fn apply(&self, path: &str) -> Option<String> {
        let mut changed = false;
        let rewritten: Vec<&str> = path
            .split('/')
            .map(|segment| {
                if segment == self.from {
                    changed = true;
                    self.to.as_str()
                } else {
                    segment
                }
            })
            .collect();

        changed.then(|| rewritten.join("/"))
    }

    fn validate(&self) -> Result<(), RelinkError> {
        for side in [&self.from, &self.to] {
            if side.is_empty() || side.contains(['/', '\\']) {
                return Err(RelinkError::invalid_config(format!(
                    "rename rule `{}={}` must name single path segments",
                    self.from, self.to
                )));
            }
        }
        Ok(())
    }
}

/// Content-similarity estimator used by the matcher.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SimilarityMode {
    /// Ratio over matching contiguous blocks, with popular-element junking.
    #[default]
    Ratio,
    /// Upper bound from multiset intersection; much cheaper on large files.
    Quick,
}

/// Configuration for a reconciliation run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ReconcileConfig {
    /// Root of the archived snapshot.
    #[serde(default)]
    pub archive_root: PathBuf,

    /// Root of the current tree.
    #[serde(default)]
    pub current_root: PathBuf,

    /// Prefix under which archived paths are expected in the current tree.
    #[builder(default)]
    #[serde(default)]
    pub target_prefix: String,

    /// Extensions to include, lowercase with leading dot.
    #[builder(default = "default_extensions()")]
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directory names whose subtrees are never visited.
    #[builder(default = "default_excluded_dirs()")]
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,

    /// Legacy renames tried after the direct guess, in order.
    #[builder(default = "default_rename_rules()")]
    #[serde(default = "default_rename_rules")]
    pub rename_rules: Vec<RenameRule>,

    /// Similarity estimator for same-named candidates.
    #[builder(default)]
    #[serde(default)]
    pub similarity: SimilarityMode,

    /// Number of worker threads (0 = auto-detect).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,
}

fn default_extensions() -> Vec<String> {
    [".vue", ".js", ".ts", ".tsx", ".css", ".scss", ".less"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_excluded_dirs() -> Vec<String> {
    [".git", "node_modules", "vendor", "storage"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_rename_rules() -> Vec<RenameRule> {
    vec![RenameRule::new("Components", "components")]
}

impl ReconcileConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        for (name, root) in [("Archive", &self.archive_root), ("Current", &self.current_root)] {
            match root {
                Some(root) if root.as_os_str().is_empty() => {
                    return Err(format!("{name} root cannot be empty"));
                }
                None => return Err(format!("{name} root is required")),
                _ => {}
            }
        }
        if let Some(extensions) = &self.extensions {
            check_extensions(extensions).map_err(|e| e.to_string())?;
        }
        if let Some(rules) = &self.rename_rules {
            for rule in rules {
                rule.validate().map_err(|e| e.to_string())?;
            }
        }
        Ok(())
    }
}

fn check_extensions(extensions: &[String]) -> Result<(), RelinkError> {
    if let Some(bad) = extensions.iter().find(|e| !e.starts_with('.') || e.len() < 2) {
        return Err(RelinkError::invalid_config(format!(
            "extension `{bad}` must start with a dot"
        )));
    }
    Ok(())
}

impl ReconcileConfig {
    /// Create a new config builder.
    pub fn builder() -> ReconcileConfigBuilder {
        ReconcileConfigBuilder::default()
    }

    /// Create a config for two roots with default settings.
    pub fn new(archive_root: impl Into<PathBuf>, current_root: impl Into<PathBuf>) -> Self {
        Self {
            archive_root: archive_root.into(),
            current_root: current_root.into(),
            target_prefix: String::new(),
            extensions: default_extensions(),
            excluded_dirs: default_excluded_dirs(),
            rename_rules: default_rename_rules(),
            similarity: SimilarityMode::default(),
            threads: 0,
        }
    }

    /// Load a config from a TOML file. Roots may be left out and set later.
    pub fn from_toml_file(path: &Path) -> Result<Self, RelinkError> {
        let content = std::fs::read_to_string(path).map_err(|e| RelinkError::io(path, e))?;
        let mut config: Self = toml::from_str(&content).map_err(|e| RelinkError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.normalize();
        Ok(config)
    }

    /// Lowercase extensions, trim the prefix and drop duplicates.
    pub fn normalize(&mut self) {
        for ext in &mut self.extensions {
            *ext = ext.to_lowercase();
        }
        self.extensions.sort();
        self.extensions.dedup();
        self.excluded_dirs.sort();
        self.excluded_dirs.dedup();
        self.target_prefix = self.target_prefix.trim_matches('/').to_string();
    }

    /// Check the config is complete enough to run.
    pub fn validate(&self) -> Result<(), RelinkError> {
        if self.archive_root.as_os_str().is_empty() {
            return Err(RelinkError::invalid_config("archive root is required"));
        }
        if self.current_root.as_os_str().is_empty() {
            return Err(RelinkError::invalid_config("current root is required"));
        }
        check_extensions(&self.extensions)?;
        for rule in &self.rename_rules {
            rule.validate()?;
        }
        Ok(())
    }

    /// Check whether a file name carries an allowed extension.
    pub fn allows_file(&self, name: &str) -> bool {
        let Some(dot) = name.rfind('.') else {
            return false;
        };
        if dot == 0 {
            return false;
        }
        let ext = name[dot..].to_lowercase();
        self.extensions.iter().any(|allowed| *allowed == ext)
    }

    /// Check whether a directory name is excluded.
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.excluded_dirs.iter().any(|excluded| excluded == name)
    }

    /// Re-root an archived relative path under the target prefix.
    pub fn expected_path(&self, archive_rel: &str) -> String {
        if self.target_prefix.is_empty() {
            archive_rel.to_string()
        } else {
            format!("{}/{archive_rel}", self.target_prefix)
        }
    }
}
