use relink_core::{
    Category, Caveats, FileRecord, MatchResult, ReconcileConfig, ReconciliationReport,
    RenameRule, SimilarityMode,
};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_from_toml_partial() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("relink.toml");
    fs::write(
        &path,
        r#"
archive_root = "/snapshots/2025-08-25"
target_prefix = "resources/js/"
extensions = [".VUE", ".ts", ".vue"]
similarity = "quick"

[[rename_rules]]
from = "Components"
to = "components"

[[rename_rules]]
from = "Pages"
to = "pages"
"#,
    )
    .unwrap();

    let config = ReconcileConfig::from_toml_file(&path).unwrap();

    assert_eq!(config.archive_root.to_str(), Some("/snapshots/2025-08-25"));
    assert!(config.current_root.as_os_str().is_empty());
    assert_eq!(config.target_prefix, "resources/js");
    assert_eq!(config.extensions, vec![".ts".to_string(), ".vue".to_string()]);
    assert_eq!(config.similarity, SimilarityMode::Quick);
    assert_eq!(config.rename_rules.len(), 2);
    assert_eq!(config.rename_rules[1], RenameRule::new("Pages", "pages"));
    // Not given in the file, so defaults apply.
    assert!(config.is_excluded_dir("node_modules"));

    // Current root still missing.
    assert!(config.validate().is_err());
}

#[test]
fn test_config_from_invalid_toml() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.toml");
    fs::write(&path, "extensions = 42").unwrap();

    let err = ReconcileConfig::from_toml_file(&path).unwrap_err();
    assert!(matches!(err, relink_core::RelinkError::ConfigParse { .. }));
}

#[test]
fn test_config_from_missing_file() {
    let err = ReconcileConfig::from_toml_file(std::path::Path::new("/definitely/not/here.toml"))
        .unwrap_err();
    assert!(matches!(err, relink_core::RelinkError::NotFound { .. }));
}

#[test]
fn test_report_json_shape() {
    let booking = FileRecord::new("components/Booking.vue", 500);
    let format = FileRecord::new("utils/formatDate.js", 120);
    let legacy = FileRecord::new("legacy/Old.vue", 42);

    let items = vec![
        MatchResult::resolved(&booking, Category::CaseInsensitive, "components/booking.vue"),
        MatchResult::similar(&format, "helpers/formatDate.js", 0.875),
        MatchResult::missing(&legacy),
    ];
    let report = ReconciliationReport::new("/archive", "/current", items, Caveats::default());

    assert_eq!(report.total, 3);
    assert_eq!(report.summary.total(), report.total);

    // Summary keys keep the fixed category order.
    let text = serde_json::to_string(&report).unwrap();
    let positions: Vec<usize> = ["\"exact\"", "\"case-insensitive\"", "\"basename-similar\"", "\"missing\""]
        .iter()
        .map(|key| text.find(key).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));

    let json: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(json["summary"].as_object().unwrap().len(), 4);
    assert_eq!(json["summary"]["missing"], 1);
    assert_eq!(json["items"][0]["category"], "case-insensitive");
    assert_eq!(json["items"][1]["similarity"], 0.875);
    assert!(json["items"][2]["target_rel"].is_null());
    assert_eq!(json["caveats"]["archive_skipped_dirs"], 0);
}

#[test]
fn test_similarity_is_clamped() {
    let record = FileRecord::new("a.js", 1);
    let result = MatchResult::similar(&record, "b/a.js", 1.5);
    assert_eq!(result.similarity, Some(1.0));
}
