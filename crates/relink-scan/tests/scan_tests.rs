use relink_scan::{ReconcileConfig, TreeScanner, WarningKind, read_text};
use std::fs;
use tempfile::TempDir;

fn config_for(root: &std::path::Path) -> ReconcileConfig {
    ReconcileConfig::new(root, root)
}

#[test]
fn test_custom_extensions_and_exclusions() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("src/generated")).unwrap();
    fs::write(root.join("src/app.ts"), "let a = 1;").unwrap();
    fs::write(root.join("src/app.vue"), "<template/>").unwrap();
    fs::write(root.join("src/generated/schema.ts"), "export type X = 1;").unwrap();

    let config = ReconcileConfig::builder()
        .archive_root(root)
        .current_root(root)
        .extensions(vec![".ts".to_string()])
        .excluded_dirs(vec!["generated".to_string()])
        .build()
        .unwrap();

    let outcome = TreeScanner::from_config(&config).scan(root).unwrap();
    let paths: Vec<&str> = outcome.files.iter().map(|f| f.relative_path.as_str()).collect();
    assert_eq!(paths, vec!["src/app.ts"]);
}

#[test]
fn test_hidden_files_are_scanned() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join(".storybook")).unwrap();
    fs::write(temp.path().join(".storybook/main.js"), "module.exports = {}").unwrap();

    let outcome = TreeScanner::from_config(&config_for(temp.path()))
        .scan(temp.path())
        .unwrap();
    assert_eq!(outcome.files.len(), 1);
    assert_eq!(outcome.files[0].relative_path, ".storybook/main.js");
}

#[test]
fn test_scan_is_deterministic() {
    let temp = TempDir::new().unwrap();
    for dir in ["b", "a", "c/d"] {
        fs::create_dir_all(temp.path().join(dir)).unwrap();
        fs::write(temp.path().join(dir).join("x.js"), dir).unwrap();
    }

    let scanner = TreeScanner::from_config(&config_for(temp.path()));
    let first = scanner.scan(temp.path()).unwrap();
    let second = scanner.scan(temp.path()).unwrap();
    assert_eq!(first.files, second.files);
    assert_eq!(first.files[0].relative_path, "a/x.js");
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let locked = temp.path().join("locked");
    fs::create_dir_all(&locked).unwrap();
    fs::write(locked.join("secret.js"), "x").unwrap();
    fs::write(temp.path().join("open.js"), "y").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can read the directory anyway.
    let still_readable = fs::read_dir(&locked).is_ok();

    let outcome = TreeScanner::from_config(&config_for(temp.path()))
        .scan(temp.path())
        .unwrap();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(outcome.files.iter().any(|f| f.relative_path == "open.js"));
    if !still_readable {
        assert!(!outcome.files.iter().any(|f| f.relative_path == "locked/secret.js"));
        assert!(outcome.skipped_dirs() >= 1);
    }
}

#[cfg(unix)]
#[test]
fn test_symlinked_file_is_scanned() {
    use std::os::unix::fs::symlink;

    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("shared")).unwrap();
    fs::create_dir_all(root.join("components")).unwrap();
    fs::write(root.join("shared/Button.vue"), "<button/>").unwrap();
    symlink(root.join("shared/Button.vue"), root.join("components/Button.vue")).unwrap();

    let outcome = TreeScanner::from_config(&config_for(root)).scan(root).unwrap();
    let paths: Vec<&str> = outcome.files.iter().map(|f| f.relative_path.as_str()).collect();
    assert_eq!(paths, vec!["components/Button.vue", "shared/Button.vue"]);
    assert_eq!(outcome.files[0].size_bytes, "<button/>".len() as u64);
    assert!(outcome.warnings.is_empty());
    assert_eq!(
        read_text(&outcome.root.join("components/Button.vue")),
        "<button/>"
    );
}

#[cfg(unix)]
#[test]
fn test_broken_symlink_is_reported() {
    use std::os::unix::fs::symlink;

    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("components")).unwrap();
    symlink(root.join("gone/Card.vue"), root.join("components/Card.vue")).unwrap();

    let outcome = TreeScanner::from_config(&config_for(root)).scan(root).unwrap();
    assert!(outcome.files.is_empty());
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].kind, WarningKind::BrokenSymlink);
    assert_eq!(outcome.skipped_dirs(), 0);
}

#[cfg(unix)]
#[test]
fn test_symlinked_directory_is_not_walked() {
    use std::os::unix::fs::symlink;

    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("real")).unwrap();
    fs::write(root.join("real/app.js"), "x").unwrap();
    symlink(root.join("real"), root.join("alias.js")).unwrap();

    let outcome = TreeScanner::from_config(&config_for(root)).scan(root).unwrap();
    let paths: Vec<&str> = outcome.files.iter().map(|f| f.relative_path.as_str()).collect();
    assert_eq!(paths, vec!["real/app.js"]);
    assert!(outcome.warnings.is_empty());
}

#[test]
fn test_read_text_roundtrip_with_scan() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("main.js"), "console.log('hi')").unwrap();

    let outcome = TreeScanner::from_config(&config_for(temp.path()))
        .scan(temp.path())
        .unwrap();
    let file = &outcome.files[0];
    assert_eq!(read_text(&outcome.root.join(&file.relative_path)), "console.log('hi')");
}
