use docsync::error::SyncError;
use docsync::manifest::Manifest;
use docsync::model::FileStatus;
use docsync::reconcile::{reconcile, LocalRecord, RemoteRecord};
use docsync::rules::Rule;
use rstest::rstest;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_save_then_load_reproduces_rules() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("manifest.json");

    let mut manifest = Manifest::default();
    manifest.add_rule(Rule::directory_match("lib", "legacy"));
    manifest.add_rule(Rule::directory_match("web/src", ""));
    manifest.save(&path).unwrap();

    let loaded = Manifest::load(&path).unwrap();
    assert_eq!(loaded.rules, manifest.rules);
}

#[test]
fn test_saved_file_shape() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("manifest.json");

    let state = reconcile(
        &[LocalRecord::new("lib/a.py", "x"), LocalRecord::new("tools/b.py", "y")],
        &[RemoteRecord::new("legacy/a.py", "id-1", Some("x".to_string()))],
        &[Rule::directory_match("lib", "legacy")],
    );

    let mut manifest = Manifest::default();
    manifest.add_rule(Rule::directory_match("lib", "legacy"));
    manifest.refresh_snapshot(&state);
    manifest.save(&path).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "rules": [{"type": "directory_match", "source": "lib", "target": "legacy"}],
            "files": [
                {"path": "lib/a.py", "status": "synced"},
                {"path": "tools/b.py", "status": "local_only"}
            ],
            "additional_local_directories": ["tools"]
        })
    );
}

#[test]
fn test_save_replaces_previous_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("manifest.json");
    fs::write(&path, "old contents").unwrap();

    Manifest::default().save(&path).unwrap();

    let loaded = Manifest::load(&path).unwrap();
    assert!(loaded.rules.is_empty());
    // No temp files left next to the manifest
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[rstest]
#[case::not_json("{ rules: ")]
#[case::wrong_type(r#"{"rules": "lib"}"#)]
#[case::unknown_rule(r#"{"rules": [{"type": "glob", "pattern": "*"}]}"#)]
#[case::bad_status(r#"{"files": [{"path": "a.py", "status": "maybe"}]}"#)]
fn test_corrupt_manifests(#[case] contents: &str) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("manifest.json");
    fs::write(&path, contents).unwrap();

    match Manifest::load(&path) {
        Err(SyncError::ManifestCorrupt { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected ManifestCorrupt, got {other:?}"),
    }
}

#[test]
fn test_snapshot_statuses_deserialize() {
    let manifest: Manifest = serde_json::from_str(
        r#"{"files": [{"path": "a.py", "status": "partial_match"}, {"path": "b.py", "status": "out_of_sync"}]}"#,
    )
    .unwrap();

    assert_eq!(manifest.files[0].status, FileStatus::PartialMatch);
    assert_eq!(manifest.files[1].status, FileStatus::OutOfSync);
    assert!(manifest.rules.is_empty());
}
