//! Reconciliation scenarios and properties.
//!
//! Inputs are built directly as records, so these tests never touch the
//! filesystem or a transport.

use docsync::model::{FileKey, FileStatus};
use docsync::reconcile::{reconcile, LocalRecord, RemoteRecord, SyncState};
use docsync::rules::Rule;
use rstest::rstest;
use std::collections::BTreeSet;

fn local(path: &str, contents: &str) -> LocalRecord {
    LocalRecord::new(path, contents)
}

fn remote(path: &str, id: &str, contents: &str) -> RemoteRecord {
    RemoteRecord::new(path, id, Some(contents.to_string()))
}

fn status_of(state: &SyncState, key: FileKey) -> FileStatus {
    state
        .get(&key)
        .unwrap_or_else(|| panic!("missing {key:?}"))
        .status
}

fn local_key(path: &str) -> FileKey {
    FileKey::Local(path.to_string())
}

fn remote_key(path: &str) -> FileKey {
    FileKey::Remote(path.to_string())
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_local_only_file() {
    let state = reconcile(&[local("src/a.py", "x")], &[], &[]);

    assert_eq!(state.len(), 1);
    assert_eq!(status_of(&state, local_key("src/a.py")), FileStatus::LocalOnly);
}

#[test]
fn test_identical_pair_is_synced() {
    let state = reconcile(
        &[local("src/a.py", "print(1)")],
        &[remote("src/a.py", "id-1", "print(1)")],
        &[],
    );

    let entry = state.get(&local_key("src/a.py")).unwrap();
    assert_eq!(entry.status, FileStatus::Synced);
    assert_eq!(entry.remote_id.as_deref(), Some("id-1"));
    assert!(entry.is_fully_synced());
}

#[test]
fn test_same_name_different_directory_is_partial_match() {
    let state = reconcile(
        &[local("lib/util.py", "x")],
        &[remote("legacy/util.py", "id-1", "x")],
        &[],
    );

    let local_entry = state.get(&local_key("lib/util.py")).unwrap();
    let remote_entry = state.get(&remote_key("legacy/util.py")).unwrap();

    assert_eq!(local_entry.status, FileStatus::PartialMatch);
    assert_eq!(remote_entry.status, FileStatus::PartialMatch);
    assert_eq!(local_entry.counterpart, Some(remote_key("legacy/util.py")));
    assert_eq!(remote_entry.counterpart, Some(local_key("lib/util.py")));
    assert!(local_entry.remote_id.is_none());
    assert!(remote_entry.local_path.is_empty());
}

#[rstest]
#[case::same_contents("x", "x", FileStatus::Synced)]
#[case::different_contents("x", "y", FileStatus::OutOfSync)]
fn test_rule_pairs_renamed_directory(
    #[case] local_contents: &str,
    #[case] remote_contents: &str,
    #[case] expected: FileStatus,
) {
    let state = reconcile(
        &[local("lib/util.py", local_contents)],
        &[remote("legacy/util.py", "id-1", remote_contents)],
        &[Rule::directory_match("lib", "legacy")],
    );

    assert_eq!(state.len(), 1);
    let entry = state.get(&local_key("lib/util.py")).unwrap();
    assert_eq!(entry.status, expected);
    assert_eq!(entry.remote_path, "legacy/util.py");
    assert!(entry.counterpart.is_none());
}

#[rstest]
#[case::nested("src/components/Header.tsx", "components/Header.tsx")]
#[case::root("app.ts", "web/app.ts")]
fn test_partial_match_on_file_name(#[case] local_path: &str, #[case] remote_path: &str) {
    let state = reconcile(&[local(local_path, "x")], &[remote(remote_path, "id", "x")], &[]);

    assert_eq!(status_of(&state, local_key(local_path)), FileStatus::PartialMatch);
    assert_eq!(status_of(&state, remote_key(remote_path)), FileStatus::PartialMatch);
}

#[test]
fn test_file_name_must_match_whole_segment() {
    let state = reconcile(
        &[local("src/util.py", "x")],
        &[remote("old/myutil.py", "id", "x")],
        &[],
    );

    assert_eq!(status_of(&state, local_key("src/util.py")), FileStatus::LocalOnly);
    assert_eq!(status_of(&state, remote_key("old/myutil.py")), FileStatus::RemoteOnly);
}

#[test]
fn test_rule_pairing_wins_over_verbatim_path() {
    // The rule claims lib/a.py -> legacy/a.py, so the remote lib/a.py stays unpaired
    let state = reconcile(
        &[local("lib/a.py", "x")],
        &[remote("legacy/a.py", "id-1", "x"), remote("lib/a.py", "id-2", "x")],
        &[Rule::directory_match("lib", "legacy")],
    );

    let entry = state.get(&local_key("lib/a.py")).unwrap();
    assert_eq!(entry.remote_id.as_deref(), Some("id-1"));
    assert_eq!(status_of(&state, remote_key("lib/a.py")), FileStatus::RemoteOnly);
}

#[test]
fn test_metadata_only_listing_is_out_of_sync() {
    let state = reconcile(
        &[local("a.py", "x")],
        &[RemoteRecord::new("a.py", "id", None)],
        &[],
    );

    assert_eq!(status_of(&state, local_key("a.py")), FileStatus::OutOfSync);
}

// =============================================================================
// Properties
// =============================================================================

fn mixed_inputs() -> (Vec<LocalRecord>, Vec<RemoteRecord>) {
    let local = vec![
        local("src/a.py", "a"),
        local("src/b.py", "b"),
        local("lib/util.py", "u"),
        local("web/app.ts", "app"),
        local("only/here.js", "h"),
    ];
    let remote = vec![
        remote("src/a.py", "1", "a"),
        remote("src/b.py", "2", "changed"),
        remote("legacy/util.py", "3", "u"),
        remote("docs/readme.py", "4", "r"),
        remote("frontend/app.ts", "5", "app"),
    ];
    (local, remote)
}

#[test]
fn test_every_path_lands_in_exactly_one_bucket() {
    let (local, remote) = mixed_inputs();
    let state = reconcile(&local, &remote, &[]);

    let mut local_seen = BTreeSet::new();
    let mut remote_seen = BTreeSet::new();
    for entry in state.files() {
        assert_ne!(entry.status, FileStatus::Removed);
        if entry.has_local_path() {
            assert!(local_seen.insert(entry.local_path.clone()), "{} twice", entry.local_path);
        }
        if entry.remote_present() {
            assert!(remote_seen.insert(entry.remote_path.clone()), "{} twice", entry.remote_path);
        }
    }

    let local_paths: BTreeSet<String> = local.iter().map(|r| r.path.clone()).collect();
    let remote_paths: BTreeSet<String> = remote.iter().map(|r| r.path.clone()).collect();
    assert_eq!(local_seen, local_paths);
    assert_eq!(remote_seen, remote_paths);

    let counts = state.counts();
    assert_eq!(counts.synced, 1);
    assert_eq!(counts.out_of_sync, 1);
    assert_eq!(counts.partial_match, 4);
    assert_eq!(counts.local_only, 1);
    assert_eq!(counts.remote_only, 1);
}

#[test]
fn test_reconcile_is_idempotent() {
    let (local, remote) = mixed_inputs();
    let rules = vec![Rule::directory_match("lib", "legacy")];

    assert_eq!(reconcile(&local, &remote, &rules), reconcile(&local, &remote, &rules));
}

#[test]
fn test_input_order_does_not_matter() {
    let (mut local, mut remote) = mixed_inputs();
    let expected = reconcile(&local, &remote, &[]);

    local.reverse();
    remote.reverse();
    assert_eq!(reconcile(&local, &remote, &[]), expected);
}

#[test]
fn test_partial_matches_are_symmetric() {
    let (local, remote) = mixed_inputs();
    let state = reconcile(&local, &remote, &[]);

    for entry in state.with_status(FileStatus::PartialMatch) {
        let other_key = entry.counterpart.clone().expect("partial match without counterpart");
        let other = state.get(&other_key).unwrap();
        assert_eq!(other.status, FileStatus::PartialMatch);
        assert_eq!(other.counterpart, Some(entry.key()));
    }

    let pairs: Vec<(String, String)> = state
        .partial_matches()
        .into_iter()
        .map(|(l, r)| (l.local_path.clone(), r.remote_path.clone()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("lib/util.py".to_string(), "legacy/util.py".to_string()),
            ("web/app.ts".to_string(), "frontend/app.ts".to_string()),
        ]
    );
}
