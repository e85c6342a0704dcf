use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Result, SyncError};
use crate::model::{FileEntry, FileKey, FileStatus};
use crate::rules::{translate, Direction, Rule};

/// A file found on disk, with its contents if they could be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRecord {
    pub path: String,
    pub contents: Option<String>,
}

impl LocalRecord {
    pub fn new(path: impl Into<String>, contents: impl Into<String>) -> Self {
        LocalRecord {
            path: path.into(),
            contents: Some(contents.into()),
        }
    }
}

/// A document reported by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRecord {
    pub path: String,
    pub id: String,
    /// Absent when the listing only returned metadata
    #[serde(default)]
    pub contents: Option<String>,
}

impl RemoteRecord {
    pub fn new(path: impl Into<String>, id: impl Into<String>, contents: Option<String>) -> Self {
        RemoteRecord {
            path: path.into(),
            id: id.into(),
            contents,
        }
    }
}

/// Number of files per status, for summaries
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatusCounts {
    pub synced: usize,
    pub out_of_sync: usize,
    pub partial_match: usize,
    pub local_only: usize,
    pub remote_only: usize,
    pub removed: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.synced
            + self.out_of_sync
            + self.partial_match
            + self.local_only
            + self.remote_only
            + self.removed
    }
}

/// Live reconciliation result for one run
///
/// Rebuilt from scratch by every fetch. Actions mutate single entries in
/// place and never re-run reconciliation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncState {
    files: BTreeMap<FileKey, FileEntry>,
    fetched: bool,
    duplicate_remote_paths: Vec<String>,
}

impl SyncState {
    /// An empty, not yet fetched state
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetched(&self) -> bool {
        self.fetched
    }

    /// Fail with [`SyncError::NotFetched`] until a full pass has completed
    pub fn ensure_fetched(&self) -> Result<()> {
        if self.fetched {
            Ok(())
        } else {
            Err(SyncError::NotFetched)
        }
    }

    pub fn get(&self, key: &FileKey) -> Option<&FileEntry> {
        self.files.get(key)
    }

    pub fn get_mut(&mut self, key: &FileKey) -> Option<&mut FileEntry> {
        self.files.get_mut(key)
    }

    /// Add an entry under its own key, replacing any previous one
    pub fn insert(&mut self, entry: FileEntry) -> FileKey {
        let key = entry.key();
        self.files.insert(key.clone(), entry);
        key
    }

    pub(crate) fn remove(&mut self, key: &FileKey) -> Option<FileEntry> {
        self.files.remove(key)
    }

    /// All entries in key order (local paths first, then remote-only paths)
    pub fn files(&self) -> impl Iterator<Item = &FileEntry> {
        self.files.values()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn duplicate_remote_paths(&self) -> &[String] {
        &self.duplicate_remote_paths
    }

    /// Resolve a user-supplied path to a key, trying local paths before remote ones
    pub fn find(&self, path: &str) -> Option<FileKey> {
        let local = FileKey::Local(path.to_string());
        if self.files.contains_key(&local) {
            return Some(local);
        }
        let remote = FileKey::Remote(path.to_string());
        if self.files.contains_key(&remote) {
            return Some(remote);
        }
        self.files
            .iter()
            .find(|(_, entry)| entry.remote_path == path)
            .map(|(key, _)| key.clone())
    }

    pub fn with_status(&self, status: FileStatus) -> Vec<&FileEntry> {
        self.files.values().filter(|f| f.status == status).collect()
    }

    /// Files that still need attention: anything not byte-identical on both sides
    pub fn unsynced(&self) -> Vec<&FileEntry> {
        self.files
            .values()
            .filter(|f| f.status != FileStatus::Removed && !f.is_fully_synced())
            .collect()
    }

    /// Partial-match pairs as (local side, remote side), ordered by local path
    ///
    /// Only pairs whose sides link to each other are returned; see
    /// [`SyncState::unpaired_partial_matches`] for the rest.
    pub fn partial_matches(&self) -> Vec<(&FileEntry, &FileEntry)> {
        self.files
            .values()
            .filter(|f| f.status == FileStatus::PartialMatch && f.has_local_path())
            .filter_map(|local| Some((local, self.linked_counterpart(local)?)))
            .collect()
    }

    /// Partial-match entries whose counterpart is missing or no longer links back
    pub fn unpaired_partial_matches(&self) -> Vec<&FileEntry> {
        self.files
            .values()
            .filter(|f| f.status == FileStatus::PartialMatch)
            .filter(|f| self.linked_counterpart(f).is_none())
            .collect()
    }

    fn linked_counterpart(&self, entry: &FileEntry) -> Option<&FileEntry> {
        let other = self.files.get(entry.counterpart.as_ref()?)?;
        let links_back = other.status == FileStatus::PartialMatch
            && other.counterpart.as_ref() == Some(&entry.key());
        links_back.then_some(other)
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for entry in self.files.values() {
            match entry.status {
                FileStatus::Synced => counts.synced += 1,
                FileStatus::OutOfSync => counts.out_of_sync += 1,
                FileStatus::PartialMatch => counts.partial_match += 1,
                FileStatus::LocalOnly => counts.local_only += 1,
                FileStatus::RemoteOnly => counts.remote_only += 1,
                FileStatus::Removed => counts.removed += 1,
            }
        }
        counts
    }

    /// Local directories that hold no file known to the remote store
    pub fn additional_local_directories(&self, rules: &[Rule]) -> Vec<String> {
        let remote_dirs: BTreeSet<String> = self
            .files
            .values()
            .filter(|f| f.remote_present())
            .map(|f| {
                if f.has_local_path() {
                    parent_dir(&f.local_path)
                } else {
                    parent_dir(&translate(&f.remote_path, rules, Direction::RemoteToLocal))
                }
            })
            .collect();

        self.files
            .values()
            .filter(|f| f.has_local_path())
            .map(|f| parent_dir(&f.local_path))
            .filter(|dir| !dir.is_empty() && !remote_dirs.contains(dir))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn parent_dir(path: &str) -> String {
    path.rsplit_once('/')
        .map(|(dir, _)| dir.to_string())
        .unwrap_or_default()
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// `remote` names the same file as `name` on a path-segment boundary
fn ends_with_file_name(remote: &str, name: &str) -> bool {
    remote == name
        || remote
            .strip_suffix(name)
            .is_some_and(|head| head.ends_with('/'))
}

fn paired(local_path: String, local_contents: Option<String>, remote: &RemoteRecord) -> FileEntry {
    let mut entry = FileEntry {
        local_path,
        local_contents,
        remote_path: remote.path.clone(),
        remote_contents: remote.contents.clone(),
        remote_id: Some(remote.id.clone()),
        status: FileStatus::OutOfSync,
        counterpart: None,
    };
    entry.recompute_status();
    entry
}

/// Match local files against remote records and assign every file a status
///
/// Pairing happens in three passes over sorted inputs, so the same inputs
/// always produce the same state:
///
/// 1. each local path is translated through `rules` and paired with the
///    remote record at the translated path;
/// 2. leftovers whose paths are identical on both sides are paired;
/// 3. leftovers are linked as partial matches when a remote path ends with the
///    local file name. The first candidate in path order wins.
///
/// Whatever remains becomes local only or remote only.
pub fn reconcile(local: &[LocalRecord], remote: &[RemoteRecord], rules: &[Rule]) -> SyncState {
    let mut state = SyncState::new();

    let mut unmatched_remote: BTreeMap<&str, &RemoteRecord> = BTreeMap::new();
    for record in remote {
        if unmatched_remote.contains_key(record.path.as_str()) {
            log::warn!(
                "Remote path {} appears more than once, keeping the first (id {})",
                record.path,
                unmatched_remote[record.path.as_str()].id
            );
            state.duplicate_remote_paths.push(record.path.clone());
            continue;
        }
        unmatched_remote.insert(record.path.as_str(), record);
    }

    let mut unmatched_local: BTreeMap<&str, &Option<String>> = BTreeMap::new();
    for record in local {
        if unmatched_local.insert(record.path.as_str(), &record.contents).is_some() {
            log::warn!("Local path {} listed twice", record.path);
        }
    }

    // Rule-translated pairs
    let locals: Vec<&str> = unmatched_local.keys().copied().collect();
    for path in locals {
        let translated = translate(path, rules, Direction::LocalToRemote);
        if let Some(record) = unmatched_remote.remove(translated.as_str()) {
            let contents = unmatched_local.remove(path).cloned().flatten();
            log::debug!("Paired {} with remote {}", path, record.path);
            state.insert(paired(path.to_string(), contents, record));
        }
    }

    // Identical paths that no rule claimed
    let locals: Vec<&str> = unmatched_local.keys().copied().collect();
    for path in locals {
        if let Some(record) = unmatched_remote.remove(path) {
            let contents = unmatched_local.remove(path).cloned().flatten();
            state.insert(paired(path.to_string(), contents, record));
        }
    }

    // Same file name under a different directory
    let locals: Vec<&str> = unmatched_local.keys().copied().collect();
    for path in locals {
        let name = file_name(path);
        let candidate = unmatched_remote
            .keys()
            .copied()
            .find(|remote_path| ends_with_file_name(remote_path, name));

        let Some(record) = candidate.and_then(|remote_path| unmatched_remote.remove(remote_path))
        else {
            continue;
        };
        let contents = unmatched_local.remove(path).cloned().flatten();

        let mut local_entry = FileEntry::local(path, contents);
        let mut remote_entry = FileEntry::remote(&record.path, &record.id, record.contents.clone());
        local_entry.counterpart = Some(remote_entry.key());
        remote_entry.counterpart = Some(local_entry.key());
        local_entry.recompute_status();
        remote_entry.recompute_status();

        log::debug!("Partial match {} <-> {}", path, record.path);
        state.insert(local_entry);
        state.insert(remote_entry);
    }

    for (path, contents) in unmatched_local {
        state.insert(FileEntry::local(path, contents.clone()));
    }
    for record in unmatched_remote.into_values() {
        state.insert(FileEntry::remote(&record.path, &record.id, record.contents.clone()));
    }

    state.fetched = true;
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(path: &str, id: &str, contents: &str) -> RemoteRecord {
        RemoteRecord::new(path, id, Some(contents.to_string()))
    }

    #[test]
    fn test_empty_inputs() {
        let state = reconcile(&[], &[], &[]);
        assert!(state.fetched());
        assert!(state.is_empty());
    }

    #[test]
    fn test_empty_local_makes_everything_remote_only() {
        let state = reconcile(&[], &[remote("a.py", "1", "x"), remote("b/c.py", "2", "y")], &[]);
        assert_eq!(state.len(), 2);
        assert!(state.files().all(|f| f.status == FileStatus::RemoteOnly));
    }

    #[test]
    fn test_differing_contents_are_out_of_sync() {
        let state = reconcile(
            &[LocalRecord::new("src/a.py", "new")],
            &[remote("src/a.py", "1", "old")],
            &[],
        );
        let entry = state.get(&FileKey::Local("src/a.py".to_string())).unwrap();
        assert_eq!(entry.status, FileStatus::OutOfSync);
        assert!(entry.local_present() && entry.remote_present());
        assert!(!entry.is_fully_synced());
    }

    #[test]
    fn test_metadata_only_remote_is_not_fully_synced() {
        let state = reconcile(
            &[LocalRecord::new("src/a.py", "x")],
            &[RemoteRecord::new("src/a.py", "1", None)],
            &[],
        );
        let entry = state.get(&FileKey::Local("src/a.py".to_string())).unwrap();
        assert_eq!(entry.status, FileStatus::OutOfSync);
        assert!(entry.remote_contents.is_none());
    }

    #[test]
    fn test_duplicate_remote_paths_keep_first() {
        let state = reconcile(
            &[LocalRecord::new("a.py", "x")],
            &[remote("a.py", "first", "x"), remote("a.py", "second", "y")],
            &[],
        );
        assert_eq!(state.len(), 1);
        let entry = state.get(&FileKey::Local("a.py".to_string())).unwrap();
        assert_eq!(entry.remote_id.as_deref(), Some("first"));
        assert_eq!(entry.status, FileStatus::Synced);
        assert_eq!(state.duplicate_remote_paths(), ["a.py".to_string()]);
    }

    #[test]
    fn test_partial_match_requires_segment_boundary() {
        let state = reconcile(
            &[LocalRecord::new("lib/util.py", "x")],
            &[remote("legacy/myutil.py", "1", "x")],
            &[],
        );
        assert_eq!(state.counts().local_only, 1);
        assert_eq!(state.counts().remote_only, 1);
    }

    #[test]
    fn test_partial_match_first_candidate_in_path_order() {
        let state = reconcile(
            &[LocalRecord::new("lib/util.py", "x")],
            &[remote("b/util.py", "2", "x"), remote("a/util.py", "1", "x")],
            &[],
        );
        let local = state.get(&FileKey::Local("lib/util.py".to_string())).unwrap();
        assert_eq!(
            local.counterpart,
            Some(FileKey::Remote("a/util.py".to_string()))
        );
        let leftover = state.get(&FileKey::Remote("b/util.py".to_string())).unwrap();
        assert_eq!(leftover.status, FileStatus::RemoteOnly);
    }

    #[test]
    fn test_rule_pair_does_not_collide_with_remote_only_same_path() {
        let rules = vec![Rule::directory_match("lib", "legacy")];
        let state = reconcile(
            &[LocalRecord::new("lib/a.py", "x")],
            &[remote("legacy/a.py", "1", "x"), remote("lib/a.py", "2", "y")],
            &rules,
        );
        assert_eq!(state.len(), 2);
        let pair = state.get(&FileKey::Local("lib/a.py".to_string())).unwrap();
        assert_eq!(pair.remote_id.as_deref(), Some("1"));
        let orphan = state.get(&FileKey::Remote("lib/a.py".to_string())).unwrap();
        assert_eq!(orphan.status, FileStatus::RemoteOnly);
    }

    #[test]
    fn test_find_prefers_local_then_remote_path() {
        let rules = vec![Rule::directory_match("lib", "legacy")];
        let state = reconcile(
            &[LocalRecord::new("lib/a.py", "x")],
            &[remote("legacy/a.py", "1", "x")],
            &rules,
        );
        let key = FileKey::Local("lib/a.py".to_string());
        assert_eq!(state.find("lib/a.py"), Some(key.clone()));
        assert_eq!(state.find("legacy/a.py"), Some(key));
        assert_eq!(state.find("nope.py"), None);
    }

    #[test]
    fn test_additional_local_directories() {
        let rules = vec![Rule::directory_match("lib", "legacy")];
        let state = reconcile(
            &[
                LocalRecord::new("lib/a.py", "x"),
                LocalRecord::new("scripts/run.py", "y"),
                LocalRecord::new("top.py", "z"),
            ],
            &[remote("legacy/a.py", "1", "x")],
            &rules,
        );
        assert_eq!(state.additional_local_directories(&rules), vec!["scripts".to_string()]);
    }

    #[test]
    fn test_additional_directories_with_root_target_rule() {
        let rules = vec![Rule::directory_match("frontend", "")];
        let state = reconcile(
            &[
                LocalRecord::new("frontend/src/App.tsx", "x"),
                LocalRecord::new("frontend/public/logo.svg", "y"),
            ],
            &[remote("src/App.tsx", "1", "x"), remote("public/logo.svg", "2", "y")],
            &rules,
        );
        assert_eq!(state.counts().synced, 2);
        assert!(state.additional_local_directories(&rules).is_empty());
    }

    #[test]
    fn test_dangling_counterpart_is_unpaired() {
        let mut state = reconcile(
            &[LocalRecord::new("lib/util.py", "x")],
            &[remote("legacy/util.py", "1", "x")],
            &[],
        );
        let local = FileKey::Local("lib/util.py".to_string());
        let remote_key = FileKey::Remote("legacy/util.py".to_string());

        // The remote side is deleted; the local side still points at it
        let other = state.get_mut(&remote_key).unwrap();
        other.remote_id = None;
        other.recompute_status();

        assert_eq!(state.counts().partial_match, 1);
        assert!(state.partial_matches().is_empty());
        let unpaired: Vec<_> = state
            .unpaired_partial_matches()
            .into_iter()
            .map(|f| f.key())
            .collect();
        assert_eq!(unpaired, vec![local]);
    }

    #[test]
    fn test_unfetched_state_is_gated() {
        let state = SyncState::new();
        assert!(!state.fetched());
        assert!(matches!(state.ensure_fetched(), Err(SyncError::NotFetched)));
    }
}
