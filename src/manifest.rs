use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{Result, SyncError};
use crate::model::FileStatus;
use crate::reconcile::SyncState;
use crate::rules::Rule;

/// Default manifest file name, relative to the synced root
pub const DEFAULT_MANIFEST_FILE: &str = "manifest.json";

/// Status of one file at the time the manifest was saved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub path: String,
    pub status: FileStatus,
}

/// Persisted path translation rules plus an informational status snapshot
///
/// The rules are the only state that outlives a run. `files` and
/// `additional_local_directories` are rebuilt from the live state whenever the
/// manifest is saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub rules: Vec<Rule>,

    #[serde(default)]
    pub files: Vec<SnapshotEntry>,

    #[serde(default)]
    pub additional_local_directories: Vec<String>,
}

impl Manifest {
    /// Load a manifest, or an empty one if the file does not exist
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ManifestCorrupt`] if the file is not a valid
    /// manifest (bad JSON, unknown rule type, wrong field types). Rules are
    /// never partially loaded.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No manifest at {}, starting empty", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| SyncError::io(path, e))?;

        serde_json::from_str(&content).map_err(|e| SyncError::ManifestCorrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Serialize to the on-disk JSON form
    ///
    /// Rules keep their declared order and snapshot entries are sorted by path,
    /// so saved manifests diff cleanly.
    pub fn to_json(&self) -> Result<String> {
        let mut sorted = self.clone();
        sorted.files.sort_by(|a, b| a.path.cmp(&b.path));

        let mut json = serde_json::to_string_pretty(&sorted)?;
        json.push('\n');
        Ok(json)
    }

    /// Write the manifest atomically: a sibling temp file is renamed over `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;

        let mut temp =
            tempfile::NamedTempFile::new_in(parent).map_err(|e| SyncError::io(parent, e))?;
        temp.write_all(json.as_bytes())
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| SyncError::io(temp.path(), e))?;
        temp.persist(path)
            .map_err(|e| SyncError::io(path, e.error))?;

        log::info!(
            "Saved manifest with {} rules and {} files to {}",
            self.rules.len(),
            self.files.len(),
            path.display()
        );
        Ok(())
    }

    /// Replace the snapshot portion from a live state, leaving rules alone
    pub fn refresh_snapshot(&mut self, state: &SyncState) {
        self.files = build_snapshot(state);
        self.additional_local_directories = state.additional_local_directories(&self.rules);
    }

    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Remove the rule at `index`, if any
    pub fn remove_rule(&mut self, index: usize) -> Option<Rule> {
        (index < self.rules.len()).then(|| self.rules.remove(index))
    }
}

/// Derive the `files` snapshot from a state, sorted by path
///
/// Entries with no facet left are skipped.
pub fn build_snapshot(state: &SyncState) -> Vec<SnapshotEntry> {
    let mut files: Vec<SnapshotEntry> = state
        .files()
        .filter(|f| f.status != FileStatus::Removed)
        .map(|f| SnapshotEntry {
            path: f.key().path().to_string(),
            status: f.status,
        })
        .collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));
    files
}
