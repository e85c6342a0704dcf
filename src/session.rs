//! The action orchestrator.
//!
//! A [`SyncSession`] owns one working directory's live [`SyncState`] together
//! with the loaded manifest. Every action touches exactly the entry it is
//! given; callers re-run [`SyncSession::fetch`] to get a fully consistent view
//! after a batch of actions.

use std::path::{Path, PathBuf};

use crate::config::ScanConfig;
use crate::discovery::{list_candidate_files, load_local_records, read_local_file};
use crate::error::{Result, SyncError};
use crate::manifest::{Manifest, DEFAULT_MANIFEST_FILE};
use crate::model::{FileEntry, FileKey};
use crate::prompt::Confirm;
use crate::reconcile::{reconcile, SyncState};
use crate::rules::{translate, Direction};
use crate::transport::Transport;

/// How a confirmed action ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    /// The user declined the confirmation prompt; nothing changed
    Cancelled,
}

/// A reconciliation session over one local root and one remote store
pub struct SyncSession<T: Transport> {
    root: PathBuf,
    scan: ScanConfig,
    manifest_path: PathBuf,
    manifest: Manifest,
    transport: T,
    confirm: Box<dyn Confirm>,
    state: SyncState,
}

impl<T: Transport> SyncSession<T> {
    /// Start a session, loading the manifest at `manifest_path`
    ///
    /// A missing manifest starts empty; a corrupt one is an error.
    pub fn new(
        root: impl Into<PathBuf>,
        scan: ScanConfig,
        manifest_path: impl Into<PathBuf>,
        transport: T,
        confirm: Box<dyn Confirm>,
    ) -> Result<Self> {
        let manifest_path = manifest_path.into();
        let manifest = Manifest::load(&manifest_path)?;
        log::debug!(
            "Loaded {} rules from {}",
            manifest.rules.len(),
            manifest_path.display()
        );

        Ok(SyncSession {
            root: root.into(),
            scan,
            manifest_path,
            manifest,
            transport,
            confirm,
            state: SyncState::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Mutable access for rule edits; persist with [`SyncSession::save_rules`]
    pub fn manifest_mut(&mut self) -> &mut Manifest {
        &mut self.manifest
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Scan the local tree, list the remote store and rebuild the state
    pub fn fetch(&mut self) -> Result<&SyncState> {
        let paths = list_candidate_files(&self.root, &self.scan)?;
        let local = load_local_records(&self.root, &paths);
        let remote = self.transport.fetch_all()?;

        self.state = reconcile(&local, &remote, &self.manifest.rules);

        let counts = self.state.counts();
        log::info!(
            "Reconciled {} local and {} remote files: {} synced, {} out of sync, {} partial, {} local only, {} remote only",
            local.len(),
            remote.len(),
            counts.synced,
            counts.out_of_sync,
            counts.partial_match,
            counts.local_only,
            counts.remote_only
        );
        Ok(&self.state)
    }

    fn entry(&self, key: &FileKey) -> Result<&FileEntry> {
        self.state.ensure_fetched()?;
        self.state.get(key).ok_or_else(|| SyncError::UnknownFile {
            key: key.to_string(),
        })
    }

    fn entry_mut(&mut self, key: &FileKey) -> Result<&mut FileEntry> {
        self.state.get_mut(key).ok_or_else(|| SyncError::UnknownFile {
            key: key.to_string(),
        })
    }

    /// Send the local copy to the remote store
    ///
    /// Contents are read from disk if they were not loaded during the fetch.
    /// The remote path is the one already known for this file, or the local
    /// path translated through the manifest rules.
    ///
    /// The remote store creates a new document on every upload, so a file
    /// that still has a remote copy must go through
    /// [`SyncSession::overwrite_remote`] instead.
    ///
    /// # Errors
    ///
    /// [`SyncError::Upload`] when the file has no local copy, already has a
    /// remote copy, cannot be read, or the transport fails. The entry is
    /// unchanged in every error case.
    pub fn upload(&mut self, key: &FileKey) -> Result<ActionOutcome> {
        let entry = self.entry(key)?;
        let path = entry.display_path().to_string();

        if !entry.has_local_path() {
            return Err(SyncError::Upload {
                path,
                cause: "file has no local copy".to_string(),
            });
        }
        if entry.remote_present() {
            return Err(SyncError::Upload {
                path,
                cause: "file already has a remote copy; overwrite it instead".to_string(),
            });
        }

        let contents = match &entry.local_contents {
            Some(contents) => contents.clone(),
            None => read_local_file(&self.root, &entry.local_path).map_err(|e| {
                SyncError::Upload {
                    path: path.clone(),
                    cause: e.to_string(),
                }
            })?,
        };

        let target = if entry.remote_path.is_empty() {
            translate(&entry.local_path, &self.manifest.rules, Direction::LocalToRemote)
        } else {
            entry.remote_path.clone()
        };

        let id = self
            .transport
            .create_or_update(&target, &contents)
            .map_err(|e| SyncError::Upload {
                path: path.clone(),
                cause: e.to_string(),
            })?;

        log::info!("Uploaded {} as {} (id {})", path, target, id);

        let entry = self.entry_mut(key)?;
        entry.remote_contents = Some(contents.clone());
        entry.local_contents = Some(contents);
        entry.remote_path = target;
        entry.remote_id = Some(id);
        entry.recompute_status();

        Ok(ActionOutcome::Completed)
    }

    /// Delete the remote copy after confirmation
    ///
    /// # Errors
    ///
    /// [`SyncError::InvalidDelete`] if the file has no remote id, and
    /// [`SyncError::Transport`] if the remote refuses. The entry is unchanged
    /// in both cases.
    pub fn delete(&mut self, key: &FileKey) -> Result<ActionOutcome> {
        let entry = self.entry(key)?;
        let Some(id) = entry.remote_id.clone() else {
            return Err(SyncError::InvalidDelete {
                path: entry.display_path().to_string(),
            });
        };

        let prompt = format!("Delete remote file {}?", entry.remote_path);
        if !self.confirm.confirm(&prompt) {
            log::info!("Deletion of {} cancelled", entry.remote_path);
            return Ok(ActionOutcome::Cancelled);
        }

        self.transport.delete(&id)?;

        let entry = self.entry_mut(key)?;
        log::info!("Deleted remote {} (id {})", entry.remote_path, id);
        entry.remote_id = None;
        entry.remote_contents = None;
        entry.recompute_status();

        Ok(ActionOutcome::Completed)
    }

    /// Replace the remote copy with the local one: delete, then upload
    ///
    /// # Errors
    ///
    /// Failures before the remote delete leave the entry unchanged. If the
    /// delete succeeds and the upload fails, the entry is left local only and
    /// [`SyncError::PartialCompletion`] names the removed document.
    pub fn overwrite_remote(&mut self, key: &FileKey) -> Result<ActionOutcome> {
        let entry = self.entry(key)?;
        let path = entry.display_path().to_string();

        let Some(id) = entry.remote_id.clone() else {
            return Err(SyncError::InvalidDelete { path });
        };
        if !entry.has_local_path() {
            return Err(SyncError::Upload {
                path,
                cause: "file has no local copy".to_string(),
            });
        }

        // Read before deleting so an unreadable file cannot strand the remote copy
        let contents = match &entry.local_contents {
            Some(contents) => contents.clone(),
            None => read_local_file(&self.root, &entry.local_path).map_err(|e| {
                SyncError::Upload {
                    path: path.clone(),
                    cause: e.to_string(),
                }
            })?,
        };

        let prompt = format!(
            "Overwrite remote file {} with local {}?",
            entry.remote_path, entry.local_path
        );
        if !self.confirm.confirm(&prompt) {
            log::info!("Overwrite of {} cancelled", path);
            return Ok(ActionOutcome::Cancelled);
        }

        self.transport.delete(&id)?;

        let entry = self.entry_mut(key)?;
        entry.local_contents = Some(contents);
        entry.remote_id = None;
        entry.remote_contents = None;
        entry.recompute_status();

        match self.upload(key) {
            Ok(outcome) => Ok(outcome),
            Err(SyncError::Upload { cause, .. }) => {
                log::error!("Overwrite of {path} stopped after deleting remote id {id}: {cause}");
                Err(SyncError::PartialCompletion {
                    path,
                    removed_id: id,
                    cause,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch remote contents for a file whose listing came without them
    ///
    /// Returns `false` when the file has no remote copy to fetch.
    pub fn load_remote_contents(&mut self, key: &FileKey) -> Result<bool> {
        let Some(id) = self.entry(key)?.remote_id.clone() else {
            return Ok(false);
        };

        let record = self.transport.fetch_one(&id)?;

        let entry = self.entry_mut(key)?;
        entry.remote_contents = record.contents;
        entry.recompute_status();
        Ok(true)
    }

    /// Refresh the manifest snapshot from the state and write it to disk
    pub fn save_manifest(&mut self) -> Result<()> {
        self.state.ensure_fetched()?;
        self.manifest.refresh_snapshot(&self.state);
        self.manifest.save(&self.manifest_path)
    }

    /// Write the manifest without touching its snapshot
    ///
    /// Used after rule edits, which do not need a fetched state.
    pub fn save_rules(&self) -> Result<()> {
        self.manifest.save(&self.manifest_path)
    }

    /// Save the manifest, then upload it like any other file
    ///
    /// An existing remote copy is overwritten (with confirmation).
    pub fn upload_manifest(&mut self) -> Result<ActionOutcome> {
        self.save_manifest()?;
        let json = self.manifest.to_json()?;

        let relative = self.manifest_relative_path();
        let key = FileKey::Local(relative.clone());

        if self.state.get(&key).is_none() {
            let mut entry = FileEntry::local(&relative, Some(json.clone()));

            // Adopt a remote-only copy at the same place instead of duplicating it
            let target = translate(&relative, &self.manifest.rules, Direction::LocalToRemote);
            let remote_key = FileKey::Remote(target);
            if self
                .state
                .get(&remote_key)
                .is_some_and(|remote| remote.counterpart.is_none())
            {
                if let Some(remote) = self.state.remove(&remote_key) {
                    entry.remote_path = remote.remote_path;
                    entry.remote_id = remote.remote_id;
                    entry.remote_contents = remote.remote_contents;
                }
            }
            entry.recompute_status();
            self.state.insert(entry);
        } else {
            let entry = self.entry_mut(&key)?;
            entry.local_contents = Some(json);
            entry.recompute_status();
        }

        if self.entry(&key)?.remote_present() {
            self.overwrite_remote(&key)
        } else {
            self.upload(&key)
        }
    }

    /// The manifest's path relative to the root, `/`-separated
    fn manifest_relative_path(&self) -> String {
        self.manifest_path
            .strip_prefix(&self.root)
            .ok()
            .and_then(|relative| {
                relative
                    .iter()
                    .map(|part| part.to_str())
                    .collect::<Option<Vec<_>>>()
            })
            .map(|parts| parts.join("/"))
            .or_else(|| {
                self.manifest_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(String::from)
            })
            .unwrap_or_else(|| DEFAULT_MANIFEST_FILE.to_string())
    }
}
