use serde::{Deserialize, Serialize};
use std::fmt;

/// Synchronization status of one tracked file
///
/// Always derived from the presence of each facet and from content equality;
/// see [`FileEntry::recompute_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// Present on disk only
    LocalOnly,
    /// Present in the remote store only
    RemoteOnly,
    /// Present on both sides with byte-identical contents
    Synced,
    /// Paired on both sides, but contents differ or remote contents are not loaded
    OutOfSync,
    /// One side of a filename-based pairing; see [`FileEntry::counterpart`]
    PartialMatch,
    /// Both facets are gone after a delete; dropped on the next fetch
    Removed,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::LocalOnly => "local_only",
            FileStatus::RemoteOnly => "remote_only",
            FileStatus::Synced => "synced",
            FileStatus::OutOfSync => "out_of_sync",
            FileStatus::PartialMatch => "partial_match",
            FileStatus::Removed => "removed",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical key of a file within a [`crate::reconcile::SyncState`]
///
/// A file is keyed by its local path when it has one, otherwise by its remote
/// path. The side is part of the key so a remote-only record never collides
/// with a local path spelled the same way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileKey {
    Local(String),
    Remote(String),
}

impl FileKey {
    pub fn path(&self) -> &str {
        match self {
            FileKey::Local(path) | FileKey::Remote(path) => path,
        }
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// One logical file with independent local and remote facets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path relative to the scanned root; empty when there is no local copy
    pub local_path: String,
    pub local_contents: Option<String>,
    /// Path the remote store knows the document by
    pub remote_path: String,
    /// `None` until the remote contents are fetched
    pub remote_contents: Option<String>,
    /// Opaque remote identifier, required to delete the remote copy
    pub remote_id: Option<String>,
    pub status: FileStatus,
    /// The other half of a partial match
    pub counterpart: Option<FileKey>,
}

impl FileEntry {
    /// A file that exists on disk only
    pub fn local(path: impl Into<String>, contents: Option<String>) -> Self {
        let mut entry = FileEntry {
            local_path: path.into(),
            local_contents: contents,
            remote_path: String::new(),
            remote_contents: None,
            remote_id: None,
            status: FileStatus::LocalOnly,
            counterpart: None,
        };
        entry.recompute_status();
        entry
    }

    /// A file that exists in the remote store only
    pub fn remote(path: impl Into<String>, id: impl Into<String>, contents: Option<String>) -> Self {
        FileEntry {
            local_path: String::new(),
            local_contents: None,
            remote_path: path.into(),
            remote_contents: contents,
            remote_id: Some(id.into()),
            status: FileStatus::RemoteOnly,
            counterpart: None,
        }
    }

    pub fn local_present(&self) -> bool {
        !self.local_path.is_empty() && self.local_contents.is_some()
    }

    pub fn remote_present(&self) -> bool {
        self.remote_id.is_some()
    }

    /// Present on both sides with byte-identical contents
    pub fn is_fully_synced(&self) -> bool {
        self.local_present()
            && self.remote_present()
            && self.remote_contents.is_some()
            && self.local_contents == self.remote_contents
    }

    /// The key this entry is stored under
    pub fn key(&self) -> FileKey {
        if self.local_path.is_empty() {
            FileKey::Remote(self.remote_path.clone())
        } else {
            FileKey::Local(self.local_path.clone())
        }
    }

    /// Local path if there is one, otherwise the remote path
    pub fn display_path(&self) -> &str {
        if self.local_path.is_empty() {
            &self.remote_path
        } else {
            &self.local_path
        }
    }

    /// Whether a local path is known, loaded or not
    pub fn has_local_path(&self) -> bool {
        !self.local_path.is_empty()
    }

    /// Re-derive `status` from the stored facets
    ///
    /// A file known on both sides can no longer be half of a partial match,
    /// so its counterpart link is dropped. Contents that are not loaded on
    /// either side never count as equal.
    pub fn recompute_status(&mut self) {
        self.status = match (self.has_local_path(), self.remote_present()) {
            (true, true) => {
                self.counterpart = None;
                if self.is_fully_synced() {
                    FileStatus::Synced
                } else {
                    FileStatus::OutOfSync
                }
            }
            (true, false) if self.counterpart.is_some() => FileStatus::PartialMatch,
            (true, false) => FileStatus::LocalOnly,
            (false, true) if self.counterpart.is_some() => FileStatus::PartialMatch,
            (false, true) => FileStatus::RemoteOnly,
            (false, false) => {
                self.counterpart = None;
                FileStatus::Removed
            }
        };
    }
}
