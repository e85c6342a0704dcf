use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use super::Transport;
use crate::error::TransportError;
use crate::reconcile::RemoteRecord;

/// An in-process document store
///
/// Ids are random v4 UUIDs. Failures can be injected for the next create or
/// delete call, and listings can be made to omit contents the way a
/// metadata-only endpoint would.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    docs: RefCell<BTreeMap<String, RemoteRecord>>,
    fail_next_create: RefCell<Option<TransportError>>,
    fail_next_delete: RefCell<Option<TransportError>>,
    metadata_only: Cell<bool>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with `(path, contents)` documents
    pub fn with_documents<'a>(docs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let transport = Self::new();
        for (path, contents) in docs {
            transport.insert(path, contents);
        }
        transport
    }

    /// Add a document unconditionally, even if the path already exists
    pub fn insert(&self, path: &str, contents: &str) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.docs.borrow_mut().insert(
            id.clone(),
            RemoteRecord::new(path, id.clone(), Some(contents.to_string())),
        );
        id
    }

    /// Make the next `create_or_update` fail with `error`
    pub fn fail_next_create(&self, error: TransportError) {
        *self.fail_next_create.borrow_mut() = Some(error);
    }

    /// Make the next `delete` fail with `error`
    pub fn fail_next_delete(&self, error: TransportError) {
        *self.fail_next_delete.borrow_mut() = Some(error);
    }

    /// Omit contents from `fetch_all`; `fetch_one` still returns them
    pub fn set_metadata_only(&self, metadata_only: bool) {
        self.metadata_only.set(metadata_only);
    }

    /// All stored documents, ordered by id
    pub fn documents(&self) -> Vec<RemoteRecord> {
        self.docs.borrow().values().cloned().collect()
    }

    /// The stored document at `path`, if any
    pub fn document_at(&self, path: &str) -> Option<RemoteRecord> {
        self.docs
            .borrow()
            .values()
            .find(|doc| doc.path == path)
            .cloned()
    }
}

impl Transport for MemoryTransport {
    fn fetch_all(&self) -> Result<Vec<RemoteRecord>, TransportError> {
        let metadata_only = self.metadata_only.get();
        Ok(self
            .docs
            .borrow()
            .values()
            .map(|doc| RemoteRecord {
                contents: if metadata_only { None } else { doc.contents.clone() },
                ..doc.clone()
            })
            .collect())
    }

    fn fetch_one(&self, id: &str) -> Result<RemoteRecord, TransportError> {
        self.docs
            .borrow()
            .get(id)
            .cloned()
            .ok_or_else(|| TransportError::with_status(404, format!("no document {id}")))
    }

    fn create_or_update(&self, path: &str, contents: &str) -> Result<String, TransportError> {
        if let Some(err) = self.fail_next_create.borrow_mut().take() {
            return Err(err);
        }

        // Like the docs API, every call creates a new document
        Ok(self.insert(path, contents))
    }

    fn delete(&self, id: &str) -> Result<(), TransportError> {
        if let Some(err) = self.fail_next_delete.borrow_mut().take() {
            return Err(err);
        }

        self.docs
            .borrow_mut()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| TransportError::with_status(404, format!("no document {id}")))
    }
}
