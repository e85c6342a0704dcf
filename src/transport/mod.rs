//! Remote document store access.
//!
//! The engine only talks to the remote through [`Transport`]. [`HttpTransport`]
//! speaks the project docs API; [`MemoryTransport`] keeps documents in memory.

mod http;
mod memory;

pub use http::HttpTransport;
pub use memory::MemoryTransport;

use crate::error::TransportError;
use crate::reconcile::RemoteRecord;

/// Operations the sync engine needs from a remote document store.
///
/// Calls block until the remote answers. Failures are returned as-is; nothing
/// here retries.
pub trait Transport {
    /// List every document in the store.
    fn fetch_all(&self) -> Result<Vec<RemoteRecord>, TransportError>;

    /// Fetch a single document, including its contents.
    fn fetch_one(&self, id: &str) -> Result<RemoteRecord, TransportError>;

    /// Store `contents` under `path` and return the document id.
    ///
    /// Stores may create a new document even when one already exists at
    /// `path`; callers delete the old one first to replace it.
    fn create_or_update(&self, path: &str, contents: &str) -> Result<String, TransportError>;

    /// Delete the document with this id.
    fn delete(&self, id: &str) -> Result<(), TransportError>;
}
