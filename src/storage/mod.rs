//! Cloud object storage for cached answer audio.
//!
//! The synthesis cache only needs two operations: look up the download URL
//! for a key, and store new bytes under a key. Keys live in a flat namespace
//! (`audio/<script_name>`). `NotFound` is the cache-miss signal, not an
//! error condition.

pub mod firebase;
pub mod memory;

pub use firebase::FirebaseStorage;
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by object storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No object exists under the key. Signals a synthesis cache miss.
    #[error("object not found: {0}")]
    NotFound(String),
    /// The backend rejected the credentials for this operation.
    #[error("storage access denied: {0}")]
    Denied(String),
    /// The request never completed.
    #[error("storage network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The backend answered with an unexpected status or payload.
    #[error("storage API error (status {status}): {body}")]
    Api { status: u16, body: String },
}

/// Flat-namespace object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Returns the retrieval URL for an existing object.
    ///
    /// # Errors
    /// - `StorageError::NotFound` if no object exists under the key
    async fn download_url(&self, key: &str) -> Result<String, StorageError>;

    /// Stores bytes under the key and returns the retrieval URL.
    ///
    /// Distinct keys are distinct objects; storing under a key only ever
    /// replaces that key's object.
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError>;
}
