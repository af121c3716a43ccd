use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by an asset store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Refusing to store an empty payload")]
    EmptyPayload,

    #[error("Invalid asset name: {0}")]
    InvalidName(String),

    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Failed to {operation} {}: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub(crate) fn io(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        StorageError::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

/// Durable, name-collision-free storage of opaque byte payloads.
///
/// Names returned by [`AssetStore::store`] are opaque identifiers and are
/// resolvable through `retrieve`, `exists` and `delete` as soon as `store`
/// returns.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Persist `payload` under a freshly generated name derived from
    /// `suggested_name`. Nothing is visible under the returned name unless
    /// the whole payload was written.
    async fn store(&self, payload: &[u8], suggested_name: &str) -> Result<String, StorageError>;

    /// Read back a stored asset.
    async fn retrieve(&self, asset_name: &str) -> Result<Vec<u8>, StorageError>;

    async fn exists(&self, asset_name: &str) -> Result<bool, StorageError>;

    /// Remove an asset. Removing a name that does not exist succeeds.
    async fn delete(&self, asset_name: &str) -> Result<(), StorageError>;
}
