//! Filesystem-backed asset store
//!
//! Every asset lives directly under the configured directory. Writes go to a
//! hidden temporary file in the same directory and are renamed into place,
//! so a reader never observes a partially written asset under its final name.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::core::config::StorageConfig;
use crate::modules::storage::asset_store::{AssetStore, StorageError};
use crate::modules::storage::naming::{is_valid_asset_name, AssetNameGenerator};

pub struct LocalAssetStore {
    root: PathBuf,
    names: AssetNameGenerator,
}

impl LocalAssetStore {
    /// Create a store rooted at the configured asset directory.
    ///
    /// The directory itself is created lazily on the first `store`.
    pub fn new(config: &StorageConfig) -> Self {
        info!("Asset store rooted at {}", config.asset_dir.display());
        Self::with_root(config.asset_dir.clone())
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            names: AssetNameGenerator::new(),
        }
    }

    #[cfg(test)]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, asset_name: &str) -> Result<PathBuf, StorageError> {
        if !is_valid_asset_name(asset_name) {
            return Err(StorageError::InvalidName(asset_name.to_string()));
        }
        Ok(self.root.join(asset_name))
    }

    fn temp_path(&self, asset_name: &str) -> PathBuf {
        self.root.join(format!(".{}.tmp", asset_name))
    }

    async fn ensure_root(&self) -> Result<(), StorageError> {
        // create_dir_all treats an existing directory as success, so
        // concurrent callers racing here are fine
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StorageError::io("create directory", &self.root, e))
    }

    async fn write_temp(&self, temp: &Path, payload: &[u8]) -> Result<(), StorageError> {
        let mut file = tokio::fs::File::create(temp)
            .await
            .map_err(|e| StorageError::io("create", temp, e))?;
        file.write_all(payload)
            .await
            .map_err(|e| StorageError::io("write", temp, e))?;
        file.sync_all()
            .await
            .map_err(|e| StorageError::io("sync", temp, e))?;
        Ok(())
    }

    async fn discard_temp(&self, temp: &Path) {
        if let Err(e) = tokio::fs::remove_file(temp).await {
            if e.kind() != ErrorKind::NotFound {
                warn!("Failed to remove temporary file {}: {}", temp.display(), e);
            }
        }
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn store(&self, payload: &[u8], suggested_name: &str) -> Result<String, StorageError> {
        if payload.is_empty() {
            return Err(StorageError::EmptyPayload);
        }

        self.ensure_root().await?;

        let asset_name = self.names.next_name(suggested_name);
        let target = self.resolve(&asset_name)?;
        let temp = self.temp_path(&asset_name);

        if let Err(e) = self.write_temp(&temp, payload).await {
            self.discard_temp(&temp).await;
            return Err(e);
        }

        if let Err(e) = tokio::fs::rename(&temp, &target).await {
            self.discard_temp(&temp).await;
            return Err(StorageError::io("rename into", &target, e));
        }

        debug!(
            "Stored asset '{}' ({} bytes) in {}",
            asset_name,
            payload.len(),
            self.root.display()
        );
        Ok(asset_name)
    }

    async fn retrieve(&self, asset_name: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(asset_name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(asset_name.to_string()))
            }
            Err(e) => Err(StorageError::io("read", path, e)),
        }
    }

    async fn exists(&self, asset_name: &str) -> Result<bool, StorageError> {
        let path = self.resolve(asset_name)?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| StorageError::io("stat", path, e))
    }

    async fn delete(&self, asset_name: &str) -> Result<(), StorageError> {
        let path = self.resolve(asset_name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Deleted asset '{}'", asset_name);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Asset '{}' already absent", asset_name);
                Ok(())
            }
            Err(e) => Err(StorageError::io("delete", path, e)),
        }
    }
}
