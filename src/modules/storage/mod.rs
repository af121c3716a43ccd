//! Storage module for employee image assets
//!
//! Provides the `AssetStore` abstraction and a filesystem-backed
//! implementation that writes opaque byte payloads under one directory
//! with collision-free, timestamp-prefixed names.

mod asset_store;
mod local_asset_store;
mod naming;

pub use asset_store::{AssetStore, StorageError};
pub use local_asset_store::LocalAssetStore;
#[cfg(test)]
pub use naming::is_valid_asset_name;
