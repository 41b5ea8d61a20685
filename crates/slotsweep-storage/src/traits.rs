//! The [`AssetStore`] trait: the object-store query service.
//!
//! The orchestrator only ever reaches persistent storage through this trait,
//! so tests can substitute fakes and hosts can plug in their own store.
//! The trait is synchronous; every call completes on the caller's thread.

use slotsweep_core::Forest;

use crate::error::StorageError;
use crate::types::{AssetId, AssetRecord};

/// The storage contract for asset forests.
pub trait AssetStore {
    // -------------------------------------------------------------------
    // Discovery
    // -------------------------------------------------------------------

    /// Finds all assets of the given kind (case-insensitive), ordered by ID.
    fn find_assets(&self, kind: &str) -> Result<Vec<AssetId>, StorageError>;

    /// Resolves an asset ID to its storage path.
    fn id_to_path(&self, id: AssetId) -> Result<String, StorageError>;

    /// Lists every stored asset.
    fn list_assets(&self) -> Result<Vec<AssetRecord>, StorageError>;

    // -------------------------------------------------------------------
    // Contents
    // -------------------------------------------------------------------

    /// Materializes an independent, editable copy of the asset at `path`.
    ///
    /// Every copy handed out must be given back through [`unload`](Self::unload).
    fn load_contents(&mut self, path: &str) -> Result<Forest, StorageError>;

    /// Writes `contents` back over the asset at `path`.
    ///
    /// Writes become durable and visible to other readers only after
    /// [`commit_and_refresh`](Self::commit_and_refresh).
    fn save_as_asset(&mut self, contents: &Forest, path: &str) -> Result<(), StorageError>;

    /// Releases a copy obtained from [`load_contents`](Self::load_contents).
    fn unload(&mut self, contents: Forest);

    /// Flushes pending writes and refreshes the store's indexes.
    fn commit_and_refresh(&mut self) -> Result<(), StorageError>;

    // -------------------------------------------------------------------
    // Host helpers
    // -------------------------------------------------------------------

    /// Registers a new asset and returns its ID.
    fn create_asset(
        &mut self,
        path: &str,
        kind: &str,
        contents: &Forest,
    ) -> Result<AssetId, StorageError>;
}
