//! In-memory implementation of [`AssetStore`].
//!
//! [`InMemoryStore`] is a first-class backend for tests and hosts that keep
//! their asset database resident. Saves are staged and only become the
//! committed state on [`commit_and_refresh`](AssetStore::commit_and_refresh),
//! mirroring the transactional behaviour of the SQLite backend.

use std::collections::HashMap;

use slotsweep_core::Forest;

use crate::error::StorageError;
use crate::traits::AssetStore;
use crate::types::{AssetId, AssetRecord};

/// Data stored for a single asset.
#[derive(Debug, Clone)]
struct StoredAsset {
    path: String,
    kind: String,
    /// Last committed contents.
    contents: Forest,
    /// Saved but not yet committed contents.
    staged: Option<Forest>,
    /// Committed rewrites so far.
    revision: i64,
}

impl StoredAsset {
    /// Contents as seen by this store's own readers.
    fn current(&self) -> &Forest {
        self.staged.as_ref().unwrap_or(&self.contents)
    }
}

/// In-memory implementation of [`AssetStore`].
#[derive(Debug)]
pub struct InMemoryStore {
    assets: HashMap<AssetId, StoredAsset>,
    next_asset_id: i64,
    /// Copies handed out by `load_contents` and not yet unloaded.
    outstanding: usize,
    commits: usize,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        InMemoryStore {
            assets: HashMap::new(),
            next_asset_id: 1,
            outstanding: 0,
            commits: 0,
        }
    }

    /// Number of loaded copies that have not been unloaded yet.
    pub fn outstanding_copies(&self) -> usize {
        self.outstanding
    }

    /// Number of `commit_and_refresh` calls so far.
    pub fn commit_count(&self) -> usize {
        self.commits
    }

    /// Number of assets with staged, uncommitted writes.
    pub fn pending_writes(&self) -> usize {
        self.assets.values().filter(|a| a.staged.is_some()).count()
    }

    /// Returns the last committed contents at `path`, ignoring staged writes.
    pub fn committed_contents(&self, path: &str) -> Result<&Forest, StorageError> {
        self.find_by_path(path).map(|(_, asset)| &asset.contents)
    }

    fn find_by_path(&self, path: &str) -> Result<(AssetId, &StoredAsset), StorageError> {
        self.assets
            .iter()
            .find(|(_, asset)| asset.path == path)
            .map(|(&id, asset)| (id, asset))
            .ok_or_else(|| StorageError::PathNotFound(path.to_string()))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetStore for InMemoryStore {
    fn find_assets(&self, kind: &str) -> Result<Vec<AssetId>, StorageError> {
        let mut ids: Vec<AssetId> = self
            .assets
            .iter()
            .filter(|(_, asset)| asset.kind.eq_ignore_ascii_case(kind))
            .map(|(&id, _)| id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn id_to_path(&self, id: AssetId) -> Result<String, StorageError> {
        self.assets
            .get(&id)
            .map(|asset| asset.path.clone())
            .ok_or(StorageError::AssetNotFound(id.0))
    }

    fn list_assets(&self) -> Result<Vec<AssetRecord>, StorageError> {
        let mut records: Vec<AssetRecord> = self
            .assets
            .iter()
            .map(|(&id, asset)| AssetRecord {
                id,
                path: asset.path.clone(),
                kind: asset.kind.clone(),
                revision: asset.revision,
            })
            .collect();
        records.sort_by_key(|r| r.id);
        Ok(records)
    }

    fn load_contents(&mut self, path: &str) -> Result<Forest, StorageError> {
        let copy = self.find_by_path(path)?.1.current().clone();
        self.outstanding += 1;
        Ok(copy)
    }

    fn save_as_asset(&mut self, contents: &Forest, path: &str) -> Result<(), StorageError> {
        let (id, _) = self.find_by_path(path)?;
        if let Some(asset) = self.assets.get_mut(&id) {
            asset.staged = Some(contents.clone());
        }
        Ok(())
    }

    fn unload(&mut self, contents: Forest) {
        drop(contents);
        self.outstanding = self.outstanding.saturating_sub(1);
    }

    fn commit_and_refresh(&mut self) -> Result<(), StorageError> {
        for asset in self.assets.values_mut() {
            if let Some(staged) = asset.staged.take() {
                asset.contents = staged;
                asset.revision += 1;
            }
        }
        self.commits += 1;
        Ok(())
    }

    fn create_asset(
        &mut self,
        path: &str,
        kind: &str,
        contents: &Forest,
    ) -> Result<AssetId, StorageError> {
        if self.assets.values().any(|asset| asset.path == path) {
            return Err(StorageError::DuplicatePath(path.to_string()));
        }
        let id = AssetId(self.next_asset_id);
        self.next_asset_id += 1;
        self.assets.insert(
            id,
            StoredAsset {
                path: path.to_string(),
                kind: kind.to_string(),
                contents: contents.clone(),
                staged: None,
                revision: 0,
            },
        );
        Ok(id)
    }
}
