//! Scoped ownership of a loaded asset copy.
//!
//! [`LoadedAsset`] pairs a copy obtained from
//! [`AssetStore::load_contents`] with the store it came from and hands the
//! copy back through [`AssetStore::unload`] when dropped. Release therefore
//! happens on every exit path: success, a failed save, or an early return.

use slotsweep_core::Forest;
use slotsweep_storage::{AssetStore, StorageError};

/// An editable copy of one asset, released on drop.
pub struct LoadedAsset<'s, S: AssetStore + ?Sized> {
    store: &'s mut S,
    path: String,
    forest: Forest,
}

impl<'s, S: AssetStore + ?Sized> LoadedAsset<'s, S> {
    /// Loads the asset at `path` from `store`.
    pub fn load(store: &'s mut S, path: &str) -> Result<Self, StorageError> {
        let forest = store.load_contents(path)?;
        Ok(LoadedAsset {
            store,
            path: path.to_string(),
            forest,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn forest_mut(&mut self) -> &mut Forest {
        &mut self.forest
    }

    /// Writes the copy back over the asset it was loaded from.
    pub fn save(&mut self) -> Result<(), StorageError> {
        self.store.save_as_asset(&self.forest, &self.path)
    }
}

impl<S: AssetStore + ?Sized> Drop for LoadedAsset<'_, S> {
    fn drop(&mut self) {
        let forest = std::mem::take(&mut self.forest);
        self.store.unload(forest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotsweep_core::{remove_all_broken, AttachmentSlot, SceneNode};
    use slotsweep_storage::InMemoryStore;

    fn store_with_asset() -> InMemoryStore {
        let mut forest = Forest::new();
        let root = forest.add_root(SceneNode::new("Root"));
        forest.push_attachment(root, AttachmentSlot::Broken).unwrap();
        let mut store = InMemoryStore::new();
        store.create_asset("Assets/A.prefab", "Prefab", &forest).unwrap();
        store
    }

    #[test]
    fn drop_releases_the_copy() {
        let mut store = store_with_asset();
        {
            let mut loaded = LoadedAsset::load(&mut store, "Assets/A.prefab").unwrap();
            remove_all_broken(loaded.forest_mut()).unwrap();
            loaded.save().unwrap();
        }
        assert_eq!(store.outstanding_copies(), 0);
        assert_eq!(store.pending_writes(), 1);
    }

    #[test]
    fn failed_load_holds_nothing() {
        let mut store = store_with_asset();
        assert!(LoadedAsset::load(&mut store, "Assets/Missing.prefab").is_err());
        assert_eq!(store.outstanding_copies(), 0);
    }
}
