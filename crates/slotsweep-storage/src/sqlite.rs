//! SQLite implementation of [`AssetStore`].
//!
//! [`SqliteStore`] keeps one row per asset with its forest stored as JSON
//! TEXT. Saves join a single batch transaction that stays open until
//! [`commit_and_refresh`](AssetStore::commit_and_refresh); dropping the
//! store with a batch still open rolls those saves back.

use rusqlite::{params, Connection, OptionalExtension};

use slotsweep_core::Forest;

use crate::error::StorageError;
use crate::traits::AssetStore;
use crate::types::{AssetId, AssetRecord};

/// SQLite-backed implementation of [`AssetStore`].
pub struct SqliteStore {
    conn: Connection,
    /// A `BEGIN` has been issued by `save_as_asset` and not yet committed.
    in_batch: bool,
    outstanding: usize,
}

impl SqliteStore {
    /// Opens (or creates) a SQLite database at `path`.
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let conn = crate::schema::open_database(path)?;
        Ok(SqliteStore::from_connection(conn))
    }

    /// Opens an in-memory SQLite database (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = crate::schema::open_in_memory()?;
        Ok(SqliteStore::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        SqliteStore {
            conn,
            in_batch: false,
            outstanding: 0,
        }
    }

    /// Number of loaded copies that have not been unloaded yet.
    pub fn outstanding_copies(&self) -> usize {
        self.outstanding
    }

    /// Whether saves are pending a commit.
    pub fn has_pending_writes(&self) -> bool {
        self.in_batch
    }
}

impl AssetStore for SqliteStore {
    fn find_assets(&self, kind: &str) -> Result<Vec<AssetId>, StorageError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT id FROM assets WHERE kind = ?1 COLLATE NOCASE ORDER BY id")?;
        let rows = stmt.query_map(params![kind], |row| row.get::<_, i64>(0))?;
        let mut ids = Vec::new();
        for row in rows {
            ids.push(AssetId(row?));
        }
        Ok(ids)
    }

    fn id_to_path(&self, id: AssetId) -> Result<String, StorageError> {
        self.conn
            .query_row(
                "SELECT path FROM assets WHERE id = ?1",
                params![id.0],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(StorageError::AssetNotFound(id.0))
    }

    fn list_assets(&self) -> Result<Vec<AssetRecord>, StorageError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT id, path, kind, revision FROM assets ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(AssetRecord {
                id: AssetId(row.get(0)?),
                path: row.get(1)?,
                kind: row.get(2)?,
                revision: row.get(3)?,
            })
        })?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    fn load_contents(&mut self, path: &str) -> Result<Forest, StorageError> {
        let json: String = self
            .conn
            .query_row(
                "SELECT contents FROM assets WHERE path = ?1",
                params![path],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| StorageError::PathNotFound(path.to_string()))?;
        let forest: Forest = serde_json::from_str(&json)?;
        self.outstanding += 1;
        Ok(forest)
    }

    fn save_as_asset(&mut self, contents: &Forest, path: &str) -> Result<(), StorageError> {
        let json = serde_json::to_string(contents)?;
        if !self.in_batch {
            self.conn.execute_batch("BEGIN IMMEDIATE")?;
            self.in_batch = true;
        }
        let updated = self.conn.execute(
            "UPDATE assets SET contents = ?1, revision = revision + 1 WHERE path = ?2",
            params![json, path],
        )?;
        if updated == 0 {
            return Err(StorageError::PathNotFound(path.to_string()));
        }
        Ok(())
    }

    fn unload(&mut self, contents: Forest) {
        drop(contents);
        self.outstanding = self.outstanding.saturating_sub(1);
    }

    fn commit_and_refresh(&mut self) -> Result<(), StorageError> {
        if self.in_batch {
            self.conn.execute_batch("COMMIT")?;
            self.in_batch = false;
        }
        self.conn.execute_batch("ANALYZE")?;
        Ok(())
    }

    fn create_asset(
        &mut self,
        path: &str,
        kind: &str,
        contents: &Forest,
    ) -> Result<AssetId, StorageError> {
        let json = serde_json::to_string(contents)?;
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM assets WHERE path = ?1)",
            params![path],
            |row| row.get(0),
        )?;
        if exists {
            return Err(StorageError::DuplicatePath(path.to_string()));
        }
        self.conn.execute(
            "INSERT INTO assets (path, kind, contents) VALUES (?1, ?2, ?3)",
            params![path, kind, json],
        )?;
        Ok(AssetId(self.conn.last_insert_rowid()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotsweep_core::{remove_all_broken, scan, AttachmentSlot, SceneNode};

    fn prefab(broken: usize) -> Forest {
        let mut forest = Forest::new();
        let root = forest.add_root(SceneNode::new("Prefab"));
        let child = forest.add_child(root, SceneNode::new("Mesh")).unwrap();
        forest
            .push_attachment(child, AttachmentSlot::present("MeshRenderer"))
            .unwrap();
        for _ in 0..broken {
            forest.push_attachment(child, AttachmentSlot::Broken).unwrap();
        }
        forest
    }

    #[test]
    fn create_find_and_resolve() {
        let mut store = SqliteStore::in_memory().unwrap();
        let a = store.create_asset("Assets/A.prefab", "Prefab", &prefab(1)).unwrap();
        store.create_asset("Assets/Main.scene", "Scene", &prefab(0)).unwrap();

        assert_eq!(store.find_assets("prefab").unwrap(), vec![a]);
        assert_eq!(store.id_to_path(a).unwrap(), "Assets/A.prefab");
        assert_eq!(store.list_assets().unwrap().len(), 2);
        assert!(matches!(
            store.create_asset("Assets/A.prefab", "Prefab", &prefab(0)),
            Err(StorageError::DuplicatePath(_))
        ));
    }

    #[test]
    fn load_returns_stored_forest() {
        let mut store = SqliteStore::in_memory().unwrap();
        store.create_asset("Assets/A.prefab", "Prefab", &prefab(3)).unwrap();

        let forest = store.load_contents("Assets/A.prefab").unwrap();
        let result = scan(&forest);
        assert_eq!(result.broken_attachment_count, 3);
        assert_eq!(result.nodes[0].path, "/Prefab/Mesh");
        assert_eq!(store.outstanding_copies(), 1);
        store.unload(forest);
        assert_eq!(store.outstanding_copies(), 0);

        assert!(matches!(
            store.load_contents("Assets/None.prefab"),
            Err(StorageError::PathNotFound(_))
        ));
    }

    #[test]
    fn commit_persists_saves_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("assets.db");
        let db = db.to_str().unwrap();

        {
            let mut store = SqliteStore::new(db).unwrap();
            store.create_asset("Assets/A.prefab", "Prefab", &prefab(2)).unwrap();
            let mut forest = store.load_contents("Assets/A.prefab").unwrap();
            remove_all_broken(&mut forest).unwrap();
            store.save_as_asset(&forest, "Assets/A.prefab").unwrap();
            store.unload(forest);
            assert!(store.has_pending_writes());
            store.commit_and_refresh().unwrap();
            assert!(!store.has_pending_writes());
        }

        let mut store = SqliteStore::new(db).unwrap();
        assert_eq!(store.list_assets().unwrap()[0].revision, 1);
        let forest = store.load_contents("Assets/A.prefab").unwrap();
        assert!(scan(&forest).is_clean());
        store.unload(forest);
    }

    #[test]
    fn uncommitted_saves_roll_back_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("assets.db");
        let db = db.to_str().unwrap();

        {
            let mut store = SqliteStore::new(db).unwrap();
            store.create_asset("Assets/A.prefab", "Prefab", &prefab(2)).unwrap();
            store.save_as_asset(&prefab(0), "Assets/A.prefab").unwrap();
        }

        let mut store = SqliteStore::new(db).unwrap();
        assert_eq!(store.list_assets().unwrap()[0].revision, 0);
        let forest = store.load_contents("Assets/A.prefab").unwrap();
        assert_eq!(scan(&forest).broken_attachment_count, 2);
        store.unload(forest);
    }

    #[test]
    fn malformed_contents_fail_to_load() {
        let mut store = SqliteStore::in_memory().unwrap();
        store.create_asset("Assets/A.prefab", "Prefab", &prefab(1)).unwrap();

        // Give the root a parent, closing a Prefab -> Mesh -> Prefab cycle.
        let mut value = serde_json::to_value(prefab(1)).unwrap();
        value["graph"]["edges"]
            .as_array_mut()
            .unwrap()
            .push(serde_json::json!([1, 0, { "position": 0 }]));
        store
            .conn
            .execute(
                "UPDATE assets SET contents = ?1 WHERE path = ?2",
                params![value.to_string(), "Assets/A.prefab"],
            )
            .unwrap();

        assert!(matches!(
            store.load_contents("Assets/A.prefab"),
            Err(StorageError::Serialization(_))
        ));
        assert_eq!(store.outstanding_copies(), 0);
    }

    #[test]
    fn save_to_unknown_path_fails() {
        let mut store = SqliteStore::in_memory().unwrap();
        assert!(matches!(
            store.save_as_asset(&prefab(0), "Assets/Nope.prefab"),
            Err(StorageError::PathNotFound(_))
        ));
    }
}
