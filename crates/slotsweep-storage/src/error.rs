//! Storage error types for slotsweep-storage.

use thiserror::Error;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The SQLite backend reported an error.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Schema migration failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// JSON serialization or deserialization of asset contents failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No asset has the given ID.
    #[error("asset not found: {0}")]
    AssetNotFound(i64),

    /// No asset is stored at the given path.
    #[error("no asset at path '{0}'")]
    PathNotFound(String),

    /// An asset already exists at the given path.
    #[error("asset path already in use: '{0}'")]
    DuplicatePath(String),

    /// The backend refused to write the asset.
    #[error("save rejected for '{path}': {reason}")]
    SaveRejected { path: String, reason: String },
}
