//! Storage abstraction for persisted asset forests.
//!
//! Provides the [`AssetStore`] trait that the cleanup orchestrator talks to,
//! plus [`InMemoryStore`] and [`SqliteStore`] as first-class backends.
//!
//! # Modules
//!
//! - [`error`]: StorageError enum with all failure modes
//! - [`types`]: AssetId, AssetRecord storage-layer types
//! - [`traits`]: AssetStore trait definition
//! - [`memory`]: InMemoryStore implementation
//! - [`schema`]: SQL schema and migration setup
//! - [`sqlite`]: SqliteStore implementation

pub mod error;
pub mod memory;
pub mod schema;
pub mod sqlite;
pub mod traits;
pub mod types;

// Re-export key types for ergonomic use.
pub use error::StorageError;
pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
pub use traits::AssetStore;
pub use types::{AssetId, AssetRecord};
