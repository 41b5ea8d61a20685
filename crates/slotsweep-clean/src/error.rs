//! Errors that halt an orchestration run.
//!
//! Per-asset failures never surface here; they are logged and the batch
//! moves on. A [`CleanError`] means the store itself could not be queried
//! or committed.

use thiserror::Error;

use slotsweep_core::CoreError;
use slotsweep_storage::StorageError;

#[derive(Debug, Error)]
pub enum CleanError {
    /// The asset store failed outside of any single asset's processing.
    #[error("asset store failure: {0}")]
    Store(#[from] StorageError),

    /// The object graph was inconsistent.
    #[error(transparent)]
    Core(#[from] CoreError),
}
