//! Core error types for slotsweep-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering
//! the failure modes of the object graph model.

use crate::id::NodeId;
use thiserror::Error;

/// Core errors produced by the slotsweep-core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A node id was not found in the forest.
    #[error("node not found: NodeId({id})", id = id.0)]
    NodeNotFound { id: NodeId },

    /// A forest invariant was violated (e.g. a node with two parents).
    #[error("graph inconsistency: {reason}")]
    GraphInconsistency { reason: String },
}
