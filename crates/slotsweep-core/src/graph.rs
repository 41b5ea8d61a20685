//! The read-only [`ObjectGraph`] contract.
//!
//! Scanning only ever needs to observe a forest, so it is written against
//! this trait rather than a concrete container. Live scenes and loaded asset
//! copies both present themselves through it.

use crate::id::NodeId;
use crate::node::{AttachmentSlot, SceneNode};

/// Observational view over a forest of nodes.
pub trait ObjectGraph {
    /// Root nodes, in a stable order.
    fn roots(&self) -> Vec<NodeId>;

    /// Children of `node` in sibling order. Empty for unknown ids.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Parent of `node`, or `None` for roots and unknown ids.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Node payload.
    fn node(&self, node: NodeId) -> Option<&SceneNode>;

    /// Attachment slots of `node`, in order.
    fn attachments(&self, node: NodeId) -> &[AttachmentSlot] {
        self.node(node)
            .map(|n| n.attachments.as_slice())
            .unwrap_or(&[])
    }

    fn name(&self, node: NodeId) -> Option<&str> {
        self.node(node).map(|n| n.name.as_str())
    }
}
