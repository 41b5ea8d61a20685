//! Node payloads: [`SceneNode`] and its [`AttachmentSlot`]s.
//!
//! A slot is either bound to a resolved behavior ([`AttachmentSlot::Present`])
//! or left dangling because its backing script could not be resolved
//! ([`AttachmentSlot::Broken`]).

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Opaque reference to a resolved behavior attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachmentHandle {
    /// Type name of the behavior the slot resolves to.
    pub type_name: String,
}

impl AttachmentHandle {
    pub fn new(type_name: impl Into<String>) -> Self {
        AttachmentHandle {
            type_name: type_name.into(),
        }
    }
}

/// One attachment position on a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttachmentSlot {
    /// The slot references a behavior that resolved.
    Present(AttachmentHandle),
    /// The referenced behavior could not be resolved.
    Broken,
}

impl AttachmentSlot {
    /// Shorthand for a present slot with the given type name.
    pub fn present(type_name: impl Into<String>) -> Self {
        AttachmentSlot::Present(AttachmentHandle::new(type_name))
    }

    pub fn is_broken(&self) -> bool {
        matches!(self, AttachmentSlot::Broken)
    }
}

/// Inline capacity for attachment lists; most nodes carry only a few.
pub type Attachments = SmallVec<[AttachmentSlot; 4]>;

/// A single element of an object forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    /// Inactive nodes are still part of the forest and are scanned by default.
    pub active: bool,
    pub attachments: Attachments,
}

impl SceneNode {
    /// Creates an active node with no attachments.
    pub fn new(name: impl Into<String>) -> Self {
        SceneNode {
            name: name.into(),
            active: true,
            attachments: SmallVec::new(),
        }
    }

    /// Number of slots currently classified as broken.
    pub fn broken_count(&self) -> usize {
        self.attachments.iter().filter(|s| s.is_broken()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broken_count_ignores_present_slots() {
        let mut node = SceneNode::new("Player");
        node.attachments.push(AttachmentSlot::present("Rigidbody"));
        node.attachments.push(AttachmentSlot::Broken);
        node.attachments.push(AttachmentSlot::Broken);
        assert_eq!(node.broken_count(), 2);
    }

    #[test]
    fn slot_serde_shape() {
        let json = serde_json::to_string(&AttachmentSlot::Broken).unwrap();
        assert_eq!(json, "\"Broken\"");

        let present = AttachmentSlot::present("Camera");
        let json = serde_json::to_string(&present).unwrap();
        let back: AttachmentSlot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, present);
    }
}
