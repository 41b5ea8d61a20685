//! The live scene a host has resident.
//!
//! Cleaning a live scene edits it in place, so the host gets a chance to
//! snapshot each node for undo before its slots are removed and is told
//! afterwards that the scene needs saving.

use serde::{Deserialize, Serialize};

use slotsweep_core::{AttachmentSlot, Forest, NodeId, ObjectGraph};

/// Undo label used for every node touched by a scene clean.
pub const UNDO_LABEL: &str = "Remove Missing Scripts";

/// A resident, editable forest.
pub trait LiveScene {
    fn forest(&self) -> &Forest;

    fn forest_mut(&mut self) -> &mut Forest;

    /// Called once per node right before its broken slots are removed.
    fn record_undo(&mut self, _node: NodeId, _label: &str) {}

    /// Called after a clean that removed at least one slot.
    fn mark_dirty(&mut self);
}

/// Snapshot of one node's slots taken before an edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoRecord {
    pub label: String,
    pub node: NodeId,
    pub attachments: Vec<AttachmentSlot>,
}

/// A [`LiveScene`] that owns its forest and keeps an undo stack.
#[derive(Debug, Clone, Default)]
pub struct InMemoryScene {
    forest: Forest,
    dirty: bool,
    undo_stack: Vec<UndoRecord>,
}

impl InMemoryScene {
    pub fn new(forest: Forest) -> Self {
        InMemoryScene {
            forest,
            dirty: false,
            undo_stack: Vec::new(),
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Restores the most recent snapshot. Returns the node it applied to.
    pub fn undo(&mut self) -> Option<NodeId> {
        let record = self.undo_stack.pop()?;
        let node = self.forest.node_mut(record.node).ok()?;
        node.attachments = record.attachments.into_iter().collect();
        Some(record.node)
    }

    pub fn into_forest(self) -> Forest {
        self.forest
    }
}

impl LiveScene for InMemoryScene {
    fn forest(&self) -> &Forest {
        &self.forest
    }

    fn forest_mut(&mut self) -> &mut Forest {
        &mut self.forest
    }

    fn record_undo(&mut self, node: NodeId, label: &str) {
        let attachments = self.forest.attachments(node).to_vec();
        self.undo_stack.push(UndoRecord {
            label: label.to_string(),
            node,
            attachments,
        });
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotsweep_core::{remove_broken, SceneNode};

    #[test]
    fn undo_restores_removed_slots_in_order() {
        let mut forest = Forest::new();
        let root = forest.add_root(SceneNode::new("Root"));
        forest.push_attachment(root, AttachmentSlot::present("A")).unwrap();
        forest.push_attachment(root, AttachmentSlot::Broken).unwrap();
        forest.push_attachment(root, AttachmentSlot::present("B")).unwrap();
        let before = forest.attachments(root).to_vec();

        let mut scene = InMemoryScene::new(forest);
        scene.record_undo(root, UNDO_LABEL);
        assert_eq!(remove_broken(scene.forest_mut(), root).unwrap(), 1);

        assert_eq!(scene.undo(), Some(root));
        assert_eq!(scene.forest().attachments(root).to_vec(), before);
        assert_eq!(scene.undo(), None);
    }
}
