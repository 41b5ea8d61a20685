//! In-place removal of broken attachment slots.
//!
//! Brokenness is re-read from the node at the moment of removal. A count
//! from an earlier [`scan`](crate::scan::scan) is never trusted, since the
//! forest may have changed in between.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::forest::Forest;
use crate::id::NodeId;

/// Aggregate outcome of a removal pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalResult {
    pub removed_attachment_count: usize,
    pub affected_node_count: usize,
    /// Whether anything was removed, i.e. whether persisted state is stale.
    pub changed: bool,
}

impl RemovalResult {
    /// Accounts for one node's removal count.
    pub fn record(&mut self, removed: usize) {
        if removed > 0 {
            self.removed_attachment_count += removed;
            self.affected_node_count += 1;
            self.changed = true;
        }
    }
}

/// Strips every slot that is broken right now from `node`.
///
/// Present slots keep their relative order. Returns the number removed.
pub fn remove_broken(forest: &mut Forest, node: NodeId) -> Result<usize, CoreError> {
    let payload = forest.node_mut(node)?;
    let before = payload.attachments.len();
    payload.attachments.retain(|slot| !slot.is_broken());
    Ok(before - payload.attachments.len())
}

/// Runs [`remove_broken`] over every node of the forest, inactive included.
pub fn remove_all_broken(forest: &mut Forest) -> Result<RemovalResult, CoreError> {
    let mut result = RemovalResult::default();
    for id in forest.depth_first() {
        result.record(remove_broken(forest, id)?);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ObjectGraph;
    use crate::node::{AttachmentSlot, SceneNode};
    use crate::scan::scan;

    use proptest::prelude::*;

    #[test]
    fn second_removal_finds_nothing() {
        let mut forest = Forest::new();
        let root = forest.add_root(SceneNode::new("Root"));
        forest.push_attachment(root, AttachmentSlot::Broken).unwrap();
        forest.push_attachment(root, AttachmentSlot::Broken).unwrap();

        assert_eq!(remove_broken(&mut forest, root).unwrap(), 2);
        assert_eq!(remove_broken(&mut forest, root).unwrap(), 0);
    }

    #[test]
    fn removal_reads_current_state() {
        let mut forest = Forest::new();
        let root = forest.add_root(SceneNode::new("Root"));
        forest.push_attachment(root, AttachmentSlot::Broken).unwrap();
        let stale = scan(&forest);

        forest.push_attachment(root, AttachmentSlot::Broken).unwrap();
        assert_eq!(stale.broken_attachment_count, 1);
        assert_eq!(remove_broken(&mut forest, root).unwrap(), 2);
    }

    #[test]
    fn unknown_node_is_an_error() {
        let mut forest = Forest::new();
        assert!(matches!(
            remove_broken(&mut forest, NodeId(0)),
            Err(CoreError::NodeNotFound { .. })
        ));
    }

    #[test]
    fn remove_all_aggregates_and_reaches_inactive_nodes() {
        let mut forest = Forest::new();
        let root = forest.add_root(SceneNode::new("Root"));
        let off = forest.add_child(root, SceneNode::new("Off")).unwrap();
        forest.set_active(off, false).unwrap();
        forest.push_attachment(off, AttachmentSlot::Broken).unwrap();
        forest.push_attachment(root, AttachmentSlot::present("Light")).unwrap();
        let other = forest.add_root(SceneNode::new("Other"));
        forest.push_attachment(other, AttachmentSlot::Broken).unwrap();
        forest.push_attachment(other, AttachmentSlot::Broken).unwrap();

        let result = remove_all_broken(&mut forest).unwrap();
        assert_eq!(
            result,
            RemovalResult {
                removed_attachment_count: 3,
                affected_node_count: 2,
                changed: true,
            }
        );
        assert!(scan(&forest).is_clean());
        assert_eq!(forest.attachments(root).len(), 1);

        assert!(!remove_all_broken(&mut forest).unwrap().changed);
    }

    fn slot_strategy() -> impl Strategy<Value = AttachmentSlot> {
        prop_oneof![
            Just(AttachmentSlot::Broken),
            "[A-Z][a-z]{1,6}".prop_map(|name: String| AttachmentSlot::present(name)),
        ]
    }

    proptest! {
        #[test]
        fn present_slots_keep_relative_order(
            slots in prop::collection::vec(slot_strategy(), 0..16)
        ) {
            let mut forest = Forest::new();
            let root = forest.add_root(SceneNode::new("Root"));
            for slot in &slots {
                forest.push_attachment(root, slot.clone()).unwrap();
            }

            let expected: Vec<AttachmentSlot> =
                slots.iter().filter(|s| !s.is_broken()).cloned().collect();
            let broken = slots.len() - expected.len();

            prop_assert_eq!(remove_broken(&mut forest, root).unwrap(), broken);
            prop_assert_eq!(forest.attachments(root).to_vec(), expected);
            prop_assert_eq!(remove_broken(&mut forest, root).unwrap(), 0);
        }
    }
}
