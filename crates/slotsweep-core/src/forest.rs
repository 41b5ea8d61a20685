//! Forest: the owning container for object hierarchies.
//!
//! Every node lives in a single petgraph `StableGraph`. An edge runs from a
//! parent to each of its children and records the child's sibling position,
//! so a node's children are ordered and its parent is the source of its one
//! incoming edge. The parent link is only ever read back for path
//! reconstruction; ownership and lifetime belong to the forest as a whole.
//!
//! Nodes are created either as a new root or as a new child of an existing
//! node, so a forest can never contain a cycle.

use std::collections::HashSet;

use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableGraph;
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::graph::ObjectGraph;
use crate::id::NodeId;
use crate::node::{AttachmentSlot, SceneNode};

/// Parent-to-child containment edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildEdge {
    /// Position of the child among its siblings.
    pub position: u32,
}

/// A collection of independent node trees.
///
/// Decoding runs [`Forest::validate`], so a deserialized forest is always a
/// well-formed set of trees.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "RawForest")]
pub struct Forest {
    graph: StableGraph<SceneNode, ChildEdge, Directed, u32>,
    /// Root nodes in insertion order.
    roots: Vec<NodeId>,
}

/// Unchecked wire shape of a [`Forest`].
#[derive(Deserialize)]
struct RawForest {
    graph: StableGraph<SceneNode, ChildEdge, Directed, u32>,
    roots: Vec<NodeId>,
}

impl TryFrom<RawForest> for Forest {
    type Error = CoreError;

    fn try_from(raw: RawForest) -> Result<Self, Self::Error> {
        let forest = Forest {
            graph: raw.graph,
            roots: raw.roots,
        };
        forest.validate()?;
        Ok(forest)
    }
}

impl Forest {
    /// Creates an empty forest.
    pub fn new() -> Self {
        Forest::default()
    }

    /// Adds a new tree root and returns its id.
    pub fn add_root(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId::from(self.graph.add_node(node));
        self.roots.push(id);
        id
    }

    /// Adds `node` as the last child of `parent`.
    ///
    /// Returns [`CoreError::NodeNotFound`] if the parent does not exist.
    pub fn add_child(&mut self, parent: NodeId, node: SceneNode) -> Result<NodeId, CoreError> {
        let parent_idx = self.index_of(parent)?;
        let position = self
            .graph
            .edges_directed(parent_idx, Direction::Outgoing)
            .count() as u32;
        let child_idx = self.graph.add_node(node);
        self.graph
            .add_edge(parent_idx, child_idx, ChildEdge { position });
        Ok(NodeId::from(child_idx))
    }

    /// Appends an attachment slot to a node.
    pub fn push_attachment(&mut self, node: NodeId, slot: AttachmentSlot) -> Result<(), CoreError> {
        self.node_mut(node)?.attachments.push(slot);
        Ok(())
    }

    /// Marks a node active or inactive.
    pub fn set_active(&mut self, node: NodeId, active: bool) -> Result<(), CoreError> {
        self.node_mut(node)?.active = active;
        Ok(())
    }

    /// Returns a mutable reference to a node's payload.
    pub fn node_mut(&mut self, node: NodeId) -> Result<&mut SceneNode, CoreError> {
        self.graph
            .node_weight_mut(NodeIndex::from(node))
            .ok_or(CoreError::NodeNotFound { id: node })
    }

    /// Total number of nodes across all trees.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Every node in depth-first pre-order, roots in insertion order and
    /// children in sibling order.
    pub fn depth_first(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.node_count());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).into_iter().rev());
        }
        order
    }

    /// Checks the structural invariants: roots are distinct existing nodes
    /// with no parent, every other node has exactly one parent, and every
    /// node is reachable from a root.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut seen = HashSet::new();
        for &root in &self.roots {
            if !self.graph.contains_node(NodeIndex::from(root)) {
                return Err(CoreError::NodeNotFound { id: root });
            }
            if !seen.insert(root) {
                return Err(CoreError::GraphInconsistency {
                    reason: format!("node {} is listed as a root more than once", root),
                });
            }
        }

        for idx in self.graph.node_indices() {
            let id = NodeId::from(idx);
            let parents = self.graph.edges_directed(idx, Direction::Incoming).count();
            let is_root = seen.contains(&id);
            match (is_root, parents) {
                (true, 0) | (false, 1) => {}
                _ => {
                    return Err(CoreError::GraphInconsistency {
                        reason: format!(
                            "node {} has {} parent(s) but root={}",
                            id, parents, is_root
                        ),
                    })
                }
            }
        }

        // With single parents and parentless roots, the walk below is a plain
        // tree walk; any cycle is left unreachable and shows up in the count.
        let reachable = self.depth_first().len();
        if reachable != self.node_count() {
            return Err(CoreError::GraphInconsistency {
                reason: format!(
                    "{} of {} nodes reachable from roots",
                    reachable,
                    self.node_count()
                ),
            });
        }
        Ok(())
    }

    fn index_of(&self, node: NodeId) -> Result<NodeIndex<u32>, CoreError> {
        let idx = NodeIndex::from(node);
        if self.graph.contains_node(idx) {
            Ok(idx)
        } else {
            Err(CoreError::NodeNotFound { id: node })
        }
    }
}

impl ObjectGraph for Forest {
    fn roots(&self) -> Vec<NodeId> {
        self.roots.clone()
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        let idx = NodeIndex::from(node);
        if !self.graph.contains_node(idx) {
            return Vec::new();
        }
        let mut children: Vec<(u32, NodeId)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.weight().position, NodeId::from(e.target())))
            .collect();
        children.sort_by_key(|(position, _)| *position);
        children.into_iter().map(|(_, id)| id).collect()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        let idx = NodeIndex::from(node);
        if !self.graph.contains_node(idx) {
            return None;
        }
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .next()
            .map(|e| NodeId::from(e.source()))
    }

    fn node(&self, node: NodeId) -> Option<&SceneNode> {
        self.graph.node_weight(NodeIndex::from(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Forest, NodeId, NodeId, NodeId) {
        let mut forest = Forest::new();
        let root = forest.add_root(SceneNode::new("Root"));
        let a = forest.add_child(root, SceneNode::new("A")).unwrap();
        let b = forest.add_child(root, SceneNode::new("B")).unwrap();
        (forest, root, a, b)
    }

    #[test]
    fn children_keep_insertion_order() {
        let (forest, root, a, b) = sample();
        assert_eq!(forest.children(root), vec![a, b]);
        assert_eq!(forest.parent(a), Some(root));
        assert_eq!(forest.parent(root), None);
    }

    #[test]
    fn add_child_to_missing_parent_fails() {
        let mut forest = Forest::new();
        let err = forest
            .add_child(NodeId(9), SceneNode::new("Orphan"))
            .unwrap_err();
        assert!(matches!(err, CoreError::NodeNotFound { id } if id == NodeId(9)));
    }

    #[test]
    fn depth_first_visits_every_node_once() {
        let (mut forest, _root, a, _b) = sample();
        forest.add_child(a, SceneNode::new("A1")).unwrap();
        let second = forest.add_root(SceneNode::new("Second"));
        let order = forest.depth_first();
        assert_eq!(order.len(), 5);
        assert_eq!(order.last(), Some(&second));
        forest.validate().unwrap();
    }

    #[test]
    fn serde_roundtrip_preserves_structure() {
        let (mut forest, root, a, _b) = sample();
        forest.push_attachment(a, AttachmentSlot::Broken).unwrap();
        forest.set_active(a, false).unwrap();

        let json = serde_json::to_string(&forest).unwrap();
        let back: Forest = serde_json::from_str(&json).unwrap();

        assert_eq!(back.node_count(), 3);
        assert_eq!(back.children(root), forest.children(root));
        let node = back.node(a).unwrap();
        assert!(!node.active);
        assert_eq!(node.broken_count(), 1);
        back.validate().unwrap();
    }

    #[test]
    fn decoding_rejects_a_parent_cycle() {
        let (forest, _root, _a, _b) = sample();
        let mut value = serde_json::to_value(&forest).unwrap();
        value["graph"]["edges"]
            .as_array_mut()
            .unwrap()
            .push(serde_json::json!([1, 0, { "position": 0 }]));

        let err = serde_json::from_value::<Forest>(value).unwrap_err();
        assert!(err.to_string().contains("graph inconsistency"));
    }

    #[test]
    fn decoding_rejects_a_duplicate_root() {
        let mut forest = Forest::new();
        let root = forest.add_root(SceneNode::new("Root"));
        forest.push_attachment(root, AttachmentSlot::Broken).unwrap();
        let mut value = serde_json::to_value(&forest).unwrap();
        value["roots"] = serde_json::json!([0, 0]);

        let err = serde_json::from_value::<Forest>(value).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn decoding_rejects_an_unreachable_cycle() {
        let mut forest = Forest::new();
        forest.add_root(SceneNode::new("Root"));
        let mut value = serde_json::to_value(&forest).unwrap();
        let nodes = value["graph"]["nodes"].as_array_mut().unwrap();
        let template = nodes[0].clone();
        nodes.push(template.clone());
        nodes.push(template);
        let edges = value["graph"]["edges"].as_array_mut().unwrap();
        edges.push(serde_json::json!([1, 2, { "position": 0 }]));
        edges.push(serde_json::json!([2, 1, { "position": 0 }]));

        let err = serde_json::from_value::<Forest>(value).unwrap_err();
        assert!(err.to_string().contains("reachable"));
    }

    #[test]
    fn decoding_rejects_a_missing_root() {
        let mut value = serde_json::to_value(Forest::new()).unwrap();
        value["roots"] = serde_json::json!([4]);
        assert!(serde_json::from_value::<Forest>(value).is_err());
    }

    #[test]
    fn unknown_node_queries_are_empty() {
        let forest = Forest::new();
        assert!(forest.children(NodeId(3)).is_empty());
        assert_eq!(forest.parent(NodeId(3)), None);
        assert!(forest.node(NodeId(3)).is_none());
        assert!(forest.is_empty());
    }
}
