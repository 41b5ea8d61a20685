//! Broken-attachment scanning.
//!
//! [`scan`] walks every node of an [`ObjectGraph`] depth-first and records
//! each node carrying at least one broken slot, keyed by its full path.
//! Scanning is pure: it never mutates the graph, and scanning the same
//! unchanged graph twice yields identical results.

use serde::{Deserialize, Serialize};

use crate::graph::ObjectGraph;
use crate::id::NodeId;

/// Traversal options for [`scan_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Visit nodes that are inactive in the hierarchy.
    pub include_inactive: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            include_inactive: true,
        }
    }
}

/// One node that carries broken slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokenNode {
    /// `/Root/.../Name` path of the node, optionally prefixed by its asset.
    pub path: String,
    pub node: NodeId,
    /// Number of broken slots on this node at scan time.
    pub broken_count: usize,
}

/// Aggregate outcome of a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Nodes with at least one broken slot.
    pub broken_node_count: usize,
    /// Broken slots across all nodes.
    pub broken_attachment_count: usize,
    /// Per-node detail in visit order.
    pub nodes: Vec<BrokenNode>,
}

impl ScanResult {
    pub fn is_clean(&self) -> bool {
        self.broken_attachment_count == 0
    }

    /// Folds another result into this one, prefixing its paths with
    /// `"<prefix>:"` so entries from different forests stay distinguishable.
    pub fn merge_prefixed(&mut self, prefix: &str, other: ScanResult) {
        self.broken_node_count += other.broken_node_count;
        self.broken_attachment_count += other.broken_attachment_count;
        self.nodes
            .extend(other.nodes.into_iter().map(|mut entry| {
                entry.path = format!("{}:{}", prefix, entry.path);
                entry
            }));
    }
}

/// Scans every node, inactive ones included.
pub fn scan<G: ObjectGraph + ?Sized>(graph: &G) -> ScanResult {
    scan_with(graph, &ScanOptions::default())
}

/// Scans with explicit traversal options.
///
/// With `include_inactive == false`, an inactive node and its whole subtree
/// are skipped, matching "inactive in hierarchy" semantics.
pub fn scan_with<G: ObjectGraph + ?Sized>(graph: &G, options: &ScanOptions) -> ScanResult {
    let mut result = ScanResult::default();
    let mut stack: Vec<NodeId> = graph.roots().into_iter().rev().collect();

    while let Some(id) = stack.pop() {
        let Some(node) = graph.node(id) else {
            continue;
        };
        if !options.include_inactive && !node.active {
            continue;
        }

        let broken = node.broken_count();
        if broken > 0 {
            result.broken_node_count += 1;
            result.broken_attachment_count += broken;
            result.nodes.push(BrokenNode {
                path: full_path(graph, id),
                node: id,
                broken_count: broken,
            });
        }

        stack.extend(graph.children(id).into_iter().rev());
    }

    result
}

/// Builds `/Root/Child/...` by walking parent links up to the root.
pub fn full_path<G: ObjectGraph + ?Sized>(graph: &G, node: NodeId) -> String {
    let mut segments = Vec::new();
    let mut current = Some(node);
    while let Some(id) = current {
        segments.push(graph.name(id).unwrap_or_default());
        current = graph.parent(id);
    }

    let mut path = String::new();
    for name in segments.iter().rev() {
        path.push('/');
        path.push_str(name);
    }
    path
}
