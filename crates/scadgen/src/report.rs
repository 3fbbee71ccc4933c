//! Build-tree report: per-node kind and serialized size.

use std::fmt;

use scadgen_ir::NodeKind;
use serde::Serialize;

use crate::serialize::serialize_node;
use crate::tree::{NodeId, SceneTree};

/// One node of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildTreeEntry {
    /// Node kind.
    pub kind: NodeKind,
    /// Byte length of this node's own serialization, descendants included.
    pub size: usize,
    /// Entries for the node's children, in order.
    pub children: Vec<BuildTreeEntry>,
}

/// Report over the whole container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildTree {
    /// One entry per top-level node.
    pub entries: Vec<BuildTreeEntry>,
    /// Sum of the top-level sizes.
    ///
    /// Each top-level size already covers its subtree, so this is the size of
    /// the serialized body, not a sum over every node.
    pub total_bytes: usize,
}

fn entry(tree: &SceneTree, id: NodeId) -> Option<BuildTreeEntry> {
    let node = tree.get(id)?;
    Some(BuildTreeEntry {
        kind: node.data.kind(),
        size: serialize_node(tree, id, "").len(),
        children: node
            .children()
            .iter()
            .filter_map(|&child| entry(tree, child))
            .collect(),
    })
}

/// Summarize the tree without modifying it.
pub fn build_tree(tree: &SceneTree) -> BuildTree {
    let entries: Vec<_> = tree
        .top_level()
        .iter()
        .filter_map(|&id| entry(tree, id))
        .collect();
    let total_bytes = entries.iter().map(|e| e.size).sum();
    BuildTree {
        entries,
        total_bytes,
    }
}

impl BuildTree {
    /// Number of entries at every depth.
    pub fn node_count(&self) -> usize {
        fn count(entries: &[BuildTreeEntry]) -> usize {
            entries.iter().map(|e| 1 + count(&e.children)).sum()
        }
        count(&self.entries)
    }
}

impl fmt::Display for BuildTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_entries(
            f: &mut fmt::Formatter<'_>,
            entries: &[BuildTreeEntry],
            depth: usize,
        ) -> fmt::Result {
            for e in entries {
                writeln!(f, "{:indent$}{} ({} B)", "", e.kind, e.size, indent = depth * 2)?;
                write_entries(f, &e.children, depth + 1)?;
            }
            Ok(())
        }

        write_entries(f, &self.entries, 0)?;
        write!(f, "total: {} B", self.total_bytes)
    }
}
