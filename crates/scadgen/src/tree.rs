//! Arena-backed scene tree and the structural edits a host engine performs.
//!
//! Nodes live in a [`SlotMap`] and are referred to by [`NodeId`] handles.
//! Each node owns an ordered list of child handles; the container owns the
//! ordered list of top-level handles. Identity comparison is handle equality.
//!
//! The mutator performs no validation beyond handle liveness. In particular
//! it does not check for cycles or for a child that is already attached
//! elsewhere: callers only hand it freshly created or detached nodes.

use log::debug;
use scadgen_ir::{NodeData, Props};
use slotmap::{new_key_type, SlotMap};

use crate::error::{Result, SceneError};
use crate::normalize;

new_key_type! {
    /// Handle to a node in a [`SceneTree`].
    pub struct NodeId;
}

/// A node payload plus its ordered children.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    /// Typed payload.
    pub data: NodeData,
    children: Vec<NodeId>,
}

impl SceneNode {
    /// Child handles in generation order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Where a child list lives: the container or a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    /// The root container.
    Container,
    /// A node in the tree.
    Node(NodeId),
}

/// Scene graph: an arena of nodes plus the container's top-level list.
#[derive(Debug, Default, Clone)]
pub struct SceneTree {
    nodes: SlotMap<NodeId, SceneNode>,
    top_level: Vec<NodeId>,
}

impl SceneTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Top-level nodes in generation order.
    pub fn top_level(&self) -> &[NodeId] {
        &self.top_level
    }

    /// Look up a node.
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    /// Typed payload of a node.
    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id).map(|n| &n.data)
    }

    /// Children of a node, or an empty slice for a dead handle.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children()).unwrap_or(&[])
    }

    /// Whether `id` refers to a live node (attached or not).
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes, attached or detached.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no nodes at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // =========================================================================
    // Node lifecycle
    // =========================================================================

    /// Normalize `props` into a new, detached node of the named kind.
    pub fn create(&mut self, kind: &str, props: &Props) -> NodeId {
        let data = normalize::create(kind, props);
        self.insert_detached(data)
    }

    /// Insert an already-typed payload as a new, detached node.
    pub fn insert_detached(&mut self, data: NodeData) -> NodeId {
        self.nodes.insert(SceneNode {
            data,
            children: Vec::new(),
        })
    }

    /// Bare text children have no representation in the scene graph.
    ///
    /// Always fails with [`SceneError::TextNodeUnsupported`].
    pub fn create_text_instance(&mut self, text: &str) -> Result<NodeId> {
        Err(SceneError::TextNodeUnsupported {
            text: text.to_string(),
        })
    }

    /// Apply a partial prop update to a node in place.
    pub fn update(&mut self, id: NodeId, next: &Props) -> Result<()> {
        let node = self.nodes.get_mut(id).ok_or(SceneError::UnknownNode(id))?;
        normalize::update(&mut node.data, next);
        Ok(())
    }

    /// Copy a node into a new, detached node.
    ///
    /// With `keep_children` the whole subtree is cloned recursively;
    /// otherwise the copy starts with no children.
    pub fn clone_node(&mut self, id: NodeId, keep_children: bool) -> Result<NodeId> {
        let source = self.nodes.get(id).ok_or(SceneError::UnknownNode(id))?;
        let data = source.data.clone();
        let source_children = if keep_children {
            source.children.clone()
        } else {
            Vec::new()
        };

        let children = source_children
            .into_iter()
            .map(|child| self.clone_node(child, true))
            .collect::<Result<Vec<_>>>()?;

        Ok(self.nodes.insert(SceneNode { data, children }))
    }

    // =========================================================================
    // Structural edits
    // =========================================================================

    fn list_mut(&mut self, parent: Parent) -> Result<&mut Vec<NodeId>> {
        match parent {
            Parent::Container => Ok(&mut self.top_level),
            Parent::Node(id) => self
                .nodes
                .get_mut(id)
                .map(|n| &mut n.children)
                .ok_or(SceneError::UnknownNode(id)),
        }
    }

    fn ensure_live(&self, id: NodeId) -> Result<()> {
        if self.nodes.contains_key(id) {
            Ok(())
        } else {
            Err(SceneError::UnknownNode(id))
        }
    }

    /// Append `child` at the end of `parent`'s list.
    pub fn append(&mut self, parent: Parent, child: NodeId) -> Result<()> {
        self.ensure_live(child)?;
        self.list_mut(parent)?.push(child);
        debug!("append {child:?} to {parent:?}");
        Ok(())
    }

    /// Insert `child` before `before` in `parent`'s list.
    ///
    /// When `before` is not in the list the child is appended instead.
    pub fn insert_before(&mut self, parent: Parent, child: NodeId, before: NodeId) -> Result<()> {
        self.ensure_live(child)?;
        let list = self.list_mut(parent)?;
        match list.iter().position(|&c| c == before) {
            Some(index) => list.insert(index, child),
            None => {
                debug!("{before:?} not found under {parent:?}, appending {child:?}");
                list.push(child);
            }
        }
        Ok(())
    }

    /// Detach `child` from `parent`'s list. Absent children are ignored.
    ///
    /// The node stays in the arena until [`SceneTree::prune`] runs.
    pub fn remove(&mut self, parent: Parent, child: NodeId) -> Result<()> {
        let list = self.list_mut(parent)?;
        if let Some(index) = list.iter().position(|&c| c == child) {
            list.remove(index);
            debug!("removed {child:?} from {parent:?}");
        }
        Ok(())
    }

    /// Append `child` to a node's children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.append(Parent::Node(parent), child)
    }

    /// Append `child` to the container.
    pub fn append_child_to_container(&mut self, child: NodeId) -> Result<()> {
        self.append(Parent::Container, child)
    }

    /// Insert `child` before `before` among a node's children.
    pub fn insert_child_before(&mut self, parent: NodeId, child: NodeId, before: NodeId) -> Result<()> {
        self.insert_before(Parent::Node(parent), child, before)
    }

    /// Insert `child` before `before` in the container.
    pub fn insert_in_container_before(&mut self, child: NodeId, before: NodeId) -> Result<()> {
        self.insert_before(Parent::Container, child, before)
    }

    /// Remove `child` from a node's children.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.remove(Parent::Node(parent), child)
    }

    /// Remove `child` from the container.
    pub fn remove_child_from_container(&mut self, child: NodeId) -> Result<()> {
        self.remove(Parent::Container, child)
    }

    /// Detach every top-level node.
    pub fn clear_container(&mut self) {
        self.top_level.clear();
    }

    /// Free every node not reachable from the container.
    ///
    /// Handles to pruned nodes become dead. Returns the number of nodes freed.
    pub fn prune(&mut self) -> usize {
        let mut reachable = slotmap::SecondaryMap::new();
        let mut stack = self.top_level.clone();
        while let Some(id) = stack.pop() {
            if reachable.insert(id, ()).is_some() {
                continue;
            }
            if let Some(node) = self.nodes.get(id) {
                stack.extend_from_slice(&node.children);
            }
        }

        let before = self.nodes.len();
        self.nodes.retain(|id, _| reachable.contains_key(id));
        before - self.nodes.len()
    }
}
