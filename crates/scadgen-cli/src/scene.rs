//! JSON scene files and how they are mounted into a [`SceneTree`].
//!
//! A scene file is one node or an array of nodes:
//!
//! ```json
//! {"type": "difference", "children": [
//!   {"type": "cube", "props": {"size": 10, "center": true}},
//!   {"type": "sphere", "props": {"r": 6, "$fn": 64}}
//! ]}
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use scadgen::{NodeId, Parent, Props, SceneTree};
use serde::Deserialize;

/// Top level of a scene file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SceneFile {
    /// Several top-level nodes.
    Many(Vec<SceneChild>),
    /// A single top-level node.
    One(SceneChild),
}

/// An entry in a children list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SceneChild {
    /// Bare text, which the tree refuses.
    Text(String),
    /// A node.
    Node(SceneNodeSpec),
}

/// A node as written in the scene file.
#[derive(Debug, Deserialize)]
pub struct SceneNodeSpec {
    /// Kind name, e.g. `cube` or `linear_extrude`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Raw properties, normalized by the tree.
    #[serde(default)]
    pub props: Props,
    /// Children in order.
    #[serde(default)]
    pub children: Vec<SceneChild>,
}

impl SceneFile {
    /// Parse a scene document.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid scene file")
    }

    /// Read and parse a scene file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&json)
    }

    fn roots(&self) -> &[SceneChild] {
        match self {
            SceneFile::Many(children) => children,
            SceneFile::One(child) => std::slice::from_ref(child),
        }
    }

    /// Create every node and attach the top-level ones to the container.
    pub fn mount(&self, tree: &mut SceneTree) -> scadgen::Result<()> {
        for child in self.roots() {
            mount(tree, Parent::Container, child)?;
        }
        Ok(())
    }
}

/// Build a subtree bottom-up, then attach it, the way a host engine commits
/// a freshly created subtree.
fn mount(tree: &mut SceneTree, parent: Parent, child: &SceneChild) -> scadgen::Result<NodeId> {
    let id = match child {
        SceneChild::Text(text) => tree.create_text_instance(text)?,
        SceneChild::Node(spec) => {
            let id = tree.create(&spec.kind, &spec.props);
            for grandchild in &spec.children {
                mount(tree, Parent::Node(id), grandchild)?;
            }
            id
        }
    };
    tree.append(parent, id)?;
    Ok(id)
}
