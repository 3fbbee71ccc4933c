#![warn(missing_docs)]

//! Scene graph to OpenSCAD source compiler.
//!
//! A host engine builds a [`SceneTree`] through a small set of structural
//! edits (create, update, clone, append, insert, remove), passing loosely
//! typed property bags that are normalized into [`NodeData`]. The tree is
//! then serialized into OpenSCAD text or summarized as a [`BuildTree`].
//!
//! # Example
//!
//! ```
//! use scadgen::{ScadRoot, Props};
//! use serde_json::json;
//!
//! let mut root = ScadRoot::new();
//! let tree = root.tree_mut();
//! let props: Props = json!({"size": [1, 2, 3], "center": true})
//!     .as_object()
//!     .cloned()
//!     .unwrap_or_default();
//! let cube = tree.create("cube", &props);
//! tree.append_child_to_container(cube)?;
//!
//! assert!(root.to_text().ends_with("cube(size = [1, 2, 3], center = true);"));
//! # Ok::<(), scadgen::SceneError>(())
//! ```

pub mod config;
pub mod error;
pub mod normalize;
mod props;
pub mod report;
pub mod root;
pub mod serialize;
pub mod tree;

pub use config::RootConfig;
pub use error::{Result, SceneError};
pub use report::{build_tree, BuildTree, BuildTreeEntry};
pub use root::{CommitSummary, ScadRoot};
pub use serialize::{serialize_node, to_text, CREDIT};
pub use tree::{NodeId, Parent, SceneNode, SceneTree};

pub use scadgen_ir::{NodeData, NodeKind, Props, ScadExpr, Vec2, Vec3};
