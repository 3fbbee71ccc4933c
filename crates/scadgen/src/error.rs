//! Error types for scene construction and output.

use std::path::PathBuf;

use thiserror::Error;

use crate::tree::NodeId;

/// Errors raised by the scene tree and the commit writer.
#[derive(Error, Debug)]
pub enum SceneError {
    /// The tree has no representation for bare text between nodes.
    #[error("text nodes are not supported, use only SCAD primitives (got {text:?})")]
    TextNodeUnsupported {
        /// The rejected text.
        text: String,
    },

    /// A handle that is not (or no longer) part of the tree.
    #[error("node {0:?} does not exist in this tree")]
    UnknownNode(NodeId),

    /// Writing the generated source failed.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Path being written or created.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for scene operations.
pub type Result<T> = std::result::Result<T, SceneError>;
