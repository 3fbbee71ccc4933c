//! A scene tree bound to an optional output file.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::config::RootConfig;
use crate::error::{Result, SceneError};
use crate::report::{build_tree, BuildTree};
use crate::serialize::to_text;
use crate::tree::SceneTree;

/// Outcome of a commit that wrote a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    /// File that was written.
    pub path: PathBuf,
    /// Bytes written.
    pub bytes: usize,
    /// Time spent serializing and writing.
    pub elapsed: Duration,
}

/// Owns a [`SceneTree`] and the file it is written to after each render pass.
///
/// ```ignore
/// let mut root = ScadRoot::with_output("out/model.scad");
/// root.render(|tree| {
///     let cube = tree.create("cube", &props);
///     tree.append_child_to_container(cube)
/// })?;
/// ```
#[derive(Debug)]
pub struct ScadRoot {
    tree: SceneTree,
    output: Option<PathBuf>,
    create_dirs: bool,
}

impl Default for ScadRoot {
    fn default() -> Self {
        Self::new()
    }
}

impl ScadRoot {
    /// A root with no output file; text is only available via [`ScadRoot::to_text`].
    pub fn new() -> Self {
        Self::from_config(&RootConfig::default())
    }

    /// A root that writes to `path` on every commit.
    pub fn with_output(path: impl Into<PathBuf>) -> Self {
        Self {
            output: Some(path.into()),
            ..Self::new()
        }
    }

    /// A root built from configuration.
    pub fn from_config(config: &RootConfig) -> Self {
        Self {
            tree: SceneTree::new(),
            output: config.output.clone(),
            create_dirs: config.create_dirs,
        }
    }

    /// Destination file, if any.
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    /// The scene tree.
    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }

    /// Mutable access for the host engine.
    pub fn tree_mut(&mut self) -> &mut SceneTree {
        &mut self.tree
    }

    /// Serialize the current tree.
    pub fn to_text(&self) -> String {
        to_text(&self.tree)
    }

    /// Build-tree report for the current tree.
    pub fn report(&self) -> BuildTree {
        build_tree(&self.tree)
    }

    /// Run one render pass against the tree, then commit.
    ///
    /// Nothing is written when the pass fails.
    pub fn render<F>(&mut self, pass: F) -> Result<Option<CommitSummary>>
    where
        F: FnOnce(&mut SceneTree) -> Result<()>,
    {
        pass(&mut self.tree)?;
        self.commit()
    }

    /// Finish a render pass.
    ///
    /// Frees detached nodes, then rewrites the output file with the whole
    /// tree. Returns `None` when the root has no output file.
    pub fn commit(&mut self) -> Result<Option<CommitSummary>> {
        let pruned = self.tree.prune();
        if pruned > 0 {
            debug!("pruned {pruned} detached nodes");
        }

        let Some(path) = self.output.clone() else {
            return Ok(None);
        };

        let start = Instant::now();
        if self.create_dirs {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir).map_err(|source| SceneError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
        }

        let text = self.to_text();
        std::fs::write(&path, &text).map_err(|source| SceneError::Io {
            path: path.clone(),
            source,
        })?;

        let elapsed = start.elapsed();
        info!(
            "wrote {} ({} bytes) in {}ms",
            path.display(),
            text.len(),
            elapsed.as_millis()
        );
        Ok(Some(CommitSummary {
            path,
            bytes: text.len(),
            elapsed,
        }))
    }
}
