//! Root configuration loaded from a TOML file.
//!
//! ```toml
//! output = "out/model.scad"
//! create_dirs = true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, SceneError};

/// Settings for a [`ScadRoot`](crate::ScadRoot).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RootConfig {
    /// Destination file written on every commit.
    #[serde(default)]
    pub output: Option<PathBuf>,
    /// Create missing parent directories of `output` before writing.
    #[serde(default = "default_create_dirs")]
    pub create_dirs: bool,
}

fn default_create_dirs() -> bool {
    true
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            output: None,
            create_dirs: default_create_dirs(),
        }
    }
}

impl RootConfig {
    /// Parse a configuration document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Read and parse a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}
