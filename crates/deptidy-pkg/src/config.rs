//! Optional `deptidy.toml` configuration at the workspace root.
//!
//! ```toml
//! internal-prefix = "acme"
//! ignore = ["target", ".git", "node_modules", "vendor", "third_party"]
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::{Component, Path};

/// The configuration filename.
pub const CONFIG_FILE: &str = "deptidy.toml";

/// Directory names skipped during discovery unless configured otherwise.
pub const DEFAULT_IGNORES: [&str; 4] = ["target", ".git", "node_modules", "vendor"];

/// Project-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct Config {
    /// Name prefix of the project's own packages, sorted first.
    #[serde(default)]
    pub internal_prefix: Option<String>,

    /// Directory names whose contents are never scanned.
    #[serde(default = "default_ignores")]
    pub ignore: Vec<String>,
}

fn default_ignores() -> Vec<String> {
    DEFAULT_IGNORES.iter().map(|s| (*s).to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            internal_prefix: None,
            ignore: default_ignores(),
        }
    }
}

impl Config {
    /// Load `deptidy.toml` from a root directory, falling back to defaults
    /// when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let path = root.as_ref().join(CONFIG_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(Error::io(&path))?;
        Self::parse(&content).map_err(|source| Error::Config { path, source })
    }

    /// Parse a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or has unknown keys.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Check whether a path lies inside an ignored directory.
    ///
    /// Only the components below `root` are considered.
    #[must_use]
    pub fn is_ignored(&self, root: &Path, path: &Path) -> bool {
        let relative = path.strip_prefix(root).unwrap_or(path);
        relative.components().any(|component| match component {
            Component::Normal(name) => self.ignore.iter().any(|i| OsStr::new(i) == name),
            _ => false,
        })
    }
}
