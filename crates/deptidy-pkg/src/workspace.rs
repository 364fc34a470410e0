//! Manifest discovery for multi-package projects.
//!
//! Every `Cargo.toml` under the root is part of the run, except those inside
//! ignored directories. The order is fixed: the root manifest first, then
//! the remaining paths sorted lexicographically. Version resolution is
//! first-seen-wins, so this order decides which version a hoist picks.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::manifest::{Manifest, MANIFEST_FILE};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A project root together with all of its parsed manifests.
#[derive(Debug)]
pub struct Workspace {
    /// Root directory of the project.
    pub root: PathBuf,

    /// Effective configuration.
    pub config: Config,

    /// Loaded manifests; index 0 is always the root manifest.
    pub manifests: Vec<Manifest>,
}

impl Workspace {
    /// Discover and parse every manifest under `root`.
    ///
    /// Parsing is all-or-nothing: a single malformed manifest fails the load
    /// before anything can be written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingRootManifest`] if `root` has no manifest, or
    /// [`Error::MalformedManifest`] if any discovered file fails to parse.
    pub fn load(root: impl AsRef<Path>, config: Config) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let manifests = Self::discover(&root, &config)?
            .iter()
            .map(Manifest::from_path)
            .collect::<Result<Vec<_>>>()?;

        debug!(root = %root.display(), count = manifests.len(), "loaded manifests");

        Ok(Self {
            root,
            config,
            manifests,
        })
    }

    /// List manifest paths under `root`, root manifest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingRootManifest`] if `root` has no manifest.
    pub fn discover(root: &Path, config: &Config) -> Result<Vec<PathBuf>> {
        let root_manifest = root.join(MANIFEST_FILE);
        if !root_manifest.is_file() {
            return Err(Error::MissingRootManifest(root.to_path_buf()));
        }

        let pattern = format!(
            "{}/**/{}",
            glob::Pattern::escape(&root.to_string_lossy()),
            MANIFEST_FILE
        );

        let mut members = Vec::new();
        for entry in glob::glob(&pattern)? {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!(path = %e.path().display(), "skipping unreadable path: {}", e.error());
                    continue;
                }
            };

            if path == root_manifest || config.is_ignored(root, &path) {
                continue;
            }
            members.push(path);
        }
        members.sort();

        let mut paths = Vec::with_capacity(members.len() + 1);
        paths.push(root_manifest);
        paths.extend(members);
        Ok(paths)
    }

    /// The root manifest.
    #[must_use]
    pub fn root_manifest(&self) -> &Manifest {
        &self.manifests[0]
    }

    /// Member manifests, in discovery order.
    #[must_use]
    pub fn members(&self) -> &[Manifest] {
        &self.manifests[1..]
    }

    /// Path relative to the workspace root, for display.
    #[must_use]
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn missing_root_manifest() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "crates/a/Cargo.toml", "");

        let err = Workspace::discover(tmp.path(), &Config::default()).unwrap_err();
        assert!(matches!(err, Error::MissingRootManifest(_)));
    }

    #[test]
    fn root_first_then_sorted() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "Cargo.toml", "[workspace]\n");
        touch(tmp.path(), "crates/zeta/Cargo.toml", "");
        touch(tmp.path(), "crates/alpha/Cargo.toml", "");
        touch(tmp.path(), "app/Cargo.toml", "");

        let paths = Workspace::discover(tmp.path(), &Config::default()).unwrap();
        let relative: Vec<_> = paths
            .iter()
            .map(|p| p.strip_prefix(tmp.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            relative,
            vec![
                PathBuf::from("Cargo.toml"),
                PathBuf::from("app/Cargo.toml"),
                PathBuf::from("crates/alpha/Cargo.toml"),
                PathBuf::from("crates/zeta/Cargo.toml"),
            ]
        );
    }

    #[test]
    fn ignored_directories_are_skipped() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "Cargo.toml", "[workspace]\n");
        touch(tmp.path(), "crates/a/Cargo.toml", "");
        touch(tmp.path(), "target/package/a-0.1.0/Cargo.toml", "");
        touch(tmp.path(), "vendor/serde/Cargo.toml", "");
        touch(tmp.path(), "web/node_modules/x/Cargo.toml", "");

        let paths = Workspace::discover(tmp.path(), &Config::default()).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[1].ends_with("crates/a/Cargo.toml"));
    }

    #[test]
    fn load_fails_on_any_malformed_manifest() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "Cargo.toml", "[workspace]\n");
        touch(tmp.path(), "crates/a/Cargo.toml", "[package]\nname = \"a\"\n");
        touch(tmp.path(), "crates/b/Cargo.toml", "[package\n");

        let err = Workspace::load(tmp.path(), Config::default()).unwrap_err();
        match err {
            Error::MalformedManifest { path, .. } => assert!(path.ends_with("crates/b/Cargo.toml")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_workspace() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "Cargo.toml", "[workspace]\nmembers = [\"crates/a\"]\n");
        touch(tmp.path(), "crates/a/Cargo.toml", "[package]\nname = \"a\"\n");

        let workspace = Workspace::load(tmp.path(), Config::default()).unwrap();
        assert_eq!(workspace.members().len(), 1);
        assert_eq!(
            workspace.relative(workspace.members()[0].path()),
            Path::new("crates/a/Cargo.toml")
        );
        assert!(workspace.root_manifest().shared_dependencies().is_none());
    }
}
