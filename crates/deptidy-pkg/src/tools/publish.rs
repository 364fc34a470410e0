//! Sequential publishing of packages in a precomputed order.
//!
//! `<dir>/order.json` holds a JSON array of package directories relative to
//! `<dir>`, already sorted so that every package comes after its
//! dependencies. Entries that are not directories are skipped.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{info, warn};

/// Name of the order file.
pub const ORDER_FILE: &str = "order.json";

/// Default registry URL passed to the publish command.
pub const DEFAULT_REGISTRY: &str = "http://localhost:8000";

/// Options for a publish run.
#[derive(Debug, Clone)]
pub struct PublishOptions {
    /// Directory containing `order.json`.
    pub dir: PathBuf,

    /// Executable invoked as `<command> registry publish -d <pkg> -r <registry>`.
    pub command: PathBuf,

    /// Registry URL.
    pub registry: String,

    /// List what would be published without running anything.
    pub dry_run: bool,
}

/// Read the publish order from `<dir>/order.json`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a string array.
pub fn load_order(dir: &Path) -> Result<Vec<PathBuf>> {
    let path = dir.join(ORDER_FILE);
    let content = std::fs::read_to_string(&path).map_err(Error::io(&path))?;
    let entries: Vec<String> =
        serde_json::from_str(&content).map_err(|source| Error::Json { path, source })?;
    Ok(entries.into_iter().map(|entry| dir.join(entry)).collect())
}

/// Arguments passed to the publish command for one package.
#[must_use]
pub fn publish_args(package: &Path, registry: &str) -> Vec<String> {
    vec![
        "registry".to_string(),
        "publish".to_string(),
        "-d".to_string(),
        package.display().to_string(),
        "-r".to_string(),
        registry.to_string(),
    ]
}

/// Publish every package in order, stopping at the first failure.
///
/// Returns the package directories that were published (or would be).
///
/// # Errors
///
/// Returns [`Error::PublishFailed`] when the command exits unsuccessfully,
/// or an IO error if it cannot be started.
pub fn publish_all(options: &PublishOptions) -> Result<Vec<PathBuf>> {
    let mut published = Vec::new();

    for package in load_order(&options.dir)? {
        if !package.is_dir() {
            warn!(package = %package.display(), "not a directory, skipping");
            continue;
        }

        if !options.dry_run {
            info!(package = %package.display(), "publishing");
            let status = Command::new(&options.command)
                .args(publish_args(&package, &options.registry))
                .status()
                .map_err(Error::io(&options.command))?;
            if !status.success() {
                return Err(Error::PublishFailed {
                    dir: package,
                    status,
                });
            }
        }
        published.push(package);
    }

    Ok(published)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup(order: &str, dirs: &[&str]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(ORDER_FILE), order).unwrap();
        for dir in dirs {
            fs::create_dir_all(tmp.path().join(dir)).unwrap();
        }
        tmp
    }

    fn options(dir: &Path, command: &str, dry_run: bool) -> PublishOptions {
        PublishOptions {
            dir: dir.to_path_buf(),
            command: PathBuf::from(command),
            registry: DEFAULT_REGISTRY.to_string(),
            dry_run,
        }
    }

    #[test]
    fn args_shape() {
        assert_eq!(
            publish_args(Path::new("pkgs/core"), "http://r"),
            ["registry", "publish", "-d", "pkgs/core", "-r", "http://r"]
        );
    }

    #[test]
    fn dry_run_lists_directories_in_order() {
        let tmp = setup(r#"["pkgs/b", "pkgs/missing", "pkgs/a"]"#, &["pkgs/a", "pkgs/b"]);
        let published = publish_all(&options(tmp.path(), "does-not-exist", true)).unwrap();
        assert_eq!(
            published,
            vec![tmp.path().join("pkgs/b"), tmp.path().join("pkgs/a")]
        );
    }

    #[test]
    fn invalid_order_file() {
        let tmp = setup(r#"{"pkgs": []}"#, &[]);
        let err = load_order(tmp.path()).unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn successful_command_publishes_all() {
        let tmp = setup(r#"["a", "b"]"#, &["a", "b"]);
        let published = publish_all(&options(tmp.path(), "true", false)).unwrap();
        assert_eq!(published.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_stops_the_run() {
        let tmp = setup(r#"["a", "b"]"#, &["a", "b"]);
        let err = publish_all(&options(tmp.path(), "false", false)).unwrap_err();
        match err {
            Error::PublishFailed { dir, .. } => assert_eq!(dir, tmp.path().join("a")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
