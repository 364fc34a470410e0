//! Errors raised by manifest discovery, parsing and rewriting.

use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use thiserror::Error;

/// Errors that abort a deptidy run.
///
/// Skipped dependencies, backup name collisions and restores without an
/// original manifest are not errors; they are reported as data.
#[derive(Error, Debug)]
pub enum Error {
    #[error("no Cargo.toml found in {}", .0.display())]
    MissingRootManifest(PathBuf),

    #[error("failed to parse manifest {}: {source}", path.display())]
    MalformedManifest {
        path: PathBuf,
        source: toml_edit::TomlError,
    },

    #[error("unexpected structure in {}: {reason}", path.display())]
    UnexpectedShape { path: PathBuf, reason: String },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("publish failed for {}: {status}", dir.display())]
    PublishFailed { dir: PathBuf, status: ExitStatus },
}

impl Error {
    /// Wrap an IO error with the path it happened on, for use with `map_err`.
    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.to_path_buf();
        move |source| Self::Io { path, source }
    }

    pub(crate) fn shape(path: &Path, reason: impl Into<String>) -> Self {
        Self::UnexpectedShape {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
