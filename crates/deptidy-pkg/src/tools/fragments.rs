//! Detection of test-suite fragments that no test refers to.
//!
//! A fragment is a `*.ks` or `*.toml` file in `<suite>/fragments`. It counts
//! as used when its file stem appears anywhere in the text of
//! `<suite>/tests/*.rs`.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Fragment directory inside the suite.
pub const FRAGMENTS_DIR: &str = "fragments";

/// Test directory inside the suite.
pub const TESTS_DIR: &str = "tests";

/// Extensions of fragment files.
pub const FRAGMENT_EXTENSIONS: [&str; 2] = ["ks", "toml"];

fn glob_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/*.{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        extension
    );
    let mut paths = Vec::new();
    for entry in glob::glob(&pattern)? {
        let path = entry.map_err(|e| Error::Io {
            path: e.path().to_path_buf(),
            source: e.into_error(),
        })?;
        paths.push(path);
    }
    Ok(paths)
}

/// All fragment files of a suite, sorted.
///
/// # Errors
///
/// Returns an error if the fragment directory cannot be listed.
pub fn fragment_paths(suite: &Path) -> Result<Vec<PathBuf>> {
    let dir = suite.join(FRAGMENTS_DIR);
    let mut paths = Vec::new();
    for extension in FRAGMENT_EXTENSIONS {
        paths.extend(glob_files(&dir, extension)?);
    }
    paths.sort();
    Ok(paths)
}

/// The concatenated source of every test file in a suite.
///
/// # Errors
///
/// Returns an error if a test file cannot be read.
pub fn test_sources(suite: &Path) -> Result<String> {
    let mut sources = Vec::new();
    for path in glob_files(&suite.join(TESTS_DIR), "rs")? {
        sources.push(std::fs::read_to_string(&path).map_err(Error::io(&path))?);
    }
    Ok(sources.join("\n"))
}

/// Fragments whose stem does not occur in `tests`.
#[must_use]
pub fn unused_fragments<'a>(fragments: &'a [PathBuf], tests: &str) -> Vec<&'a Path> {
    fragments
        .iter()
        .filter(|path| {
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .map_or(true, |stem| !tests.contains(stem))
        })
        .map(PathBuf::as_path)
        .collect()
}

/// Check a suite and return its unused fragments.
///
/// # Errors
///
/// Returns an error if the suite cannot be read.
pub fn check_suite(suite: &Path) -> Result<Vec<PathBuf>> {
    let fragments = fragment_paths(suite)?;
    let tests = test_sources(suite)?;
    Ok(unused_fragments(&fragments, &tests)
        .into_iter()
        .map(Path::to_path_buf)
        .collect())
}
