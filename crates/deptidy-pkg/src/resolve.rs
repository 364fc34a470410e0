//! Canonical version selection for hoisting.
//!
//! There is no semver reasoning and no merging of requirements: the first
//! version encountered in occurrence order wins.

use crate::collect::Occurrence;
use std::fmt;

/// The decision for one dependency name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Hoist with this version into the shared table.
    Hoist {
        /// The first version seen.
        version: String,
    },

    /// Leave every occurrence untouched.
    Skip(SkipReason),
}

/// Why a dependency could not be hoisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Only path declarations were found.
    PathDependency,

    /// No declaration carries a version (e.g. git-only dependencies).
    NoVersion,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PathDependency => f.write_str("path dependency"),
            Self::NoVersion => f.write_str("no version declared"),
        }
    }
}

/// Resolve one dependency's occurrence list.
///
/// Path occurrences are never candidates, even when they also carry a
/// version. They signal a skip but do not stop the search: if any other
/// occurrence carries a version, that version wins.
#[must_use]
pub fn resolve(occurrences: &[Occurrence]) -> Resolution {
    let mut path = false;

    for occurrence in occurrences {
        if occurrence.spec.is_path() {
            path = true;
            continue;
        }
        if let Some(version) = occurrence.spec.version() {
            return Resolution::Hoist {
                version: version.to_string(),
            };
        }
    }

    if path {
        Resolution::Skip(SkipReason::PathDependency)
    } else {
        Resolution::Skip(SkipReason::NoVersion)
    }
}
