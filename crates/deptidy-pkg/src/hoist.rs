//! Hoisting member dependency versions into `[workspace.dependencies]`.
//!
//! The pipeline is collect, resolve, mutate, write. Every mutation happens in
//! memory first; files are only written once the whole run has been computed,
//! root manifest first, each through a [`BackupManager`].
//!
//! Path declarations are never touched, with or without a version, even when
//! another occurrence of the same dependency is hoisted. Cargo ignores `path`
//! next to `workspace = true`, so rewriting them would drop the local crate.

use crate::backup::{BackupManager, BackupRecord};
use crate::collect::collect;
use crate::error::Result;
use crate::manifest::Manifest;
use crate::resolve::{resolve, Resolution, SkipReason};
use crate::workspace::Workspace;
use std::collections::BTreeSet;
use toml_edit::Item;
use tracing::{debug, info, warn};

/// A dependency newly added to the shared table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedDependency {
    /// Dependency name.
    pub name: String,
    /// Version written to the shared table.
    pub version: String,
}

/// A dependency left in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDependency {
    /// Dependency name.
    pub name: String,
    /// Why it was not hoisted.
    pub reason: SkipReason,
}

/// In-memory result of [`apply`].
#[derive(Debug, Default)]
pub struct HoistOutcome {
    /// Dependencies added to the shared table, in name order.
    pub added: Vec<AddedDependency>,

    /// Number of member declarations rewritten to workspace references.
    pub updated: usize,

    /// Dependencies that were not hoisted, in name order.
    pub skipped: Vec<SkippedDependency>,

    /// Indices of member manifests with at least one rewritten declaration.
    pub modified: BTreeSet<usize>,
}

impl HoistOutcome {
    /// Returns true if the root manifest's shared table changed.
    #[must_use]
    pub fn root_changed(&self) -> bool {
        !self.added.is_empty()
    }
}

/// Result of a full hoist run.
#[derive(Debug, Default)]
pub struct HoistReport {
    /// Dependencies added to the shared table.
    pub added: Vec<AddedDependency>,

    /// Number of member declarations rewritten.
    pub updated: usize,

    /// Dependencies that were not hoisted.
    pub skipped: Vec<SkippedDependency>,

    /// Backups taken before writing; empty in a dry run.
    pub backups: Vec<BackupRecord>,

    /// Whether this was a dry run.
    pub dry_run: bool,
}

/// Hoist in memory.
///
/// `manifests[0]` is the root. Existing shared entries are never
/// overwritten; members of a dependency already in the shared table are
/// still rewritten to reference it.
///
/// # Errors
///
/// Returns an error if the root's `workspace` or `workspace.dependencies`
/// key exists but is not a table.
pub fn apply(manifests: &mut [Manifest]) -> Result<HoistOutcome> {
    let occurrences = collect(manifests);
    let mut outcome = HoistOutcome::default();

    let Some((root, members)) = manifests.split_first_mut() else {
        return Ok(outcome);
    };
    let shared = root.ensure_shared_dependencies()?;

    for (name, occurrences) in occurrences {
        let version = match resolve(&occurrences) {
            Resolution::Hoist { version } => version,
            Resolution::Skip(reason) => {
                debug!(dependency = %name, %reason, "skipping");
                outcome.skipped.push(SkippedDependency { name, reason });
                continue;
            }
        };

        let canonical = match shared.get(&name) {
            Some(existing) => shared_version(existing).unwrap_or(&version).to_string(),
            None => {
                shared.insert(&name, toml_edit::value(version.as_str()));
                debug!(dependency = %name, %version, "added to shared table");
                outcome.added.push(AddedDependency {
                    name: name.clone(),
                    version: version.clone(),
                });
                version
            }
        };

        for occurrence in &occurrences {
            if occurrence.spec.is_path() {
                continue;
            }
            let Some(declared) = occurrence.spec.version() else {
                continue;
            };
            if declared != canonical {
                warn!(
                    dependency = %name,
                    declared,
                    canonical = %canonical,
                    "member declares a different version than the shared table"
                );
            }

            let member = &mut members[occurrence.manifest - 1];
            if member.make_workspace_reference(occurrence.section, &name) {
                outcome.updated += 1;
                outcome.modified.insert(occurrence.manifest);
            }
        }
    }

    Ok(outcome)
}

/// The version of a shared-table entry, in either of its shapes.
fn shared_version(item: &Item) -> Option<&str> {
    item.as_str().or_else(|| {
        item.as_table_like()?
            .get("version")
            .and_then(Item::as_str)
    })
}

/// Run a full hoist over a loaded workspace.
///
/// In a dry run nothing is written and no backup is taken. Otherwise the
/// root manifest is written first (only if an entry was added), then every
/// member manifest that was rewritten.
///
/// # Errors
///
/// Returns an error if the shared table has an unexpected shape or a write
/// fails.
pub fn hoist(workspace: &mut Workspace, dry_run: bool) -> Result<HoistReport> {
    let outcome = apply(&mut workspace.manifests)?;

    let mut report = HoistReport {
        updated: outcome.updated,
        dry_run,
        ..HoistReport::default()
    };

    if !dry_run {
        let mut backups = BackupManager::new();
        if outcome.root_changed() {
            workspace.manifests[0].save(&mut backups)?;
        }
        for &index in &outcome.modified {
            workspace.manifests[index].save(&mut backups)?;
        }
        report.backups = backups.into_records();
    }

    info!(
        added = outcome.added.len(),
        updated = outcome.updated,
        skipped = outcome.skipped.len(),
        dry_run,
        "hoist complete"
    );

    report.added = outcome.added;
    report.skipped = outcome.skipped;
    Ok(report)
}
