//! Deterministic ordering of dependency tables and workspace members.
//!
//! Dependencies whose name starts with the internal prefix come first, then
//! everything else; each group is alphabetical. `[workspace] members` is
//! sorted as plain strings. Both orders are total, so sorting is idempotent.

use crate::backup::{BackupManager, BackupRecord};
use crate::error::Result;
use crate::manifest::{Manifest, Section, MEMBERS_KEY, SHARED_DEPENDENCIES_KEY, WORKSPACE_KEY};
use crate::workspace::Workspace;
use std::cmp::Ordering;
use std::path::PathBuf;
use toml_edit::{Array, Item, Table, Value};
use tracing::{debug, info};

/// Compare two dependency names: internal-prefixed first, then by name.
#[must_use]
pub fn compare_names(prefix: Option<&str>, a: &str, b: &str) -> Ordering {
    let internal = |name: &str| prefix.is_some_and(|p| name.starts_with(p));
    internal(b).cmp(&internal(a)).then_with(|| a.cmp(b))
}

/// Fold `[section.name]` sub-tables into inline entries of their parent.
///
/// Sub-tables print in document position order regardless of key order, so a
/// section can only be sorted once every entry lives in one table body.
fn inline_sub_tables(table: &mut Table) {
    let mut first_position: Option<usize> = None;
    for (_, item) in table.iter_mut() {
        if let Item::Table(sub) = item {
            if let Some(position) = sub.position() {
                first_position = Some(first_position.map_or(position, |p| p.min(position)));
            }
            let mut inline = std::mem::take(sub).into_inline_table();
            inline.fmt();
            *item = Item::Value(Value::InlineTable(inline));
        }
    }

    if let Some(position) = first_position {
        table.set_implicit(false);
        if table.position().map_or(true, |p| p > position) {
            table.set_position(position);
        }
    }
}

fn sort_table(item: &mut Item, prefix: Option<&str>) {
    match item {
        Item::Table(table) => {
            inline_sub_tables(table);
            table.sort_values_by(|a, _, b, _| compare_names(prefix, a.get(), b.get()));
        }
        Item::Value(Value::InlineTable(table)) => {
            table.sort_values_by(|a, _, b, _| compare_names(prefix, a.get(), b.get()));
        }
        _ => {}
    }
}

fn sort_members(members: &mut Array) {
    let mut names: Vec<String> = members
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();
    if names.len() != members.len() {
        return;
    }
    names.sort();

    for (index, name) in names.into_iter().enumerate() {
        if members.get(index).and_then(Value::as_str) != Some(name.as_str()) {
            members.replace(index, name);
        }
    }
}

/// Sort one manifest in memory. Returns true if its text changed.
pub fn sort_manifest(manifest: &mut Manifest, prefix: Option<&str>) -> bool {
    let before = manifest.to_toml_string();
    let doc = manifest.document_mut();

    for section in Section::ALL {
        if let Some(item) = doc.get_mut(section.key()) {
            sort_table(item, prefix);
        }
    }

    if let Some(workspace) = doc
        .get_mut(WORKSPACE_KEY)
        .and_then(Item::as_table_like_mut)
    {
        if let Some(shared) = workspace.get_mut(SHARED_DEPENDENCIES_KEY) {
            sort_table(shared, prefix);
        }
        if let Some(members) = workspace.get_mut(MEMBERS_KEY).and_then(Item::as_array_mut) {
            sort_members(members);
        }
    }

    manifest.to_toml_string() != before
}

/// Result of a sort run.
#[derive(Debug, Default)]
pub struct SortReport {
    /// Manifests whose order changed (or would change, in a dry run).
    pub changed: Vec<PathBuf>,

    /// Backups taken before writing; empty in a dry run.
    pub backups: Vec<BackupRecord>,

    /// Whether this was a dry run.
    pub dry_run: bool,
}

/// Sort every manifest of a loaded workspace.
///
/// `prefix` overrides the configured internal prefix. Only manifests whose
/// text changes are backed up and written.
///
/// # Errors
///
/// Returns an error if a backup or write fails.
pub fn sort_workspace(
    workspace: &mut Workspace,
    prefix: Option<&str>,
    dry_run: bool,
) -> Result<SortReport> {
    let prefix = prefix.or(workspace.config.internal_prefix.as_deref());
    let mut report = SortReport {
        dry_run,
        ..SortReport::default()
    };
    let mut backups = BackupManager::new();

    for manifest in &mut workspace.manifests {
        if !sort_manifest(manifest, prefix) {
            continue;
        }
        debug!(path = %manifest.path().display(), "order changed");
        if !dry_run {
            manifest.save(&mut backups)?;
        }
        report.changed.push(manifest.path().to_path_buf());
    }

    report.backups = backups.into_records();
    info!(changed = report.changed.len(), dry_run, "sort complete");
    Ok(report)
}
