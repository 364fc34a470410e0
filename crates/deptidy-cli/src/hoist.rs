//! Implementation of the `deptidy hoist` command.

use anyhow::{Context, Result};
use deptidy_pkg::{Config, HoistReport, Workspace};
use std::path::PathBuf;

/// Options for the hoist command.
#[derive(Debug, Default)]
pub struct HoistOptions {
    /// Workspace root.
    pub root: PathBuf,
    /// Compute the result without writing.
    pub dry_run: bool,
    /// List added and skipped dependencies.
    pub verbose: bool,
}

/// Hoist duplicated versions and print a summary.
pub fn run(options: &HoistOptions) -> Result<()> {
    let config = Config::load(&options.root)?;
    let mut workspace = Workspace::load(&options.root, config)
        .with_context(|| format!("Failed to load workspace at {}", options.root.display()))?;

    let report = deptidy_pkg::hoist(&mut workspace, options.dry_run)?;
    for line in summary_lines(&report, &workspace, options.verbose) {
        println!("{line}");
    }
    Ok(())
}

/// Lines printed after a run.
fn summary_lines(report: &HoistReport, workspace: &Workspace, verbose: bool) -> Vec<String> {
    let mut lines = Vec::new();

    if verbose {
        for added in &report.added {
            lines.push(format!("add {} = {}", added.name, added.version));
        }
        for skipped in &report.skipped {
            lines.push(format!("skip {} ({})", skipped.name, skipped.reason));
        }
    }

    let counts = format!(
        "added={} updated={} skipped={}",
        report.added.len(),
        report.updated,
        report.skipped.len()
    );
    if report.dry_run {
        lines.push(format!("[dry-run] {counts}"));
    } else {
        lines.push(format!("done: {counts}"));
    }

    if !report.backups.is_empty() {
        lines.push("backups:".to_string());
        for record in &report.backups {
            let name = record
                .backup
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            lines.push(format!(
                "  {} -> {name}",
                workspace.relative(&record.original).display()
            ));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use deptidy_pkg::{AddedDependency, BackupRecord, SkipReason, SkippedDependency};
    use std::fs;
    use tempfile::TempDir;

    fn workspace() -> (TempDir, Workspace) {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("Cargo.toml"), "[workspace]\n").unwrap();
        let ws = Workspace::load(tmp.path(), Config::default()).unwrap();
        (tmp, ws)
    }

    fn report(dry_run: bool) -> HoistReport {
        HoistReport {
            added: vec![AddedDependency {
                name: "foo".into(),
                version: "1.2".into(),
            }],
            updated: 1,
            skipped: vec![SkippedDependency {
                name: "bar".into(),
                reason: SkipReason::PathDependency,
            }],
            backups: Vec::new(),
            dry_run,
        }
    }

    #[test]
    fn test_dry_run_summary() {
        let (_tmp, ws) = workspace();
        let lines = summary_lines(&report(true), &ws, false);
        assert_eq!(lines, ["[dry-run] added=1 updated=1 skipped=1"]);
    }

    #[test]
    fn test_verbose_lists_dependencies() {
        let (_tmp, ws) = workspace();
        let lines = summary_lines(&report(false), &ws, true);
        assert_eq!(lines[0], "add foo = 1.2");
        assert!(lines[1].starts_with("skip bar ("));
        assert_eq!(lines[2], "done: added=1 updated=1 skipped=1");
    }

    #[test]
    fn test_backups_are_listed_relative_to_root() {
        let (_tmp, ws) = workspace();
        let mut report = report(false);
        let original = ws.root.join("crates/a/Cargo.toml");
        report.backups.push(BackupRecord {
            backup: ws.root.join("crates/a/Cargo.toml.bak"),
            original,
        });

        let lines = summary_lines(&report, &ws, false);
        assert_eq!(lines[1], "backups:");
        assert_eq!(lines[2], "  crates/a/Cargo.toml -> Cargo.toml.bak");
    }
}
