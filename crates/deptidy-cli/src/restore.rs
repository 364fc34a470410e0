//! Implementation of the `deptidy restore` command.

use anyhow::Result;
use deptidy_pkg::{Config, RestoreReport, RestoreSource};
use std::path::{Path, PathBuf};

/// Options for the restore command.
#[derive(Debug, Default)]
pub struct RestoreOptions {
    /// Workspace root.
    pub root: PathBuf,
    /// Report without copying.
    pub dry_run: bool,
    /// Restore the newest backup of each manifest.
    pub latest: bool,
}

/// Restore manifests from backups and print what happened.
pub fn run(options: &RestoreOptions) -> Result<()> {
    let config = Config::load(&options.root)?;
    let source = if options.latest {
        RestoreSource::Latest
    } else {
        RestoreSource::Oldest
    };

    let report = deptidy_pkg::restore(&options.root, &config, source, options.dry_run)?;
    for line in summary_lines(&report, &options.root) {
        println!("{line}");
    }
    Ok(())
}

fn summary_lines(report: &RestoreReport, root: &Path) -> Vec<String> {
    if report.is_empty() {
        return vec!["No Cargo.toml.bak files found".to_string()];
    }

    let relative = |path: &Path| path.strip_prefix(root).unwrap_or(path).display().to_string();
    let mut lines = Vec::new();

    for record in &report.restored {
        let verb = if report.dry_run { "would restore" } else { "restored" };
        lines.push(format!("{verb} {}", relative(&record.original)));
    }
    for backup in &report.missing {
        lines.push(format!("skip {} (no original)", relative(backup)));
    }

    let count = report.restored.len();
    if report.dry_run {
        lines.push(format!("[dry-run] would restore {count} files"));
    } else {
        lines.push(format!("restored {count} files"));
    }
    lines
}
