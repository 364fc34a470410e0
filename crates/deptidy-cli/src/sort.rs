//! Implementation of the `deptidy sort` command.

use anyhow::{Context, Result};
use deptidy_pkg::{Config, SortReport, Workspace};
use std::path::PathBuf;

/// Options for the sort command.
#[derive(Debug, Default)]
pub struct SortOptions {
    /// Workspace root.
    pub root: PathBuf,
    /// Compute the result without writing.
    pub dry_run: bool,
    /// Overrides `internal-prefix` from the config file.
    pub internal_prefix: Option<String>,
}

/// Sort every manifest and print a summary.
pub fn run(options: &SortOptions) -> Result<()> {
    let config = Config::load(&options.root)?;
    let mut workspace = Workspace::load(&options.root, config)
        .with_context(|| format!("Failed to load workspace at {}", options.root.display()))?;

    let report = deptidy_pkg::sort_workspace(
        &mut workspace,
        options.internal_prefix.as_deref(),
        options.dry_run,
    )?;

    for path in &report.changed {
        tracing::info!(path = %workspace.relative(path).display(), "sorted");
    }
    println!("{}", summary(&report));
    Ok(())
}

fn summary(report: &SortReport) -> String {
    let count = report.changed.len();
    if report.dry_run {
        format!("[dry-run] would sort {count} files")
    } else {
        format!("sorted {count} files")
    }
}
