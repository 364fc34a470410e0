//! Implementation of the `deptidy fragments` command.

use anyhow::{bail, Result};
use deptidy_pkg::tools::fragments::check_suite;
use std::path::Path;

/// Print unused fragments; fails when there are any.
pub fn run(suite: &Path) -> Result<()> {
    let unused = check_suite(suite)?;
    if unused.is_empty() {
        println!("All fragments are used.");
        return Ok(());
    }

    for path in &unused {
        println!("{}", path.strip_prefix(suite).unwrap_or(path).display());
    }
    bail!("{} unused fragment(s) in {}", unused.len(), suite.display())
}
