//! Implementation of the `deptidy syntax-docs` command.

use anyhow::{Context, Result};
use deptidy_pkg::tools::syntax_docs::{load_tokens, write_docs};
use std::path::Path;

/// Render every token category of `tokens` into `out`.
pub fn run(tokens: &Path, out: &Path) -> Result<()> {
    let table = load_tokens(tokens)?;
    let written = write_docs(&table, out)
        .with_context(|| format!("Failed to write syntax pages to {}", out.display()))?;

    for path in &written {
        println!("wrote {}", path.display());
    }
    Ok(())
}
