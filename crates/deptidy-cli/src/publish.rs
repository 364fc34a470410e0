//! Implementation of the `deptidy publish` command.

use anyhow::Result;
use deptidy_pkg::tools::publish::{publish_all, PublishOptions};

/// Publish packages in order and list them.
pub fn run(options: &PublishOptions) -> Result<()> {
    let published = publish_all(options)?;

    let verb = if options.dry_run {
        "would publish"
    } else {
        "published"
    };
    for package in &published {
        let name = package.strip_prefix(&options.dir).unwrap_or(package);
        println!("{verb} {}", name.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use deptidy_pkg::tools::publish::{DEFAULT_REGISTRY, ORDER_FILE};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_dry_run_does_not_spawn() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(ORDER_FILE), r#"["core"]"#).unwrap();
        fs::create_dir(tmp.path().join("core")).unwrap();

        let options = PublishOptions {
            dir: tmp.path().to_path_buf(),
            command: PathBuf::from("/nonexistent/publisher"),
            registry: DEFAULT_REGISTRY.to_string(),
            dry_run: true,
        };
        assert!(run(&options).is_ok());
    }

    #[test]
    fn test_missing_order_file_fails() {
        let tmp = TempDir::new().unwrap();
        let options = PublishOptions {
            dir: tmp.path().to_path_buf(),
            command: PathBuf::from("publisher"),
            registry: DEFAULT_REGISTRY.to_string(),
            dry_run: true,
        };
        assert!(run(&options).is_err());
    }
}
