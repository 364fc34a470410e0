//! deptidy CLI - keeps a Cargo workspace's dependency declarations tidy

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod downloads;
mod fragments;
mod hoist;
mod publish;
mod restore;
mod sort;
mod syntax_docs;

#[derive(Parser)]
#[command(name = "deptidy")]
#[command(version)]
#[command(about = "Hoist, sort and restore Cargo workspace dependencies", long_about = None)]
struct Cli {
    /// Log filter (e.g. "warn", "debug", "deptidy_pkg=trace"); RUST_LOG wins when set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Move member dependency versions into [workspace.dependencies]
    Hoist {
        /// Workspace root (defaults to the current directory)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,

        /// List each added and skipped dependency
        #[arg(short, long)]
        verbose: bool,
    },

    /// Put manifests back from their backups
    Restore {
        /// Workspace root (defaults to the current directory)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Report what would be restored without copying anything
        #[arg(long)]
        dry_run: bool,

        /// Restore the newest backup instead of the oldest
        #[arg(long)]
        latest: bool,
    },

    /// Sort dependency tables and workspace members
    Sort {
        /// Workspace root (defaults to the current directory)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Names with this prefix sort first (overrides deptidy.toml)
        #[arg(long)]
        internal_prefix: Option<String>,
    },

    /// List test-suite fragments no test refers to
    Fragments {
        /// Test suite directory
        #[arg(long, default_value = "test-suite")]
        suite: PathBuf,
    },

    /// Generate syntax reference pages from a token description file
    SyntaxDocs {
        /// Token description file
        #[arg(long, default_value = "syntax.json")]
        tokens: PathBuf,

        /// Output directory
        #[arg(long, default_value = "docs/src/syntax")]
        out: PathBuf,
    },

    /// Publish packages to a registry in the order given by order.json
    Publish {
        /// Directory containing order.json
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Publishing executable
        #[arg(long)]
        command: PathBuf,

        /// Registry URL
        #[arg(long, default_value = deptidy_pkg::tools::publish::DEFAULT_REGISTRY)]
        registry: String,

        /// List packages without running the command
        #[arg(long)]
        dry_run: bool,
    },

    /// Print synthetic download statistics as SQL inserts
    Downloads {
        /// Versions to generate rows for (comma-separated)
        #[arg(long, value_delimiter = ',', required = true)]
        versions: Vec<String>,

        /// Number of days, ending today
        #[arg(long, default_value_t = 30)]
        days: u32,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Target table name
        #[arg(long, default_value = "downloads")]
        table: String,
    },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// The workspace root: the given path or the current directory, canonicalized when possible.
fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf> {
    let root = match root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    Ok(root.canonicalize().unwrap_or(root))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Hoist {
            root,
            dry_run,
            verbose,
        } => {
            let options = hoist::HoistOptions {
                root: resolve_root(root)?,
                dry_run,
                verbose,
            };
            hoist::run(&options)?;
        }

        Commands::Restore {
            root,
            dry_run,
            latest,
        } => {
            let options = restore::RestoreOptions {
                root: resolve_root(root)?,
                dry_run,
                latest,
            };
            restore::run(&options)?;
        }

        Commands::Sort {
            root,
            dry_run,
            internal_prefix,
        } => {
            let options = sort::SortOptions {
                root: resolve_root(root)?,
                dry_run,
                internal_prefix,
            };
            sort::run(&options)?;
        }

        Commands::Fragments { suite } => {
            fragments::run(&suite)?;
        }

        Commands::SyntaxDocs { tokens, out } => {
            syntax_docs::run(&tokens, &out)?;
        }

        Commands::Publish {
            dir,
            command,
            registry,
            dry_run,
        } => {
            let options = deptidy_pkg::tools::publish::PublishOptions {
                dir,
                command,
                registry,
                dry_run,
            };
            publish::run(&options)?;
        }

        Commands::Downloads {
            versions,
            days,
            seed,
            table,
        } => {
            let options = downloads::DownloadsOptions {
                versions,
                days,
                seed,
                table,
            };
            downloads::run(&options);
        }
    }

    Ok(())
}
