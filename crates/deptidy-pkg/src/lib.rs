//! Dependency maintenance for multi-package Cargo workspaces.
//!
//! This crate provides:
//! - A format-preserving model of `Cargo.toml` manifests
//! - Manifest discovery with a root-first, lexicographic order
//! - Hoisting of member dependency versions into `[workspace.dependencies]`
//! - Collision-safe backups of every rewritten manifest, and restore
//! - Deterministic sorting of dependency tables and member lists
//! - Small maintenance tools for test fixtures, docs, publishing and mock data

mod backup;
mod collect;
mod config;
mod error;
mod hoist;
mod manifest;
mod resolve;
mod sort;
pub mod tools;
mod workspace;

pub use backup::{
    backup_stamp, create_backup, default_backup_path, restore, timestamped_backup_path,
    BackupManager, BackupRecord, BackupStamp, RestoreReport, RestoreSource, BACKUP_EXT,
    TIMESTAMP_FORMAT,
};
pub use collect::{collect, Occurrence, Occurrences};
pub use config::{Config, CONFIG_FILE, DEFAULT_IGNORES};
pub use error::{Error, Result};
pub use hoist::{apply, hoist, AddedDependency, HoistOutcome, HoistReport, SkippedDependency};
pub use manifest::{
    DependencySpec, DetailedSpec, Manifest, Section, MANIFEST_FILE, MEMBERS_KEY,
    SHARED_DEPENDENCIES_KEY, WORKSPACE_KEY,
};
pub use resolve::{resolve, Resolution, SkipReason};
pub use sort::{compare_names, sort_manifest, sort_workspace, SortReport};
pub use workspace::Workspace;
