//! Manifest backups and restore.
//!
//! The first backup of a manifest is `<name>.bak`. Once that name is taken,
//! further backups are `<name>.<YYYYMMDDTHHMMSSZ>.bak`, with a `-N` suffix on
//! the timestamp if two backups land in the same second. Backup files are
//! opened with `create_new`, so an existing backup is never overwritten.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::manifest::MANIFEST_FILE;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Backup file extension.
pub const BACKUP_EXT: &str = "bak";

/// UTC timestamp format used in backup names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// A manifest and the backup taken of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    /// The manifest that was backed up (or restored).
    pub original: PathBuf,

    /// The backup file.
    pub backup: PathBuf,
}

/// `<name>.bak` next to `path`.
#[must_use]
pub fn default_backup_path(path: &Path) -> PathBuf {
    with_suffix(path, &format!(".{BACKUP_EXT}"))
}

/// `<name>.<timestamp>.bak` next to `path`; `seq > 0` adds `-<seq>` to the
/// timestamp.
#[must_use]
pub fn timestamped_backup_path(path: &Path, at: DateTime<Utc>, seq: u32) -> PathBuf {
    let stamp = at.format(TIMESTAMP_FORMAT);
    if seq == 0 {
        with_suffix(path, &format!(".{stamp}.{BACKUP_EXT}"))
    } else {
        with_suffix(path, &format!(".{stamp}-{seq}.{BACKUP_EXT}"))
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// Copy `path` to the first free backup name and return that name.
///
/// # Errors
///
/// Returns an error if the manifest cannot be read or the backup written.
pub fn create_backup(path: &Path, at: DateTime<Utc>) -> Result<PathBuf> {
    let mut source = File::open(path).map_err(Error::io(path))?;

    let mut candidate = default_backup_path(path);
    let mut seq = 0;
    loop {
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(mut file) => {
                io::copy(&mut source, &mut file).map_err(Error::io(&candidate))?;
                debug!(original = %path.display(), backup = %candidate.display(), "created backup");
                return Ok(candidate);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                candidate = timestamped_backup_path(path, at, seq);
                seq += 1;
            }
            Err(e) => return Err(Error::io(&candidate)(e)),
        }
    }
}

/// Takes at most one backup per path per run, right before the first write.
#[derive(Debug, Default)]
pub struct BackupManager {
    records: Vec<BackupRecord>,
    seen: HashSet<PathBuf>,
}

impl BackupManager {
    /// Create a manager with no backups taken yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Back up `path` unless it was already backed up by this manager.
    ///
    /// Returns the backup path when one was created.
    ///
    /// # Errors
    ///
    /// Returns an error if the backup cannot be created.
    pub fn backup(&mut self, path: &Path) -> Result<Option<PathBuf>> {
        if self.seen.contains(path) {
            return Ok(None);
        }

        let backup = create_backup(path, Utc::now())?;
        self.seen.insert(path.to_path_buf());
        self.records.push(BackupRecord {
            original: path.to_path_buf(),
            backup: backup.clone(),
        });
        Ok(Some(backup))
    }

    /// Back up `path` if needed, then replace its content.
    ///
    /// # Errors
    ///
    /// Returns an error if the backup or the write fails.
    pub fn write(&mut self, path: &Path, contents: &str) -> Result<()> {
        self.backup(path)?;
        fs::write(path, contents).map_err(Error::io(path))
    }

    /// Backups taken so far, in order.
    #[must_use]
    pub fn records(&self) -> &[BackupRecord] {
        &self.records
    }

    /// Consume the manager, returning its backups.
    #[must_use]
    pub fn into_records(self) -> Vec<BackupRecord> {
        self.records
    }
}

/// Age of a backup, derived from its file name.
///
/// Orders oldest first: the default `.bak` precedes every timestamped one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum BackupStamp {
    /// `<name>.bak`.
    Default,
    /// `<name>.<at>[-<seq>].bak`.
    Timestamped {
        /// Timestamp text; sorts chronologically.
        at: String,
        /// Same-second sequence number.
        seq: u32,
    },
}

/// Parse the stamp of a backup named after `original_name`.
///
/// Returns `None` if `file_name` is not such a backup.
#[must_use]
pub fn backup_stamp(file_name: &str, original_name: &str) -> Option<BackupStamp> {
    let rest = file_name
        .strip_prefix(original_name)?
        .strip_suffix(BACKUP_EXT)?
        .strip_suffix('.')?;
    if rest.is_empty() {
        return Some(BackupStamp::Default);
    }

    let stamp = rest.strip_prefix('.')?;
    let (at, seq) = match stamp.split_once('-') {
        Some((at, seq)) => (at, seq.parse().ok()?),
        None => (stamp, 0),
    };
    NaiveDateTime::parse_from_str(at, TIMESTAMP_FORMAT).ok()?;

    Some(BackupStamp::Timestamped {
        at: at.to_string(),
        seq,
    })
}

/// Which backup to restore when a manifest has several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestoreSource {
    /// The oldest snapshot: the state before deptidy first touched the file.
    #[default]
    Oldest,
    /// The most recent snapshot.
    Latest,
}

/// Outcome of a restore.
#[derive(Debug, Default)]
pub struct RestoreReport {
    /// Manifests restored (or that would be, in a dry run).
    pub restored: Vec<BackupRecord>,

    /// Backups whose original manifest no longer exists.
    pub missing: Vec<PathBuf>,

    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl RestoreReport {
    /// Returns true if no backups were found at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.restored.is_empty() && self.missing.is_empty()
    }
}

/// Restore manifests under `root` from their backups.
///
/// A backup whose original no longer exists is listed in
/// [`RestoreReport::missing`] and otherwise ignored.
///
/// # Errors
///
/// Returns an error if a backup cannot be copied over its original.
pub fn restore(
    root: &Path,
    config: &Config,
    source: RestoreSource,
    dry_run: bool,
) -> Result<RestoreReport> {
    let pattern = format!(
        "{}/**/{}*.{}",
        glob::Pattern::escape(&root.to_string_lossy()),
        MANIFEST_FILE,
        BACKUP_EXT
    );

    let mut candidates: BTreeMap<PathBuf, Vec<(BackupStamp, PathBuf)>> = BTreeMap::new();
    for entry in glob::glob(&pattern)? {
        let backup = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!(path = %e.path().display(), "skipping unreadable path: {}", e.error());
                continue;
            }
        };
        if config.is_ignored(root, &backup) {
            continue;
        }
        let Some(stamp) = backup
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| backup_stamp(n, MANIFEST_FILE))
        else {
            continue;
        };

        let original = backup.with_file_name(MANIFEST_FILE);
        candidates.entry(original).or_default().push((stamp, backup));
    }

    let mut report = RestoreReport {
        dry_run,
        ..RestoreReport::default()
    };

    for (original, mut backups) in candidates {
        backups.sort();
        let chosen = match source {
            RestoreSource::Oldest => backups.into_iter().next(),
            RestoreSource::Latest => backups.into_iter().next_back(),
        };
        let Some((_, backup)) = chosen else {
            continue;
        };

        if !original.is_file() {
            warn!(backup = %backup.display(), "original manifest missing, not restoring");
            report.missing.push(backup);
            continue;
        }

        if !dry_run {
            fs::copy(&backup, &original).map_err(Error::io(&original))?;
            info!(original = %original.display(), backup = %backup.display(), "restored");
        }
        report.restored.push(BackupRecord { original, backup });
    }

    Ok(report)
}
