//! Finding product files in the legacy archive tree.
//!
//! The same filename frequently exists in several places of the ECAS archive
//! (re-ingests, manual copies). The most recently modified copy wins; on
//! equal modification times the first one seen by the walk is kept.

use std::collections::HashMap;
use std::fs;
use std::time::SystemTime;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::MigrationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: Utf8PathBuf,
    pub modified: SystemTime,
}

impl Candidate {
    /// Keeps `self` unless `other` is strictly newer.
    fn prefer(&mut self, other: Candidate) {
        if other.modified > self.modified {
            *self = other;
        }
    }
}

fn walk(root: &Utf8Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(root.as_std_path())
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(error = %err, "skipping unreadable archive entry");
                None
            }
        })
        .filter(is_file)
}

/// Regular files, and symlinks whose target is a regular file. Links are
/// not followed into directories.
pub(crate) fn is_file(entry: &DirEntry) -> bool {
    if entry.file_type().is_file() {
        return true;
    }
    entry.path_is_symlink()
        && fs::metadata(entry.path()).is_ok_and(|meta| meta.is_file())
}

fn candidate(entry: &DirEntry) -> Option<Candidate> {
    let path = Utf8Path::from_path(entry.path())?.to_path_buf();
    // modification time of the link target
    let modified = fs::metadata(entry.path()).and_then(|meta| meta.modified());
    let modified = match modified {
        Ok(modified) => modified,
        Err(err) => {
            warn!(%path, error = %err, "cannot read modification time");
            return None;
        }
    };
    Some(Candidate { path, modified })
}

fn ensure_root(root: &Utf8Path) -> Result<(), MigrationError> {
    if root.as_std_path().is_dir() {
        Ok(())
    } else {
        Err(MigrationError::Filesystem(format!(
            "archive root is not a directory: {root}"
        )))
    }
}

/// Scans the whole archive for `filename` and returns the newest match.
pub fn locate(root: &Utf8Path, filename: &str) -> Result<Option<Utf8PathBuf>, MigrationError> {
    ensure_root(root)?;
    let mut best: Option<Candidate> = None;
    for entry in walk(root) {
        if entry.file_name().to_str() != Some(filename) {
            continue;
        }
        let Some(found) = candidate(&entry) else {
            continue;
        };
        match &mut best {
            Some(current) => current.prefer(found),
            None => best = Some(found),
        }
    }
    Ok(best.map(|candidate| candidate.path))
}

/// Filename to newest path, built with a single archive walk.
#[derive(Debug, Clone, Default)]
pub struct ArchiveIndex {
    entries: HashMap<String, Candidate>,
}

impl ArchiveIndex {
    pub fn build(root: &Utf8Path) -> Result<Self, MigrationError> {
        ensure_root(root)?;
        let mut entries: HashMap<String, Candidate> = HashMap::new();
        for entry in walk(root) {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let Some(found) = candidate(&entry) else {
                continue;
            };
            match entries.get_mut(&name) {
                Some(current) => current.prefer(found),
                None => {
                    entries.insert(name, found);
                }
            }
        }
        debug!(%root, files = entries.len(), "archive indexed");
        Ok(Self { entries })
    }

    pub fn locate(&self, filename: &str) -> Option<&Utf8Path> {
        self.entries
            .get(filename)
            .map(|candidate| candidate.path.as_path())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
