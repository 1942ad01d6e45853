use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::domain::{EXCLUDED_FILE_KEYS, FileRecord};
use crate::error::MigrationError;
use crate::locator;
use crate::normalize::normalize_file_value;
use crate::xml::{self, Element, Name};

pub const FILE_METADATA_EXTENSION: &str = "met";

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}

/// Every per-file `.met` document below `dataset_dir`, in walk order.
/// Dot-files and dot-directories are skipped.
pub fn metadata_documents(dataset_dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, MigrationError> {
    let mut documents = Vec::new();
    let walker = WalkDir::new(dataset_dir.as_std_path())
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry));
    for entry in walker {
        let entry = entry.map_err(|err| MigrationError::Filesystem(err.to_string()))?;
        if !locator::is_file(&entry) {
            continue;
        }
        let path = match Utf8PathBuf::from_path_buf(entry.into_path()) {
            Ok(path) => path,
            Err(path) => {
                warn!(path = %path.display(), "skipping non-utf8 path");
                continue;
            }
        };
        if path.extension() == Some(FILE_METADATA_EXTENSION) {
            documents.push(path);
        }
    }
    Ok(documents)
}

/// Extracts the normalized metadata of every product file in a dataset
/// directory. Documents without any retained key are dropped.
pub fn extract_all(dataset_dir: &Utf8Path) -> Result<Vec<FileRecord>, MigrationError> {
    let mut records = Vec::new();
    for path in metadata_documents(dataset_dir)? {
        let record = parse_file_metadata(&path)?;
        if record.is_empty() {
            debug!(%path, "no file metadata retained");
            continue;
        }
        records.push(record);
    }
    Ok(records)
}

pub fn parse_file_metadata(path: &Utf8Path) -> Result<FileRecord, MigrationError> {
    let root = xml::parse_file(path).map_err(|err| MigrationError::MetadataParse {
        path: path.to_string(),
        reason: err.to_string(),
    })?;
    Ok(FileRecord {
        source: path.to_path_buf(),
        fields: file_fields(&root),
    })
}

pub fn parse_file_metadata_str(content: &str) -> Result<FileRecord, MigrationError> {
    let root = xml::parse_str(content).map_err(|err| MigrationError::MetadataParse {
        path: "<inline document>".to_string(),
        reason: err.to_string(),
    })?;
    Ok(FileRecord {
        source: Utf8PathBuf::new(),
        fields: file_fields(&root),
    })
}

fn file_fields(root: &Element) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();
    for keyval in root.children_named(Name::any("keyval")) {
        let Some(key) = keyval.child(Name::any("key")).and_then(Element::text) else {
            continue;
        };
        if EXCLUDED_FILE_KEYS.contains(&key) {
            continue;
        }
        let Some(raw) = keyval.child(Name::any("val")).and_then(Element::text) else {
            continue;
        };
        if raw.is_empty() {
            continue;
        }
        fields.insert(key.to_string(), normalize_file_value(raw));
    }
    fields
}
