use std::fmt::Write as _;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use quick_xml::escape::escape;
use tempfile::Builder;

use crate::domain::{FileRecord, ProductTypeMetadata};
use crate::error::MigrationError;

pub const FILE_KEY_PREFIX: &str = "_File_";
pub const SIDECAR_EXTENSION: &str = "xmlmet";
pub const CAS_NS: &str = "http://oodt.jpl.nasa.gov/1.0/cas";

/// Destination of everything a migration run produces.
pub trait TargetStore {
    /// Writes the `[Collection]`/`[Dataset]` configuration and returns its path.
    fn write_collection_config(
        &self,
        metadata: &ProductTypeMetadata,
    ) -> Result<Utf8PathBuf, MigrationError>;

    /// Directory that receives the product files of one dataset.
    fn product_dir(&self, collection_id: &str, dataset_id: &str) -> Utf8PathBuf;

    fn copy_file(&self, source: &Utf8Path, dest: &Utf8Path) -> Result<(), MigrationError>;

    /// Writes the sidecar metadata document next to `data_file`.
    fn write_file_metadata(
        &self,
        record: &FileRecord,
        data_file: &Utf8Path,
    ) -> Result<Utf8PathBuf, MigrationError>;
}

/// LabCAS layout on the local filesystem:
/// `<metadata_root>/<collection>/<collection>.cfg` and
/// `<data_root>/<collection>/<dataset>/<revision>/<file>`.
#[derive(Debug, Clone)]
pub struct FsTargetStore {
    metadata_root: Utf8PathBuf,
    data_root: Utf8PathBuf,
    revision: String,
}

impl FsTargetStore {
    pub fn new(metadata_root: Utf8PathBuf, data_root: Utf8PathBuf, revision: String) -> Self {
        Self {
            metadata_root,
            data_root,
            revision,
        }
    }

    pub fn metadata_root(&self) -> &Utf8Path {
        &self.metadata_root
    }

    pub fn data_root(&self) -> &Utf8Path {
        &self.data_root
    }

    pub fn config_path(&self, collection_id: &str) -> Utf8PathBuf {
        self.metadata_root
            .join(collection_id)
            .join(format!("{collection_id}.cfg"))
    }

    pub fn write_bytes_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), MigrationError> {
        let parent = ensure_parent(path)?;
        let temp = Builder::new()
            .prefix(".labcas-write")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| MigrationError::sink(path, err))?;
        fs::write(temp.path(), content).map_err(|err| MigrationError::sink(path, err))?;
        temp.persist(path.as_std_path())
            .map_err(|err| MigrationError::sink(path, err))?;
        Ok(())
    }

    pub fn copy_file_atomic(source: &Utf8Path, dest: &Utf8Path) -> Result<(), MigrationError> {
        let parent = ensure_parent(dest)?;
        let temp = Builder::new()
            .prefix(".labcas-copy")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| MigrationError::sink(dest, err))?;
        fs::copy(source.as_std_path(), temp.path())
            .map_err(|err| MigrationError::sink(dest, format!("copy from {source}: {err}")))?;
        temp.persist(dest.as_std_path())
            .map_err(|err| MigrationError::sink(dest, err))?;
        Ok(())
    }
}

impl TargetStore for FsTargetStore {
    fn write_collection_config(
        &self,
        metadata: &ProductTypeMetadata,
    ) -> Result<Utf8PathBuf, MigrationError> {
        let path = self.config_path(&metadata.collection.collection_id);
        Self::write_bytes_atomic(&path, render_collection_config(metadata).as_bytes())?;
        Ok(path)
    }

    fn product_dir(&self, collection_id: &str, dataset_id: &str) -> Utf8PathBuf {
        self.data_root
            .join(collection_id)
            .join(dataset_id)
            .join(&self.revision)
    }

    fn copy_file(&self, source: &Utf8Path, dest: &Utf8Path) -> Result<(), MigrationError> {
        Self::copy_file_atomic(source, dest)
    }

    fn write_file_metadata(
        &self,
        record: &FileRecord,
        data_file: &Utf8Path,
    ) -> Result<Utf8PathBuf, MigrationError> {
        let path = sidecar_path(data_file);
        Self::write_bytes_atomic(&path, render_file_metadata(record).as_bytes())?;
        Ok(path)
    }
}

fn ensure_parent(path: &Utf8Path) -> Result<&Utf8Path, MigrationError> {
    let parent = path
        .parent()
        .ok_or_else(|| MigrationError::sink(path, "invalid destination path"))?;
    fs::create_dir_all(parent.as_std_path()).map_err(|err| MigrationError::sink(parent, err))?;
    Ok(parent)
}

pub fn sidecar_path(data_file: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{data_file}.{SIDECAR_EXTENSION}"))
}

/// INI-style `key=value` sections, one line per record field.
pub fn render_collection_config(metadata: &ProductTypeMetadata) -> String {
    let mut out = String::from("[Collection]\n");
    for (key, value) in metadata.collection.fields() {
        let _ = writeln!(out, "{key}={value}");
    }
    out.push_str("[Dataset]\n");
    for (key, value) in metadata.dataset.fields() {
        let _ = writeln!(out, "{key}={value}");
    }
    out
}

pub fn render_file_metadata(record: &FileRecord) -> String {
    let mut out = format!("<cas:metadata xmlns:cas=\"{CAS_NS}\">\n");
    for (key, value) in &record.fields {
        out.push_str("\t<keyval type=\"vector\">\n");
        let _ = writeln!(out, "\t\t<key>{FILE_KEY_PREFIX}{}</key>", escape(key.as_str()));
        let _ = writeln!(out, "\t\t<val>{}</val>", escape(value.as_str()));
        out.push_str("\t</keyval>\n");
    }
    out.push_str("</cas:metadata>\n");
    out
}
