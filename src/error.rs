use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum MigrationError {
    #[error("missing config file labcas-migrate.json in current directory")]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(Utf8PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("failed to load vocabulary {path}: {reason}")]
    #[diagnostic(help("reference RDF documents must be complete; fix the source file and rerun"))]
    VocabularyLoad { path: String, reason: String },

    #[error("failed to parse metadata document {path}: {reason}")]
    MetadataParse { path: String, reason: String },

    #[error("file not found in archive: {filename} (collection {collection_id})")]
    FileNotFoundInArchive {
        filename: String,
        collection_id: String,
    },

    #[error("failed to write {path}: {reason}")]
    SinkWrite { path: Utf8PathBuf, reason: String },

    #[error("dataset not found: {0}")]
    DatasetNotFound(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl MigrationError {
    pub fn sink(path: impl Into<Utf8PathBuf>, err: impl ToString) -> Self {
        MigrationError::SinkWrite {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}
