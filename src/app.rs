use std::fmt;
use std::fs;
use std::time::{Duration, Instant};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::ResolvedConfig;
use crate::domain::{ProductTypeMetadata, ResolvedFile};
use crate::error::MigrationError;
use crate::extractor;
use crate::locator::ArchiveIndex;
use crate::mapper::MetadataMapper;
use crate::store::TargetStore;
use crate::vocabulary::Vocabularies;

pub const PRODUCT_TYPE_EXTENSION: &str = "met";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationPhase {
    MappingMetadata,
    WritingCollectionConfig,
    ExtractingFileMetadata,
    CopyingFiles,
    Done,
}

impl fmt::Display for MigrationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationPhase::MappingMetadata => write!(f, "MapMetadata"),
            MigrationPhase::WritingCollectionConfig => write!(f, "WriteConfig"),
            MigrationPhase::ExtractingFileMetadata => write!(f, "ExtractFiles"),
            MigrationPhase::CopyingFiles => write!(f, "Copy"),
            MigrationPhase::Done => write!(f, "Done"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub dataset: String,
    pub phase: MigrationPhase,
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

/// Reports progress through `tracing` at info level.
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => info!(
                dataset = %event.dataset,
                elapsed_ms = elapsed.as_millis() as u64,
                "phase={}; {}",
                event.phase,
                event.message
            ),
            None => info!(dataset = %event.dataset, "phase={}; {}", event.phase, event.message),
        }
    }
}

pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn event(&self, _event: ProgressEvent) {}
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub started_at: String,
    pub finished_at: String,
    pub archive_files_indexed: usize,
    pub datasets: Vec<DatasetOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetOutcome {
    pub name: String,
    pub collection_id: String,
    pub dataset_id: String,
    pub config_path: String,
    pub files_copied: usize,
    pub files_missing: Vec<String>,
    /// Source `.met` documents whose record carries no `Filename`.
    pub files_without_filename: Vec<String>,
}

pub struct Migration<'a, S: TargetStore> {
    config: &'a ResolvedConfig,
    vocabularies: &'a Vocabularies,
    store: S,
}

impl<'a, S: TargetStore> Migration<'a, S> {
    pub fn new(config: &'a ResolvedConfig, vocabularies: &'a Vocabularies, store: S) -> Self {
        Self {
            config,
            vocabularies,
            store,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Names of the dataset directories this run will migrate, sorted.
    pub fn dataset_names(&self) -> Result<Vec<String>, MigrationError> {
        let root = &self.config.metadata_dir;
        let entries = fs::read_dir(root.as_std_path())
            .map_err(|err| MigrationError::Filesystem(format!("read {root}: {err}")))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| MigrationError::Filesystem(err.to_string()))?;
            if !entry.path().is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                warn!(path = %entry.path().display(), "skipping non-utf8 dataset directory");
                continue;
            };
            if self.config.selects(&name) {
                names.push(name);
            }
        }
        names.sort();
        for wanted in &self.config.datasets {
            if !names.contains(wanted) {
                warn!(dataset = %wanted, "requested dataset directory not found");
            }
        }
        Ok(names)
    }

    pub fn product_type_document(&self, name: &str) -> Utf8PathBuf {
        self.config
            .metadata_dir
            .join(format!("{name}.{PRODUCT_TYPE_EXTENSION}"))
    }

    /// Maps one dataset's product type metadata without writing anything.
    pub fn inspect(&self, name: &str) -> Result<ProductTypeMetadata, MigrationError> {
        let document = self.product_type_document(name);
        if !document.as_std_path().is_file() {
            return Err(MigrationError::DatasetNotFound(name.to_string()));
        }
        MetadataMapper::new(self.vocabularies, &self.config.mapper).map_document(&document)
    }

    pub fn run(&self, sink: &dyn ProgressSink) -> Result<MigrationReport, MigrationError> {
        let started_at = chrono::Utc::now().to_rfc3339();
        let names = self.dataset_names()?;
        if names.is_empty() {
            warn!(metadata_dir = %self.config.metadata_dir, "no dataset directories selected");
        }

        let index = if names.is_empty() {
            ArchiveIndex::default()
        } else {
            info!(archive = %self.config.archive_dir, "indexing archive");
            ArchiveIndex::build(&self.config.archive_dir)?
        };

        let mut datasets = Vec::new();
        for name in names {
            let document = self.product_type_document(&name);
            if !document.as_std_path().is_file() {
                warn!(dataset = %name, %document, "no product type metadata, skipping");
                continue;
            }
            let dataset_dir = self.config.metadata_dir.join(&name);
            datasets.push(self.migrate_dataset(&name, &document, &dataset_dir, &index, sink)?);
        }

        Ok(MigrationReport {
            started_at,
            finished_at: chrono::Utc::now().to_rfc3339(),
            archive_files_indexed: index.len(),
            datasets,
        })
    }

    pub fn migrate_dataset(
        &self,
        name: &str,
        document: &Utf8Path,
        dataset_dir: &Utf8Path,
        index: &ArchiveIndex,
        sink: &dyn ProgressSink,
    ) -> Result<DatasetOutcome, MigrationError> {
        let start = Instant::now();
        let emit = |phase: MigrationPhase, message: String, elapsed: Option<Duration>| {
            sink.event(ProgressEvent {
                dataset: name.to_string(),
                phase,
                message,
                elapsed,
            })
        };

        emit(
            MigrationPhase::MappingMetadata,
            format!("reading {document}"),
            None,
        );
        let mapper = MetadataMapper::new(self.vocabularies, &self.config.mapper);
        let metadata = mapper.map_document(document)?;
        let collection_id = metadata.collection.collection_id.clone();
        let dataset_id = metadata.dataset.dataset_id.clone();
        // collection and dataset ids name the output directories
        if collection_id.is_empty() || dataset_id.is_empty() {
            return Err(MigrationError::MetadataParse {
                path: document.to_string(),
                reason: "no DataSetName entry".to_string(),
            });
        }

        emit(
            MigrationPhase::WritingCollectionConfig,
            format!("collection {collection_id}"),
            None,
        );
        let config_path = self.store.write_collection_config(&metadata)?;

        emit(
            MigrationPhase::ExtractingFileMetadata,
            format!("scanning {dataset_dir}"),
            None,
        );
        let records = extractor::extract_all(dataset_dir)?;

        emit(
            MigrationPhase::CopyingFiles,
            format!("{} file records", records.len()),
            None,
        );
        let output_dir = self.store.product_dir(&collection_id, &dataset_id);
        let mut outcome = DatasetOutcome {
            name: name.to_string(),
            collection_id: collection_id.clone(),
            dataset_id,
            config_path: config_path.to_string(),
            files_copied: 0,
            files_missing: Vec::new(),
            files_without_filename: Vec::new(),
        };
        for record in &records {
            let Some(filename) = record.filename() else {
                warn!(document = %record.source, "file metadata has no Filename, skipping");
                outcome.files_without_filename.push(record.source.to_string());
                continue;
            };
            let resolved = ResolvedFile {
                record,
                source_path: index.locate(filename).map(Utf8Path::to_path_buf),
            };
            match self.copy_resolved(&resolved, filename, &output_dir, &collection_id) {
                Ok(()) => outcome.files_copied += 1,
                Err(MigrationError::FileNotFoundInArchive { filename, .. }) => {
                    outcome.files_missing.push(filename)
                }
                Err(err) => return Err(err),
            }
        }

        emit(
            MigrationPhase::Done,
            format!(
                "copied={} missing={} without_filename={}",
                outcome.files_copied,
                outcome.files_missing.len(),
                outcome.files_without_filename.len()
            ),
            Some(start.elapsed()),
        );
        Ok(outcome)
    }

    fn copy_resolved(
        &self,
        resolved: &ResolvedFile<'_>,
        filename: &str,
        output_dir: &Utf8Path,
        collection_id: &str,
    ) -> Result<(), MigrationError> {
        let Some(source) = &resolved.source_path else {
            let err = MigrationError::FileNotFoundInArchive {
                filename: filename.to_string(),
                collection_id: collection_id.to_string(),
            };
            warn!("{err}");
            return Err(err);
        };
        let output_file = output_dir.join(filename);
        info!(%source, dest = %output_file, "copying file");
        self.store.copy_file(source, &output_file)?;
        self.store.write_file_metadata(resolved.record, &output_file)?;
        Ok(())
    }
}
