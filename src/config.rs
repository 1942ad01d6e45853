use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::domain::{DEFAULT_CONSORTIUM, DEFAULT_OWNER_PRINCIPAL, InverseLookup};
use crate::error::MigrationError;
use crate::mapper::MapperOptions;
use crate::vocabulary::VocabularyPaths;

pub const DEFAULT_CONFIG_FILE: &str = "labcas-migrate.json";
pub const DEFAULT_REVISION: &str = "1";

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    pub source: SourceConfig,
    pub target: TargetConfig,
    pub vocabularies: VocabularyConfig,
    #[serde(default)]
    pub datasets: Vec<String>,
    #[serde(default)]
    pub defaults: Option<DefaultsConfig>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Directory holding `<dataset>.met` files and `<dataset>/` directories.
    pub metadata_dir: Utf8PathBuf,
    /// Root of the legacy product archive.
    pub archive_dir: Utf8PathBuf,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TargetConfig {
    pub metadata_dir: Utf8PathBuf,
    pub data_dir: Utf8PathBuf,
    #[serde(default)]
    pub revision: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct VocabularyConfig {
    pub sites: Utf8PathBuf,
    pub organs: Utf8PathBuf,
    pub lead_investigators: Utf8PathBuf,
    pub protocols: Utf8PathBuf,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub owner_principal: Option<String>,
    #[serde(default)]
    pub consortium: Option<String>,
    #[serde(default)]
    pub inverse_lookup: Option<InverseLookup>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub metadata_dir: Utf8PathBuf,
    pub archive_dir: Utf8PathBuf,
    pub target_metadata_dir: Utf8PathBuf,
    pub target_data_dir: Utf8PathBuf,
    pub revision: String,
    pub vocabularies: VocabularyPaths,
    /// Dataset directory names to migrate; empty means all of them.
    pub datasets: Vec<String>,
    pub mapper: MapperOptions,
}

impl ResolvedConfig {
    pub fn selects(&self, dataset: &str) -> bool {
        self.datasets.is_empty() || self.datasets.iter().any(|name| name == dataset)
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&Utf8Path>) -> Result<ResolvedConfig, MigrationError> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Utf8PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.as_std_path().exists() {
            return Err(MigrationError::MissingConfig);
        }

        let content = fs::read_to_string(config_path.as_std_path())
            .map_err(|_| MigrationError::ConfigRead(config_path.clone()))?;
        Self::resolve_str(&content)
    }

    pub fn resolve_str(content: &str) -> Result<ResolvedConfig, MigrationError> {
        let config: Config = serde_json::from_str(content)
            .map_err(|err| MigrationError::ConfigParse(err.to_string()))?;
        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, MigrationError> {
        let schema_version = config.schema_version.unwrap_or(1);
        if schema_version != 1 {
            return Err(MigrationError::ConfigParse(format!(
                "unsupported schema_version {schema_version}"
            )));
        }

        let revision = config
            .target
            .revision
            .unwrap_or_else(|| DEFAULT_REVISION.to_string());
        if revision.is_empty() || revision.contains(['/', '\\']) {
            return Err(MigrationError::ConfigParse(format!(
                "invalid revision segment: {revision:?}"
            )));
        }

        let defaults = config.defaults.unwrap_or_default();
        let mapper = MapperOptions {
            owner_principal: defaults
                .owner_principal
                .unwrap_or_else(|| DEFAULT_OWNER_PRINCIPAL.to_string()),
            consortium: defaults
                .consortium
                .unwrap_or_else(|| DEFAULT_CONSORTIUM.to_string()),
            inverse_lookup: defaults.inverse_lookup.unwrap_or_default(),
        };

        Ok(ResolvedConfig {
            schema_version,
            metadata_dir: config.source.metadata_dir,
            archive_dir: config.source.archive_dir,
            target_metadata_dir: config.target.metadata_dir,
            target_data_dir: config.target.data_dir,
            revision,
            vocabularies: VocabularyPaths {
                sites: config.vocabularies.sites,
                organs: config.vocabularies.organs,
                lead_investigators: config.vocabularies.lead_investigators,
                protocols: config.vocabularies.protocols,
            },
            datasets: config.datasets,
            mapper,
        })
    }
}
