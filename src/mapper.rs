//! Product type metadata (one `<dataset>.met` document per ECAS dataset) to
//! LabCAS collection and dataset records.

use camino::Utf8Path;
use tracing::debug;

use crate::domain::{
    CollectionRecord, DatasetRecord, InverseLookup, LegacyKey, PUBMED_BASE_URL,
    ProductTypeMetadata, to_identifier,
};
use crate::error::MigrationError;
use crate::normalize::{cleanup_text, normalize_dataset_value};
use crate::vocabulary::{Vocabularies, VocabularyMap};
use crate::xml::{self, Element, Name};

#[derive(Debug, Clone)]
pub struct MapperOptions {
    pub owner_principal: String,
    pub consortium: String,
    pub inverse_lookup: InverseLookup,
}

impl Default for MapperOptions {
    fn default() -> Self {
        Self {
            owner_principal: crate::domain::DEFAULT_OWNER_PRINCIPAL.to_string(),
            consortium: crate::domain::DEFAULT_CONSORTIUM.to_string(),
            inverse_lookup: InverseLookup::default(),
        }
    }
}

/// Outcome of matching a free-text field against a vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub display: String,
    pub id: Option<String>,
}

/// Resolves `value` against `vocabulary`. The value may be a display title
/// or, in older records, already the identifier; `names` supplies the title
/// for the latter case.
pub fn reconcile(value: &str, vocabulary: &VocabularyMap, names: &VocabularyMap) -> Reconciled {
    if let Some(id) = vocabulary.id_for(value) {
        return Reconciled {
            display: value.to_string(),
            id: Some(id.to_string()),
        };
    }
    if vocabulary.title_for(value).is_some() {
        let display = names.title_for(value).unwrap_or(value);
        return Reconciled {
            display: display.to_string(),
            id: Some(value.to_string()),
        };
    }
    Reconciled {
        display: value.to_string(),
        id: None,
    }
}

pub struct MetadataMapper<'a> {
    vocabularies: &'a Vocabularies,
    options: &'a MapperOptions,
}

impl<'a> MetadataMapper<'a> {
    pub fn new(vocabularies: &'a Vocabularies, options: &'a MapperOptions) -> Self {
        Self {
            vocabularies,
            options,
        }
    }

    pub fn map_document(&self, path: &Utf8Path) -> Result<ProductTypeMetadata, MigrationError> {
        debug!(%path, "reading product type metadata");
        let root = xml::parse_file(path).map_err(|err| MigrationError::MetadataParse {
            path: path.to_string(),
            reason: err.to_string(),
        })?;
        Ok(self.map_element(&root))
    }

    pub fn map_str(&self, content: &str) -> Result<ProductTypeMetadata, MigrationError> {
        let root = xml::parse_str(content).map_err(|err| MigrationError::MetadataParse {
            path: "<inline document>".to_string(),
            reason: err.to_string(),
        })?;
        Ok(self.map_element(&root))
    }

    fn map_element(&self, root: &Element) -> ProductTypeMetadata {
        let mut metadata = ProductTypeMetadata {
            collection: CollectionRecord::template(
                &self.options.owner_principal,
                &self.options.consortium,
            ),
            dataset: DatasetRecord::default(),
        };

        if let Some(text) = root.find(Name::any("description")).and_then(Element::text) {
            metadata.collection.collection_description = cleanup_text(text);
        }

        let Some(keyvals) = root.find(Name::any("metadata")) else {
            return metadata;
        };
        for keyval in keyvals.children_named(Name::any("keyval")) {
            let Some(key) = keyval.child(Name::any("key")).and_then(Element::text) else {
                continue;
            };
            let value = keyval
                .child(Name::any("val"))
                .and_then(Element::text)
                .map(normalize_dataset_value)
                .unwrap_or_default();
            match LegacyKey::from_key(key) {
                Some(key) => self.apply(&mut metadata, key, value),
                None => debug!(key, "ignoring product type key"),
            }
        }
        metadata
    }

    fn apply(&self, metadata: &mut ProductTypeMetadata, key: LegacyKey, value: String) {
        let collection = &mut metadata.collection;
        match key {
            LegacyKey::DataSetName => {
                let id = to_identifier(&value);
                collection.collection_id = id.clone();
                collection.collection_name = value.clone();
                metadata.dataset.dataset_id = id;
                metadata.dataset.dataset_name = value.clone();
                metadata.dataset.dataset_description = value;
            }
            LegacyKey::ProtocolId => collection.protocol_id = value,
            LegacyKey::ProtocolName => collection.protocol_name = value,
            LegacyKey::LeadPi => {
                let vocabulary = &self.vocabularies.lead_investigators;
                let resolved = reconcile(&value, vocabulary, self.display_names(vocabulary));
                collection.lead_pi = resolved.display;
                if let Some(id) = resolved.id {
                    collection.lead_pi_id = id;
                }
            }
            LegacyKey::SiteName => {
                let vocabulary = &self.vocabularies.sites;
                let resolved = reconcile(&value, vocabulary, vocabulary);
                collection.institution = resolved.display;
                if let Some(id) = resolved.id {
                    collection.institution_id = id;
                }
            }
            LegacyKey::OrganSite => {
                let vocabulary = &self.vocabularies.organs;
                let resolved = reconcile(&value, vocabulary, self.display_names(vocabulary));
                collection.organ = resolved.display;
                if let Some(id) = resolved.id {
                    collection.organ_id = id;
                }
            }
            LegacyKey::DataCustodian => collection.data_custodian = value,
            LegacyKey::DataCustodianEmail => collection.data_custodian_email = value,
            LegacyKey::CollaborativeGroup => collection.collaborative_group = value,
            LegacyKey::MethodDetails => collection.method_details = value,
            LegacyKey::ResultsAndConclusionSummary => {
                collection.results_and_conclusion_summary = value
            }
            LegacyKey::PubMedId => collection.pub_med_id = format!("{PUBMED_BASE_URL}{value}"),
            LegacyKey::DateDatasetFrozen => collection.date_dataset_frozen = value,
            LegacyKey::Date => collection.date = value,
            LegacyKey::QaState => collection.qa_state = value,
            LegacyKey::DataDisclaimer => collection.data_disclaimer = value,
        }
    }

    /// Inverse map that names identifier-valued lead PI and organ fields.
    fn display_names(&self, own: &'a VocabularyMap) -> &'a VocabularyMap {
        match self.options.inverse_lookup {
            InverseLookup::OwnVocabulary => own,
            InverseLookup::SiteVocabulary => &self.vocabularies.sites,
        }
    }
}
