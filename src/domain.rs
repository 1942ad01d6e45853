use std::collections::BTreeMap;
use std::fmt;

use camino::Utf8PathBuf;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const DEFAULT_OWNER_PRINCIPAL: &str = "cn=All Users,dc=edrn,dc=jpl,dc=nasa,dc=gov";
pub const DEFAULT_CONSORTIUM: &str = "EDRN";
pub const PUBMED_BASE_URL: &str = "http://www.ncbi.nlm.nih.gov/pubmed/";
pub const FILENAME_KEY: &str = "Filename";

/// Legacy per-file keys that never survive the migration: the product
/// bookkeeping fields are regenerated on ingest and `FileLocation` points
/// into the old archive.
pub const EXCLUDED_FILE_KEYS: [&str; 4] = [
    "CAS.ProductName",
    "CAS.ProductId",
    "CAS.ProductReceivedTime",
    "FileLocation",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum VocabularyKind {
    Site,
    Organ,
    LeadInvestigator,
    Protocol,
}

impl VocabularyKind {
    pub const ALL: [VocabularyKind; 4] = [
        VocabularyKind::Site,
        VocabularyKind::Organ,
        VocabularyKind::LeadInvestigator,
        VocabularyKind::Protocol,
    ];
}

impl fmt::Display for VocabularyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VocabularyKind::Site => write!(f, "site"),
            VocabularyKind::Organ => write!(f, "organ"),
            VocabularyKind::LeadInvestigator => write!(f, "lead-investigator"),
            VocabularyKind::Protocol => write!(f, "protocol"),
        }
    }
}

/// Which inverse map supplies the display name when a reconciled value turns
/// out to be an identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InverseLookup {
    /// Each field uses the inverse map of its own vocabulary.
    #[default]
    OwnVocabulary,
    /// Lead PI and organ names come from the site inverse map, reproducing
    /// records migrated by the original ECAS scripts.
    SiteVocabulary,
}

/// Keys recognised in product type metadata. Every variant is handled by an
/// exhaustive match in the mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyKey {
    DataSetName,
    ProtocolId,
    ProtocolName,
    LeadPi,
    SiteName,
    OrganSite,
    DataCustodian,
    DataCustodianEmail,
    CollaborativeGroup,
    MethodDetails,
    ResultsAndConclusionSummary,
    PubMedId,
    DateDatasetFrozen,
    Date,
    QaState,
    DataDisclaimer,
}

impl LegacyKey {
    pub fn from_key(key: &str) -> Option<Self> {
        let key = match key {
            "DataSetName" => LegacyKey::DataSetName,
            "ProtocolID" | "ProtocolId" => LegacyKey::ProtocolId,
            "ProtocolName" => LegacyKey::ProtocolName,
            "LeadPI" => LegacyKey::LeadPi,
            "SiteName" => LegacyKey::SiteName,
            "OrganSite" => LegacyKey::OrganSite,
            "DataCustodian" => LegacyKey::DataCustodian,
            "DataCustodianEmail" => LegacyKey::DataCustodianEmail,
            "CollaborativeGroup" => LegacyKey::CollaborativeGroup,
            "MethodDetails" => LegacyKey::MethodDetails,
            "ResultsAndConclusionSummary" => LegacyKey::ResultsAndConclusionSummary,
            "PubMedID" => LegacyKey::PubMedId,
            "DateDatasetFrozen" => LegacyKey::DateDatasetFrozen,
            "Date" => LegacyKey::Date,
            "QAState" => LegacyKey::QaState,
            "DataDisclaimer" => LegacyKey::DataDisclaimer,
            _ => return None,
        };
        Some(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CollectionRecord {
    pub collection_id: String,
    pub collection_name: String,
    pub collection_description: String,
    pub discipline: String,
    pub institution: String,
    pub institution_id: String,
    #[serde(rename = "LeadPI")]
    pub lead_pi: String,
    #[serde(rename = "LeadPIId")]
    pub lead_pi_id: String,
    pub data_custodian: String,
    pub data_custodian_email: String,
    pub organ: String,
    pub organ_id: String,
    pub owner_principal: String,
    pub collaborative_group: String,
    #[serde(rename = "QAState")]
    pub qa_state: String,
    pub consortium: String,
    pub protocol_name: String,
    pub protocol_id: String,
    pub species: String,
    pub method_details: String,
    pub results_and_conclusion_summary: String,
    #[serde(rename = "PubMedID")]
    pub pub_med_id: String,
    pub date_dataset_frozen: String,
    pub date: String,
    pub data_disclaimer: String,
}

impl CollectionRecord {
    /// Empty template with the configured ownership defaults.
    pub fn template(owner_principal: &str, consortium: &str) -> Self {
        Self {
            collection_id: String::new(),
            collection_name: String::new(),
            collection_description: String::new(),
            discipline: String::new(),
            institution: String::new(),
            institution_id: String::new(),
            lead_pi: String::new(),
            lead_pi_id: String::new(),
            data_custodian: String::new(),
            data_custodian_email: String::new(),
            organ: String::new(),
            organ_id: String::new(),
            owner_principal: owner_principal.to_string(),
            collaborative_group: String::new(),
            qa_state: String::new(),
            consortium: consortium.to_string(),
            protocol_name: String::new(),
            protocol_id: String::new(),
            species: String::new(),
            method_details: String::new(),
            results_and_conclusion_summary: String::new(),
            pub_med_id: String::new(),
            date_dataset_frozen: String::new(),
            date: String::new(),
            data_disclaimer: String::new(),
        }
    }

    /// All fields in output order, keyed by their LabCAS names.
    pub fn fields(&self) -> [(&'static str, &str); 25] {
        [
            ("CollectionId", self.collection_id.as_str()),
            ("CollectionName", self.collection_name.as_str()),
            ("CollectionDescription", self.collection_description.as_str()),
            ("Discipline", self.discipline.as_str()),
            ("Institution", self.institution.as_str()),
            ("InstitutionId", self.institution_id.as_str()),
            ("LeadPI", self.lead_pi.as_str()),
            ("LeadPIId", self.lead_pi_id.as_str()),
            ("DataCustodian", self.data_custodian.as_str()),
            ("DataCustodianEmail", self.data_custodian_email.as_str()),
            ("Organ", self.organ.as_str()),
            ("OrganId", self.organ_id.as_str()),
            ("OwnerPrincipal", self.owner_principal.as_str()),
            ("CollaborativeGroup", self.collaborative_group.as_str()),
            ("QAState", self.qa_state.as_str()),
            ("Consortium", self.consortium.as_str()),
            ("ProtocolName", self.protocol_name.as_str()),
            ("ProtocolId", self.protocol_id.as_str()),
            ("Species", self.species.as_str()),
            ("MethodDetails", self.method_details.as_str()),
            (
                "ResultsAndConclusionSummary",
                self.results_and_conclusion_summary.as_str(),
            ),
            ("PubMedID", self.pub_med_id.as_str()),
            ("DateDatasetFrozen", self.date_dataset_frozen.as_str()),
            ("Date", self.date.as_str()),
            ("DataDisclaimer", self.data_disclaimer.as_str()),
        ]
    }
}

impl Default for CollectionRecord {
    fn default() -> Self {
        Self::template(DEFAULT_OWNER_PRINCIPAL, DEFAULT_CONSORTIUM)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DatasetRecord {
    pub dataset_id: String,
    pub dataset_name: String,
    pub dataset_description: String,
}

impl DatasetRecord {
    pub fn fields(&self) -> [(&'static str, &str); 3] {
        [
            ("DatasetId", self.dataset_id.as_str()),
            ("DatasetName", self.dataset_name.as_str()),
            ("DatasetDescription", self.dataset_description.as_str()),
        ]
    }
}

/// Collection and dataset records derived from one product type document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductTypeMetadata {
    pub collection: CollectionRecord,
    pub dataset: DatasetRecord,
}

/// Normalized metadata of one legacy product file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub source: Utf8PathBuf,
    pub fields: BTreeMap<String, String>,
}

impl FileRecord {
    pub fn filename(&self) -> Option<&str> {
        self.fields.get(FILENAME_KEY).map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A file record paired with the archive path it resolved to, if any.
#[derive(Debug, Clone)]
pub struct ResolvedFile<'a> {
    pub record: &'a FileRecord,
    pub source_path: Option<Utf8PathBuf>,
}

pub fn to_identifier(name: &str) -> String {
    name.replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn legacy_key_aliases() {
        assert_matches!(LegacyKey::from_key("ProtocolID"), Some(LegacyKey::ProtocolId));
        assert_matches!(LegacyKey::from_key("ProtocolId"), Some(LegacyKey::ProtocolId));
        assert_matches!(LegacyKey::from_key("LeadPI"), Some(LegacyKey::LeadPi));
        assert_matches!(LegacyKey::from_key("leadpi"), None);
        assert_matches!(LegacyKey::from_key("Species"), None);
    }

    #[test]
    fn template_carries_ownership_defaults() {
        let record = CollectionRecord::default();
        assert_eq!(record.owner_principal, DEFAULT_OWNER_PRINCIPAL);
        assert_eq!(record.consortium, DEFAULT_CONSORTIUM);
        let empty = record
            .fields()
            .iter()
            .filter(|(_, value)| value.is_empty())
            .count();
        assert_eq!(empty, 23);
    }

    #[test]
    fn identifiers_replace_spaces() {
        assert_eq!(to_identifier("My Study"), "My_Study");
        assert_eq!(to_identifier("BCCA_Affy6.0RawData"), "BCCA_Affy6.0RawData");
    }
}
