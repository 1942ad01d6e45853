mod common;

use assert_matches::assert_matches;

use labcas_migrate::domain::{CollectionRecord, InverseLookup};
use labcas_migrate::error::MigrationError;
use labcas_migrate::mapper::{MapperOptions, MetadataMapper};
use labcas_migrate::vocabulary::{Vocabularies, VocabularyMap};

fn vocabularies() -> Vocabularies {
    Vocabularies {
        sites: VocabularyMap::from_entries([
            ("CRUK Cambridge Research Institute", "313"),
            ("Fred Hutchinson Cancer Research Center", "70"),
        ]),
        organs: VocabularyMap::from_entries([("Thyroid", "32"), ("Lung", "7")]),
        lead_investigators: VocabularyMap::from_entries([("Jane Doe", "1001")]),
        protocols: VocabularyMap::from_entries([("Early Detection Study", "282-87")]),
    }
}

fn map(keyvals: &[(&str, &str)]) -> labcas_migrate::domain::ProductTypeMetadata {
    let vocabularies = vocabularies();
    let options = MapperOptions::default();
    MetadataMapper::new(&vocabularies, &options)
        .map_str(&common::product_type_document("A study.", keyvals))
        .unwrap()
}

#[test]
fn unrecognised_keys_leave_defaults() {
    let metadata = map(&[("Species", "Homo sapiens"), ("Foo", "bar")]);
    let expected = CollectionRecord {
        collection_description: "A study.".to_string(),
        ..CollectionRecord::default()
    };
    assert_eq!(metadata.collection, expected);
    assert_eq!(metadata.collection.fields().len(), 25);
    assert_eq!(metadata.dataset.dataset_id, "");
}

#[test]
fn dataset_name_sets_names_and_ids() {
    let metadata = map(&[("DataSetName", "My Study")]);
    assert_eq!(metadata.collection.collection_name, "My Study");
    assert_eq!(metadata.collection.collection_id, "My_Study");
    assert_eq!(metadata.dataset.dataset_name, "My Study");
    assert_eq!(metadata.dataset.dataset_description, "My Study");
    assert_eq!(metadata.dataset.dataset_id, "My_Study");
}

#[test]
fn pubmed_id_becomes_url() {
    let metadata = map(&[("PubMedID", "12345")]);
    assert_eq!(
        metadata.collection.pub_med_id,
        "http://www.ncbi.nlm.nih.gov/pubmed/12345"
    );
}

#[test]
fn lead_pi_identifier_is_resolved_to_name() {
    let metadata = map(&[("LeadPI", "1001")]);
    assert_eq!(metadata.collection.lead_pi, "Jane Doe");
    assert_eq!(metadata.collection.lead_pi_id, "1001");
}

#[test]
fn lead_pi_name_gets_identifier() {
    let metadata = map(&[("LeadPI", "Jane Doe")]);
    assert_eq!(metadata.collection.lead_pi, "Jane Doe");
    assert_eq!(metadata.collection.lead_pi_id, "1001");
}

#[test]
fn site_and_organ_reconcile_both_ways() {
    let metadata = map(&[("SiteName", "70"), ("OrganSite", "Thyroid")]);
    assert_eq!(
        metadata.collection.institution,
        "Fred Hutchinson Cancer Research Center"
    );
    assert_eq!(metadata.collection.institution_id, "70");
    assert_eq!(metadata.collection.organ, "Thyroid");
    assert_eq!(metadata.collection.organ_id, "32");

    let metadata = map(&[("OrganSite", "7")]);
    assert_eq!(metadata.collection.organ, "Lung");
    assert_eq!(metadata.collection.organ_id, "7");
}

#[test]
fn unknown_vocabulary_value_is_kept_without_id() {
    let metadata = map(&[("SiteName", "Unlisted Lab")]);
    assert_eq!(metadata.collection.institution, "Unlisted Lab");
    assert_eq!(metadata.collection.institution_id, "");
}

#[test]
fn site_inverse_lookup_reproduces_legacy_records() {
    let vocabularies = vocabularies();
    let options = MapperOptions {
        inverse_lookup: InverseLookup::SiteVocabulary,
        ..MapperOptions::default()
    };
    // organ id 7 also exists as a site id in this fixture
    let vocabularies = Vocabularies {
        sites: VocabularyMap::from_entries([("Seven Site", "7")]),
        ..vocabularies
    };
    let metadata = MetadataMapper::new(&vocabularies, &options)
        .map_str(&common::product_type_document("", &[("OrganSite", "7")]))
        .unwrap();
    assert_eq!(metadata.collection.organ, "Seven Site");
    assert_eq!(metadata.collection.organ_id, "7");
}

#[test]
fn verbatim_fields_and_aliases() {
    let metadata = map(&[
        ("ProtocolID", "282"),
        ("ProtocolName", "Early Detection Study"),
        ("DataCustodian", "Dan Crichton"),
        ("DataCustodianEmail", "dan@example.org"),
        ("CollaborativeGroup", "Lung and Upper Aerodigestive"),
        ("MethodDetails", "Affymetrix"),
        ("ResultsAndConclusionSummary", "None yet"),
        ("DateDatasetFrozen", "2012-04-01"),
        ("Date", "2012-04-02"),
        ("QAState", "Accepted"),
        ("DataDisclaimer", "Use with care"),
    ]);
    let c = &metadata.collection;
    assert_eq!(c.protocol_id, "282");
    assert_eq!(c.protocol_name, "Early Detection Study");
    assert_eq!(c.data_custodian, "Dan Crichton");
    assert_eq!(c.data_custodian_email, "dan@example.org");
    assert_eq!(c.collaborative_group, "Lung and Upper Aerodigestive");
    assert_eq!(c.method_details, "Affymetrix");
    assert_eq!(c.results_and_conclusion_summary, "None yet");
    assert_eq!(c.date_dataset_frozen, "2012-04-01");
    assert_eq!(c.date, "2012-04-02");
    assert_eq!(c.qa_state, "Accepted");
    assert_eq!(c.data_disclaimer, "Use with care");

    let metadata = map(&[("ProtocolId", "283"), ("ProtocolId", "284")]);
    assert_eq!(metadata.collection.protocol_id, "284");
}

#[test]
fn values_are_cleaned_and_unescaped() {
    let metadata = map(&[(
        "MethodDetails",
        "Samples were\n   hybridized &amp;lt;overnight&amp;gt;\\ .",
    )]);
    assert_eq!(
        metadata.collection.method_details,
        "Samples were hybridized <overnight>."
    );
}

#[test]
fn description_is_normalized() {
    let vocabularies = vocabularies();
    let options = MapperOptions::default();
    let metadata = MetadataMapper::new(&vocabularies, &options)
        .map_str(&common::product_type_document("Line one\n\n   line two", &[]))
        .unwrap();
    assert_eq!(metadata.collection.collection_description, "Line one line two");
}

#[test]
fn missing_value_yields_empty_field() {
    let vocabularies = vocabularies();
    let options = MapperOptions::default();
    let metadata = MetadataMapper::new(&vocabularies, &options)
        .map_str(
            "<producttype><metadata>\
               <keyval><key>QAState</key></keyval>\
               <keyval><key>DataCustodian</key><val/></keyval>\
             </metadata></producttype>",
        )
        .unwrap();
    assert_eq!(metadata.collection.qa_state, "");
    assert_eq!(metadata.collection.data_custodian, "");
    assert_eq!(metadata.collection.collection_description, "");
}

#[test]
fn configured_ownership_defaults_are_used() {
    let vocabularies = vocabularies();
    let options = MapperOptions {
        owner_principal: "cn=Test Group".to_string(),
        consortium: "MCL".to_string(),
        ..MapperOptions::default()
    };
    let metadata = MetadataMapper::new(&vocabularies, &options)
        .map_str(&common::product_type_document("", &[]))
        .unwrap();
    assert_eq!(metadata.collection.owner_principal, "cn=Test Group");
    assert_eq!(metadata.collection.consortium, "MCL");
}

#[test]
fn malformed_document_is_a_parse_error() {
    let vocabularies = vocabularies();
    let options = MapperOptions::default();
    let err = MetadataMapper::new(&vocabularies, &options)
        .map_str("<producttype><metadata></producttype>")
        .unwrap_err();
    assert_matches!(err, MigrationError::MetadataParse { .. });
}
