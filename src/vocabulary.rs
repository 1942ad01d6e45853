//! Reference vocabularies (sites, organs, lead investigators, protocols)
//! published by the EDRN knowledge environment as RDF/XML.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::VocabularyKind;
use crate::error::MigrationError;
use crate::xml::{self, Element, Name};

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const DCTERMS_NS: &str = "http://purl.org/dc/terms/";
pub const FOAF_NS: &str = "http://xmlns.com/foaf/0.1/";

const DESCRIPTION: Name<'static> = Name::qualified(RDF_NS, "Description");
const ABOUT: Name<'static> = Name::qualified(RDF_NS, "about");
static PERSON_NAME: [Name<'static>; 2] = [
    Name::qualified(FOAF_NS, "givenname"),
    Name::qualified(FOAF_NS, "surname"),
];

/// Where the human readable title of a description block lives.
enum TitleSchema {
    Element(Name<'static>),
    /// Parts joined with a single space, in order.
    Joined(&'static [Name<'static>]),
}

impl VocabularyKind {
    fn title_schema(self) -> TitleSchema {
        match self {
            VocabularyKind::Site | VocabularyKind::Protocol | VocabularyKind::Organ => {
                TitleSchema::Element(Name::qualified(DCTERMS_NS, "title"))
            }
            VocabularyKind::LeadInvestigator => TitleSchema::Joined(&PERSON_NAME),
        }
    }
}

/// Title to identifier mapping plus its inverse, frozen after load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VocabularyMap {
    forward: BTreeMap<String, String>,
    inverse: BTreeMap<String, String>,
}

impl VocabularyMap {
    pub fn load(kind: VocabularyKind, path: &Utf8Path) -> Result<Self, MigrationError> {
        debug!(%kind, %path, "reading vocabulary");
        let root = xml::parse_file(path).map_err(|err| MigrationError::VocabularyLoad {
            path: path.to_string(),
            reason: err.to_string(),
        })?;
        Self::from_document(kind, &root).map_err(|reason| MigrationError::VocabularyLoad {
            path: path.to_string(),
            reason,
        })
    }

    pub fn parse(kind: VocabularyKind, content: &str) -> Result<Self, MigrationError> {
        let load_error = |reason: String| MigrationError::VocabularyLoad {
            path: format!("<{kind} document>"),
            reason,
        };
        let root = xml::parse_str(content).map_err(|err| load_error(err.to_string()))?;
        Self::from_document(kind, &root).map_err(load_error)
    }

    /// Builds a map directly from `(title, id)` pairs.
    pub fn from_entries<I, T, U>(entries: I) -> Self
    where
        I: IntoIterator<Item = (T, U)>,
        T: Into<String>,
        U: Into<String>,
    {
        let forward = entries
            .into_iter()
            .map(|(title, id)| (title.into(), id.into()))
            .collect();
        Self::with_inverse(forward)
    }

    fn from_document(kind: VocabularyKind, root: &Element) -> Result<Self, String> {
        let schema = kind.title_schema();
        let mut forward = BTreeMap::new();
        let blocks = std::iter::once(root)
            .filter(|element| element.is(DESCRIPTION))
            .chain(root.find_all(DESCRIPTION));
        for block in blocks {
            let about = block
                .attribute(ABOUT)
                .ok_or_else(|| "rdf:Description without rdf:about".to_string())?;
            let id = about.rsplit('/').next().unwrap_or(about);
            let title = block_title(block, &schema)
                .ok_or_else(|| format!("missing title for {about}"))?;
            forward.insert(title, id.to_string());
        }
        Ok(Self::with_inverse(forward))
    }

    fn with_inverse(forward: BTreeMap<String, String>) -> Self {
        let mut inverse = BTreeMap::new();
        for (title, id) in &forward {
            if let Some(previous) = inverse.insert(id.clone(), title.clone()) {
                warn!(%id, %previous, replacement = %title, "identifier shared by several titles");
            }
        }
        Self { forward, inverse }
    }

    /// Identifier for a display title.
    pub fn id_for(&self, title: &str) -> Option<&str> {
        self.forward.get(title).map(String::as_str)
    }

    /// Display title for an identifier.
    pub fn title_for(&self, id: &str) -> Option<&str> {
        self.inverse.get(id).map(String::as_str)
    }

    pub fn forward(&self) -> &BTreeMap<String, String> {
        &self.forward
    }

    pub fn inverse(&self) -> &BTreeMap<String, String> {
        &self.inverse
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

fn block_title(block: &Element, schema: &TitleSchema) -> Option<String> {
    match schema {
        TitleSchema::Element(name) => block.find(*name).map(element_text),
        TitleSchema::Joined(parts) => {
            let parts = parts
                .iter()
                .map(|name| block.find(*name).map(element_text))
                .collect::<Option<Vec<_>>>()?;
            Some(parts.join(" "))
        }
    }
}

fn element_text(element: &Element) -> String {
    element.text().unwrap_or_default().to_string()
}

#[derive(Debug, Clone)]
pub struct VocabularyPaths {
    pub sites: Utf8PathBuf,
    pub organs: Utf8PathBuf,
    pub lead_investigators: Utf8PathBuf,
    pub protocols: Utf8PathBuf,
}

impl VocabularyPaths {
    pub fn path(&self, kind: VocabularyKind) -> &Utf8Path {
        match kind {
            VocabularyKind::Site => &self.sites,
            VocabularyKind::Organ => &self.organs,
            VocabularyKind::LeadInvestigator => &self.lead_investigators,
            VocabularyKind::Protocol => &self.protocols,
        }
    }
}

/// The four vocabularies a migration run reconciles against.
#[derive(Debug, Clone, Default)]
pub struct Vocabularies {
    pub sites: VocabularyMap,
    pub organs: VocabularyMap,
    pub lead_investigators: VocabularyMap,
    pub protocols: VocabularyMap,
}

impl Vocabularies {
    pub fn load(paths: &VocabularyPaths) -> Result<Self, MigrationError> {
        let sites = VocabularyMap::load(VocabularyKind::Site, paths.path(VocabularyKind::Site))?;
        let organs = VocabularyMap::load(VocabularyKind::Organ, paths.path(VocabularyKind::Organ))?;
        let lead_investigators = VocabularyMap::load(
            VocabularyKind::LeadInvestigator,
            paths.path(VocabularyKind::LeadInvestigator),
        )?;
        let protocols =
            VocabularyMap::load(VocabularyKind::Protocol, paths.path(VocabularyKind::Protocol))?;
        Ok(Self {
            sites,
            organs,
            lead_investigators,
            protocols,
        })
    }

    pub fn get(&self, kind: VocabularyKind) -> &VocabularyMap {
        match kind {
            VocabularyKind::Site => &self.sites,
            VocabularyKind::Organ => &self.organs,
            VocabularyKind::LeadInvestigator => &self.lead_investigators,
            VocabularyKind::Protocol => &self.protocols,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn organ_titles_use_dcterms() {
        let map = VocabularyMap::parse(
            VocabularyKind::Organ,
            r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                        xmlns:ns1="http://purl.org/dc/terms/">
                 <rdf:Description rdf:about="http://edrn.nci.nih.gov/data/body-systems/32">
                   <ns1:title>Thyroid</ns1:title>
                   <rdf:type rdf:resource="http://edrn.nci.nih.gov/rdf/types.rdf#BodySystem"/>
                 </rdf:Description>
               </rdf:RDF>"#,
        )
        .unwrap();
        assert_eq!(map.id_for("Thyroid"), Some("32"));
        assert_eq!(map.title_for("32"), Some("Thyroid"));
    }

    #[test]
    fn investigator_names_join_given_and_surname() {
        let map = VocabularyMap::parse(
            VocabularyKind::LeadInvestigator,
            r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                        xmlns:ns2="http://xmlns.com/foaf/0.1/">
                 <rdf:Description rdf:about="http://edrn.nci.nih.gov/data/registered-person/1645">
                   <ns2:surname>Lokshin</ns2:surname>
                   <ns2:givenname>Anna</ns2:givenname>
                 </rdf:Description>
               </rdf:RDF>"#,
        )
        .unwrap();
        assert_eq!(map.id_for("Anna Lokshin"), Some("1645"));
    }

    #[test]
    fn missing_surname_is_fatal() {
        let err = VocabularyMap::parse(
            VocabularyKind::LeadInvestigator,
            r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                        xmlns:foaf="http://xmlns.com/foaf/0.1/">
                 <rdf:Description rdf:about="http://edrn.nci.nih.gov/data/registered-person/7">
                   <foaf:givenname>Anna</foaf:givenname>
                 </rdf:Description>
               </rdf:RDF>"#,
        )
        .unwrap_err();
        assert_matches!(err, MigrationError::VocabularyLoad { .. });
    }

    #[test]
    fn title_in_wrong_namespace_is_not_accepted() {
        let err = VocabularyMap::parse(
            VocabularyKind::Site,
            r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                        xmlns:edrn="http://edrn.nci.nih.gov/rdf/schema.rdf#">
                 <rdf:Description rdf:about="http://edrn.nci.nih.gov/data/sites/1">
                   <edrn:title>Somewhere</edrn:title>
                 </rdf:Description>
               </rdf:RDF>"#,
        )
        .unwrap_err();
        assert_matches!(err, MigrationError::VocabularyLoad { .. });
    }
}
