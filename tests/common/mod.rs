#![allow(dead_code)]

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

pub const SITES_RDF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:ns1="http://edrn.nci.nih.gov/rdf/schema.rdf#"
         xmlns:ns2="http://purl.org/dc/terms/">
  <rdf:Description rdf:about="http://edrn.nci.nih.gov/data/sites/313">
    <ns2:title>CRUK Cambridge Research Institute</ns2:title>
    <ns1:abbreviatedName>CRUK</ns1:abbreviatedName>
  </rdf:Description>
  <rdf:Description rdf:about="http://edrn.nci.nih.gov/data/sites/70">
    <ns2:title>Fred Hutchinson Cancer Research Center</ns2:title>
  </rdf:Description>
</rdf:RDF>
"#;

pub const ORGANS_RDF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:ns1="http://purl.org/dc/terms/">
  <rdf:Description rdf:about="http://edrn.nci.nih.gov/data/body-systems/32">
    <ns1:title>Thyroid</ns1:title>
    <rdf:type rdf:resource="http://edrn.nci.nih.gov/rdf/types.rdf#BodySystem"/>
  </rdf:Description>
  <rdf:Description rdf:about="http://edrn.nci.nih.gov/data/body-systems/7">
    <ns1:title>Lung</ns1:title>
  </rdf:Description>
</rdf:RDF>
"#;

pub const LEAD_PIS_RDF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:ns2="http://xmlns.com/foaf/0.1/">
  <rdf:Description rdf:about="http://edrn.nci.nih.gov/data/registered-person/1001">
    <ns2:surname>Doe</ns2:surname>
    <ns2:givenname>Jane</ns2:givenname>
  </rdf:Description>
  <rdf:Description rdf:about="http://edrn.nci.nih.gov/data/registered-person/1645">
    <ns2:surname>Lokshin</ns2:surname>
    <ns2:givenname>Anna</ns2:givenname>
  </rdf:Description>
</rdf:RDF>
"#;

pub const PROTOCOLS_RDF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:ns2="http://purl.org/dc/terms/">
  <rdf:Description rdf:about="http://edrn.nci.nih.gov/data/protocols/site-specific/282-87">
    <ns2:title>Light Scattering Spectroscopy for the Detection of Colorectal Neoplasia</ns2:title>
  </rdf:Description>
</rdf:RDF>
"#;

pub fn utf8(dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
}

pub fn write(path: &Utf8Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Writes the four reference vocabularies under `root/rdf`.
pub fn write_vocabularies(root: &Utf8Path) -> labcas_migrate::vocabulary::VocabularyPaths {
    let rdf = root.join("rdf");
    let paths = labcas_migrate::vocabulary::VocabularyPaths {
        sites: rdf.join("sites.rdf"),
        organs: rdf.join("body-systems.rdf"),
        lead_investigators: rdf.join("registered-person.rdf"),
        protocols: rdf.join("protocols.rdf"),
    };
    write(&paths.sites, SITES_RDF);
    write(&paths.organs, ORGANS_RDF);
    write(&paths.lead_investigators, LEAD_PIS_RDF);
    write(&paths.protocols, PROTOCOLS_RDF);
    paths
}

pub fn keyval(key: &str, value: &str) -> String {
    format!("<keyval type=\"vector\"><key>{key}</key><val>{value}</val></keyval>")
}

pub fn product_type_document(description: &str, keyvals: &[(&str, &str)]) -> String {
    let body: String = keyvals.iter().map(|(k, v)| keyval(k, v)).collect();
    format!(
        "<cas:producttype xmlns:cas=\"http://oodt.jpl.nasa.gov/1.0/cas\" id=\"urn:edrn:Test\">\
         <name>Test</name><description>{description}</description>\
         <metadata>{body}</metadata></cas:producttype>"
    )
}

pub fn file_document(keyvals: &[(&str, &str)]) -> String {
    let body: String = keyvals.iter().map(|(k, v)| keyval(k, v)).collect();
    format!("<cas:metadata xmlns:cas=\"http://oodt.jpl.nasa.gov/1.0/cas\">{body}</cas:metadata>")
}
