//! Cleanup of free-text values coming out of legacy metadata documents.

use std::sync::OnceLock;

use regex::Regex;

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

/// Collapses line breaks and whitespace runs into single spaces and drops
/// escaped-space artifacts (`"\ "`) left behind by the ECAS exporter.
pub fn cleanup_text(raw: &str) -> String {
    let joined = raw.replace("\r\n", " ").replace(['\n', '\r'], " ");
    let collapsed = whitespace_re().replace_all(&joined, " ");
    collapsed.replace("\\ ", "")
}

/// Un-escapes XML entities. Values that do not parse as escaped XML (a bare
/// `&`, an HTML-only entity) still get the predefined entities replaced.
pub fn unescape_entities(value: &str) -> String {
    match quick_xml::escape::unescape(value) {
        Ok(unescaped) => unescaped.into_owned(),
        Err(_) => value
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&amp;", "&"),
    }
}

/// Reverses URL-style encoding: `%XX` sequences and `+` for space.
pub fn url_decode(value: &str) -> String {
    let bytes = urlencoding::decode_binary(value.as_bytes());
    String::from_utf8_lossy(&bytes).replace('+', " ")
}

/// Normalization applied to product type (dataset level) values.
pub fn normalize_dataset_value(raw: &str) -> String {
    unescape_entities(&cleanup_text(raw))
}

/// Normalization applied to per-file values, which were additionally
/// URL-encoded by the legacy crawler.
pub fn normalize_file_value(raw: &str) -> String {
    unescape_entities(&url_decode(&cleanup_text(raw)))
}
