//! SPARQL SELECT generation and result normalization.
//!
//! [`RdfTriple`] is one normalized pattern; [`SparqlQuery`] accumulates
//! patterns, renders one query text per endpoint, submits them through a
//! [`SparqlTransport`](crate::transport::SparqlTransport) and flattens the
//! JSON bindings into normalized rows.

mod builder;
mod triple;

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

pub use builder::{CommitReport, DEFAULT_LIMIT, EndpointFailure, ResultRow, SparqlQuery};
pub use triple::{
    RdfElement, RdfTriple, RdfTripleBuilder, Term, TermKind, forbidden_endpoints, literal,
};

/// Marker appended to literals that came back with an `xml:lang` tag.
static RE_LANGUAGE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?s)(?P<lit>.*?) _\(@(?P<lang>[^)]*)\)$").unwrap());

/// Trim, NFC-normalize and collapse runs of whitespace to one space.
pub fn normalize_text(s: &str) -> String {
    let nfc: String = s.trim().nfc().collect();
    nfc.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Append the `literal _(@lang)` marker.
pub fn with_language_suffix(value: &str, lang: &str) -> String {
    format!("{value} _(@{lang})")
}

/// Split a `literal _(@lang)` value into its text and language.
pub fn split_language_suffix(value: &str) -> (&str, Option<&str>) {
    match RE_LANGUAGE_SUFFIX.captures(value) {
        Some(caps) => {
            let lit = caps.name("lit").map_or(value, |m| m.as_str());
            let lang = caps.name("lang").map(|m| m.as_str());
            (lit, lang)
        }
        None => (value, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize_text("  Simone \n de\tBeauvoir  "), "Simone de Beauvoir");
    }

    #[test]
    fn normalize_composes_unicode() {
        let decomposed = "Vale\u{0301}rie";
        assert_eq!(normalize_text(decomposed), "Val\u{00e9}rie");
    }

    #[test]
    fn language_suffix_round_trip() {
        let tagged = with_language_suffix("Marguerite Duras", "fr");
        assert_eq!(tagged, "Marguerite Duras _(@fr)");
        assert_eq!(split_language_suffix(&tagged), ("Marguerite Duras", Some("fr")));
        assert_eq!(split_language_suffix("plain"), ("plain", None));
    }
}
