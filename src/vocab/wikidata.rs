//! Human-readable aliases for Wikidata property identifiers.
//!
//! Wikidata names its properties with opaque numbers (`wdt:P569`). Result
//! values and vocabulary predicates are rewritten to `wdt:date_of_birth`
//! so that downstream keyword scans ("birth", "gender", "name") work the
//! same on every endpoint.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

const PROPERTY_ALIASES: &[(&str, &str)] = &[
    ("P18", "image"),
    ("P19", "place_of_birth"),
    ("P20", "place_of_death"),
    ("P21", "sex_or_gender"),
    ("P22", "father"),
    ("P25", "mother"),
    ("P26", "spouse"),
    ("P27", "country_of_citizenship"),
    ("P31", "instance_of"),
    ("P40", "child"),
    ("P50", "author"),
    ("P69", "educated_at"),
    ("P106", "occupation"),
    ("P123", "publisher"),
    ("P136", "genre"),
    ("P140", "religion"),
    ("P166", "award_received"),
    ("P212", "isbn_13"),
    ("P213", "isni"),
    ("P214", "viaf_id"),
    ("P227", "gnd_id"),
    ("P244", "library_of_congress_authority_id"),
    ("P268", "bnf_id"),
    ("P269", "idref_id"),
    ("P279", "subclass_of"),
    ("P373", "commons_category"),
    ("P407", "language_of_work_or_name"),
    ("P509", "cause_of_death"),
    ("P569", "date_of_birth"),
    ("P570", "date_of_death"),
    ("P577", "publication_date"),
    ("P646", "freebase_id"),
    ("P734", "family_name"),
    ("P735", "given_name"),
    ("P742", "pseudonym"),
    ("P746", "date_of_disappearance"),
    ("P800", "notable_work"),
    ("P910", "topics_main_category"),
    ("P937", "work_location"),
    ("P957", "isbn_10"),
    ("P1196", "manner_of_death"),
    ("P1343", "described_by_source"),
    ("P1412", "languages_spoken_written_or_signed"),
    ("P1476", "title"),
    ("P1477", "birth_name"),
    ("P1559", "name_in_native_language"),
    ("P1773", "attributed_to"),
    ("P1813", "short_name"),
    ("P1950", "second_family_name_in_spanish_name"),
    ("P2093", "author_name_string"),
    ("P2561", "name"),
];

static ALIASES: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| PROPERTY_ALIASES.iter().copied().collect());

/// Property tokens in any of the Wikidata property namespaces.
static RE_PROPERTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?P<ns>wdt|p|ps|psv|psn|pq|pqv|pqn|pr|prv|prn|wdno):(?P<id>P[0-9]+)\b").unwrap()
});

/// Alias for a bare property id such as `P569`.
pub fn property_alias(id: &str) -> Option<&'static str> {
    ALIASES.get(id).copied()
}

/// Replace every known `ns:Pnnn` token in `value` with `ns:alias`.
/// Unknown properties are left untouched.
pub fn translate_properties(value: &str) -> String {
    if !value.contains(":P") {
        return value.to_string();
    }
    RE_PROPERTY
        .replace_all(value, |caps: &Captures<'_>| match property_alias(&caps["id"]) {
            Some(alias) => format!("{}:{alias}", &caps["ns"]),
            None => caps[0].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_property_is_translated() {
        assert_eq!(translate_properties("wdt:P569"), "wdt:date_of_birth");
        assert_eq!(translate_properties("ps:P21"), "ps:sex_or_gender");
    }

    #[test]
    fn unknown_property_is_kept() {
        assert_eq!(translate_properties("wdt:P99999"), "wdt:P99999");
    }

    #[test]
    fn entities_and_plain_text_are_untouched() {
        assert_eq!(translate_properties("wd:Q5"), "wd:Q5");
        assert_eq!(translate_properties("Paris"), "Paris");
        assert_eq!(translate_properties("foo:P31"), "foo:P31");
    }

    #[test]
    fn alias_table_has_no_duplicate_ids() {
        let mut ids: Vec<&str> = PROPERTY_ALIASES.iter().map(|(id, _)| *id).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }
}
