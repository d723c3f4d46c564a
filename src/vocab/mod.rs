//! Read-only vocabulary: RDF types and attribute predicates per entity class.
//!
//! The table is TOML bundled into the binary from `data/vocabulary.toml`.
//! Terms are compared in normalized form (see [`normalize_term`]) so that
//! `dbpedia_owl:Person`, `dbo:Person` and
//! `<http://dbpedia.org/ontology/Person>` all match each other.

mod wikidata;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::LazyLock;

use serde::Deserialize;

pub use wikidata::{property_alias, translate_properties};

use crate::error::{ConfigError, ConfigResult};
use crate::namespace::{NamespaceRegistry, canonical_token, is_local_name};

const VOCABULARY_TOML: &str = include_str!("../../data/vocabulary.toml");

static BUNDLED: LazyLock<Vocabulary> = LazyLock::new(|| {
    Vocabulary::from_toml_str(VOCABULARY_TOML).unwrap_or_else(|e| {
        tracing::warn!("Failed to parse bundled vocabulary: {e}");
        Vocabulary::default()
    })
});

/// The entity classes the vocabulary describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityClass {
    Thing,
    Person,
    CreativeWork,
    Book,
}

impl EntityClass {
    /// Name used as the table key and as the query's subject variable.
    pub fn name(self) -> &'static str {
        match self {
            EntityClass::Thing => "Thing",
            EntityClass::Person => "Person",
            EntityClass::CreativeWork => "CreativeWork",
            EntityClass::Book => "Book",
        }
    }
}

impl fmt::Display for EntityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── TOML data model ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
struct VocabularyToml {
    #[serde(default)]
    classes: HashMap<String, ClassVocabulary>,
}

/// Vocabulary entry for one class.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassVocabulary {
    /// Class whose attribute predicates are inherited.
    #[serde(default)]
    pub extends: Option<String>,
    /// Objects that count as type evidence for this class.
    #[serde(default)]
    pub rdf_types: Vec<String>,
    /// Attribute name → predicates known to carry it.
    #[serde(default)]
    pub attributes: BTreeMap<String, Vec<String>>,
}

/// The vocabulary collaborator.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    classes: HashMap<String, ClassVocabulary>,
}

impl Vocabulary {
    /// The vocabulary bundled with the crate.
    pub fn bundled() -> &'static Vocabulary {
        &BUNDLED
    }

    /// Parse a vocabulary table.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let parsed: VocabularyToml = toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: "vocabulary".into(),
            message: e.to_string(),
        })?;
        Ok(Self {
            classes: parsed.classes,
        })
    }

    /// Raw entry for a class, if present.
    pub fn class(&self, class: EntityClass) -> Option<&ClassVocabulary> {
        self.classes.get(class.name())
    }

    /// Type terms for `class`, as written in the table.
    pub fn rdf_types_for(&self, class: EntityClass) -> Vec<String> {
        self.class(class)
            .map(|c| c.rdf_types.clone())
            .unwrap_or_default()
    }

    /// Type terms for `class`, normalized for comparison with result values.
    pub fn normalized_rdf_types_for(&self, class: EntityClass) -> Vec<String> {
        let mut types: Vec<String> = self
            .rdf_types_for(class)
            .iter()
            .map(|t| normalize_term(t))
            .collect();
        types.sort();
        types.dedup();
        types
    }

    /// Attribute predicates for `class`, including those inherited through
    /// `extends`. A subclass entry overrides its parent's for the same name.
    pub fn attribute_predicates_for(&self, class: EntityClass) -> BTreeMap<String, Vec<String>> {
        let mut chain = Vec::new();
        let mut current = self.classes.get(class.name());
        while let Some(entry) = current {
            chain.push(entry);
            // Guard against cycles in hand-edited tables.
            if chain.len() > self.classes.len() {
                break;
            }
            current = entry.extends.as_deref().and_then(|p| self.classes.get(p));
        }

        let mut merged = BTreeMap::new();
        for entry in chain.into_iter().rev() {
            for (name, predicates) in &entry.attributes {
                merged.insert(name.clone(), predicates.clone());
            }
        }
        merged
    }

    /// Known predicates for one attribute of `class`.
    pub fn predicates_for(&self, class: EntityClass, attribute: &str) -> Vec<String> {
        self.attribute_predicates_for(class)
            .remove(attribute)
            .unwrap_or_default()
    }
}

/// Normalize a vocabulary or result term for comparison: absolute URIs are
/// shortened, alias prefixes canonicalized and Wikidata property ids
/// translated. A prefixed token whose local part needs escaping compares as
/// its bracketed IRI.
pub fn normalize_term(term: &str) -> String {
    let term = term.trim();
    let bare = term
        .strip_prefix('<')
        .and_then(|t| t.strip_suffix('>'))
        .unwrap_or(term);
    let registry = NamespaceRegistry::global();
    let shortened = if bare.starts_with("http://") || bare.starts_with("https://") {
        registry.shorten(bare)
    } else {
        let escaped = bare
            .split_once(':')
            .is_some_and(|(_, local)| !local.contains(char::is_whitespace) && !is_local_name(local));
        match registry.expand(bare) {
            Some(iri) if escaped => registry.shorten(&iri),
            _ => canonical_token(bare),
        }
    };
    translate_properties(&shortened)
}
