//! Process-wide namespace registry: bidirectional prefix ↔ URI mapping.
//!
//! The [`NamespaceRegistry`] provides O(1) lookups in both directions
//! using two `DashMap`s. A URI has exactly one canonical name (the first
//! one registered for it); later names for the same URI are aliases.
//! The registry only grows.

use std::sync::{LazyLock, Mutex};

use dashmap::DashMap;

use super::table::BUILTIN_PREFIXES;
use super::{NamespacePrefix, RE_URI, decompose_prefix, is_local_name};
use crate::error::{NamespaceError, NamespaceResult};

static GLOBAL: LazyLock<NamespaceRegistry> = LazyLock::new(NamespaceRegistry::with_builtin);

/// Bidirectional namespace registry.
pub struct NamespaceRegistry {
    /// Every known name, canonical or alias → URI.
    name_to_uri: DashMap<String, String>,
    /// URI → canonical name.
    uri_to_name: DashMap<String, String>,
    /// Serializes `register` so the check-then-insert is atomic.
    write_lock: Mutex<()>,
}

impl NamespaceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            name_to_uri: DashMap::new(),
            uri_to_name: DashMap::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// Create a registry populated with the built-in prefix table.
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        for (name, uri) in BUILTIN_PREFIXES {
            registry.insert_unchecked(name, uri);
        }
        registry
    }

    /// The registry shared by every query built in this process.
    pub fn global() -> &'static NamespaceRegistry {
        &GLOBAL
    }

    fn insert_unchecked(&self, name: &str, uri: &str) {
        self.name_to_uri
            .entry(name.to_string())
            .or_insert_with(|| uri.to_string());
        self.uri_to_name
            .entry(uri.to_string())
            .or_insert_with(|| name.to_string());
    }

    /// Permanently add `name: <uri>` to the registry.
    ///
    /// Registering an existing binding again is a no-op. Rebinding a known
    /// name to a different URI is an error. A new name for a known URI
    /// becomes an alias of the canonical name.
    pub fn register(&self, name: &str, uri: &str) -> NamespaceResult<NamespacePrefix> {
        let name = name.trim();
        let uri = uri.trim();
        if name.is_empty() || uri.is_empty() {
            return Err(NamespaceError::Empty);
        }

        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let existing = self.name_to_uri.get(name).map(|r| r.value().clone());
        if let Some(existing) = existing {
            if existing != uri {
                return Err(NamespaceError::Inconsistent {
                    abbreviation: name.to_string(),
                    uri: uri.to_string(),
                    existing: format!("{name}: <{existing}>"),
                });
            }
        } else {
            self.insert_unchecked(name, uri);
            tracing::info!(prefix = name, uri, "namespace added to the registry");
        }

        self.canonical_for_uri(uri).ok_or_else(|| NamespaceError::Unknown {
            prefix: name.to_string(),
        })
    }

    /// Look up a prefix by name (canonical or alias). The returned prefix
    /// always carries the canonical name.
    pub fn lookup(&self, name: &str) -> Option<NamespacePrefix> {
        let uri = self.name_to_uri.get(name)?.value().clone();
        self.canonical_for_uri(&uri)
    }

    /// The canonical prefix registered for a namespace URI.
    pub fn canonical_for_uri(&self, uri: &str) -> Option<NamespacePrefix> {
        self.uri_to_name
            .get(uri)
            .map(|r| NamespacePrefix::new(r.value().clone(), uri.to_string()))
    }

    /// Whether exactly this binding is registered.
    pub fn contains(&self, prefix: &NamespacePrefix) -> bool {
        self.name_to_uri
            .get(prefix.name())
            .is_some_and(|uri| uri.value() == prefix.uri())
    }

    /// Check an `abbreviation: <uri>` pair against the registry.
    ///
    /// Returns `Ok(None)` when neither half is known, `Ok(Some(_))` when both
    /// resolve to the same entry, and an error when they disagree or only
    /// one half is known.
    pub fn resolve_consistent(
        &self,
        abbreviation: &str,
        uri: &str,
    ) -> NamespaceResult<Option<NamespacePrefix>> {
        let by_uri = self.canonical_for_uri(uri);
        let by_name = self.lookup(abbreviation);

        match (by_name, by_uri) {
            (None, None) => Ok(None),
            (Some(a), Some(b)) if a == b => Ok(Some(a)),
            (by_name, by_uri) => {
                let existing = by_name
                    .or(by_uri)
                    .map(|p| p.to_string())
                    .unwrap_or_default();
                Err(NamespaceError::Inconsistent {
                    abbreviation: abbreviation.to_string(),
                    uri: uri.to_string(),
                    existing,
                })
            }
        }
    }

    /// Resolve a `"abbr: <uri>"` declaration to a registered prefix,
    /// registering it when neither half is known yet.
    pub fn declare(&self, declaration: &str) -> NamespaceResult<NamespacePrefix> {
        if declaration.trim().is_empty() {
            return Err(NamespaceError::Empty);
        }
        let (abbreviation, uri) = decompose_prefix(declaration)?;
        match self.resolve_consistent(&abbreviation, &uri)? {
            Some(prefix) => Ok(prefix),
            None => self.register(&abbreviation, &uri),
        }
    }

    /// Prefixed form of `uri` when its namespace is known, otherwise the
    /// input unchanged. The URI is split at its last `/` or `#`. A known
    /// namespace whose local part cannot be written after a prefix gives
    /// the bracketed `<uri>`.
    pub fn shorten(&self, uri: &str) -> String {
        match self.split_known(uri) {
            Some((prefix, local)) if is_local_name(&local) => {
                format!("{}:{local}", prefix.name())
            }
            Some(_) => format!("<{}>", uri.trim()),
            None => uri.to_string(),
        }
    }

    /// Split an absolute URI into its registered namespace and local part.
    pub fn split_known(&self, uri: &str) -> Option<(NamespacePrefix, String)> {
        let caps = RE_URI.captures(uri.trim())?;
        let namespace = format!("{}{}", &caps["ns"], &caps["sep"]);
        let prefix = self.canonical_for_uri(&namespace)?;
        Some((prefix, caps["local"].to_string()))
    }

    /// Full URI for a `prefix:local` token, if the prefix is known.
    pub fn expand(&self, token: &str) -> Option<String> {
        let (name, local) = token.trim().split_once(':')?;
        if name.is_empty() {
            return None;
        }
        let uri = self.name_to_uri.get(name)?;
        Some(format!("{}{local}", uri.value()))
    }

    /// Rewrite `alias:local` to `canonical:local`.
    pub fn canonicalize(&self, token: &str) -> NamespaceResult<(String, NamespacePrefix)> {
        let token = token.trim();
        let (name, local) = token
            .split_once(':')
            .ok_or_else(|| NamespaceError::Malformed {
                prefix: token.to_string(),
            })?;
        let prefix = self.lookup(name).ok_or_else(|| NamespaceError::Unknown {
            prefix: name.to_string(),
        })?;
        Ok((format!("{}:{local}", prefix.name()), prefix))
    }

    /// Every canonical prefix, sorted by name.
    pub fn all(&self) -> Vec<NamespacePrefix> {
        let mut all: Vec<NamespacePrefix> = self
            .uri_to_name
            .iter()
            .map(|r| NamespacePrefix::new(r.value().clone(), r.key().clone()))
            .collect();
        all.sort();
        all
    }

    /// Alias names with the canonical prefix they stand for.
    pub fn aliases(&self) -> Vec<(String, NamespacePrefix)> {
        let mut aliases: Vec<(String, NamespacePrefix)> = self
            .name_to_uri
            .iter()
            .filter_map(|r| {
                let canonical = self.canonical_for_uri(r.value())?;
                (canonical.name() != r.key()).then(|| (r.key().clone(), canonical))
            })
            .collect();
        aliases.sort();
        aliases
    }

    /// Number of known names, aliases included.
    pub fn len(&self) -> usize {
        self.name_to_uri.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.name_to_uri.is_empty()
    }
}

impl Default for NamespaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NamespaceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamespaceRegistry")
            .field("names", &self.name_to_uri.len())
            .field("namespaces", &self.uri_to_name.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorten_known_namespace() {
        let reg = NamespaceRegistry::with_builtin();
        assert_eq!(reg.shorten("http://xmlns.com/foaf/0.1/surname"), "foaf:surname");
        assert_eq!(
            reg.shorten("http://www.w3.org/2000/01/rdf-schema#label"),
            "rdfs:label"
        );
    }

    #[test]
    fn shorten_unknown_namespace_is_identity() {
        let reg = NamespaceRegistry::with_builtin();
        let uri = "http://unknown.example.org/vocab/thing";
        assert_eq!(reg.shorten(uri), uri);
        assert_eq!(reg.shorten("not a uri"), "not a uri");
    }

    #[test]
    fn shorten_keeps_unsafe_local_part_bracketed() {
        let reg = NamespaceRegistry::with_builtin();
        assert_eq!(
            reg.shorten("http://fr.dbpedia.org/resource/Jean_Dupont_(écrivain)"),
            "<http://fr.dbpedia.org/resource/Jean_Dupont_(écrivain)>"
        );
        assert_eq!(
            reg.shorten("http://fr.dbpedia.org/resource/Jean_Dupont"),
            "dbpedia_fr:Jean_Dupont"
        );
    }

    #[test]
    fn first_registered_name_is_canonical() {
        let reg = NamespaceRegistry::with_builtin();
        assert_eq!(reg.shorten("http://dbpedia.org/ontology/birthDate"), "dbo:birthDate");
        assert_eq!(reg.lookup("dbpedia_owl").unwrap().name(), "dbo");
        assert_eq!(reg.lookup("wikidata").unwrap().name(), "wd");
        assert_eq!(reg.lookup("schemaorg").unwrap().name(), "schema");
    }

    #[test]
    fn expand_then_shorten_round_trips() {
        let reg = NamespaceRegistry::with_builtin();
        for token in ["foaf:givenName", "dbo:Person", "wd:Q5", "dbpedia:Category:Writers"] {
            let uri = reg.expand(token).unwrap();
            assert_eq!(reg.shorten(&uri), token);
        }
        assert!(reg.expand("nope:thing").is_none());
    }

    #[test]
    fn register_new_and_alias() {
        let reg = NamespaceRegistry::with_builtin();
        let p = reg.register("ex", "http://example.org/ns#").unwrap();
        assert_eq!(p.name(), "ex");
        assert_eq!(reg.shorten("http://example.org/ns#thing"), "ex:thing");

        let alias = reg.register("ex2", "http://example.org/ns#").unwrap();
        assert_eq!(alias.name(), "ex");
        assert_eq!(reg.canonicalize("ex2:thing").unwrap().0, "ex:thing");
    }

    #[test]
    fn register_conflicting_binding_fails() {
        let reg = NamespaceRegistry::with_builtin();
        let err = reg.register("foaf", "http://example.org/foaf/").unwrap_err();
        assert!(matches!(err, NamespaceError::Inconsistent { .. }));
    }

    #[test]
    fn resolve_consistent_cases() {
        let reg = NamespaceRegistry::with_builtin();
        assert!(
            reg.resolve_consistent("zz", "http://zz.example.org/")
                .unwrap()
                .is_none()
        );
        let both = reg
            .resolve_consistent("dbpedia_owl", "http://dbpedia.org/ontology/")
            .unwrap()
            .unwrap();
        assert_eq!(both.name(), "dbo");
        assert!(reg.resolve_consistent("xsd", "http://foo.org/bar#").is_err());
        assert!(
            reg.resolve_consistent("fresh", "http://xmlns.com/foaf/0.1/")
                .is_err()
        );
    }

    #[test]
    fn declare_registers_unknown_prefix() {
        let reg = NamespaceRegistry::with_builtin();
        let p = reg.declare("barbarbar: <http://bar.org/bar/bar/> .").unwrap();
        assert_eq!(p.name(), "barbarbar");
        assert!(reg.contains(&p));
        assert!(matches!(reg.declare(""), Err(NamespaceError::Empty)));
    }

    #[test]
    fn canonicalize_unknown_prefix_fails() {
        let reg = NamespaceRegistry::with_builtin();
        assert!(matches!(
            reg.canonicalize("nothere:x"),
            Err(NamespaceError::Unknown { .. })
        ));
    }

    #[test]
    fn all_lists_canonical_names_only() {
        let reg = NamespaceRegistry::with_builtin();
        let all = reg.all();
        assert!(all.iter().any(|p| p.name() == "dbo"));
        assert!(!all.iter().any(|p| p.name() == "dbpedia_owl"));
        assert!(reg.aliases().iter().any(|(alias, p)| alias == "dbpedia_owl" && p.name() == "dbo"));
    }
}
