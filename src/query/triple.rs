//! RDF triple patterns used in the WHERE clause of generated queries.
//!
//! Each slot is normalized once at construction. IRIs in a registered
//! namespace are shortened, alias prefixes are rewritten to their canonical
//! name, and every namespace a slot relies on is recorded so the query can
//! emit the matching `PREFIX` headers.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

use regex::Regex;

use super::normalize_text;
use crate::endpoint::Endpoint;
use crate::error::{NamespaceError, NamespaceResult};
use crate::lang::Language;
use crate::namespace::{NamespacePrefix, NamespaceRegistry, is_local_name};

/// Source of the `N` in default variable names `?s_N`, `?p_N`, `?o_N`.
static TRIPLE_COUNTER: AtomicU64 = AtomicU64::new(1);

static RE_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^"(?:[^"\\]|\\.)*"(?P<tag>@[A-Za-z]+(?:-[A-Za-z0-9]+)*|\^\^\S+)?$"#).unwrap()
});

static RE_NUMERIC_LITERAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^"[0-9]*"$"#).unwrap());

static RE_PREFIXED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<prefix>[A-Za-z][\w\-]*):(?P<local>\S*)$").unwrap());

static RE_INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?[0-9]+$").unwrap());

/// Raw input for one triple slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RdfElement {
    Integer(i64),
    Text(String),
}

impl From<i64> for RdfElement {
    fn from(value: i64) -> Self {
        RdfElement::Integer(value)
    }
}

impl From<i32> for RdfElement {
    fn from(value: i32) -> Self {
        RdfElement::Integer(i64::from(value))
    }
}

impl From<&str> for RdfElement {
    fn from(value: &str) -> Self {
        RdfElement::Text(value.to_string())
    }
}

impl From<String> for RdfElement {
    fn from(value: String) -> Self {
        RdfElement::Text(value)
    }
}

impl From<&String> for RdfElement {
    fn from(value: &String) -> Self {
        RdfElement::Text(value.clone())
    }
}

/// Shape of a normalized slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermKind {
    Integer,
    /// `<http://…>`
    Iri,
    /// `"…"`, optionally tagged or typed.
    Literal,
    /// `prefix:local`
    Prefixed,
    /// `?name`
    Variable,
    /// Anything else, e.g. the `a` keyword.
    Keyword,
}

/// One normalized slot of a triple.
#[derive(Debug, Clone)]
pub struct Term {
    text: String,
    kind: TermKind,
}

impl Term {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> TermKind {
        self.kind
    }

    pub fn is_variable(&self) -> bool {
        self.kind == TermKind::Variable
    }

    fn variable(name: String) -> Self {
        Self {
            text: name,
            kind: TermKind::Variable,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Quote and escape a value as a SPARQL string literal.
pub fn literal(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Endpoints a triple must not be sent to. A keep-only list wins over an
/// exclusion list and is turned into its complement.
pub fn forbidden_endpoints(excluded: &[Endpoint], keep_only: &[Endpoint]) -> BTreeSet<Endpoint> {
    if !keep_only.is_empty() {
        Endpoint::ALL
            .into_iter()
            .filter(|e| !keep_only.contains(e))
            .collect()
    } else {
        excluded.iter().copied().collect()
    }
}

/// A subject-predicate-object pattern.
///
/// Equality and hashing look at the three slots only.
#[derive(Debug, Clone)]
pub struct RdfTriple {
    id: u64,
    subject: Term,
    predicate: Term,
    object: Term,
    prefixes: Vec<NamespacePrefix>,
    language: Language,
    forbidden: BTreeSet<Endpoint>,
}

impl RdfTriple {
    pub fn builder() -> RdfTripleBuilder {
        RdfTripleBuilder::default()
    }

    /// Shorthand for a triple with the default language and no endpoint rules.
    pub fn new(
        subject: impl Into<RdfElement>,
        predicate: impl Into<RdfElement>,
        object: impl Into<RdfElement>,
    ) -> NamespaceResult<Self> {
        Self::builder()
            .subject(subject)
            .predicate(predicate)
            .object(object)
            .build()
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn subject(&self) -> &Term {
        &self.subject
    }

    pub fn predicate(&self) -> &Term {
        &self.predicate
    }

    pub fn object(&self) -> &Term {
        &self.object
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Namespaces this triple relies on, in insertion order.
    pub fn prefixes(&self) -> &[NamespacePrefix] {
        &self.prefixes
    }

    pub fn forbidden_endpoints(&self) -> &BTreeSet<Endpoint> {
        &self.forbidden
    }

    pub fn is_allowed_for(&self, endpoint: Endpoint) -> bool {
        !self.forbidden.contains(&endpoint)
    }

    /// The slots that are variables, in subject, predicate, object order.
    pub fn variables(&self) -> Vec<&str> {
        [&self.subject, &self.predicate, &self.object]
            .into_iter()
            .filter(|t| t.is_variable())
            .map(Term::as_str)
            .collect()
    }

    /// Append a `"abbr: <uri>"` declaration, registering it if new.
    pub fn add_prefix(&mut self, declaration: &str) -> NamespaceResult<()> {
        let prefix = NamespaceRegistry::global().declare(declaration)?;
        self.add_namespace(prefix);
        Ok(())
    }

    /// Append an already registered namespace.
    pub fn add_namespace(&mut self, prefix: NamespacePrefix) {
        if !self.prefixes.contains(&prefix) {
            self.prefixes.push(prefix);
        }
    }

    /// `s p o` without the terminating dot. With `with_language`, an
    /// untagged non-numeric string literal object gets `@lang`.
    pub fn pattern(&self, with_language: bool) -> String {
        if with_language && self.needs_language_tag() {
            format!(
                "{} {} {}@{}",
                self.subject,
                self.predicate,
                self.object,
                self.language.code()
            )
        } else {
            format!("{} {} {}", self.subject, self.predicate, self.object)
        }
    }

    /// `s p o .`
    pub fn render(&self, with_language: bool) -> String {
        format!("{} .", self.pattern(with_language))
    }

    fn needs_language_tag(&self) -> bool {
        if self.object.kind != TermKind::Literal {
            return false;
        }
        let text = self.object.as_str();
        let untagged = RE_LITERAL
            .captures(text)
            .is_some_and(|caps| caps.name("tag").is_none());
        untagged && !RE_NUMERIC_LITERAL.is_match(text)
    }
}

impl PartialEq for RdfTriple {
    fn eq(&self, other: &Self) -> bool {
        self.subject.text == other.subject.text
            && self.predicate.text == other.predicate.text
            && self.object.text == other.object.text
    }
}

impl Eq for RdfTriple {}

impl Hash for RdfTriple {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.subject.text.hash(state);
        self.predicate.text.hash(state);
        self.object.text.hash(state);
    }
}

impl fmt::Display for RdfTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

/// Builder for [`RdfTriple`]. Omitted slots become fresh variables.
#[derive(Debug, Default)]
pub struct RdfTripleBuilder {
    subject: Option<RdfElement>,
    predicate: Option<RdfElement>,
    object: Option<RdfElement>,
    declarations: Vec<String>,
    namespaces: Vec<NamespacePrefix>,
    excluded: Vec<Endpoint>,
    keep_only: Vec<Endpoint>,
    language: Language,
}

impl RdfTripleBuilder {
    pub fn subject(mut self, subject: impl Into<RdfElement>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn predicate(mut self, predicate: impl Into<RdfElement>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    pub fn object(mut self, object: impl Into<RdfElement>) -> Self {
        self.object = Some(object.into());
        self
    }

    /// Add a `"abbr: <uri>"` prefix declaration.
    pub fn prefix(mut self, declaration: impl Into<String>) -> Self {
        self.declarations.push(declaration.into());
        self
    }

    pub fn namespace(mut self, prefix: NamespacePrefix) -> Self {
        self.namespaces.push(prefix);
        self
    }

    pub fn exclude(mut self, endpoint: Endpoint) -> Self {
        self.excluded.push(endpoint);
        self
    }

    pub fn keep_only(mut self, endpoints: impl IntoIterator<Item = Endpoint>) -> Self {
        self.keep_only.extend(endpoints);
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn build(self) -> NamespaceResult<RdfTriple> {
        let id = TRIPLE_COUNTER.fetch_add(1, Ordering::Relaxed);
        let registry = NamespaceRegistry::global();

        let mut prefixes = Vec::new();
        for declaration in &self.declarations {
            let prefix = registry.declare(declaration)?;
            if !prefixes.contains(&prefix) {
                prefixes.push(prefix);
            }
        }
        for prefix in self.namespaces {
            if !registry.contains(&prefix) {
                return Err(NamespaceError::Unknown {
                    prefix: prefix.name().to_string(),
                });
            }
            if !prefixes.contains(&prefix) {
                prefixes.push(prefix);
            }
        }

        let mut slot = |element: Option<RdfElement>, default: String| match element {
            Some(element) => classify(registry, element, &mut prefixes),
            None => Ok(Term::variable(default)),
        };
        let subject = slot(self.subject, format!("?s_{id}"))?;
        let predicate = slot(self.predicate, format!("?p_{id}"))?;
        let object = slot(self.object, format!("?o_{id}"))?;

        let triple = RdfTriple {
            id,
            subject,
            predicate,
            object,
            prefixes,
            language: self.language,
            forbidden: forbidden_endpoints(&self.excluded, &self.keep_only),
        };
        tracing::debug!(triple = %triple, "created triple");
        Ok(triple)
    }
}

/// Normalize one slot and record the namespace it needs.
fn classify(
    registry: &NamespaceRegistry,
    element: RdfElement,
    prefixes: &mut Vec<NamespacePrefix>,
) -> NamespaceResult<Term> {
    let mut need = |prefix: NamespacePrefix| {
        if !prefixes.contains(&prefix) {
            prefixes.push(prefix);
        }
    };

    let text = match element {
        RdfElement::Integer(value) => {
            return Ok(Term {
                text: value.to_string(),
                kind: TermKind::Integer,
            });
        }
        RdfElement::Text(text) => text,
    };
    let trimmed = text.trim();

    if trimmed.len() > 1 && trimmed.starts_with('<') && trimmed.ends_with('>') {
        let iri = &trimmed[1..trimmed.len() - 1];
        if let Some((prefix, local)) = registry.split_known(iri) {
            if is_local_name(&local) {
                let token = format!("{}:{local}", prefix.name());
                need(prefix);
                return Ok(Term {
                    text: normalize_text(&token),
                    kind: TermKind::Prefixed,
                });
            }
        }
        return Ok(Term {
            text: normalize_text(trimmed),
            kind: TermKind::Iri,
        });
    }

    if (trimmed.starts_with("http://") || trimmed.starts_with("https://"))
        && !trimmed.contains(char::is_whitespace)
    {
        return Ok(Term {
            text: format!("<{trimmed}>"),
            kind: TermKind::Iri,
        });
    }

    if trimmed.starts_with('"') {
        return Ok(Term {
            text: normalize_text(trimmed),
            kind: TermKind::Literal,
        });
    }

    if trimmed.starts_with('?') {
        return Ok(Term {
            text: normalize_text(trimmed),
            kind: TermKind::Variable,
        });
    }

    if RE_INTEGER.is_match(trimmed) {
        return Ok(Term {
            text: trimmed.to_string(),
            kind: TermKind::Integer,
        });
    }

    if let Some(caps) = RE_PREFIXED.captures(trimmed) {
        let (canonical, prefix) = registry.canonicalize(trimmed)?;
        if !is_local_name(&caps["local"]) {
            return Ok(Term {
                text: normalize_text(&format!("<{}{}>", prefix.uri(), &caps["local"])),
                kind: TermKind::Iri,
            });
        }
        need(prefix);
        return Ok(Term {
            text: normalize_text(&canonical),
            kind: TermKind::Prefixed,
        });
    }

    Ok(Term {
        text: normalize_text(trimmed),
        kind: TermKind::Keyword,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(triple: &RdfTriple) -> Vec<&str> {
        triple.prefixes().iter().map(|p| p.name()).collect()
    }

    #[test]
    fn default_slots_are_fresh_variables() {
        let a = RdfTriple::builder().build().unwrap();
        let b = RdfTriple::builder().build().unwrap();
        assert_eq!(a.variables().len(), 3);
        assert!(a.subject().as_str().starts_with("?s_"));
        assert!(a.predicate().as_str().starts_with("?p_"));
        assert!(a.object().as_str().starts_with("?o_"));
        assert_ne!(a, b);
        assert!(a.render(false).ends_with(" ."));
    }

    #[test]
    fn bracketed_iri_is_shortened() {
        let t = RdfTriple::new("?x", "<http://purl.org/dc/elements/1.1/title>", "?t").unwrap();
        assert_eq!(t.predicate().as_str(), "dc:title");
        assert_eq!(t.predicate().kind(), TermKind::Prefixed);
        assert_eq!(names(&t), vec!["dc"]);
    }

    #[test]
    fn bracketed_iri_with_unsafe_local_part_is_kept() {
        let t = RdfTriple::new("<http://dbpedia.org/resource/Dune_(novel)>", "?p", "?o").unwrap();
        assert_eq!(t.subject().as_str(), "<http://dbpedia.org/resource/Dune_(novel)>");
        assert_eq!(t.subject().kind(), TermKind::Iri);
        assert!(t.prefixes().is_empty());
    }

    #[test]
    fn prefixed_token_with_unsafe_local_part_is_expanded() {
        let t = RdfTriple::new("?book", "dbo:author", "dbpedia_fr:Jean_Dupont_(écrivain)").unwrap();
        assert_eq!(
            t.object().as_str(),
            "<http://fr.dbpedia.org/resource/Jean_Dupont_(écrivain)>"
        );
        assert_eq!(t.object().kind(), TermKind::Iri);
        assert_eq!(names(&t), vec!["dbo"]);
    }

    #[test]
    fn unknown_namespace_stays_bracketed() {
        let t = RdfTriple::new("<http://nowhere.example/ns/x>", "?p", "?o").unwrap();
        assert_eq!(t.subject().as_str(), "<http://nowhere.example/ns/x>");
    }

    #[test]
    fn bare_url_is_bracketed() {
        let t = RdfTriple::new("http://nowhere.example/x", "?p", "?o").unwrap();
        assert_eq!(t.subject().as_str(), "<http://nowhere.example/x>");
    }

    #[test]
    fn alias_prefix_is_canonicalized() {
        let t = RdfTriple::new("?person", "dbpedia_owl:birthDate", "?d").unwrap();
        assert_eq!(t.predicate().as_str(), "dbo:birthDate");
        assert_eq!(names(&t), vec!["dbo"]);
    }

    #[test]
    fn unknown_prefix_is_an_error() {
        let err = RdfTriple::new("?x", "nothere:prop", "?y").unwrap_err();
        assert!(matches!(err, NamespaceError::Unknown { .. }));
    }

    #[test]
    fn declared_prefix_makes_token_usable() {
        let t = RdfTriple::builder()
            .subject("?x")
            .predicate("tripletest:prop")
            .object("?y")
            .prefix("tripletest: <http://tripletest.example.org/ns#>")
            .build()
            .unwrap();
        assert_eq!(names(&t), vec!["tripletest"]);
    }

    #[test]
    fn text_is_normalized() {
        let t = RdfTriple::new("?x", "a", "\"  Marguerite \t  Duras \"").unwrap();
        assert_eq!(t.object().as_str(), "\" Marguerite Duras \"");
        assert_eq!(t.predicate().kind(), TermKind::Keyword);
    }

    #[test]
    fn integers_pass_through() {
        let t = RdfTriple::new("?x", "?has_birth_year", 1914).unwrap();
        assert_eq!(t.object().kind(), TermKind::Integer);
        assert_eq!(t.render(true), "?x ?has_birth_year 1914 .");
    }

    #[test]
    fn language_tag_only_on_plain_literals() {
        let tagged = RdfTriple::builder()
            .subject("?x")
            .predicate("rdfs:label")
            .object(literal("Obama"))
            .language(Language::French)
            .build()
            .unwrap();
        assert_eq!(tagged.render(true), "?x rdfs:label \"Obama\"@fr .");
        assert_eq!(tagged.render(false), "?x rdfs:label \"Obama\" .");

        let numeric = RdfTriple::new("?x", "?y", "\"1789\"").unwrap();
        assert_eq!(numeric.render(true), "?x ?y \"1789\" .");

        let explicit = RdfTriple::new("?x", "?y", "\"Paris\"@de").unwrap();
        assert_eq!(explicit.render(true), "?x ?y \"Paris\"@de .");
    }

    #[test]
    fn keep_only_wins_over_excluded() {
        let t = RdfTriple::builder()
            .exclude(Endpoint::Bnf)
            .keep_only([Endpoint::Wikidata])
            .build()
            .unwrap();
        assert!(t.is_allowed_for(Endpoint::Wikidata));
        assert!(!t.is_allowed_for(Endpoint::Bnf));
        assert!(!t.is_allowed_for(Endpoint::Dbpedia));

        let only_excluded = forbidden_endpoints(&[Endpoint::Wikidata], &[]);
        assert_eq!(only_excluded.len(), 1);
        assert!(forbidden_endpoints(&[], &[]).is_empty());
    }

    #[test]
    fn equality_ignores_language_and_prefixes() {
        let a = RdfTriple::builder()
            .subject("?x")
            .predicate("rdfs:label")
            .object("\"a\"")
            .language(Language::German)
            .build()
            .unwrap();
        let b = RdfTriple::new("?x", "<http://www.w3.org/2000/01/rdf-schema#label>", "\"a\"").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn literal_escapes_quotes_and_backslashes() {
        assert_eq!(literal(r#"say "hi"\"#), r#""say \"hi\"\\""#);
    }

    #[test]
    fn shorten_expand_round_trip_for_registered_iris() {
        let registry = NamespaceRegistry::global();
        let t = RdfTriple::new("<http://xmlns.com/foaf/0.1/Person>", "?p", "?o").unwrap();
        let expanded = registry.expand(t.subject().as_str()).unwrap();
        assert_eq!(registry.shorten(&expanded), t.subject().as_str());
    }
}
