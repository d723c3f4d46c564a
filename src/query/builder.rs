//! Iterative construction of SPARQL SELECT queries.
//!
//! A [`SparqlQuery`] owns mandatory triples and alternative groups (rendered
//! as `UNION`s). It renders one text per endpoint, honoring each triple's
//! endpoint restrictions and each endpoint's language tagging, submits the
//! texts sequentially and keeps the normalized result rows.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use super::triple::RdfTriple;
use super::{normalize_text, with_language_suffix};
use crate::endpoint::Endpoint;
use crate::error::{QueryError, QueryResult};
use crate::lang::Language;
use crate::namespace::{NamespacePrefix, NamespaceRegistry};
use crate::transport::SparqlTransport;
use crate::vocab::translate_properties;

/// Result limit applied when none is set.
pub const DEFAULT_LIMIT: u64 = 1500;

/// Groups larger than this are pruned of foreign-locale DBpedia IRIs.
const MAX_GROUP_BEFORE_PRUNING: usize = 10;

static RE_LOCALIZED_DBPEDIA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:<https?://(?P<host>[a-z]{2})\.dbpedia\.org/|dbpedia_(?P<pfx>[a-z]{2}):)")
        .unwrap()
});

/// One result row: `(variable, normalized value)` pairs ordered by variable.
pub type ResultRow = Vec<(String, String)>;

/// An endpoint that did not contribute results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointFailure {
    pub endpoint: Endpoint,
    pub reason: String,
}

/// What happened on each endpoint during a commit.
///
/// Failures never abort a commit; this report is how callers learn that
/// results are partial.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    /// Endpoints that answered, with the number of rows each returned.
    pub answered: Vec<(Endpoint, usize)>,
    pub failed: Vec<EndpointFailure>,
}

impl CommitReport {
    /// Whether at least one endpoint failed.
    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Rows received across all endpoints.
    pub fn rows(&self) -> usize {
        self.answered.iter().map(|(_, n)| n).sum()
    }

    /// Fold another report into this one.
    pub fn absorb(&mut self, other: CommitReport) {
        self.answered.extend(other.answered);
        self.failed.extend(other.failed);
    }
}

// ── SPARQL JSON results ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SparqlJson {
    results: SparqlBindings,
}

#[derive(Debug, Deserialize)]
struct SparqlBindings {
    #[serde(default)]
    bindings: Vec<BTreeMap<String, BindingValue>>,
}

#[derive(Debug, Deserialize)]
struct BindingValue {
    value: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(rename = "xml:lang", default)]
    lang: Option<String>,
}

/// Normalize one bound value: shorten, make Wikidata properties legible,
/// normalize whitespace, then mark the literal's language.
fn normalize_binding(value: &BindingValue) -> String {
    let shortened = NamespaceRegistry::global().shorten(&value.value);
    let legible = translate_properties(&shortened);
    let normalized = normalize_text(&legible);
    let is_literal = value
        .kind
        .as_deref()
        .is_none_or(|k| k == "literal" || k == "typed-literal");
    match value.lang.as_deref() {
        Some(lang) if is_literal && !lang.is_empty() => with_language_suffix(&normalized, lang),
        _ => normalized,
    }
}

fn parse_rows(body: &str) -> Result<Vec<ResultRow>, serde_json::Error> {
    let parsed: SparqlJson = serde_json::from_str(body)?;
    Ok(parsed
        .results
        .bindings
        .iter()
        .map(|binding| {
            binding
                .iter()
                .map(|(var, value)| (var.clone(), normalize_binding(value)))
                .collect()
        })
        .collect())
}

// ── Query ───────────────────────────────────────────────────────────────

/// A SPARQL SELECT query under construction.
#[derive(Debug, Clone)]
pub struct SparqlQuery {
    prefixes: Vec<NamespacePrefix>,
    languages: BTreeSet<Language>,
    result_variables: Vec<String>,
    endpoints: BTreeSet<Endpoint>,
    triples: Vec<RdfTriple>,
    groups: Vec<Vec<RdfTriple>>,
    limit: u64,
    queries: BTreeMap<Endpoint, String>,
    results: Vec<ResultRow>,
}

impl Default for SparqlQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl SparqlQuery {
    pub fn new() -> Self {
        Self {
            prefixes: Vec::new(),
            languages: BTreeSet::new(),
            result_variables: Vec::new(),
            endpoints: BTreeSet::new(),
            triples: Vec::new(),
            groups: Vec::new(),
            limit: DEFAULT_LIMIT,
            queries: BTreeMap::new(),
            results: Vec::new(),
        }
    }

    // -- accessors --

    pub fn prefixes(&self) -> &[NamespacePrefix] {
        &self.prefixes
    }

    pub fn result_variables(&self) -> &[String] {
        &self.result_variables
    }

    pub fn endpoints(&self) -> &BTreeSet<Endpoint> {
        &self.endpoints
    }

    pub fn triples(&self) -> &[RdfTriple] {
        &self.triples
    }

    pub fn groups(&self) -> &[Vec<RdfTriple>] {
        &self.groups
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Rendered text per endpoint, filled by [`commit`](Self::commit).
    pub fn queries(&self) -> &BTreeMap<Endpoint, String> {
        &self.queries
    }

    pub fn results(&self) -> &[ResultRow] {
        &self.results
    }

    // -- construction --

    fn absorb_triple_metadata(&mut self, triple: &RdfTriple) {
        for prefix in triple.prefixes() {
            if !self.prefixes.contains(prefix) {
                self.prefixes.push(prefix.clone());
            }
        }
        self.languages.insert(triple.language());
    }

    pub fn add_triple(&mut self, triple: RdfTriple) {
        tracing::debug!(triple = %triple, "adding triple to query");
        self.absorb_triple_metadata(&triple);
        self.triples.push(triple);
    }

    pub fn add_triples(&mut self, triples: impl IntoIterator<Item = RdfTriple>) {
        for triple in triples {
            self.add_triple(triple);
        }
    }

    /// Add triples to be OR'd together with `UNION`. Duplicates are dropped;
    /// an empty group is ignored.
    pub fn add_alternative_group(&mut self, triples: impl IntoIterator<Item = RdfTriple>) {
        let mut group: Vec<RdfTriple> = Vec::new();
        for triple in triples {
            if !group.contains(&triple) {
                group.push(triple);
            }
        }
        if group.is_empty() {
            return;
        }
        for triple in &group {
            tracing::debug!(triple = %triple, "adding alternative triple to query");
            self.absorb_triple_metadata(triple);
        }
        self.groups.push(group);
    }

    /// Add a `"abbr: <uri>"` declaration, registering the namespace if new.
    pub fn add_prefix(&mut self, declaration: &str) -> QueryResult<()> {
        let prefix = NamespaceRegistry::global().declare(declaration)?;
        tracing::debug!(prefix = %prefix, "adding prefix to query");
        self.add_namespace(prefix);
        Ok(())
    }

    pub fn add_prefixes<'a>(&mut self, declarations: impl IntoIterator<Item = &'a str>) -> QueryResult<()> {
        for declaration in declarations {
            self.add_prefix(declaration)?;
        }
        Ok(())
    }

    /// Add a namespace as-is. Unregistered namespaces are rejected by
    /// [`validate`](Self::validate).
    pub fn add_namespace(&mut self, prefix: NamespacePrefix) {
        if !self.prefixes.contains(&prefix) {
            self.prefixes.push(prefix);
        }
    }

    pub fn add_endpoint(&mut self, endpoint: Endpoint) {
        self.endpoints.insert(endpoint);
    }

    pub fn add_endpoints(&mut self, endpoints: impl IntoIterator<Item = Endpoint>) {
        self.endpoints.extend(endpoints);
    }

    /// Set the `LIMIT`. Must be at least 1.
    pub fn set_limit(&mut self, limit: i64) -> QueryResult<()> {
        if limit < 1 {
            return Err(QueryError::InvalidLimit { value: limit });
        }
        self.limit = limit.unsigned_abs();
        tracing::debug!(limit, "setting query limit");
        Ok(())
    }

    pub fn add_result_variable(&mut self, variable: impl Into<String>) {
        let variable = variable.into();
        if !self.result_variables.contains(&variable) {
            self.result_variables.push(variable);
        }
    }

    pub fn add_result_variables<S: Into<String>>(&mut self, variables: impl IntoIterator<Item = S>) {
        for variable in variables {
            self.add_result_variable(variable);
        }
    }

    /// Forget rendered texts.
    pub fn reset_queries(&mut self) {
        self.queries.clear();
    }

    /// Clear everything so the query can be rebuilt from scratch.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    // -- validation and rendering --

    /// Check the query shape before submission.
    ///
    /// Falls back to [`Endpoint::DEFAULT`] when no endpoint was added and
    /// prunes oversized alternative groups.
    pub fn validate(&mut self) -> QueryResult<()> {
        if self.triples.is_empty() && self.groups.is_empty() {
            return Err(QueryError::NoTriples);
        }

        let registry = NamespaceRegistry::global();
        if let Some(unknown) = self.prefixes.iter().find(|p| !registry.contains(p)) {
            return Err(QueryError::UnregisteredPrefix {
                prefix: unknown.name().to_string(),
            });
        }

        if self.endpoints.is_empty() {
            tracing::warn!(
                endpoint = %Endpoint::DEFAULT,
                "no endpoint was set, using the default"
            );
            self.endpoints.insert(Endpoint::DEFAULT);
        }

        for group in &mut self.groups {
            if group.len() > MAX_GROUP_BEFORE_PRUNING {
                let before = group.len();
                group.retain(keeps_locale);
                tracing::debug!(before, after = group.len(), "pruned oversized alternative group");
            }
        }
        self.groups.retain(|g| !g.is_empty());
        Ok(())
    }

    /// Render the query text for one endpoint.
    pub fn render(&self, endpoint: Endpoint) -> String {
        let multilingual = endpoint.is_multilingual();

        let mut body: Vec<String> = self
            .triples
            .iter()
            .filter(|t| t.is_allowed_for(endpoint))
            .map(|t| t.render(multilingual))
            .collect();

        for group in &self.groups {
            let alternatives: Vec<String> = group
                .iter()
                .filter(|t| t.is_allowed_for(endpoint))
                .map(|t| format!("{{ {} }}", t.pattern(multilingual)))
                .collect();
            if !alternatives.is_empty() {
                body.push(format!("{} .", alternatives.join(" UNION ")));
            }
        }

        if endpoint == Endpoint::Wikidata {
            let languages: Vec<&str> = self.languages.iter().map(|l| l.code()).collect();
            body.insert(
                0,
                format!(
                    "SERVICE wikibase:label {{ bd:serviceParam wikibase:language \"[AUTO_LANGUAGE],{}\". }}",
                    languages.join(", ")
                ),
            );
        }

        let variables = if self.result_variables.is_empty() {
            "*".to_string()
        } else {
            self.result_variables.join(" ")
        };

        let mut parts: Vec<String> = self.prefixes.iter().map(NamespacePrefix::to_sparql).collect();
        parts.push(format!(
            "SELECT DISTINCT {variables} WHERE {{ {} }} LIMIT {}",
            body.join(" "),
            self.limit
        ));
        parts.join(" ")
    }

    /// Validate, render and submit to every endpoint in turn.
    ///
    /// Endpoint failures (transport errors, non-200 statuses, unreadable
    /// bodies) are logged, recorded in the report and skipped.
    pub fn commit(&mut self, transport: &dyn SparqlTransport) -> QueryResult<CommitReport> {
        self.validate()?;
        let mut report = CommitReport::default();

        let endpoints: Vec<Endpoint> = self.endpoints.iter().copied().collect();
        for endpoint in endpoints {
            let text = self.render(endpoint);
            self.queries.insert(endpoint, text);
            let text = self
                .queries
                .get(&endpoint)
                .ok_or_else(|| QueryError::NoQueryGenerated {
                    endpoint: endpoint.to_string(),
                })?;

            tracing::debug!(endpoint = %endpoint, query = %text, "sending query");

            let failure = match transport.submit(endpoint, text) {
                Ok(response) if response.is_success() => match parse_rows(&response.body) {
                    Ok(rows) => {
                        tracing::debug!(endpoint = %endpoint, rows = rows.len(), "endpoint answered");
                        report.answered.push((endpoint, rows.len()));
                        self.results.extend(rows);
                        None
                    }
                    Err(e) => Some(format!("malformed results document: {e}")),
                },
                Ok(response) => Some(format!("HTTP status {}", response.status)),
                Err(e) => Some(e.to_string()),
            };

            if let Some(reason) = failure {
                tracing::warn!(endpoint = %endpoint, %reason, "endpoint failed, skipping");
                report.failed.push(EndpointFailure { endpoint, reason });
            }
        }
        Ok(report)
    }
}

/// Whether a member of an oversized group survives pruning: every
/// DBpedia-localized IRI it mentions, as subject or object, is in the
/// triple's own language.
fn keeps_locale(triple: &RdfTriple) -> bool {
    let language = triple.language().code();
    [triple.subject(), triple.object()].into_iter().all(|term| {
        match RE_LOCALIZED_DBPEDIA.captures(term.as_str()) {
            Some(caps) => {
                let locale = caps
                    .name("host")
                    .or_else(|| caps.name("pfx"))
                    .map(|m| m.as_str());
                locale == Some(language)
            }
            None => true,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::query::literal;
    use crate::transport::TransportResponse;

    fn sorted_tokens(text: &str) -> Vec<String> {
        let mut tokens: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        tokens.sort();
        tokens
    }

    struct Canned(Vec<(Endpoint, TransportResponse)>);

    impl SparqlTransport for Canned {
        fn submit(&self, endpoint: Endpoint, _query: &str) -> crate::error::TransportResult<TransportResponse> {
            self.0
                .iter()
                .find(|(e, _)| *e == endpoint)
                .map(|(_, r)| r.clone())
                .ok_or_else(|| TransportError::Request {
                    endpoint: endpoint.to_string(),
                    message: "connection refused".into(),
                })
        }
    }

    fn triple(s: &str, p: &str, o: &str) -> RdfTriple {
        RdfTriple::new(s, p, o).unwrap()
    }

    #[test]
    fn empty_query_is_rejected() {
        let mut q = SparqlQuery::new();
        assert!(matches!(q.validate(), Err(QueryError::NoTriples)));
    }

    #[test]
    fn limit_must_be_positive() {
        let mut q = SparqlQuery::new();
        assert_eq!(q.limit(), DEFAULT_LIMIT);
        assert!(matches!(q.set_limit(0), Err(QueryError::InvalidLimit { value: 0 })));
        assert!(q.set_limit(-4).is_err());
        q.set_limit(1).unwrap();
        assert_eq!(q.limit(), 1);
    }

    #[test]
    fn missing_endpoint_falls_back_to_default() {
        let mut q = SparqlQuery::new();
        q.add_triple(triple("?s", "?p", "?o"));
        q.validate().unwrap();
        assert_eq!(q.endpoints().iter().copied().collect::<Vec<_>>(), vec![Endpoint::DEFAULT]);
    }

    #[test]
    fn unregistered_prefix_is_rejected() {
        let mut q = SparqlQuery::new();
        q.add_triple(triple("?s", "?p", "?o"));
        q.add_namespace(NamespacePrefix::new(
            "ghost".into(),
            "http://ghost.example.org/".into(),
        ));
        assert!(matches!(
            q.validate(),
            Err(QueryError::UnregisteredPrefix { .. })
        ));
    }

    #[test]
    fn beauvoir_query_renders_expected_text() {
        let mut q = SparqlQuery::new();
        q.add_triple(
            RdfTriple::builder()
                .subject("?person")
                .predicate("rdfs:label")
                .object(literal("Simone de Beauvoir"))
                .language(Language::French)
                .build()
                .unwrap(),
        );
        q.add_triple(
            RdfTriple::builder()
                .subject("?person")
                .predicate("dbpedia_owl:birthDate")
                .object("?birthdate")
                .language(Language::French)
                .build()
                .unwrap(),
        );
        q.add_triple(
            RdfTriple::builder()
                .subject("?person")
                .predicate("foaf:gender")
                .object("?gender")
                .language(Language::French)
                .build()
                .unwrap(),
        );
        q.set_limit(3).unwrap();

        let expected = "PREFIX foaf: <http://xmlns.com/foaf/0.1/> \
            PREFIX dbo: <http://dbpedia.org/ontology/> \
            PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#> \
            SELECT DISTINCT * WHERE { \
            ?person rdfs:label \"Simone de Beauvoir\"@fr . \
            ?person dbo:birthDate ?birthdate . \
            ?person foaf:gender ?gender . } LIMIT 3";
        assert_eq!(sorted_tokens(&q.render(Endpoint::Dbpedia)), sorted_tokens(expected));
    }

    #[test]
    fn groups_render_as_unions_and_respect_exclusions() {
        let mut q = SparqlQuery::new();
        q.add_alternative_group([
            RdfTriple::builder()
                .subject("?Person")
                .predicate("wdt:P31")
                .object("wd:Q5")
                .keep_only([Endpoint::Wikidata])
                .build()
                .unwrap(),
            RdfTriple::builder()
                .subject("?Person")
                .predicate("a")
                .object("foaf:Person")
                .exclude(Endpoint::Wikidata)
                .build()
                .unwrap(),
        ]);
        q.add_triple(triple("?Person", "?pred", "?obj"));

        let bnf = q.render(Endpoint::Bnf);
        assert!(bnf.contains("{ ?Person a foaf:Person } ."));
        assert!(!bnf.contains("wdt:P31"));
        assert!(!bnf.contains("SERVICE"));

        let wikidata = q.render(Endpoint::Wikidata);
        assert!(wikidata.contains("{ ?Person wdt:P31 wd:Q5 } ."));
        assert!(!wikidata.contains("foaf:Person"));
        assert!(wikidata.contains(
            "SERVICE wikibase:label { bd:serviceParam wikibase:language \"[AUTO_LANGUAGE],en\". }"
        ));
    }

    #[test]
    fn group_emptied_for_endpoint_is_dropped() {
        let mut q = SparqlQuery::new();
        q.add_alternative_group([RdfTriple::builder()
            .subject("?x")
            .predicate("wdt:P31")
            .object("wd:Q5")
            .keep_only([Endpoint::Wikidata])
            .build()
            .unwrap()]);
        q.add_triple(triple("?x", "?p", "?o"));
        let text = q.render(Endpoint::Bnf);
        assert!(!text.contains("UNION"));
        assert!(!text.contains("{  }"));
        assert!(text.contains("?x ?p ?o ."));
    }

    #[test]
    fn literals_tagged_only_for_multilingual_endpoints() {
        let mut q = SparqlQuery::new();
        q.add_triple(triple("?x", "rdfs:label", "\"Duras\""));
        assert!(q.render(Endpoint::DbpediaFr).contains("\"Duras\"@en"));
        assert!(q.render(Endpoint::Bnf).contains("\"Duras\" ."));
    }

    #[test]
    fn oversized_group_is_pruned_to_query_locale() {
        let mut q = SparqlQuery::new();
        let mut group = Vec::new();
        for (i, lang) in ["fr", "de", "es", "it", "ja", "nl", "pl", "pt", "ru", "ko", "cs"]
            .iter()
            .enumerate()
        {
            group.push(
                RdfTriple::builder()
                    .subject("?w")
                    .predicate("dbo:author")
                    .object(format!("<http://{lang}.dbpedia.org/resource/Author_{i}>"))
                    .language(Language::French)
                    .build()
                    .unwrap(),
            );
        }
        group.push(
            RdfTriple::builder()
                .subject("?w")
                .predicate("dbo:author")
                .object("wd:Q42")
                .language(Language::French)
                .build()
                .unwrap(),
        );
        q.add_alternative_group(group);
        q.add_endpoint(Endpoint::DbpediaFr);
        q.validate().unwrap();

        let kept: Vec<&str> = q.groups()[0].iter().map(|t| t.object().as_str()).collect();
        assert_eq!(kept.len(), 2);
        assert!(kept.contains(&"wd:Q42"));
        assert!(kept.iter().any(|o| o.starts_with("dbpedia_fr:")));
    }

    #[test]
    fn small_groups_are_not_pruned() {
        let mut q = SparqlQuery::new();
        q.add_alternative_group([
            triple("?w", "dbo:author", "<http://de.dbpedia.org/resource/A>"),
            triple("?w", "dbo:author", "<http://fr.dbpedia.org/resource/A>"),
        ]);
        q.validate().unwrap();
        assert_eq!(q.groups()[0].len(), 2);
    }

    #[test]
    fn commit_normalizes_bindings_and_tolerates_failures() {
        let body = r#"{
            "head": {"vars": ["pred", "obj"]},
            "results": {"bindings": [
                {"pred": {"type": "uri", "value": "http://www.wikidata.org/prop/direct/P569"},
                 "obj": {"type": "literal", "value": "1914-04-04"}},
                {"pred": {"type": "uri", "value": "http://www.w3.org/2000/01/rdf-schema#label"},
                 "obj": {"type": "literal", "xml:lang": "fr", "value": "  Marguerite   Duras "}}
            ]}
        }"#;
        let transport = Canned(vec![
            (Endpoint::Wikidata, TransportResponse::ok(body)),
            (
                Endpoint::Bnf,
                TransportResponse {
                    status: 503,
                    body: String::new(),
                },
            ),
            (Endpoint::DbpediaFr, TransportResponse::ok("not json")),
        ]);

        let mut q = SparqlQuery::new();
        q.add_triple(triple("<http://www.wikidata.org/entity/Q72653>", "?pred", "?obj"));
        q.add_endpoints([Endpoint::Wikidata, Endpoint::Bnf, Endpoint::DbpediaFr, Endpoint::Dbpedia]);
        let report = q.commit(&transport).unwrap();

        assert_eq!(report.answered, vec![(Endpoint::Wikidata, 2)]);
        assert_eq!(report.failed.len(), 3);
        assert!(report.is_partial());
        assert_eq!(q.queries().len(), 4);

        let rows = q.results();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            vec![
                ("obj".to_string(), "1914-04-04".to_string()),
                ("pred".to_string(), "wdt:date_of_birth".to_string()),
            ]
        );
        assert_eq!(rows[1][0].1, "Marguerite Duras _(@fr)");
        assert_eq!(rows[1][1].1, "rdfs:label");
    }

    #[test]
    fn reset_clears_everything() {
        let mut q = SparqlQuery::new();
        q.add_triple(triple("?s", "?p", "?o"));
        q.set_limit(5).unwrap();
        q.add_result_variable("?s");
        q.reset();
        assert!(q.triples().is_empty());
        assert!(q.result_variables().is_empty());
        assert_eq!(q.limit(), DEFAULT_LIMIT);
    }
}
