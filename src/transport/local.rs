//! In-process endpoints backed by oxigraph.
//!
//! Each [`Endpoint`] can be given its own in-memory store loaded from
//! Turtle. Queries are evaluated locally and answered with a SPARQL JSON
//! results document, as the public service would.

use std::collections::HashMap;
use std::sync::LazyLock;

use oxigraph::io::RdfFormat;
use oxigraph::model::Term;
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;
use regex::Regex;
use serde_json::{Map, Value, json};

use super::{SparqlTransport, TransportResponse};
use crate::endpoint::Endpoint;
use crate::error::{TransportError, TransportResult};

/// The Wikidata label service is a WDQS extension with no local equivalent.
static RE_LABEL_SERVICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"SERVICE\s+wikibase:label\s*\{[^}]*\}\s*").unwrap());

const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

/// A set of oxigraph stores standing in for remote endpoints.
#[derive(Default)]
pub struct LocalEndpoint {
    stores: HashMap<Endpoint, Store>,
}

impl LocalEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load Turtle data into the store answering for `endpoint`.
    pub fn load_turtle(&mut self, endpoint: Endpoint, turtle: &str) -> TransportResult<()> {
        if !self.stores.contains_key(&endpoint) {
            let store = Store::new().map_err(|e| TransportError::LocalStore {
                message: format!("failed to create oxigraph store: {e}"),
            })?;
            self.stores.insert(endpoint, store);
        }
        let store = self
            .stores
            .get(&endpoint)
            .ok_or_else(|| TransportError::NoLocalStore {
                endpoint: endpoint.to_string(),
            })?;
        store
            .load_from_reader(RdfFormat::Turtle, turtle.as_bytes())
            .map_err(|e| TransportError::LocalStore {
                message: format!("failed to load Turtle for {endpoint}: {e}"),
            })?;
        tracing::debug!(endpoint = %endpoint, quads = store.len().unwrap_or(0), "local store loaded");
        Ok(())
    }

    /// Endpoints with a store attached.
    pub fn endpoints(&self) -> Vec<Endpoint> {
        let mut endpoints: Vec<Endpoint> = self.stores.keys().copied().collect();
        endpoints.sort();
        endpoints
    }

    fn evaluate(store: &Store, query: &str) -> Result<String, String> {
        let query = RE_LABEL_SERVICE.replace_all(query, "");
        let results = store.query(&*query).map_err(|e| e.to_string())?;

        let QueryResults::Solutions(solutions) = results else {
            return Err("only SELECT queries are supported".into());
        };

        let vars: Vec<Value> = solutions
            .variables()
            .iter()
            .map(|v| Value::String(v.as_str().to_string()))
            .collect();

        let mut bindings = Vec::new();
        for solution in solutions {
            let solution = solution.map_err(|e| e.to_string())?;
            let mut row = Map::new();
            for (var, term) in solution.iter() {
                row.insert(var.as_str().to_string(), term_to_json(term));
            }
            bindings.push(Value::Object(row));
        }

        let document = json!({
            "head": { "vars": vars },
            "results": { "bindings": bindings },
        });
        Ok(document.to_string())
    }
}

fn term_to_json(term: &Term) -> Value {
    match term {
        Term::NamedNode(node) => json!({ "type": "uri", "value": node.as_str() }),
        Term::BlankNode(node) => json!({ "type": "bnode", "value": node.as_str() }),
        Term::Literal(literal) => {
            let mut value = Map::new();
            value.insert("type".into(), json!("literal"));
            value.insert("value".into(), json!(literal.value()));
            if let Some(lang) = literal.language() {
                value.insert("xml:lang".into(), json!(lang));
            } else {
                let datatype = literal.datatype().as_str();
                if datatype != XSD_STRING && datatype != RDF_LANG_STRING {
                    value.insert("datatype".into(), json!(datatype));
                }
            }
            Value::Object(value)
        }
        #[allow(unreachable_patterns)]
        other => json!({ "type": "literal", "value": other.to_string() }),
    }
}

impl SparqlTransport for LocalEndpoint {
    fn submit(&self, endpoint: Endpoint, query: &str) -> TransportResult<TransportResponse> {
        let store = self
            .stores
            .get(&endpoint)
            .ok_or_else(|| TransportError::NoLocalStore {
                endpoint: endpoint.to_string(),
            })?;
        match Self::evaluate(store, query) {
            Ok(body) => Ok(TransportResponse::ok(body)),
            Err(message) => {
                tracing::debug!(endpoint = %endpoint, "local query rejected: {message}");
                Ok(TransportResponse {
                    status: 400,
                    body: message,
                })
            }
        }
    }
}

impl std::fmt::Debug for LocalEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalEndpoint")
            .field("endpoints", &self.endpoints())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TURTLE: &str = r#"
        @prefix foaf: <http://xmlns.com/foaf/0.1/> .
        @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
        <http://example.org/ada> a foaf:Person ;
            rdfs:label "Ada Lovelace"@en ;
            foaf:birthYear 1815 .
    "#;

    fn endpoint() -> LocalEndpoint {
        let mut local = LocalEndpoint::new();
        local.load_turtle(Endpoint::Dbpedia, TURTLE).unwrap();
        local
    }

    #[test]
    fn answers_with_sparql_json() {
        let local = endpoint();
        let resp = local
            .submit(
                Endpoint::Dbpedia,
                "PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#> \
                 SELECT ?s ?l WHERE { ?s rdfs:label ?l . }",
            )
            .unwrap();
        assert!(resp.is_success());
        let doc: Value = serde_json::from_str(&resp.body).unwrap();
        let bindings = doc["results"]["bindings"].as_array().unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0]["s"]["value"], "http://example.org/ada");
        assert_eq!(bindings[0]["l"]["xml:lang"], "en");
    }

    #[test]
    fn typed_literals_carry_their_datatype() {
        let local = endpoint();
        let resp = local
            .submit(Endpoint::Dbpedia, "SELECT ?o WHERE { ?s <http://xmlns.com/foaf/0.1/birthYear> ?o }")
            .unwrap();
        let doc: Value = serde_json::from_str(&resp.body).unwrap();
        let o = &doc["results"]["bindings"][0]["o"];
        assert_eq!(o["value"], "1815");
        assert!(o["datatype"].as_str().unwrap().ends_with("#integer"));
    }

    #[test]
    fn label_service_clause_is_ignored() {
        let local = endpoint();
        let resp = local
            .submit(
                Endpoint::Dbpedia,
                "SELECT * WHERE { SERVICE wikibase:label { bd:serviceParam wikibase:language \"[AUTO_LANGUAGE],en\". } ?s a ?t . }",
            )
            .unwrap();
        assert!(resp.is_success(), "{}", resp.body);
    }

    #[test]
    fn malformed_query_is_a_400() {
        let local = endpoint();
        let resp = local.submit(Endpoint::Dbpedia, "SELECT WHERE {").unwrap();
        assert_eq!(resp.status, 400);
    }

    #[test]
    fn missing_store_is_an_error() {
        let local = endpoint();
        let err = local.submit(Endpoint::Bnf, "SELECT * WHERE { ?s ?p ?o }").unwrap_err();
        assert!(matches!(err, TransportError::NoLocalStore { .. }));
    }
}
