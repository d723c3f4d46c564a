//! Query building and result reconciliation for one query cycle.

use std::collections::{BTreeMap, BTreeSet};

use super::{
    AttributeSlot, Attributes, Entity, IDENTITY_PREDICATES, QueryOptions, QueryPhase, SlotValue,
    absorb_attributes, insert_value,
};
use crate::endpoint::Endpoint;
use crate::error::{EntityResult, NamespaceResult};
use crate::query::{
    CommitReport, RdfElement, RdfTriple, SparqlQuery, normalize_text, split_language_suffix,
};
use crate::transport::SparqlTransport;
use crate::vocab::{Vocabulary, normalize_term};

const PREDICATE_VAR: &str = "?pred";
const OBJECT_VAR: &str = "?obj";

/// The Wikimedia disambiguation page class, which is never a match.
const WIKIMEDIA_DISAMBIGUATION: &str = "wd:Q12949604";

/// Whether a candidate subject is accepted without evidence.
///
/// Wikidata nests types and labels too deeply to be checked cheaply from
/// the flat rows, so every `wd:` item is accepted except the disambiguation
/// page class.
pub fn is_knowledge_base_auto_validated(id: &str) -> bool {
    id.contains("wd:") && id != WIKIMEDIA_DISAMBIGUATION
}

fn binding<'a>(row: &'a [(String, String)], variable: &str) -> Option<&'a str> {
    let name = variable.trim_start_matches('?');
    row.iter()
        .find(|(var, _)| var == name)
        .map(|(_, value)| value.as_str())
}

/// Whether a returned object matches a supplied constraint value.
fn value_matches(value: &SlotValue, object: &str) -> bool {
    let (text, _) = split_language_suffix(object);
    let wanted = value.as_str();
    normalize_text(text) == normalize_text(wanted) || normalize_term(text) == normalize_term(wanted)
}

/// Bracket a bare URL so its namespace can be shortened.
pub(super) fn anchor(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        format!("<{url}>")
    } else {
        url.to_string()
    }
}

impl Entity {
    fn subject_variable(&self) -> String {
        format!("?{}", self.class.name())
    }

    fn triple(
        &self,
        subject: &str,
        predicate: &str,
        object: impl Into<RdfElement>,
    ) -> NamespaceResult<RdfTriple> {
        RdfTriple::builder()
            .subject(subject)
            .predicate(predicate)
            .object(object)
            .language(self.language)
            .build()
    }

    /// Whether `slot` was queried through its known predicates.
    fn is_strict_slot(slot: &AttributeSlot, options: QueryOptions) -> bool {
        options.strict_mode && slot.values.len() == 1 && !slot.predicates.is_empty()
    }

    /// Assemble a fresh query for this cycle.
    pub(super) fn build_query(&mut self, options: QueryOptions) -> EntityResult<()> {
        let mut query = SparqlQuery::new();
        query.add_endpoints(self.endpoints.iter().copied());
        query.set_limit(self.limit)?;

        if !self.urls.is_empty() {
            let anchors = self
                .urls
                .iter()
                .map(|url| self.triple(&anchor(url), PREDICATE_VAR, OBJECT_VAR))
                .collect::<NamespaceResult<Vec<_>>>()?;
            if anchors.len() == 1 {
                query.add_triples(anchors);
            } else {
                query.add_alternative_group(anchors);
            }
            query.add_result_variables([PREDICATE_VAR, OBJECT_VAR]);
        } else {
            let subject = self.subject_variable();

            if options.check_type {
                let mut types = Vec::new();
                for rdf_type in Vocabulary::bundled().rdf_types_for(self.class) {
                    let builder = RdfTriple::builder()
                        .subject(subject.as_str())
                        .object(rdf_type.as_str())
                        .language(self.language);
                    // Wikidata answers `a` poorly; it gets instance-of instead.
                    let builder = if rdf_type.starts_with("wd:") {
                        builder.predicate("wdt:P31").keep_only([Endpoint::Wikidata])
                    } else {
                        builder.predicate("a").exclude(Endpoint::Wikidata)
                    };
                    types.push(builder.build()?);
                }
                query.add_alternative_group(types);
            }

            for slot in &self.slots {
                if slot.values.len() > 1 {
                    let alternatives = slot
                        .values
                        .iter()
                        .map(|v| self.triple(&subject, &slot.variable(), v.to_element()))
                        .collect::<NamespaceResult<Vec<_>>>()?;
                    query.add_alternative_group(alternatives);
                } else if let Some(value) = slot.values.first() {
                    if Self::is_strict_slot(slot, options) {
                        let alternatives = slot
                            .predicates
                            .iter()
                            .map(|p| self.triple(&subject, &anchor(p), value.to_element()))
                            .collect::<NamespaceResult<Vec<_>>>()?;
                        query.add_alternative_group(alternatives);
                    } else {
                        query.add_triple(self.triple(&subject, &slot.variable(), value.to_element())?);
                    }
                }
            }

            query.add_triple(self.triple(&subject, PREDICATE_VAR, OBJECT_VAR)?);
            query.add_result_variables([subject.as_str(), PREDICATE_VAR, OBJECT_VAR]);
        }

        self.query = query;
        self.phase = QueryPhase::Built;
        Ok(())
    }

    /// Build, commit and reconcile one query cycle.
    ///
    /// Endpoint failures do not fail the cycle; they are listed in the
    /// returned report.
    pub fn query(
        &mut self,
        transport: &dyn SparqlTransport,
        options: QueryOptions,
    ) -> EntityResult<&CommitReport> {
        self.build_query(options)?;
        let report = self.query.commit(transport)?;
        self.phase = QueryPhase::Submitted;
        self.resolve(options);
        self.phase = QueryPhase::Resolved;
        Ok(self.report.insert(report))
    }

    /// Build and validate without submitting, returning the text each
    /// endpoint would receive.
    pub fn rendered_queries(&mut self, options: QueryOptions) -> EntityResult<BTreeMap<Endpoint, String>> {
        self.build_query(options)?;
        self.query.validate()?;
        Ok(self
            .query
            .endpoints()
            .iter()
            .map(|e| (*e, self.query.render(*e)))
            .collect())
    }

    fn resolve(&mut self, options: QueryOptions) {
        let anchored = !self.urls.is_empty();
        let subject_var = self.subject_variable();

        let mut candidates: BTreeMap<String, Attributes> = BTreeMap::new();
        for row in self.query.results() {
            let (Some(predicate), Some(object)) =
                (binding(row, PREDICATE_VAR), binding(row, OBJECT_VAR))
            else {
                continue;
            };
            let subject = if anchored {
                String::new()
            } else {
                match binding(row, &subject_var) {
                    Some(subject) => subject.to_string(),
                    None => continue,
                }
            };
            insert_value(candidates.entry(subject).or_default(), predicate, object);
        }

        if anchored {
            // Identity is given, so every row describes the entity.
            let facts = candidates.remove("").unwrap_or_default();
            let ids = self.queried_anchors();
            if !facts.is_empty() {
                for id in &ids {
                    self.accept(id, &facts);
                }
            }
            tracing::debug!(anchors = ids.len(), facts = facts.len(), "resolved URL-anchored entity");
            return;
        }

        let types = Vocabulary::bundled().normalized_rdf_types_for(self.class);
        let mut accepted = 0usize;
        let total = candidates.len();
        for (subject, facts) in &candidates {
            let validated = is_knowledge_base_auto_validated(subject)
                || (self.matches_constraints(facts, options)
                    && (!options.check_type || has_type_evidence(facts, &types)));
            if validated {
                self.accept(subject, facts);
                accepted += 1;
            } else {
                tracing::debug!(subject = %subject, "discarding candidate that does not match the constraints");
            }
        }
        tracing::info!(
            class = %self.class,
            candidates = total,
            accepted,
            "resolved entity"
        );
    }

    /// Identities of the URLs whose triple survived validation. Pruned
    /// anchors were never asked about, so they are not recorded.
    fn queried_anchors(&self) -> Vec<String> {
        let subjects: BTreeSet<String> = self
            .query
            .triples()
            .iter()
            .chain(self.query.groups().iter().flatten())
            .map(|t| normalize_term(t.subject().as_str()))
            .collect();
        self.urls
            .iter()
            .map(|u| normalize_term(u))
            .filter(|id| subjects.contains(id))
            .collect()
    }

    /// Some returned fact matches some supplied constraint value. Vacuously
    /// true for an entity without constraint slots.
    fn matches_constraints(&self, facts: &Attributes, options: QueryOptions) -> bool {
        if self.slots.is_empty() {
            return true;
        }
        self.slots.iter().any(|slot| {
            let known: Vec<String> = if Self::is_strict_slot(slot, options) {
                slot.predicates.iter().map(|p| normalize_term(p)).collect()
            } else {
                Vec::new()
            };
            facts.iter().any(|(predicate, objects)| {
                let predicate_ok = known.is_empty() || known.contains(&normalize_term(predicate));
                predicate_ok
                    && slot
                        .values
                        .iter()
                        .any(|v| objects.values().into_iter().any(|o| value_matches(v, o)))
            })
        })
    }

    fn accept(&mut self, subject: &str, facts: &Attributes) {
        for predicate in IDENTITY_PREDICATES {
            insert_value(&mut self.attributes, predicate, subject);
        }
        absorb_attributes(&mut self.attributes, facts);
        self.visited.insert(subject.to_string());
    }
}

fn has_type_evidence(facts: &Attributes, types: &[String]) -> bool {
    facts
        .values()
        .flat_map(|v| v.values())
        .any(|o| types.iter().any(|t| *t == normalize_term(o)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportResult;
    use crate::lang::Language;
    use crate::transport::TransportResponse;
    use crate::entity::AttrValue;
    use crate::vocab::EntityClass;

    /// Answers every endpoint with the same SPARQL JSON document.
    struct Fixed(String);

    impl SparqlTransport for Fixed {
        fn submit(&self, _endpoint: Endpoint, _query: &str) -> TransportResult<TransportResponse> {
            Ok(TransportResponse::ok(self.0.clone()))
        }
    }

    fn rows(subject_var: &str, rows: &[(&str, &str, &str)]) -> Fixed {
        let bindings: Vec<serde_json::Value> = rows
            .iter()
            .map(|(s, p, o)| {
                let object = if o.starts_with("http") {
                    serde_json::json!({"type": "uri", "value": o})
                } else {
                    serde_json::json!({"type": "literal", "value": o})
                };
                let mut row = serde_json::Map::new();
                row.insert(subject_var.to_string(), serde_json::json!({"type": "uri", "value": s}));
                row.insert("pred".into(), serde_json::json!({"type": "uri", "value": p}));
                row.insert("obj".into(), object);
                serde_json::Value::Object(row)
            })
            .collect();
        Fixed(serde_json::json!({"head": {"vars": []}, "results": {"bindings": bindings}}).to_string())
    }

    const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
    const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    const FOAF_PERSON: &str = "http://xmlns.com/foaf/0.1/Person";

    fn person(name: &str) -> Entity {
        let mut e = Entity::new(EntityClass::Person, Language::French);
        e.set_attribute("full_name", name);
        e.add_query_endpoint(Endpoint::DbpediaFr);
        e
    }

    #[test]
    fn knowledge_base_policy() {
        assert!(is_knowledge_base_auto_validated("wd:Q72653"));
        assert!(!is_knowledge_base_auto_validated("wd:Q12949604"));
        assert!(!is_knowledge_base_auto_validated("dbpedia_fr:Marguerite_Duras"));
    }

    #[test]
    fn strict_query_uses_known_predicates() {
        let mut e = person("Marguerite Duras");
        let texts = e.rendered_queries(QueryOptions::STRICT).unwrap();
        let text = &texts[&Endpoint::DbpediaFr];
        assert!(text.contains("{ ?Person foaf:name \"Marguerite Duras\"@fr }"));
        assert!(text.contains("UNION"));
        assert!(text.contains("{ ?Person a foaf:Person }"));
        assert!(!text.contains("wdt:P31"));
        assert!(text.contains("?Person ?pred ?obj ."));
        assert!(text.contains("SELECT DISTINCT ?Person ?pred ?obj WHERE"));
    }

    #[test]
    fn loose_query_uses_variable_predicate_and_no_types() {
        let mut e = person("Marguerite Duras");
        let texts = e.rendered_queries(QueryOptions::LOOSE).unwrap();
        let text = &texts[&Endpoint::DbpediaFr];
        assert!(text.contains("?Person ?has_full_name \"Marguerite Duras\"@fr ."));
        assert!(!text.contains("UNION"));
    }

    #[test]
    fn multi_valued_slot_bypasses_strict_mode() {
        let mut e = Entity::new(EntityClass::Book, Language::French);
        e.set_attribute("title", "L'Amant");
        e.set_slot(
            "author",
            vec![
                SlotValue::Resource("wd:Q72653".into()),
                SlotValue::Resource("dbpedia_fr:Marguerite_Duras".into()),
            ],
        );
        let text = e.rendered_queries(QueryOptions::STRICT).unwrap()[&Endpoint::Dbpedia].clone();
        assert!(text.contains("{ ?Book ?has_author wd:Q72653 } UNION { ?Book ?has_author dbpedia_fr:Marguerite_Duras }"));
    }

    #[test]
    fn integer_values_are_not_quoted() {
        let mut e = Entity::new(EntityClass::Person, Language::English);
        e.set_attribute("last_name", "Duras");
        e.set_attribute("birth_year", "1914");
        let text = e.rendered_queries(QueryOptions::LOOSE).unwrap()[&Endpoint::Dbpedia].clone();
        assert!(text.contains("?Person ?has_birth_year 1914 ."));
    }

    #[test]
    fn url_anchored_query_selects_predicate_and_object() {
        let mut e = Entity::new(EntityClass::Thing, Language::English);
        e.set_urls(["http://fr.dbpedia.org/resource/Marguerite_Duras"]);
        let text = e.rendered_queries(QueryOptions::STRICT).unwrap()[&Endpoint::Dbpedia].clone();
        assert!(text.contains("SELECT DISTINCT ?pred ?obj WHERE { dbpedia_fr:Marguerite_Duras ?pred ?obj . }"));
    }

    #[test]
    fn matching_subject_is_kept_and_others_discarded() {
        let transport = rows(
            "Person",
            &[
                ("http://fr.dbpedia.org/resource/Marguerite_Duras", RDFS_LABEL, "Marguerite Duras"),
                ("http://fr.dbpedia.org/resource/Marguerite_Duras", "http://xmlns.com/foaf/0.1/gender", "female"),
                ("http://fr.dbpedia.org/resource/Homonym", "http://xmlns.com/foaf/0.1/gender", "male"),
            ],
        );
        let mut e = person("Marguerite Duras");
        e.query(&transport, QueryOptions::LOOSE).unwrap();
        assert_eq!(e.phase(), QueryPhase::Resolved);
        assert_eq!(e.get("foaf:gender").unwrap(), &AttrValue::from("female"));
        assert!(e.get("owl:sameAs").unwrap().contains("dbpedia_fr:Marguerite_Duras"));
        assert!(!e.get("owl:sameAs").unwrap().contains("dbpedia_fr:Homonym"));
    }

    #[test]
    fn strict_validation_requires_a_known_predicate() {
        let transport = rows(
            "Person",
            &[("http://fr.dbpedia.org/resource/Someone", "http://example.org/nickname", "Marguerite Duras")],
        );
        let mut e = person("Marguerite Duras");
        e.query(&transport, QueryOptions { strict_mode: true, check_type: false }).unwrap();
        assert!(e.attributes().is_empty());

        let mut loose = person("Marguerite Duras");
        loose.query(&transport, QueryOptions::LOOSE).unwrap();
        assert!(!loose.attributes().is_empty());
    }

    #[test]
    fn check_type_requires_type_evidence_except_for_wikidata() {
        let transport = rows(
            "Person",
            &[
                ("http://fr.dbpedia.org/resource/Untyped", RDFS_LABEL, "Marguerite Duras"),
                ("http://fr.dbpedia.org/resource/Typed", RDFS_LABEL, "Marguerite Duras"),
                ("http://fr.dbpedia.org/resource/Typed", RDF_TYPE, FOAF_PERSON),
                ("http://www.wikidata.org/entity/Q72653", RDFS_LABEL, "whatever"),
                ("http://www.wikidata.org/entity/Q12949604", RDFS_LABEL, "Marguerite Duras"),
            ],
        );
        let mut e = person("Marguerite Duras");
        e.query(&transport, QueryOptions { strict_mode: false, check_type: true }).unwrap();
        let ids = e.uris();
        assert!(ids.contains("dbpedia_fr:Typed"));
        assert!(ids.contains("wd:Q72653"));
        assert!(!ids.contains("dbpedia_fr:Untyped"));
        assert!(!ids.contains("wd:Q12949604"));
    }

    #[test]
    fn language_suffix_is_ignored_when_matching_values() {
        let body = serde_json::json!({"results": {"bindings": [{
            "Person": {"type": "uri", "value": "http://fr.dbpedia.org/resource/Marguerite_Duras"},
            "pred": {"type": "uri", "value": RDFS_LABEL},
            "obj": {"type": "literal", "xml:lang": "fr", "value": "Marguerite Duras"},
        }]}});
        let mut e = person("Marguerite Duras");
        e.query(&Fixed(body.to_string()), QueryOptions::LOOSE).unwrap();
        assert_eq!(e.get("rdfs:label").unwrap(), &AttrValue::from("Marguerite Duras _(@fr)"));
    }

    #[test]
    fn url_anchored_rows_are_validated_unconditionally() {
        let body = serde_json::json!({"results": {"bindings": [{
            "pred": {"type": "uri", "value": "http://xmlns.com/foaf/0.1/gender"},
            "obj": {"type": "literal", "value": "female"},
        }]}});
        let mut e = Entity::new(EntityClass::Person, Language::French);
        e.set_urls(["http://fr.dbpedia.org/resource/Marguerite_Duras"]);
        e.query(&Fixed(body.to_string()), QueryOptions::STRICT).unwrap();
        assert_eq!(e.get("foaf:gender").unwrap(), &AttrValue::from("female"));
        assert!(e.uris().contains("dbpedia_fr:Marguerite_Duras"));
    }
}
