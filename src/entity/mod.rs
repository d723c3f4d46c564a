//! Entity resolution: from partial attributes to one merged record.
//!
//! An [`Entity`] carries the caller's constraints as attribute slots. A
//! [`query`](Entity::query) cycle builds one [`SparqlQuery`] from them,
//! commits it to every endpoint, then groups the returned rows by subject,
//! keeps the subjects that match the constraints and folds their facts into
//! [`Entity::attributes`]. [`find_more_about`](Entity::find_more_about)
//! extends the record by following identity links.

mod attributes;
mod deepen;
mod resolve;

use std::collections::{BTreeMap, BTreeSet};

pub use attributes::{
    AttrValue, Attributes, absorb_attributes, insert_value, merge_attributes,
};
pub use deepen::{DEFAULT_MAX_IDENTITY_DEPTH, DEFAULT_MAX_IDENTITY_LOOKUPS, TraversalLimits};
pub use resolve::is_knowledge_base_auto_validated;

use crate::endpoint::Endpoint;
use crate::error::{EntityResult, QueryError};
use crate::lang::Language;
use crate::query::{CommitReport, DEFAULT_LIMIT, RdfElement, SparqlQuery, literal};
use crate::vocab::{EntityClass, Vocabulary};

/// Predicates whose values name other representations of the same entity.
pub const IDENTITY_PREDICATES: [&str; 2] = ["owl:sameAs", "skos:exactMatch"];

/// One constraint value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotValue {
    /// Free text: sent as an integer when it parses as one, as an IRI when
    /// it is an http(s) URL, otherwise as a string literal.
    Text(String),
    /// A resource token (`prefix:local` or IRI) sent as a resource.
    Resource(String),
}

impl SlotValue {
    pub fn as_str(&self) -> &str {
        match self {
            SlotValue::Text(v) | SlotValue::Resource(v) => v,
        }
    }

    /// Triple object for this value.
    pub fn to_element(&self) -> RdfElement {
        match self {
            SlotValue::Resource(token) => RdfElement::Text(resolve::anchor(token)),
            SlotValue::Text(text) => {
                let trimmed = text.trim();
                if let Ok(n) = trimmed.parse::<i64>() {
                    RdfElement::Integer(n)
                } else if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
                    RdfElement::Text(resolve::anchor(trimmed))
                } else {
                    RdfElement::Text(literal(trimmed))
                }
            }
        }
    }
}

/// A declared `has_<name>` constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSlot {
    name: String,
    values: Vec<SlotValue>,
    predicates: Vec<String>,
}

impl AttributeSlot {
    /// Vocabulary attribute name, e.g. `full_name`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[SlotValue] {
        &self.values
    }

    /// Known predicates for this attribute in the entity's class.
    pub fn predicates(&self) -> &[String] {
        &self.predicates
    }

    /// Query variable standing for the unknown predicate.
    pub fn variable(&self) -> String {
        format!("?has_{}", self.name)
    }
}

/// Switches for one query cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Restrict single-valued constraints to known vocabulary predicates.
    pub strict_mode: bool,
    /// Require type evidence for candidate subjects.
    pub check_type: bool,
}

impl QueryOptions {
    pub const STRICT: QueryOptions = QueryOptions {
        strict_mode: true,
        check_type: true,
    };
    pub const LOOSE: QueryOptions = QueryOptions {
        strict_mode: false,
        check_type: false,
    };
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self::STRICT
    }
}

/// Where an entity is in its current query cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPhase {
    Unbuilt,
    Built,
    Submitted,
    Resolved,
}

/// A real-world entity described by partial attributes.
#[derive(Debug, Clone)]
pub struct Entity {
    class: EntityClass,
    slots: Vec<AttributeSlot>,
    urls: Vec<String>,
    language: Language,
    endpoints: BTreeSet<Endpoint>,
    limit: i64,
    limits: TraversalLimits,
    query: SparqlQuery,
    phase: QueryPhase,
    report: Option<CommitReport>,
    attributes: Attributes,
    labels: BTreeMap<String, Vec<String>>,
    visited: BTreeSet<String>,
}

impl Entity {
    pub fn new(class: EntityClass, language: Language) -> Self {
        Self {
            class,
            slots: Vec::new(),
            urls: Vec::new(),
            language,
            endpoints: BTreeSet::new(),
            limit: DEFAULT_LIMIT as i64,
            limits: TraversalLimits::default(),
            query: SparqlQuery::new(),
            phase: QueryPhase::Unbuilt,
            report: None,
            attributes: Attributes::new(),
            labels: BTreeMap::new(),
            visited: BTreeSet::new(),
        }
    }

    // -- constraints --

    /// Declare (or replace) a single-valued text constraint. Blank values
    /// are ignored.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        self.set_slot(name, vec![SlotValue::Text(value.into())]);
    }

    /// Declare (or replace) a constraint with explicit values. Several
    /// values are OR'd together.
    pub fn set_slot(&mut self, name: &str, values: Vec<SlotValue>) {
        let values: Vec<SlotValue> = values
            .into_iter()
            .filter(|v| !v.as_str().trim().is_empty())
            .collect();
        self.slots.retain(|s| s.name != name);
        if values.is_empty() {
            return;
        }
        let predicates = Vocabulary::bundled().predicates_for(self.class, name);
        self.slots.push(AttributeSlot {
            name: name.to_string(),
            values,
            predicates,
        });
    }

    /// Anchor the query on the given URLs instead of the attribute slots.
    pub fn set_urls<S: Into<String>>(&mut self, urls: impl IntoIterator<Item = S>) {
        self.urls = urls
            .into_iter()
            .map(Into::into)
            .filter(|u: &String| !u.trim().is_empty())
            .collect();
    }

    pub fn add_query_endpoint(&mut self, endpoint: Endpoint) {
        self.endpoints.insert(endpoint);
    }

    pub fn add_query_endpoints(&mut self, endpoints: impl IntoIterator<Item = Endpoint>) {
        self.endpoints.extend(endpoints);
    }

    pub fn set_query_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Result limit for the next query cycles.
    pub fn set_limit(&mut self, limit: i64) -> EntityResult<()> {
        if limit < 1 {
            return Err(QueryError::InvalidLimit { value: limit }.into());
        }
        self.limit = limit;
        Ok(())
    }

    pub fn set_traversal_limits(&mut self, limits: TraversalLimits) {
        self.limits = limits;
    }

    /// Fold attributes resolved elsewhere into this entity.
    pub fn merge_attributes(&mut self, other: &Attributes) {
        absorb_attributes(&mut self.attributes, other);
    }

    // -- accessors --

    pub fn class(&self) -> EntityClass {
        self.class
    }

    pub fn slots(&self) -> &[AttributeSlot] {
        &self.slots
    }

    pub fn slot(&self, name: &str) -> Option<&AttributeSlot> {
        self.slots.iter().find(|s| s.name == name)
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn query_language(&self) -> Language {
        self.language
    }

    pub fn endpoints(&self) -> &BTreeSet<Endpoint> {
        &self.endpoints
    }

    pub fn phase(&self) -> QueryPhase {
        self.phase
    }

    /// The query of the current cycle.
    pub fn sparql_query(&self) -> &SparqlQuery {
        &self.query
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }

    /// Attributes whose key contains `keyword`, ignoring case.
    pub fn attributes_with_keyword(&self, keyword: &str) -> Attributes {
        let keyword = keyword.to_lowercase();
        self.attributes
            .iter()
            .filter(|(k, _)| k.to_lowercase().contains(&keyword))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Values of the identity predicates.
    pub fn uris(&self) -> BTreeSet<String> {
        IDENTITY_PREDICATES
            .iter()
            .filter_map(|p| self.attributes.get(*p))
            .flat_map(|v| v.values().into_iter().map(str::to_string))
            .collect()
    }

    /// Labels and names grouped by language, filled by
    /// [`find_more_about`](Self::find_more_about).
    pub fn labels(&self) -> &BTreeMap<String, Vec<String>> {
        &self.labels
    }

    /// Per-endpoint outcome of the last commit.
    pub fn last_report(&self) -> Option<&CommitReport> {
        self.report.as_ref()
    }
}
