// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # semquery
//!
//! Entity lookup across public linked-data SPARQL endpoints (DBpedia, French
//! DBpedia, Wikidata, BnF). A caller describes an entity with partial
//! attributes; semquery writes the SPARQL, queries every endpoint, keeps the
//! candidates that really match and merges their facts into one record.
//!
//! ## Architecture
//!
//! - **Namespaces** (`namespace`): process-wide prefix ↔ URI registry
//! - **Triples and queries** (`query`): normalized patterns, per-endpoint
//!   rendering, result normalization
//! - **Resolution** (`entity`): query cycle, validation, identity traversal
//! - **Ontology** (`ontology`): typed builders for things, persons, works, books
//! - **Transport** (`transport`): HTTP client and an in-memory oxigraph endpoint
//!
//! ## Library usage
//!
//! ```no_run
//! use semquery::endpoint::Endpoint;
//! use semquery::entity::QueryOptions;
//! use semquery::ontology::Person;
//! use semquery::transport::HttpTransport;
//!
//! let mut duras = Person::builder()
//!     .full_name("Marguerite Duras")
//!     .query_language_code("fr")
//!     .unwrap()
//!     .endpoints([Endpoint::Bnf, Endpoint::DbpediaFr])
//!     .build()
//!     .unwrap();
//! duras.query(&HttpTransport::default(), QueryOptions::LOOSE).unwrap();
//! println!("{:?}", duras.gender());
//! ```

pub mod config;
pub mod endpoint;
pub mod entity;
pub mod error;
pub mod lang;
pub mod namespace;
pub mod ontology;
pub mod query;
pub mod transport;
pub mod vocab;
