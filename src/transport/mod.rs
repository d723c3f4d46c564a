//! The endpoint collaborator: submit one query text, get a status and body.
//!
//! [`HttpTransport`] talks to the real services; [`LocalEndpoint`] answers
//! from in-memory oxigraph stores so resolution can run without a network.

mod http;
mod local;

pub use http::{DEFAULT_TIMEOUT_SECS, HttpTransport};
pub use local::LocalEndpoint;

use crate::endpoint::Endpoint;
use crate::error::TransportResult;

/// Media types requested from endpoints.
pub const SPARQL_JSON_ACCEPT: &str = "application/sparql-results+json, application/json";

/// What an endpoint answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Sends a SPARQL query text to an endpoint.
///
/// Any implementation whose successful answers carry a SPARQL JSON results
/// document can be used; non-200 statuses are reported, not turned into
/// errors.
pub trait SparqlTransport {
    fn submit(&self, endpoint: Endpoint, query: &str) -> TransportResult<TransportResponse>;
}

impl<T: SparqlTransport + ?Sized> SparqlTransport for &T {
    fn submit(&self, endpoint: Endpoint, query: &str) -> TransportResult<TransportResponse> {
        (**self).submit(endpoint, query)
    }
}
