//! Blocking HTTP transport built on `ureq`.

use std::collections::HashMap;
use std::time::Duration;

use super::{SPARQL_JSON_ACCEPT, SparqlTransport, TransportResponse};
use crate::endpoint::Endpoint;
use crate::error::{TransportError, TransportResult};

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Posts queries as `application/x-www-form-urlencoded` (`query=…`).
///
/// POST rather than GET keeps long generated queries out of the URL.
pub struct HttpTransport {
    agent: ureq::Agent,
    user_agent: String,
    overrides: HashMap<Endpoint, String>,
}

impl HttpTransport {
    pub fn new(timeout: Duration, user_agent: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            user_agent: user_agent.into(),
            overrides: HashMap::new(),
        }
    }

    /// Send queries for `endpoint` to `url` instead of its public service,
    /// e.g. a local mirror.
    pub fn with_url(mut self, endpoint: Endpoint, url: impl Into<String>) -> Self {
        self.overrides.insert(endpoint, url.into());
        self
    }

    /// URL queries for `endpoint` are posted to.
    pub fn url_for(&self, endpoint: Endpoint) -> &str {
        self.overrides
            .get(&endpoint)
            .map(String::as_str)
            .unwrap_or_else(|| endpoint.url())
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concat!("semquery/", env!("CARGO_PKG_VERSION")),
        )
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("user_agent", &self.user_agent)
            .field("overrides", &self.overrides)
            .finish()
    }
}

impl SparqlTransport for HttpTransport {
    fn submit(&self, endpoint: Endpoint, query: &str) -> TransportResult<TransportResponse> {
        let url = self.url_for(endpoint);
        let result = self
            .agent
            .post(url)
            .set("Accept", SPARQL_JSON_ACCEPT)
            .set("User-Agent", &self.user_agent)
            .send_form(&[("query", query)]);

        match result {
            Ok(response) => {
                let status = response.status();
                let body = response.into_string().map_err(|e| TransportError::Body {
                    endpoint: endpoint.to_string(),
                    message: e.to_string(),
                })?;
                Ok(TransportResponse { status, body })
            }
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                Ok(TransportResponse { status: code, body })
            }
            Err(ureq::Error::Transport(transport)) => Err(TransportError::Request {
                endpoint: endpoint.to_string(),
                message: transport.to_string(),
            }),
        }
    }
}
