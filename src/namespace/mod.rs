//! Namespace prefixes and the process-wide prefix registry.

mod registry;
mod table;

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

pub use registry::NamespaceRegistry;

use crate::error::{NamespaceError, NamespaceResult};

/// `abbr: <http://…>` with an optional `PREFIX` keyword and trailing dot.
static RE_PREFIX_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?i:PREFIX\s+)?(?P<abbr>\w+)\s*:\s*<(?P<uri>https?://[^>\s]+)>[\s.]*$")
        .unwrap()
});

/// An absolute URI split at its last `/` or `#`.
pub(crate) static RE_URI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<ns>https?://.+)(?P<sep>[/#])(?P<local>[^#^]+)$").unwrap());

/// Local names that can be written after `prefix:` without escaping.
static RE_LOCAL_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[\p{L}\p{N}_][\p{L}\p{N}_\-.:]*)?$").unwrap());

/// Whether `local` may follow `prefix:` in a SPARQL query as is.
pub(crate) fn is_local_name(local: &str) -> bool {
    RE_LOCAL_NAME.is_match(local) && !local.ends_with('.')
}

/// An immutable (short name, namespace URI) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespacePrefix {
    name: String,
    uri: String,
}

impl NamespacePrefix {
    pub(crate) fn new(name: String, uri: String) -> Self {
        Self { name, uri }
    }

    /// The short name, e.g. `foaf`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The namespace URI, e.g. `http://xmlns.com/foaf/0.1/`.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// SPARQL header line: `PREFIX foaf: <http://xmlns.com/foaf/0.1/>`.
    pub fn to_sparql(&self) -> String {
        format!("PREFIX {}: <{}>", self.name, self.uri)
    }
}

impl fmt::Display for NamespacePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: <{}>", self.name, self.uri)
    }
}

/// Split a prefix declaration such as `gn: <http://www.geonames.org/ontology#>`
/// into its abbreviation and URI.
pub fn decompose_prefix(declaration: &str) -> NamespaceResult<(String, String)> {
    let caps = RE_PREFIX_DECLARATION
        .captures(declaration)
        .ok_or_else(|| NamespaceError::Malformed {
            prefix: declaration.to_string(),
        })?;
    Ok((caps["abbr"].to_string(), caps["uri"].to_string()))
}

/// Shorthand for [`NamespaceRegistry::shorten`] on the global registry.
pub fn shorten(uri: &str) -> String {
    NamespaceRegistry::global().shorten(uri)
}

/// Shorthand for [`NamespaceRegistry::expand`] on the global registry.
pub fn expand(token: &str) -> Option<String> {
    NamespaceRegistry::global().expand(token)
}

/// Canonical spelling of a `prefix:local` token, or the token unchanged when
/// its prefix is unknown or it has none.
pub fn canonical_token(token: &str) -> String {
    NamespaceRegistry::global()
        .canonicalize(token)
        .map(|(canonical, _)| canonical)
        .unwrap_or_else(|_| token.to_string())
}
