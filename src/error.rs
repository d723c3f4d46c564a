//! Rich diagnostic error types for semquery.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so callers know exactly
//! what went wrong and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for semquery.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum SemqueryError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Namespace(#[from] NamespaceError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Entity(#[from] EntityError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Namespace errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum NamespaceError {
    #[error("the prefix declaration \"{prefix}\" is not well formed")]
    #[diagnostic(
        code(semquery::namespace::malformed),
        help(
            "A prefix declaration looks like `abbr: <http://example.org/ns#>`. \
             The abbreviation must be a word and the URI must be absolute."
        )
    )]
    Malformed { prefix: String },

    #[error("the prefix \"{prefix}\" is not in the namespace registry")]
    #[diagnostic(
        code(semquery::namespace::unknown),
        help(
            "Declare the prefix before using it, either by passing \
             `\"{prefix}: <uri>\"` to the triple or query, or by calling \
             `NamespaceRegistry::register`."
        )
    )]
    Unknown { prefix: String },

    #[error("\"{abbreviation}\" and <{uri}> do not refer to the same registered namespace")]
    #[diagnostic(
        code(semquery::namespace::inconsistent),
        help(
            "The registry already binds this abbreviation or this URI to something else \
             ({existing}). Rebinding it would make generated queries ambiguous. \
             Choose another abbreviation or use the registered one."
        )
    )]
    Inconsistent {
        abbreviation: String,
        uri: String,
        existing: String,
    },

    #[error("cannot add an empty prefix")]
    #[diagnostic(
        code(semquery::namespace::empty),
        help("Pass a registered prefix or a non-empty `abbr: <uri>` declaration.")
    )]
    Empty,
}

// ---------------------------------------------------------------------------
// Query errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum QueryError {
    #[error("the query has no triples in its WHERE clause")]
    #[diagnostic(
        code(semquery::query::no_triples),
        help("Add at least one triple or one alternative group before committing.")
    )]
    NoTriples,

    #[error("the query references the unregistered prefix \"{prefix}\"")]
    #[diagnostic(
        code(semquery::query::unregistered_prefix),
        help("Every prefix must be registered in the namespace registry before submission.")
    )]
    UnregisteredPrefix { prefix: String },

    #[error("invalid result limit {value}: must be greater than 0")]
    #[diagnostic(
        code(semquery::query::invalid_limit),
        help("Use a strictly positive limit, e.g. `set_limit(100)`.")
    )]
    InvalidLimit { value: i64 },

    #[error("no query text was generated for endpoint {endpoint}")]
    #[diagnostic(
        code(semquery::query::not_generated),
        help("This is an internal error: rendering must produce text for every endpoint.")
    )]
    NoQueryGenerated { endpoint: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Namespace(#[from] NamespaceError),
}

// ---------------------------------------------------------------------------
// Entity errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum EntityError {
    #[error("not enough information to identify this {class}")]
    #[diagnostic(code(semquery::entity::insufficient), help("{hint}"))]
    InsufficientInformation { class: String, hint: String },

    #[error("unknown query language \"{code}\"")]
    #[diagnostic(
        code(semquery::entity::unknown_language),
        help("Query languages are ISO 639-1 two-letter codes such as `en`, `fr` or `de`.")
    )]
    UnknownLanguage { code: String },

    #[error("the author \"{name}\" could not be found on any endpoint")]
    #[diagnostic(
        code(semquery::entity::author_not_found),
        help(
            "Check the name and whether the author is a person or an organisation, or \
             pass an already resolved entity with `with_author_entity`."
        )
    )]
    AuthorNotFound { name: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Namespace(#[from] NamespaceError),
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// Failures talking to a single endpoint.
///
/// The query builder logs these and moves on to the next endpoint; they only
/// reach callers that use a transport directly.
#[derive(Debug, Error, Diagnostic)]
pub enum TransportError {
    #[error("request to {endpoint} failed: {message}")]
    #[diagnostic(
        code(semquery::transport::request),
        help("Check that the endpoint is reachable and the network is available.")
    )]
    Request { endpoint: String, message: String },

    #[error("could not read the response body from {endpoint}: {message}")]
    #[diagnostic(
        code(semquery::transport::body),
        help("The endpoint answered but the body could not be read as UTF-8 text.")
    )]
    Body { endpoint: String, message: String },

    #[error("no local store is attached for endpoint {endpoint}")]
    #[diagnostic(
        code(semquery::transport::no_local_store),
        help("Attach a store with `LocalEndpoint::load_turtle` before querying this endpoint.")
    )]
    NoLocalStore { endpoint: String },

    #[error("local store error: {message}")]
    #[diagnostic(
        code(semquery::transport::local_store),
        help("The in-memory oxigraph store rejected the data or the query.")
    )]
    LocalStore { message: String },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(semquery::config::read),
        help("Ensure the config file exists and is valid TOML.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    #[diagnostic(
        code(semquery::config::parse),
        help("Check the TOML syntax and the endpoint and language names in the config file.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(semquery::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type NamespaceResult<T> = std::result::Result<T, NamespaceError>;
pub type QueryResult<T> = std::result::Result<T, QueryError>;
pub type EntityResult<T> = std::result::Result<T, EntityError>;
pub type TransportResult<T> = std::result::Result<T, TransportError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Convenience alias for functions returning semquery results.
pub type SemqueryResult<T> = std::result::Result<T, SemqueryError>;
