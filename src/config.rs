//! Resolver configuration, persisted as TOML.
//!
//! Looked up at `$XDG_CONFIG_HOME/semquery/config.toml` (falling back to
//! `~/.config/semquery/config.toml`) unless a path is given explicitly.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::endpoint::Endpoint;
use crate::entity::{
    DEFAULT_MAX_IDENTITY_DEPTH, DEFAULT_MAX_IDENTITY_LOOKUPS, Entity, QueryOptions, TraversalLimits,
};
use crate::error::{ConfigError, ConfigResult, EntityResult};
use crate::lang::Language;
use crate::query::DEFAULT_LIMIT;
use crate::transport::{DEFAULT_TIMEOUT_SECS, HttpTransport};

/// Defaults applied to every entity the resolver builds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Endpoints queried when an entity names none.
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<Endpoint>,
    #[serde(default)]
    pub query_language: Language,
    /// `LIMIT` of generated queries.
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Endpoint name → URL to use instead of the public service.
    #[serde(default)]
    pub endpoint_urls: BTreeMap<String, String>,
    #[serde(default = "default_max_identity_depth")]
    pub max_identity_depth: usize,
    #[serde(default = "default_max_identity_lookups")]
    pub max_identity_lookups: usize,
    /// Unset, each entity class uses its own default options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_type: Option<bool>,
}

fn default_endpoints() -> Vec<Endpoint> {
    vec![Endpoint::DEFAULT]
}
fn default_limit() -> i64 {
    DEFAULT_LIMIT as i64
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_user_agent() -> String {
    concat!("semquery/", env!("CARGO_PKG_VERSION")).into()
}
fn default_max_identity_depth() -> usize {
    DEFAULT_MAX_IDENTITY_DEPTH
}
fn default_max_identity_lookups() -> usize {
    DEFAULT_MAX_IDENTITY_LOOKUPS
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            query_language: Language::default(),
            limit: default_limit(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            endpoint_urls: BTreeMap::new(),
            max_identity_depth: default_max_identity_depth(),
            max_identity_lookups: default_max_identity_lookups(),
            strict_mode: None,
            check_type: None,
        }
    }
}

impl ResolverConfig {
    /// `$XDG_CONFIG_HOME/semquery/config.toml`, if a home can be found.
    pub fn default_path() -> Option<PathBuf> {
        let base = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
            .ok()?;
        Some(base.join("semquery").join("config.toml"))
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load `path` when given, else the default file when it exists, else
    /// defaults.
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Options for classes that default to [`QueryOptions::STRICT`].
    pub fn query_options(&self) -> QueryOptions {
        self.query_options_or(QueryOptions::STRICT)
    }

    /// `defaults` with whatever this config sets explicitly.
    pub fn query_options_or(&self, defaults: QueryOptions) -> QueryOptions {
        QueryOptions {
            strict_mode: self.strict_mode.unwrap_or(defaults.strict_mode),
            check_type: self.check_type.unwrap_or(defaults.check_type),
        }
    }

    pub fn traversal_limits(&self) -> TraversalLimits {
        TraversalLimits {
            max_depth: self.max_identity_depth,
            max_lookups: self.max_identity_lookups,
        }
    }

    /// HTTP transport with this config's timeout, user agent and URL
    /// overrides. Overrides for unknown endpoint names are skipped.
    pub fn http_transport(&self) -> HttpTransport {
        let mut transport =
            HttpTransport::new(Duration::from_secs(self.timeout_secs), self.user_agent.as_str());
        for (name, url) in &self.endpoint_urls {
            match name.parse::<Endpoint>() {
                Ok(endpoint) => transport = transport.with_url(endpoint, url.as_str()),
                Err(e) => tracing::warn!(endpoint = %name, "ignoring URL override: {e}"),
            }
        }
        transport
    }

    /// Apply limit, traversal caps and, when the entity names none, the
    /// default endpoints.
    pub fn apply(&self, entity: &mut Entity) -> EntityResult<()> {
        if entity.endpoints().is_empty() {
            entity.add_query_endpoints(self.endpoints.iter().copied());
        }
        entity.set_limit(self.limit)?;
        entity.set_traversal_limits(self.traversal_limits());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::EntityClass;

    #[test]
    fn defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.endpoints, vec![Endpoint::Dbpedia]);
        assert_eq!(config.limit, 1500);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_identity_depth, 3);
        assert_eq!(config.max_identity_lookups, 64);
        assert_eq!(config.query_options(), QueryOptions::STRICT);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: ResolverConfig = toml::from_str(
            r#"
            endpoints = ["bnf", "dbpedia_fr"]
            query_language = "fr"
            strict_mode = false
            "#,
        )
        .unwrap();
        assert_eq!(config.endpoints, vec![Endpoint::Bnf, Endpoint::DbpediaFr]);
        assert_eq!(config.query_language, Language::French);
        assert_eq!(config.strict_mode, Some(false));
        assert_eq!(config.check_type, None);
        assert_eq!(config.limit, 1500);
    }

    #[test]
    fn unset_options_fall_back_to_class_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.query_options_or(QueryOptions::LOOSE), QueryOptions::LOOSE);

        let config = ResolverConfig {
            check_type: Some(true),
            ..Default::default()
        };
        assert_eq!(
            config.query_options_or(QueryOptions::LOOSE),
            QueryOptions {
                strict_mode: false,
                check_type: true
            }
        );
        assert_eq!(config.query_options(), QueryOptions::STRICT);
    }

    #[test]
    fn unknown_language_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "query_language = \"zz\"\n").unwrap();
        assert!(matches!(
            ResolverConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = ResolverConfig::default();
        config.endpoints = vec![Endpoint::Wikidata, Endpoint::Bnf];
        config.query_language = Language::French;
        config
            .endpoint_urls
            .insert("wikidata".into(), "http://localhost:7878/query".into());
        config.save(&path).unwrap();

        let loaded = ResolverConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ResolverConfig::load(&dir.path().join("absent.toml")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn http_transport_uses_overrides() {
        let mut config = ResolverConfig::default();
        config
            .endpoint_urls
            .insert("bnf".into(), "http://localhost:9999/sparql".into());
        config
            .endpoint_urls
            .insert("nowhere".into(), "http://localhost:1/".into());
        let transport = config.http_transport();
        assert_eq!(transport.url_for(Endpoint::Bnf), "http://localhost:9999/sparql");
        assert_eq!(transport.url_for(Endpoint::Wikidata), Endpoint::Wikidata.url());
    }

    #[test]
    fn apply_fills_endpoints_only_when_missing() {
        let config = ResolverConfig {
            endpoints: vec![Endpoint::Bnf],
            ..Default::default()
        };
        let mut bare = Entity::new(EntityClass::Thing, Language::English);
        config.apply(&mut bare).unwrap();
        assert_eq!(bare.endpoints().len(), 1);

        let mut chosen = Entity::new(EntityClass::Thing, Language::English);
        chosen.add_query_endpoint(Endpoint::Wikidata);
        config.apply(&mut chosen).unwrap();
        assert!(chosen.endpoints().contains(&Endpoint::Wikidata));
        assert!(!chosen.endpoints().contains(&Endpoint::Bnf));
    }
}
