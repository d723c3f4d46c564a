//! Following identity links to other representations of an entity.

use std::collections::{BTreeMap, VecDeque};

use super::{Entity, QueryOptions, absorb_attributes};
use crate::error::EntityResult;
use crate::namespace::NamespaceRegistry;
use crate::query::split_language_suffix;
use crate::transport::SparqlTransport;

pub const DEFAULT_MAX_IDENTITY_DEPTH: usize = 3;
pub const DEFAULT_MAX_IDENTITY_LOOKUPS: usize = 64;

/// Bounds on the identity traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalLimits {
    /// Hops away from the subjects found by the first query.
    pub max_depth: usize,
    /// Sibling queries per call.
    pub max_lookups: usize,
}

impl Default for TraversalLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_IDENTITY_DEPTH,
            max_lookups: DEFAULT_MAX_IDENTITY_LOOKUPS,
        }
    }
}

/// Absolute IRI for an identity value, if it names a resource.
fn identity_iri(id: &str) -> Option<String> {
    let id = id.trim();
    if id.is_empty() || id.contains(char::is_whitespace) {
        return None;
    }
    let bare = id
        .strip_prefix('<')
        .and_then(|i| i.strip_suffix('>'))
        .unwrap_or(id);
    if bare.starts_with("http://") || bare.starts_with("https://") {
        return Some(bare.to_string());
    }
    NamespaceRegistry::global()
        .expand(bare)
        .filter(|iri| iri.starts_with("http://") || iri.starts_with("https://"))
}

impl Entity {
    /// Query every identity value not seen yet as its own URL-anchored
    /// entity and merge what it knows, until no new identity turns up or a
    /// traversal limit is hit. Returns the number of sibling queries made.
    ///
    /// Identities left over when a limit is hit are marked seen, so calling
    /// this again after it returned changes nothing.
    pub fn find_more_about(&mut self, transport: &dyn SparqlTransport) -> EntityResult<usize> {
        let mut frontier: VecDeque<(String, usize)> = self
            .uris()
            .into_iter()
            .filter(|id| !self.visited.contains(id))
            .map(|id| (id, 1))
            .collect();
        let mut lookups = 0usize;

        while let Some((id, depth)) = frontier.pop_front() {
            if !self.visited.insert(id.clone()) {
                continue;
            }
            if depth > self.limits.max_depth {
                tracing::debug!(identity = %id, depth, "identity beyond traversal depth, not followed");
                continue;
            }
            let Some(iri) = identity_iri(&id) else {
                continue;
            };
            if lookups >= self.limits.max_lookups {
                tracing::warn!(
                    max_lookups = self.limits.max_lookups,
                    skipped = frontier.len() + 1,
                    "identity lookup budget exhausted"
                );
                self.visited.extend(frontier.drain(..).map(|(id, _)| id));
                break;
            }

            let mut sibling = Entity::new(self.class, self.language);
            sibling.add_query_endpoints(self.endpoints.iter().copied());
            sibling.limit = self.limit;
            sibling.set_urls([iri]);
            sibling.query(transport, QueryOptions::LOOSE)?;
            lookups += 1;

            for next in sibling.uris() {
                if !self.visited.contains(&next) {
                    frontier.push_back((next, depth + 1));
                }
            }
            absorb_attributes(&mut self.attributes, &sibling.attributes);
            if let Some(report) = sibling.report.take() {
                match self.report.as_mut() {
                    Some(own) => own.absorb(report),
                    None => self.report = Some(report),
                }
            }
            tracing::debug!(identity = %id, depth, "merged identity");
        }

        self.labels = self.labels_by_language();
        tracing::info!(lookups, identities = self.visited.len(), "identity traversal finished");
        Ok(lookups)
    }

    /// Labels and names grouped by language. Values without a language
    /// marker are filed under the query language.
    pub fn labels_by_language(&self) -> BTreeMap<String, Vec<String>> {
        let mut labels: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in &self.attributes {
            let key = key.to_lowercase();
            if !key.contains("label") && !key.contains("name") {
                continue;
            }
            for v in value.values() {
                let (text, lang) = split_language_suffix(v);
                let lang = lang.unwrap_or(self.language.code()).to_string();
                let entry = labels.entry(lang).or_default();
                if !entry.iter().any(|t| t == text) {
                    entry.push(text.to_string());
                }
            }
        }
        labels
    }
}
