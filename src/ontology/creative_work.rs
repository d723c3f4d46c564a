//! Creative works, and turning an author name into author identities.

use super::{Common, Person, Thing, common_builder_methods, entity_wrapper, insufficient, present};
use crate::entity::{Entity, QueryOptions, SlotValue};
use crate::error::{EntityError, EntityResult};
use crate::transport::SparqlTransport;
use crate::vocab::EntityClass;

/// A book, film, painting, program, …: identified by a URL, or a title
/// together with an author or a date.
#[derive(Debug, Clone)]
pub struct CreativeWork {
    entity: Entity,
}

entity_wrapper!(CreativeWork);

/// What an author name is looked up as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorKind {
    #[default]
    Person,
    /// A collective, publisher or institution, looked up as a [`Thing`] by
    /// label.
    Organisation,
}

impl CreativeWork {
    /// Works are matched loosely unless asked otherwise: titles and author
    /// names are carried by too many predicates for strict matching.
    pub const DEFAULT_OPTIONS: QueryOptions = QueryOptions::LOOSE;

    pub fn builder() -> CreativeWorkBuilder {
        CreativeWorkBuilder::default()
    }

    /// Look the author name up as a [`Person`] and constrain the work by the
    /// author's identities instead of the name.
    pub fn resolve_author(&mut self, transport: &dyn SparqlTransport) -> EntityResult<()> {
        resolve_author(&mut self.entity, transport, AuthorKind::Person)
    }

    /// Same as [`resolve_author`](Self::resolve_author) for an author that
    /// is an organisation.
    pub fn resolve_author_organisation(&mut self, transport: &dyn SparqlTransport) -> EntityResult<()> {
        resolve_author(&mut self.entity, transport, AuthorKind::Organisation)
    }

    /// Constrain the work by the identities of an already resolved person or
    /// organisation.
    pub fn with_author_entity(&mut self, author: &Entity) -> EntityResult<()> {
        set_author_identities(&mut self.entity, author)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreativeWorkBuilder {
    title: Option<String>,
    author: Option<String>,
    date: Option<String>,
    common: Common,
}

impl CreativeWorkBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Author name, matched as text until
    /// [`resolve_author`](CreativeWork::resolve_author) is called.
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    common_builder_methods!();

    pub fn build(self) -> EntityResult<CreativeWork> {
        let identified = self.common.has_url()
            || (present(&self.title) && (present(&self.author) || present(&self.date)));
        if !identified {
            return Err(insufficient(
                "CreativeWork",
                "Provide a URL, or a title together with an author or a date.",
            ));
        }
        let mut entity = self.common.entity(EntityClass::CreativeWork);
        for (name, value) in [("title", self.title), ("author", self.author), ("date", self.date)] {
            if let Some(value) = value {
                entity.set_attribute(name, value);
            }
        }
        Ok(CreativeWork { entity })
    }
}

/// Replace a textual `author` constraint with the identities of the person
/// or organisation it names. Identities already in place are left alone.
pub(super) fn resolve_author(
    entity: &mut Entity,
    transport: &dyn SparqlTransport,
    kind: AuthorKind,
) -> EntityResult<()> {
    let Some(slot) = entity.slot("author") else {
        return Ok(());
    };
    let Some(SlotValue::Text(name)) = slot.values().first().cloned() else {
        return Ok(());
    };

    let language = entity.query_language();
    let endpoints = entity.endpoints().iter().copied();
    let mut author = match kind {
        AuthorKind::Person => Person::builder()
            .full_name(name.as_str())
            .query_language(language)
            .endpoints(endpoints)
            .build()?
            .into_entity(),
        AuthorKind::Organisation => Thing::builder()
            .label(name.as_str())
            .query_language(language)
            .endpoints(endpoints)
            .build()?
            .into_entity(),
    };
    author.query(transport, QueryOptions::STRICT)?;
    if author.attributes().is_empty() {
        tracing::debug!(author = %name, ?kind, "no author matched");
        return Err(EntityError::AuthorNotFound { name });
    }
    set_author_identities(entity, &author)
}

pub(super) fn set_author_identities(entity: &mut Entity, author: &Entity) -> EntityResult<()> {
    let uris = author.uris();
    if uris.is_empty() {
        let name = ["full_name", "last_name", "label"]
            .iter()
            .find_map(|s| author.slot(s))
            .and_then(|s| s.values().first())
            .map(|v| v.as_str().to_string())
            .or_else(|| author.urls().first().cloned())
            .unwrap_or_default();
        return Err(EntityError::AuthorNotFound { name });
    }
    tracing::debug!(identities = uris.len(), "author resolved to identities");
    entity.set_slot("author", uris.into_iter().map(SlotValue::Resource).collect());
    Ok(())
}
