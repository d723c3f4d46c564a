use super::creative_work::{AuthorKind, resolve_author, set_author_identities};
use super::{Common, CreativeWork, common_builder_methods, entity_wrapper, insufficient, present};
use crate::entity::{Entity, QueryOptions};
use crate::error::EntityResult;
use crate::transport::SparqlTransport;
use crate::vocab::EntityClass;

/// A book: identified by a URL, a Gallica URL, or a title together with an
/// author, a publication date or a publisher.
#[derive(Debug, Clone)]
pub struct Book {
    entity: Entity,
}

entity_wrapper!(Book);

impl Book {
    pub const DEFAULT_OPTIONS: QueryOptions = CreativeWork::DEFAULT_OPTIONS;

    pub fn builder() -> BookBuilder {
        BookBuilder::default()
    }

    /// See [`CreativeWork::resolve_author`].
    pub fn resolve_author(&mut self, transport: &dyn SparqlTransport) -> EntityResult<()> {
        resolve_author(&mut self.entity, transport, AuthorKind::Person)
    }

    pub fn resolve_author_organisation(&mut self, transport: &dyn SparqlTransport) -> EntityResult<()> {
        resolve_author(&mut self.entity, transport, AuthorKind::Organisation)
    }

    pub fn with_author_entity(&mut self, author: &Entity) -> EntityResult<()> {
        set_author_identities(&mut self.entity, author)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BookBuilder {
    title: Option<String>,
    author: Option<String>,
    publisher: Option<String>,
    publication_date: Option<String>,
    gallica_url: Option<String>,
    common: Common,
}

impl BookBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    pub fn publication_date(mut self, date: impl Into<String>) -> Self {
        self.publication_date = Some(date.into());
        self
    }

    /// Digitized copy on Gallica, the BnF digital library.
    pub fn gallica_url(mut self, url: impl Into<String>) -> Self {
        self.gallica_url = Some(url.into());
        self
    }

    common_builder_methods!();

    pub fn build(self) -> EntityResult<Book> {
        let with_title = present(&self.title)
            && (present(&self.author) || present(&self.publication_date) || present(&self.publisher));
        if !(self.common.has_url() || present(&self.gallica_url) || with_title) {
            return Err(insufficient(
                "Book",
                "Provide a URL, a Gallica URL, or a title together with an author, \
                 a publication date or a publisher.",
            ));
        }
        let mut entity = self.common.entity(EntityClass::Book);
        let slots = [
            ("title", self.title),
            ("author", self.author),
            ("publisher", self.publisher),
            ("publication_date", self.publication_date),
            ("gallica_url", self.gallica_url),
        ];
        for (name, value) in slots {
            if let Some(value) = value {
                entity.set_attribute(name, value);
            }
        }
        Ok(Book { entity })
    }
}
