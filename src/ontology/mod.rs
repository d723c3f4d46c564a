//! Typed entry points over [`Entity`]: one builder per entity class.
//!
//! Each builder checks that enough identifying information was given
//! before an [`Entity`] is created; the wrappers dereference to it for
//! querying and attribute access.

mod book;
mod creative_work;
mod person;
mod thing;

pub use book::{Book, BookBuilder};
pub use creative_work::{AuthorKind, CreativeWork, CreativeWorkBuilder};
pub use person::{ExternalIdSystem, Gender, LifeEvent, Person, PersonBuilder};
pub use thing::{Thing, ThingBuilder};

use crate::endpoint::Endpoint;
use crate::entity::Entity;
use crate::error::EntityError;
use crate::lang::Language;

/// Settings every builder accepts.
#[derive(Debug, Clone, Default)]
struct Common {
    url: Option<String>,
    language: Language,
    endpoints: Vec<Endpoint>,
}

impl Common {
    fn has_url(&self) -> bool {
        present(&self.url)
    }

    /// Create the entity and apply the shared settings.
    fn entity(&self, class: crate::vocab::EntityClass) -> Entity {
        let mut entity = Entity::new(class, self.language);
        entity.add_query_endpoints(self.endpoints.iter().copied());
        if let Some(url) = &self.url {
            entity.set_urls([url.as_str()]);
        }
        entity
    }
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn insufficient(class: &str, hint: &str) -> EntityError {
    EntityError::InsufficientInformation {
        class: class.to_string(),
        hint: hint.to_string(),
    }
}

/// Builder methods shared by every entity class.
macro_rules! common_builder_methods {
    () => {
        /// Anchor the entity on a known URL.
        pub fn url(mut self, url: impl Into<String>) -> Self {
            self.common.url = Some(url.into());
            self
        }

        /// Language literals are tagged with on multilingual endpoints.
        pub fn query_language(mut self, language: $crate::lang::Language) -> Self {
            self.common.language = language;
            self
        }

        /// Same as [`query_language`](Self::query_language), from an ISO
        /// 639-1 code.
        pub fn query_language_code(
            mut self,
            code: &str,
        ) -> $crate::error::EntityResult<Self> {
            self.common.language = code.parse()?;
            Ok(self)
        }

        pub fn endpoint(mut self, endpoint: $crate::endpoint::Endpoint) -> Self {
            self.common.endpoints.push(endpoint);
            self
        }

        pub fn endpoints(
            mut self,
            endpoints: impl IntoIterator<Item = $crate::endpoint::Endpoint>,
        ) -> Self {
            self.common.endpoints.extend(endpoints);
            self
        }
    };
}

/// `Deref` to [`Entity`] plus conversions for a wrapper type.
macro_rules! entity_wrapper {
    ($wrapper:ident) => {
        impl std::ops::Deref for $wrapper {
            type Target = $crate::entity::Entity;

            fn deref(&self) -> &Self::Target {
                &self.entity
            }
        }

        impl std::ops::DerefMut for $wrapper {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.entity
            }
        }

        impl $wrapper {
            pub fn into_entity(self) -> $crate::entity::Entity {
                self.entity
            }
        }
    };
}

pub(crate) use common_builder_methods;
pub(crate) use entity_wrapper;
