use super::{Common, common_builder_methods, entity_wrapper, insufficient, present};
use crate::entity::Entity;
use crate::error::EntityResult;
use crate::vocab::EntityClass;

/// Anything, identified by a label or a URL.
#[derive(Debug, Clone)]
pub struct Thing {
    entity: Entity,
}

entity_wrapper!(Thing);

impl Thing {
    pub fn builder() -> ThingBuilder {
        ThingBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ThingBuilder {
    label: Option<String>,
    common: Common,
}

impl ThingBuilder {
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    common_builder_methods!();

    pub fn build(self) -> EntityResult<Thing> {
        if !(present(&self.label) || self.common.has_url()) {
            return Err(insufficient(
                "Thing",
                "Provide a label or a URL.",
            ));
        }
        let mut entity = self.common.entity(EntityClass::Thing);
        if let Some(label) = self.label {
            entity.set_attribute("label", label);
        }
        Ok(Thing { entity })
    }
}
