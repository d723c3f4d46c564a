//! People, and what can be derived from their resolved attributes without
//! further querying.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::Serialize;

use super::{Common, common_builder_methods, entity_wrapper, insufficient, present};
use crate::entity::{AttrValue, Attributes, Entity};
use crate::error::EntityResult;
use crate::query::split_language_suffix;
use crate::vocab::{EntityClass, Vocabulary};

static RE_DATE_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9\-]+[0-9TZ:\-]*$").unwrap());

/// A person, identified by a URL, a full name, or a last name together with
/// a first name or a life year.
#[derive(Debug, Clone)]
pub struct Person {
    entity: Entity,
}

entity_wrapper!(Person);

impl Person {
    pub fn builder() -> PersonBuilder {
        PersonBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PersonBuilder {
    full_name: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    birth_year: Option<String>,
    death_year: Option<String>,
    common: Common,
}

impl PersonBuilder {
    pub fn full_name(mut self, name: impl Into<String>) -> Self {
        self.full_name = Some(name.into());
        self
    }

    pub fn first_name(mut self, name: impl Into<String>) -> Self {
        self.first_name = Some(name.into());
        self
    }

    pub fn last_name(mut self, name: impl Into<String>) -> Self {
        self.last_name = Some(name.into());
        self
    }

    pub fn birth_year(mut self, year: i32) -> Self {
        self.birth_year = Some(year.to_string());
        self
    }

    pub fn death_year(mut self, year: i32) -> Self {
        self.death_year = Some(year.to_string());
        self
    }

    common_builder_methods!();

    pub fn build(self) -> EntityResult<Person> {
        let partial = present(&self.first_name) || present(&self.birth_year) || present(&self.death_year);
        let identified = self.common.has_url()
            || present(&self.full_name)
            || (partial && present(&self.last_name));
        if !identified {
            return Err(insufficient(
                "Person",
                "Provide a URL, a full name, or a last name together with a first name, \
                 a birth year or a death year.",
            ));
        }

        let mut entity = self.common.entity(EntityClass::Person);
        let slots = [
            ("full_name", self.full_name),
            ("first_name", self.first_name),
            ("last_name", self.last_name),
            ("birth_year", self.birth_year),
            ("death_year", self.death_year),
        ];
        for (name, value) in slots {
            if let Some(value) = value {
                entity.set_attribute(name, value);
            }
        }
        Ok(Person { entity })
    }
}

// ── derived information ─────────────────────────────────────────────────

/// What is known about a birth or a death.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LifeEvent {
    /// The first value that parses as a full date.
    pub date: Option<NaiveDate>,
    /// Other date-looking values: later dates and partial ones such as a
    /// bare year.
    pub partial_dates: BTreeSet<String>,
    pub places: BTreeSet<String>,
    pub names: BTreeSet<String>,
    pub causes: BTreeSet<String>,
    pub other: BTreeSet<String>,
}

impl LifeEvent {
    pub fn is_empty(&self) -> bool {
        self == &LifeEvent::default()
    }
}

/// Canonical gender codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Gender {
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "MtF")]
    TransFemale,
    #[serde(rename = "FtM")]
    TransMale,
    #[serde(rename = "intersex")]
    Intersex,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Gender {
    pub fn code(self) -> &'static str {
        match self {
            Gender::Female => "F",
            Gender::Male => "M",
            Gender::TransFemale => "MtF",
            Gender::TransMale => "FtM",
            Gender::Intersex => "intersex",
            Gender::Unknown => "unknown",
        }
    }

    /// Map a gender literal or Wikidata item to a code.
    pub fn from_value(value: &str) -> Gender {
        let (text, _) = split_language_suffix(value.trim());
        let local = text.rsplit_once(':').map_or(text, |(_, local)| local);
        match local {
            "female" | "Q6581072" => Gender::Female,
            "male" | "Q6581097" => Gender::Male,
            "Q1052281" => Gender::TransFemale,
            "Q2449503" => Gender::TransMale,
            "Q1097630" => Gender::Intersex,
            _ => Gender::Unknown,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Authority files a person can be identified in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalIdSystem {
    Ark,
    Viaf,
    Bnf,
    Wikidata,
    IdRef,
}

impl ExternalIdSystem {
    pub const ALL: [ExternalIdSystem; 5] = [
        ExternalIdSystem::Ark,
        ExternalIdSystem::Viaf,
        ExternalIdSystem::Bnf,
        ExternalIdSystem::Wikidata,
        ExternalIdSystem::IdRef,
    ];

    /// Whether an identity value belongs to this system.
    pub fn recognizes(self, id: &str) -> bool {
        match self {
            ExternalIdSystem::Ark => id.contains("ark:/"),
            ExternalIdSystem::Viaf => id.contains("viaf"),
            ExternalIdSystem::Bnf => id.contains("data.bnf.fr"),
            ExternalIdSystem::Wikidata => id.contains("wd:") || id.contains("wikidata.org/entity/"),
            ExternalIdSystem::IdRef => id.contains("idref"),
        }
    }
}

fn parse_full_date(value: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

impl Person {
    fn life_event(&self, event: &str) -> LifeEvent {
        let mut info = LifeEvent::default();
        for (key, value) in self.attributes() {
            let key = key.to_lowercase();
            if !key.contains(event) {
                continue;
            }
            for raw in value.values() {
                if raw.matches('-').count() > 4 {
                    continue;
                }
                let (text, _) = split_language_suffix(raw);
                if RE_DATE_LIKE.is_match(text) {
                    match (info.date, parse_full_date(text)) {
                        (None, Some(date)) => info.date = Some(date),
                        _ => {
                            info.partial_dates.insert(text.to_string());
                        }
                    }
                } else if key.contains("place") {
                    info.places.insert(raw.to_string());
                } else if key.contains("name") {
                    info.names.insert(raw.to_string());
                } else if key.contains("cause") || key.contains("manner") {
                    info.causes.insert(raw.to_string());
                } else {
                    info.other.insert(raw.to_string());
                }
            }
        }
        info
    }

    /// Everything known about the birth: date, places, names, …
    pub fn birth_info(&self) -> LifeEvent {
        self.life_event("birth")
    }

    pub fn death_info(&self) -> LifeEvent {
        self.life_event("death")
    }

    /// Gender from the first attribute whose key mentions it.
    pub fn gender(&self) -> Gender {
        self.attributes()
            .iter()
            .find(|(key, _)| key.to_lowercase().contains("gender"))
            .and_then(|(_, value)| value.first())
            .map_or(Gender::Unknown, Gender::from_value)
    }

    /// At most one identifier per authority file, taken from the identity
    /// values.
    pub fn external_ids(&self) -> BTreeMap<ExternalIdSystem, String> {
        let ids = self.uris();
        ExternalIdSystem::ALL
            .into_iter()
            .filter_map(|system| {
                ids.iter()
                    .find(|id| system.recognizes(id))
                    .map(|id| (system, id.clone()))
            })
            .collect()
    }

    /// Name attributes: keys containing "name" plus the vocabulary's name
    /// predicates that do not. Values that look like identifiers (five or
    /// more dashes) are dropped.
    pub fn names(&self) -> Attributes {
        let name_predicates: BTreeSet<String> = Vocabulary::bundled()
            .attribute_predicates_for(EntityClass::Person)
            .into_iter()
            .filter(|(attribute, _)| attribute.contains("name"))
            .flat_map(|(_, predicates)| predicates)
            .filter(|p| !p.contains("name"))
            .map(|p| crate::vocab::normalize_term(&p))
            .collect();

        let mut names = Attributes::new();
        for (key, value) in self.attributes() {
            if !key.contains("name") && !name_predicates.contains(key) {
                continue;
            }
            let kept: BTreeSet<String> = value
                .values()
                .into_iter()
                .filter(|v| v.matches('-').count() < 5)
                .map(str::to_string)
                .collect();
            match kept.len() {
                0 => {}
                1 => {
                    if let Some(only) = kept.into_iter().next() {
                        names.insert(key.clone(), AttrValue::Single(only));
                    }
                }
                _ => {
                    names.insert(key.clone(), AttrValue::Many(kept));
                }
            }
        }
        names
    }
}
