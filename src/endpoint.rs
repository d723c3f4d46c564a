//! The SPARQL endpoints queries can be sent to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A supported SPARQL endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    /// English DBpedia.
    Dbpedia,
    /// French DBpedia chapter.
    DbpediaFr,
    /// Wikidata query service.
    Wikidata,
    /// data.bnf.fr, the Bibliothèque nationale de France.
    Bnf,
}

impl Endpoint {
    /// Every endpoint, used to complement keep-only lists.
    pub const ALL: [Endpoint; 4] = [
        Endpoint::Dbpedia,
        Endpoint::DbpediaFr,
        Endpoint::Wikidata,
        Endpoint::Bnf,
    ];

    /// Endpoint used when a query names none.
    pub const DEFAULT: Endpoint = Endpoint::Dbpedia;

    /// The SPARQL service URL.
    pub fn url(self) -> &'static str {
        match self {
            Endpoint::Dbpedia => "http://dbpedia.org/sparql",
            Endpoint::DbpediaFr => "http://fr.dbpedia.org/sparql",
            Endpoint::Wikidata => "https://query.wikidata.org/sparql",
            Endpoint::Bnf => "http://data.bnf.fr/sparql",
        }
    }

    /// Short name, as accepted on the command line and in config files.
    pub fn name(self) -> &'static str {
        match self {
            Endpoint::Dbpedia => "dbpedia",
            Endpoint::DbpediaFr => "dbpedia_fr",
            Endpoint::Wikidata => "wikidata",
            Endpoint::Bnf => "bnf",
        }
    }

    /// Whether literals sent to this endpoint must carry a language tag.
    pub fn is_multilingual(self) -> bool {
        matches!(
            self,
            Endpoint::Dbpedia | Endpoint::DbpediaFr | Endpoint::Wikidata
        )
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Endpoint::DEFAULT
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Endpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace('-', "_");
        Endpoint::ALL
            .into_iter()
            .find(|e| e.name() == needle || e.url() == s.trim())
            .ok_or_else(|| {
                format!("unknown endpoint \"{s}\" (expected one of: dbpedia, dbpedia_fr, wikidata, bnf)")
            })
    }
}
