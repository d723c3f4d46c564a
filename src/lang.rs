//! ISO 639-1 language codes used to tag query literals.
//!
//! Multilingual endpoints need every quoted literal suffixed with its
//! language (`"Obama"@en`), and the Wikidata label service takes a list of
//! codes. [`Language`] is the closed set of two-letter codes accepted as a
//! query language.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EntityError;

macro_rules! languages {
    ($($variant:ident => $code:literal),+ $(,)?) => {
        /// An ISO 639-1 language.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "&'static str")]
        pub enum Language {
            $($variant),+
        }

        impl Language {
            /// Every known language, ordered by code.
            pub const ALL: &'static [Language] = &[$(Language::$variant),+];

            /// The two-letter ISO 639-1 code.
            pub fn code(self) -> &'static str {
                match self {
                    $(Language::$variant => $code),+
                }
            }

            /// Look a language up by its two-letter code (case-insensitive).
            pub fn from_code(code: &str) -> Option<Self> {
                let code = code.trim().to_ascii_lowercase();
                match code.as_str() {
                    $($code => Some(Language::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

languages! {
    Afar => "aa",
    Abkhazian => "ab",
    Avestan => "ae",
    Afrikaans => "af",
    Akan => "ak",
    Amharic => "am",
    Aragonese => "an",
    Arabic => "ar",
    Assamese => "as",
    Avaric => "av",
    Aymara => "ay",
    Azerbaijani => "az",
    Bashkir => "ba",
    Belarusian => "be",
    Bulgarian => "bg",
    Bihari => "bh",
    Bislama => "bi",
    Bambara => "bm",
    Bengali => "bn",
    Tibetan => "bo",
    Breton => "br",
    Bosnian => "bs",
    Catalan => "ca",
    Chechen => "ce",
    Chamorro => "ch",
    Corsican => "co",
    Cree => "cr",
    Czech => "cs",
    Chuvash => "cv",
    Welsh => "cy",
    Danish => "da",
    German => "de",
    Divehi => "dv",
    Dzongkha => "dz",
    Ewe => "ee",
    Greek => "el",
    English => "en",
    Esperanto => "eo",
    Spanish => "es",
    Estonian => "et",
    Basque => "eu",
    Persian => "fa",
    Fulah => "ff",
    Finnish => "fi",
    Fijian => "fj",
    Faroese => "fo",
    French => "fr",
    WesternFrisian => "fy",
    Irish => "ga",
    ScottishGaelic => "gd",
    Galician => "gl",
    Guarani => "gn",
    Gujarati => "gu",
    Manx => "gv",
    Hausa => "ha",
    Hebrew => "he",
    Hindi => "hi",
    HiriMotu => "ho",
    Croatian => "hr",
    Haitian => "ht",
    Hungarian => "hu",
    Armenian => "hy",
    Herero => "hz",
    Indonesian => "id",
    Interlingue => "ie",
    Igbo => "ig",
    SichuanYi => "ii",
    Inupiaq => "ik",
    Ido => "io",
    Icelandic => "is",
    Italian => "it",
    Inuktitut => "iu",
    Japanese => "ja",
    Javanese => "jv",
    Georgian => "ka",
    Kongo => "kg",
    Kikuyu => "ki",
    Kuanyama => "kj",
    Kazakh => "kk",
    Kalaallisut => "kl",
    CentralKhmer => "km",
    Kannada => "kn",
    Korean => "ko",
    Kanuri => "kr",
    Kashmiri => "ks",
    Kurdish => "ku",
    Komi => "kv",
    Cornish => "kw",
    Kirghiz => "ky",
    Latin => "la",
    Luxembourgish => "lb",
    Ganda => "lg",
    Limburgan => "li",
    Lingala => "ln",
    Lao => "lo",
    Lithuanian => "lt",
    LubaKatanga => "lu",
    Latvian => "lv",
    Malagasy => "mg",
    Marshallese => "mh",
    Maori => "mi",
    Macedonian => "mk",
    Malayalam => "ml",
    Mongolian => "mn",
    Marathi => "mr",
    Malay => "ms",
    Maltese => "mt",
    Burmese => "my",
    Nauru => "na",
    NorwegianBokmal => "nb",
    NorthNdebele => "nd",
    Nepali => "ne",
    Ndonga => "ng",
    Dutch => "nl",
    NorwegianNynorsk => "nn",
    Norwegian => "no",
    SouthNdebele => "nr",
    Navajo => "nv",
    Chichewa => "ny",
    Ojibwa => "oj",
    Oromo => "om",
    Oriya => "or",
    Ossetian => "os",
    Panjabi => "pa",
    Pali => "pi",
    Polish => "pl",
    Pushto => "ps",
    Portuguese => "pt",
    Quechua => "qu",
    Romansh => "rm",
    Rundi => "rn",
    Romanian => "ro",
    Russian => "ru",
    Kinyarwanda => "rw",
    Sanskrit => "sa",
    Sardinian => "sc",
    Sindhi => "sd",
    NorthernSami => "se",
    Sango => "sg",
    Sinhala => "si",
    Slovak => "sk",
    Slovenian => "sl",
    Samoan => "sm",
    Shona => "sn",
    Somali => "so",
    Albanian => "sq",
    Serbian => "sr",
    Swati => "ss",
    SouthernSotho => "st",
    Sundanese => "su",
    Swedish => "sv",
    Swahili => "sw",
    Tamil => "ta",
    Telugu => "te",
    Tajik => "tg",
    Thai => "th",
    Tigrinya => "ti",
    Turkmen => "tk",
    Tagalog => "tl",
    Tswana => "tn",
    Tonga => "to",
    Turkish => "tr",
    Tsonga => "ts",
    Tatar => "tt",
    Twi => "tw",
    Tahitian => "ty",
    Uighur => "ug",
    Ukrainian => "uk",
    Urdu => "ur",
    Uzbek => "uz",
    Venda => "ve",
    Vietnamese => "vi",
    Volapuk => "vo",
    Walloon => "wa",
    Wolof => "wo",
    Xhosa => "xh",
    Yiddish => "yi",
    Yoruba => "yo",
    Zhuang => "za",
    Chinese => "zh",
    Zulu => "zu",
}

impl Default for Language {
    fn default() -> Self {
        Language::English
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = EntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_code(s).ok_or_else(|| EntityError::UnknownLanguage {
            code: s.to_string(),
        })
    }
}

impl TryFrom<String> for Language {
    type Error = EntityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Language> for &'static str {
    fn from(lang: Language) -> Self {
        lang.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_english() {
        assert_eq!(Language::default(), Language::English);
        assert_eq!(Language::default().code(), "en");
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("fr".parse::<Language>().unwrap(), Language::French);
        assert_eq!(" DE ".parse::<Language>().unwrap(), Language::German);
    }

    #[test]
    fn unknown_code_is_rejected() {
        let err = "xx".parse::<Language>().unwrap_err();
        assert!(matches!(err, EntityError::UnknownLanguage { .. }));
    }

    #[test]
    fn codes_are_unique() {
        let mut codes: Vec<&str> = Language::ALL.iter().map(|l| l.code()).collect();
        let total = codes.len();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), total);
    }

    #[test]
    fn serde_uses_the_code() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            lang: Language,
        }
        let text = toml::to_string(&Wrapper {
            lang: Language::Japanese,
        })
        .unwrap();
        assert!(text.contains("\"ja\""));
        let back: Wrapper = toml::from_str(&text).unwrap();
        assert_eq!(back.lang, Language::Japanese);
    }
}
