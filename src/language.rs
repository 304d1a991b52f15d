//! Languages, active language modes and the previous-word language hint.

use serde::{Deserialize, Serialize};

use crate::curated;
use crate::text::normalize_word;

/// One of the two modeled lexicons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    French,
    English,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::French, Language::English];

    pub fn other(self) -> Language {
        match self {
            Language::French => Language::English,
            Language::English => Language::French,
        }
    }

    /// Letters tried by single-position substitutions and insertions.
    pub fn alphabet(self) -> &'static [char] {
        match self {
            Language::French => curated::FRENCH_ALPHABET,
            Language::English => curated::ENGLISH_ALPHABET,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Language::French => 0,
            Language::English => 1,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::French => "fr",
            Language::English => "en",
        }
    }
}

/// Which lexicons are consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageMode {
    FrenchOnly,
    EnglishOnly,
    #[default]
    Bilingual,
}

impl LanguageMode {
    pub fn languages(self) -> &'static [Language] {
        match self {
            LanguageMode::FrenchOnly => &[Language::French],
            LanguageMode::EnglishOnly => &[Language::English],
            LanguageMode::Bilingual => &Language::ALL,
        }
    }

    pub fn includes(self, language: Language) -> bool {
        self.languages().contains(&language)
    }

    /// Parse the short names accepted on the command line.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "fr" | "french" | "french_only" => Some(LanguageMode::FrenchOnly),
            "en" | "english" | "english_only" => Some(LanguageMode::EnglishOnly),
            "both" | "bilingual" | "fr+en" | "en+fr" => Some(LanguageMode::Bilingual),
            _ => None,
        }
    }
}

/// Language suggested by the previous word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageHint {
    French,
    English,
    Unknown,
}

impl LanguageHint {
    /// Match the previous word against the closed functional-word sets.
    pub fn from_previous_word(previous: Option<&str>) -> Self {
        let Some(previous) = previous else {
            return LanguageHint::Unknown;
        };
        let word = normalize_word(previous);
        let french = curated::FRENCH_FUNCTION_WORDS.contains(&word.as_str());
        let english = curated::ENGLISH_FUNCTION_WORDS.contains(&word.as_str());
        match (french, english) {
            (true, false) => LanguageHint::French,
            (false, true) => LanguageHint::English,
            _ => LanguageHint::Unknown,
        }
    }

    /// The hint, restricted to what the mode allows.
    pub fn resolve(previous: Option<&str>, mode: LanguageMode) -> Self {
        match mode {
            LanguageMode::FrenchOnly => LanguageHint::French,
            LanguageMode::EnglishOnly => LanguageHint::English,
            LanguageMode::Bilingual => Self::from_previous_word(previous),
        }
    }

    pub fn language(self) -> Option<Language> {
        match self {
            LanguageHint::French => Some(Language::French),
            LanguageHint::English => Some(Language::English),
            LanguageHint::Unknown => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_from_previous_word() {
        assert_eq!(LanguageHint::from_previous_word(Some("I")), LanguageHint::English);
        assert_eq!(LanguageHint::from_previous_word(Some("the")), LanguageHint::English);
        assert_eq!(LanguageHint::from_previous_word(Some("Je")), LanguageHint::French);
        assert_eq!(LanguageHint::from_previous_word(Some("les")), LanguageHint::French);
        assert_eq!(LanguageHint::from_previous_word(Some("maison")), LanguageHint::Unknown);
        assert_eq!(LanguageHint::from_previous_word(None), LanguageHint::Unknown);
    }

    #[test]
    fn test_mode_restricts_hint() {
        assert_eq!(
            LanguageHint::resolve(Some("je"), LanguageMode::EnglishOnly),
            LanguageHint::English
        );
        assert_eq!(LanguageMode::FrenchOnly.languages(), &[Language::French]);
        assert!(LanguageMode::Bilingual.includes(Language::English));
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(LanguageMode::parse("FR"), Some(LanguageMode::FrenchOnly));
        assert_eq!(LanguageMode::parse("both"), Some(LanguageMode::Bilingual));
        assert_eq!(LanguageMode::parse("de"), None);
    }
}
