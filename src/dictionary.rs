//! Dictionary assets and the immutable snapshot the engine reads from.
//!
//! # Asset Format
//!
//! Unigram assets hold one entry per line, in any of these shapes:
//! ```text
//! # Comments start with #
//! 1 the 1000000
//! hello 15000
//! bonjour
//! ```
//! A missing frequency defaults to 1. Bigram assets hold
//! `previous current frequency` triples. Lines that fail word-shape
//! validation are skipped; duplicate entries keep the maximum frequency.
//!
//! # Embedded Assets
//!
//! A compact French and English asset pair is compiled into the binary so
//! the engine is usable without external files. Asset paths supplied at
//! runtime replace the embedded data per language.

use std::path::{Path, PathBuf};

use ahash::{AHashMap, AHashSet};
use tracing::{info, warn};

use crate::curated;
use crate::error::AssetError;
use crate::language::Language;
use crate::lexicon::Lexicon;
use crate::model::LanguageModel;
use crate::text::{fold, normalize_word, LEXICON_SHAPE, NGRAM_SHAPE};
use crate::trie::FrequencyTrie;

const EMBEDDED_EN_UNIGRAMS: &str = include_str!("../dictionary/en_unigrams.txt");
const EMBEDDED_EN_BIGRAMS: &str = include_str!("../dictionary/en_bigrams.txt");
const EMBEDDED_FR_UNIGRAMS: &str = include_str!("../dictionary/fr_unigrams.txt");
const EMBEDDED_FR_BIGRAMS: &str = include_str!("../dictionary/fr_bigrams.txt");

/// Parse a unigram asset into `word → frequency`.
pub fn parse_unigram_asset(text: &str) -> AHashMap<String, u64> {
    let mut words: AHashMap<String, u64> = AHashMap::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let (raw_word, frequency) = match parts.as_slice() {
            [word] => (*word, Some(1)),
            [word, frequency] => (*word, frequency.parse::<u64>().ok()),
            [rank, word, frequency] if rank.parse::<u64>().is_ok() => {
                (*word, frequency.parse::<u64>().ok())
            }
            _ => continue,
        };

        let Some(frequency) = frequency.filter(|f| *f > 0) else {
            continue;
        };
        let word = normalize_word(raw_word);
        if !LEXICON_SHAPE.accepts(&word) {
            continue;
        }

        let slot = words.entry(word).or_insert(0);
        *slot = (*slot).max(frequency);
    }

    words
}

/// Parse a bigram asset into `(previous, current, frequency)` triples.
pub fn parse_bigram_asset(text: &str) -> Vec<(String, String, u64)> {
    let mut pairs: AHashMap<(String, String), u64> = AHashMap::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let [previous, current, frequency] = line.split_whitespace().collect::<Vec<_>>()[..]
        else {
            continue;
        };
        let Some(frequency) = frequency.parse::<u64>().ok().filter(|f| *f > 0) else {
            continue;
        };
        let previous = normalize_word(previous);
        let current = normalize_word(current);
        if !LEXICON_SHAPE.accepts(&current) || !NGRAM_SHAPE.accepts(&previous) {
            continue;
        }

        let slot = pairs.entry((previous, current)).or_insert(0);
        *slot = (*slot).max(frequency);
    }

    let mut triples: Vec<(String, String, u64)> = pairs
        .into_iter()
        .map(|((previous, current), frequency)| (previous, current, frequency))
        .collect();
    triples.sort();
    triples
}

/// Everything the engine knows about one language.
#[derive(Debug, Clone)]
pub struct LanguageAssets {
    pub language: Language,
    pub dictionary: FrequencyTrie,
    pub lexicon: Lexicon,
    pub model: LanguageModel,
    core: AHashSet<String>,
}

impl LanguageAssets {
    pub fn empty(language: Language) -> Self {
        Self::from_maps(language, &AHashMap::new(), &[])
    }

    /// Build all indices from in-memory tables.
    pub fn from_maps(
        language: Language,
        unigrams: &AHashMap<String, u64>,
        bigrams: &[(String, String, u64)],
    ) -> Self {
        let mut dictionary = FrequencyTrie::new();
        for (raw, &frequency) in unigrams {
            let word = normalize_word(raw);
            if LEXICON_SHAPE.accepts(&word) {
                dictionary.insert(&word, frequency.min(i64::MAX as u64) as i64);
            }
        }

        let lexicon = Lexicon::build(unigrams.keys());
        let model = LanguageModel::build(
            unigrams.iter().map(|(word, &frequency)| (word.as_str(), frequency)),
            bigrams
                .iter()
                .map(|(previous, current, frequency)| {
                    (previous.as_str(), current.as_str(), *frequency)
                }),
        );
        let core = curated::core_lexicon(language)
            .iter()
            .map(|word| fold(word))
            .collect();

        Self {
            language,
            dictionary,
            lexicon,
            model,
            core,
        }
    }

    pub fn from_text(language: Language, unigram_text: &str, bigram_text: &str) -> Self {
        let unigrams = parse_unigram_asset(unigram_text);
        let bigrams = parse_bigram_asset(bigram_text);
        Self::from_maps(language, &unigrams, &bigrams)
    }

    /// Assets compiled into the binary.
    pub fn embedded(language: Language) -> Self {
        let (unigrams, bigrams) = match language {
            Language::French => (EMBEDDED_FR_UNIGRAMS, EMBEDDED_FR_BIGRAMS),
            Language::English => (EMBEDDED_EN_UNIGRAMS, EMBEDDED_EN_BIGRAMS),
        };
        Self::from_text(language, unigrams, bigrams)
    }

    /// Load assets from files. A missing bigram file is not an error.
    pub fn from_files(
        language: Language,
        unigram_path: &Path,
        bigram_path: Option<&Path>,
    ) -> Result<Self, AssetError> {
        let unigram_text = read_asset(unigram_path)?;
        let unigrams = parse_unigram_asset(&unigram_text);
        if unigrams.is_empty() {
            return Err(AssetError::Empty(unigram_path.display().to_string()));
        }

        let bigrams = match bigram_path {
            Some(path) => parse_bigram_asset(&read_asset(path)?),
            None => Vec::new(),
        };

        info!(
            language = language.code(),
            words = unigrams.len(),
            bigrams = bigrams.len(),
            "loaded dictionary assets from {}",
            unigram_path.display()
        );
        Ok(Self::from_maps(language, &unigrams, &bigrams))
    }

    /// Whether the folded word is one of the curated everyday words.
    pub fn is_core(&self, folded: &str) -> bool {
        self.core.contains(folded)
    }

    pub fn is_empty(&self) -> bool {
        self.dictionary.is_empty() && self.model.is_empty()
    }
}

fn read_asset(path: &Path) -> Result<String, AssetError> {
    std::fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Optional asset files per language.
#[derive(Debug, Clone, Default)]
pub struct AssetPaths {
    pub french_unigrams: Option<PathBuf>,
    pub french_bigrams: Option<PathBuf>,
    pub english_unigrams: Option<PathBuf>,
    pub english_bigrams: Option<PathBuf>,
}

impl AssetPaths {
    fn for_language(&self, language: Language) -> (Option<&Path>, Option<&Path>) {
        match language {
            Language::French => (
                self.french_unigrams.as_deref(),
                self.french_bigrams.as_deref(),
            ),
            Language::English => (
                self.english_unigrams.as_deref(),
                self.english_bigrams.as_deref(),
            ),
        }
    }
}

/// A fully built, immutable pair of language assets.
///
/// Snapshots are shared behind an `Arc` and replaced wholesale, never
/// mutated after construction.
#[derive(Debug, Clone)]
pub struct DictionarySnapshot {
    french: LanguageAssets,
    english: LanguageAssets,
}

impl DictionarySnapshot {
    pub fn new(french: LanguageAssets, english: LanguageAssets) -> Self {
        Self { french, english }
    }

    pub fn empty() -> Self {
        Self::new(
            LanguageAssets::empty(Language::French),
            LanguageAssets::empty(Language::English),
        )
    }

    pub fn embedded() -> Self {
        Self::new(
            LanguageAssets::embedded(Language::French),
            LanguageAssets::embedded(Language::English),
        )
    }

    /// Load each language from its files, or the embedded assets when no
    /// file is given. A language whose files fail to load is left empty.
    pub fn load(paths: &AssetPaths) -> Self {
        let load_one = |language: Language| match paths.for_language(language) {
            (Some(unigrams), bigrams) => {
                LanguageAssets::from_files(language, unigrams, bigrams).unwrap_or_else(|err| {
                    warn!(language = language.code(), "dictionary load failed, using empty: {err}");
                    LanguageAssets::empty(language)
                })
            }
            (None, _) => LanguageAssets::embedded(language),
        };
        Self::new(load_one(Language::French), load_one(Language::English))
    }

    pub fn get(&self, language: Language) -> &LanguageAssets {
        match language {
            Language::French => &self.french,
            Language::English => &self.english,
        }
    }

    pub fn word_count(&self) -> usize {
        self.french.dictionary.word_count() + self.english.dictionary.word_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unigram_line_shapes() {
        let text = "# header\n1 the 1000\nhello 15\nbonjour\n\nbad line with four\nx 5\nzero 0\nhello 9\n";
        let words = parse_unigram_asset(text);
        assert_eq!(words.get("the"), Some(&1000));
        assert_eq!(words.get("hello"), Some(&15));
        assert_eq!(words.get("bonjour"), Some(&1));
        assert!(!words.contains_key("x"));
        assert!(!words.contains_key("zero"));
        assert_eq!(words.len(), 3);
    }

    #[test]
    fn test_parse_bigram_asset_keeps_max() {
        let text = "i want 4000\ni want 4500\ni will\nje suis 300\n";
        let bigrams = parse_bigram_asset(text);
        assert_eq!(
            bigrams,
            vec![
                ("i".to_string(), "want".to_string(), 4500),
                ("je".to_string(), "suis".to_string(), 300),
            ]
        );
    }

    #[test]
    fn test_embedded_assets_load() {
        let snapshot = DictionarySnapshot::embedded();
        assert!(snapshot.get(Language::English).dictionary.contains("hello"));
        assert!(snapshot.get(Language::French).dictionary.contains("bonjour"));
        assert!(snapshot.word_count() > 100);
    }

    #[test]
    fn test_every_embedded_entry_is_kept() {
        let entries = |text: &str| {
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .count()
        };
        for unigrams in [EMBEDDED_EN_UNIGRAMS, EMBEDDED_FR_UNIGRAMS] {
            assert_eq!(parse_unigram_asset(unigrams).len(), entries(unigrams));
        }
        for bigrams in [EMBEDDED_EN_BIGRAMS, EMBEDDED_FR_BIGRAMS] {
            assert_eq!(parse_bigram_asset(bigrams).len(), entries(bigrams));
        }
    }

    #[test]
    fn test_missing_file_degrades_to_empty() {
        let paths = AssetPaths {
            english_unigrams: Some(PathBuf::from("/definitely/not/here.txt")),
            ..AssetPaths::default()
        };
        let snapshot = DictionarySnapshot::load(&paths);
        assert!(snapshot.get(Language::English).is_empty());
        assert!(!snapshot.get(Language::French).is_empty());
    }

    #[test]
    fn test_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let unigram_path = dir.path().join("words.txt");
        std::fs::write(&unigram_path, "maison 50\nmaisons 20\n").unwrap();
        let assets = LanguageAssets::from_files(Language::French, &unigram_path, None).unwrap();
        assert_eq!(assets.dictionary.frequency("maison"), Some(50));
        assert!(assets.lexicon.contains("maisons"));
    }
}
