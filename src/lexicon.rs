//! Word-set indices used by fuzzy correction and swipe resolution.

use ahash::{AHashMap, AHashSet};

use crate::text::{fold, normalize_word, WordShape, LEXICON_SHAPE};

/// A lexicon word together with its folded form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexiconEntry {
    pub word: String,
    pub folded: String,
}

/// Immutable word-set index built once from a raw word collection.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    words: AHashSet<String>,
    folded: AHashSet<String>,
    by_first: AHashMap<char, Vec<LexiconEntry>>,
    by_prefix2: AHashMap<String, Vec<LexiconEntry>>,
    canonical: AHashMap<String, String>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every index in one pass using the autocorrect word shape.
    pub fn build<I, S>(raw_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::build_with_shape(raw_words, LEXICON_SHAPE)
    }

    pub fn build_with_shape<I, S>(raw_words: I, shape: WordShape) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lexicon = Self::new();

        for raw in raw_words {
            let word = normalize_word(raw.as_ref());
            if !shape.accepts(&word) || lexicon.words.contains(&word) {
                continue;
            }
            let folded = fold(&word);
            let entry = LexiconEntry {
                word: word.clone(),
                folded: folded.clone(),
            };

            if let Some(first) = folded.chars().next() {
                lexicon.by_first.entry(first).or_default().push(entry.clone());
            }
            let prefix2: String = folded.chars().take(2).collect();
            if prefix2.chars().count() == 2 {
                lexicon.by_prefix2.entry(prefix2).or_default().push(entry);
            }

            lexicon
                .canonical
                .entry(folded.clone())
                .and_modify(|current| {
                    if shorter_first(&word, current) {
                        *current = word.clone();
                    }
                })
                .or_insert_with(|| word.clone());

            lexicon.folded.insert(folded);
            lexicon.words.insert(word);
        }

        for bucket in lexicon
            .by_first
            .values_mut()
            .chain(lexicon.by_prefix2.values_mut())
        {
            bucket.sort_by(|a, b| {
                a.word
                    .chars()
                    .count()
                    .cmp(&b.word.chars().count())
                    .then_with(|| a.word.cmp(&b.word))
            });
        }

        lexicon
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn contains_folded(&self, folded: &str) -> bool {
        self.folded.contains(folded)
    }

    /// Canonical (shortest) word for a folded form.
    pub fn canonical(&self, folded: &str) -> Option<&str> {
        self.canonical.get(folded).map(String::as_str)
    }

    /// Words whose folded form starts with `first`.
    pub fn bucket(&self, first: char) -> &[LexiconEntry] {
        self.by_first.get(&first).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Words whose folded form starts with the two-character `prefix`.
    pub fn prefix_bucket(&self, prefix: &str) -> &[LexiconEntry] {
        self.by_prefix2.get(prefix).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

fn shorter_first(candidate: &str, current: &str) -> bool {
    let (a, b) = (candidate.chars().count(), current.chars().count());
    a < b || (a == b && candidate < current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_indices() {
        let lexicon = Lexicon::build(["École", "ecoles", "été", "hello", "help", "x", "b4d"]);
        assert_eq!(lexicon.len(), 5);
        assert!(lexicon.contains("école"));
        assert!(lexicon.contains_folded("ecole"));
        assert!(!lexicon.contains("x"));
        assert!(!lexicon.contains("b4d"));

        let e_bucket: Vec<&str> = lexicon.bucket('e').iter().map(|e| e.word.as_str()).collect();
        assert_eq!(e_bucket, vec!["été", "école", "ecoles"]);
        assert_eq!(lexicon.prefix_bucket("he").len(), 2);
    }

    #[test]
    fn test_canonical_prefers_shortest() {
        let lexicon = Lexicon::build(["cote", "côte", "coté", "côté"]);
        // All fold to "cote"; equal lengths fall back to lexicographic order.
        assert_eq!(lexicon.canonical("cote"), Some("cote"));
        assert_eq!(lexicon.canonical("nope"), None);
    }

    #[test]
    fn test_empty_lexicon() {
        let lexicon = Lexicon::new();
        assert!(lexicon.is_empty());
        assert!(lexicon.bucket('a').is_empty());
    }
}
