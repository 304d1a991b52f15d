//! Per-language unigram/bigram model with precomputed rankings.
//!
//! Every ranked list uses the same order: descending frequency, then
//! ascending length, then lexicographic.

use std::cmp::Ordering;

use ahash::AHashMap;

use crate::text::{normalize_word, NGRAM_SHAPE};

/// A word with its model frequency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedWord {
    pub word: String,
    pub frequency: u64,
}

/// Ordering shared by every ranked list.
pub fn rank_order(a: &RankedWord, b: &RankedWord) -> Ordering {
    b.frequency
        .cmp(&a.frequency)
        .then_with(|| a.word.chars().count().cmp(&b.word.chars().count()))
        .then_with(|| a.word.cmp(&b.word))
}

#[derive(Debug, Clone, Default)]
pub struct LanguageModel {
    unigrams: AHashMap<String, u64>,
    top_unigrams: Vec<RankedWord>,
    /// First letter → indices into `top_unigrams`, in rank order.
    by_first: AHashMap<char, Vec<u32>>,
    bigrams: AHashMap<String, Vec<RankedWord>>,
}

impl LanguageModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a unigram map and `(previous, current, frequency)` triples.
    ///
    /// Entries failing the n-gram word shape or with zero frequency are
    /// dropped; duplicates keep the maximum frequency.
    pub fn build<'a, U, B>(unigrams: U, bigrams: B) -> Self
    where
        U: IntoIterator<Item = (&'a str, u64)>,
        B: IntoIterator<Item = (&'a str, &'a str, u64)>,
    {
        let mut unigram_map: AHashMap<String, u64> = AHashMap::new();
        for (raw, frequency) in unigrams {
            let word = normalize_word(raw);
            if frequency == 0 || !NGRAM_SHAPE.accepts(&word) {
                continue;
            }
            let slot = unigram_map.entry(word).or_insert(0);
            *slot = (*slot).max(frequency);
        }

        let mut bigram_map: AHashMap<String, AHashMap<String, u64>> = AHashMap::new();
        for (raw_previous, raw_current, frequency) in bigrams {
            let previous = normalize_word(raw_previous);
            let current = normalize_word(raw_current);
            if frequency == 0 || !NGRAM_SHAPE.accepts(&previous) || !NGRAM_SHAPE.accepts(&current)
            {
                continue;
            }
            let slot = bigram_map
                .entry(previous)
                .or_default()
                .entry(current)
                .or_insert(0);
            *slot = (*slot).max(frequency);
        }

        let mut top_unigrams: Vec<RankedWord> = unigram_map
            .iter()
            .map(|(word, &frequency)| RankedWord {
                word: word.clone(),
                frequency,
            })
            .collect();
        top_unigrams.sort_by(rank_order);

        let mut by_first: AHashMap<char, Vec<u32>> = AHashMap::new();
        for (idx, ranked) in top_unigrams.iter().enumerate() {
            if let Some(first) = ranked.word.chars().next() {
                by_first.entry(first).or_default().push(idx as u32);
            }
        }

        let bigrams = bigram_map
            .into_iter()
            .map(|(previous, next)| {
                let mut ranked: Vec<RankedWord> = next
                    .into_iter()
                    .map(|(word, frequency)| RankedWord { word, frequency })
                    .collect();
                ranked.sort_by(rank_order);
                (previous, ranked)
            })
            .collect();

        Self {
            unigrams: unigram_map,
            top_unigrams,
            by_first,
            bigrams,
        }
    }

    pub fn unigram_frequency(&self, word: &str) -> Option<u64> {
        self.unigrams.get(word).copied()
    }

    /// Ranked unigrams starting with `prefix` (all unigrams when empty).
    ///
    /// A word equal to the prefix is skipped.
    pub fn top_unigrams(&self, prefix: &str, limit: usize) -> Vec<RankedWord> {
        let Some(first) = prefix.chars().next() else {
            return self.top_unigrams.iter().take(limit).cloned().collect();
        };
        let Some(indices) = self.by_first.get(&first) else {
            return Vec::new();
        };
        indices
            .iter()
            .map(|&idx| &self.top_unigrams[idx as usize])
            .filter(|ranked| ranked.word.starts_with(prefix) && ranked.word != prefix)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Ranked successors of `previous` starting with (and differing from) `prefix`.
    pub fn bigram_successors(&self, previous: &str, prefix: &str, limit: usize) -> Vec<RankedWord> {
        let Some(next) = self.bigrams.get(previous) else {
            return Vec::new();
        };
        next.iter()
            .filter(|ranked| {
                prefix.is_empty() || (ranked.word.starts_with(prefix) && ranked.word != prefix)
            })
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.unigrams.is_empty() && self.bigrams.is_empty()
    }
}
