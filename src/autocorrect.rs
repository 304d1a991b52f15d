//! Dictionary-backed single-word autocorrection.
//!
//! # Algorithm
//!
//! 1. Normalize the word and reject anything outside 2–24 characters.
//! 2. Resolve the language hint from the previous word.
//! 3. Answer from the LRU cache when possible.
//! 4. Known words are never corrected.
//! 5. Generate every edit at distance 1 (deletions, adjacent
//!    transpositions, substitutions and insertions over the language
//!    alphabet) and keep those present in the dictionary.
//! 6. Rank by frequency, then distance, then length, then spelling.
//!
//! Distance 2 is searched only when `max_edit_distance` allows it and
//! distance 1 produced nothing. It is off by default since its candidate
//! set grows quadratically with word length.

use std::cmp::Ordering;

use ahash::AHashSet;
use tracing::trace;

use crate::cache::{CacheKey, LookupCache};
use crate::context::LookupContext;
use crate::dictionary::LanguageAssets;
use crate::language::{Language, LanguageHint, LanguageMode};
use crate::text::{normalize_word, LEXICON_SHAPE};

/// A dictionary word reachable from the input by a few edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub word: String,
    pub frequency: u64,
    pub distance: usize,
    pub language: Language,
}

/// Higher frequency first, then lower distance, shorter length, spelling.
fn candidate_order(a: &Candidate, b: &Candidate) -> Ordering {
    b.frequency
        .cmp(&a.frequency)
        .then_with(|| a.distance.cmp(&b.distance))
        .then_with(|| a.word.chars().count().cmp(&b.word.chars().count()))
        .then_with(|| a.word.cmp(&b.word))
}

pub struct AutocorrectEngine {
    cache: LookupCache<Option<String>>,
    max_edit_distance: usize,
}

impl AutocorrectEngine {
    pub fn new(max_edit_distance: usize, cache_capacity: usize) -> Self {
        Self {
            cache: LookupCache::new(cache_capacity).with_eviction_callback(|key| {
                trace!(token = %key.token, "correction cache evicted entry");
            }),
            max_edit_distance: max_edit_distance.clamp(1, 2),
        }
    }

    /// Best correction for `word`, or `None` when it is known or nothing
    /// close enough exists. Never returns the input unchanged.
    pub fn correct(
        &mut self,
        ctx: &LookupContext<'_>,
        word: &str,
        previous: Option<&str>,
    ) -> Option<String> {
        let word = normalize_word(word);
        let len = word.chars().count();
        if len < LEXICON_SHAPE.min || len > LEXICON_SHAPE.max {
            return None;
        }

        let previous = previous.map(normalize_word);
        let hint = LanguageHint::resolve(previous.as_deref(), ctx.mode);
        let key = CacheKey::new(ctx.mode, hint, previous.as_deref(), &word);
        if let Some(cached) = self.cache.get(&key) {
            return cached;
        }

        let result = self
            .compute(ctx, &word, hint)
            .filter(|corrected| *corrected != word);
        trace!(word = %word, ?hint, result = ?result, "autocorrect");
        self.cache.put(key, result.clone());
        result
    }

    fn compute(&self, ctx: &LookupContext<'_>, word: &str, hint: LanguageHint) -> Option<String> {
        if is_known(ctx, word) {
            return None;
        }

        let best = match (ctx.mode, hint.language()) {
            (LanguageMode::Bilingual, Some(primary)) => self
                .best_in(ctx, ctx.assets(primary), word)
                .or_else(|| self.best_in(ctx, ctx.assets(primary.other()), word)),
            (LanguageMode::Bilingual, None) => {
                let french = self.best_in(ctx, ctx.assets(Language::French), word);
                let english = self.best_in(ctx, ctx.assets(Language::English), word);
                match (french, english) {
                    (Some(fr), Some(en)) => Some(
                        if candidate_order(&fr, &en) == Ordering::Greater {
                            en
                        } else {
                            fr
                        },
                    ),
                    (fr, en) => fr.or(en),
                }
            }
            (mode, _) => mode
                .languages()
                .iter()
                .filter_map(|&language| self.best_in(ctx, ctx.assets(language), word))
                .min_by(candidate_order),
        };

        best.map(|candidate| candidate.word)
    }

    /// Best candidate within one language, by increasing distance tier.
    fn best_in(&self, ctx: &LookupContext<'_>, assets: &LanguageAssets, word: &str) -> Option<Candidate> {
        if assets.dictionary.is_empty() {
            return None;
        }

        let alphabet = assets.language.alphabet();
        let mut frontier: AHashSet<String> = AHashSet::new();
        frontier.insert(word.to_string());
        let mut seen: AHashSet<String> = frontier.clone();

        for distance in 1..=self.max_edit_distance {
            let mut next = AHashSet::new();
            for base in &frontier {
                for edit in edits1(base, alphabet) {
                    if seen.insert(edit.clone()) {
                        next.insert(edit);
                    }
                }
            }

            let best = next
                .iter()
                .filter_map(|edit| {
                    let frequency = assets.dictionary.frequency(edit)?;
                    if ctx.rejections.is_suppressed(word, edit) {
                        return None;
                    }
                    Some(Candidate {
                        word: edit.clone(),
                        frequency,
                        distance,
                        language: assets.language,
                    })
                })
                .min_by(candidate_order);
            if best.is_some() {
                return best;
            }
            frontier = next;
        }

        None
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

/// Whether any active dictionary, or the user's own vocabulary, knows `word`.
pub fn is_known(ctx: &LookupContext<'_>, word: &str) -> bool {
    ctx.active().any(|assets| assets.dictionary.contains(word)) || ctx.learning.is_personal_word(word)
}

/// Every string one edit away from `word`, within the lexicon length bounds.
pub fn edits1(word: &str, alphabet: &[char]) -> AHashSet<String> {
    let chars: Vec<char> = word.chars().collect();
    let len = chars.len();
    let mut edits = AHashSet::with_capacity(len * (alphabet.len() * 2 + 2));

    let mut push = |candidate: Vec<char>| {
        let count = candidate.len();
        if count >= LEXICON_SHAPE.min && count <= LEXICON_SHAPE.max {
            edits.insert(candidate.into_iter().collect::<String>());
        }
    };

    // Deletions.
    for i in 0..len {
        let mut candidate = chars.clone();
        candidate.remove(i);
        push(candidate);
    }
    // Adjacent transpositions.
    for i in 0..len.saturating_sub(1) {
        if chars[i] != chars[i + 1] {
            let mut candidate = chars.clone();
            candidate.swap(i, i + 1);
            push(candidate);
        }
    }
    // Substitutions.
    for i in 0..len {
        for &c in alphabet {
            if c != chars[i] {
                let mut candidate = chars.clone();
                candidate[i] = c;
                push(candidate);
            }
        }
    }
    // Insertions.
    for i in 0..=len {
        for &c in alphabet {
            let mut candidate = chars.clone();
            candidate.insert(i, c);
            push(candidate);
        }
    }

    edits.remove(word);
    edits
}
