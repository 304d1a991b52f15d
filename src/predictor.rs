//! Next-word prediction from the language models plus learned signals.
//!
//! Candidates are gathered per language (bigram successors first, then the
//! prefix-filtered unigram ranking, then trie completions), followed by
//! learned successors and the curated context hints. The gathered order is
//! then re-ranked by subtracting learned boosts, so with nothing learned the
//! model order is kept as is.

use ahash::AHashSet;
use tracing::trace;

use crate::cache::{CacheKey, LookupCache};
use crate::context::LookupContext;
use crate::curated;
use crate::dictionary::LanguageAssets;
use crate::language::{Language, LanguageHint, LanguageMode};
use crate::model::{rank_order, RankedWord};
use crate::text::normalize_word;

/// Predictions returned per call.
pub const MAX_PREDICTIONS: usize = 3;
/// Entries taken from each candidate source before re-ranking.
const POOL_LIMIT: usize = 24;

const UNIGRAM_BOOST: f32 = 0.6;
const BIGRAM_BOOST: f32 = 1.2;
const TRIGRAM_BOOST: f32 = 1.6;
const SENTENCE_BOOST: f32 = 0.5;

pub struct NgramPredictor {
    cache: LookupCache<Vec<String>>,
}

impl NgramPredictor {
    pub fn new(cache_capacity: usize) -> Self {
        Self {
            cache: LookupCache::new(cache_capacity),
        }
    }

    /// Up to three completions of `prefix` given the previous word.
    ///
    /// `sentence` holds the words committed so far in the current sentence,
    /// oldest first; its tail is normally `previous`.
    pub fn predict(
        &mut self,
        ctx: &LookupContext<'_>,
        prefix: &str,
        previous: Option<&str>,
        sentence: &[String],
    ) -> Vec<String> {
        let prefix = normalize_word(prefix);
        let previous = previous.map(normalize_word).filter(|word| !word.is_empty());
        let hint = LanguageHint::resolve(previous.as_deref(), ctx.mode);
        let key = CacheKey::new(ctx.mode, hint, previous.as_deref(), &prefix);
        if let Some(cached) = self.cache.get(&key) {
            return cached;
        }

        let result = self.compute(ctx, &prefix, previous.as_deref(), hint, sentence);
        trace!(prefix = %prefix, ?hint, ?result, "predicted words");
        self.cache.put(key, result.clone());
        result
    }

    fn compute(
        &self,
        ctx: &LookupContext<'_>,
        prefix: &str,
        previous: Option<&str>,
        hint: LanguageHint,
        sentence: &[String],
    ) -> Vec<String> {
        let mut gathered: Vec<String> = Vec::new();

        match (ctx.mode, hint.language()) {
            (LanguageMode::Bilingual, None) => {
                gathered.extend(merged_by_frequency(ctx, prefix, previous));
            }
            (_, hinted) => {
                let mut languages: Vec<Language> = ctx.mode.languages().to_vec();
                if let Some(hinted) = hinted {
                    languages.sort_by_key(|&language| language != hinted);
                }
                for language in languages {
                    gathered.extend(language_candidates(ctx.assets(language), prefix, previous));
                }
            }
        }

        if let Some(previous) = previous {
            gathered.extend(
                ctx.learning
                    .successors(previous, prefix, POOL_LIMIT)
                    .into_iter()
                    .map(|(word, _)| word),
            );
            for assets in ctx.active() {
                gathered.extend(
                    curated::context_hints(assets.language, previous)
                        .iter()
                        .map(|word| word.to_string()),
                );
            }
        }

        let mut seen = AHashSet::new();
        let mut scored: Vec<(f32, String)> = gathered
            .into_iter()
            .filter(|word| prefix.is_empty() || (word.starts_with(prefix) && word != prefix))
            .filter(|word| !ctx.rejections.is_suppressed(prefix, word))
            .filter(|word| seen.insert(word.to_lowercase()))
            .enumerate()
            .map(|(position, word)| {
                let boost = learned_boost(ctx, &word, previous, sentence);
                (position as f32 - boost, word)
            })
            .collect();
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored
            .into_iter()
            .take(MAX_PREDICTIONS)
            .map(|(_, word)| word)
            .collect()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

/// One language's candidates: bigram successors, else the unigram ranking,
/// else trie completions.
fn language_candidates(
    assets: &LanguageAssets,
    prefix: &str,
    previous: Option<&str>,
) -> Vec<String> {
    if let Some(previous) = previous {
        let successors = assets.model.bigram_successors(previous, prefix, POOL_LIMIT);
        if !successors.is_empty() {
            return successors.into_iter().map(|ranked| ranked.word).collect();
        }
    }
    let unigrams = assets.model.top_unigrams(prefix, POOL_LIMIT);
    if !unigrams.is_empty() || prefix.is_empty() {
        return unigrams.into_iter().map(|ranked| ranked.word).collect();
    }
    assets
        .dictionary
        .completions(prefix, POOL_LIMIT)
        .into_iter()
        .map(|(word, _)| word)
        .filter(|word| word != prefix)
        .collect()
}

/// Both languages pooled by raw frequency, bigram entries ahead of unigrams.
fn merged_by_frequency(
    ctx: &LookupContext<'_>,
    prefix: &str,
    previous: Option<&str>,
) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(previous) = previous {
        let mut pool: Vec<RankedWord> = ctx
            .active()
            .flat_map(|assets| assets.model.bigram_successors(previous, prefix, POOL_LIMIT))
            .collect();
        pool.sort_by(rank_order);
        out.extend(pool.into_iter().map(|ranked| ranked.word));
    }

    let mut pool: Vec<RankedWord> = ctx
        .active()
        .flat_map(|assets| assets.model.top_unigrams(prefix, POOL_LIMIT))
        .collect();
    pool.sort_by(rank_order);
    out.extend(pool.into_iter().map(|ranked| ranked.word));

    if out.is_empty() && !prefix.is_empty() {
        let mut pool: Vec<RankedWord> = ctx
            .active()
            .flat_map(|assets| assets.dictionary.completions(prefix, POOL_LIMIT))
            .map(|(word, frequency)| RankedWord { word, frequency })
            .collect();
        pool.sort_by(rank_order);
        out.extend(pool.into_iter().map(|ranked| ranked.word));
    }
    out
}

/// How much the user's own history favours `word` here.
///
/// Sentence words further back than the previous word count less the
/// further they are.
fn learned_boost(
    ctx: &LookupContext<'_>,
    word: &str,
    previous: Option<&str>,
    sentence: &[String],
) -> f32 {
    let learning = ctx.learning;
    let log = |count: u32| (count as f32).ln_1p();

    let mut boost = log(learning.unigram(word)) * UNIGRAM_BOOST;
    if let Some(previous) = previous {
        boost += log(learning.bigram(previous, word)) * BIGRAM_BOOST;
        if let [.., previous2, last] = sentence {
            if last == previous {
                boost += log(learning.trigram(previous2, previous, word)) * TRIGRAM_BOOST;
            }
        }
    }

    // Skip the previous word itself; the bigram term already covers it.
    let skip = usize::from(previous.is_some_and(|p| sentence.last().is_some_and(|w| w == p)));
    for (distance, context_word) in sentence.iter().rev().skip(skip).enumerate() {
        let distance = (distance + 1 + skip) as f32;
        boost += log(learning.bigram(context_word, word)) * SENTENCE_BOOST / distance;
    }
    boost
}
