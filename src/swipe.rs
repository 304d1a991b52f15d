//! Swipe gesture resolution.
//!
//! The caller feeds the touched keys of one gesture into a
//! [`SwipeTypingSession`], one token per key with the time spent on it.
//! [`SwipeResolver`] reduces the path to the letters the finger lingered on,
//! folds it into a *shape path*, and matches that shape against learned
//! words and the lexicon buckets for its first letter.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::context::LookupContext;
use crate::distance::capped_distance;
use crate::language::{Language, LanguageHint};
use crate::text::{collapse_runs, fold, is_letter, normalize_word, shared_prefix_len};

/// Edit-distance bound used while scoring.
const DISTANCE_LIMIT: usize = 4;
/// Shared-prefix characters that earn the prefix bonus.
const PREFIX_BONUS_CHARS: usize = 3;

/// Tunable penalties (positive) and bonuses (subtracted) of the swipe score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwipeWeights {
    pub shape_distance: f32,
    pub raw_distance: f32,
    pub length_gap: f32,
    pub missing_pair: f32,
    pub distant_pair: f32,
    pub prefix_bonus: f32,
    pub last_letter_mismatch: f32,
    pub not_subsequence: f32,
    pub missing_dwell_letter: f32,
    pub learned_unigram: f32,
    pub learned_bigram: f32,
    pub learned_trigram: f32,
    pub core_bonus: f32,
    pub other_language: f32,
}

impl Default for SwipeWeights {
    fn default() -> Self {
        Self {
            shape_distance: 14.0,
            raw_distance: 7.0,
            length_gap: 3.0,
            missing_pair: 5.0,
            distant_pair: 2.0,
            prefix_bonus: 6.0,
            last_letter_mismatch: 12.0,
            not_subsequence: 16.0,
            missing_dwell_letter: 8.0,
            learned_unigram: 2.0,
            learned_bigram: 3.0,
            learned_trigram: 4.0,
            core_bonus: 5.0,
            other_language: 6.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwipeConfig {
    /// Middle keys held longer than this are kept in the reduced path.
    pub commit_dwell_ms: u64,
    /// Movement needed before a touch counts as a swipe.
    pub deadzone_px: f32,
    pub learned_scan_limit: usize,
    pub bucket_scan_limit: usize,
    /// Best scores at or below this are accepted outright.
    pub confidence_ceiling: f32,
    /// Otherwise the best must beat the runner-up by this much.
    pub min_gap: f32,
    pub weights: SwipeWeights,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            commit_dwell_ms: 85,
            deadzone_px: 12.0,
            learned_scan_limit: 400,
            bucket_scan_limit: 2500,
            confidence_ceiling: 40.0,
            min_gap: 10.0,
            weights: SwipeWeights::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwipeToken {
    pub letter: char,
    pub dwell_ms: u64,
}

/// Touched keys of one gesture, discarded after resolution.
#[derive(Debug, Clone, Default)]
pub struct SwipeTypingSession {
    tokens: Vec<SwipeToken>,
    travelled_px: f32,
    swiping: bool,
}

impl SwipeTypingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an already-swiping session from `(letter, dwell)` pairs.
    pub fn from_tokens(tokens: impl IntoIterator<Item = (char, u64)>) -> Self {
        let mut session = Self::new();
        for (letter, dwell_ms) in tokens {
            session.push(letter, dwell_ms);
        }
        session.mark_swiping();
        session
    }

    /// Add one touched key. Consecutive touches of the same key merge and
    /// accumulate their dwell. Non-letters are ignored.
    pub fn push(&mut self, letter: char, dwell_ms: u64) {
        let Some(letter) = letter.to_lowercase().next().filter(|&c| is_letter(c)) else {
            return;
        };
        match self.tokens.last_mut() {
            Some(last) if last.letter == letter => {
                last.dwell_ms = last.dwell_ms.saturating_add(dwell_ms);
            }
            _ => self.tokens.push(SwipeToken { letter, dwell_ms }),
        }
    }

    /// Accumulate finger travel; the session becomes a swipe once it
    /// leaves the deadzone.
    pub fn record_movement(&mut self, distance_px: f32, deadzone_px: f32) {
        self.travelled_px += distance_px.abs();
        if self.travelled_px > deadzone_px {
            self.swiping = true;
        }
    }

    pub fn mark_swiping(&mut self) {
        self.swiping = true;
    }

    pub fn is_swiping(&self) -> bool {
        self.swiping
    }

    pub fn tokens(&self) -> &[SwipeToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
        self.travelled_px = 0.0;
        self.swiping = false;
    }

    /// First and last keys plus every middle key held past the commit
    /// dwell, with consecutive duplicates collapsed.
    pub fn reduce(&self, commit_dwell_ms: u64) -> Vec<char> {
        let count = self.tokens.len();
        let mut kept: Vec<usize> = (0..count)
            .filter(|&i| i == 0 || i + 1 == count || self.tokens[i].dwell_ms > commit_dwell_ms)
            .collect();

        if count >= 3 && dedup_letters(&self.tokens, &kept).len() < 3 {
            if let Some(forced) = self.longest_dwell_middle() {
                if !kept.contains(&forced) {
                    kept.push(forced);
                    kept.sort_unstable();
                }
            }
        }
        dedup_letters(&self.tokens, &kept)
    }

    /// Index of the middle token with the longest dwell.
    fn longest_dwell_middle(&self) -> Option<usize> {
        let count = self.tokens.len();
        if count < 3 {
            return None;
        }
        (1..count - 1).max_by(|&a, &b| {
            self.tokens[a]
                .dwell_ms
                .cmp(&self.tokens[b].dwell_ms)
                .then_with(|| b.cmp(&a))
        })
    }
}

fn dedup_letters(tokens: &[SwipeToken], indices: &[usize]) -> Vec<char> {
    let mut letters: Vec<char> = indices.iter().map(|&i| tokens[i].letter).collect();
    letters.dedup();
    letters
}

#[derive(Debug, Clone)]
struct Scored {
    word: String,
    score: f32,
}

/// What the scorer needs to know about the reduced path.
struct PathShape {
    path: Vec<char>,
    shape: Vec<char>,
    dwell_letter: Option<char>,
}

pub struct SwipeResolver {
    config: SwipeConfig,
}

impl SwipeResolver {
    pub fn new(config: SwipeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SwipeConfig {
        &self.config
    }

    /// Resolve a finished gesture to a word, or `None` when the path is too
    /// short, was never a swipe, or no candidate is confident enough.
    pub fn resolve(
        &self,
        ctx: &LookupContext<'_>,
        session: &SwipeTypingSession,
        previous2: Option<&str>,
        previous: Option<&str>,
    ) -> Option<String> {
        if !session.is_swiping() {
            return None;
        }
        let reduced = session.reduce(self.config.commit_dwell_ms);
        if reduced.len() < 2 {
            trace!(tokens = session.len(), "swipe path too short");
            return None;
        }

        let path: Vec<char> = fold(&reduced.iter().collect::<String>()).chars().collect();
        let shape: Vec<char> = collapse_runs(&path.iter().collect::<String>(), 1)
            .chars()
            .collect();
        if shape.len() < 2 {
            return None;
        }
        let dwell_letter = session
            .longest_dwell_middle()
            .map(|i| session.tokens[i].letter)
            .and_then(|letter| fold(&letter.to_string()).chars().next());
        let path = PathShape {
            path,
            shape,
            dwell_letter,
        };

        let previous = previous.map(normalize_word);
        let previous2 = previous2.map(normalize_word);
        let hint = LanguageHint::resolve(previous.as_deref(), ctx.mode);
        let first = path.shape[0];

        let mut scored: AHashMap<String, f32> = AHashMap::new();
        let mut offer = |word: &str, score: f32| {
            let slot = scored.entry(word.to_string()).or_insert(f32::INFINITY);
            *slot = slot.min(score);
        };

        let learned = ctx.learning.top_words(self.config.learned_scan_limit, |word| {
            fold(word).starts_with(first)
        });
        for (word, _) in &learned {
            let folded = fold(word);
            let score = self.score(ctx, &path, &folded, None, hint)
                - self.learned_boost(ctx, word, previous2.as_deref(), previous.as_deref());
            offer(word, score);
        }

        for &language in ctx.mode.languages() {
            let assets = ctx.assets(language);
            for entry in assets
                .lexicon
                .bucket(first)
                .iter()
                .take(self.config.bucket_scan_limit)
            {
                let score = self.score(ctx, &path, &entry.folded, Some(language), hint)
                    - self.learned_boost(
                        ctx,
                        &entry.word,
                        previous2.as_deref(),
                        previous.as_deref(),
                    );
                offer(&entry.word, score);
            }
        }

        let mut ranked: Vec<Scored> = scored
            .into_iter()
            .map(|(word, score)| Scored { word, score })
            .collect();
        ranked.sort_by(|a, b| a.score.total_cmp(&b.score).then_with(|| a.word.cmp(&b.word)));

        let best = ranked.first()?;
        let confident = self.is_confident(best.score, ranked.get(1).map(|second| second.score));
        let shape_text: String = path.shape.iter().collect();
        if confident {
            debug!(shape = %shape_text, word = %best.word, score = best.score, "resolved swipe");
            Some(best.word.clone())
        } else {
            debug!(shape = %shape_text, best = %best.word, score = best.score, "swipe declined");
            None
        }
    }

    /// A best score under the ceiling is accepted outright; above it the
    /// runner-up must trail by at least `min_gap`.
    fn is_confident(&self, best: f32, runner_up: Option<f32>) -> bool {
        best <= self.config.confidence_ceiling
            || runner_up.is_some_and(|second| second - best >= self.config.min_gap)
    }

    fn score(
        &self,
        ctx: &LookupContext<'_>,
        path: &PathShape,
        folded: &str,
        language: Option<Language>,
        hint: LanguageHint,
    ) -> f32 {
        let w = &self.config.weights;
        let folded_chars: Vec<char> = folded.chars().collect();
        let candidate: Vec<char> = collapse_runs(folded, 1).chars().collect();
        let shape_text: String = path.shape.iter().collect();
        let path_text: String = path.path.iter().collect();
        let candidate_text: String = candidate.iter().collect();

        let mut score = capped_distance(&shape_text, &candidate_text, DISTANCE_LIMIT) as f32
            * w.shape_distance
            + path.shape.len().abs_diff(candidate.len()) as f32 * w.length_gap
            + capped_distance(&path_text, folded, DISTANCE_LIMIT) as f32 * w.raw_distance
            + pair_penalty(&path.shape, &candidate, w)
            - shared_prefix_len(&shape_text, &candidate_text).min(PREFIX_BONUS_CHARS) as f32
                * w.prefix_bonus;

        if path.shape.last() != folded_chars.last() {
            score += w.last_letter_mismatch;
        }
        if !is_subsequence(&path.shape, &candidate) {
            score += w.not_subsequence;
        }
        if let Some(letter) = path.dwell_letter {
            if !candidate.contains(&letter) {
                score += w.missing_dwell_letter;
            }
        }

        let core = match language {
            Some(language) => ctx.assets(language).is_core(folded),
            None => ctx.active().any(|assets| assets.is_core(folded)),
        };
        if core {
            score -= w.core_bonus;
        }
        if let (Some(language), Some(hinted)) = (language, hint.language()) {
            if language != hinted {
                score += w.other_language;
            }
        }
        score
    }

    fn learned_boost(
        &self,
        ctx: &LookupContext<'_>,
        word: &str,
        previous2: Option<&str>,
        previous: Option<&str>,
    ) -> f32 {
        let w = &self.config.weights;
        let learning = ctx.learning;
        let log = |count: u32| (count as f32).ln_1p();

        let mut boost = log(learning.unigram(word)) * w.learned_unigram;
        if let Some(previous) = previous {
            boost += log(learning.bigram(previous, word)) * w.learned_bigram;
            if let Some(previous2) = previous2 {
                boost += log(learning.trigram(previous2, previous, word)) * w.learned_trigram;
            }
        }
        boost
    }
}

/// Penalty for shape letter pairs the candidate lacks or spreads apart.
fn pair_penalty(shape: &[char], candidate: &[char], weights: &SwipeWeights) -> f32 {
    shape
        .windows(2)
        .map(|pair| {
            let closest = candidate
                .iter()
                .enumerate()
                .filter(|&(_, &c)| c == pair[0])
                .filter_map(|(i, _)| candidate[i + 1..].iter().position(|&c| c == pair[1]))
                .min();
            match closest {
                None => weights.missing_pair,
                Some(gap) if gap >= 2 => weights.distant_pair,
                Some(_) => 0.0,
            }
        })
        .sum()
}

/// Whether `needle` appears in order (not necessarily contiguous) in `haystack`.
fn is_subsequence(needle: &[char], haystack: &[char]) -> bool {
    let mut rest = haystack.iter();
    needle.iter().all(|c| rest.any(|h| h == c))
}
