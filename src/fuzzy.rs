//! Fuzzy variant corrector.
//!
//! Handles the noisy input plain edit-distance-1 correction misses:
//! missing accents, stretched letters (`sooooo`), broken inflectional
//! endings (`runnign`) and curated typos (`cest`).
//!
//! The source word is expanded into penalized *variants* (run-collapsed
//! forms and suffix repairs). Each variant probes the lexicon twice: an
//! exact folded match, and a scan of the bucket sharing its first folded
//! letter (its first two for variants of six letters or more). Every hit is scored (lower is better); the winner is surfaced
//! only when it clears the confidence gate.

use ahash::AHashMap;
use tracing::trace;

use crate::autocorrect::is_known;
use crate::cache::{CacheKey, LookupCache};
use crate::context::LookupContext;
use crate::curated;
use crate::dictionary::LanguageAssets;
use crate::distance::capped_distance;
use crate::language::{Language, LanguageHint};
use crate::text::{
    collapse_runs, fold, is_vowel, longest_run, normalize_word, shared_prefix_len, LEXICON_SHAPE,
};

/// Bounded edit distance used during scoring.
const DISTANCE_LIMIT: usize = 3;
/// Bucket entries whose folded length differs more than this are skipped.
const LENGTH_GAP_LIMIT: usize = 2;
/// Runs this long count as repeated-letter noise.
const REPEAT_RUN_MIN: usize = 3;

/// Scoring weights. Scores are penalties: lower wins.
#[derive(Debug, Clone, Copy)]
struct Weights {
    other_language: f32,
    collapse_two: f32,
    collapse_one: f32,
    folded_distance: f32,
    raw_distance: f32,
    length_gap: f32,
    shared_prefix: f32,
    core_bonus: f32,
    frequency: f32,
}

const WEIGHTS: Weights = Weights {
    other_language: 0.8,
    collapse_two: 0.6,
    collapse_one: 1.2,
    folded_distance: 1.0,
    raw_distance: 0.35,
    length_gap: 0.25,
    shared_prefix: 0.2,
    core_bonus: 0.4,
    frequency: 0.08,
};

#[derive(Debug, Clone, PartialEq)]
struct Variant {
    folded: String,
    penalty: f32,
    /// Produced by collapsing or suffix repair rather than taken verbatim.
    structural: bool,
}

#[derive(Debug, Clone)]
struct Scored {
    word: String,
    score: f32,
    distance: usize,
    shared_prefix: usize,
    structural: bool,
}

pub struct FuzzyCorrector {
    cache: LookupCache<Option<String>>,
    bucket_scan_limit: usize,
}

impl FuzzyCorrector {
    pub fn new(cache_capacity: usize, bucket_scan_limit: usize) -> Self {
        Self {
            cache: LookupCache::new(cache_capacity),
            bucket_scan_limit,
        }
    }

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
        trace!(word = %word, ?hint, result = ?result, "fuzzy correction");
        self.cache.put(key, result.clone());
        result
    }

    fn compute(&self, ctx: &LookupContext<'_>, word: &str, hint: LanguageHint) -> Option<String> {
        if is_known(ctx, word) {
            return None;
        }
        let languages = ordered_languages(ctx, hint);
        let accept =
            |candidate: &str| candidate != word && !ctx.rejections.is_suppressed(word, candidate);

        // Curated typos.
        for &language in &languages {
            if let Some(&(_, fixed)) = curated::typo_table(language)
                .iter()
                .find(|(typo, _)| *typo == word)
            {
                if accept(fixed) {
                    return Some(fixed.to_string());
                }
            }
        }

        // Exact folded match restores accents.
        let folded = fold(word);
        if let Some(found) =
            canonical_in(ctx, &languages, &folded).filter(|c| accept(c.as_str()))
        {
            return Some(found);
        }

        // Repeated-letter noise: try both collapse depths first.
        let mut vowel_noise = false;
        if let Some((run_char, run_len)) = longest_run(&folded) {
            if run_len >= REPEAT_RUN_MIN {
                let attempts = [
                    collapse_noisy_runs(&folded, 2),
                    collapse_noisy_runs(&folded, 1),
                    collapse_runs(&folded, 2),
                    collapse_runs(&folded, 1),
                ];
                for collapsed in attempts {
                    if let Some(found) =
                        canonical_in(ctx, &languages, &collapsed).filter(|c| accept(c.as_str()))
                    {
                        return Some(found);
                    }
                }
                vowel_noise = is_vowel(run_char);
            }
        }

        let mut scored: AHashMap<String, Scored> = AHashMap::new();
        for &language in &languages {
            let assets = ctx.assets(language);
            if assets.lexicon.is_empty() {
                continue;
            }
            let bias = match hint.language() {
                Some(hinted) if hinted != language => WEIGHTS.other_language,
                _ => 0.0,
            };
            for variant in variants(&folded, language, vowel_noise) {
                self.probe(assets, word, &folded, &variant, bias, &mut scored);
            }
        }

        let mut ranked: Vec<Scored> = scored
            .into_values()
            .filter(|candidate| accept(candidate.word.as_str()))
            .collect();
        ranked.sort_by(|a, b| {
            a.score
                .total_cmp(&b.score)
                .then_with(|| a.word.cmp(&b.word))
        });

        let best = ranked.first()?;
        let runner_up = ranked.get(1);
        passes_gate(&folded, best, runner_up).then(|| best.word.clone())
    }

    fn probe(
        &self,
        assets: &LanguageAssets,
        word: &str,
        source_folded: &str,
        variant: &Variant,
        bias: f32,
        scored: &mut AHashMap<String, Scored>,
    ) {
        let variant_len = variant.folded.chars().count();
        let source_len = source_folded.chars().count();

        let mut consider = |candidate: &str, candidate_folded: &str| {
            let distance = capped_distance(&variant.folded, candidate_folded, DISTANCE_LIMIT);
            if distance > DISTANCE_LIMIT {
                return;
            }
            let raw_distance = capped_distance(word, candidate, DISTANCE_LIMIT + 1);
            let candidate_len = candidate_folded.chars().count();
            let shared_prefix = shared_prefix_len(source_folded, candidate_folded);
            let frequency = assets.dictionary.frequency(candidate).unwrap_or(1) as f32;

            let mut score = bias
                + variant.penalty
                + distance as f32 * WEIGHTS.folded_distance
                + raw_distance as f32 * WEIGHTS.raw_distance
                + source_len.abs_diff(candidate_len) as f32 * WEIGHTS.length_gap
                - shared_prefix.min(4) as f32 * WEIGHTS.shared_prefix
                - (frequency + 1.0).log10() * WEIGHTS.frequency;
            if assets.is_core(candidate_folded) {
                score -= WEIGHTS.core_bonus;
            }

            let entry = Scored {
                word: candidate.to_string(),
                score,
                distance,
                shared_prefix,
                structural: variant.structural,
            };
            match scored.get(candidate) {
                Some(existing) if existing.score <= entry.score => {}
                _ => {
                    scored.insert(candidate.to_string(), entry);
                }
            }
        };

        if let Some(canonical) = assets.lexicon.canonical(&variant.folded) {
            consider(canonical, variant.folded.as_str());
        }

        let Some(first) = variant.folded.chars().next() else {
            return;
        };
        // Long variants must share two letters, so the two-letter bucket
        // holds every entry that could pass.
        let (min_prefix, bucket) = if variant_len >= 6 {
            let prefix: String = variant.folded.chars().take(2).collect();
            (2, assets.lexicon.prefix_bucket(&prefix))
        } else {
            (1, assets.lexicon.bucket(first))
        };
        for entry in bucket.iter().take(self.bucket_scan_limit) {
            let entry_len = entry.folded.chars().count();
            if entry_len.abs_diff(variant_len) > LENGTH_GAP_LIMIT {
                continue;
            }
            if shared_prefix_len(&variant.folded, &entry.folded) < min_prefix {
                continue;
            }
            consider(entry.word.as_str(), entry.folded.as_str());
        }
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

/// Hinted language first, then the rest of the active languages.
fn ordered_languages(ctx: &LookupContext<'_>, hint: LanguageHint) -> Vec<Language> {
    let mut languages: Vec<Language> = ctx.mode.languages().to_vec();
    if let Some(hinted) = hint.language() {
        languages.sort_by_key(|&language| language != hinted);
    }
    languages
}

fn canonical_in(ctx: &LookupContext<'_>, languages: &[Language], folded: &str) -> Option<String> {
    languages
        .iter()
        .find_map(|&language| ctx.assets(language).lexicon.canonical(folded))
        .map(str::to_string)
}

/// The verbatim folded word, its run-collapsed forms and suffix repairs.
fn variants(folded: &str, language: Language, vowel_noise: bool) -> Vec<Variant> {
    let mut out = vec![Variant {
        folded: folded.to_string(),
        penalty: 0.0,
        structural: false,
    }];
    // Stretched vowels are treated as pure noise.
    let (two, one) = if vowel_noise {
        (0.0, 0.0)
    } else {
        (WEIGHTS.collapse_two, WEIGHTS.collapse_one)
    };
    push_variant(&mut out, collapse_runs(folded, 2), two);
    push_variant(&mut out, collapse_runs(folded, 1), one);

    for &(broken, repaired, penalty) in curated::suffix_rules(language) {
        let broken = fold(broken);
        let repaired = fold(repaired);
        if let Some(stem) = folded.strip_suffix(broken.as_str()) {
            if stem.chars().count() >= 2 {
                push_variant(&mut out, format!("{stem}{repaired}"), penalty);
            }
        }
    }
    out
}

/// Shorten only the runs long enough to be noise, leaving doubled letters.
fn collapse_noisy_runs(word: &str, max_run: usize) -> String {
    let chars: Vec<char> = word.chars().collect();
    let mut out = String::with_capacity(word.len());
    let mut start = 0;
    while start < chars.len() {
        let c = chars[start];
        let end = chars[start..]
            .iter()
            .position(|&next| next != c)
            .map_or(chars.len(), |offset| start + offset);
        let run = end - start;
        let keep = if run >= REPEAT_RUN_MIN { max_run } else { run };
        out.extend(std::iter::repeat(c).take(keep));
        start = end;
    }
    out
}

fn push_variant(out: &mut Vec<Variant>, folded: String, penalty: f32) {
    match out.iter_mut().find(|v| v.folded == folded) {
        Some(existing) => existing.penalty = existing.penalty.min(penalty),
        None => out.push(Variant {
            folded,
            penalty,
            structural: true,
        }),
    }
}

/// Maximum accepted edit distance for a word of `len` characters.
fn distance_limit(len: usize) -> usize {
    match len {
        0..=4 => 1,
        5..=8 => 2,
        _ => 3,
    }
}

/// Minimum shared prefix for a word of `len` characters.
fn min_shared_prefix(len: usize) -> usize {
    match len {
        0..=3 => 0,
        4..=6 => 1,
        _ => 2,
    }
}

/// Score margin the winner needs over the runner-up.
fn confidence_threshold(len: usize, distance: usize) -> f32 {
    (0.35 + 0.25 * distance as f32 - 0.02 * len.min(12) as f32).max(0.15)
}

fn passes_gate(source_folded: &str, best: &Scored, runner_up: Option<&Scored>) -> bool {
    let len = source_folded.chars().count();
    if best.distance > distance_limit(len) {
        return false;
    }
    if !best.structural && best.shared_prefix < min_shared_prefix(len) {
        return false;
    }
    match runner_up {
        Some(second) => second.score - best.score >= confidence_threshold(len, best.distance),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::DictionarySnapshot;
    use crate::language::LanguageMode;
    use crate::learning::{LearningConfig, LearningStore};
    use crate::rejections::RejectedCorrections;

    fn assets(language: Language, words: &[(&str, u64)]) -> LanguageAssets {
        let map: AHashMap<String, u64> = words.iter().map(|(w, f)| (w.to_string(), *f)).collect();
        LanguageAssets::from_maps(language, &map, &[])
    }

    fn snapshot() -> DictionarySnapshot {
        DictionarySnapshot::new(
            assets(
                Language::French,
                &[("école", 300), ("manger", 200), ("mangé", 150), ("bonjour", 500)],
            ),
            assets(
                Language::English,
                &[
                    ("hello", 1000),
                    ("help", 800),
                    ("so", 2000),
                    ("running", 400),
                    ("bat", 100),
                    ("bad", 100),
                    ("the", 9000),
                ],
            ),
        )
    }

    struct Fixture {
        snapshot: DictionarySnapshot,
        learning: LearningStore,
        rejections: RejectedCorrections,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                snapshot: snapshot(),
                learning: LearningStore::new(LearningConfig::default()),
                rejections: RejectedCorrections::new(2),
            }
        }

        fn ctx(&self, mode: LanguageMode) -> LookupContext<'_> {
            LookupContext {
                snapshot: &self.snapshot,
                mode,
                learning: &self.learning,
                rejections: &self.rejections,
            }
        }
    }

    #[test]
    fn test_long_words_scan_two_letter_bucket() {
        let snapshot = DictionarySnapshot::new(
            LanguageAssets::empty(Language::French),
            assets(
                Language::English,
                &[("ba", 50), ("be", 50), ("by", 50), ("breakfast", 10)],
            ),
        );
        let learning = LearningStore::new(LearningConfig::default());
        let rejections = RejectedCorrections::new(2);
        let ctx = LookupContext {
            snapshot: &snapshot,
            mode: LanguageMode::Bilingual,
            learning: &learning,
            rejections: &rejections,
        };
        // The first-letter bucket is filled with shorter words ahead of it.
        let mut fuzzy = FuzzyCorrector::new(16, 2);
        assert_eq!(fuzzy.correct(&ctx, "brekfast", None), Some("breakfast".to_string()));
    }

    #[test]
    fn test_restores_accents() {
        let fixture = Fixture::new();
        let mut fuzzy = FuzzyCorrector::new(16, 3000);
        let ctx = fixture.ctx(LanguageMode::Bilingual);
        assert_eq!(fuzzy.correct(&ctx, "ecole", None), Some("école".to_string()));
    }

    #[test]
    fn test_repeated_letters() {
        let fixture = Fixture::new();
        let mut fuzzy = FuzzyCorrector::new(16, 3000);
        let ctx = fixture.ctx(LanguageMode::Bilingual);
        assert_eq!(fuzzy.correct(&ctx, "sooooo", None), Some("so".to_string()));
        assert_eq!(fuzzy.correct(&ctx, "helllo", None), Some("hello".to_string()));
        assert_eq!(fuzzy.correct(&ctx, "hellooooo", None), Some("hello".to_string()));
    }

    #[test]
    fn test_suffix_repair() {
        let fixture = Fixture::new();
        let mut fuzzy = FuzzyCorrector::new(16, 3000);
        let ctx = fixture.ctx(LanguageMode::EnglishOnly);
        assert_eq!(fuzzy.correct(&ctx, "runnign", None), Some("running".to_string()));
    }

    #[test]
    fn test_typo_table() {
        let fixture = Fixture::new();
        let mut fuzzy = FuzzyCorrector::new(16, 3000);
        let ctx = fixture.ctx(LanguageMode::Bilingual);
        assert_eq!(fuzzy.correct(&ctx, "teh", None), Some("the".to_string()));
        assert_eq!(fuzzy.correct(&ctx, "cest", Some("je")), Some("c'est".to_string()));
    }

    #[test]
    fn test_ambiguous_candidates_are_declined() {
        let fixture = Fixture::new();
        let mut fuzzy = FuzzyCorrector::new(16, 3000);
        let ctx = fixture.ctx(LanguageMode::EnglishOnly);
        // "bat" and "bad" tie exactly.
        assert_eq!(fuzzy.correct(&ctx, "bax", None), None);
    }

    #[test]
    fn test_known_word_and_rejections() {
        let mut fixture = Fixture::new();
        let mut fuzzy = FuzzyCorrector::new(16, 3000);
        assert_eq!(fuzzy.correct(&fixture.ctx(LanguageMode::Bilingual), "hello", None), None);

        fixture.rejections.record("ecole", "école");
        fixture.rejections.record("ecole", "école");
        let mut fresh = FuzzyCorrector::new(16, 3000);
        assert_ne!(
            fresh.correct(&fixture.ctx(LanguageMode::Bilingual), "ecole", None),
            Some("école".to_string())
        );
    }

    #[test]
    fn test_variants() {
        let built = variants("runnign", Language::English, false);
        assert!(built.iter().any(|v| v.folded == "running" && v.structural));
        assert!(built.iter().any(|v| v.folded == "runign"));
        assert_eq!(built[0].penalty, 0.0);
        assert!(!built[0].structural);
    }

    #[test]
    fn test_collapse_noisy_runs() {
        assert_eq!(collapse_noisy_runs("hellooooo", 1), "hello");
        assert_eq!(collapse_noisy_runs("hellooooo", 2), "helloo");
        assert_eq!(collapse_noisy_runs("cool", 1), "cool");
    }

    #[test]
    fn test_gate_thresholds_scale() {
        assert_eq!(distance_limit(3), 1);
        assert_eq!(distance_limit(7), 2);
        assert_eq!(distance_limit(12), 3);
        assert!(confidence_threshold(4, 2) > confidence_threshold(4, 1));
        assert!(confidence_threshold(10, 1) < confidence_threshold(3, 1));
    }
}
