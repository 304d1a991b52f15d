//! The typing engine: one owned, mutex-guarded service per keyboard session.
//!
//! Every public method locks the engine state once, runs to completion and
//! never fails. Dictionaries live in an immutable [`DictionarySnapshot`]
//! behind an `Arc`; replacing it (mode change, background load) swaps the
//! whole snapshot and clears every cache.

use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::autocorrect::AutocorrectEngine;
use crate::config::Config;
use crate::context::LookupContext;
use crate::dictionary::{AssetPaths, DictionarySnapshot};
use crate::error::StoreError;
use crate::fuzzy::FuzzyCorrector;
use crate::language::LanguageMode;
use crate::learning::LearningStore;
use crate::persistence::{FileStore, MemoryStore, StateStore};
use crate::predictor::NgramPredictor;
use crate::rejections::RejectedCorrections;
use crate::swipe::{SwipeResolver, SwipeTypingSession};
use crate::text::{is_word_char, normalize_word, NGRAM_SHAPE};

/// Words of the current sentence kept as prediction context.
const SENTENCE_WINDOW: usize = 8;
const SENTENCE_END: &[char] = &['.', '!', '?', '…'];

/// How a committed word reached the text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommitSource {
    Typed,
    Prediction,
    Swipe,
}

struct EngineState {
    snapshot: Arc<DictionarySnapshot>,
    mode: LanguageMode,
    enabled: bool,
    fuzzy_enabled: bool,
    autocorrect: AutocorrectEngine,
    fuzzy: FuzzyCorrector,
    predictor: NgramPredictor,
    swipe: SwipeResolver,
    learning: LearningStore,
    rejections: RejectedCorrections,
    store: Box<dyn StateStore>,
    sentence: Vec<String>,
}

pub struct TypingEngine {
    inner: Mutex<EngineState>,
}

impl TypingEngine {
    /// Build an engine over `snapshot`, loading learned state from `store`.
    pub fn new(config: &Config, snapshot: DictionarySnapshot, store: Box<dyn StateStore>) -> Self {
        let learning = LearningStore::load(config.learning.clone(), &*store);
        let rejections = RejectedCorrections::load(config.rejection_threshold, &*store);
        info!(
            words = snapshot.word_count(),
            mode = ?config.language_mode,
            "typing engine ready"
        );

        Self {
            inner: Mutex::new(EngineState {
                snapshot: Arc::new(snapshot),
                mode: config.language_mode,
                enabled: config.enabled_by_default,
                fuzzy_enabled: config.fuzzy_enabled,
                autocorrect: AutocorrectEngine::new(config.max_edit_distance, config.cache_capacity),
                fuzzy: FuzzyCorrector::new(config.cache_capacity, config.fuzzy_scan_limit),
                predictor: NgramPredictor::new(config.cache_capacity),
                swipe: SwipeResolver::new(config.swipe.clone()),
                learning,
                rejections,
                store,
                sentence: Vec::new(),
            }),
        }
    }

    /// Embedded dictionaries, with learned state in the configured directory
    /// (or the platform data dir). Falls back to an in-memory store when no
    /// directory is available.
    pub fn from_config(config: &Config) -> Self {
        let store: Box<dyn StateStore> = match &config.state_dir {
            Some(dir) => Box::new(FileStore::new(dir)),
            None => match FileStore::default_location() {
                Ok(store) => Box::new(store),
                Err(err) => {
                    warn!("learned state will not persist: {err}");
                    Box::new(MemoryStore::new())
                }
            },
        };
        Self::new(config, DictionarySnapshot::embedded(), store)
    }

    /// Correct one word given the previous word. Capitalization of the
    /// input is carried over to the correction.
    pub fn correct(&self, word: &str, previous: Option<&str>) -> Option<String> {
        self.inner.lock().correct(word, previous)
    }

    /// Up to three completions for `prefix`.
    pub fn predict_words(&self, prefix: &str, previous: Option<&str>) -> Vec<String> {
        self.inner.lock().predict_words(prefix, previous)
    }

    /// Resolve a finished gesture, using the current sentence as context.
    pub fn resolve_swipe_path(&self, session: &SwipeTypingSession) -> Option<String> {
        self.inner.lock().resolve_swipe_path(session)
    }

    /// A word the user typed and committed (space, punctuation, enter).
    /// Sentence-ending punctuation closes the current sentence.
    pub fn commit_word(&self, word: &str) {
        self.inner.lock().commit(word, CommitSource::Typed);
    }

    pub fn accept_prediction(&self, word: &str) {
        self.inner.lock().commit(word, CommitSource::Prediction);
    }

    pub fn commit_swipe(&self, word: &str) {
        self.inner.lock().commit(word, CommitSource::Swipe);
    }

    /// The user undid `source → corrected`.
    pub fn reject_correction(&self, source: &str, corrected: &str) {
        self.inner.lock().reject(source, corrected);
    }

    pub fn set_mode(&self, mode: LanguageMode) {
        let mut state = self.inner.lock();
        if state.mode != mode {
            info!(?mode, "language mode changed");
        }
        state.mode = mode;
        state.clear_caches();
    }

    pub fn mode(&self) -> LanguageMode {
        self.inner.lock().mode
    }

    /// Swap in a fully built snapshot.
    pub fn install_snapshot(&self, snapshot: DictionarySnapshot) {
        let snapshot = Arc::new(snapshot);
        let mut state = self.inner.lock();
        info!(words = snapshot.word_count(), "installed dictionary snapshot");
        state.snapshot = snapshot;
        state.clear_caches();
    }

    /// Build a snapshot from `paths` on a worker thread and install it when
    /// done. Lookups keep using the current snapshot meanwhile.
    pub fn load_assets_in_background(self: &Arc<Self>, paths: AssetPaths) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        std::thread::spawn(move || {
            let snapshot = DictionarySnapshot::load(&paths);
            engine.install_snapshot(snapshot);
        })
    }

    pub fn snapshot(&self) -> Arc<DictionarySnapshot> {
        Arc::clone(&self.inner.lock().snapshot)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.inner.lock().enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.lock().enabled
    }

    /// Flip the enabled flag, returning the new state.
    pub fn toggle_enabled(&self) -> bool {
        let mut state = self.inner.lock();
        state.enabled = !state.enabled;
        state.enabled
    }

    /// Forget the current sentence context.
    pub fn reset_sentence(&self) {
        self.inner.lock().clear_sentence();
    }

    pub fn sentence(&self) -> Vec<String> {
        self.inner.lock().sentence.clone()
    }

    /// Persist learned counters and rejections now.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.inner.lock().flush()
    }
}

impl Drop for TypingEngine {
    fn drop(&mut self) {
        if let Err(err) = self.inner.get_mut().flush() {
            warn!("failed to persist learned state on shutdown: {err}");
        }
    }
}

impl EngineState {
    fn correct(&mut self, word: &str, previous: Option<&str>) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let ctx = LookupContext {
            snapshot: &self.snapshot,
            mode: self.mode,
            learning: &self.learning,
            rejections: &self.rejections,
        };
        let fuzzy_enabled = self.fuzzy_enabled;
        let corrected = self
            .autocorrect
            .correct(&ctx, word, previous)
            .or_else(|| {
                fuzzy_enabled
                    .then(|| self.fuzzy.correct(&ctx, word, previous))
                    .flatten()
            })?;

        let corrected = match_case(word.trim(), &corrected);
        (corrected != word.trim()).then_some(corrected)
    }

    fn predict_words(&mut self, prefix: &str, previous: Option<&str>) -> Vec<String> {
        if !self.enabled {
            return Vec::new();
        }
        let ctx = LookupContext {
            snapshot: &self.snapshot,
            mode: self.mode,
            learning: &self.learning,
            rejections: &self.rejections,
        };
        self.predictor.predict(&ctx, prefix, previous, &self.sentence)
    }

    fn resolve_swipe_path(&mut self, session: &SwipeTypingSession) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let ctx = LookupContext {
            snapshot: &self.snapshot,
            mode: self.mode,
            learning: &self.learning,
            rejections: &self.rejections,
        };
        let (previous2, previous) = trailing_context(&self.sentence);
        self.swipe.resolve(&ctx, session, previous2, previous)
    }

    fn commit(&mut self, raw: &str, source: CommitSource) {
        let closes_sentence = raw.trim_end().ends_with(SENTENCE_END);
        let normalized = normalize_word(raw);
        let word = normalized.trim_matches(|c: char| !is_word_char(c));

        if NGRAM_SHAPE.accepts(word) {
            let was_personal = self.learning.is_personal_word(word);
            let (previous2, previous) = trailing_context(&self.sentence);
            match source {
                CommitSource::Typed => self.learning.record_commit(previous2, previous, word),
                CommitSource::Prediction => {
                    self.learning
                        .record_accepted_prediction(previous2, previous, word)
                }
                CommitSource::Swipe => self.learning.record_swipe(previous2, previous, word),
            }

            self.sentence.push(word.to_string());
            if self.sentence.len() > SENTENCE_WINDOW {
                self.sentence.remove(0);
            }

            // Learned counts feed prediction ranking; personal words also
            // change what correction considers known.
            self.predictor.clear_cache();
            if !was_personal && self.learning.is_personal_word(word) {
                debug!(word = %word, "word is now personal vocabulary");
                self.autocorrect.clear_cache();
                self.fuzzy.clear_cache();
            }

            if let Err(err) = self.learning.flush_if_due(self.store.as_mut()) {
                warn!("failed to persist learned counters: {err}");
            }
        }

        if closes_sentence {
            self.clear_sentence();
        }
    }

    // Sentence words feed prediction ranking, so cached predictions go too.
    fn clear_sentence(&mut self) {
        if !self.sentence.is_empty() {
            self.sentence.clear();
            self.predictor.clear_cache();
        }
    }

    fn reject(&mut self, source: &str, corrected: &str) {
        self.rejections.record(source, corrected);
        if let Err(err) = self.rejections.save(self.store.as_mut()) {
            warn!("failed to persist rejected corrections: {err}");
        }
        self.clear_caches();
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        self.learning.flush(self.store.as_mut())?;
        self.rejections.save(self.store.as_mut())
    }

    fn clear_caches(&mut self) {
        self.autocorrect.clear_cache();
        self.fuzzy.clear_cache();
        self.predictor.clear_cache();
    }
}

/// `(previous2, previous)` from the tail of the sentence.
fn trailing_context(sentence: &[String]) -> (Option<&str>, Option<&str>) {
    match sentence {
        [] => (None, None),
        [last] => (None, Some(last.as_str())),
        [.., before, last] => (Some(before.as_str()), Some(last.as_str())),
    }
}

/// Carry the capitalization of `original` over to `corrected`.
fn match_case(original: &str, corrected: &str) -> String {
    let letters: Vec<char> = original.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
        return corrected.to_uppercase();
    }
    if original.chars().next().is_some_and(char::is_uppercase) {
        let mut chars = corrected.chars();
        if let Some(first) = chars.next() {
            return first.to_uppercase().chain(chars).collect();
        }
    }
    corrected.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::LanguageAssets;
    use crate::language::Language;
    use crate::learning::LearnedTable;
    use ahash::AHashMap;

    fn snapshot() -> DictionarySnapshot {
        let english: AHashMap<String, u64> = [("hello", 1000), ("help", 800), ("world", 700)]
            .iter()
            .map(|(w, f)| (w.to_string(), *f))
            .collect();
        let french: AHashMap<String, u64> = [("bonjour", 500), ("école", 300)]
            .iter()
            .map(|(w, f)| (w.to_string(), *f))
            .collect();
        DictionarySnapshot::new(
            LanguageAssets::from_maps(Language::French, &french, &[]),
            LanguageAssets::from_maps(Language::English, &english, &[]),
        )
    }

    fn engine(store: MemoryStore) -> TypingEngine {
        TypingEngine::new(&Config::default(), snapshot(), Box::new(store))
    }

    #[test]
    fn test_match_case() {
        assert_eq!(match_case("Helo", "hello"), "Hello");
        assert_eq!(match_case("HELO", "hello"), "HELLO");
        assert_eq!(match_case("ecole", "école"), "école");
        assert_eq!(match_case("Ecole", "école"), "École");
    }

    #[test]
    fn test_correct_keeps_capitalization() {
        let engine = engine(MemoryStore::new());
        assert_eq!(engine.correct("Helo", None), Some("Hello".to_string()));
        assert_eq!(engine.correct("Hello", None), None);
    }

    #[test]
    fn test_fuzzy_path_runs_after_autocorrect() {
        let engine = engine(MemoryStore::new());
        assert_eq!(engine.correct("ecole", None), Some("école".to_string()));
        assert_eq!(engine.correct("hellooooo", None), Some("hello".to_string()));
    }

    #[test]
    fn test_disabled_engine_suggests_nothing() {
        let engine = engine(MemoryStore::new());
        assert!(!engine.toggle_enabled());
        assert_eq!(engine.correct("helo", None), None);
        assert!(engine.predict_words("he", None).is_empty());
        engine.set_enabled(true);
        assert_eq!(engine.correct("helo", None), Some("hello".to_string()));
    }

    #[test]
    fn test_sentence_tracking() {
        let engine = engine(MemoryStore::new());
        engine.commit_word("Hello");
        engine.commit_word("world.");
        assert!(engine.sentence().is_empty());
        for i in 0..12 {
            engine.commit_word(&format!("word{}", ["a", "b", "c"][i % 3]));
        }
        assert_eq!(engine.sentence().len(), SENTENCE_WINDOW);
    }

    #[test]
    fn test_personal_word_is_never_corrected() {
        let engine = engine(MemoryStore::new());
        assert_eq!(engine.correct("helo", None), Some("hello".to_string()));
        for _ in 0..6 {
            engine.commit_word("helo");
        }
        assert_eq!(engine.correct("helo", None), None);
    }

    #[test]
    fn test_flush_writes_tables() {
        let store = MemoryStore::new();
        let engine = engine(store.clone());
        engine.commit_word("hello");
        engine.commit_word("world");
        engine.flush().unwrap();
        assert_eq!(
            store.contents(LearnedTable::Bigram.name()).as_deref(),
            Some(r#"{"hello|world":1}"#)
        );
    }

    #[test]
    fn test_trailing_context() {
        let sentence = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(trailing_context(&sentence), (Some("b"), Some("c")));
        assert_eq!(trailing_context(&sentence[..1]), (None, Some("a")));
        assert_eq!(trailing_context(&[]), (None, None));
    }
}
