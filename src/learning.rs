//! Online n-gram counters learned from what the user actually types.
//!
//! Three tables are kept:
//! - unigrams: `word` → count
//! - bigrams: `prev|cur` → count
//! - trigrams: `prev2|prev1|cur` → count
//!
//! Counts saturate at a ceiling. When a table grows past its cap plus a
//! hysteresis margin it is trimmed back to the top-`cap` entries by count,
//! but only from [`LearningStore::flush_if_due`]: the untrimmed counts are
//! written out first. Otherwise updates are persisted in batches of
//! `flush_every`, or when the owner forces a flush.

use std::cmp::Ordering;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::persistence::{encode_table, load_table, StateStore};

const KEY_SEPARATOR: char = '|';

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    pub flush_every: usize,
    pub unigram_cap: usize,
    pub bigram_cap: usize,
    pub trigram_cap: usize,
    pub trim_margin: usize,
    pub count_ceiling: u32,
    pub accepted_prediction_increment: u32,
    pub commit_increment: u32,
    pub swipe_increment: u32,
    /// Learned unigram count at which a word is never corrected away.
    pub personal_word_threshold: u32,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            flush_every: 8,
            unigram_cap: 2600,
            bigram_cap: 5200,
            trigram_cap: 6800,
            trim_margin: 256,
            count_ceiling: 1_000_000,
            accepted_prediction_increment: 3,
            commit_increment: 1,
            swipe_increment: 2,
            personal_word_threshold: 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearnedTable {
    Unigram,
    Bigram,
    Trigram,
}

impl LearnedTable {
    pub const ALL: [LearnedTable; 3] = [
        LearnedTable::Unigram,
        LearnedTable::Bigram,
        LearnedTable::Trigram,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LearnedTable::Unigram => "learned_unigrams",
            LearnedTable::Bigram => "learned_bigrams",
            LearnedTable::Trigram => "learned_trigrams",
        }
    }

    fn arity(self) -> usize {
        match self {
            LearnedTable::Unigram => 1,
            LearnedTable::Bigram => 2,
            LearnedTable::Trigram => 3,
        }
    }

    fn valid_key(self, key: &str) -> bool {
        let parts: Vec<&str> = key.split(KEY_SEPARATOR).collect();
        parts.len() == self.arity() && parts.iter().all(|part| !part.trim().is_empty())
    }
}

pub fn bigram_key(previous: &str, current: &str) -> String {
    format!("{previous}{KEY_SEPARATOR}{current}")
}

pub fn trigram_key(previous2: &str, previous1: &str, current: &str) -> String {
    format!("{previous2}{KEY_SEPARATOR}{previous1}{KEY_SEPARATOR}{current}")
}

/// The user's learned vocabulary and word sequences.
#[derive(Debug, Clone, Default)]
pub struct LearningStore {
    unigrams: AHashMap<String, u32>,
    bigrams: AHashMap<String, u32>,
    trigrams: AHashMap<String, u32>,
    config: LearningConfig,
    dirty: usize,
}

impl LearningStore {
    pub fn new(config: LearningConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Load all three tables. A malformed table starts empty.
    pub fn load(config: LearningConfig, store: &dyn StateStore) -> Self {
        let mut learning = Self::new(config);
        for table in LearnedTable::ALL {
            let loaded = load_table(store, table.name(), |key| table.valid_key(key));
            *learning.table_mut(table) = loaded;
            if learning.over_limit(table) {
                learning.trim(table);
            }
        }
        info!(
            unigrams = learning.unigrams.len(),
            bigrams = learning.bigrams.len(),
            trigrams = learning.trigrams.len(),
            "loaded learned counters"
        );
        learning
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    /// An accepted prediction: `word` following `previous1` (and `previous2`).
    pub fn record_accepted_prediction(
        &mut self,
        previous2: Option<&str>,
        previous1: Option<&str>,
        word: &str,
    ) {
        let delta = self.config.accepted_prediction_increment;
        self.record(previous2, previous1, word, delta);
    }

    /// Trailing context of a committed word.
    pub fn record_commit(&mut self, previous2: Option<&str>, previous1: Option<&str>, word: &str) {
        let delta = self.config.commit_increment;
        self.record(previous2, previous1, word, delta);
    }

    /// A word committed through a swipe gesture.
    pub fn record_swipe(&mut self, previous2: Option<&str>, previous1: Option<&str>, word: &str) {
        let delta = self.config.swipe_increment;
        self.record(previous2, previous1, word, delta);
    }

    fn record(&mut self, previous2: Option<&str>, previous1: Option<&str>, word: &str, delta: u32) {
        if word.is_empty() || word.contains(KEY_SEPARATOR) {
            return;
        }
        let previous1 = previous1.filter(|p| !p.is_empty() && !p.contains(KEY_SEPARATOR));
        let previous2 = previous2.filter(|p| !p.is_empty() && !p.contains(KEY_SEPARATOR));

        self.bump(LearnedTable::Unigram, word.to_string(), delta);
        if let Some(previous1) = previous1 {
            self.bump(LearnedTable::Bigram, bigram_key(previous1, word), delta);
            if let Some(previous2) = previous2 {
                self.bump(
                    LearnedTable::Trigram,
                    trigram_key(previous2, previous1, word),
                    delta,
                );
            }
        }
        self.dirty += 1;
    }

    fn bump(&mut self, table: LearnedTable, key: String, delta: u32) {
        let ceiling = self.config.count_ceiling;
        let slot = self.table_mut(table).entry(key).or_insert(0);
        *slot = slot.saturating_add(delta).min(ceiling);
    }

    fn over_limit(&self, table: LearnedTable) -> bool {
        self.table(table).len() > self.cap(table) + self.config.trim_margin
    }

    /// Whether some table has grown past its cap plus margin.
    pub fn needs_trim(&self) -> bool {
        LearnedTable::ALL.into_iter().any(|table| self.over_limit(table))
    }

    /// Keep only the top-`cap` entries of `table` by count.
    pub fn trim(&mut self, table: LearnedTable) {
        let cap = self.cap(table);
        let entries = self.table_mut(table);
        if entries.len() <= cap {
            return;
        }
        let before = entries.len();

        let mut ranked: Vec<(String, u32)> = entries.drain().collect();
        // Ties broken by key so trimming is deterministic.
        let by_rank = |a: &(String, u32), b: &(String, u32)| -> Ordering {
            b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0))
        };
        if cap > 0 {
            ranked.select_nth_unstable_by(cap - 1, by_rank);
        }
        ranked.truncate(cap);
        entries.extend(ranked);

        debug!(table = table.name(), before, after = cap, "trimmed learned table");
    }

    pub fn pending_updates(&self) -> usize {
        self.dirty
    }

    /// Persist when enough updates have accumulated, or when a table is due
    /// for trimming. A trim always follows a flush of the untrimmed counts;
    /// the trimmed tables go out with the next batch.
    pub fn flush_if_due(&mut self, store: &mut dyn StateStore) -> Result<bool, StoreError> {
        if self.needs_trim() {
            self.flush(store)?;
            for table in LearnedTable::ALL {
                if self.over_limit(table) {
                    self.trim(table);
                }
            }
            self.dirty = 1;
            return Ok(true);
        }
        if self.dirty < self.config.flush_every.max(1) {
            return Ok(false);
        }
        self.flush(store)?;
        Ok(true)
    }

    /// Rewrite all three tables.
    pub fn flush(&mut self, store: &mut dyn StateStore) -> Result<(), StoreError> {
        for table in LearnedTable::ALL {
            store.write(table.name(), &encode_table(self.table(table))?)?;
        }
        debug!(updates = self.dirty, "flushed learned counters");
        self.dirty = 0;
        Ok(())
    }

    pub fn unigram(&self, word: &str) -> u32 {
        self.unigrams.get(word).copied().unwrap_or(0)
    }

    pub fn bigram(&self, previous: &str, word: &str) -> u32 {
        self.bigrams
            .get(&bigram_key(previous, word))
            .copied()
            .unwrap_or(0)
    }

    pub fn trigram(&self, previous2: &str, previous1: &str, word: &str) -> u32 {
        self.trigrams
            .get(&trigram_key(previous2, previous1, word))
            .copied()
            .unwrap_or(0)
    }

    pub fn is_personal_word(&self, word: &str) -> bool {
        let threshold = self.config.personal_word_threshold;
        threshold > 0 && self.unigram(word) >= threshold
    }

    /// Learned successors of `previous` starting with (and differing from)
    /// `prefix`, by descending count.
    pub fn successors(&self, previous: &str, prefix: &str, limit: usize) -> Vec<(String, u32)> {
        let mut found: Vec<(String, u32)> = self
            .bigrams
            .iter()
            .filter_map(|(key, &count)| {
                let (head, word) = key.split_once(KEY_SEPARATOR)?;
                (head == previous && word.starts_with(prefix) && word != prefix)
                    .then(|| (word.to_string(), count))
            })
            .collect();
        found.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        found.truncate(limit);
        found
    }

    /// Most-used learned words, optionally restricted by a predicate.
    pub fn top_words(&self, limit: usize, keep: impl Fn(&str) -> bool) -> Vec<(String, u32)> {
        let mut found: Vec<(String, u32)> = self
            .unigrams
            .iter()
            .filter(|(word, _)| keep(word))
            .map(|(word, &count)| (word.clone(), count))
            .collect();
        found.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        found.truncate(limit);
        found
    }

    pub fn len(&self, table: LearnedTable) -> usize {
        self.table(table).len()
    }

    pub fn is_empty(&self) -> bool {
        self.unigrams.is_empty() && self.bigrams.is_empty() && self.trigrams.is_empty()
    }

    fn cap(&self, table: LearnedTable) -> usize {
        match table {
            LearnedTable::Unigram => self.config.unigram_cap,
            LearnedTable::Bigram => self.config.bigram_cap,
            LearnedTable::Trigram => self.config.trigram_cap,
        }
    }

    fn table(&self, table: LearnedTable) -> &AHashMap<String, u32> {
        match table {
            LearnedTable::Unigram => &self.unigrams,
            LearnedTable::Bigram => &self.bigrams,
            LearnedTable::Trigram => &self.trigrams,
        }
    }

    fn table_mut(&mut self, table: LearnedTable) -> &mut AHashMap<String, u32> {
        match table {
            LearnedTable::Unigram => &mut self.unigrams,
            LearnedTable::Bigram => &mut self.bigrams,
            LearnedTable::Trigram => &mut self.trigrams,
        }
    }
}
