//! Corrections the user has undone.
//!
//! Each undo of `source → corrected` bumps a counter keyed `source->corrected`.
//! Once the counter reaches the threshold the pair is suppressed for good:
//! neither correction nor prediction proposes `corrected` for `source` again.

use ahash::AHashMap;
use tracing::info;

use crate::error::StoreError;
use crate::persistence::{encode_table, load_table, StateStore};
use crate::text::normalize_word;

pub const REJECTIONS_TABLE: &str = "rejected_corrections";
const PAIR_SEPARATOR: &str = "->";

fn pair_key(source: &str, corrected: &str) -> String {
    format!(
        "{}{PAIR_SEPARATOR}{}",
        normalize_word(source),
        normalize_word(corrected)
    )
}

fn valid_key(key: &str) -> bool {
    key.split_once(PAIR_SEPARATOR)
        .is_some_and(|(source, corrected)| !source.is_empty() && !corrected.is_empty())
}

#[derive(Debug, Clone)]
pub struct RejectedCorrections {
    counts: AHashMap<String, u32>,
    threshold: u32,
}

impl RejectedCorrections {
    pub fn new(threshold: u32) -> Self {
        Self {
            counts: AHashMap::new(),
            threshold: threshold.max(1),
        }
    }

    pub fn load(threshold: u32, store: &dyn StateStore) -> Self {
        let mut rejections = Self::new(threshold);
        rejections.counts = load_table(store, REJECTIONS_TABLE, valid_key);
        rejections
    }

    /// Record one rejection; returns whether the pair is now suppressed.
    pub fn record(&mut self, source: &str, corrected: &str) -> bool {
        let key = pair_key(source, corrected);
        let count = self.counts.entry(key.clone()).or_insert(0);
        *count = count.saturating_add(1);
        let suppressed = *count >= self.threshold;
        if suppressed {
            info!("suppressing correction {key}");
        }
        suppressed
    }

    pub fn is_suppressed(&self, source: &str, corrected: &str) -> bool {
        self.counts
            .get(&pair_key(source, corrected))
            .is_some_and(|&count| count >= self.threshold)
    }

    pub fn save(&self, store: &mut dyn StateStore) -> Result<(), StoreError> {
        store.write(REJECTIONS_TABLE, &encode_table(&self.counts)?)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_suppressed_after_two_rejections() {
        let mut rejections = RejectedCorrections::new(2);
        assert!(!rejections.record("helo", "hello"));
        assert!(!rejections.is_suppressed("helo", "hello"));
        assert!(rejections.record("Helo", "hello"));
        assert!(rejections.is_suppressed("helo", "hello"));
        assert!(!rejections.is_suppressed("helo", "help"));
    }

    #[test]
    fn test_roundtrip_through_store() {
        let mut store = MemoryStore::new();
        let mut rejections = RejectedCorrections::new(2);
        rejections.record("teh", "the");
        rejections.record("teh", "the");
        rejections.save(&mut store).unwrap();
        assert_eq!(
            store.contents(REJECTIONS_TABLE).as_deref(),
            Some(r#"{"teh->the":2}"#)
        );

        let reloaded = RejectedCorrections::load(2, &store);
        assert!(reloaded.is_suppressed("teh", "the"));
    }

    #[test]
    fn test_malformed_table_is_discarded() {
        let mut store = MemoryStore::new();
        store.write(REJECTIONS_TABLE, r#"{"no-arrow":3}"#).unwrap();
        assert!(RejectedCorrections::load(2, &store).is_empty());
    }
}
