//! Bounded LRU cache for typing-path lookups.

use std::num::NonZeroUsize;

use lru::LruCache;
use tracing::debug;

use crate::language::{LanguageHint, LanguageMode};

/// `(mode, hint, previous word, current token)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub mode: LanguageMode,
    pub hint: LanguageHint,
    pub previous: String,
    pub token: String,
}

impl CacheKey {
    pub fn new(mode: LanguageMode, hint: LanguageHint, previous: Option<&str>, token: &str) -> Self {
        Self {
            mode,
            hint,
            previous: previous.unwrap_or_default().to_string(),
            token: token.to_string(),
        }
    }
}

type EvictionCallback = Box<dyn FnMut(&CacheKey) + Send>;

/// Capacity-limited cache; reads promote recency.
pub struct LookupCache<V> {
    inner: LruCache<CacheKey, V>,
    on_evict: Option<EvictionCallback>,
    hits: u64,
    misses: u64,
}

impl<V: Clone> LookupCache<V> {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: LruCache::new(capacity),
            on_evict: None,
            hits: 0,
            misses: 0,
        }
    }

    /// Install a callback invoked with each key evicted for capacity.
    pub fn with_eviction_callback(mut self, callback: impl FnMut(&CacheKey) + Send + 'static) -> Self {
        self.on_evict = Some(Box::new(callback));
        self
    }

    pub fn get(&mut self, key: &CacheKey) -> Option<V> {
        match self.inner.get(key) {
            Some(value) => {
                self.hits += 1;
                Some(value.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn put(&mut self, key: CacheKey, value: V) {
        if let Some((evicted, _)) = self.inner.push(key.clone(), value) {
            // `push` also hands back the old value when the key was already present.
            if evicted != key {
                if let Some(callback) = self.on_evict.as_mut() {
                    callback(&evicted);
                }
            }
        }
    }

    pub fn clear(&mut self) {
        let (hits, misses) = self.stats();
        debug!(entries = self.inner.len(), hits, misses, "clearing lookup cache");
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.cap().get()
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn key(token: &str) -> CacheKey {
        CacheKey::new(LanguageMode::Bilingual, LanguageHint::Unknown, None, token)
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut cache = LookupCache::new(3);
        for i in 0..10 {
            cache.put(key(&i.to_string()), i);
            assert!(cache.len() <= 3);
        }
        assert_eq!(cache.capacity(), 3);
    }

    #[test]
    fn test_access_promotes_recency() {
        let evicted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&evicted);
        let mut cache = LookupCache::new(2)
            .with_eviction_callback(move |k: &CacheKey| sink.lock().push(k.token.clone()));

        cache.put(key("a"), 1);
        cache.put(key("b"), 2);
        assert_eq!(cache.get(&key("a")), Some(1));
        cache.put(key("c"), 3);

        assert_eq!(cache.get(&key("b")), None);
        assert_eq!(cache.get(&key("a")), Some(1));
        assert_eq!(*evicted.lock(), vec!["b".to_string()]);
    }

    #[test]
    fn test_replacing_key_is_not_an_eviction() {
        let evicted = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&evicted);
        let mut cache = LookupCache::new(2).with_eviction_callback(move |_: &CacheKey| {
            *sink.lock() += 1;
        });
        cache.put(key("a"), 1);
        cache.put(key("a"), 2);
        assert_eq!(cache.get(&key("a")), Some(2));
        assert_eq!(*evicted.lock(), 0);
    }

    #[test]
    fn test_key_includes_context() {
        let mut cache = LookupCache::new(4);
        let en = CacheKey::new(LanguageMode::Bilingual, LanguageHint::English, Some("i"), "helo");
        let fr = CacheKey::new(LanguageMode::Bilingual, LanguageHint::French, Some("je"), "helo");
        cache.put(en.clone(), Some("hello".to_string()));
        assert_eq!(cache.get(&fr), None);
        assert_eq!(cache.get(&en), Some(Some("hello".to_string())));
        assert_eq!(cache.stats(), (1, 1));
    }
}
