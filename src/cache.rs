//! Bounded LRU result cache, keyed on `(normalized_query, limit)`.
//!
//! Basic and advanced search each get their own cache instance — a cache
//! hit for one never masks a miss for the other, since highlighting only
//! applies to the advanced path.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

use crate::engine::SearchResult;

/// Capacity shared by both the basic and advanced result caches.
pub const CAPACITY: usize = 2048;

type CacheKey = (String, usize);

/// Thread-safe bounded cache mapping `(normalized query, limit)` to a
/// materialized result list. A `Mutex` guards the inner `LruCache` — cheap
/// enough given the cache is only touched once per query, and it keeps the
/// "capacity never exceeds 2048" invariant trivially true under
/// concurrent access.
pub struct ResultCache {
    inner: Mutex<LruCache<CacheKey, Vec<SearchResult>>>,
}

impl ResultCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self { inner: Mutex::new(LruCache::new(capacity)) }
    }

    pub fn get(&self, key: &CacheKey) -> Option<Vec<SearchResult>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).get(key).cloned()
    }

    pub fn put(&self, key: CacheKey, value: Vec<SearchResult>) {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).put(key, value);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(score: f32) -> Vec<SearchResult> {
        vec![SearchResult {
            collection_id: "c1".into(),
            collection_name: "Collection One".into(),
            hadith_number: None,
            book_no: 1,
            book_name: "Book One".into(),
            narrator_en: String::new(),
            body_en: "body".into(),
            body_ar: String::new(),
            book_reference: None,
            score: Some(score),
            highlights: None,
        }]
    }

    #[test]
    fn never_exceeds_configured_capacity() {
        let cache = ResultCache::new(4);
        for i in 0..20 {
            cache.put((format!("query-{i}"), 50), sample(i as f32));
            assert!(cache.len() <= 4);
        }
    }

    #[test]
    fn hit_returns_the_cached_value() {
        let cache = ResultCache::new(8);
        let key = ("mercy allah".to_string(), 50);
        cache.put(key.clone(), sample(1.5));
        let hit = cache.get(&key).unwrap();
        assert_eq!(hit[0].score, Some(1.5));
    }

    #[test]
    fn distinct_limits_are_distinct_keys() {
        let cache = ResultCache::new(8);
        cache.put(("mercy".to_string(), 10), sample(1.0));
        assert!(cache.get(&("mercy".to_string(), 50)).is_none());
    }
}
