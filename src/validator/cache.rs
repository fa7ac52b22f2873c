//! Reachability cache: keyed on `(url, method)`, TTL-expired lazily on read
//! (spec §4.6, §5 "Shared resources"). Lookup and insert are serialized
//! behind a single mutex — simple and correct at the cache sizes this engine
//! targets (hundreds to low thousands of entries).

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use tokio::sync::Mutex;

use crate::models::ValidationVerdict;

struct CacheEntry {
    verdict: ValidationVerdict,
    inserted_at: Instant,
}

pub struct ReachabilityCache {
    inner: Mutex<LruCache<(String, &'static str), CacheEntry>>,
    ttl: Duration,
}

impl ReachabilityCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity.max(1) is never zero");
        Self { inner: Mutex::new(LruCache::new(capacity)), ttl }
    }

    /// Look up a cached verdict for `(url, method)`, discarding it (and
    /// reporting a miss) if its TTL has elapsed.
    pub async fn get(&self, url: &str, method: &'static str) -> Option<ValidationVerdict> {
        let mut guard = self.inner.lock().await;
        let key = (url.to_string(), method);
        match guard.get(&key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.verdict.clone()),
            Some(_) => {
                guard.pop(&key);
                None
            }
            None => None,
        }
    }

    pub async fn insert(&self, url: &str, method: &'static str, verdict: ValidationVerdict) {
        let mut guard = self.inner.lock().await;
        guard.put((url.to_string(), method), CacheEntry { verdict, inserted_at: Instant::now() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hits_within_ttl_and_misses_after() {
        let cache = ReachabilityCache::new(10, Duration::from_millis(20));
        cache.insert("http://a", "HEAD", ValidationVerdict::reachable(Duration::ZERO)).await;
        assert!(cache.get("http://a", "HEAD").await.is_some());
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cache.get("http://a", "HEAD").await.is_none());
    }

    #[tokio::test]
    async fn keys_on_url_and_method_pair() {
        let cache = ReachabilityCache::new(10, Duration::from_secs(60));
        cache.insert("http://a", "HEAD", ValidationVerdict::reachable(Duration::ZERO)).await;
        assert!(cache.get("http://a", "GET").await.is_none());
    }
}
