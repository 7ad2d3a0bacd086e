//! Tag-aware cache for serialized responses.
//!
//! Entries are addressed by key and carry a set of tags. Invalidating a tag
//! drops every entry stored under it before the call, whatever its key.
//!
//! Each tag also has a generation, bumped on invalidation. An entry remembers
//! the generations seen before its loader ran, so a value loaded across an
//! invalidation is handed to its caller but never served from the cache.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use moka::future::Cache;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache loader failed: {0:#}")]
    Loader(Arc<anyhow::Error>),

    #[error("tag invalidation rejected: {0}")]
    Invalidation(#[from] moka::PredicateError),
}

#[derive(Debug)]
struct CachedEntry {
    value: String,
    tags: Box<[String]>,
    /// Tag generations captured before the value was loaded, aligned with `tags`.
    generations: Box<[u64]>,
}

impl CachedEntry {
    fn tagged_with_any(&self, tags: &[String]) -> bool {
        self.tags.iter().any(|tag| tags.contains(tag))
    }
}

/// Cheaply cloneable handle over a shared moka cache.
#[derive(Clone)]
pub struct TagAwareCache {
    inner: Cache<String, Arc<CachedEntry>>,
    generations: Arc<Mutex<HashMap<String, u64>>>,
}

impl TagAwareCache {
    pub fn new(max_capacity: u64, time_to_live: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(time_to_live)
            .support_invalidation_closures()
            .build();

        Self {
            inner,
            generations: Arc::default(),
        }
    }

    fn generations_of(&self, tags: &[String]) -> Box<[u64]> {
        let generations = self
            .generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        tags.iter()
            .map(|tag| generations.get(tag).copied().unwrap_or(0))
            .collect()
    }

    fn is_current(&self, entry: &CachedEntry) -> bool {
        *self.generations_of(&entry.tags) == *entry.generations
    }

    /// Return the value stored under `key`, or run `loader`, store its output
    /// with `tags` and return it.
    ///
    /// Concurrent misses on one key share a single loader run. A failed load
    /// stores nothing. A value whose tags were invalidated while it loaded is
    /// returned but evicted right away.
    pub async fn get_or_insert_with<F>(
        &self,
        key: &str,
        tags: &[&str],
        loader: F,
    ) -> Result<String, CacheError>
    where
        F: Future<Output = anyhow::Result<String>>,
    {
        let tags: Box<[String]> = tags.iter().map(|tag| tag.to_string()).collect();
        // Captured before the loader reads anything.
        let generations = self.generations_of(&tags);

        if let Some(stale) = self.inner.get(key).await {
            if !self.is_current(&stale) {
                self.inner.invalidate(key).await;
            }
        }

        let entry = self
            .inner
            .entry(key.to_string())
            .or_try_insert_with(async move {
                let value = loader.await?;
                Ok::<_, anyhow::Error>(Arc::new(CachedEntry {
                    value,
                    tags,
                    generations,
                }))
            })
            .await
            .map_err(CacheError::Loader)?;

        let fresh = entry.is_fresh();
        let entry = entry.into_value();
        if !self.is_current(&entry) {
            tracing::debug!(cache_key = key, "value loaded across an invalidation, evicted");
            self.inner.invalidate(key).await;
        } else if fresh {
            tracing::debug!(cache_key = key, "cache miss, value computed");
        } else {
            tracing::debug!(cache_key = key, "cache hit");
        }

        Ok(entry.value.clone())
    }

    /// Look a key up without computing anything.
    pub async fn get(&self, key: &str) -> Option<String> {
        self.inner
            .get(key)
            .await
            .filter(|entry| self.is_current(entry))
            .map(|entry| entry.value.clone())
    }

    /// Drop every entry carrying at least one of `tags`.
    pub fn invalidate_tags(&self, tags: &[&str]) -> Result<(), CacheError> {
        let tags: Vec<String> = tags.iter().map(|tag| tag.to_string()).collect();
        tracing::debug!(?tags, "invalidating cache tags");

        {
            let mut generations = self
                .generations
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            for tag in &tags {
                *generations.entry(tag.clone()).or_insert(0) += 1;
            }
        }

        self.inner
            .invalidate_entries_if(move |_key, entry| entry.tagged_with_any(&tags))?;
        Ok(())
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache() -> TagAwareCache {
        TagAwareCache::new(100, Duration::from_secs(60))
    }

    async fn load(
        cache: &TagAwareCache,
        key: &str,
        tags: &[&str],
        calls: &Arc<AtomicUsize>,
        value: &str,
    ) -> String {
        let calls = calls.clone();
        let value = value.to_string();
        cache
            .get_or_insert_with(key, tags, async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(value)
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn loader_runs_once_per_key() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        assert_eq!(load(&cache, "page-1", &["books"], &calls, "[1]").await, "[1]");
        assert_eq!(load(&cache, "page-1", &["books"], &calls, "[2]").await, "[1]");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(load(&cache, "page-2", &["books"], &calls, "[3]").await, "[3]");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidating_a_tag_only_drops_tagged_entries() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        load(&cache, "books-1", &["books"], &calls, "b1").await;
        load(&cache, "authors-1", &["authors"], &calls, "a1").await;

        cache.invalidate_tags(&["books"]).unwrap();

        assert_eq!(cache.get("books-1").await, None);
        assert_eq!(cache.get("authors-1").await.as_deref(), Some("a1"));

        assert_eq!(load(&cache, "books-1", &["books"], &calls, "b2").await, "b2");
    }

    #[tokio::test]
    async fn entries_stored_after_invalidation_survive_it() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        load(&cache, "k", &["books"], &calls, "old").await;
        cache.invalidate_tags(&["books"]).unwrap();
        load(&cache, "k", &["books"], &calls, "new").await;

        assert_eq!(cache.get("k").await.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn value_loaded_across_an_invalidation_is_not_kept() {
        let cache = cache();
        let (release, loaded) = tokio::sync::oneshot::channel::<()>();

        let loading = cache.get_or_insert_with("k", &["books"], async move {
            loaded.await.ok();
            Ok("stale".to_string())
        });
        let write = async {
            tokio::task::yield_now().await;
            cache.invalidate_tags(&["books"]).unwrap();
            release.send(()).unwrap();
        };
        let (value, ()) = tokio::join!(loading, write);

        assert_eq!(value.unwrap(), "stale");
        assert_eq!(cache.get("k").await, None);

        let calls = Arc::new(AtomicUsize::new(0));
        assert_eq!(load(&cache, "k", &["books"], &calls, "fresh").await, "fresh");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_load_stores_nothing() {
        let cache = cache();

        let result = cache
            .get_or_insert_with("broken", &["books"], async {
                Err(anyhow::anyhow!("store unavailable"))
            })
            .await;

        assert!(matches!(result, Err(CacheError::Loader(_))));
        assert_eq!(cache.get("broken").await, None);
    }

    #[tokio::test]
    async fn invalidate_all_clears_every_tag() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        load(&cache, "a", &["x"], &calls, "1").await;
        load(&cache, "b", &["y"], &calls, "2").await;
        cache.invalidate_all();

        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.get("b").await, None);
    }
}
