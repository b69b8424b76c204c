use moka::future::Cache;
use moka::Expiry;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::time::{Duration, Instant};

/// Key-value store with a time-to-live per entry.
///
/// Injected by the caller; concurrent writers to one key are last-write-wins.
pub trait ResponseCache: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Option<String>> + Send;
    fn set(&self, key: &str, value: String, ttl: Duration) -> impl Future<Output = ()> + Send;
    fn clear(&self) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Clone)]
struct CachedEntry {
    body: String,
    ttl: Duration,
}

struct PerEntryTtl;

impl Expiry<String, CachedEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process [`ResponseCache`] backed by moka.
#[derive(Clone)]
pub struct MemoryCache {
    cache: Cache<String, CachedEntry>,
}

impl MemoryCache {
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .build();
        Self { cache }
    }
}

impl ResponseCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        self.cache.get(key).await.map(|entry| entry.body)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) {
        self.cache
            .insert(key.to_string(), CachedEntry { body: value, ttl })
            .await;
    }

    async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

/// Cache that never stores anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl ResponseCache for NoCache {
    async fn get(&self, _key: &str) -> Option<String> {
        None
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) {}

    async fn clear(&self) {}
}

/// Read and decode a JSON value. Entries that no longer decode count as misses.
pub async fn get_json<C, T>(cache: &C, key: &str) -> Option<T>
where
    C: ResponseCache,
    T: DeserializeOwned,
{
    let body = cache.get(key).await?;
    match serde_json::from_str(&body) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::debug!(key, error = %e, "discarding undecodable cache entry");
            None
        }
    }
}

pub async fn set_json<C, T>(cache: &C, key: &str, value: &T, ttl: Duration)
where
    C: ResponseCache,
    T: Serialize,
{
    match serde_json::to_string(value) {
        Ok(body) => cache.set(key, body, ttl).await,
        Err(e) => tracing::warn!(key, error = %e, "failed to encode cache entry"),
    }
}
