use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::debug;

/// Short-lived response cache, keyed by request URL
///
/// Owned by a single client instance. Two clients never share entries, which
/// keeps tests independent and lets callers pick their own TTL.
///
/// Identical requests that overlap in time share one fetch: the later caller
/// waits on the key's gate and then reads the first caller's entry.
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CachedResponse>>,
    in_flight: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

#[derive(Debug, Clone)]
struct CachedResponse {
    fetched_at: Instant,
    body: serde_json::Value,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Fresh body for `key`, if any
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.get_at(key, Instant::now())
    }

    pub fn insert(&self, key: &str, body: serde_json::Value) {
        self.insert_at(key, body, Instant::now());
    }

    /// Cached body for `key`, or the result of `fetch`, which is cached on success
    ///
    /// Failures are not cached; a caller that waited behind a failed fetch
    /// runs its own.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<serde_json::Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<serde_json::Value, E>>,
    {
        if let Some(body) = self.get(key) {
            return Ok(body);
        }

        let Some(gate) = self.gate(key) else {
            return fetch().await;
        };
        let _turn = gate.lock().await;

        // Someone ahead of us may have filled it in
        if let Some(body) = self.get(key) {
            return Ok(body);
        }

        let result = fetch().await;
        if let Ok(body) = &result {
            self.insert(key, body.clone());
        }
        self.release(key, &gate);
        result
    }

    fn gate(&self, key: &str) -> Option<Arc<tokio::sync::Mutex<()>>> {
        let mut in_flight = self.in_flight.lock().ok()?;
        Some(in_flight.entry(key.to_string()).or_default().clone())
    }

    fn release(&self, key: &str, gate: &Arc<tokio::sync::Mutex<()>>) {
        if let Ok(mut in_flight) = self.in_flight.lock() {
            if in_flight.get(key).is_some_and(|g| Arc::ptr_eq(g, gate)) {
                in_flight.remove(key);
            }
        }
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<serde_json::Value> {
        let mut entries = self.entries.lock().ok()?;

        match entries.get(key) {
            Some(entry) if now.saturating_duration_since(entry.fetched_at) < self.ttl => {
                debug!("Response cache hit: {}", key);
                Some(entry.body.clone())
            }
            Some(_) => {
                debug!("Response cache entry expired: {}", key);
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn insert_at(&self, key: &str, body: serde_json::Value, now: Instant) {
        if self.ttl.is_zero() {
            return;
        }

        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                key.to_string(),
                CachedResponse {
                    fetched_at: now,
                    body,
                },
            );
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_hit_within_ttl() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        let start = Instant::now();

        cache.insert_at("users/octocat", json!({"login": "octocat"}), start);

        let hit = cache.get_at("users/octocat", start + Duration::from_secs(59));
        assert_eq!(hit, Some(json!({"login": "octocat"})));
    }

    #[test]
    fn test_expires_after_ttl() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        let start = Instant::now();

        cache.insert_at("users/octocat", json!({}), start);

        assert_eq!(cache.get_at("users/octocat", start + Duration::from_secs(60)), None);
        // Expired entries get evicted on read
        assert!(cache.is_empty());
    }

    #[test]
    fn test_keys_are_independent() {
        let cache = ResponseCache::default();
        cache.insert("a", json!(1));

        assert_eq!(cache.get("a"), Some(json!(1)));
        assert_eq!(cache.get("b"), None);
    }

    #[test]
    fn test_zero_ttl_disables_cache() {
        let cache = ResponseCache::new(Duration::ZERO);
        cache.insert("a", json!(1));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_overlapping_requests_share_one_fetch() {
        let cache = ResponseCache::default();
        let calls = AtomicU32::new(0);
        let calls = &calls;

        let fetch = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<_, String>(json!({"login": "octocat"}))
        };

        let (a, b) = tokio::join!(
            cache.get_or_fetch("users/octocat", fetch),
            cache.get_or_fetch("users/octocat", fetch)
        );

        assert_eq!(a, Ok(json!({"login": "octocat"})));
        assert_eq!(b, Ok(json!({"login": "octocat"})));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let cache = ResponseCache::default();

        let first = cache
            .get_or_fetch("users/ghost", || async { Err::<serde_json::Value, _>("boom") })
            .await;
        assert_eq!(first, Err("boom"));
        assert!(cache.is_empty());

        let second = cache
            .get_or_fetch("users/ghost", || async { Ok::<_, &str>(json!(1)) })
            .await;
        assert_eq!(second, Ok(json!(1)));
        assert_eq!(cache.get("users/ghost"), Some(json!(1)));
    }
}
