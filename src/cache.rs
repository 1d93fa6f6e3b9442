//! In-memory cache for fetched search-results markup.
//!
//! Keyed by the canonical request URL. Every fetch attempt writes an entry:
//! successes hold the full markup, failures hold an empty string so a
//! known-broken source is not hammered on every query. Failures carry a much
//! shorter TTL than successes; lookups after expiry behave as a miss and
//! there is no background sweep.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Prune expired entries once the map grows past this many keys.
const PRUNE_THRESHOLD: usize = 128;

/// A cached markup blob with expiration time.
struct CacheEntry {
    markup: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(markup: String, ttl: Duration) -> Self {
        Self {
            markup,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Thread-safe URL -> markup cache with per-entry TTL.
///
/// Concurrent fetches of the same URL are not deduplicated; last writer wins,
/// which is fine because content is idempotent per URL within a TTL window.
#[derive(Default)]
pub struct FetchCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl FetchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached markup for `url`, or `None` if absent or expired.
    ///
    /// An empty string is a recorded failure, returned as a hit so the
    /// caller skips the network for the failure TTL window.
    pub fn get(&self, url: &str) -> Option<String> {
        self.entries.read().ok().and_then(|guard| {
            guard.get(url).and_then(|entry| {
                if entry.is_expired() {
                    None
                } else {
                    Some(entry.markup.clone())
                }
            })
        })
    }

    /// Store `markup` for `url`, replacing any previous entry.
    pub fn set(&self, url: &str, markup: String, ttl: Duration) {
        if let Ok(mut guard) = self.entries.write() {
            guard.insert(url.to_string(), CacheEntry::new(markup, ttl));
            if guard.len() > PRUNE_THRESHOLD {
                guard.retain(|_, entry| !entry.is_expired());
            }
        }
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .map(|guard| guard.values().filter(|e| !e.is_expired()).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_on_absent_key() {
        let cache = FetchCache::new();
        assert_eq!(cache.get("https://example.com/"), None);
    }

    #[test]
    fn hit_within_ttl() {
        let cache = FetchCache::new();
        cache.set(
            "https://example.com/",
            "<html></html>".to_string(),
            Duration::from_secs(60),
        );
        assert_eq!(
            cache.get("https://example.com/"),
            Some("<html></html>".to_string())
        );
    }

    #[test]
    fn empty_failure_marker_is_a_hit() {
        let cache = FetchCache::new();
        cache.set("https://example.com/", String::new(), Duration::from_secs(60));
        assert_eq!(cache.get("https://example.com/"), Some(String::new()));
    }

    #[test]
    fn miss_after_expiry() {
        let cache = FetchCache::new();
        cache.set(
            "https://example.com/",
            "stale".to_string(),
            Duration::from_millis(5),
        );
        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(cache.get("https://example.com/"), None);
    }

    #[test]
    fn set_overwrites_previous_entry() {
        let cache = FetchCache::new();
        cache.set("u", "first".to_string(), Duration::from_secs(60));
        cache.set("u", "second".to_string(), Duration::from_secs(60));
        assert_eq!(cache.get("u"), Some("second".to_string()));
        assert_eq!(cache.len(), 1);
    }
}
