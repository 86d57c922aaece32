//! In-memory, time-boxed cache of ranked search results.
//!
//! Expiry is enforced at read time only; entries are overwritten on every
//! fresh resolution and never evicted. Concurrent resolutions for the same
//! key are last-writer-wins, which is an accepted race for this cache.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

use crate::types::PlaceCandidate;

/// How long a cached result set stays fresh.
const FRESHNESS_WINDOW_MS: i64 = 5 * 60 * 1000;

#[derive(Debug, Clone)]
struct CacheEntry {
    results: Vec<PlaceCandidate>,
    timestamp: i64,
}

/// The search result cache, keyed by `"<trimmed query>-<limit>"`.
#[derive(Debug)]
pub struct SearchCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    window_ms: i64,
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchCache {
    /// Create a cache with the standard 5-minute freshness window.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            window_ms: FRESHNESS_WINDOW_MS,
        }
    }

    /// Create a cache with a custom freshness window (used by tests to
    /// force expiry without a real clock).
    pub fn with_window(window: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            window_ms: window.as_millis() as i64,
        }
    }

    /// The cache key for a query/limit pair. The query is trimmed but not
    /// lowercased.
    pub fn key(query: &str, limit: usize) -> String {
        format!("{}-{}", query.trim(), limit)
    }

    /// Look up a key, honoring the freshness window.
    pub fn get_fresh(&self, key: &str) -> Option<Vec<PlaceCandidate>> {
        let entries = self.entries.lock();
        let entry = entries.get(key)?;
        let now = chrono::Utc::now().timestamp_millis();
        if now - entry.timestamp < self.window_ms {
            Some(entry.results.clone())
        } else {
            None
        }
    }

    /// Look up a key regardless of freshness. Used as a degraded fallback
    /// when the providers are unreachable.
    pub fn get_any(&self, key: &str) -> Option<Vec<PlaceCandidate>> {
        self.entries.lock().get(key).map(|e| e.results.clone())
    }

    /// Store a result set under a key, overwriting any previous entry.
    /// Empty result sets are valid, cacheable outcomes.
    pub fn insert(&self, key: &str, results: Vec<PlaceCandidate>) {
        let entry = CacheEntry {
            results,
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        self.entries.lock().insert(key.to_string(), entry);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::types::PlaceKind;

    fn results(name: &str) -> Vec<PlaceCandidate> {
        vec![PlaceCandidate {
            name: name.to_string(),
            latitude: 50.0,
            longitude: -5.0,
            country: None,
            state: None,
            kind: PlaceKind::Town,
            postcode: None,
            importance: 0.0,
            match_score: Some(25),
        }]
    }

    #[test]
    fn test_key_format() {
        assert_eq!(SearchCache::key("  falmouth ", 8), "falmouth-8");
        // the key is trimmed but case-preserving
        assert_eq!(SearchCache::key("Falmouth", 3), "Falmouth-3");
    }

    #[test]
    fn test_fresh_hit() {
        let cache = SearchCache::new();
        cache.insert("falmouth-8", results("Falmouth, Cornwall"));
        let hit = cache.get_fresh("falmouth-8").unwrap();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].name, "Falmouth, Cornwall");
    }

    #[test]
    fn test_miss() {
        let cache = SearchCache::new();
        assert!(cache.get_fresh("nothing-8").is_none());
        assert!(cache.get_any("nothing-8").is_none());
    }

    #[test]
    fn test_expired_entry_not_fresh() {
        let cache = SearchCache::with_window(Duration::ZERO);
        cache.insert("falmouth-8", results("Falmouth, Cornwall"));
        assert!(cache.get_fresh("falmouth-8").is_none());
    }

    #[test]
    fn test_stale_entry_still_readable_as_any() {
        let cache = SearchCache::with_window(Duration::ZERO);
        cache.insert("falmouth-8", results("Falmouth, Cornwall"));
        let stale = cache.get_any("falmouth-8").unwrap();
        assert_eq!(stale[0].name, "Falmouth, Cornwall");
    }

    #[test]
    fn test_overwrite() {
        let cache = SearchCache::new();
        cache.insert("truro-8", results("Old"));
        cache.insert("truro-8", results("New"));
        let hit = cache.get_fresh("truro-8").unwrap();
        assert_eq!(hit[0].name, "New");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_empty_results_cacheable() {
        let cache = SearchCache::new();
        cache.insert("zzzz-8", Vec::new());
        let hit = cache.get_fresh("zzzz-8").unwrap();
        assert!(hit.is_empty());
    }

    #[test]
    fn test_limit_distinguishes_keys() {
        let cache = SearchCache::new();
        cache.insert(&SearchCache::key("truro", 8), results("A"));
        assert!(cache.get_fresh(&SearchCache::key("truro", 3)).is_none());
    }
}
