//! Place resolver - orchestrates the cached, two-provider lookup chain.
//!
//! Flow: cache -> Nominatim -> rank -> (non-empty: done) -> OpenWeatherMap
//! -> rank -> done. The providers run strictly sequentially; OpenWeatherMap
//! is only consulted when Nominatim ranked empty. Transport errors never
//! reach the caller: they degrade to the cached entry for the key (fresh or
//! not) and otherwise to an empty list.

use crate::cache::SearchCache;
use crate::error::GeosearchError;
use crate::nominatim::NominatimClient;
use crate::openweather::OpenWeatherClient;
use crate::rank::rank_candidates;
use crate::types::PlaceCandidate;

/// Result count limit used when the caller does not specify one.
pub const DEFAULT_LIMIT: usize = 8;

/// Nominatim is asked for this many times the caller's limit so the ranker
/// has enough raw material to filter down from.
const OVERFETCH_FACTOR: usize = 3;

/// The public entry point for free-text place search.
pub struct PlaceResolver {
    nominatim: NominatimClient,
    openweather: OpenWeatherClient,
    cache: SearchCache,
}

impl PlaceResolver {
    /// Create a resolver against the public provider endpoints.
    ///
    /// # Errors
    /// Returns an error if an HTTP client cannot be built.
    pub fn new(openweather_api_key: &str) -> Result<Self, GeosearchError> {
        Ok(Self {
            nominatim: NominatimClient::new()?,
            openweather: OpenWeatherClient::new(openweather_api_key)?,
            cache: SearchCache::new(),
        })
    }

    /// Create a resolver from explicit parts. The cache lifecycle is owned
    /// by whoever composes the resolver; it outlives any single call.
    pub fn with_parts(
        nominatim: NominatimClient,
        openweather: OpenWeatherClient,
        cache: SearchCache,
    ) -> Self {
        Self {
            nominatim,
            openweather,
            cache,
        }
    }

    /// Resolve with the default result limit.
    pub async fn resolve_default(&self, query: &str) -> Vec<PlaceCandidate> {
        self.resolve(query, DEFAULT_LIMIT).await
    }

    /// Turn a partial, possibly messy query into a ranked candidate list.
    ///
    /// Never fails: empty input, provider errors, and "genuinely nothing
    /// matched" all present as an empty list.
    pub async fn resolve(&self, query: &str, limit: usize) -> Vec<PlaceCandidate> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        let key = SearchCache::key(trimmed, limit);
        if let Some(hit) = self.cache.get_fresh(&key) {
            tracing::debug!(query = trimmed, "search cache hit");
            return hit;
        }

        match self.resolve_fresh(trimmed, limit).await {
            Ok(results) => {
                self.cache.insert(&key, results.clone());
                results
            }
            Err(e) => {
                tracing::warn!(query = trimmed, error = %e, "place search failed, degrading");
                self.cache.get_any(&key).unwrap_or_default()
            }
        }
    }

    async fn resolve_fresh(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<PlaceCandidate>, GeosearchError> {
        let raw = self.nominatim.search(query, limit * OVERFETCH_FACTOR).await?;
        let ranked = rank_candidates(raw, query, limit);
        if !ranked.is_empty() {
            return Ok(ranked);
        }

        tracing::debug!(query, "nominatim ranked empty, trying openweathermap");
        let raw = self.openweather.search(query, limit).await?;
        Ok(rank_candidates(raw, query, limit))
    }
}
