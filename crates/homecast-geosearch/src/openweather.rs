//! Forward geocoding via the OpenWeatherMap geocoding API (city-centric).
//!
//! Used only as a fallback when Nominatim yields nothing rankable. The query
//! is suffixed with the home country code and the response is re-filtered to
//! GB records exactly.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

use crate::error::GeosearchError;
use crate::types::{
    looks_like_postcode, PlaceCandidate, PlaceKind, HOME_COUNTRY_CODE, HOME_COUNTRY_DISPLAY,
};

const GEOCODING_URL: &str = "https://api.openweathermap.org/geo/1.0/direct";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "HomeCast/0.1 (https://github.com/homecast)";

/// Name fragments that mark a record as an administrative region.
const ADMIN_KEYWORDS: &[&str] = &["county", "shire", "borough", "district"];

/// Assembled names longer than this are treated as cities rather than towns.
const CITY_NAME_LEN: usize = 8;

#[derive(Debug, Deserialize)]
struct GeoRecord {
    name: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

/// Client for the OpenWeatherMap geocoding endpoint.
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    /// Create a client against the public OpenWeatherMap endpoint.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(api_key: &str) -> Result<Self, GeosearchError> {
        Self::with_base_url(api_key, GEOCODING_URL)
    }

    /// Create a client against a specific endpoint (used by tests).
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self, GeosearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Free-text search, country-suffixed to the UK.
    ///
    /// A payload that fails to decode is treated the same as zero results;
    /// only transport failures (network error, non-2xx) surface as errors.
    ///
    /// # Errors
    /// Returns an error on network failure or a non-success status.
    #[instrument(skip(self), level = "info")]
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<PlaceCandidate>, GeosearchError> {
        let q = format!("{},{}", query, HOME_COUNTRY_CODE);
        let limit_param = limit.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", q.as_str()),
                ("limit", limit_param.as_str()),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeosearchError::UpstreamStatus(response.status().as_u16()));
        }

        let records: Vec<GeoRecord> = match response.json().await {
            Ok(records) => records,
            Err(e) => {
                tracing::debug!("OpenWeatherMap payload did not decode: {}", e);
                return Ok(Vec::new());
            }
        };

        Ok(records
            .into_iter()
            .filter_map(|r| to_candidate(r, query))
            .collect())
    }
}

/// Map a raw geocoding record to a candidate. Records outside GB are dropped
/// outright; this adapter never populates the `postcode` field.
fn to_candidate(record: GeoRecord, query: &str) -> Option<PlaceCandidate> {
    if record.country.as_deref() != Some(HOME_COUNTRY_CODE) {
        return None;
    }
    if record.name.trim().is_empty() {
        return None;
    }

    let mut parts = vec![record.name.clone()];
    if let Some(state) = record.state.as_deref() {
        if !state.is_empty() && state != record.name {
            parts.push(state.to_string());
        }
    }
    parts.push(HOME_COUNTRY_DISPLAY.to_string());
    let name = parts.join(", ");

    let lowered = name.to_lowercase();
    let kind = if looks_like_postcode(query) {
        PlaceKind::Postcode
    } else if record.state.is_some() || ADMIN_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        PlaceKind::County
    } else if name.chars().count() > CITY_NAME_LEN {
        PlaceKind::City
    } else {
        PlaceKind::Town
    };

    Some(PlaceCandidate {
        name,
        latitude: record.lat,
        longitude: record.lon,
        country: record.country,
        state: record.state,
        kind,
        postcode: None,
        importance: 0.0,
        match_score: None,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn record(json: serde_json::Value) -> GeoRecord {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_name_joins_state_and_country() {
        let c = to_candidate(
            record(serde_json::json!({
                "name": "Truro",
                "lat": 50.263,
                "lon": -5.051,
                "country": "GB",
                "state": "England"
            })),
            "truro",
        )
        .unwrap();
        assert_eq!(c.name, "Truro, England, UK");
        // a record with a state is treated as an administrative region
        assert_eq!(c.kind, PlaceKind::County);
    }

    #[test]
    fn test_duplicate_state_not_repeated() {
        let c = to_candidate(
            record(serde_json::json!({
                "name": "Cornwall",
                "lat": 50.5,
                "lon": -4.7,
                "country": "GB",
                "state": "Cornwall"
            })),
            "cornwall",
        )
        .unwrap();
        assert_eq!(c.name, "Cornwall, UK");
    }

    #[test]
    fn test_postcode_shaped_query_tags_postcode() {
        let c = to_candidate(
            record(serde_json::json!({
                "name": "Truro",
                "lat": 50.263,
                "lon": -5.051,
                "country": "GB"
            })),
            "TR1",
        )
        .unwrap();
        assert_eq!(c.kind, PlaceKind::Postcode);
        assert!(c.postcode.is_none());
    }

    #[test]
    fn test_long_name_is_city() {
        let c = to_candidate(
            record(serde_json::json!({
                "name": "Birmingham",
                "lat": 52.48,
                "lon": -1.90,
                "country": "GB"
            })),
            "birmingham",
        )
        .unwrap();
        // "Birmingham, UK" exceeds the town-name length cutoff
        assert_eq!(c.kind, PlaceKind::City);
    }

    #[test]
    fn test_short_name_is_town() {
        let c = to_candidate(
            record(serde_json::json!({
                "name": "Looe",
                "lat": 50.35,
                "lon": -4.45,
                "country": "GB"
            })),
            "looe",
        )
        .unwrap();
        assert_eq!(c.name, "Looe, UK");
        assert_eq!(c.kind, PlaceKind::Town);
    }

    #[test]
    fn test_admin_keyword_in_name() {
        let c = to_candidate(
            record(serde_json::json!({
                "name": "Oxfordshire",
                "lat": 51.75,
                "lon": -1.26,
                "country": "GB"
            })),
            "oxfordshire",
        )
        .unwrap();
        assert_eq!(c.kind, PlaceKind::County);
    }

    #[test]
    fn test_non_gb_record_dropped() {
        let c = to_candidate(
            record(serde_json::json!({
                "name": "Falmouth",
                "lat": 41.55,
                "lon": -70.61,
                "country": "US",
                "state": "Massachusetts"
            })),
            "falmouth",
        );
        assert!(c.is_none());
    }

    #[test]
    fn test_missing_country_dropped() {
        // the post-filter requires an exact GB country code; this adapter
        // never relies on the absent-means-home convention
        let c = to_candidate(
            record(serde_json::json!({
                "name": "Falmouth",
                "lat": 50.15,
                "lon": -5.07
            })),
            "falmouth",
        );
        assert!(c.is_none());
    }
}
