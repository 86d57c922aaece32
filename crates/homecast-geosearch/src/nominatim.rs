//! Forward geocoding via Nominatim (OpenStreetMap) - free, no API key.
//!
//! Requests are bounded to the UK both at the request level (countrycodes +
//! viewbox) and defensively after the response: records whose address says
//! otherwise are dropped before they ever reach the ranker.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

use crate::error::GeosearchError;
use crate::types::{is_assumed_home_country, looks_like_postcode, PlaceCandidate, PlaceKind};

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "HomeCast/0.1 (https://github.com/homecast)";

/// Bounding viewbox covering the UK (min lon, max lat, max lon, min lat).
const UK_VIEWBOX: &str = "-8.65,60.86,1.77,49.16";

#[derive(Debug, Deserialize)]
struct SearchRecord {
    lat: String,
    lon: String,
    display_name: String,
    #[serde(default)]
    importance: Option<f64>,
    #[serde(default, rename = "type")]
    place_type: Option<String>,
    #[serde(default)]
    address: Option<SearchAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchAddress {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    town: Option<String>,
    #[serde(default)]
    village: Option<String>,
    #[serde(default)]
    hamlet: Option<String>,
    #[serde(default)]
    suburb: Option<String>,
    #[serde(default)]
    neighbourhood: Option<String>,
    #[serde(default)]
    county: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    postcode: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    country_code: Option<String>,
}

/// Client for the Nominatim search endpoint.
pub struct NominatimClient {
    client: Client,
    base_url: String,
}

impl NominatimClient {
    /// Create a client against the public Nominatim endpoint.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new() -> Result<Self, GeosearchError> {
        Self::with_base_url(NOMINATIM_URL)
    }

    /// Create a client against a specific endpoint (used by tests).
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn with_base_url(base_url: &str) -> Result<Self, GeosearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Free-text search restricted to the UK.
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
        let limit_param = limit.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("addressdetails", "1"),
                ("limit", limit_param.as_str()),
                ("countrycodes", "gb"),
                ("viewbox", UK_VIEWBOX),
                ("bounded", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeosearchError::UpstreamStatus(response.status().as_u16()));
        }

        let records: Vec<SearchRecord> = match response.json().await {
            Ok(records) => records,
            Err(e) => {
                tracing::debug!("Nominatim payload did not decode: {}", e);
                return Ok(Vec::new());
            }
        };

        Ok(records.into_iter().filter_map(to_candidate).collect())
    }
}

/// Map a raw Nominatim record to a candidate. Returns `None` (fail closed)
/// for unparseable coordinates, explicitly foreign records, and records with
/// no usable display label.
fn to_candidate(record: SearchRecord) -> Option<PlaceCandidate> {
    let latitude: f64 = record.lat.parse().ok()?;
    let longitude: f64 = record.lon.parse().ok()?;

    let address = record.address.unwrap_or_default();
    if let Some(cc) = address.country_code.as_deref() {
        if !is_assumed_home_country(Some(cc)) {
            return None;
        }
    }

    let first_segment = record
        .display_name
        .split(',')
        .next()
        .unwrap_or("")
        .trim()
        .to_string();

    let settlement = address
        .city
        .clone()
        .or_else(|| address.town.clone())
        .or_else(|| address.village.clone())
        .or_else(|| address.hamlet.clone());

    // A record is "about" a postcode only when it both carries one and its
    // display string is itself postcode-shaped.
    let postcode_record =
        address.postcode.is_some() && looks_like_postcode(&first_segment);

    let name = if postcode_record {
        let postcode = address.postcode.clone()?;
        match &settlement {
            Some(s) => format!("{}, {}", postcode, s),
            None => postcode,
        }
    } else if let Some(s) = settlement.clone() {
        match &address.county {
            Some(county) if county != &s => format!("{}, {}", s, county),
            _ => s,
        }
    } else if let Some(county) = address.county.clone() {
        county
    } else if !first_segment.is_empty() {
        first_segment
    } else {
        return None;
    };

    let kind = if postcode_record {
        PlaceKind::Postcode
    } else if record.place_type.as_deref() == Some("administrative") || address.county.is_some() {
        PlaceKind::County
    } else if address.city.is_some() {
        PlaceKind::City
    } else if address.town.is_some() || address.village.is_some() {
        PlaceKind::Town
    } else if address.suburb.is_some() || address.neighbourhood.is_some() {
        PlaceKind::District
    } else {
        PlaceKind::Town
    };

    Some(PlaceCandidate {
        name,
        latitude,
        longitude,
        country: address.country_code.or(address.country),
        state: address.state.or(address.county),
        kind,
        postcode: if postcode_record { address.postcode } else { None },
        importance: record.importance.unwrap_or(0.0),
        match_score: None,
    })
}
