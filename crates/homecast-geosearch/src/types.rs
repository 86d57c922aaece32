//! Core types for the place search subsystem.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// ISO 3166-1 alpha-2 code of the home country. The whole subsystem is
/// deliberately UK-biased: requests are bounded to GB and foreign results
/// are filtered out.
pub const HOME_COUNTRY_CODE: &str = "GB";

/// How the home country is rendered in assembled display names.
pub const HOME_COUNTRY_DISPLAY: &str = "UK";

/// What kind of place a candidate refers to, assigned by the provider
/// adapters from provider-specific heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceKind {
    City,
    Town,
    Postcode,
    County,
    District,
}

impl PlaceKind {
    /// Fixed ranking priority. Settlement names deliberately outrank
    /// postcodes: a lower-scored town sorts above a higher-scored postcode.
    pub fn priority(self) -> u8 {
        match self {
            Self::Town => 5,
            Self::City => 4,
            Self::County => 3,
            Self::Postcode => 2,
            Self::District => 1,
        }
    }
}

/// A provider-agnostic place candidate, as produced by the adapters and
/// scored by the ranker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    /// Human-readable display label assembled by the adapter
    /// (e.g. "Falmouth, Cornwall" or "TR1 2HE, Truro").
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Country code or name as supplied by the provider. `None` means the
    /// candidate is assumed to be in the home country.
    #[serde(default)]
    pub country: Option<String>,
    /// Administrative region (county/state), when the provider supplied one.
    #[serde(default)]
    pub state: Option<String>,
    pub kind: PlaceKind,
    /// Present only when the underlying record is itself about a postcode.
    #[serde(default)]
    pub postcode: Option<String>,
    /// Provider-supplied ranking signal (Nominatim only). 0.0 when absent.
    #[serde(default)]
    pub importance: f64,
    /// Similarity score attached by the ranker. Absent on raw candidates.
    #[serde(default)]
    pub match_score: Option<i64>,
}

/// The "absent country means home country" convention, in one place.
///
/// Raw provider records frequently omit the country; both the ranker's
/// filter and its sort key treat those as home-country candidates rather
/// than dropping them.
pub fn is_assumed_home_country(country: Option<&str>) -> bool {
    match country {
        None => true,
        Some(c) => {
            let c = c.trim();
            c.eq_ignore_ascii_case(HOME_COUNTRY_CODE)
                || c.eq_ignore_ascii_case(HOME_COUNTRY_DISPLAY)
                || c.eq_ignore_ascii_case("United Kingdom")
                || c.eq_ignore_ascii_case("Great Britain")
        }
    }
}

#[allow(clippy::expect_used)] // literal pattern
fn postcode_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^[a-z]{1,2}\d[a-z\d]?(\s?\d[a-z]{2})?$")
            .expect("postcode pattern is a valid regex")
    })
}

/// Whether a string is shaped like a UK postcode: outward code
/// ("TR1", "SW1A") with an optional inward part ("TR1 2HE").
pub fn looks_like_postcode(s: &str) -> bool {
    postcode_pattern().is_match(s.trim())
}
