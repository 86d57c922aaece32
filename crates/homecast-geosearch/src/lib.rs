//! Free-text place search for HomeCast
//!
//! Turns a partial, possibly messy query ("falm", "TR1", "Cornwall") into a
//! ranked list of UK place candidates, merging Nominatim and OpenWeatherMap
//! geocoding results behind a short-lived in-memory cache.

pub mod cache;
pub mod error;
pub mod nominatim;
pub mod openweather;
pub mod rank;
pub mod resolver;
pub mod score;
pub mod types;

pub use cache::SearchCache;
pub use error::GeosearchError;
pub use nominatim::NominatimClient;
pub use openweather::OpenWeatherClient;
pub use rank::rank_candidates;
pub use resolver::{PlaceResolver, DEFAULT_LIMIT};
pub use types::{PlaceCandidate, PlaceKind};
