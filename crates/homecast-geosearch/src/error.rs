//! Geosearch-specific error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeosearchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Provider returned status {0}")]
    UpstreamStatus(u16),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

impl GeosearchError {
    /// Whether this error is a transient transport failure, as opposed to a
    /// malformed payload.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::UpstreamStatus(_))
    }
}
