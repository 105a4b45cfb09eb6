use serde::Serialize;
use thiserror::Error;

use crate::provider::Upstream;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure of a single upstream call.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{upstream} request failed: {source}")]
    Transport {
        upstream: Upstream,
        #[source]
        source: BoxError,
    },

    #[error("{upstream} request failed with status {status}: {body}")]
    Status { upstream: Upstream, status: u16, body: String },

    #[error("failed to parse {upstream} response: {source}")]
    Decode {
        upstream: Upstream,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn upstream(&self) -> Upstream {
        match self {
            FetchError::Transport { upstream, .. }
            | FetchError::Status { upstream, .. }
            | FetchError::Decode { upstream, .. } => *upstream,
        }
    }

    /// The upstream answered 401 or 403.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, FetchError::Status { status: 401 | 403, .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, FetchError::Decode { .. })
    }
}

/// Failure of a whole `/weather` lookup, as seen by the caller.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Please provide latitude and longitude as query parameters.")]
    MissingParameter,

    #[error("Server configuration error: Geocoding API key missing.")]
    Configuration,

    #[error("Failed to fetch geocoding data: Invalid or unauthorized API key for geocode.maps.co.")]
    GeocodingAuth(#[source] FetchError),

    #[error("Failed to fetch data from one or more external APIs.")]
    UpstreamFetch(#[source] FetchError),

    #[error("{0}")]
    Processing(String),
}

impl RelayError {
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::MissingParameter => 400,
            RelayError::Configuration | RelayError::Processing(_) => 500,
            RelayError::GeocodingAuth(_) | RelayError::UpstreamFetch(_) => 502,
        }
    }

    /// JSON body sent back to the caller.
    pub fn body(&self) -> ErrorBody {
        match self {
            RelayError::MissingParameter | RelayError::Configuration => {
                ErrorBody { error: self.to_string(), details: None }
            }
            RelayError::GeocodingAuth(_) | RelayError::UpstreamFetch(_) => ErrorBody {
                error: "Bad Gateway: Error fetching data from external services.".to_string(),
                details: Some(self.to_string()),
            },
            RelayError::Processing(_) => ErrorBody {
                error: "Failed to process your request on the server.".to_string(),
                details: Some(self.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
