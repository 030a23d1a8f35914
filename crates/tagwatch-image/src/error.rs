//! Error types for registry access

use thiserror::Error;

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Why a token or digest could not be obtained from a registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The request did not complete within the configured timeout
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// The registry host could not be reached
    #[error("could not connect to {url}: {message}")]
    Connection { url: String, message: String },

    /// The registry answered with something other than 200
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// A HEAD response carried no Docker-Content-Digest header
    #[error("{url} returned no Docker-Content-Digest header")]
    MissingDigestHeader { url: String },

    /// The registry requires a bearer token and none could be obtained
    #[error("no pull token available for {repository}")]
    AuthRequired { repository: String },

    /// A token endpoint answered 200 but the body held no token
    #[error("token response from {url} could not be parsed: {message}")]
    InvalidTokenResponse { url: String, message: String },

    /// A header value could not be built from the token
    #[error("invalid header value: {0}")]
    InvalidHeader(String),

    /// Every candidate token endpoint failed
    #[error("all {attempts} token endpoints failed, last: {last}")]
    NoTokenEndpoint { attempts: usize, last: String },

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// Any other transport failure
    #[error("HTTP error for {url}: {message}")]
    Http { url: String, message: String },
}

impl RegistryError {
    /// Classify a reqwest failure for `url`
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        let url = url.to_string();
        if err.is_timeout() {
            Self::Timeout { url }
        } else if err.is_connect() {
            Self::Connection {
                url,
                message: err.to_string(),
            }
        } else {
            Self::Http {
                url,
                message: err.to_string(),
            }
        }
    }

    /// Whether the failure means the host itself was unreachable
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Connection { .. })
    }
}
