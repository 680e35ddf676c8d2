//! Error types

use thiserror::Error;

/// Errors raised while building or dispatching a request
///
/// HTTP status codes are never turned into errors: a 404 or 500 response is
/// returned to the caller as an ordinary [`crate::Response`].
#[derive(Debug, Error)]
pub enum Error {
    /// Method is not one of the supported HTTP verbs
    #[error("Invalid method: {0}")]
    InvalidMethod(String),
    /// Neither an explicit URL nor a base URL is available
    #[error("No URL given and no base URL configured")]
    MissingUrl,
    /// Target URL failed to parse
    #[error("Invalid URL `{url}`: {source}")]
    InvalidUrl {
        /// The rejected URL
        url: String,
        /// Parser error
        #[source]
        source: url::ParseError,
    },
    /// Header name or value is not valid HTTP
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
    /// Request data could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Failure reported by the transport, passed through untouched
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Errors reported by a [`crate::Transport`] implementation
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection could not be established or was dropped
    #[error("Connection error: {0}")]
    Connection(String),
    /// Request timeout
    #[error("Request timeout")]
    Timeout,
    /// Request was cancelled through its cancellation token
    #[error("Request cancelled")]
    Cancelled,
    /// Transport could not build the request
    #[error("Request build error: {0}")]
    Build(String),
    /// Other error
    #[error("{0}")]
    Other(String),
}

#[cfg(all(feature = "reqwest", not(target_arch = "wasm32")))]
impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_builder() {
            TransportError::Build(err.to_string())
        } else if err.is_connect() {
            TransportError::Connection(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<http::header::InvalidHeaderName> for Error {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Error::InvalidHeader(err.to_string())
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Error::InvalidHeader(err.to_string())
    }
}

/// Result type used across the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;
