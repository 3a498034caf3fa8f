//! Domain Errors
//!
//! Failure kinds surfaced to callers of a geocoding provider.

/// Message used when a provider is built without a username.
pub const NO_USERNAME_MESSAGE: &str = "No username provided.";

/// Errors returned by a [`Geocoder`](crate::domain::ports::Geocoder).
///
/// There are exactly three kinds:
/// - `InvalidCredentials`: the provider is misconfigured, every call fails.
/// - `UnsupportedOperation`: the query cannot be served by this provider.
/// - `NoResult`: the query ran (or tried to) and produced nothing usable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeocoderError {
    #[error("{0}")]
    InvalidCredentials(String),
    #[error("{0}")]
    UnsupportedOperation(String),
    #[error("{0}")]
    NoResult(String),
}

impl GeocoderError {
    /// Missing username.
    pub fn no_username() -> Self {
        Self::InvalidCredentials(NO_USERNAME_MESSAGE.to_string())
    }

    /// The request for `url` could not be executed or decoded.
    pub fn could_not_execute(url: &str) -> Self {
        Self::NoResult(format!("Could not execute query \"{}\".", url))
    }

    /// The request for `url` returned no places.
    pub fn no_places(url: &str) -> Self {
        Self::NoResult(format!("No places found for query \"{}\".", url))
    }

    /// Whether retrying with a different query could succeed.
    pub fn is_no_result(&self) -> bool {
        matches!(self, Self::NoResult(_))
    }
}

/// Errors returned by an [`HttpClient`](crate::domain::ports::HttpClient).
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// Connection, TLS or timeout failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// Non-success HTTP status.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    /// The body could not be read.
    #[error("failed to read body: {0}")]
    Body(String),
}
