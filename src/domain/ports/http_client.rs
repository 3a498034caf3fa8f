//! HTTP Client Port
//!
//! Defines the single HTTP capability a provider needs.

use crate::domain::error::HttpError;
use async_trait::async_trait;

/// Client for fetching a URL.
///
/// This is an outbound port that abstracts the HTTP transport.
/// Production code uses reqwest; tests substitute a stub.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue a GET request and return the response body.
    async fn get(&self, url: &str) -> Result<String, HttpError>;
}
