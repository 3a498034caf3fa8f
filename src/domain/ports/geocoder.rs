//! Geocoder Port
//!
//! Defines the interface exposed by every geocoding provider.

use crate::domain::entities::Address;
use crate::domain::error::GeocoderError;
use crate::domain::value_objects::Query;
use async_trait::async_trait;

/// A geocoding provider.
///
/// Results are ordered as returned by the provider and never longer
/// than the provider's configured row limit.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Short provider name, e.g. `"geonames"`.
    fn name(&self) -> &'static str;

    /// Resolve a place name to addresses.
    async fn geocode(&self, address: &str) -> Result<Vec<Address>, GeocoderError>;

    /// Resolve coordinates to addresses.
    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Vec<Address>, GeocoderError>;

    /// Run a [`Query`].
    async fn query(&self, query: &Query) -> Result<Vec<Address>, GeocoderError> {
        match query {
            Query::Forward { text } => self.geocode(text.as_deref().unwrap_or("")).await,
            Query::Reverse { coordinates } => {
                self.reverse(coordinates.latitude, coordinates.longitude)
                    .await
            }
        }
    }
}
