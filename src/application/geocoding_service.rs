//! Geocoding Service - Main application use case
//!
//! Holds the registered providers and routes queries to the selected one.
//! This is the primary interface for the CLI.

use crate::domain::entities::Address;
use crate::domain::error::GeocoderError;
use crate::domain::ports::Geocoder;
use crate::domain::value_objects::Query;
use std::sync::Arc;

/// Errors from the geocoding service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("no geocoding provider registered")]
    NoProvider,
    #[error("provider \"{0}\" is not registered")]
    UnknownProvider(String),
    #[error(transparent)]
    Geocoder(#[from] GeocoderError),
}

/// Geocoding service - registry of providers.
///
/// Providers are kept in registration order. The first one registered is
/// used until another is selected with [`GeocodingService::using`].
#[derive(Default)]
pub struct GeocodingService {
    providers: Vec<Arc<dyn Geocoder>>,
    selected: Option<usize>,
}

impl GeocodingService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. A provider with the same name is replaced.
    pub fn register(mut self, provider: Arc<dyn Geocoder>) -> Self {
        match self
            .providers
            .iter()
            .position(|p| p.name() == provider.name())
        {
            Some(idx) => self.providers[idx] = provider,
            None => self.providers.push(provider),
        }
        self
    }

    /// Select the provider used by subsequent queries.
    pub fn using(mut self, name: &str) -> Result<Self, ServiceError> {
        let idx = self
            .providers
            .iter()
            .position(|p| p.name() == name)
            .ok_or_else(|| ServiceError::UnknownProvider(name.to_string()))?;
        self.selected = Some(idx);
        Ok(self)
    }

    /// Names of the registered providers, in registration order.
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// The provider queries are routed to.
    pub fn provider(&self) -> Result<&Arc<dyn Geocoder>, ServiceError> {
        self.providers
            .get(self.selected.unwrap_or(0))
            .ok_or(ServiceError::NoProvider)
    }

    pub async fn geocode(&self, address: &str) -> Result<Vec<Address>, ServiceError> {
        self.query(&Query::forward(address)).await
    }

    pub async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Vec<Address>, ServiceError> {
        self.query(&Query::reverse(latitude, longitude)).await
    }

    /// Run a query against the selected provider.
    pub async fn query(&self, query: &Query) -> Result<Vec<Address>, ServiceError> {
        let provider = self.provider()?;

        match provider.query(query).await {
            Ok(results) => {
                tracing::debug!(
                    "{} returned {} results for {:?}",
                    provider.name(),
                    results.len(),
                    query
                );
                Ok(results)
            }
            Err(e) => {
                tracing::debug!("{} failed for {:?}: {}", provider.name(), query, e);
                Err(e.into())
            }
        }
    }
}
