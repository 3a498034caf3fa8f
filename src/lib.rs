//! geonames-geocoder Library
//!
//! Forward and reverse geocoding against the Geonames web services,
//! behind a transport-agnostic `HttpClient` port.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;

// Re-export commonly used types
pub use adapters::outbound::{GeonamesGeocoder, ReqwestHttpClient};
pub use application::{GeocodingService, ServiceError};
pub use config::{load_config, Config, ConfigError};
pub use domain::entities::{Address, AdminLevel, Bounds};
pub use domain::error::{GeocoderError, HttpError};
pub use domain::ports::{Geocoder, HttpClient};
pub use domain::value_objects::{Coordinates, Locale, Query};
