//! Domain Layer
//!
//! Entities, value objects, errors and ports. No I/O lives here.

pub mod entities;
pub mod error;
pub mod ports;
pub mod value_objects;

pub use entities::{Address, AddressBuilder, AdminLevel, Bounds};
pub use error::{GeocoderError, HttpError};
pub use value_objects::{Coordinates, Locale, Query};
