//! Domain Entities - Core business objects
//!
//! Addresses produced by geocoding providers. They have no external
//! dependencies and are immutable once built.

use crate::domain::value_objects::Coordinates;
use serde::{Deserialize, Serialize};

/// Bounding box of a place. Each edge is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: Option<f64>,
    pub west: Option<f64>,
    pub north: Option<f64>,
    pub east: Option<f64>,
}

impl Bounds {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south: Some(south),
            west: Some(west),
            north: Some(north),
            east: Some(east),
        }
    }

    /// True only when all four edges are present.
    pub fn is_defined(&self) -> bool {
        self.south.is_some() && self.west.is_some() && self.north.is_some() && self.east.is_some()
    }
}

/// An administrative division, e.g. a region (level 1) or county (level 2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminLevel {
    pub level: u8,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl AdminLevel {
    pub fn new(level: u8, name: impl Into<String>, code: Option<String>) -> Self {
        Self {
            level,
            name: name.into(),
            code,
        }
    }
}

/// A geocoded address.
///
/// Built once from a provider record and handed to the caller.
/// Use [`AddressBuilder`] to construct one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    coordinates: Option<Coordinates>,
    bounds: Bounds,
    locality: Option<String>,
    admin_levels: Vec<AdminLevel>,
    country: Option<String>,
    country_code: Option<String>,
    timezone: Option<String>,
}

impl Address {
    pub fn builder() -> AddressBuilder {
        AddressBuilder::default()
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }

    pub fn latitude(&self) -> Option<f64> {
        self.coordinates.map(|c| c.latitude)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.coordinates.map(|c| c.longitude)
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn locality(&self) -> Option<&str> {
        self.locality.as_deref()
    }

    /// Administrative levels, ordered by level.
    pub fn admin_levels(&self) -> &[AdminLevel] {
        &self.admin_levels
    }

    pub fn admin_level(&self, level: u8) -> Option<&AdminLevel> {
        self.admin_levels.iter().find(|a| a.level == level)
    }

    /// County name (admin level 2), empty when unknown.
    pub fn county(&self) -> &str {
        self.admin_level(2).map(|a| a.name.as_str()).unwrap_or("")
    }

    /// Region name (admin level 1), empty when unknown.
    pub fn region(&self) -> &str {
        self.admin_level(1).map(|a| a.name.as_str()).unwrap_or("")
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn country_code(&self) -> Option<&str> {
        self.country_code.as_deref()
    }

    pub fn timezone(&self) -> Option<&str> {
        self.timezone.as_deref()
    }
}

/// Builder for [`Address`].
#[derive(Debug, Default)]
pub struct AddressBuilder {
    coordinates: Option<Coordinates>,
    bounds: Bounds,
    locality: Option<String>,
    admin_levels: Vec<AdminLevel>,
    country: Option<String>,
    country_code: Option<String>,
    timezone: Option<String>,
}

impl AddressBuilder {
    pub fn coordinates(mut self, coordinates: Option<Coordinates>) -> Self {
        self.coordinates = coordinates;
        self
    }

    pub fn bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn locality(mut self, locality: Option<String>) -> Self {
        self.locality = locality;
        self
    }

    /// Add an admin level. Blank names are ignored.
    pub fn admin_level(mut self, level: u8, name: Option<String>, code: Option<String>) -> Self {
        if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
            self.admin_levels.retain(|a| a.level != level);
            self.admin_levels.push(AdminLevel::new(level, name, code));
        }
        self
    }

    pub fn country(mut self, country: Option<String>) -> Self {
        self.country = country;
        self
    }

    pub fn country_code(mut self, country_code: Option<String>) -> Self {
        self.country_code = country_code;
        self
    }

    pub fn timezone(mut self, timezone: Option<String>) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn build(mut self) -> Address {
        self.admin_levels.sort_by_key(|a| a.level);
        Address {
            coordinates: self.coordinates,
            bounds: self.bounds,
            locality: self.locality,
            admin_levels: self.admin_levels,
            country: self.country,
            country_code: self.country_code,
            timezone: self.timezone,
        }
    }
}
