//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// A WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

/// A locale tag such as `it_IT` or `en`.
///
/// Only the language subtag is sent to providers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locale(String);

impl Locale {
    /// Parse a locale tag. Returns `None` for a blank tag.
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        if tag.is_empty() {
            None
        } else {
            Some(Self(tag.to_string()))
        }
    }

    /// The full tag as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The language part (first two characters), e.g. `it` for `it_IT`.
    pub fn language(&self) -> &str {
        match self.0.char_indices().nth(2) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single geocoding request.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Place name to coordinates. `None` is sent as an empty term.
    Forward { text: Option<String> },
    /// Coordinates to place description.
    Reverse { coordinates: Coordinates },
}

impl Query {
    pub fn forward(text: impl Into<String>) -> Self {
        Self::Forward {
            text: Some(text.into()),
        }
    }

    pub fn reverse(latitude: f64, longitude: f64) -> Self {
        Self::Reverse {
            coordinates: Coordinates::new(latitude, longitude),
        }
    }

    /// Forward query text, empty when absent.
    pub fn text(&self) -> &str {
        match self {
            Self::Forward { text } => text.as_deref().unwrap_or(""),
            Self::Reverse { .. } => "",
        }
    }

    /// Whether this is a forward query whose text is an IPv4 or IPv6 literal.
    pub fn is_ip_address(&self) -> bool {
        match self {
            Self::Forward { text: Some(text) } => text.trim().parse::<IpAddr>().is_ok(),
            _ => false,
        }
    }
}
