//! Geographic coordinate type
//!
//! Provides the latitude/longitude value type shared by the map viewport,
//! the selection marker, and every location event in the system. The map
//! surface is a Web Mercator projection, so latitudes are bounded by the
//! projection's valid range rather than the geographic poles.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Web Mercator valid latitude range
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Errors that can occur when constructing a coordinate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Latitude outside the Web Mercator range
    #[error("invalid latitude {0}: must be between {MIN_LAT} and {MAX_LAT}")]
    InvalidLatitude(f64),
    /// Longitude outside the valid range
    #[error("invalid longitude {0}: must be between {MIN_LON} and {MAX_LON}")]
    InvalidLongitude(f64),
}

/// A latitude/longitude pair on the map surface.
///
/// Immutable value type. Every selection event, resolver result, and
/// viewport pan target carries one of these.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees, positive north
    pub lat: f64,
    /// Longitude in degrees, positive east
    pub lon: f64,
}

impl Coordinate {
    /// Creates a coordinate, validating both components against the
    /// projection's bounds.
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordError> {
        if !(MIN_LAT..=MAX_LAT).contains(&lat) {
            return Err(CoordError::InvalidLatitude(lat));
        }
        if !(MIN_LON..=MAX_LON).contains(&lon) {
            return Err(CoordError::InvalidLongitude(lon));
        }
        Ok(Self { lat, lon })
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
