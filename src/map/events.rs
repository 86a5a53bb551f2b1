//! Event and identifier types for map coordination.
//!
//! This module defines the message types flowing through the coordination
//! core:
//!
//! - [`PanoId`] - opaque panorama identifier from the street view service
//! - [`SelectionEvent`] - "a location was chosen" payload from any input source
//! - [`SelectionSource`] - which input source produced an event
//! - [`MapEvent`] - outward notifications to the rest of the application

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::coord::Coordinate;

/// Opaque panorama identifier.
///
/// Defined by the external street view service; never parsed or
/// interpreted here, only carried and compared. Immutable once obtained.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PanoId(String);

impl PanoId {
    /// Creates a panorama identifier from its service-defined string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PanoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PanoId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for PanoId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A "location was chosen" message.
///
/// Transient payload produced by every input source and by the resolver;
/// it has no identity of its own. The most recently accepted one *is* the
/// selection state.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionEvent {
    /// Where the chosen panorama sits on the map
    pub coordinate: Coordinate,
    /// Which panorama was chosen
    pub pano_id: PanoId,
}

impl SelectionEvent {
    /// Creates a selection event.
    pub fn new(coordinate: Coordinate, pano_id: PanoId) -> Self {
        Self {
            coordinate,
            pano_id,
        }
    }
}

/// Which input source produced a selection event.
///
/// Closed set: the compiler enforces that the arbiter handles the marker
/// rule for every source kind. Sources differ only in that rule - a POI
/// marker click already shows its own marker, so the shared selection
/// marker is hidden rather than doubled up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionSource {
    /// Click on a pre-seeded point-of-interest marker
    PoiMarker,
    /// Result of a free-form click-driven search
    ClickSearch,
    /// Device geolocation fix
    Geolocation,
}

impl fmt::Display for SelectionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PoiMarker => write!(f, "poi_marker"),
            Self::ClickSearch => write!(f, "click_search"),
            Self::Geolocation => write!(f, "geolocation"),
        }
    }
}

/// Outward notifications emitted by the map.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// The viewport became interactively usable. Fired exactly once per
    /// map lifetime, after the rendering layer's first idle.
    Ready,
    /// Selection state changed to this panorama. Fired for accepted input
    /// source events and successful local selections, never for updates
    /// that originated on a peer display.
    PanoSelected(PanoId),
}
