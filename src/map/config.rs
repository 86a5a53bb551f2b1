//! Map configuration types.
//!
//! [`MapConfig`] is what the deployment's configuration loading hands the
//! map at construction; [`ViewportOptions`] is the realized set of
//! construction options passed on to the map engine. Loading and merging
//! configuration files happens outside this crate.

use serde::Deserialize;

use crate::coord::Coordinate;

/// Default zoom level for the touchscreen map.
pub const DEFAULT_ZOOM: i32 = 14;

/// Visual style of the base map.
///
/// The kiosk exposes only a two-way toggle, no other map chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapType {
    /// Standard road map
    Roadmap,
    /// Satellite imagery with road overlay
    Hybrid,
}

/// Configuration for the touchscreen map.
///
/// Supplied at construction by the embedding application. All fields have
/// deployment-neutral defaults so a bare config section is valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Initial viewport center
    pub default_center: Coordinate,
    /// Initial viewport zoom level
    pub default_zoom: i32,
    /// Canvas background color shown while tiles load
    pub background: String,
    /// Theme identifier for the engine's styling data
    pub theme: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_center: Coordinate {
                lat: 37.422,
                lon: -122.084,
            },
            default_zoom: DEFAULT_ZOOM,
            background: String::from("black"),
            theme: String::from("peruse"),
        }
    }
}

/// Realized viewport construction options.
///
/// Derived from [`MapConfig`] plus the fixed kiosk constraints: default
/// UI chrome disabled, map-type toggle limited to roadmap/hybrid.
#[derive(Debug, Clone)]
pub struct ViewportOptions {
    /// Initial center
    pub center: Coordinate,
    /// Initial zoom level
    pub zoom: i32,
    /// Canvas background color
    pub background: String,
    /// Always true on a kiosk: no default engine chrome
    pub disable_default_ui: bool,
    /// Map types offered by the toggle control
    pub map_types: Vec<MapType>,
    /// Theme identifier for styling data
    pub theme: String,
}

impl ViewportOptions {
    /// Builds the viewport options for a kiosk map from its configuration.
    pub fn from_config(config: &MapConfig) -> Self {
        Self {
            center: config.default_center,
            zoom: config.default_zoom,
            background: config.background.clone(),
            disable_default_ui: true,
            map_types: vec![MapType::Roadmap, MapType::Hybrid],
            theme: config.theme.clone(),
        }
    }
}
