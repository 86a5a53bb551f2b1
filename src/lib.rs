//! TouchMap - map coordination core for street view touchscreen kiosks
//!
//! This library owns the "currently selected location" concept for a
//! kiosk-style touchscreen map that drives a wall of street view displays.
//! It arbitrates location events arriving from several independent input
//! sources (point-of-interest marker clicks, click-driven search, device
//! geolocation), keeps the selection marker and map viewport consistent
//! with the winning event, and republishes the selection to the rest of
//! the application exactly once per change.
//!
//! The map engine itself (tiles, styling, the actual input-source widgets)
//! and the panorama resolution service are external collaborators, reached
//! only through the traits in [`map::engine`] and [`resolver`].
//!
//! # High-Level API
//!
//! ```ignore
//! use touchmap::map::{Map, MapConfig, SurfaceHandle, MapEvent};
//!
//! let mut map = Map::new(SurfaceHandle::new("touchscreen-canvas"), engine, resolver, MapConfig::default());
//! let mut events = map.subscribe();
//! map.init().await?;
//!
//! while let Ok(event) = events.recv().await {
//!     match event {
//!         MapEvent::Ready => { /* viewport is interactively usable */ }
//!         MapEvent::PanoSelected(pano_id) => { /* drive the displays */ }
//!     }
//! }
//! ```

pub mod coord;
pub mod logging;
pub mod map;
pub mod resolver;

/// Version of the TouchMap library.
///
/// Defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
