//! Map coordination module
//!
//! Owns the canonical "currently selected location" for the touchscreen
//! map and keeps the viewport, the selection marker, and the rest of the
//! application consistent with it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │ POI markers  │──┐
//! └──────────────┘  │                      ┌───────────────────────┐
//! ┌──────────────┐  │   SelectionEvent     │         Map           │
//! │ Click search │──┼────────────────────► │  (selection arbiter)  │
//! └──────────────┘  │                      └──────────┬────────────┘
//! ┌──────────────┐  │                                 │
//! │ Geolocation  │──┘              pan / marker rule  │  MapEvent
//! └──────────────┘                                    ▼
//!                                     viewport + marker     subscribers
//! ```
//!
//! Input sources emit [`events::SelectionEvent`]s; the arbiter applies
//! last-write-wins semantics, drives the viewport and marker, and
//! broadcasts a single outward [`events::MapEvent`] per accepted change.
//! Selection changes pushed from peer displays flow the other way through
//! [`Map::update_pano_by_id`] without being re-broadcast.
//!
//! # Components
//!
//! - [`events`] - Core types: `PanoId`, `SelectionEvent`, `SelectionSource`, `MapEvent`
//! - [`config`] - `MapConfig` and the realized `ViewportOptions`
//! - [`engine`] - Collaborator traits: `MapEngine`, `Viewport`, `SelectionMarker`, input sources
//! - [`arbiter`] - `SelectionArbiter` with the per-source marker rules
//! - [`coordinator`] - `Map`, the public surface wiring it all together

pub mod arbiter;
pub mod config;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod events;

pub use arbiter::SelectionArbiter;
pub use config::{MapConfig, MapType, ViewportOptions};
pub use coordinator::Map;
pub use engine::{
    CoverageOverlay, EventSource, MapEngine, PoiMarkerSource, SelectionMarker, SurfaceHandle,
    Viewport,
};
pub use error::MapError;
pub use events::{MapEvent, PanoId, SelectionEvent, SelectionSource};
