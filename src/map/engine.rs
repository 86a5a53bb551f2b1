//! Collaborator traits for the map engine and its submodules.
//!
//! The coordination core never renders anything itself. The tiling
//! engine, the selection marker, the coverage overlay, and the three
//! input-source widgets all live behind the traits in this module, which
//! describe exactly the surface the core needs:
//!
//! - [`MapEngine`] - factory bound to the underlying mapping library
//! - [`Viewport`] - pan/zoom plus the idle signal and kiosk link stripping
//! - [`SelectionMarker`] - the single shared marker (show at / hide)
//! - [`EventSource`] / [`PoiMarkerSource`] - producers of selection events
//! - [`CoverageOverlay`] - street view coverage layer, display-only
//!
//! All trait methods are infallible at this boundary: collaborators either
//! succeed or silently no-op. Their internal rendering errors are opaque
//! to the coordination core.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};

use crate::coord::Coordinate;
use crate::map::config::ViewportOptions;
use crate::map::error::MapError;
use crate::map::events::{PanoId, SelectionEvent};

/// Opaque handle to the rendering surface the map draws into.
///
/// On the kiosk this names a canvas element; the core only forwards it to
/// the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceHandle(String);

impl SurfaceHandle {
    /// Creates a surface handle from its engine-defined name.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The surface name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The pan/zoom-capable map viewport.
pub trait Viewport: Send + Sync {
    /// Pans the viewport so the coordinate is centered.
    fn pan_to(&self, coordinate: Coordinate);

    /// Current zoom level.
    fn zoom(&self) -> i32;

    /// Applies a new zoom level. Bounds clamping, if any, is the
    /// engine's business.
    fn set_zoom(&self, zoom: i32);

    /// Idle signal from the rendering layer.
    ///
    /// Starts `false`; flips to `true` once the engine has finished its
    /// asynchronous layout and the viewport is interactively usable.
    fn subscribe_idle(&self) -> watch::Receiver<bool>;

    /// Strips the incidental hyperlink affordances the rendering layer
    /// injects into the surface. Meaningless on a kiosk; invoked once
    /// after the first idle.
    fn disable_link_affordances(&self);
}

/// The single visual marker indicating the current selection.
pub trait SelectionMarker: Send + Sync {
    /// Shows the marker at the coordinate, moving it if already shown.
    fn move_to(&self, coordinate: Coordinate);

    /// Hides the marker. Selection state is unaffected - a hidden marker
    /// only means the current source indicates the choice some other way.
    fn hide(&self);
}

/// A producer of selection events.
///
/// Each input source turns one stimulus (marker click, click search,
/// geolocation fix) into [`SelectionEvent`]s on its own schedule.
pub trait EventSource: Send + Sync {
    /// Subscribes to this source's selection events.
    fn subscribe(&self) -> broadcast::Receiver<SelectionEvent>;
}

/// The pre-seeded point-of-interest marker set.
///
/// Emits a selection event when one of its markers is clicked, and can
/// materialize additional markers on request.
pub trait PoiMarkerSource: EventSource {
    /// Materializes a marker for the panorama, resolving its position
    /// internally. Fire-and-forget from the core's perspective.
    fn add_location_by_id(&self, pano_id: &PanoId);
}

/// Street view coverage overlay.
///
/// Renders autonomously once constructed and emits nothing; the core
/// only keeps it alive for the lifetime of the map.
pub trait CoverageOverlay: Send + Sync {}

/// Factory for the viewport and every submodule bound to it.
///
/// One implementation per mapping library. Construction order matters
/// only in that the viewport comes first; every other collaborator is
/// bound to it.
pub trait MapEngine: Send + Sync {
    /// Constructs the viewport on the given surface.
    ///
    /// # Errors
    ///
    /// [`MapError::EngineUnavailable`] if the mapping library is not
    /// loaded. This is fatal for the map.
    fn create_viewport(
        &self,
        surface: &SurfaceHandle,
        options: &ViewportOptions,
    ) -> Result<Arc<dyn Viewport>, MapError>;

    /// Constructs the selection marker on the viewport.
    fn create_selection_marker(&self, viewport: &Arc<dyn Viewport>) -> Arc<dyn SelectionMarker>;

    /// Constructs the street view coverage overlay on the viewport.
    fn create_coverage_overlay(&self, viewport: &Arc<dyn Viewport>) -> Arc<dyn CoverageOverlay>;

    /// Constructs the point-of-interest marker set on the viewport.
    fn create_poi_markers(&self, viewport: &Arc<dyn Viewport>) -> Arc<dyn PoiMarkerSource>;

    /// Constructs the click-driven search source on the viewport.
    fn create_click_search(&self, viewport: &Arc<dyn Viewport>) -> Arc<dyn EventSource>;

    /// Constructs the device geolocation source on the viewport.
    fn create_geolocation(&self, viewport: &Arc<dyn Viewport>) -> Arc<dyn EventSource>;
}
