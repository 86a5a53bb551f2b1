//! Selection arbiter - reconciles location events into one selection.
//!
//! The arbiter owns the single authoritative selection slot. Events from
//! the three input sources, and resolver results from the externally
//! triggered operations, all land here; each accepted one fully replaces
//! the slot (last-write-wins), drives the viewport and the selection
//! marker, and - when this display originated the change - broadcasts a
//! [`MapEvent::PanoSelected`] to the rest of the application.
//!
//! # Marker rules
//!
//! Sources differ only in what happens to the shared selection marker:
//!
//! - POI marker click → **hide** (the POI's own marker already shows the choice)
//! - click search / geolocation → **move** to the event coordinate
//! - local selection (`select`) → **hide** (the selecting UI shows it)
//! - peer update (`update`) → **move**, and no outward broadcast (the
//!   change originated elsewhere; re-broadcasting would loop it back)
//!
//! These asymmetries are deliberate and load-bearing for the multi-display
//! installation.
//!
//! # Atomicity
//!
//! Every operation here is synchronous. The coordinator funnels both
//! input-source events and resolver outcomes through its single consumer
//! loop, so one operation's replace/broadcast/pan/marker steps are never
//! interleaved with another's.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;

use crate::map::engine::{SelectionMarker, Viewport};
use crate::map::events::{MapEvent, PanoId, SelectionEvent, SelectionSource};
use crate::resolver::ResolvedPano;

/// Reconciles selection events and keeps the view consistent with the
/// winning one.
pub struct SelectionArbiter {
    /// The single authoritative selection slot. Absent until the first
    /// accepted event; replaced wholesale afterwards, never cleared.
    selection: RwLock<Option<SelectionEvent>>,

    /// Viewport to pan on every accepted change.
    viewport: Arc<dyn Viewport>,

    /// The shared selection marker.
    marker: Arc<dyn SelectionMarker>,

    /// Outward notification channel.
    event_tx: broadcast::Sender<MapEvent>,

    /// Guard for the one-shot `Ready` notification.
    ready_fired: AtomicBool,
}

impl SelectionArbiter {
    /// Creates an arbiter driving the given viewport and marker.
    pub fn new(
        viewport: Arc<dyn Viewport>,
        marker: Arc<dyn SelectionMarker>,
        event_tx: broadcast::Sender<MapEvent>,
    ) -> Self {
        Self {
            selection: RwLock::new(None),
            viewport,
            marker,
            event_tx,
            ready_fired: AtomicBool::new(false),
        }
    }

    /// Accepts a selection event from an input source.
    ///
    /// Replaces the selection slot, broadcasts the new panorama, pans the
    /// viewport, then applies the source's marker rule.
    pub fn accept(&self, source: SelectionSource, event: SelectionEvent) {
        tracing::debug!(source = %source, pano_id = %event.pano_id, "selection event accepted");

        let coordinate = event.coordinate;
        let pano_id = event.pano_id.clone();

        self.replace_selection(event);
        self.broadcast_pano(pano_id);
        self.viewport.pan_to(coordinate);

        match source {
            // The POI's own marker indicates the choice already.
            SelectionSource::PoiMarker => self.marker.hide(),
            // No existing marker for these, so one must be shown.
            SelectionSource::ClickSearch | SelectionSource::Geolocation => {
                self.marker.move_to(coordinate)
            }
        }
    }

    /// Applies a selection that originated on this display's own UI.
    ///
    /// Broadcasts the canonical panorama and hides the marker - the
    /// selecting UI is assumed to indicate the choice itself.
    pub fn apply_local_selection(&self, resolved: ResolvedPano) {
        tracing::debug!(pano_id = %resolved.pano_id, "local selection resolved");

        let coordinate = resolved.coordinate;
        let pano_id = resolved.pano_id.clone();

        self.replace_selection(SelectionEvent::new(coordinate, resolved.pano_id));
        self.broadcast_pano(pano_id);
        self.viewport.pan_to(coordinate);
        self.marker.hide();
    }

    /// Applies a selection pushed from a peer display.
    ///
    /// Pans and moves the marker but emits nothing outward: the change
    /// already originated elsewhere, and re-broadcasting it would create
    /// a feedback cycle across displays.
    pub fn apply_remote_update(&self, resolved: ResolvedPano) {
        tracing::debug!(pano_id = %resolved.pano_id, "remote update resolved");

        let coordinate = resolved.coordinate;

        self.replace_selection(SelectionEvent::new(coordinate, resolved.pano_id));
        self.viewport.pan_to(coordinate);
        self.marker.move_to(coordinate);
    }

    /// Emits the one-shot `Ready` notification.
    ///
    /// Safe to call more than once; only the first call emits.
    pub fn mark_ready(&self) {
        if !self.ready_fired.swap(true, Ordering::SeqCst) {
            tracing::debug!("map ready");
            let _ = self.event_tx.send(MapEvent::Ready);
        }
    }

    /// The current selection, if any event has been accepted yet.
    pub fn selection(&self) -> Option<SelectionEvent> {
        self.selection.read().unwrap().clone()
    }

    /// Whether any selection has been accepted yet.
    pub fn has_selection(&self) -> bool {
        self.selection.read().unwrap().is_some()
    }

    fn replace_selection(&self, event: SelectionEvent) {
        *self.selection.write().unwrap() = Some(event);
    }

    fn broadcast_pano(&self, pano_id: PanoId) {
        // Send fails only when nobody subscribes, which is fine.
        let _ = self.event_tx.send(MapEvent::PanoSelected(pano_id));
    }
}
