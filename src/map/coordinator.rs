//! The map coordinator - public surface of the coordination core.
//!
//! [`Map`] wires the viewport, the selection marker, and the three input
//! sources together, runs the event loop that feeds the
//! [`SelectionArbiter`], and exposes the externally triggered operations
//! (`select_pano_by_id`, `update_pano_by_id`, POI seeding, zoom).
//!
//! # Lifecycle
//!
//! 1. **Creation**: `new()` takes the surface handle, engine, resolver
//!    and configuration; nothing is constructed yet
//! 2. **Initialization**: `init()` builds the viewport and submodules,
//!    spawns the forwarder/handler tasks, and arms the one-shot `Ready`
//!    signal on the viewport's first idle
//! 3. **Operation**: input sources and the public operations drive the
//!    arbiter; subscribers receive [`MapEvent`]s
//! 4. **Shutdown**: `shutdown()` (or drop) cancels the token, aborts any
//!    pending resolution, and waits for the tasks to finish
//!
//! # Ordering
//!
//! All input-source events *and* resolver outcomes funnel through one
//! mpsc channel drained by a single handler task, so every state/view
//! mutation is handled in arrival order and each one's
//! replace/broadcast/pan/marker sequence runs to completion before the
//! next begins - including under a multi-thread runtime.

use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, mpsc};
use tokio::task::{AbortHandle, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::map::arbiter::SelectionArbiter;
use crate::map::config::{MapConfig, ViewportOptions};
use crate::map::engine::{
    CoverageOverlay, MapEngine, PoiMarkerSource, SurfaceHandle, Viewport,
};
use crate::map::error::MapError;
use crate::map::events::{MapEvent, PanoId, SelectionEvent, SelectionSource};
use crate::resolver::{PanoResolver, ResolvedPano};

/// Capacity of the outward notification channel.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Capacity of the internal arbitration channel.
const INPUT_CHANNEL_CAPACITY: usize = 32;

/// Which externally triggered operation asked for a resolution.
///
/// Local selections broadcast and hide the marker; remote updates stay
/// silent and move it. See [`SelectionArbiter`] for the rationale.
#[derive(Debug, Clone, Copy)]
enum ResolutionKind {
    LocalSelect,
    RemoteUpdate,
}

/// One unit of work for the arbitration loop.
///
/// Input-source events and resolver outcomes share the channel so that
/// a single consumer serializes all mutations of the selection slot,
/// the viewport, and the marker.
enum ArbiterInput {
    /// An input source produced a selection event.
    Source(SelectionSource, SelectionEvent),
    /// A resolver-backed operation completed successfully.
    Resolved(ResolutionKind, ResolvedPano),
}

/// Collaborators constructed during `init`.
struct Wired {
    viewport: Arc<dyn Viewport>,
    arbiter: Arc<SelectionArbiter>,
    poi_markers: Arc<dyn PoiMarkerSource>,
    /// Feeds the arbitration loop; resolver outcomes go through here.
    input_tx: mpsc::Sender<ArbiterInput>,
    /// Display-only; kept alive for the map's lifetime.
    _coverage: Arc<dyn CoverageOverlay>,
}

/// The touchscreen map coordination core.
///
/// One per rendering surface, alive for the process lifetime. Generic
/// over the panorama resolver so deployments and tests can plug their
/// own in; the engine and its submodules stay behind trait objects.
pub struct Map<R: PanoResolver> {
    surface: SurfaceHandle,
    engine: Arc<dyn MapEngine>,
    resolver: Arc<R>,
    config: MapConfig,

    /// Outward notification channel; subscribable before `init`.
    event_tx: broadcast::Sender<MapEvent>,

    /// Cancels every background task on shutdown.
    shutdown_token: CancellationToken,

    /// Set by `init`.
    wired: Option<Wired>,

    /// Forwarder, handler, and ready-signal tasks.
    tasks: Vec<JoinHandle<()>>,

    /// Abort handle for the most recent resolution still in flight.
    /// A newer `select`/`update` call supersedes it (last-write-wins).
    pending_resolution: Mutex<Option<AbortHandle>>,
}

impl<R: PanoResolver + 'static> Map<R> {
    /// Creates an uninitialized map for the given surface.
    pub fn new(
        surface: SurfaceHandle,
        engine: Arc<dyn MapEngine>,
        resolver: Arc<R>,
        config: MapConfig,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            surface,
            engine,
            resolver,
            config,
            event_tx,
            shutdown_token: CancellationToken::new(),
            wired: None,
            tasks: Vec::new(),
            pending_resolution: Mutex::new(None),
        }
    }

    /// Constructs the viewport and submodules and wires the event flow.
    ///
    /// `Ready` is emitted asynchronously once the viewport reports its
    /// first idle, not when this returns - the rendering layer finishes
    /// its layout after construction.
    ///
    /// # Errors
    ///
    /// [`MapError::EngineUnavailable`] if the mapping library is absent
    /// (fatal, not retried), [`MapError::AlreadyInitialized`] on a second
    /// call.
    pub async fn init(&mut self) -> Result<(), MapError> {
        if self.wired.is_some() {
            return Err(MapError::AlreadyInitialized);
        }
        debug!(surface = self.surface.as_str(), "map init");

        let options = ViewportOptions::from_config(&self.config);
        let viewport = self.engine.create_viewport(&self.surface, &options)?;
        let marker = self.engine.create_selection_marker(&viewport);
        let coverage = self.engine.create_coverage_overlay(&viewport);
        let poi_markers = self.engine.create_poi_markers(&viewport);
        let click_search = self.engine.create_click_search(&viewport);
        let geolocation = self.engine.create_geolocation(&viewport);

        let arbiter = Arc::new(SelectionArbiter::new(
            viewport.clone(),
            marker,
            self.event_tx.clone(),
        ));

        // One forwarder per source tags its events with the source kind;
        // a single consumer serializes handling in arrival order. The
        // resolver-backed operations send into the same channel, so their
        // applies never interleave with an event mid-handling.
        let (input_tx, input_rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        for (source, events) in [
            (SelectionSource::PoiMarker, poi_markers.subscribe()),
            (SelectionSource::ClickSearch, click_search.subscribe()),
            (SelectionSource::Geolocation, geolocation.subscribe()),
        ] {
            self.tasks.push(tokio::spawn(forward_source(
                source,
                events,
                input_tx.clone(),
                self.shutdown_token.child_token(),
            )));
        }

        self.tasks.push(tokio::spawn(drive_arbiter(
            arbiter.clone(),
            input_rx,
            self.shutdown_token.child_token(),
        )));

        self.tasks.push(tokio::spawn(signal_ready(
            viewport.clone(),
            arbiter.clone(),
            self.shutdown_token.child_token(),
        )));

        self.wired = Some(Wired {
            viewport,
            arbiter,
            poi_markers,
            input_tx,
            _coverage: coverage,
        });
        Ok(())
    }

    /// Subscribes to outward map notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<MapEvent> {
        self.event_tx.subscribe()
    }

    /// Selects a panorama chosen on this display's own interface.
    ///
    /// Resolves the identifier, then broadcasts the canonical panorama,
    /// pans the viewport, and hides the selection marker. The outcome is
    /// applied by the arbitration loop, in order with the input-source
    /// events. On resolution failure the error is logged and nothing
    /// changes.
    pub async fn select_pano_by_id(&self, pano_id: PanoId) {
        self.resolve_and_apply(pano_id, ResolutionKind::LocalSelect)
            .await;
    }

    /// Follows a panorama change that originated on a peer display.
    ///
    /// Resolves the identifier, then pans the viewport and moves the
    /// selection marker - without re-broadcasting, which would bounce the
    /// change back across displays. The outcome is applied by the
    /// arbitration loop, in order with the input-source events. On
    /// resolution failure the error is logged and nothing changes.
    pub async fn update_pano_by_id(&self, pano_id: PanoId) {
        self.resolve_and_apply(pano_id, ResolutionKind::RemoteUpdate)
            .await;
    }

    /// Seeds a point-of-interest marker for the panorama.
    ///
    /// Pass-through to the POI marker set; no coordination state changes.
    pub fn add_location_by_id(&self, pano_id: &PanoId) {
        match &self.wired {
            Some(wired) => wired.poi_markers.add_location_by_id(pano_id),
            None => warn!(pano_id = %pano_id, "POI seed requested before init"),
        }
    }

    /// Zooms the viewport in by one level.
    pub fn zoom_in(&self) {
        self.adjust_zoom(1);
    }

    /// Zooms the viewport out by one level.
    pub fn zoom_out(&self) {
        self.adjust_zoom(-1);
    }

    /// The current selection, if any.
    pub fn selection(&self) -> Option<SelectionEvent> {
        self.wired.as_ref().and_then(|wired| wired.arbiter.selection())
    }

    /// Cancels background tasks and any in-flight resolution.
    ///
    /// A resolver completion arriving after this point fires into nothing
    /// instead of mutating a defunct map.
    pub async fn shutdown(&mut self) {
        debug!("map shutdown");
        self.shutdown_token.cancel();
        if let Some(pending) = self.pending_resolution.lock().unwrap().take() {
            pending.abort();
        }
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }
    }

    fn adjust_zoom(&self, delta: i32) {
        match &self.wired {
            Some(wired) => {
                let viewport = &wired.viewport;
                viewport.set_zoom(viewport.zoom() + delta);
            }
            None => warn!("zoom requested before init"),
        }
    }

    /// Resolves `pano_id` in a background task and queues the outcome for
    /// the arbitration loop.
    ///
    /// The task is registered as the pending resolution; a newer call
    /// aborts it, so when calls overlap the later one wins. Abort can
    /// only land while the resolver is awaited or the outcome is still
    /// queued, never mid-apply - the loop applies each outcome
    /// synchronously.
    async fn resolve_and_apply(&self, pano_id: PanoId, kind: ResolutionKind) {
        let Some(input_tx) = self.wired.as_ref().map(|wired| wired.input_tx.clone()) else {
            warn!(pano_id = %pano_id, "resolution requested before init");
            return;
        };
        let resolver = Arc::clone(&self.resolver);
        let token = self.shutdown_token.child_token();

        let task = tokio::spawn(async move {
            let resolved = tokio::select! {
                _ = token.cancelled() => return,
                result = resolver.resolve(&pano_id) => match result {
                    Ok(resolved) => resolved,
                    Err(err) => {
                        match kind {
                            ResolutionKind::LocalSelect => {
                                error!(pano_id = %pano_id, error = %err, "select query failed")
                            }
                            ResolutionKind::RemoteUpdate => {
                                error!(pano_id = %pano_id, error = %err, "update query failed")
                            }
                        }
                        return;
                    }
                },
            };
            // Applied by the arbitration loop, not here, so the apply
            // cannot interleave with a source event mid-handling.
            let _ = input_tx.send(ArbiterInput::Resolved(kind, resolved)).await;
        });

        {
            let mut pending = self.pending_resolution.lock().unwrap();
            if let Some(previous) = pending.replace(task.abort_handle()) {
                previous.abort();
            }
        }
        let _ = task.await;
    }
}

impl<R: PanoResolver> Drop for Map<R> {
    fn drop(&mut self) {
        self.shutdown_token.cancel();
        if let Ok(mut pending) = self.pending_resolution.lock() {
            if let Some(handle) = pending.take() {
                handle.abort();
            }
        }
    }
}

/// Forwards one input source's events into the shared channel, tagged
/// with the source kind.
async fn forward_source(
    source: SelectionSource,
    mut events: broadcast::Receiver<SelectionEvent>,
    tx: mpsc::Sender<ArbiterInput>,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            result = events.recv() => match result {
                Ok(event) => {
                    if tx.send(ArbiterInput::Source(source, event)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(source = %source, skipped, "input source events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}

/// Drains the shared channel into the arbiter, one input at a time.
async fn drive_arbiter(
    arbiter: Arc<SelectionArbiter>,
    mut input_rx: mpsc::Receiver<ArbiterInput>,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            received = input_rx.recv() => match received {
                Some(ArbiterInput::Source(source, event)) => arbiter.accept(source, event),
                Some(ArbiterInput::Resolved(ResolutionKind::LocalSelect, resolved)) => {
                    arbiter.apply_local_selection(resolved)
                }
                Some(ArbiterInput::Resolved(ResolutionKind::RemoteUpdate, resolved)) => {
                    arbiter.apply_remote_update(resolved)
                }
                None => break,
            },
        }
    }
}

/// Waits for the viewport's first idle, strips kiosk-hostile link
/// affordances, and fires the one-shot `Ready`.
async fn signal_ready(
    viewport: Arc<dyn Viewport>,
    arbiter: Arc<SelectionArbiter>,
    token: CancellationToken,
) {
    let mut idle = viewport.subscribe_idle();
    tokio::select! {
        _ = token.cancelled() => {}
        result = idle.wait_for(|is_idle| *is_idle) => {
            if result.is_ok() {
                viewport.disable_link_affordances();
                arbiter.mark_ready();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::future::Future;
    use std::time::Duration;

    use crate::coord::Coordinate;
    use crate::map::engine::tests::{MarkerState, MockEngine};
    use crate::resolver::{ResolveError, ResolvedPano};

    struct MockResolver {
        responses: Mutex<HashMap<PanoId, Result<ResolvedPano, ResolveError>>>,
        delays: Mutex<HashMap<PanoId, Duration>>,
    }

    impl MockResolver {
        fn new() -> Self {
            Self {
                responses: Mutex::new(HashMap::new()),
                delays: Mutex::new(HashMap::new()),
            }
        }

        fn resolves(&self, pano_id: &str, canonical: &str, lat: f64, lon: f64) {
            self.responses.lock().unwrap().insert(
                PanoId::new(pano_id),
                Ok(ResolvedPano {
                    pano_id: PanoId::new(canonical),
                    coordinate: Coordinate::new(lat, lon).unwrap(),
                }),
            );
        }

        /// Like `resolves`, but the resolution takes `delay` to complete.
        fn resolves_slowly(
            &self,
            pano_id: &str,
            canonical: &str,
            lat: f64,
            lon: f64,
            delay: Duration,
        ) {
            self.resolves(pano_id, canonical, lat, lon);
            self.delays.lock().unwrap().insert(PanoId::new(pano_id), delay);
        }

        fn fails(&self, pano_id: &str) {
            self.responses.lock().unwrap().insert(
                PanoId::new(pano_id),
                Err(ResolveError::Backend(String::from("quota exceeded"))),
            );
        }
    }

    impl PanoResolver for MockResolver {
        fn resolve(
            &self,
            pano_id: &PanoId,
        ) -> impl Future<Output = Result<ResolvedPano, ResolveError>> + Send {
            let result = self
                .responses
                .lock()
                .unwrap()
                .get(pano_id)
                .cloned()
                .unwrap_or_else(|| Err(ResolveError::NotFound(pano_id.clone())));
            let delay = self.delays.lock().unwrap().get(pano_id).copied();
            async move {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                result
            }
        }
    }

    async fn make_map() -> (Map<MockResolver>, Arc<MockEngine>, Arc<MockResolver>) {
        let engine = Arc::new(MockEngine::new());
        let resolver = Arc::new(MockResolver::new());
        let mut map = Map::new(
            SurfaceHandle::new("canvas"),
            engine.clone(),
            resolver.clone(),
            MapConfig::default(),
        );
        map.init().await.expect("init should succeed");
        (map, engine, resolver)
    }

    /// Let the forwarder and handler tasks catch up.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    fn event(lat: f64, lon: f64, id: &str) -> SelectionEvent {
        SelectionEvent::new(Coordinate::new(lat, lon).unwrap(), PanoId::new(id))
    }

    #[tokio::test]
    async fn test_init_fails_without_engine() {
        let engine = Arc::new(MockEngine::unavailable());
        let resolver = Arc::new(MockResolver::new());
        let mut map = Map::new(
            SurfaceHandle::new("canvas"),
            engine,
            resolver,
            MapConfig::default(),
        );

        let result = map.init().await;
        assert!(matches!(result, Err(MapError::EngineUnavailable(_))));
    }

    #[tokio::test]
    async fn test_init_twice_is_rejected() {
        let (mut map, _engine, _resolver) = {
            let engine = Arc::new(MockEngine::new());
            let resolver = Arc::new(MockResolver::new());
            let mut map = Map::new(
                SurfaceHandle::new("canvas"),
                engine.clone(),
                resolver.clone(),
                MapConfig::default(),
            );
            map.init().await.unwrap();
            (map, engine, resolver)
        };

        assert!(matches!(map.init().await, Err(MapError::AlreadyInitialized)));
    }

    #[tokio::test]
    async fn test_ready_fires_once_after_first_idle() {
        let (mut map, engine, _resolver) = make_map().await;
        let mut events = map.subscribe();

        // Not ready until the viewport goes idle
        settle().await;
        assert!(events.try_recv().is_err());
        assert!(!engine.viewport.links_disabled());

        engine.viewport.set_idle(true);
        settle().await;
        assert_eq!(events.try_recv().expect("notification expected"), MapEvent::Ready);
        assert!(engine.viewport.links_disabled());

        // A later idle cycle must not re-fire
        engine.viewport.set_idle(false);
        engine.viewport.set_idle(true);
        settle().await;
        assert!(events.try_recv().is_err());

        map.shutdown().await;
    }

    #[tokio::test]
    async fn test_search_event_pans_broadcasts_and_shows_marker() {
        let (mut map, engine, _resolver) = make_map().await;
        let mut events = map.subscribe();

        let ev = event(53.5, 10.0, "pano-a");
        engine.search.emit(ev.clone());
        settle().await;

        assert_eq!(events.try_recv().expect("notification expected"), MapEvent::PanoSelected(PanoId::new("pano-a")));
        assert_eq!(engine.viewport.last_pan(), Some(ev.coordinate));
        assert_eq!(engine.marker.state(), MarkerState::Visible(ev.coordinate));
        assert_eq!(map.selection(), Some(ev));

        map.shutdown().await;
    }

    #[tokio::test]
    async fn test_poi_event_hides_marker() {
        let (mut map, engine, _resolver) = make_map().await;

        engine.geolocation.emit(event(40.0, 5.0, "pano-a"));
        settle().await;
        assert!(matches!(engine.marker.state(), MarkerState::Visible(_)));

        let ev = event(41.0, 6.0, "pano-b");
        engine.poi.emit(ev.clone());
        settle().await;

        assert_eq!(engine.marker.state(), MarkerState::Hidden);
        assert_eq!(map.selection(), Some(ev));

        map.shutdown().await;
    }

    #[tokio::test]
    async fn test_last_write_wins_across_sources() {
        let (mut map, engine, _resolver) = make_map().await;

        engine.poi.emit(event(40.0, 5.0, "pano-a"));
        engine.search.emit(event(41.0, 6.0, "pano-b"));
        let last = event(42.0, 7.0, "pano-c");
        engine.geolocation.emit(last.clone());
        settle().await;

        assert_eq!(map.selection(), Some(last));

        map.shutdown().await;
    }

    #[tokio::test]
    async fn test_select_pano_success() {
        let (mut map, engine, resolver) = make_map().await;
        let mut events = map.subscribe();
        resolver.resolves("alias", "canonical", 48.85, 2.35);

        map.select_pano_by_id(PanoId::new("alias")).await;
        settle().await;

        let expected = Coordinate::new(48.85, 2.35).unwrap();
        assert_eq!(events.try_recv().expect("notification expected"), MapEvent::PanoSelected(PanoId::new("canonical")));
        assert!(events.try_recv().is_err(), "exactly one notification");
        assert_eq!(engine.viewport.last_pan(), Some(expected));
        assert_eq!(engine.marker.state(), MarkerState::Hidden);

        map.shutdown().await;
    }

    #[tokio::test]
    async fn test_select_pano_failure_changes_nothing() {
        let (mut map, engine, resolver) = make_map().await;
        resolver.fails("bad");

        // Establish a prior selection first
        engine.search.emit(event(53.5, 10.0, "pano-a"));
        settle().await;
        let before = map.selection();
        let pans_before = engine.viewport.pan_count();
        let mut events = map.subscribe();

        map.select_pano_by_id(PanoId::new("bad")).await;
        settle().await;

        assert!(events.try_recv().is_err(), "no notification on failure");
        assert_eq!(map.selection(), before);
        assert_eq!(engine.viewport.pan_count(), pans_before);
        assert!(matches!(engine.marker.state(), MarkerState::Visible(_)));

        map.shutdown().await;
    }

    #[tokio::test]
    async fn test_update_pano_is_silent_and_moves_marker() {
        let (mut map, engine, resolver) = make_map().await;
        let mut events = map.subscribe();
        resolver.resolves("peer", "peer", 48.85, 2.35);

        map.update_pano_by_id(PanoId::new("peer")).await;
        settle().await;

        let expected = Coordinate::new(48.85, 2.35).unwrap();
        assert!(events.try_recv().is_err(), "peer updates must stay silent");
        assert_eq!(engine.viewport.last_pan(), Some(expected));
        assert_eq!(engine.marker.state(), MarkerState::Visible(expected));

        map.shutdown().await;
    }

    #[tokio::test]
    async fn test_update_pano_failure_changes_nothing() {
        let (mut map, engine, resolver) = make_map().await;
        resolver.fails("bad");
        let pans_before = engine.viewport.pan_count();

        map.update_pano_by_id(PanoId::new("bad")).await;
        settle().await;

        assert_eq!(engine.viewport.pan_count(), pans_before);
        assert_eq!(engine.marker.state(), MarkerState::Hidden);

        map.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_resolution_never_interleaves_with_event_handling() {
        let (mut map, engine, resolver) = make_map().await;
        let mut events = map.subscribe();
        resolver.resolves("alias", "canonical", 10.0, 20.0);

        // Hold the handler mid-pan on a search event, then complete a
        // select while it is blocked. The select outcome must wait its
        // turn instead of racing the event's remaining steps.
        engine.viewport.delay_next_pan(Duration::from_millis(150));
        engine.search.emit(event(40.0, 5.0, "pano-a"));
        tokio::time::sleep(Duration::from_millis(50)).await;
        map.select_pano_by_id(PanoId::new("alias")).await;
        tokio::time::sleep(Duration::from_millis(300)).await;

        let expected = Coordinate::new(10.0, 20.0).unwrap();
        assert_eq!(
            events.try_recv().expect("notification expected"),
            MapEvent::PanoSelected(PanoId::new("pano-a"))
        );
        assert_eq!(
            events.try_recv().expect("notification expected"),
            MapEvent::PanoSelected(PanoId::new("canonical"))
        );
        assert_eq!(
            map.selection().map(|s| s.pano_id),
            Some(PanoId::new("canonical"))
        );
        assert_eq!(engine.viewport.last_pan(), Some(expected));
        assert_eq!(engine.marker.state(), MarkerState::Hidden);

        map.shutdown().await;
    }

    #[tokio::test]
    async fn test_overlapping_resolutions_later_call_wins() {
        let (mut map, engine, resolver) = make_map().await;
        let mut events = map.subscribe();
        resolver.resolves_slowly("first", "first-canonical", 10.0, 20.0, Duration::from_millis(300));
        resolver.resolves("second", "second-canonical", 30.0, 40.0);

        // The second call lands while the first is still resolving and
        // supersedes it.
        tokio::join!(map.select_pano_by_id(PanoId::new("first")), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            map.update_pano_by_id(PanoId::new("second")).await;
        });
        settle().await;

        let expected = Coordinate::new(30.0, 40.0).unwrap();
        assert!(
            events.try_recv().is_err(),
            "the superseded select must not broadcast"
        );
        assert_eq!(
            map.selection().map(|s| s.pano_id),
            Some(PanoId::new("second-canonical"))
        );
        assert_eq!(engine.viewport.last_pan(), Some(expected));
        assert_eq!(engine.marker.state(), MarkerState::Visible(expected));

        map.shutdown().await;
    }

    #[tokio::test]
    async fn test_zoom_in_out_is_an_inverse_pair() {
        let (mut map, engine, _resolver) = make_map().await;
        let original = engine.viewport.zoom();

        map.zoom_in();
        assert_eq!(engine.viewport.zoom(), original + 1);
        map.zoom_out();
        assert_eq!(engine.viewport.zoom(), original);

        map.shutdown().await;
    }

    #[tokio::test]
    async fn test_add_location_passes_through() {
        let (mut map, engine, _resolver) = make_map().await;

        map.add_location_by_id(&PanoId::new("poi-1"));
        assert_eq!(engine.poi.added(), vec![PanoId::new("poi-1")]);
        assert!(map.selection().is_none(), "no coordination state change");

        map.shutdown().await;
    }

    #[tokio::test]
    async fn test_operations_before_init_are_noops() {
        let engine = Arc::new(MockEngine::new());
        let resolver = Arc::new(MockResolver::new());
        let map = Map::new(
            SurfaceHandle::new("canvas"),
            engine.clone(),
            resolver,
            MapConfig::default(),
        );

        map.zoom_in();
        map.add_location_by_id(&PanoId::new("poi-1"));
        map.select_pano_by_id(PanoId::new("x")).await;

        assert_eq!(engine.viewport.zoom(), 0);
        assert!(engine.poi.added().is_empty());
        assert!(map.selection().is_none());
    }

    #[tokio::test]
    async fn test_shutdown_drops_in_flight_resolution() {
        struct SlowResolver;

        impl PanoResolver for SlowResolver {
            fn resolve(
                &self,
                _pano_id: &PanoId,
            ) -> impl Future<Output = Result<ResolvedPano, ResolveError>> + Send {
                async {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(ResolvedPano {
                        pano_id: PanoId::new("late"),
                        coordinate: Coordinate::new(0.0, 0.0).unwrap(),
                    })
                }
            }
        }

        let engine = Arc::new(MockEngine::new());
        let mut map = Map::new(
            SurfaceHandle::new("canvas"),
            engine.clone(),
            Arc::new(SlowResolver),
            MapConfig::default(),
        );
        map.init().await.unwrap();

        let map = Arc::new(tokio::sync::Mutex::new(map));
        let select_map = map.clone();
        let select = tokio::spawn(async move {
            let guard = select_map.lock().await;
            guard.select_pano_by_id(PanoId::new("slow")).await;
        });
        settle().await;

        // Shutdown while the resolution is pending; the select call must
        // come back without the late result being applied.
        select.abort();
        map.lock().await.shutdown().await;
        assert!(map.lock().await.selection().is_none());
    }
}
