// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Tracking mode control and the engine facade.
//!
//! [`LiveTracker`] runs one of two modes at a time. **Area scan** polls
//! every enabled feed for the visible region on a slow cadence and
//! reconciles the result into the live entity set. **Focused pursuit**
//! polls a single identifier on a faster cadence, glides its marker, and
//! keeps a route overlay's middle waypoint on the aircraft.
//!
//! Mode transitions swap a single active timer: the old loop's
//! cancellation token flips and the epoch counter bumps inside one lock
//! scope, so exactly one timer is ever live and an in-flight tick from the
//! old mode finds its epoch stale and discards itself instead of mutating
//! state it no longer owns.
//!
//! The engine's state sits behind one mutex that is never held across an
//! await; every fetch completes first and the reconcile/animate step then
//! runs synchronously on a consistent view.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::animate::Animator;
use crate::config::AppConfig;
use crate::entity::{scale_for_altitude, Entity, EntityStore};
use crate::feed::{FeedAdapter, RouteProvider};
use crate::geo::{AreaQuery, Pose, ViewportProvider};
use crate::reconcile::reconcile;
use crate::route::{ResolvedRoute, RouteOverlay};
use crate::snapshot::Snapshot;
use crate::status::ScanStatus;
use crate::surface::MapSurface;

/// Capacity of the event broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Errors from focus transitions.
#[derive(Debug, Error)]
pub enum FocusError {
    /// The identifier is not in the live entity set.
    #[error("unknown entity: {0}")]
    UnknownEntity(String),
}

/// Which polling mode is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingMode {
    /// Scanning everything in the viewport on the slow cadence.
    AreaScan,
    /// Following one identifier on the fast cadence.
    FocusedPursuit { ident: String },
}

impl TrackingMode {
    /// The focused identifier, when pursuing.
    #[must_use]
    pub fn focused_ident(&self) -> Option<&str> {
        match self {
            TrackingMode::AreaScan => None,
            TrackingMode::FocusedPursuit { ident } => Some(ident),
        }
    }
}

/// Events emitted by the engine.
///
/// The stream is read-only observation; no consumer can mutate the entity
/// set through it.
#[derive(Debug, Clone)]
pub enum TrackerEvent {
    /// A selection entered focused pursuit.
    EntityFocused { ident: String, pose: Pose },
    /// Focused pursuit ended and the area scan resumed.
    FocusEnded { ident: String },
    /// The focused aircraft's route resolved with drawable endpoints.
    RouteResolved {
        ident: String,
        route: ResolvedRoute,
    },
    /// No drawable route for the focused aircraft; pursuit continues bare.
    RouteUnavailable { ident: String },
    /// One area scan finished.
    ScanCompleted { merged: usize, visible: usize },
}

/// Engine timing and view settings.
#[derive(Debug, Clone)]
pub struct TrackerSettings {
    /// Area-scan polling cadence.
    pub area_scan_interval: Duration,
    /// Focused-pursuit polling cadence.
    pub pursuit_interval: Duration,
    /// Marker glide window between polls.
    pub animation_window: Duration,
    /// Minimum area query radius in nautical miles.
    pub min_query_radius_nm: f64,
    /// Zoom applied when a focus begins.
    pub focus_zoom: f64,
    /// Zoom restored when a focus ends.
    pub overview_zoom: f64,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            area_scan_interval: Duration::from_secs(4),
            pursuit_interval: Duration::from_secs(3),
            animation_window: Duration::from_secs(5),
            min_query_radius_nm: 250.0,
            focus_zoom: 10.0,
            overview_zoom: 8.0,
        }
    }
}

impl From<&AppConfig> for TrackerSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            area_scan_interval: config.area_scan_interval(),
            pursuit_interval: config.pursuit_interval(),
            animation_window: config.animation_window(),
            min_query_radius_nm: config.min_query_radius_nm,
            focus_zoom: config.focus_zoom,
            overview_zoom: config.overview_zoom,
        }
    }
}

struct TrackerCore {
    entities: EntityStore,
    animator: Animator,
    route: Option<RouteOverlay>,
    mode: TrackingMode,
    /// Bumped on every mode transition; ticks carry the epoch they were
    /// spawned under and discard themselves when it no longer matches.
    epoch: u64,
    /// Token of the single active timer loop.
    timer: CancellationToken,
    status: ScanStatus,
}

impl TrackerCore {
    fn new(animation_window: Duration) -> Self {
        Self {
            entities: EntityStore::new(),
            animator: Animator::new(animation_window),
            route: None,
            mode: TrackingMode::AreaScan,
            epoch: 0,
            timer: CancellationToken::new(),
            status: ScanStatus::new(),
        }
    }

    /// Cancel the active timer and install a fresh token under a new epoch.
    fn swap_timer(&mut self) -> (CancellationToken, u64) {
        self.timer.cancel();
        self.timer = CancellationToken::new();
        self.epoch += 1;
        (self.timer.clone(), self.epoch)
    }
}

struct Shared {
    core: Mutex<TrackerCore>,
    feed: Arc<dyn FeedAdapter>,
    routes: Arc<dyn RouteProvider>,
    surface: Arc<dyn MapSurface>,
    viewport: Arc<dyn ViewportProvider>,
    events: broadcast::Sender<TrackerEvent>,
    settings: TrackerSettings,
}

/// The live-tracking engine.
///
/// Cheap to clone; clones share one engine. Timer loops run on the tokio
/// runtime the calling context provides, so [`LiveTracker::start`],
/// [`LiveTracker::focus`] and [`LiveTracker::quit_focus`] must be called
/// from within a runtime.
#[derive(Clone)]
pub struct LiveTracker {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for LiveTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.shared.core.lock().unwrap();
        f.debug_struct("LiveTracker")
            .field("mode", &core.mode)
            .field("entities", &core.entities.len())
            .finish_non_exhaustive()
    }
}

impl LiveTracker {
    /// Create an engine over the given collaborators.
    #[must_use]
    pub fn new(
        feed: Arc<dyn FeedAdapter>,
        routes: Arc<dyn RouteProvider>,
        surface: Arc<dyn MapSurface>,
        viewport: Arc<dyn ViewportProvider>,
        settings: TrackerSettings,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                core: Mutex::new(TrackerCore::new(settings.animation_window)),
                feed,
                routes,
                surface,
                viewport,
                events,
                settings,
            }),
        }
    }

    /// Begin area scanning. The first tick fires immediately.
    ///
    /// If a focus is active this behaves like [`LiveTracker::quit_focus`].
    pub fn start(&self) {
        if self.mode().focused_ident().is_some() {
            self.quit_focus();
            return;
        }
        let (token, epoch) = self.shared.core.lock().unwrap().swap_timer();
        info!(
            "area scan started ({} ms cadence)",
            self.shared.settings.area_scan_interval.as_millis()
        );
        self.shared.spawn_area_loop(token, epoch);
    }

    /// Enter focused pursuit of a live entity.
    ///
    /// Hides every other entity, zooms in, resolves the route in the
    /// background, and switches to the fast polling cadence. A new focus
    /// while one is active replaces it.
    pub fn focus(&self, ident: &str) -> Result<(), FocusError> {
        let (token, epoch, pose, callsign) = {
            let mut core = self.shared.core.lock().unwrap();

            let Some(entity) = core.entities.get(ident) else {
                return Err(FocusError::UnknownEntity(ident.to_string()));
            };
            let pose = entity.pose;
            let callsign = entity.callsign.clone();

            // Replacing an existing focus: restore the hidden entities and
            // drop the old overlay before hiding for the new target.
            if core.mode.focused_ident().is_some() {
                if let Some(overlay) = core.route.take() {
                    overlay.clear(self.shared.surface.as_ref());
                }
                core.entities.reveal_all(self.shared.surface.as_ref());
            }

            let (token, epoch) = core.swap_timer();
            core.mode = TrackingMode::FocusedPursuit {
                ident: ident.to_string(),
            };
            let hidden = core
                .entities
                .hide_all_except(ident, self.shared.surface.as_ref());
            debug!("focus on {ident}: {hidden} entities hidden");

            (token, epoch, pose, callsign)
        };

        self.shared.surface.pan_to(pose.position());
        self.shared.surface.set_zoom(self.shared.settings.focus_zoom);

        info!(
            "focused pursuit started for {ident} ({} ms cadence)",
            self.shared.settings.pursuit_interval.as_millis()
        );
        let _ = self.shared.events.send(TrackerEvent::EntityFocused {
            ident: ident.to_string(),
            pose,
        });

        self.shared
            .spawn_route_resolution(ident.to_string(), callsign, pose, epoch);
        self.shared
            .spawn_pursuit_loop(ident.to_string(), token, epoch);
        Ok(())
    }

    /// End focused pursuit and resume area scanning with an immediate tick.
    ///
    /// No-op when no focus is active.
    pub fn quit_focus(&self) {
        let (ident, token, epoch) = {
            let mut core = self.shared.core.lock().unwrap();
            let Some(ident) = core.mode.focused_ident().map(str::to_owned) else {
                return;
            };

            let (token, epoch) = core.swap_timer();
            core.mode = TrackingMode::AreaScan;
            if let Some(overlay) = core.route.take() {
                overlay.clear(self.shared.surface.as_ref());
            }
            let revealed = core.entities.reveal_all(self.shared.surface.as_ref());
            debug!("focus ended: {revealed} entities revealed");

            (ident, token, epoch)
        };

        self.shared
            .surface
            .set_zoom(self.shared.settings.overview_zoom);

        info!("focused pursuit ended for {ident}, area scan resumed");
        let _ = self.shared.events.send(TrackerEvent::FocusEnded { ident });

        // The loop's first tick fires immediately, refreshing the stale view.
        self.shared.spawn_area_loop(token, epoch);
    }

    /// Apply one animation frame. Call on the host's repaint cadence.
    pub fn advance_animations(&self) {
        let mut core = self.shared.core.lock().unwrap();
        let core = &mut *core;
        core.animator.advance(
            Instant::now(),
            &mut core.entities,
            self.shared.surface.as_ref(),
        );
    }

    /// Subscribe to engine events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TrackerEvent> {
        self.shared.events.subscribe()
    }

    /// The active tracking mode.
    #[must_use]
    pub fn mode(&self) -> TrackingMode {
        self.shared.core.lock().unwrap().mode.clone()
    }

    /// Number of live entities, hidden ones included.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.shared.core.lock().unwrap().entities.len()
    }

    /// Number of entities currently visible on the surface.
    #[must_use]
    pub fn visible_entity_count(&self) -> usize {
        self.shared.core.lock().unwrap().entities.visible_count()
    }

    /// A copy of one live entity.
    #[must_use]
    pub fn entity(&self, ident: &str) -> Option<Entity> {
        self.shared.core.lock().unwrap().entities.get(ident).cloned()
    }

    /// A copy of the current scan diagnostics.
    #[must_use]
    pub fn scan_status(&self) -> ScanStatus {
        self.shared.core.lock().unwrap().status.clone()
    }

    /// Stop the active timer loop.
    pub fn shutdown(&self) {
        let mut core = self.shared.core.lock().unwrap();
        core.timer.cancel();
        info!("tracking stopped");
    }
}

impl Shared {
    fn spawn_area_loop(self: &Arc<Self>, token: CancellationToken, epoch: u64) {
        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(shared.settings.area_scan_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        debug!("area scan loop (epoch {epoch}) stopped");
                        break;
                    }
                    _ = interval.tick() => {
                        shared.area_tick(epoch).await;
                    }
                }
            }
        });
    }

    fn spawn_pursuit_loop(self: &Arc<Self>, ident: String, token: CancellationToken, epoch: u64) {
        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(shared.settings.pursuit_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        debug!("pursuit loop for {ident} (epoch {epoch}) stopped");
                        break;
                    }
                    _ = interval.tick() => {
                        shared.pursuit_tick(&ident, epoch).await;
                    }
                }
            }
        });
    }

    /// One area-scan tick: query, merge, reconcile.
    async fn area_tick(&self, epoch: u64) {
        let Some(bounds) = self.viewport.visible_bounds() else {
            debug!("viewport has no bounds yet, skipping scan");
            return;
        };
        let query = AreaQuery::from_bounds(bounds, self.settings.min_query_radius_nm);
        let batches = self.feed.query_area(query).await;

        let (merged, visible) = {
            let mut core = self.core.lock().unwrap();
            if core.epoch != epoch {
                debug!("discarding stale area scan from epoch {epoch}");
                return;
            }
            for batch in &batches {
                core.status.record_batch(batch);
            }
            let snapshot = Snapshot::merge(batches);
            let merged = snapshot.len();

            let core = &mut *core;
            let focused = core.mode.focused_ident().map(str::to_owned);
            reconcile(
                &snapshot,
                &mut core.entities,
                &mut core.animator,
                self.surface.as_ref(),
                focused.as_deref(),
                Instant::now(),
            );
            let visible = core.entities.visible_count();
            core.status.record_scan(merged, visible);
            (merged, visible)
        };

        let _ = self
            .events
            .send(TrackerEvent::ScanCompleted { merged, visible });
    }

    /// One pursuit tick: query the identifier, glide, update the route.
    async fn pursuit_tick(&self, ident: &str, epoch: u64) {
        let result = self.feed.query_ident(ident).await;

        let position = {
            let mut core = self.core.lock().unwrap();
            if core.epoch != epoch {
                debug!("discarding stale pursuit tick from epoch {epoch}");
                return;
            }

            let observations = match result {
                Ok(observations) => observations,
                Err(error) => {
                    warn!("pursuit query failed for {ident}: {error}");
                    return;
                }
            };
            let Some(observation) = observations.into_iter().next() else {
                // The aircraft dropped off the feed; keep polling until the
                // user quits, it may reappear.
                debug!("no report for {ident} this tick");
                return;
            };

            let core = &mut *core;
            if let Some(entity) = core.entities.get_mut(ident) {
                entity.absorb(&observation);
                core.animator.animate(
                    entity,
                    observation.position,
                    observation.heading,
                    scale_for_altitude(observation.altitude),
                    Instant::now(),
                );
            }
            if let Some(overlay) = core.route.as_mut() {
                overlay.replace_middle(&[observation.position], self.surface.as_ref());
            }
            observation.position
        };

        self.surface.pan_to(position);
    }

    /// Resolve the focused aircraft's route off the timer path.
    fn spawn_route_resolution(
        self: &Arc<Self>,
        ident: String,
        callsign: Option<String>,
        pose: Pose,
        epoch: u64,
    ) {
        let Some(callsign) = callsign else {
            debug!("{ident} has no callsign, skipping route lookup");
            let _ = self.events.send(TrackerEvent::RouteUnavailable { ident });
            return;
        };

        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let route = match shared.routes.resolve_route(&callsign, pose.position()).await {
                Ok(route) => route,
                Err(error) => {
                    warn!("route resolution failed for {callsign}: {error}");
                    ResolvedRoute::default()
                }
            };

            let (Some(origin), Some(destination)) = (&route.origin, &route.destination) else {
                info!("no drawable route for {callsign}");
                let _ = shared.events.send(TrackerEvent::RouteUnavailable { ident });
                return;
            };
            let endpoints = (origin.position, destination.position);

            {
                let mut core = shared.core.lock().unwrap();
                if core.epoch != epoch {
                    debug!("route for {callsign} arrived after focus ended, dropped");
                    return;
                }
                match RouteOverlay::create(endpoints.0, endpoints.1, shared.surface.as_ref()) {
                    Ok(overlay) => core.route = Some(overlay),
                    Err(error) => {
                        warn!("route overlay creation failed for {callsign}: {error}");
                        drop(core);
                        let _ = shared.events.send(TrackerEvent::RouteUnavailable { ident });
                        return;
                    }
                }
            }

            let _ = shared
                .events
                .send(TrackerEvent::RouteResolved { ident, route });
        });
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Ok(core) = self.core.lock() {
            core.timer.cancel();
        }
    }
}
