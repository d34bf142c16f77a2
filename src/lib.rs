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

//! Live aircraft tracking engine over polled REST observation feeds.
//!
//! The engine turns periodic feed snapshots into a smoothly animated set of
//! map markers, without owning any map widget itself. It is split into
//! layers that can also be used on their own:
//!
//! - **Snapshot layer**: per-feed batches merged into one canonical,
//!   deduplicated snapshot per polling tick
//! - **Entity layer**: the live entity store, reconciled against each
//!   snapshot (create, update, remove)
//! - **Animation layer**: marker glide between consecutive reports, one
//!   cancellable animation per entity
//! - **Tracking control**: the area-scan and focused-pursuit modes, route
//!   overlay included, behind the [`LiveTracker`] facade
//!
//! Rendering goes through the [`surface::MapSurface`] trait; hosts provide
//! an implementation over their map widget, and headless runs use
//! [`surface::NullSurface`].
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use adsb_api::ApiClient;
//! use skyglass::config::AppConfig;
//! use skyglass::feed::{AdsbFeed, AdsbRoutes};
//! use skyglass::geo::{FixedViewport, LatLon};
//! use skyglass::surface::NullSurface;
//! use skyglass::tracker::{LiveTracker, TrackerSettings};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let client = ApiClient::new(config.api_base_url.clone());
//!
//!     let tracker = LiveTracker::new(
//!         Arc::new(AdsbFeed::new(
//!             client.clone(),
//!             config.enabled_categories(),
//!             config.request_timeout(),
//!         )),
//!         Arc::new(AdsbRoutes::new(client, config.request_timeout())),
//!         Arc::new(NullSurface::new()),
//!         Arc::new(FixedViewport::around(LatLon::new(33.9425, -118.4081), 250.0)),
//!         TrackerSettings::from(&config),
//!     );
//!
//!     let mut events = tracker.subscribe();
//!     tracker.start();
//!
//!     while let Ok(event) = events.recv().await {
//!         println!("{event:?}");
//!     }
//! }
//! ```

pub mod animate;
pub mod config;
pub mod entity;
pub mod feed;
pub mod geo;
pub mod observation;
pub mod reconcile;
pub mod route;
pub mod snapshot;
pub mod status;
pub mod surface;
pub mod tracker;

pub use animate::Animator;
pub use config::AppConfig;
pub use entity::{Entity, EntityStore};
pub use feed::{AdsbFeed, AdsbRoutes, FeedAdapter, FeedBatch, FeedError, RouteProvider};
pub use geo::{AreaQuery, Bounds, FixedViewport, LatLon, Pose, ViewportProvider};
pub use observation::{Category, Observation};
pub use reconcile::{reconcile, ReconcileOutcome};
pub use route::{ResolvedRoute, RouteOverlay};
pub use snapshot::Snapshot;
pub use status::ScanStatus;
pub use surface::{MapSurface, MarkerHandle, NullSurface, PathHandle, SurfaceError};
pub use tracker::{LiveTracker, TrackerEvent, TrackerSettings, TrackingMode};
