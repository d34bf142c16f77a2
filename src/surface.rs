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

//! Rendering surface seam.
//!
//! The engine never touches map widgets directly. It drives a host-provided
//! [`MapSurface`] through opaque handles: one marker handle per entity, one
//! path handle for the route overlay. Mutating calls are fire-and-forget;
//! only creation can fail, and the engine treats that as a skip-and-retry.

use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;
use thiserror::Error;

use crate::geo::{LatLon, Pose};

/// Default marker icon edge length in pixels.
pub const DEFAULT_ICON_SIZE_PX: u32 = 32;

/// Errors reported by the rendering host.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The host could not create a marker element.
    #[error("marker creation failed: {0}")]
    Marker(String),

    /// The host could not create a path element.
    #[error("path creation failed: {0}")]
    Path(String),
}

/// Opaque handle to one marker on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerHandle(pub u64);

/// Opaque handle to one polyline on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathHandle(pub u64);

/// Visual description for a new marker.
#[derive(Debug, Clone, PartialEq)]
pub struct IconSpec {
    /// Marker title, usually the callsign or identifier.
    pub title: String,
    /// Square icon edge length in pixels.
    pub size_px: u32,
    /// Initial scale factor.
    pub scale: f32,
}

impl IconSpec {
    #[must_use]
    pub fn new(title: impl Into<String>, scale: f32) -> Self {
        Self {
            title: title.into(),
            size_px: DEFAULT_ICON_SIZE_PX,
            scale,
        }
    }
}

/// Host-provided rendering surface.
///
/// Implementations are expected to be cheap to call at frame rate; the
/// interpolator invokes `set_pose`/`set_rotation`/`set_scale` on every
/// animated frame for every moving entity.
pub trait MapSurface: Send + Sync {
    /// Create a marker at the given pose.
    fn add_marker(&self, pose: Pose, icon: &IconSpec) -> Result<MarkerHandle, SurfaceError>;

    /// Move a marker.
    fn set_pose(&self, handle: MarkerHandle, position: LatLon);

    /// Rotate a marker to a heading in degrees.
    fn set_rotation(&self, handle: MarkerHandle, heading: f64);

    /// Rescale a marker.
    fn set_scale(&self, handle: MarkerHandle, scale: f32);

    /// Show or hide a marker without destroying it.
    fn set_visible(&self, handle: MarkerHandle, visible: bool);

    /// Destroy a marker.
    fn remove_marker(&self, handle: MarkerHandle);

    /// Create a polyline through the given points.
    fn add_path(&self, points: &[LatLon]) -> Result<PathHandle, SurfaceError>;

    /// Replace a polyline's points.
    fn set_path_points(&self, handle: PathHandle, points: &[LatLon]);

    /// Destroy a polyline.
    fn remove_path(&self, handle: PathHandle);

    /// Center the view on a position.
    fn pan_to(&self, position: LatLon);

    /// Set the view zoom level.
    fn set_zoom(&self, zoom: f64);
}

/// Surface that renders nothing, for headless runs.
///
/// Handles are still allocated so the engine's create/update/remove flow is
/// fully exercised; every call is logged at debug level.
#[derive(Debug, Default)]
pub struct NullSurface {
    next_id: AtomicU64,
}

impl NullSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl MapSurface for NullSurface {
    fn add_marker(&self, pose: Pose, icon: &IconSpec) -> Result<MarkerHandle, SurfaceError> {
        let id = self.next_id();
        debug!(
            "marker {id} created: {} at ({:.4}, {:.4})",
            icon.title, pose.lat, pose.lon
        );
        Ok(MarkerHandle(id))
    }

    fn set_pose(&self, handle: MarkerHandle, position: LatLon) {
        debug!(
            "marker {} moved to ({:.4}, {:.4})",
            handle.0, position.lat, position.lon
        );
    }

    fn set_rotation(&self, handle: MarkerHandle, heading: f64) {
        debug!("marker {} rotated to {heading:.1}", handle.0);
    }

    fn set_scale(&self, handle: MarkerHandle, scale: f32) {
        debug!("marker {} scaled to {scale:.2}", handle.0);
    }

    fn set_visible(&self, handle: MarkerHandle, visible: bool) {
        debug!("marker {} visible: {visible}", handle.0);
    }

    fn remove_marker(&self, handle: MarkerHandle) {
        debug!("marker {} removed", handle.0);
    }

    fn add_path(&self, points: &[LatLon]) -> Result<PathHandle, SurfaceError> {
        let id = self.next_id();
        debug!("path {id} created with {} points", points.len());
        Ok(PathHandle(id))
    }

    fn set_path_points(&self, handle: PathHandle, points: &[LatLon]) {
        debug!("path {} updated with {} points", handle.0, points.len());
    }

    fn remove_path(&self, handle: PathHandle) {
        debug!("path {} removed", handle.0);
    }

    fn pan_to(&self, position: LatLon) {
        debug!("view centered on ({:.4}, {:.4})", position.lat, position.lon);
    }

    fn set_zoom(&self, zoom: f64) {
        debug!("view zoom set to {zoom}");
    }
}
