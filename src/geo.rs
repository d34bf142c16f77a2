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

//! Geographic primitives and viewport query derivation.
//!
//! The area scan queries the feed by center point and radius. The radius is
//! derived with a single haversine measurement from the viewport center to
//! its northeast corner, expressed in nautical miles and floored at a
//! configurable minimum so a tightly zoomed viewport still sees traffic.

use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;
const KM_PER_NAUTICAL_MILE: f64 = 1.852;
const NAUTICAL_MILES_PER_DEGREE_LAT: f64 = 60.0;

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Distance to another point in nautical miles.
    #[must_use]
    pub fn distance_nm(&self, other: LatLon) -> f64 {
        haversine_km(*self, other) / KM_PER_NAUTICAL_MILE
    }
}

/// A rendered position plus orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub lat: f64,
    pub lon: f64,
    /// True track in degrees (0-360, north = 0).
    pub heading: f64,
}

impl Pose {
    #[must_use]
    pub fn new(lat: f64, lon: f64, heading: f64) -> Self {
        Self { lat, lon, heading }
    }

    #[must_use]
    pub fn position(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }
}

/// Rectangular viewport bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: LatLon,
    pub north_east: LatLon,
}

impl Bounds {
    #[must_use]
    pub fn new(south_west: LatLon, north_east: LatLon) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Geometric midpoint of the bounds.
    #[must_use]
    pub fn center(&self) -> LatLon {
        LatLon::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lon + self.north_east.lon) / 2.0,
        )
    }

    /// Bounds spanning `radius_nm` in each direction around a center point.
    #[must_use]
    pub fn around(center: LatLon, radius_nm: f64) -> Self {
        let delta_lat = radius_nm / NAUTICAL_MILES_PER_DEGREE_LAT;
        let delta_lon =
            radius_nm / (NAUTICAL_MILES_PER_DEGREE_LAT * center.lat.to_radians().cos().max(0.01));
        Self {
            south_west: LatLon::new(center.lat - delta_lat, center.lon - delta_lon),
            north_east: LatLon::new(center.lat + delta_lat, center.lon + delta_lon),
        }
    }
}

/// Source of the currently visible map bounds.
///
/// Returns `None` while the host surface has no usable viewport yet, which
/// skips the area-scan tick rather than querying a made-up region.
pub trait ViewportProvider: Send + Sync {
    fn visible_bounds(&self) -> Option<Bounds>;
}

/// A fixed viewport, used by the headless monitor and in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedViewport {
    bounds: Bounds,
}

impl FixedViewport {
    #[must_use]
    pub fn new(bounds: Bounds) -> Self {
        Self { bounds }
    }

    /// Fixed viewport spanning `radius_nm` around a center point.
    #[must_use]
    pub fn around(center: LatLon, radius_nm: f64) -> Self {
        Self::new(Bounds::around(center, radius_nm))
    }
}

impl ViewportProvider for FixedViewport {
    fn visible_bounds(&self) -> Option<Bounds> {
        Some(self.bounds)
    }
}

/// Feed query region for one area-scan tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaQuery {
    pub center: LatLon,
    pub radius_nm: f64,
}

impl AreaQuery {
    /// Derive the query from viewport bounds.
    ///
    /// Radius is the haversine distance from the center to the northeast
    /// corner, floored at `min_radius_nm`.
    #[must_use]
    pub fn from_bounds(bounds: Bounds, min_radius_nm: f64) -> Self {
        let center = bounds.center();
        let radius_nm = center.distance_nm(bounds.north_east).max(min_radius_nm);
        Self { center, radius_nm }
    }
}

/// Calculate distance between two points using the Haversine formula (in km).
#[must_use]
pub fn haversine_km(a: LatLon, b: LatLon) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAX: LatLon = LatLon {
        lat: 33.9425,
        lon: -118.4081,
    };
    const JFK: LatLon = LatLon {
        lat: 40.6413,
        lon: -73.7781,
    };

    #[test]
    fn test_haversine_lax_to_jfk() {
        // LAX to JFK is approximately 2,151 nautical miles
        let distance = LAX.distance_nm(JFK);
        assert!((distance - 2151.0).abs() < 10.0);
    }

    #[test]
    fn test_haversine_zero_distance() {
        assert!(LAX.distance_nm(LAX) < 1e-9);
    }

    #[test]
    fn test_bounds_center_is_midpoint() {
        let bounds = Bounds::new(LatLon::new(33.0, -119.0), LatLon::new(35.0, -117.0));
        let center = bounds.center();
        assert!((center.lat - 34.0).abs() < 1e-9);
        assert!((center.lon + 118.0).abs() < 1e-9);
    }

    #[test]
    fn test_area_query_floors_tiny_viewport() {
        // A viewport a few hundred feet across must still query the minimum radius.
        let bounds = Bounds::new(
            LatLon::new(33.9425, -118.4081),
            LatLon::new(33.9426, -118.4080),
        );
        let query = AreaQuery::from_bounds(bounds, 250.0);
        assert!((query.radius_nm - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_area_query_uses_haversine_above_floor() {
        let bounds = Bounds::new(LatLon::new(30.0, -125.0), LatLon::new(42.0, -100.0));
        let query = AreaQuery::from_bounds(bounds, 250.0);

        let expected = bounds.center().distance_nm(bounds.north_east);
        assert!(expected > 250.0);
        assert!((query.radius_nm - expected).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_around_roundtrip() {
        let bounds = Bounds::around(LAX, 100.0);
        let center = bounds.center();
        assert!((center.lat - LAX.lat).abs() < 1e-9);
        assert!((center.lon - LAX.lon).abs() < 1e-9);

        // Corner distance is radius * sqrt(2), within small-angle error.
        let corner = center.distance_nm(bounds.north_east);
        assert!((corner - 100.0 * std::f64::consts::SQRT_2).abs() < 5.0);
    }
}
