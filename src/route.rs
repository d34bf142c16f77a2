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

//! Route overlay for the focused entity.
//!
//! The overlay is a single polyline from the route origin to its
//! destination, with the focused aircraft's live position as a replaceable
//! middle waypoint. The path is rebuilt wholesale on every update so it can
//! never accumulate stale points. An overlay only exists while a focus
//! exists, and only when both route endpoints resolved with usable
//! coordinates.

use adsb_api::{Airport, RouteEntry};

use crate::geo::LatLon;
use crate::surface::{MapSurface, PathHandle, SurfaceError};

/// Airport metadata on a resolved route.
#[derive(Debug, Clone, PartialEq)]
pub struct AirportInfo {
    /// IATA code (e.g. "LAX").
    pub iata: Option<String>,
    /// Airport name.
    pub name: Option<String>,
    /// Free-form "city, region" string.
    pub location: Option<String>,
    /// Airport position.
    pub position: LatLon,
}

/// Published flight details for the focused callsign.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlightDetails {
    /// Flight number (e.g. "UA123").
    pub number: Option<String>,
    /// Callsign the route answers for.
    pub callsign: Option<String>,
    /// Two-letter airline code.
    pub airline_code: Option<String>,
}

/// Route metadata resolved when a focus begins.
#[derive(Debug, Clone, Default)]
pub struct ResolvedRoute {
    pub flight: FlightDetails,
    pub origin: Option<AirportInfo>,
    pub destination: Option<AirportInfo>,
}

impl ResolvedRoute {
    /// Extract the first entry of a routeset response.
    ///
    /// Airports arrive origin first. An endpoint without usable coordinates
    /// becomes `None` so partial routes are never drawn at (0, 0).
    #[must_use]
    pub fn from_entries(entries: Vec<RouteEntry>) -> Self {
        let Some(entry) = entries.into_iter().next() else {
            return Self::default();
        };

        let mut airports = entry.airports.into_iter();
        let origin = airports.next().and_then(airport_info);
        let destination = airports.next().and_then(airport_info);

        Self {
            flight: FlightDetails {
                number: entry.number,
                callsign: entry.callsign,
                airline_code: entry.airline_code,
            },
            origin,
            destination,
        }
    }

    /// Whether both endpoints resolved with coordinates.
    #[must_use]
    pub fn has_endpoints(&self) -> bool {
        self.origin.is_some() && self.destination.is_some()
    }
}

fn airport_info(airport: Airport) -> Option<AirportInfo> {
    let (lat, lon) = match (airport.lat, airport.lon) {
        (Some(lat), Some(lon)) if !(lat == 0.0 && lon == 0.0) => (lat, lon),
        _ => return None,
    };
    Some(AirportInfo {
        iata: airport.iata,
        name: airport.name,
        location: airport.location,
        position: LatLon::new(lat, lon),
    })
}

/// The drawn route overlay.
#[derive(Debug)]
pub struct RouteOverlay {
    origin: LatLon,
    destination: LatLon,
    middle: Vec<LatLon>,
    handle: PathHandle,
}

impl RouteOverlay {
    /// Draw a fresh overlay between two endpoints.
    pub fn create(
        origin: LatLon,
        destination: LatLon,
        surface: &dyn MapSurface,
    ) -> Result<Self, SurfaceError> {
        let handle = surface.add_path(&[origin, destination])?;
        Ok(Self {
            origin,
            destination,
            middle: Vec::new(),
            handle,
        })
    }

    /// Replace the middle waypoints and redraw the full path.
    ///
    /// The path is always `[origin, ...points, destination]`; previous
    /// middle points are discarded, never appended to.
    pub fn replace_middle(&mut self, points: &[LatLon], surface: &dyn MapSurface) {
        self.middle = points.to_vec();
        surface.set_path_points(self.handle, &self.full_path());
    }

    /// Remove the overlay from the surface and drop its state.
    pub fn clear(self, surface: &dyn MapSurface) {
        surface.remove_path(self.handle);
    }

    fn full_path(&self) -> Vec<LatLon> {
        let mut path = Vec::with_capacity(self.middle.len() + 2);
        path.push(self.origin);
        path.extend_from_slice(&self.middle);
        path.push(self.destination);
        path
    }
}
