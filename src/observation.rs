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

//! Point-in-time aircraft observations and their feed provenance.

use adsb_api::AircraftState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::LatLon;

/// Feed provenance tag.
///
/// Variant order is merge priority: when the same identifier arrives from
/// several feeds in one tick, the highest-priority category wins the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// General traffic from the location query.
    Civilian,
    /// Aircraft on the LADD blocked-registration list.
    Ladd,
    /// Aircraft flying under a privacy ICAO address.
    Pia,
    /// Military-tagged aircraft.
    Military,
}

impl Category {
    /// All categories in ascending merge priority.
    pub const ALL: [Category; 4] = [
        Category::Civilian,
        Category::Ladd,
        Category::Pia,
        Category::Military,
    ];

    /// Short lowercase name for logging and status keys.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Civilian => "civilian",
            Category::Ladd => "ladd",
            Category::Pia => "pia",
            Category::Military => "military",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One point-in-time report of an aircraft from a feed.
#[derive(Debug, Clone)]
pub struct Observation {
    /// ICAO 24-bit address (hex string), the natural key across feeds.
    pub ident: String,
    /// Reported position.
    pub position: LatLon,
    /// True track in degrees (0-360, north = 0); 0 when the feed omits it.
    pub heading: f64,
    /// Altitude in feet, when reported.
    pub altitude: Option<f64>,
    /// Trimmed callsign.
    pub callsign: Option<String>,
    /// ICAO type code.
    pub model: Option<String>,
    /// Registration (tail number).
    pub registration: Option<String>,
    /// Feed provenance.
    pub category: Category,
    /// When this observation was received.
    pub seen_at: DateTime<Utc>,
}

impl Observation {
    /// Build an observation from a raw feed state vector.
    ///
    /// Returns `None` for unusable reports: an empty identifier, or a
    /// missing or zero latitude/longitude. Zero coordinates are a known
    /// feed artifact for aircraft without a position fix and would
    /// otherwise render markers off the coast of Africa.
    #[must_use]
    pub fn from_state(state: &AircraftState, category: Category) -> Option<Self> {
        if state.hex.trim().is_empty() {
            return None;
        }
        let (lat, lon) = match (state.lat, state.lon) {
            (Some(lat), Some(lon)) if lat != 0.0 && lon != 0.0 => (lat, lon),
            _ => return None,
        };

        Some(Self {
            ident: state.hex.clone(),
            position: LatLon::new(lat, lon),
            heading: state.track.unwrap_or(0.0),
            altitude: state.nav_altitude_mcp,
            callsign: state.trimmed_callsign().map(str::to_owned),
            model: state.t.clone(),
            registration: state.r.clone(),
            category,
            seen_at: Utc::now(),
        })
    }

    /// Whether this observation passes the validity rule on its own.
    ///
    /// Feed conversion already rejects bad reports; this re-check guards
    /// observations constructed elsewhere before they reach the merge.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.ident.trim().is_empty() && self.position.lat != 0.0 && self.position.lon != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(hex: &str, lat: Option<f64>, lon: Option<f64>) -> AircraftState {
        AircraftState {
            hex: hex.to_string(),
            lat,
            lon,
            ..Default::default()
        }
    }

    #[test]
    fn test_from_state_maps_fields() {
        let raw = AircraftState {
            hex: "a1b2c3".to_string(),
            flight: Some("UAL123  ".to_string()),
            r: Some("N12345".to_string()),
            t: Some("B738".to_string()),
            lat: Some(33.9425),
            lon: Some(-118.4081),
            track: Some(90.0),
            nav_altitude_mcp: Some(35000.0),
            ..Default::default()
        };

        let obs = Observation::from_state(&raw, Category::Civilian).unwrap();
        assert_eq!(obs.ident, "a1b2c3");
        assert_eq!(obs.position, LatLon::new(33.9425, -118.4081));
        assert_eq!(obs.heading, 90.0);
        assert_eq!(obs.altitude, Some(35000.0));
        assert_eq!(obs.callsign.as_deref(), Some("UAL123"));
        assert_eq!(obs.model.as_deref(), Some("B738"));
        assert_eq!(obs.registration.as_deref(), Some("N12345"));
        assert_eq!(obs.category, Category::Civilian);
    }

    #[test]
    fn test_from_state_rejects_missing_coordinates() {
        assert!(Observation::from_state(&state("a1b2c3", None, Some(-118.4)), Category::Civilian).is_none());
        assert!(Observation::from_state(&state("a1b2c3", Some(33.9), None), Category::Civilian).is_none());
    }

    #[test]
    fn test_from_state_rejects_zero_coordinates() {
        assert!(Observation::from_state(&state("a1b2c3", Some(0.0), Some(-118.4)), Category::Civilian).is_none());
        assert!(Observation::from_state(&state("a1b2c3", Some(33.9), Some(0.0)), Category::Civilian).is_none());
    }

    #[test]
    fn test_from_state_rejects_blank_ident() {
        assert!(Observation::from_state(&state("  ", Some(33.9), Some(-118.4)), Category::Civilian).is_none());
    }

    #[test]
    fn test_missing_track_defaults_north() {
        let obs = Observation::from_state(&state("a1b2c3", Some(33.9), Some(-118.4)), Category::Military).unwrap();
        assert_eq!(obs.heading, 0.0);
        assert!(obs.altitude.is_none());
    }

    #[test]
    fn test_category_priority_order() {
        assert!(Category::Civilian < Category::Ladd);
        assert!(Category::Ladd < Category::Pia);
        assert!(Category::Pia < Category::Military);
    }
}
