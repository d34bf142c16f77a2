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

//! Response models for the v2 aircraft state endpoints.
//!
//! The feed omits fields freely (ground targets have no track, TIS-B targets
//! often lack registration and type), so everything except the ICAO address
//! is optional and defaults to `None` when absent.

use serde::Deserialize;

/// Envelope returned by every aircraft state endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiResponse {
    /// Aircraft state vectors matching the query.
    #[serde(default)]
    pub ac: Vec<AircraftState>,
    /// Server status message, "No error" on success.
    #[serde(default)]
    pub msg: Option<String>,
    /// Server timestamp in milliseconds since the epoch.
    #[serde(default)]
    pub now: Option<f64>,
    /// Total number of matching aircraft.
    #[serde(default)]
    pub total: Option<u64>,
    /// Server processing time in milliseconds.
    #[serde(default)]
    pub ptime: Option<f64>,
}

/// One aircraft state vector.
///
/// Field names follow the upstream JSON (`r` is registration, `t` is the
/// ICAO type code). `flight` carries trailing padding from the transponder;
/// use [`AircraftState::trimmed_callsign`] for display or keying.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AircraftState {
    /// ICAO 24-bit address (lowercase hex string).
    pub hex: String,
    /// Callsign/flight number, space padded.
    #[serde(default)]
    pub flight: Option<String>,
    /// Registration (tail number).
    #[serde(default)]
    pub r: Option<String>,
    /// ICAO type code (e.g. "B738").
    #[serde(default)]
    pub t: Option<String>,
    /// Latitude in degrees.
    #[serde(default)]
    pub lat: Option<f64>,
    /// Longitude in degrees.
    #[serde(default)]
    pub lon: Option<f64>,
    /// True track over ground in degrees (0-360, north = 0).
    #[serde(default)]
    pub track: Option<f64>,
    /// Selected altitude from the mode control panel, in feet.
    #[serde(default)]
    pub nav_altitude_mcp: Option<f64>,
    /// Transponder squawk code.
    #[serde(default)]
    pub squawk: Option<String>,
    /// Emitter category (e.g. "A3").
    #[serde(default)]
    pub category: Option<String>,
    /// Seconds since the last message from this aircraft.
    #[serde(default)]
    pub seen: Option<f64>,
}

impl AircraftState {
    /// Callsign with the feed's trailing padding removed.
    ///
    /// Returns `None` when the field is absent or blank.
    #[must_use]
    pub fn trimmed_callsign(&self) -> Option<&str> {
        self.flight
            .as_deref()
            .map(str::trim)
            .filter(|callsign| !callsign.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_state_vector() {
        let json = r#"{
            "ac": [{
                "hex": "a1b2c3",
                "flight": "UAL123  ",
                "r": "N12345",
                "t": "B738",
                "lat": 33.9425,
                "lon": -118.4081,
                "track": 270.5,
                "nav_altitude_mcp": 35008,
                "squawk": "2045",
                "category": "A3",
                "seen": 0.4
            }],
            "msg": "No error",
            "now": 1717000000000,
            "total": 1,
            "ptime": 12
        }"#;

        let response: ApiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.total, Some(1));
        assert_eq!(response.ac.len(), 1);

        let state = &response.ac[0];
        assert_eq!(state.hex, "a1b2c3");
        assert_eq!(state.trimmed_callsign(), Some("UAL123"));
        assert_eq!(state.r.as_deref(), Some("N12345"));
        assert_eq!(state.t.as_deref(), Some("B738"));
        assert_eq!(state.lat, Some(33.9425));
        assert_eq!(state.lon, Some(-118.4081));
        assert_eq!(state.track, Some(270.5));
        assert_eq!(state.nav_altitude_mcp, Some(35008.0));
    }

    #[test]
    fn test_decode_sparse_state_vector() {
        // TIS-B and ground targets carry little beyond the address.
        let json = r#"{"ac": [{"hex": "abc123"}], "msg": "No error"}"#;

        let response: ApiResponse = serde_json::from_str(json).unwrap();
        let state = &response.ac[0];
        assert_eq!(state.hex, "abc123");
        assert!(state.flight.is_none());
        assert!(state.lat.is_none());
        assert!(state.lon.is_none());
        assert!(state.track.is_none());
        assert!(state.nav_altitude_mcp.is_none());
    }

    #[test]
    fn test_decode_empty_response() {
        let json = r#"{"ac": [], "msg": "No error", "total": 0}"#;

        let response: ApiResponse = serde_json::from_str(json).unwrap();
        assert!(response.ac.is_empty());
        assert_eq!(response.total, Some(0));
    }

    #[test]
    fn test_decode_missing_ac_array() {
        let response: ApiResponse = serde_json::from_str(r#"{"msg": "No error"}"#).unwrap();
        assert!(response.ac.is_empty());
    }

    #[test]
    fn test_trimmed_callsign_blank() {
        let state = AircraftState {
            hex: "a1b2c3".to_string(),
            flight: Some("        ".to_string()),
            ..Default::default()
        };
        assert_eq!(state.trimmed_callsign(), None);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        // The live feed adds fields over time; decoding must not break.
        let json = r#"{
            "ac": [{"hex": "c0ffee", "alt_baro": "ground", "gs": 4.2, "emergency": "none"}]
        }"#;

        let response: ApiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.ac[0].hex, "c0ffee");
    }
}
