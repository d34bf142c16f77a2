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

//! Request and response models for the routeset endpoint.
//!
//! The endpoint takes a batch of callsign/position pairs and returns route
//! metadata per callsign, with the matched airports ordered origin first.

use serde::{Deserialize, Serialize};

/// One plane in a routeset request.
#[derive(Debug, Clone, Serialize)]
pub struct RouteQuery {
    /// Trimmed callsign (e.g. "UAL123").
    pub callsign: String,
    /// Current latitude, used by the server for plausibility checks.
    pub lat: f64,
    /// Current longitude. The upstream API spells this `lng`.
    pub lng: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct RoutesetRequest<'a> {
    pub(crate) planes: &'a [RouteQuery],
}

/// Route metadata resolved for one callsign.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteEntry {
    /// Callsign the entry answers for.
    #[serde(default)]
    pub callsign: Option<String>,
    /// Published flight number (e.g. "UA123").
    #[serde(default)]
    pub number: Option<String>,
    /// Two-letter airline code (e.g. "UA").
    #[serde(default)]
    pub airline_code: Option<String>,
    /// Matched airports, origin first, destination last.
    #[serde(default, rename = "_airports")]
    pub airports: Vec<Airport>,
}

/// One airport on a resolved route.
#[derive(Debug, Clone, Deserialize)]
pub struct Airport {
    /// IATA code (e.g. "LAX").
    #[serde(default)]
    pub iata: Option<String>,
    /// ICAO code (e.g. "KLAX").
    #[serde(default)]
    pub icao: Option<String>,
    /// Airport name.
    #[serde(default)]
    pub name: Option<String>,
    /// Free-form "city, region" string.
    #[serde(default)]
    pub location: Option<String>,
    /// Latitude in degrees.
    #[serde(default)]
    pub lat: Option<f64>,
    /// Longitude in degrees.
    #[serde(default)]
    pub lon: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let queries = vec![RouteQuery {
            callsign: "UAL123".to_string(),
            lat: 36.1,
            lng: -100.5,
        }];
        let body = serde_json::to_string(&RoutesetRequest { planes: &queries }).unwrap();
        assert_eq!(
            body,
            r#"{"planes":[{"callsign":"UAL123","lat":36.1,"lng":-100.5}]}"#
        );
    }

    #[test]
    fn test_decode_route_entry() {
        let json = r#"[{
            "callsign": "UAL123",
            "number": "UA123",
            "airline_code": "UA",
            "airport_codes": "KLAX-KJFK",
            "plausible": 1,
            "_airports": [
                {"iata": "LAX", "icao": "KLAX", "name": "Los Angeles International",
                 "location": "Los Angeles, California", "lat": 33.9425, "lon": -118.4081},
                {"iata": "JFK", "icao": "KJFK", "name": "John F Kennedy International",
                 "location": "New York, New York", "lat": 40.6413, "lon": -73.7781}
            ]
        }]"#;

        let entries: Vec<RouteEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries.len(), 1);

        let entry = &entries[0];
        assert_eq!(entry.number.as_deref(), Some("UA123"));
        assert_eq!(entry.airline_code.as_deref(), Some("UA"));
        assert_eq!(entry.airports.len(), 2);
        assert_eq!(entry.airports[0].iata.as_deref(), Some("LAX"));
        assert_eq!(entry.airports[1].iata.as_deref(), Some("JFK"));
        assert_eq!(entry.airports[1].lat, Some(40.6413));
    }

    #[test]
    fn test_decode_unresolved_route() {
        // Unknown callsigns come back with no airports attached.
        let json = r#"[{"callsign": "N123AB", "_airports": []}]"#;

        let entries: Vec<RouteEntry> = serde_json::from_str(json).unwrap();
        assert!(entries[0].airports.is_empty());
        assert!(entries[0].number.is_none());
    }

    #[test]
    fn test_decode_airport_missing_coordinates() {
        let json = r#"[{"callsign": "SWA42", "_airports": [{"iata": "DAL"}]}]"#;

        let entries: Vec<RouteEntry> = serde_json::from_str(json).unwrap();
        let airport = &entries[0].airports[0];
        assert_eq!(airport.iata.as_deref(), Some("DAL"));
        assert!(airport.lat.is_none());
        assert!(airport.lon.is_none());
    }
}
