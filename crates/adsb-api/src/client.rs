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

//! HTTP client for the v2 aircraft state and routeset endpoints.

use log::debug;
use thiserror::Error;

use crate::models::ApiResponse;
use crate::routes::{RouteEntry, RouteQuery, RoutesetRequest};

/// Errors returned by API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport or decode failure from the HTTP layer.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("server returned {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },
}

/// Async client for the aggregator's REST API.
///
/// All aircraft queries return the same [`ApiResponse`] envelope; an
/// identifier with no match comes back as an empty `ac` array, not an error.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the given base URL (e.g. `https://api.adsb.lol`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing `reqwest::Client`.
    ///
    /// Trailing slashes on the base URL are stripped so endpoint paths can
    /// be appended verbatim.
    #[must_use]
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { http, base_url }
    }

    /// Aircraft within `radius_nm` nautical miles of a point.
    ///
    /// The server caps the radius at 250 NM.
    pub async fn by_location(
        &self,
        lat: f64,
        lon: f64,
        radius_nm: f64,
    ) -> Result<ApiResponse, ApiError> {
        self.get_states(&location_path(lat, lon, radius_nm)).await
    }

    /// All aircraft tagged military.
    pub async fn military(&self) -> Result<ApiResponse, ApiError> {
        self.get_states("/v2/mil").await
    }

    /// All aircraft on the LADD (Limiting Aircraft Data Displayed) list.
    pub async fn ladd(&self) -> Result<ApiResponse, ApiError> {
        self.get_states("/v2/ladd").await
    }

    /// All aircraft flying under a PIA (Privacy ICAO Address).
    pub async fn pia(&self) -> Result<ApiResponse, ApiError> {
        self.get_states("/v2/pia").await
    }

    /// Aircraft with the given ICAO 24-bit address.
    pub async fn by_icao(&self, icao: &str) -> Result<ApiResponse, ApiError> {
        self.get_states(&format!("/v2/icao/{icao}")).await
    }

    /// Aircraft with the given callsign.
    pub async fn by_callsign(&self, callsign: &str) -> Result<ApiResponse, ApiError> {
        self.get_states(&format!("/v2/callsign/{callsign}")).await
    }

    /// Aircraft with the given registration (tail number).
    pub async fn by_registration(&self, registration: &str) -> Result<ApiResponse, ApiError> {
        self.get_states(&format!("/v2/registration/{registration}"))
            .await
    }

    /// Aircraft of the given ICAO type code (e.g. "A321").
    pub async fn by_type(&self, type_code: &str) -> Result<ApiResponse, ApiError> {
        self.get_states(&format!("/v2/type/{type_code}")).await
    }

    /// Aircraft squawking the given transponder code.
    pub async fn by_squawk(&self, squawk: &str) -> Result<ApiResponse, ApiError> {
        self.get_states(&format!("/v2/squawk/{squawk}")).await
    }

    /// The single aircraft closest to a point, within `radius_nm`.
    pub async fn closest(
        &self,
        lat: f64,
        lon: f64,
        radius_nm: f64,
    ) -> Result<ApiResponse, ApiError> {
        self.get_states(&format!("/v2/closest/{lat}/{lon}/{radius_nm}"))
            .await
    }

    /// Resolve routes for a batch of callsigns.
    ///
    /// Each query carries the aircraft's current position so the server can
    /// pick the plausible route for callsigns flown on multiple city pairs.
    pub async fn routeset(&self, queries: &[RouteQuery]) -> Result<Vec<RouteEntry>, ApiError> {
        let url = format!("{}/api/0/routeset", self.base_url);
        debug!("POST {} ({} planes)", url, queries.len());

        let response = self
            .http
            .post(&url)
            .json(&RoutesetRequest { planes: queries })
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { status, url });
        }
        Ok(response.json().await?)
    }

    async fn get_states(&self, path: &str) -> Result<ApiResponse, ApiError> {
        let url = format!("{}{path}", self.base_url);
        debug!("GET {url}");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { status, url });
        }
        Ok(response.json().await?)
    }
}

fn location_path(lat: f64, lon: f64, radius_nm: f64) -> String {
    format!("/v2/lat/{lat}/lon/{lon}/dist/{radius_nm}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_path() {
        assert_eq!(
            location_path(33.9425, -118.4081, 250.0),
            "/v2/lat/33.9425/lon/-118.4081/dist/250"
        );
    }

    #[test]
    fn test_location_path_fractional_radius() {
        assert_eq!(
            location_path(40.6413, -73.7781, 312.5),
            "/v2/lat/40.6413/lon/-73.7781/dist/312.5"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = ApiClient::new("https://api.adsb.lol/");
        assert_eq!(client.base_url, "https://api.adsb.lol");

        let client = ApiClient::new("https://api.adsb.lol");
        assert_eq!(client.base_url, "https://api.adsb.lol");
    }
}
