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

//! Typed client for the ADS-B v2 REST API.
//!
//! This library wraps the aggregator's HTTP endpoints behind async methods
//! returning strongly typed models. It covers the aircraft state queries
//! (by location, ICAO address, callsign, registration, type code, or squawk,
//! plus the military/LADD/PIA lists) and the routeset endpoint that resolves
//! a callsign into origin/destination airports.
//!
//! The crate is transport-only: it performs requests and decodes responses,
//! and leaves state management to its callers.
//!
//! # Quick Start
//!
//! ```
//! use adsb_api::{ApiClient, ApiError};
//!
//! # async fn example() -> Result<(), ApiError> {
//! let client = ApiClient::new("https://api.adsb.lol");
//!
//! let response = client.by_location(33.9425, -118.4081, 250.0).await?;
//! for state in &response.ac {
//!     println!("{}: {:?}", state.hex, state.trimmed_callsign());
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod models;
pub mod routes;

pub use client::{ApiClient, ApiError};
pub use models::{AircraftState, ApiResponse};
pub use routes::{Airport, RouteEntry, RouteQuery};
