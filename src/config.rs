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

//! Application configuration management.
//!
//! Persistent configuration in TOML format: which feeds to poll, the two
//! polling cadences, the animation window, and the viewport defaults used
//! by the headless monitor.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::LatLon;
use crate::observation::Category;

/// Default base URL for the aircraft state API
pub const DEFAULT_API_BASE_URL: &str = "https://api.adsb.lol";

/// Configuration for one polled feed
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FeedConfig {
    /// Unique identifier for this feed (stable across renames)
    pub id: String,

    /// User-friendly display name
    pub name: String,

    /// Feed category polled from the API
    pub category: Category,

    /// Whether this feed is polled during area scans
    pub enabled: bool,
}

impl FeedConfig {
    /// Create a new feed configuration with a generated UUID
    pub fn new(name: String, category: Category, enabled: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            category,
            enabled,
        }
    }
}

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    /// Configuration schema version for migrations
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// Base URL of the aircraft state API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Feeds polled during area scans
    #[serde(default = "default_feeds")]
    pub feeds: Vec<FeedConfig>,

    /// Area-scan polling interval in milliseconds
    #[serde(default = "default_area_scan_interval_ms")]
    pub area_scan_interval_ms: u64,

    /// Focused-pursuit polling interval in milliseconds
    #[serde(default = "default_pursuit_interval_ms")]
    pub pursuit_interval_ms: u64,

    /// Marker glide window between polls in milliseconds (4000 - 6000)
    #[serde(default = "default_animation_window_ms")]
    pub animation_window_ms: u64,

    /// Minimum area query radius in nautical miles
    #[serde(default = "default_min_radius_nm")]
    pub min_query_radius_nm: f64,

    /// Per-request feed timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Viewport center used when the host has no position of its own
    #[serde(default = "default_center")]
    pub default_center: LatLon,

    /// Zoom level applied when a focus begins
    #[serde(default = "default_focus_zoom")]
    pub focus_zoom: f64,

    /// Zoom level restored when a focus ends
    #[serde(default = "default_overview_zoom")]
    pub overview_zoom: f64,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    1
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_feeds() -> Vec<FeedConfig> {
    vec![
        FeedConfig::new("Area traffic".to_string(), Category::Civilian, true),
        FeedConfig::new("Military".to_string(), Category::Military, true),
        FeedConfig::new("LADD".to_string(), Category::Ladd, false),
        FeedConfig::new("PIA".to_string(), Category::Pia, false),
    ]
}

fn default_area_scan_interval_ms() -> u64 {
    4000
}

fn default_pursuit_interval_ms() -> u64 {
    3000
}

fn default_animation_window_ms() -> u64 {
    5000
}

fn default_min_radius_nm() -> f64 {
    250.0
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_center() -> LatLon {
    LatLon::new(33.9425, -118.4081)
}

fn default_focus_zoom() -> f64 {
    10.0
}

fn default_overview_zoom() -> f64 {
    8.0
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            api_base_url: default_api_base_url(),
            feeds: default_feeds(),
            area_scan_interval_ms: default_area_scan_interval_ms(),
            pursuit_interval_ms: default_pursuit_interval_ms(),
            animation_window_ms: default_animation_window_ms(),
            min_query_radius_nm: default_min_radius_nm(),
            request_timeout_secs: default_request_timeout_secs(),
            default_center: default_center(),
            focus_zoom: default_focus_zoom(),
            overview_zoom: default_overview_zoom(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating the default on first run
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load("skyglass", "config")
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store("skyglass", "config", self)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path("skyglass", "config")
    }

    /// Categories of all enabled feeds
    pub fn enabled_categories(&self) -> Vec<Category> {
        self.feeds
            .iter()
            .filter(|feed| feed.enabled)
            .map(|feed| feed.category)
            .collect()
    }

    pub fn area_scan_interval(&self) -> Duration {
        Duration::from_millis(self.area_scan_interval_ms)
    }

    pub fn pursuit_interval(&self) -> Duration {
        Duration::from_millis(self.pursuit_interval_ms)
    }

    pub fn animation_window(&self) -> Duration {
        Duration::from_millis(self.animation_window_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
