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

//! Headless tracking monitor.
//!
//! Runs the engine against the live API with a fixed viewport and a
//! surface that only logs, printing engine events as they happen. Useful
//! for watching feed health and exercising the full poll/merge/reconcile
//! path without a map host.

use std::sync::Arc;
use std::time::Duration;

use adsb_api::ApiClient;
use clap::Parser;
use log::{info, warn};
use mimalloc::MiMalloc;
use tokio::signal;
use tokio::sync::broadcast;

use skyglass::config::AppConfig;
use skyglass::feed::{AdsbFeed, AdsbRoutes};
use skyglass::geo::{FixedViewport, LatLon};
use skyglass::surface::NullSurface;
use skyglass::tracker::{LiveTracker, TrackerEvent, TrackerSettings};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Animation pump cadence; stands in for the host's repaint loop.
const FRAME_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Parser, Debug)]
#[command(name = "skyglass", about = "Headless live aircraft tracking monitor")]
struct Args {
    /// Viewport center latitude in decimal degrees (defaults to the configured center)
    #[arg(long)]
    lat: Option<f64>,

    /// Viewport center longitude in decimal degrees
    #[arg(long)]
    lon: Option<f64>,

    /// Viewport radius in nautical miles
    #[arg(long)]
    radius: Option<f64>,

    /// Focus this ICAO hex identifier as soon as it appears
    #[arg(long)]
    follow: Option<String>,

    /// Override the configured API base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Override the area-scan interval in milliseconds
    #[arg(long)]
    area_interval_ms: Option<u64>,

    /// Override the pursuit interval in milliseconds
    #[arg(long)]
    pursuit_interval_ms: Option<u64>,

    /// Exit after this many completed scans (runs until Ctrl-C by default)
    #[arg(long)]
    scans: Option<u64>,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut config = match AppConfig::load() {
        Ok(config) => config,
        Err(error) => {
            warn!("failed to load config, using defaults: {error}");
            AppConfig::default()
        }
    };
    if let Some(api_url) = args.api_url {
        config.api_base_url = api_url;
    }
    if let Some(interval) = args.area_interval_ms {
        config.area_scan_interval_ms = interval;
    }
    if let Some(interval) = args.pursuit_interval_ms {
        config.pursuit_interval_ms = interval;
    }

    let center = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => LatLon::new(lat, lon),
        (None, None) => config.default_center,
        _ => {
            eprintln!("--lat and --lon must be given together");
            std::process::exit(1);
        }
    };
    let radius_nm = args.radius.unwrap_or(config.min_query_radius_nm);

    info!(
        "monitoring {radius_nm} nm around ({:.4}, {:.4}) via {}",
        center.lat, center.lon, config.api_base_url
    );

    let client = ApiClient::new(config.api_base_url.clone());
    let tracker = LiveTracker::new(
        Arc::new(AdsbFeed::new(
            client.clone(),
            config.enabled_categories(),
            config.request_timeout(),
        )),
        Arc::new(AdsbRoutes::new(client, config.request_timeout())),
        Arc::new(NullSurface::new()),
        Arc::new(FixedViewport::around(center, radius_nm)),
        TrackerSettings::from(&config),
    );

    let mut events = tracker.subscribe();
    tracker.start();

    let pump = tracker.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(FRAME_INTERVAL);
        loop {
            interval.tick().await;
            pump.advance_animations();
        }
    });

    let mut scans_seen = 0u64;
    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                println!("interrupted, shutting down");
                break;
            }
            event = events.recv() => {
                let event = match event {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("event stream lagged, {skipped} events skipped");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                report(&event);

                if let TrackerEvent::ScanCompleted { .. } = event {
                    scans_seen += 1;
                    if args.scans.is_some_and(|limit| scans_seen >= limit) {
                        break;
                    }
                    if let Some(target) = &args.follow {
                        try_focus(&tracker, target);
                    }
                }
            }
        }
    }

    tracker.shutdown();
}

fn report(event: &TrackerEvent) {
    match event {
        TrackerEvent::ScanCompleted { merged, visible } => {
            println!("scan complete: {merged} aircraft merged, {visible} visible");
        }
        TrackerEvent::EntityFocused { ident, pose } => {
            println!(
                "focused {ident} at ({:.4}, {:.4}) heading {:.0}",
                pose.lat, pose.lon, pose.heading
            );
        }
        TrackerEvent::FocusEnded { ident } => {
            println!("focus on {ident} ended");
        }
        TrackerEvent::RouteResolved { ident, route } => {
            let origin = route
                .origin
                .as_ref()
                .and_then(|airport| airport.iata.as_deref())
                .unwrap_or("?");
            let destination = route
                .destination
                .as_ref()
                .and_then(|airport| airport.iata.as_deref())
                .unwrap_or("?");
            println!("route for {ident}: {origin} to {destination}");
        }
        TrackerEvent::RouteUnavailable { ident } => {
            println!("no route information for {ident}");
        }
    }
}

/// Focus the followed identifier once an area scan has seen it.
fn try_focus(tracker: &LiveTracker, target: &str) {
    if tracker.mode().focused_ident().is_some() {
        return;
    }
    match tracker.focus(target) {
        Ok(()) => {}
        Err(error) => log::debug!("{error}, waiting for next scan"),
    }
}
