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

//! Feed seams between the engine and the REST API.
//!
//! The engine polls through the [`FeedAdapter`] and [`RouteProvider`]
//! traits so tests can script observations and hosts can substitute other
//! data sources. The production implementations wrap [`adsb_api::ApiClient`]
//! with one request per enabled feed category and a per-request timeout.

use std::future::Future;
use std::time::Duration;

use adsb_api::{ApiClient, ApiError, ApiResponse, RouteQuery};
use async_trait::async_trait;
use thiserror::Error;

use crate::geo::{AreaQuery, LatLon};
use crate::observation::{Category, Observation};
use crate::route::ResolvedRoute;

/// Default per-request timeout for feed and route queries.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from feed and route queries.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The upstream API call failed.
    #[error("feed request failed: {0}")]
    Api(#[from] ApiError),

    /// The request exceeded the configured timeout.
    #[error("feed request timed out after {0:?}")]
    Timeout(Duration),
}

/// One feed's contribution to a polling tick.
#[derive(Debug)]
pub struct FeedBatch {
    /// Which feed produced this batch.
    pub category: Category,
    /// Usable observations, or the error that emptied the feed this tick.
    pub observations: Result<Vec<Observation>, FeedError>,
}

impl FeedBatch {
    #[must_use]
    pub fn new(category: Category, observations: Vec<Observation>) -> Self {
        Self {
            category,
            observations: Ok(observations),
        }
    }
}

/// Source of aircraft observations.
#[async_trait]
pub trait FeedAdapter: Send + Sync {
    /// Query every enabled feed around a point for one area-scan tick.
    ///
    /// Returns one batch per feed. A failed feed reports its error inside
    /// its batch; it never fails the tick as a whole.
    async fn query_area(&self, query: AreaQuery) -> Vec<FeedBatch>;

    /// Query a single identifier for one pursuit tick.
    ///
    /// An identifier that is currently unknown to the feed comes back as an
    /// empty list, not an error.
    async fn query_ident(&self, ident: &str) -> Result<Vec<Observation>, FeedError>;
}

/// Resolver for a focused callsign's route.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Resolve the route for a callsign, given the aircraft's position.
    async fn resolve_route(
        &self,
        callsign: &str,
        position: LatLon,
    ) -> Result<ResolvedRoute, FeedError>;
}

/// Production [`FeedAdapter`] over the REST API.
///
/// Fans out one concurrent request per enabled category and converts the
/// responses into validated observations.
#[derive(Debug, Clone)]
pub struct AdsbFeed {
    client: ApiClient,
    categories: Vec<Category>,
    timeout: Duration,
}

impl AdsbFeed {
    /// Create a feed over the given client, polling the given categories.
    #[must_use]
    pub fn new(client: ApiClient, mut categories: Vec<Category>, timeout: Duration) -> Self {
        categories.sort_unstable();
        categories.dedup();
        Self {
            client,
            categories,
            timeout,
        }
    }

    async fn fetch(&self, category: Category, query: AreaQuery) -> FeedBatch {
        let request = async {
            let response = match category {
                Category::Civilian => {
                    self.client
                        .by_location(query.center.lat, query.center.lon, query.radius_nm)
                        .await?
                }
                Category::Ladd => self.client.ladd().await?,
                Category::Pia => self.client.pia().await?,
                Category::Military => self.client.military().await?,
            };
            Ok::<_, FeedError>(observations_from(&response, category))
        };

        FeedBatch {
            category,
            observations: with_timeout(self.timeout, request).await,
        }
    }

    async fn maybe_fetch(&self, category: Category, query: AreaQuery) -> Option<FeedBatch> {
        if self.categories.contains(&category) {
            Some(self.fetch(category, query).await)
        } else {
            None
        }
    }
}

#[async_trait]
impl FeedAdapter for AdsbFeed {
    async fn query_area(&self, query: AreaQuery) -> Vec<FeedBatch> {
        let (civilian, ladd, pia, military) = tokio::join!(
            self.maybe_fetch(Category::Civilian, query),
            self.maybe_fetch(Category::Ladd, query),
            self.maybe_fetch(Category::Pia, query),
            self.maybe_fetch(Category::Military, query),
        );
        [civilian, ladd, pia, military]
            .into_iter()
            .flatten()
            .collect()
    }

    async fn query_ident(&self, ident: &str) -> Result<Vec<Observation>, FeedError> {
        let request = async {
            let response = self.client.by_icao(ident).await?;
            Ok::<_, FeedError>(observations_from(&response, Category::Civilian))
        };
        with_timeout(self.timeout, request).await
    }
}

/// Production [`RouteProvider`] over the routeset endpoint.
#[derive(Debug, Clone)]
pub struct AdsbRoutes {
    client: ApiClient,
    timeout: Duration,
}

impl AdsbRoutes {
    #[must_use]
    pub fn new(client: ApiClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl RouteProvider for AdsbRoutes {
    async fn resolve_route(
        &self,
        callsign: &str,
        position: LatLon,
    ) -> Result<ResolvedRoute, FeedError> {
        let query = RouteQuery {
            callsign: callsign.to_string(),
            lat: position.lat,
            lng: position.lon,
        };
        let request = async {
            let entries = self.client.routeset(&[query]).await?;
            Ok::<_, FeedError>(ResolvedRoute::from_entries(entries))
        };
        with_timeout(self.timeout, request).await
    }
}

async fn with_timeout<T>(
    timeout: Duration,
    request: impl Future<Output = Result<T, FeedError>> + Send,
) -> Result<T, FeedError> {
    match tokio::time::timeout(timeout, request).await {
        Ok(result) => result,
        Err(_) => Err(FeedError::Timeout(timeout)),
    }
}

fn observations_from(response: &ApiResponse, category: Category) -> Vec<Observation> {
    response
        .ac
        .iter()
        .filter_map(|state| Observation::from_state(state, category))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use adsb_api::AircraftState;

    #[test]
    fn test_observations_from_drops_invalid_reports() {
        let response = ApiResponse {
            ac: vec![
                AircraftState {
                    hex: "a1b2c3".to_string(),
                    lat: Some(33.9),
                    lon: Some(-118.4),
                    ..Default::default()
                },
                // No position fix yet
                AircraftState {
                    hex: "d4e5f6".to_string(),
                    ..Default::default()
                },
                // Zero-zero artifact
                AircraftState {
                    hex: "0a0b0c".to_string(),
                    lat: Some(0.0),
                    lon: Some(0.0),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let observations = observations_from(&response, Category::Military);
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].ident, "a1b2c3");
        assert_eq!(observations[0].category, Category::Military);
    }

    #[test]
    fn test_feed_categories_sorted_and_deduped() {
        let feed = AdsbFeed::new(
            ApiClient::new("https://api.adsb.lol"),
            vec![
                Category::Military,
                Category::Civilian,
                Category::Military,
                Category::Ladd,
            ],
            DEFAULT_REQUEST_TIMEOUT,
        );
        assert_eq!(
            feed.categories,
            vec![Category::Civilian, Category::Ladd, Category::Military]
        );
    }
}
