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

//! Canonical snapshot assembly.
//!
//! One polling tick produces one batch per feed. The merge folds them into
//! a single identifier-unique snapshot: the first feed to report an
//! identifier wins its field values, and a later batch from a
//! higher-priority category upgrades only the category tag. Feed order is
//! normalized here, so callers may hand batches over in any order.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use log::{debug, warn};

use crate::feed::FeedBatch;
use crate::observation::Observation;

/// Deduplicated aircraft set for one polling tick.
#[derive(Debug, Default)]
pub struct Snapshot {
    observations: HashMap<String, Observation>,
}

impl Snapshot {
    /// Merge per-feed batches into a canonical snapshot.
    ///
    /// A failed batch degrades to empty so one bad feed never blanks the
    /// others. Observations failing the validity rule are dropped.
    #[must_use]
    pub fn merge(mut batches: Vec<FeedBatch>) -> Self {
        batches.sort_by_key(|batch| batch.category);

        let mut observations: HashMap<String, Observation> = HashMap::new();
        for batch in batches {
            let category = batch.category;
            let list = match batch.observations {
                Ok(list) => list,
                Err(error) => {
                    warn!("{category} feed failed, degrading to empty: {error}");
                    Vec::new()
                }
            };

            for observation in list {
                if !observation.is_usable() {
                    debug!("dropping unusable observation from {category} feed");
                    continue;
                }
                match observations.entry(observation.ident.clone()) {
                    Entry::Occupied(mut slot) => {
                        let existing = slot.get_mut();
                        if observation.category > existing.category {
                            existing.category = observation.category;
                        }
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(observation);
                    }
                }
            }
        }

        Self { observations }
    }

    #[must_use]
    pub fn get(&self, ident: &str) -> Option<&Observation> {
        self.observations.get(ident)
    }

    #[must_use]
    pub fn contains(&self, ident: &str) -> bool {
        self.observations.contains_key(ident)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Iterate all observations in the snapshot.
    pub fn observations(&self) -> impl Iterator<Item = &Observation> {
        self.observations.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FeedError;
    use crate::geo::LatLon;
    use crate::observation::Category;
    use chrono::Utc;
    use std::time::Duration;

    fn obs(ident: &str, category: Category, callsign: Option<&str>) -> Observation {
        Observation {
            ident: ident.to_string(),
            position: LatLon::new(33.9425, -118.4081),
            heading: 90.0,
            altitude: Some(35000.0),
            callsign: callsign.map(str::to_owned),
            model: None,
            registration: None,
            category,
            seen_at: Utc::now(),
        }
    }

    #[test]
    fn test_merge_identifiers_unique() {
        let snapshot = Snapshot::merge(vec![
            FeedBatch::new(
                Category::Civilian,
                vec![obs("a1b2c3", Category::Civilian, Some("UAL123"))],
            ),
            FeedBatch::new(
                Category::Military,
                vec![obs("a1b2c3", Category::Military, Some("RCH401"))],
            ),
        ]);
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_merge_first_insertion_wins_fields() {
        let snapshot = Snapshot::merge(vec![
            FeedBatch::new(
                Category::Civilian,
                vec![obs("a1b2c3", Category::Civilian, Some("UAL123"))],
            ),
            FeedBatch::new(
                Category::Military,
                vec![obs("a1b2c3", Category::Military, Some("RCH401"))],
            ),
        ]);

        let merged = snapshot.get("a1b2c3").unwrap();
        assert_eq!(merged.callsign.as_deref(), Some("UAL123"));
        assert_eq!(merged.category, Category::Military);
    }

    #[test]
    fn test_merge_normalizes_batch_order() {
        // Batches handed over highest-priority first still merge the same way.
        let snapshot = Snapshot::merge(vec![
            FeedBatch::new(
                Category::Military,
                vec![obs("a1b2c3", Category::Military, Some("RCH401"))],
            ),
            FeedBatch::new(
                Category::Civilian,
                vec![obs("a1b2c3", Category::Civilian, Some("UAL123"))],
            ),
        ]);

        let merged = snapshot.get("a1b2c3").unwrap();
        assert_eq!(merged.callsign.as_deref(), Some("UAL123"));
        assert_eq!(merged.category, Category::Military);
    }

    #[test]
    fn test_merge_category_never_downgrades() {
        let snapshot = Snapshot::merge(vec![
            FeedBatch::new(Category::Pia, vec![obs("abc123", Category::Pia, None)]),
            FeedBatch::new(
                Category::Civilian,
                vec![obs("abc123", Category::Civilian, None)],
            ),
        ]);
        assert_eq!(snapshot.get("abc123").unwrap().category, Category::Pia);
    }

    #[test]
    fn test_merge_failed_batch_degrades_to_empty() {
        let snapshot = Snapshot::merge(vec![
            FeedBatch::new(
                Category::Civilian,
                vec![
                    obs("a1b2c3", Category::Civilian, Some("UAL123")),
                    obs("d4e5f6", Category::Civilian, Some("DAL88")),
                ],
            ),
            FeedBatch {
                category: Category::Military,
                observations: Err(FeedError::Timeout(Duration::from_secs(10))),
            },
        ]);

        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.contains("a1b2c3"));
        assert!(snapshot.contains("d4e5f6"));
    }

    #[test]
    fn test_merge_all_batches_failed_yields_empty() {
        let snapshot = Snapshot::merge(vec![FeedBatch {
            category: Category::Civilian,
            observations: Err(FeedError::Timeout(Duration::from_secs(10))),
        }]);
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_merge_drops_unusable_observations() {
        let mut bad = obs("d4e5f6", Category::Civilian, None);
        bad.position = LatLon::new(0.0, -118.4081);

        let snapshot = Snapshot::merge(vec![FeedBatch::new(
            Category::Civilian,
            vec![obs("a1b2c3", Category::Civilian, None), bad],
        )]);

        assert_eq!(snapshot.len(), 1);
        assert!(!snapshot.contains("d4e5f6"));
    }
}
