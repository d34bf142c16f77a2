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

//! Snapshot-to-entity reconciliation.
//!
//! Each area-scan tick diffs the canonical snapshot against the live
//! entity set and applies the minimal set of operations: create markers
//! for new identifiers, hand existing ones to the interpolator, and remove
//! the rest. The pass runs synchronously to completion so no tick ever
//! observes a half-applied diff, and it is idempotent: the same snapshot
//! applied twice performs no second round of creations or removals.

use std::time::Instant;

use log::{debug, warn};

use crate::animate::Animator;
use crate::entity::{scale_for_altitude, Entity, EntityStore};
use crate::geo::Pose;
use crate::snapshot::Snapshot;
use crate::surface::{IconSpec, MapSurface};

/// Operation counts from one reconcile pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
    /// Identifiers skipped because marker creation failed; they retry on
    /// the next snapshot.
    pub skipped: usize,
}

/// Reconcile the live entity set against a canonical snapshot.
///
/// While a focus is active the focused identifier is never removed, even
/// when the snapshot no longer carries it; a stale scan must not tear down
/// the aircraft the user is following.
pub fn reconcile(
    snapshot: &Snapshot,
    store: &mut EntityStore,
    animator: &mut Animator,
    surface: &dyn MapSurface,
    focused: Option<&str>,
    now: Instant,
) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::default();

    for observation in snapshot.observations() {
        let scale = scale_for_altitude(observation.altitude);

        if let Some(entity) = store.get_mut(&observation.ident) {
            entity.absorb(observation);
            animator.animate(
                entity,
                observation.position,
                observation.heading,
                scale,
                now,
            );
            outcome.updated += 1;
        } else {
            let pose = Pose::new(
                observation.position.lat,
                observation.position.lon,
                observation.heading,
            );
            let title = observation
                .callsign
                .clone()
                .unwrap_or_else(|| observation.ident.clone());

            match surface.add_marker(pose, &IconSpec::new(title, scale)) {
                Ok(handle) => {
                    store.insert(Entity::from_observation(observation, handle));
                    outcome.created += 1;
                }
                Err(error) => {
                    warn!(
                        "marker creation failed for {}, retrying next tick: {error}",
                        observation.ident
                    );
                    outcome.skipped += 1;
                }
            }
        }
    }

    for ident in store.idents() {
        if snapshot.contains(&ident) {
            continue;
        }
        if focused == Some(ident.as_str()) {
            debug!("focused entity {ident} absent from snapshot, retained");
            continue;
        }
        animator.cancel(&ident);
        if let Some(entity) = store.remove(&ident) {
            surface.remove_marker(entity.handle);
            outcome.removed += 1;
        }
    }

    debug!(
        "reconciled: {} created, {} updated, {} removed, {} skipped",
        outcome.created, outcome.updated, outcome.removed, outcome.skipped
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animate::DEFAULT_ANIMATION_WINDOW;
    use crate::feed::FeedBatch;
    use crate::geo::LatLon;
    use crate::observation::{Category, Observation};
    use crate::surface::testing::RecordingSurface;
    use chrono::Utc;

    fn obs(ident: &str, lat: f64, lon: f64) -> Observation {
        Observation {
            ident: ident.to_string(),
            position: LatLon::new(lat, lon),
            heading: 90.0,
            altitude: Some(35000.0),
            callsign: Some(format!("CS{ident}")),
            model: None,
            registration: None,
            category: Category::Civilian,
            seen_at: Utc::now(),
        }
    }

    fn snapshot_of(observations: Vec<Observation>) -> Snapshot {
        Snapshot::merge(vec![FeedBatch::new(Category::Civilian, observations)])
    }

    struct Rig {
        surface: RecordingSurface,
        store: EntityStore,
        animator: Animator,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                surface: RecordingSurface::new(),
                store: EntityStore::new(),
                animator: Animator::new(DEFAULT_ANIMATION_WINDOW),
            }
        }

        fn reconcile(&mut self, snapshot: &Snapshot, focused: Option<&str>) -> ReconcileOutcome {
            reconcile(
                snapshot,
                &mut self.store,
                &mut self.animator,
                &self.surface,
                focused,
                Instant::now(),
            )
        }
    }

    #[test]
    fn test_new_identifiers_create_entities() {
        let mut rig = Rig::new();
        let snapshot = snapshot_of(vec![obs("a1b2c3", 33.9, -118.4), obs("d4e5f6", 34.0, -118.2)]);

        let outcome = rig.reconcile(&snapshot, None);
        assert_eq!(outcome.created, 2);
        assert_eq!(outcome.removed, 0);
        assert_eq!(rig.store.len(), 2);
        assert_eq!(rig.surface.marker_count(), 2);

        let entity = rig.store.get("a1b2c3").unwrap();
        assert_eq!(entity.pose.lat, 33.9);
        assert_eq!(entity.scale, 1.5);
    }

    #[test]
    fn test_existing_identifier_animates_not_snaps() {
        let mut rig = Rig::new();
        rig.reconcile(&snapshot_of(vec![obs("a1b2c3", 33.9, -118.4)]), None);

        let outcome = rig.reconcile(&snapshot_of(vec![obs("a1b2c3", 34.1, -118.0)]), None);
        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.created, 0);
        assert_eq!(rig.surface.marker_count(), 1);

        // The pose has not jumped; the interpolator owns the transition.
        let entity = rig.store.get("a1b2c3").unwrap();
        assert_eq!(entity.pose.lat, 33.9);
        assert!(rig.animator.is_animating("a1b2c3"));
    }

    #[test]
    fn test_absent_identifiers_removed() {
        let mut rig = Rig::new();
        rig.reconcile(
            &snapshot_of(vec![obs("a1b2c3", 33.9, -118.4), obs("d4e5f6", 34.0, -118.2)]),
            None,
        );

        let outcome = rig.reconcile(&snapshot_of(vec![obs("a1b2c3", 33.95, -118.3)]), None);
        assert_eq!(outcome.removed, 1);
        assert!(!rig.store.contains("d4e5f6"));
        assert_eq!(rig.surface.marker_count(), 1);
        assert_eq!(rig.surface.removed_marker_count(), 1);
    }

    #[test]
    fn test_removal_cancels_animation() {
        let mut rig = Rig::new();
        rig.reconcile(&snapshot_of(vec![obs("a1b2c3", 33.9, -118.4)]), None);
        rig.reconcile(&snapshot_of(vec![obs("a1b2c3", 34.1, -118.0)]), None);
        assert!(rig.animator.is_animating("a1b2c3"));

        rig.reconcile(&snapshot_of(Vec::new()), None);
        assert!(!rig.animator.is_animating("a1b2c3"));
        assert!(rig.store.is_empty());
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let mut rig = Rig::new();
        let snapshot = snapshot_of(vec![obs("a1b2c3", 33.9, -118.4), obs("d4e5f6", 34.0, -118.2)]);

        rig.reconcile(&snapshot, None);
        let second = rig.reconcile(&snapshot, None);

        assert_eq!(second.created, 0);
        assert_eq!(second.removed, 0);
        assert_eq!(rig.store.len(), 2);
        assert_eq!(rig.surface.marker_count(), 2);
    }

    #[test]
    fn test_focused_identifier_survives_absence() {
        let mut rig = Rig::new();
        rig.reconcile(
            &snapshot_of(vec![obs("a1b2c3", 33.9, -118.4), obs("d4e5f6", 34.0, -118.2)]),
            None,
        );

        let outcome = rig.reconcile(&snapshot_of(Vec::new()), Some("a1b2c3"));
        assert_eq!(outcome.removed, 1);
        assert!(rig.store.contains("a1b2c3"));
        assert!(!rig.store.contains("d4e5f6"));
    }

    #[test]
    fn test_marker_failure_skips_and_retries() {
        let mut rig = Rig::new();
        rig.surface.fail_next_marker();

        let snapshot = snapshot_of(vec![obs("a1b2c3", 33.9, -118.4)]);
        let outcome = rig.reconcile(&snapshot, None);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.created, 0);
        assert!(rig.store.is_empty());

        // Next tick the surface recovers and the identifier lands.
        let outcome = rig.reconcile(&snapshot, None);
        assert_eq!(outcome.created, 1);
        assert!(rig.store.contains("a1b2c3"));
    }
}
