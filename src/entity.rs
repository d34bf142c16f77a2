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

//! Live entities and the store that owns them.
//!
//! An entity is the rendered counterpart of one identifier: domain fields
//! plus the exclusive marker handle. Domain state never lives on the
//! rendering primitive itself; the surface only ever sees handles.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::geo::Pose;
use crate::observation::{Category, Observation};
use crate::surface::{MapSurface, MarkerHandle};

/// Marker scale factor for an altitude in feet.
///
/// Fixed step function so cruising traffic reads larger than traffic near
/// the ground; unknown altitude renders at base size.
#[must_use]
pub fn scale_for_altitude(altitude: Option<f64>) -> f32 {
    match altitude {
        Some(alt) if alt >= 40_000.0 => 1.6,
        Some(alt) if alt >= 30_000.0 => 1.5,
        Some(alt) if alt >= 20_000.0 => 1.4,
        Some(alt) if alt >= 10_000.0 => 1.2,
        _ => 1.0,
    }
}

/// A rendered aircraft.
#[derive(Debug, Clone)]
pub struct Entity {
    /// ICAO 24-bit address, the key into the store.
    pub ident: String,
    /// Current rendered pose; moves every animation frame.
    pub pose: Pose,
    /// Current marker scale.
    pub scale: f32,
    /// Feed provenance from the latest snapshot.
    pub category: Category,
    /// Trimmed callsign, when known.
    pub callsign: Option<String>,
    /// ICAO type code.
    pub model: Option<String>,
    /// Registration (tail number).
    pub registration: Option<String>,
    /// Exclusive handle to this entity's marker.
    pub handle: MarkerHandle,
    /// Hidden by an active focus session.
    pub hidden: bool,
    /// When the latest observation arrived.
    pub last_seen: DateTime<Utc>,
}

impl Entity {
    /// Build a fresh entity from its first observation and marker handle.
    #[must_use]
    pub fn from_observation(observation: &Observation, handle: MarkerHandle) -> Self {
        Self {
            ident: observation.ident.clone(),
            pose: Pose::new(
                observation.position.lat,
                observation.position.lon,
                observation.heading,
            ),
            scale: scale_for_altitude(observation.altitude),
            category: observation.category,
            callsign: observation.callsign.clone(),
            model: observation.model.clone(),
            registration: observation.registration.clone(),
            handle,
            hidden: false,
            last_seen: observation.seen_at,
        }
    }

    /// Refresh metadata from a newer observation.
    ///
    /// Pose and scale stay untouched; those belong to the interpolator.
    /// Known fields are kept when the newer report omits them, since feeds
    /// drop the callsign intermittently.
    pub fn absorb(&mut self, observation: &Observation) {
        self.category = observation.category;
        if observation.callsign.is_some() {
            self.callsign = observation.callsign.clone();
        }
        if observation.model.is_some() {
            self.model = observation.model.clone();
        }
        if observation.registration.is_some() {
            self.registration = observation.registration.clone();
        }
        self.last_seen = observation.seen_at;
    }

    /// Marker title shown by the surface.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.callsign.as_deref().unwrap_or(&self.ident)
    }
}

/// The authoritative set of rendered entities.
///
/// Owned by the engine and mutated only by the reconciler and the focus
/// entry/exit transitions.
#[derive(Debug, Default)]
pub struct EntityStore {
    entities: HashMap<String, Entity>,
}

impl EntityStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: Entity) {
        self.entities.insert(entity.ident.clone(), entity);
    }

    pub fn remove(&mut self, ident: &str) -> Option<Entity> {
        self.entities.remove(ident)
    }

    #[must_use]
    pub fn get(&self, ident: &str) -> Option<&Entity> {
        self.entities.get(ident)
    }

    pub fn get_mut(&mut self, ident: &str) -> Option<&mut Entity> {
        self.entities.get_mut(ident)
    }

    #[must_use]
    pub fn contains(&self, ident: &str) -> bool {
        self.entities.contains_key(ident)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of entities not hidden by a focus session.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.entities.values().filter(|entity| !entity.hidden).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Snapshot of all identifiers, for removal loops.
    #[must_use]
    pub fn idents(&self) -> Vec<String> {
        self.entities.keys().cloned().collect()
    }

    /// Hide every entity except `kept` on the surface.
    ///
    /// Returns how many entities were hidden. Markers survive so the
    /// entities reappear without re-creation when the focus ends.
    pub fn hide_all_except(&mut self, kept: &str, surface: &dyn MapSurface) -> usize {
        let mut hidden = 0;
        for entity in self.entities.values_mut() {
            if entity.ident != kept && !entity.hidden {
                entity.hidden = true;
                surface.set_visible(entity.handle, false);
                hidden += 1;
            }
        }
        hidden
    }

    /// Reveal every hidden entity on the surface.
    ///
    /// Returns how many entities were revealed.
    pub fn reveal_all(&mut self, surface: &dyn MapSurface) -> usize {
        let mut revealed = 0;
        for entity in self.entities.values_mut() {
            if entity.hidden {
                entity.hidden = false;
                surface.set_visible(entity.handle, true);
                revealed += 1;
            }
        }
        revealed
    }
}
