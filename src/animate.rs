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

//! Per-entity motion interpolation between polling ticks.
//!
//! Polls arrive seconds apart; markers glide between them instead of
//! jumping. Each moving entity owns one animation task keyed by its
//! identifier, carrying a cancellation token, the start pose, and the
//! target. A new `animate` call for the same identifier cancels the old
//! task outright, so the newest target always wins and a superseded task
//! never applies another frame.
//!
//! The frame pump is synchronous: the host calls [`Animator::advance`] on
//! its repaint cadence with the current instant. Position interpolates
//! linearly; heading and scale are not interpolated, the target values
//! apply on every frame. When a task's window elapses the pose is pinned
//! to the exact target and the task is dropped.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::entity::{Entity, EntityStore};
use crate::geo::{LatLon, Pose};
use crate::surface::MapSurface;

/// Default glide window between polling ticks.
pub const DEFAULT_ANIMATION_WINDOW: Duration = Duration::from_secs(5);

#[derive(Debug)]
struct AnimationTask {
    token: CancellationToken,
    from: LatLon,
    target: LatLon,
    target_heading: f64,
    target_scale: f32,
    started: Instant,
    window: Duration,
}

impl AnimationTask {
    fn progress(&self, now: Instant) -> f64 {
        if self.window.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started).as_secs_f64();
        (elapsed / self.window.as_secs_f64()).clamp(0.0, 1.0)
    }

    fn pose_at(&self, progress: f64) -> Pose {
        if progress >= 1.0 {
            return Pose::new(self.target.lat, self.target.lon, self.target_heading);
        }
        Pose::new(
            self.from.lat + (self.target.lat - self.from.lat) * progress,
            self.from.lon + (self.target.lon - self.from.lon) * progress,
            self.target_heading,
        )
    }
}

/// Drives glide animations for every moving entity.
#[derive(Debug)]
pub struct Animator {
    tasks: HashMap<String, AnimationTask>,
    window: Duration,
}

impl Animator {
    /// Create an animator with the given glide window.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            tasks: HashMap::new(),
            window,
        }
    }

    /// Begin animating an entity toward a target.
    ///
    /// The glide starts from the entity's current pose, wherever the
    /// previous animation left it. Any in-flight task for the identifier
    /// is cancelled and replaced.
    pub fn animate(
        &mut self,
        entity: &Entity,
        target: LatLon,
        heading: f64,
        scale: f32,
        now: Instant,
    ) {
        if let Some(previous) = self.tasks.remove(&entity.ident) {
            previous.token.cancel();
        }
        self.tasks.insert(
            entity.ident.clone(),
            AnimationTask {
                token: CancellationToken::new(),
                from: entity.pose.position(),
                target,
                target_heading: heading,
                target_scale: scale,
                started: now,
                window: self.window,
            },
        );
    }

    /// Cancel the animation for one identifier.
    ///
    /// The task's token flips immediately; the entry itself is reaped on
    /// the next frame without applying.
    pub fn cancel(&mut self, ident: &str) {
        if let Some(task) = self.tasks.get(ident) {
            task.token.cancel();
        }
    }

    /// Cancel every in-flight animation.
    pub fn cancel_all(&mut self) {
        for task in self.tasks.values() {
            task.token.cancel();
        }
        self.tasks.clear();
    }

    /// Whether an identifier has a live animation.
    #[must_use]
    pub fn is_animating(&self, ident: &str) -> bool {
        self.tasks
            .get(ident)
            .is_some_and(|task| !task.token.is_cancelled())
    }

    /// Number of live animations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks
            .values()
            .filter(|task| !task.token.is_cancelled())
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply one frame to every in-flight animation.
    pub fn advance(&mut self, now: Instant, store: &mut EntityStore, surface: &dyn MapSurface) {
        let mut done: Vec<String> = Vec::new();

        for (ident, task) in &self.tasks {
            if task.token.is_cancelled() {
                done.push(ident.clone());
                continue;
            }
            let Some(entity) = store.get_mut(ident) else {
                // Entity vanished out from under the task.
                task.token.cancel();
                done.push(ident.clone());
                continue;
            };

            let progress = task.progress(now);
            let pose = task.pose_at(progress);
            entity.pose = pose;
            entity.scale = task.target_scale;
            surface.set_pose(entity.handle, pose.position());
            surface.set_rotation(entity.handle, task.target_heading);
            surface.set_scale(entity.handle, task.target_scale);

            if progress >= 1.0 {
                done.push(ident.clone());
            }
        }

        for ident in done {
            self.tasks.remove(&ident);
        }
    }
}

impl Default for Animator {
    fn default() -> Self {
        Self::new(DEFAULT_ANIMATION_WINDOW)
    }
}
