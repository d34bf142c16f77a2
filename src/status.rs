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

//! Rolling diagnostics for the polling loops.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::feed::FeedBatch;
use crate::observation::Category;

/// Health of one polled feed category.
#[derive(Debug, Clone)]
pub struct FeedHealth {
    pub category: Category,
    /// When this feed last answered successfully.
    pub last_ok_at: Option<DateTime<Utc>>,
    /// Most recent error, cleared on the next success.
    pub last_error: Option<String>,
    /// Failures since the last success.
    pub consecutive_failures: u32,
    /// Observation count from the last successful answer.
    pub last_count: usize,
}

impl FeedHealth {
    fn new(category: Category) -> Self {
        Self {
            category,
            last_ok_at: None,
            last_error: None,
            consecutive_failures: 0,
            last_count: 0,
        }
    }

    /// Whether the feed answered its most recent poll.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.consecutive_failures == 0 && self.last_ok_at.is_some()
    }
}

/// Scan-loop statistics, readable through the engine facade.
#[derive(Debug, Clone, Default)]
pub struct ScanStatus {
    /// Per-feed health, keyed by category.
    pub feeds: HashMap<Category, FeedHealth>,
    /// Completed area-scan ticks.
    pub scans_completed: u64,
    /// When the last scan finished.
    pub last_scan_at: Option<DateTime<Utc>>,
    /// Identifier count of the last merged snapshot.
    pub merged_count: usize,
    /// Visible entity count after the last reconcile.
    pub visible_count: usize,
}

impl ScanStatus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one feed's answer for the current tick.
    pub fn record_batch(&mut self, batch: &FeedBatch) {
        let health = self
            .feeds
            .entry(batch.category)
            .or_insert_with(|| FeedHealth::new(batch.category));

        match &batch.observations {
            Ok(list) => {
                health.last_ok_at = Some(Utc::now());
                health.last_error = None;
                health.consecutive_failures = 0;
                health.last_count = list.len();
            }
            Err(error) => {
                health.consecutive_failures += 1;
                health.last_error = Some(error.to_string());
            }
        }
    }

    /// Record a completed scan.
    pub fn record_scan(&mut self, merged: usize, visible: usize) {
        self.scans_completed += 1;
        self.last_scan_at = Some(Utc::now());
        self.merged_count = merged;
        self.visible_count = visible;
    }

    /// Number of feeds whose most recent poll succeeded.
    #[must_use]
    pub fn healthy_feed_count(&self) -> usize {
        self.feeds.values().filter(|f| f.is_healthy()).count()
    }
}
