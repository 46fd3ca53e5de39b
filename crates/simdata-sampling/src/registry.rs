// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Monitored item registry.
//!
//! The registry maps subscription handles to the variable they sample and the
//! interval the client asked for. The shared timer period is always derived
//! from the full registry, never tracked incrementally.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use simdata_core::types::{MonitoredItemId, VariableId};

/// Floor applied to every sampling period.
pub const MIN_SAMPLING_PERIOD: Duration = Duration::from_millis(100);

// =============================================================================
// MonitoredEntry
// =============================================================================

/// One active "keep sampling this variable" registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredEntry {
    /// Subscription handle.
    pub handle: MonitoredItemId,

    /// Variable being sampled.
    pub variable: VariableId,

    /// Interval requested by the client.
    pub sampling_interval: Duration,
}

impl MonitoredEntry {
    /// Creates a new entry.
    pub fn new(handle: MonitoredItemId, variable: VariableId, sampling_interval: Duration) -> Self {
        Self {
            handle,
            variable,
            sampling_interval,
        }
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Monitored entries keyed by handle.
#[derive(Debug, Default)]
pub struct Registry {
    entries: HashMap<MonitoredItemId, MonitoredEntry>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entry for its handle, returning the old one.
    pub fn insert(&mut self, entry: MonitoredEntry) -> Option<MonitoredEntry> {
        self.entries.insert(entry.handle, entry)
    }

    /// Removes the entry for `handle`.
    pub fn remove(&mut self, handle: MonitoredItemId) -> Option<MonitoredEntry> {
        self.entries.remove(&handle)
    }

    /// Returns the entry for `handle`.
    pub fn get(&self, handle: MonitoredItemId) -> Option<&MonitoredEntry> {
        self.entries.get(&handle)
    }

    /// Returns `true` if `handle` is registered.
    pub fn contains(&self, handle: MonitoredItemId) -> bool {
        self.entries.contains_key(&handle)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Smallest requested interval, `None` when empty.
    pub fn fastest_interval(&self) -> Option<Duration> {
        self.entries.values().map(|e| e.sampling_interval).min()
    }

    /// Period the shared timer should run at, `None` when empty.
    pub fn effective_period(&self, floor: Duration) -> Option<Duration> {
        self.fastest_interval().map(|fastest| clamp_period(fastest, floor))
    }

    /// Copies `(handle, variable)` pairs, ordered by handle.
    pub fn snapshot(&self) -> Vec<(MonitoredItemId, VariableId)> {
        let mut items: Vec<_> = self
            .entries
            .values()
            .map(|e| (e.handle, e.variable.clone()))
            .collect();
        items.sort_by_key(|(handle, _)| *handle);
        items
    }
}

/// Raises `requested` to `floor` if it is below it.
#[inline]
pub fn clamp_period(requested: Duration, floor: Duration) -> Duration {
    requested.max(floor)
}

// =============================================================================
// Tests
// =============================================================================
