// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! Sinks and generators that record what the engine does to them and can be
//! told to fail for specific variables.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use simdata_core::error::{SimResult, SinkError};
use simdata_core::{MonitoredItemId, NotificationSink, Sample, Value, ValueGenerator, VariableId};
use simdata_sampling::SamplingScheduler;

// =============================================================================
// Mock Sink
// =============================================================================

/// A notification sink that records every sample it accepts.
#[derive(Debug, Default)]
pub struct MockSink {
    /// Accepted samples, in arrival order.
    samples: Mutex<Vec<Sample>>,

    /// Variables whose samples are rejected with an error.
    reject: Mutex<HashSet<VariableId>>,

    /// Variables whose samples make the sink panic.
    panic_on: Mutex<HashSet<VariableId>>,

    /// Rejected or panicked calls.
    failures: AtomicU64,
}

impl MockSink {
    /// Creates a new sink.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Rejects samples for `variable`.
    pub fn reject(&self, variable: impl Into<VariableId>) {
        self.reject.lock().insert(variable.into());
    }

    /// Panics on samples for `variable`.
    pub fn panic_on(&self, variable: impl Into<VariableId>) {
        self.panic_on.lock().insert(variable.into());
    }

    /// All accepted samples.
    pub fn samples(&self) -> Vec<Sample> {
        self.samples.lock().clone()
    }

    /// Number of accepted samples.
    pub fn count(&self) -> usize {
        self.samples.lock().len()
    }

    /// Accepted samples for one variable.
    pub fn samples_for(&self, variable: &str) -> Vec<Sample> {
        self.samples
            .lock()
            .iter()
            .filter(|s| s.variable.as_str() == variable)
            .cloned()
            .collect()
    }

    /// Number of accepted samples for one variable.
    pub fn count_for(&self, variable: &str) -> usize {
        self.samples_for(variable).len()
    }

    /// Number of rejected or panicked calls.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::SeqCst)
    }

    /// Forgets everything recorded so far.
    pub fn clear(&self) {
        self.samples.lock().clear();
    }
}

#[async_trait]
impl NotificationSink for MockSink {
    async fn on_sample(&self, sample: Sample) -> SimResult<()> {
        if self.panic_on.lock().contains(&sample.variable) {
            self.failures.fetch_add(1, Ordering::SeqCst);
            panic!("mock sink panic for {}", sample.variable);
        }
        if self.reject.lock().contains(&sample.variable) {
            self.failures.fetch_add(1, Ordering::SeqCst);
            return Err(SinkError::rejected(sample.variable.as_str(), "mock rejection").into());
        }
        self.samples.lock().push(sample);
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// =============================================================================
// Counting Generator
// =============================================================================

/// A generator that returns `Int32` 1, 2, 3, ... per variable.
#[derive(Debug, Default)]
pub struct CountingGenerator {
    counters: Mutex<HashMap<VariableId, i32>>,
    panic_on: Mutex<HashSet<VariableId>>,
    calls: AtomicU64,
}

impl CountingGenerator {
    /// Creates a new generator.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Panics when asked for `variable`.
    pub fn panic_on(&self, variable: impl Into<VariableId>) {
        self.panic_on.lock().insert(variable.into());
    }

    /// Stops panicking for `variable`.
    pub fn recover(&self, variable: &VariableId) {
        self.panic_on.lock().remove(variable);
    }

    /// Number of `generate` calls, including panicking ones.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ValueGenerator for CountingGenerator {
    fn generate(&self, variable: &VariableId) -> Value {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_on.lock().contains(variable) {
            panic!("mock generator panic for {}", variable);
        }
        let mut counters = self.counters.lock();
        let counter = counters.entry(variable.clone()).or_insert(0);
        *counter += 1;
        Value::Int32(*counter)
    }
}

// =============================================================================
// Reentrant Sink
// =============================================================================

/// Registry change a [`ReentrantSink`] makes from inside `on_sample`.
#[derive(Debug, Clone)]
pub enum ReentrantAction {
    /// Stops `handle`.
    Stop(MonitoredItemId),
    /// Starts `handle` for `variable` at `interval`.
    Start(MonitoredItemId, Duration, VariableId),
}

/// A sink that calls back into the scheduler that feeds it.
///
/// The action runs once, on the first sample for `trigger`.
pub struct ReentrantSink {
    scheduler: OnceLock<Weak<SamplingScheduler>>,
    trigger: VariableId,
    action: ReentrantAction,
    fired: Mutex<bool>,
    seen: AtomicU64,
}

impl ReentrantSink {
    /// Creates a sink that runs `action` when `trigger` is sampled.
    pub fn new(trigger: impl Into<VariableId>, action: ReentrantAction) -> Arc<Self> {
        Arc::new(Self {
            scheduler: OnceLock::new(),
            trigger: trigger.into(),
            action,
            fired: Mutex::new(false),
            seen: AtomicU64::new(0),
        })
    }

    /// Connects the sink to its scheduler.
    pub fn attach(&self, scheduler: &Arc<SamplingScheduler>) {
        let _ = self.scheduler.set(Arc::downgrade(scheduler));
    }

    /// Returns true once the action ran.
    pub fn fired(&self) -> bool {
        *self.fired.lock()
    }

    /// Number of samples received.
    pub fn seen(&self) -> u64 {
        self.seen.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationSink for ReentrantSink {
    async fn on_sample(&self, sample: Sample) -> SimResult<()> {
        self.seen.fetch_add(1, Ordering::SeqCst);
        if sample.variable != self.trigger {
            return Ok(());
        }

        {
            let mut fired = self.fired.lock();
            if *fired {
                return Ok(());
            }
            *fired = true;
        }

        if let Some(scheduler) = self.scheduler.get().and_then(Weak::upgrade) {
            match &self.action {
                ReentrantAction::Stop(handle) => {
                    scheduler.stop_monitoring(*handle);
                }
                ReentrantAction::Start(handle, interval, variable) => {
                    scheduler.start_monitoring(*handle, *interval, variable.clone());
                }
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "reentrant"
    }
}
