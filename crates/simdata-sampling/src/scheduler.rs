// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Shared-timer sampling scheduler.
//!
//! Every monitored item is served by one timer whose period is the fastest
//! requested interval, never below [`MIN_SAMPLING_PERIOD`]. Each tick copies
//! the registry under the lock and then generates and dispatches values with
//! the lock released, so sinks may start or stop monitoring from inside
//! `on_sample`.
//!
//! # Period rules
//!
//! - Adding a faster item re-arms the timer at the shorter period.
//! - Adding a slower item leaves the timer alone.
//! - Removing the fastest item re-arms the timer at the new minimum.
//! - Removing the last item releases the timer.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use simdata_core::{MonitoredItemId, StrategyTable, TracingSink, VariableId};
//! use simdata_sampling::SamplingScheduler;
//!
//! let scheduler = SamplingScheduler::new(Arc::new(StrategyTable::new()), Arc::new(TracingSink))?;
//! scheduler.start_monitoring(MonitoredItemId::new(1), Duration::from_millis(250), VariableId::new("ns=2;s=A"));
//! assert_eq!(scheduler.effective_period(), Some(Duration::from_millis(250)));
//! ```

use std::fmt;
use std::ops::ControlFlow;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};

use simdata_core::error::{panic_message, SamplingError, SinkError};
use simdata_core::generator::ValueGenerator;
use simdata_core::sink::NotificationSink;
use simdata_core::timer::PeriodicTimer;
use simdata_core::types::{MonitoredItemId, Sample, VariableId};

use crate::registry::{clamp_period, MonitoredEntry, Registry, MIN_SAMPLING_PERIOD};

// =============================================================================
// SchedulerConfig
// =============================================================================

/// Scheduler tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Floor for the shared timer period.
    pub min_period: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_period: MIN_SAMPLING_PERIOD,
        }
    }
}

impl SchedulerConfig {
    /// Creates a config with the given period floor.
    ///
    /// A zero floor is replaced by [`MIN_SAMPLING_PERIOD`].
    pub fn new(min_period: Duration) -> Self {
        let min_period = if min_period.is_zero() {
            MIN_SAMPLING_PERIOD
        } else {
            min_period
        };
        Self { min_period }
    }
}

// =============================================================================
// SchedulerState
// =============================================================================

/// Whether the shared timer is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    /// No monitored items and no timer.
    Idle,
    /// At least one monitored item; the timer runs.
    Active,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Active => write!(f, "active"),
        }
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// Counters for a scheduler.
#[derive(Debug, Default)]
struct SchedulerStats {
    ticks: AtomicU64,
    samples_dispatched: AtomicU64,
    generator_failures: AtomicU64,
    sink_failures: AtomicU64,
    timer_rearms: AtomicU64,
}

impl SchedulerStats {
    fn snapshot(&self) -> SchedulerStatsSnapshot {
        SchedulerStatsSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            samples_dispatched: self.samples_dispatched.load(Ordering::Relaxed),
            generator_failures: self.generator_failures.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
            timer_rearms: self.timer_rearms.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of scheduler counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStatsSnapshot {
    /// Ticks that found at least one entry.
    pub ticks: u64,
    /// Samples accepted by the sink.
    pub samples_dispatched: u64,
    /// Entries skipped because the generator panicked.
    pub generator_failures: u64,
    /// Samples the sink rejected or panicked on.
    pub sink_failures: u64,
    /// Times the timer was (re)created.
    pub timer_rearms: u64,
}

/// Outcome of dispatching one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Entries in the snapshot.
    pub entries: usize,
    /// Samples accepted by the sink.
    pub dispatched: usize,
    /// Entries whose generator panicked.
    pub generator_failures: usize,
    /// Samples the sink rejected or panicked on.
    pub sink_failures: usize,
}

impl TickReport {
    /// Returns `true` if every entry reached the sink successfully.
    pub fn is_clean(&self) -> bool {
        self.generator_failures == 0 && self.sink_failures == 0
    }
}

// =============================================================================
// Inner state
// =============================================================================

/// State guarded by the registry lock.
#[derive(Debug, Default)]
struct SchedulerShared {
    registry: Registry,
    period: Option<Duration>,
    timer: Option<PeriodicTimer>,
}

struct SchedulerInner {
    shared: Mutex<SchedulerShared>,
    generator: Arc<dyn ValueGenerator>,
    sink: Arc<dyn NotificationSink>,
    runtime: Handle,
    config: SchedulerConfig,
    stats: SchedulerStats,
}

impl SchedulerInner {
    /// Applies a requested period. `None` disables the timer; otherwise the
    /// timer is only re-armed when missing or when the period shrinks.
    fn set_period(self: &Arc<Self>, shared: &mut SchedulerShared, requested: Option<Duration>) {
        let Some(requested) = requested else {
            shared.period = None;
            if shared.timer.take().is_some() {
                info!("Sampling timer released, scheduler idle");
            }
            return;
        };

        let period = clamp_period(requested, self.config.min_period);
        if let (Some(current), Some(_)) = (shared.period, shared.timer.as_ref()) {
            if period >= current {
                return;
            }
        }
        self.arm(shared, period);
    }

    /// Replaces the timer with a fresh one at `period`, ticking immediately.
    fn arm(self: &Arc<Self>, shared: &mut SchedulerShared, period: Duration) {
        let was_idle = shared.timer.is_none();
        shared.timer = None;

        let weak = Arc::downgrade(self);
        shared.timer = Some(PeriodicTimer::spawn(
            &self.runtime,
            "sampling",
            period,
            move || match weak.upgrade() {
                Some(inner) => {
                    inner.on_tick();
                    ControlFlow::Continue(())
                }
                None => ControlFlow::Break(()),
            },
        ));
        shared.period = Some(period);
        self.stats.timer_rearms.fetch_add(1, Ordering::Relaxed);

        if was_idle {
            info!(period_ms = period.as_millis() as u64, "Sampling timer started");
        } else {
            debug!(period_ms = period.as_millis() as u64, "Sampling timer re-armed");
        }
    }

    /// Derives the timer period from the whole registry.
    fn recompute(self: &Arc<Self>, shared: &mut SchedulerShared) {
        match shared.registry.effective_period(self.config.min_period) {
            None => self.set_period(shared, None),
            Some(target) => match shared.period {
                // The fastest item left, slow the timer down.
                Some(current) if target > current => self.arm(shared, target),
                _ => self.set_period(shared, Some(target)),
            },
        }
    }

    fn snapshot(&self) -> Vec<(MonitoredItemId, VariableId)> {
        self.shared.lock().registry.snapshot()
    }

    /// Timer callback. Runs on the timer task and must not block.
    fn on_tick(self: &Arc<Self>) {
        let snapshot = self.snapshot();
        if snapshot.is_empty() {
            return;
        }
        self.stats.ticks.fetch_add(1, Ordering::Relaxed);

        let inner = Arc::clone(self);
        self.runtime.spawn(async move {
            inner.dispatch(snapshot).await;
        });
    }

    /// Generates and delivers one sample per snapshot entry. Failures are
    /// confined to their entry.
    async fn dispatch(&self, snapshot: Vec<(MonitoredItemId, VariableId)>) -> TickReport {
        let mut report = TickReport {
            entries: snapshot.len(),
            ..TickReport::default()
        };

        for (handle, variable) in snapshot {
            let generated = panic::catch_unwind(AssertUnwindSafe(|| self.generator.generate(&variable)));
            let value = match generated {
                Ok(value) => value,
                Err(payload) => {
                    let err = SamplingError::generator_panicked(
                        variable.as_str(),
                        panic_message(payload.as_ref()),
                    );
                    warn!(handle = %handle, error = %err, "Skipping entry for this tick");
                    self.stats.generator_failures.fetch_add(1, Ordering::Relaxed);
                    report.generator_failures += 1;
                    continue;
                }
            };

            let sample = Sample::good(variable.clone(), value);
            match AssertUnwindSafe(self.sink.on_sample(sample)).catch_unwind().await {
                Ok(Ok(())) => {
                    self.stats.samples_dispatched.fetch_add(1, Ordering::Relaxed);
                    report.dispatched += 1;
                }
                Ok(Err(e)) => {
                    warn!(
                        handle = %handle,
                        sink = self.sink.name(),
                        error = %e,
                        "Sink rejected sample"
                    );
                    self.stats.sink_failures.fetch_add(1, Ordering::Relaxed);
                    report.sink_failures += 1;
                }
                Err(payload) => {
                    let err = SinkError::panicked(variable.as_str(), panic_message(payload.as_ref()));
                    error!(handle = %handle, sink = self.sink.name(), error = %err, "Sink panicked");
                    self.stats.sink_failures.fetch_add(1, Ordering::Relaxed);
                    report.sink_failures += 1;
                }
            }
        }

        report
    }
}

// =============================================================================
// SamplingScheduler
// =============================================================================

/// Samples monitored variables on one shared timer.
///
/// Dropping the scheduler releases its timer. Wrap it in an `Arc` to share
/// it; sinks that call back into it should hold a `Weak`.
pub struct SamplingScheduler {
    inner: Arc<SchedulerInner>,
}

impl SamplingScheduler {
    /// Creates a scheduler on the current tokio runtime.
    pub fn new(
        generator: Arc<dyn ValueGenerator>,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self, SamplingError> {
        Self::with_config(generator, sink, SchedulerConfig::default())
    }

    /// Creates a scheduler on the current tokio runtime with custom tuning.
    pub fn with_config(
        generator: Arc<dyn ValueGenerator>,
        sink: Arc<dyn NotificationSink>,
        config: SchedulerConfig,
    ) -> Result<Self, SamplingError> {
        let runtime = Handle::try_current().map_err(|e| SamplingError::no_runtime(e.to_string()))?;
        Ok(Self::with_runtime(generator, sink, config, runtime))
    }

    /// Creates a scheduler whose timer runs on `runtime`.
    pub fn with_runtime(
        generator: Arc<dyn ValueGenerator>,
        sink: Arc<dyn NotificationSink>,
        config: SchedulerConfig,
        runtime: Handle,
    ) -> Self {
        debug!(
            sink = sink.name(),
            min_period_ms = config.min_period.as_millis() as u64,
            "Sampling scheduler created"
        );
        Self {
            inner: Arc::new(SchedulerInner {
                shared: Mutex::new(SchedulerShared::default()),
                generator,
                sink,
                runtime,
                config,
                stats: SchedulerStats::default(),
            }),
        }
    }

    /// Registers or replaces the entry for `handle` and adjusts the timer.
    pub fn start_monitoring(
        &self,
        handle: MonitoredItemId,
        sampling_interval: Duration,
        variable: VariableId,
    ) {
        let mut shared = self.inner.shared.lock();
        let entry = MonitoredEntry::new(handle, variable, sampling_interval);

        debug!(
            handle = %handle,
            variable = %entry.variable,
            interval_ms = sampling_interval.as_millis() as u64,
            "Monitoring started"
        );
        if let Some(previous) = shared.registry.insert(entry) {
            debug!(
                handle = %handle,
                previous_interval_ms = previous.sampling_interval.as_millis() as u64,
                "Replaced existing entry"
            );
        }

        self.inner.recompute(&mut shared);
    }

    /// Removes the entry for `handle`. Returns `false` if it was unknown.
    pub fn stop_monitoring(&self, handle: MonitoredItemId) -> bool {
        let mut shared = self.inner.shared.lock();
        let Some(removed) = shared.registry.remove(handle) else {
            debug!(handle = %handle, "Stop for unknown handle ignored");
            return false;
        };

        debug!(handle = %handle, variable = %removed.variable, "Monitoring stopped");
        self.inner.recompute(&mut shared);
        true
    }

    /// Number of registered entries.
    pub fn monitored_count(&self) -> usize {
        self.inner.shared.lock().registry.len()
    }

    /// Returns `true` if `handle` is registered.
    pub fn contains(&self, handle: MonitoredItemId) -> bool {
        self.inner.shared.lock().registry.contains(handle)
    }

    /// Current timer period, `None` while idle.
    pub fn effective_period(&self) -> Option<Duration> {
        let shared = self.inner.shared.lock();
        shared.timer.as_ref().and(shared.period)
    }

    /// Current state.
    pub fn state(&self) -> SchedulerState {
        if self.inner.shared.lock().timer.is_some() {
            SchedulerState::Active
        } else {
            SchedulerState::Idle
        }
    }

    /// Scheduler tuning.
    pub fn config(&self) -> SchedulerConfig {
        self.inner.config
    }

    /// Counter snapshot.
    pub fn stats(&self) -> SchedulerStatsSnapshot {
        self.inner.stats.snapshot()
    }

    /// Runs one tick inline and waits for its dispatch to finish.
    pub async fn sample_now(&self) -> TickReport {
        let snapshot = self.inner.snapshot();
        if snapshot.is_empty() {
            return TickReport::default();
        }
        self.inner.stats.ticks.fetch_add(1, Ordering::Relaxed);
        self.inner.dispatch(snapshot).await
    }

    /// Clears the registry and releases the timer.
    pub fn shutdown(&self) {
        let mut shared = self.inner.shared.lock();
        let count = shared.registry.len();
        shared.registry.clear();
        self.inner.set_period(&mut shared, None);
        if count > 0 {
            info!(dropped_entries = count, "Sampling scheduler shut down");
        }
    }
}

impl Drop for SamplingScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for SamplingScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.inner.shared.lock();
        f.debug_struct("SamplingScheduler")
            .field("monitored", &shared.registry.len())
            .field("period", &shared.period)
            .field("active", &shared.timer.is_some())
            .field("sink", &self.inner.sink.name())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use simdata_core::error::SimResult;
    use simdata_core::types::Value;
    use std::sync::{OnceLock, Weak};

    #[derive(Default)]
    struct RecordingSink {
        samples: Mutex<Vec<Sample>>,
    }

    impl RecordingSink {
        fn count(&self) -> usize {
            self.samples.lock().len()
        }
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn on_sample(&self, sample: Sample) -> SimResult<()> {
            self.samples.lock().push(sample);
            Ok(())
        }
    }

    fn constant_generator() -> Arc<dyn ValueGenerator> {
        Arc::new(|_: &VariableId| Value::Int32(7))
    }

    fn scheduler() -> (SamplingScheduler, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let scheduler = SamplingScheduler::new(constant_generator(), sink.clone()).unwrap();
        (scheduler, sink)
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn id(n: u32) -> MonitoredItemId {
        MonitoredItemId::new(n)
    }

    fn var(name: &str) -> VariableId {
        VariableId::new(name)
    }

    #[test]
    fn test_new_without_runtime_fails() {
        let sink = Arc::new(RecordingSink::default());
        let result = SamplingScheduler::new(constant_generator(), sink);
        assert!(matches!(result, Err(SamplingError::NoRuntime { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_period_grows_and_releases_on_stop() {
        let (scheduler, _sink) = scheduler();
        assert_eq!(scheduler.state(), SchedulerState::Idle);

        scheduler.start_monitoring(id(1), ms(1000), var("x"));
        scheduler.start_monitoring(id(2), ms(200), var("y"));
        assert_eq!(scheduler.effective_period(), Some(ms(200)));
        assert_eq!(scheduler.state(), SchedulerState::Active);

        assert!(scheduler.stop_monitoring(id(2)));
        assert_eq!(scheduler.effective_period(), Some(ms(1000)));

        assert!(scheduler.stop_monitoring(id(1)));
        assert_eq!(scheduler.effective_period(), None);
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(scheduler.monitored_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_period_floor() {
        let (scheduler, _sink) = scheduler();
        for n in 1..=3 {
            scheduler.start_monitoring(id(n), ms(500), var("v"));
        }
        assert_eq!(scheduler.effective_period(), Some(ms(500)));

        scheduler.start_monitoring(id(4), ms(50), var("w"));
        assert_eq!(scheduler.effective_period(), Some(ms(100)));

        scheduler.start_monitoring(id(5), Duration::ZERO, var("z"));
        assert_eq!(scheduler.effective_period(), Some(ms(100)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_shorter_period_rearms() {
        let (scheduler, _sink) = scheduler();

        scheduler.start_monitoring(id(1), ms(500), var("a"));
        assert_eq!(scheduler.stats().timer_rearms, 1);

        scheduler.start_monitoring(id(2), ms(1000), var("b"));
        assert_eq!(scheduler.stats().timer_rearms, 1);
        assert_eq!(scheduler.effective_period(), Some(ms(500)));

        scheduler.start_monitoring(id(3), ms(200), var("c"));
        assert_eq!(scheduler.stats().timer_rearms, 2);

        // Removing a slower entry keeps the running timer.
        scheduler.stop_monitoring(id(2));
        assert_eq!(scheduler.stats().timer_rearms, 2);
        assert_eq!(scheduler.effective_period(), Some(ms(200)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_replace_same_handle() {
        let (scheduler, _sink) = scheduler();

        scheduler.start_monitoring(id(1), ms(200), var("a"));
        scheduler.start_monitoring(id(1), ms(800), var("a"));

        assert_eq!(scheduler.monitored_count(), 1);
        assert_eq!(scheduler.effective_period(), Some(ms(800)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_unknown_is_noop() {
        let (scheduler, _sink) = scheduler();
        scheduler.start_monitoring(id(1), ms(300), var("a"));

        assert!(!scheduler.stop_monitoring(id(42)));
        assert_eq!(scheduler.monitored_count(), 1);
        assert_eq!(scheduler.effective_period(), Some(ms(300)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_dispatches_good_samples() {
        let (scheduler, sink) = scheduler();
        scheduler.start_monitoring(id(1), ms(100), var("ns=2;s=A"));

        // Ticks at 0, 100, 200.
        tokio::time::sleep(ms(250)).await;

        assert_eq!(scheduler.stats().ticks, 3);
        assert_eq!(sink.count(), 3);
        let samples = sink.samples.lock();
        assert!(samples.iter().all(|s| s.status.is_good()));
        assert!(samples.iter().all(|s| s.value == Value::Int32(7)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slower_period_after_fastest_removed() {
        let (scheduler, _sink) = scheduler();
        scheduler.start_monitoring(id(1), ms(100), var("fast"));
        scheduler.start_monitoring(id(2), ms(1000), var("slow"));
        tokio::time::sleep(ms(50)).await;

        scheduler.stop_monitoring(id(1));
        let before = scheduler.stats().ticks;

        // Re-armed at 1000 ms: ticks at +0, +1000, +2000.
        tokio::time::sleep(ms(2500)).await;
        assert_eq!(scheduler.stats().ticks - before, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_releases_timer() {
        let (scheduler, sink) = scheduler();
        scheduler.start_monitoring(id(1), ms(100), var("a"));
        tokio::time::sleep(ms(150)).await;

        drop(scheduler);
        let before = sink.count();
        tokio::time::sleep(ms(1000)).await;
        assert_eq!(sink.count(), before);
    }

    #[tokio::test]
    async fn test_generator_panic_is_isolated() {
        let sink = Arc::new(RecordingSink::default());
        let generator: Arc<dyn ValueGenerator> = Arc::new(|v: &VariableId| {
            if v.as_str() == "bad" {
                panic!("boom");
            }
            Value::Boolean(true)
        });
        let scheduler = SamplingScheduler::new(generator, sink.clone()).unwrap();
        scheduler.start_monitoring(id(1), ms(10_000), var("bad"));
        scheduler.start_monitoring(id(2), ms(10_000), var("good"));

        let report = scheduler.sample_now().await;

        assert_eq!(report.entries, 2);
        assert_eq!(report.generator_failures, 1);
        assert!(!report.is_clean());
        assert!(sink.samples.lock().iter().any(|s| s.variable.as_str() == "good"));
        assert_eq!(scheduler.stats().generator_failures, 1);
    }

    struct FlakySink;

    #[async_trait]
    impl NotificationSink for FlakySink {
        async fn on_sample(&self, sample: Sample) -> SimResult<()> {
            match sample.variable.as_str() {
                "reject" => Err(SinkError::rejected("reject", "nope").into()),
                "panic" => panic!("sink exploded"),
                _ => Ok(()),
            }
        }
    }

    #[tokio::test]
    async fn test_sink_failures_are_isolated() {
        let scheduler = SamplingScheduler::new(constant_generator(), Arc::new(FlakySink)).unwrap();
        scheduler.start_monitoring(id(1), ms(10_000), var("reject"));
        scheduler.start_monitoring(id(2), ms(10_000), var("panic"));
        scheduler.start_monitoring(id(3), ms(10_000), var("fine"));

        let report = scheduler.sample_now().await;

        assert_eq!(report.dispatched, 1);
        assert_eq!(report.sink_failures, 2);
        assert_eq!(scheduler.stats().sink_failures, 2);
    }

    /// Stops its own entry from inside the callback.
    #[derive(Default)]
    struct UnsubscribingSink {
        scheduler: OnceLock<Weak<SamplingScheduler>>,
        seen: AtomicU64,
    }

    #[async_trait]
    impl NotificationSink for UnsubscribingSink {
        async fn on_sample(&self, _sample: Sample) -> SimResult<()> {
            self.seen.fetch_add(1, Ordering::SeqCst);
            if let Some(scheduler) = self.scheduler.get().and_then(Weak::upgrade) {
                scheduler.stop_monitoring(MonitoredItemId::new(1));
                scheduler.start_monitoring(MonitoredItemId::new(9), Duration::from_secs(5), VariableId::new("late"));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_sink_may_reenter_scheduler() {
        let sink = Arc::new(UnsubscribingSink::default());
        let scheduler = Arc::new(SamplingScheduler::new(constant_generator(), sink.clone()).unwrap());
        let _ = sink.scheduler.set(Arc::downgrade(&scheduler));

        scheduler.start_monitoring(id(1), ms(10_000), var("a"));
        let report = scheduler.sample_now().await;

        assert_eq!(report.dispatched, 1);
        assert!(!scheduler.contains(id(1)));
        assert!(scheduler.contains(id(9)));
        assert_eq!(sink.seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sample_now_on_empty_registry() {
        let (scheduler, sink) = scheduler();
        let report = scheduler.sample_now().await;

        assert_eq!(report, TickReport::default());
        assert_eq!(sink.count(), 0);
        assert_eq!(scheduler.stats().ticks, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_clears_everything() {
        let (scheduler, _sink) = scheduler();
        scheduler.start_monitoring(id(1), ms(100), var("a"));
        scheduler.start_monitoring(id(2), ms(200), var("b"));

        scheduler.shutdown();

        assert_eq!(scheduler.monitored_count(), 0);
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(scheduler.effective_period(), None);
    }

    #[test]
    fn test_config_zero_floor() {
        assert_eq!(SchedulerConfig::new(Duration::ZERO).min_period, MIN_SAMPLING_PERIOD);
        assert_eq!(SchedulerConfig::new(ms(250)).min_period, ms(250));
    }
}
