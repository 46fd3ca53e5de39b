// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Scoped periodic timer.
//!
//! A [`PeriodicTimer`] owns a tokio task that invokes a callback at a fixed
//! period. The first tick fires immediately. Dropping the timer aborts the
//! task, so whoever owns the timer owns its lifetime.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::ops::ControlFlow;
//! use simdata_core::timer::PeriodicTimer;
//!
//! let timer = PeriodicTimer::spawn(
//!     &tokio::runtime::Handle::current(),
//!     "sampling",
//!     Duration::from_millis(100),
//!     || { println!("tick"); ControlFlow::Continue(()) },
//! );
//!
//! drop(timer); // task aborted
//! ```

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, trace};

/// A periodic task that is aborted when dropped.
#[derive(Debug)]
pub struct PeriodicTimer {
    name: &'static str,
    period: Duration,
    task: JoinHandle<()>,
}

impl PeriodicTimer {
    /// Spawns a timer on `runtime` that calls `on_tick` every `period`,
    /// starting immediately.
    ///
    /// The callback returns `ControlFlow::Break(())` to end the timer from
    /// inside, e.g. when the component it serves has been dropped.
    pub fn spawn<F>(runtime: &Handle, name: &'static str, period: Duration, on_tick: F) -> Self
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        Self::spawn_inner(runtime, name, period, Duration::ZERO, on_tick)
    }

    /// Like [`spawn`](Self::spawn), but the first tick fires one period in.
    pub fn spawn_delayed<F>(runtime: &Handle, name: &'static str, period: Duration, on_tick: F) -> Self
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        Self::spawn_inner(runtime, name, period, period, on_tick)
    }

    fn spawn_inner<F>(
        runtime: &Handle,
        name: &'static str,
        period: Duration,
        first_delay: Duration,
        mut on_tick: F,
    ) -> Self
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        // tokio rejects a zero period.
        let period = period.max(Duration::from_millis(1));
        debug!(timer = name, period_ms = period.as_millis() as u64, "Timer armed");

        let task = runtime.spawn(async move {
            let start = Instant::now() + first_delay;
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                trace!(timer = name, "Timer tick");
                if on_tick().is_break() {
                    debug!(timer = name, "Timer owner gone, stopping");
                    break;
                }
            }
        });

        Self { name, period, task }
    }

    /// Returns the timer period.
    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Returns the timer name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` if the timer task has ended.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PeriodicTimer {
    fn drop(&mut self) {
        self.task.abort();
        debug!(timer = self.name, "Timer released");
    }
}

// =============================================================================
// Tests
// =============================================================================
