// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # simdata-sampling
//!
//! Samples monitored variables on a single shared timer.
//!
//! - [`Registry`]: handle to entry map, source of the effective period
//! - [`SamplingScheduler`]: owns the timer, snapshots under the lock and
//!   dispatches outside it

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod registry;
pub mod scheduler;

pub use registry::{MonitoredEntry, Registry, MIN_SAMPLING_PERIOD};
pub use scheduler::{
    SamplingScheduler, SchedulerConfig, SchedulerState, SchedulerStatsSnapshot, TickReport,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
