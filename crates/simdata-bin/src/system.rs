// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The data system: one generator, one sampling scheduler, one history archive.
//!
//! This is the surface a node manager drives. Monitored-item lifecycle calls
//! go to the scheduler; history enablement goes to the archive.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use simdata_core::{
    DataType, MonitoredItemId, NotificationSink, StrategyTable, TracingSink, Value, ValueGenerator,
    ValueRank, VariableId,
};
use simdata_history::{HistoryArchive, HistoryConfig, HistoryEntry};
use simdata_sampling::{SamplingScheduler, SchedulerConfig};

use crate::error::BinResult;

// =============================================================================
// MonitoringMode
// =============================================================================

/// Monitoring mode of a monitored item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitoringMode {
    /// Not sampled.
    Disabled,
    /// Sampled, notifications queued but not reported.
    Sampling,
    /// Sampled and reported.
    Reporting,
}

impl MonitoringMode {
    /// Returns true if items in this mode are sampled.
    pub fn is_sampled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

// =============================================================================
// DataSystem
// =============================================================================

/// Facade over the sampling scheduler and the history archive.
pub struct DataSystem {
    generator: Arc<dyn ValueGenerator>,
    scheduler: SamplingScheduler,
    archive: HistoryArchive,
}

impl DataSystem {
    /// Creates a builder.
    pub fn builder() -> DataSystemBuilder {
        DataSystemBuilder::default()
    }

    /// Starts sampling `variable` for `handle` at `interval`.
    pub fn start_monitoring(
        &self,
        handle: MonitoredItemId,
        interval: Duration,
        variable: VariableId,
    ) {
        self.scheduler.start_monitoring(handle, interval, variable);
    }

    /// Re-registers `handle` with a new interval and variable.
    pub fn modify_monitoring(
        &self,
        handle: MonitoredItemId,
        interval: Duration,
        variable: VariableId,
    ) {
        self.scheduler.stop_monitoring(handle);
        self.scheduler.start_monitoring(handle, interval, variable);
    }

    /// Applies a monitoring mode transition.
    ///
    /// Moving to `Disabled` stops sampling, leaving `Disabled` starts it.
    /// Switching between `Sampling` and `Reporting` changes nothing here.
    pub fn set_monitoring_mode(
        &self,
        handle: MonitoredItemId,
        previous: MonitoringMode,
        current: MonitoringMode,
        interval: Duration,
        variable: VariableId,
    ) {
        match (previous.is_sampled(), current.is_sampled()) {
            (true, false) => {
                self.scheduler.stop_monitoring(handle);
            }
            (false, true) => {
                self.scheduler.start_monitoring(handle, interval, variable);
            }
            _ => {
                debug!(%handle, ?previous, ?current, "Mode change needs no rescheduling");
            }
        }
    }

    /// Stops sampling for `handle`. Returns false if it was not monitored.
    pub fn stop_monitoring(&self, handle: MonitoredItemId) -> bool {
        self.scheduler.stop_monitoring(handle)
    }

    /// Creates a history record for a scalar variable.
    ///
    /// Returns true if a new record was created.
    pub fn enable_history_archiving(
        &self,
        variable: VariableId,
        data_type: DataType,
        value_rank: ValueRank,
    ) -> bool {
        if !value_rank.is_scalar() {
            debug!(%variable, "History is only kept for scalar variables");
            return false;
        }
        self.archive.create_record(variable, data_type)
    }

    /// Produces a fresh value for `variable`.
    pub fn read_value(&self, variable: &VariableId) -> Value {
        self.generator.generate(variable)
    }

    /// Number of monitored items.
    pub fn monitored_count(&self) -> usize {
        self.scheduler.monitored_count()
    }

    /// History entries for `variable`, oldest first.
    pub fn history(&self, variable: &VariableId) -> Option<Vec<HistoryEntry>> {
        self.archive.entries(variable)
    }

    /// The sampling scheduler.
    pub fn scheduler(&self) -> &SamplingScheduler {
        &self.scheduler
    }

    /// The history archive.
    pub fn archive(&self) -> &HistoryArchive {
        &self.archive
    }

    /// Releases both timers.
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
        self.archive.shutdown();
    }
}

impl std::fmt::Debug for DataSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSystem")
            .field("scheduler", &self.scheduler)
            .field("archive", &self.archive)
            .finish()
    }
}

// =============================================================================
// DataSystemBuilder
// =============================================================================

/// Builder for [`DataSystem`].
#[derive(Default)]
pub struct DataSystemBuilder {
    generator: Option<Arc<dyn ValueGenerator>>,
    sink: Option<Arc<dyn NotificationSink>>,
    scheduler_config: SchedulerConfig,
    history_config: HistoryConfig,
}

impl DataSystemBuilder {
    /// Sets the value generator. Defaults to an empty strategy table.
    pub fn generator(mut self, generator: Arc<dyn ValueGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Sets the notification sink. Defaults to [`TracingSink`].
    pub fn sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Sets the scheduler configuration.
    pub fn scheduler_config(mut self, config: SchedulerConfig) -> Self {
        self.scheduler_config = config;
        self
    }

    /// Sets the history configuration.
    pub fn history_config(mut self, config: HistoryConfig) -> Self {
        self.history_config = config;
        self
    }

    /// Builds the system on the current tokio runtime.
    pub fn build(self) -> BinResult<DataSystem> {
        let generator = self
            .generator
            .unwrap_or_else(|| Arc::new(StrategyTable::new()));
        let sink = self.sink.unwrap_or_else(|| Arc::new(TracingSink::new()));

        let scheduler =
            SamplingScheduler::with_config(generator.clone(), sink, self.scheduler_config)?;
        let archive = HistoryArchive::with_config(self.history_config)?;

        Ok(DataSystem {
            generator,
            scheduler,
            archive,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
