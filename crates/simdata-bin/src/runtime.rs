// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Simulator runtime orchestration.
//!
//! - Configuration loading and validation
//! - Generator table, scheduler and archive construction
//! - History enablement and monitor start-up
//! - Graceful shutdown coordination

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use simdata_config::{load_config, HistorySettings, SamplingSettings, SimConfig, VariableConfig};
use simdata_core::{
    ChannelSink, MonitoredItemId, NotificationSink, StrategyTable, TracingSink, VariableId,
};
use simdata_history::HistoryConfig;
use simdata_sampling::SchedulerConfig;

use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;
use crate::system::DataSystem;

/// Capacity of the channel feeding `--print-samples`.
const PRINT_CHANNEL_CAPACITY: usize = 1024;

// =============================================================================
// RunOptions
// =============================================================================

/// Per-run switches from the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Stop after this long instead of waiting for a signal.
    pub duration: Option<Duration>,
    /// Print samples to stdout.
    pub print_samples: bool,
    /// Skip history record creation.
    pub no_history: bool,
}

// =============================================================================
// SimRuntime
// =============================================================================

/// One simulator run.
#[derive(Debug)]
pub struct SimRuntime {
    config: Arc<SimConfig>,
    shutdown: ShutdownCoordinator,
    options: RunOptions,
}

impl SimRuntime {
    /// Creates a runtime for a validated configuration.
    pub fn new(config: SimConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: ShutdownCoordinator::new(),
            options: RunOptions::default(),
        }
    }

    /// Sets the run options.
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// The loaded configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// A handle that can stop this run.
    pub fn shutdown_handle(&self) -> ShutdownCoordinator {
        self.shutdown.clone()
    }

    /// Runs until shutdown.
    pub async fn run(self) -> BinResult<()> {
        info!(
            name = %self.config.simulator.name,
            version = simdata_core::VERSION,
            "Starting simulator"
        );

        let (sink, printer) = self.create_sink();
        let system = self.initialize_system(sink)?;

        let timer = self.options.duration.map(|duration| {
            let shutdown = self.shutdown.clone();
            tokio::spawn(async move {
                tokio::time::sleep(duration).await;
                info!(seconds = duration.as_secs_f64(), "Run duration elapsed");
                shutdown.initiate_shutdown();
            })
        });

        info!(
            monitored = system.monitored_count(),
            records = system.archive().record_count(),
            period_ms = system.scheduler().effective_period().map(|p| p.as_millis() as u64),
            "Simulator is ready"
        );

        self.shutdown.wait_for_shutdown().await;
        info!("Shutdown initiated, cleaning up...");

        if let Some(timer) = timer {
            timer.abort();
        }

        let sampling = system.scheduler().stats();
        let history = system.archive().stats();
        info!(
            ticks = sampling.ticks,
            samples = sampling.samples_dispatched,
            generator_failures = sampling.generator_failures,
            sink_failures = sampling.sink_failures,
            rearms = sampling.timer_rearms,
            "Sampling statistics"
        );
        info!(
            ticks = history.ticks,
            records = history.records_created,
            appended = history.entries_appended,
            failures = history.update_failures,
            "History statistics"
        );

        system.shutdown();
        drop(system);

        if let Some(printer) = printer {
            printer.abort();
        }

        info!("Simulator shutdown complete");
        Ok(())
    }

    fn create_sink(&self) -> (Arc<dyn NotificationSink>, Option<JoinHandle<()>>) {
        if !self.options.print_samples {
            return (Arc::new(TracingSink::new()), None);
        }

        let (sink, mut receiver) = ChannelSink::with_channel(PRINT_CHANNEL_CAPACITY);
        let printer = tokio::spawn(async move {
            while let Some(sample) = receiver.recv().await {
                println!("{}", sample);
            }
        });
        (Arc::new(sink), Some(printer))
    }

    fn initialize_system(&self, sink: Arc<dyn NotificationSink>) -> BinResult<DataSystem> {
        let system = DataSystem::builder()
            .generator(Arc::new(strategy_table(&self.config.variables)))
            .sink(sink)
            .scheduler_config(scheduler_config(&self.config.sampling))
            .history_config(history_config(&self.config.history))
            .build()
            .map_err(|e| e.with_context("Failed to build data system"))?;

        if self.config.history.enabled && !self.options.no_history {
            for variable in self.config.historized_variables() {
                let created = system.enable_history_archiving(
                    VariableId::new(&variable.id),
                    variable.data_type,
                    variable.value_rank,
                );
                if created {
                    debug!(variable = %variable.id, "History enabled");
                } else {
                    warn!(variable = %variable.id, "History not enabled for non-scalar variable");
                }
            }
        } else {
            info!("History archiving disabled");
        }

        for monitor in &self.config.monitors {
            system.start_monitoring(
                MonitoredItemId::new(monitor.handle),
                Duration::from_millis(monitor.interval_ms),
                VariableId::new(&monitor.variable),
            );
        }

        Ok(system)
    }
}

// =============================================================================
// Config Conversions
// =============================================================================

/// Scheduler tuning from the `sampling` section.
pub fn scheduler_config(settings: &SamplingSettings) -> SchedulerConfig {
    SchedulerConfig::new(Duration::from_millis(settings.min_period_ms))
}

/// Archive tuning from the `history` section.
pub fn history_config(settings: &HistorySettings) -> HistoryConfig {
    HistoryConfig::builder()
        .tick_period(Duration::from_millis(settings.tick_period_ms))
        .max_entries(settings.max_entries)
        .backfill_count(settings.backfill_count)
        .backfill_spacing(Duration::from_secs(settings.backfill_spacing_secs))
        .source_offset(Duration::from_millis(settings.source_offset_ms))
        .build()
}

/// Generator table from the `variables` section.
pub fn strategy_table(variables: &[VariableConfig]) -> StrategyTable {
    variables
        .iter()
        .fold(StrategyTable::builder(), |builder, variable| {
            builder.insert(variable.id.as_str(), variable.strategy())
        })
        .build()
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for [`SimRuntime`].
#[derive(Default)]
pub struct RuntimeBuilder {
    config_path: Option<PathBuf>,
    config: Option<SimConfig>,
    options: RunOptions,
}

impl RuntimeBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the configuration from `path` at build time.
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Uses an already loaded configuration; wins over `config_path`.
    pub fn config(mut self, config: SimConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the run options.
    pub fn options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> BinResult<SimRuntime> {
        let config = match (self.config, self.config_path) {
            (Some(config), _) => {
                config.validate()?;
                config
            }
            (None, Some(path)) => load_config(&path).map_err(|e| {
                BinError::from(e).with_context(format!("Loading {}", path.display()))
            })?,
            (None, None) => return Err(BinError::config("No configuration provided")),
        };

        Ok(SimRuntime::new(config).with_options(self.options))
    }
}

// =============================================================================
// Tests
// =============================================================================
