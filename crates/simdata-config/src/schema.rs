// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema for simdata.
//!
//! ```yaml
//! simulator:
//!   name: demo
//! sampling:
//!   min_period_ms: 100
//! history:
//!   enabled: true
//!   tick_period_ms: 10000
//! variables:
//!   - id: "ns=2;s=Scalar.Int32"
//!     data_type: int32
//!     historize: true
//!   - id: "ns=2;s=Analog.Double"
//!     data_type: double
//!     range: { low: -10.0, high: 10.0 }
//! monitors:
//!   - handle: 1
//!     variable: "ns=2;s=Scalar.Int32"
//!     interval_ms: 250
//! logging:
//!   level: info
//!   format: text
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use simdata_core::generator::GeneratorStrategy;
use simdata_core::types::{DataType, ValueRank};

use crate::error::{ConfigError, ConfigResult};

/// Default floor for the sampling timer.
pub const DEFAULT_MIN_PERIOD_MS: u64 = 100;

/// Default archive timer period.
pub const DEFAULT_HISTORY_TICK_MS: u64 = 10_000;

/// Default per-record entry cap.
pub const DEFAULT_HISTORY_MAX_ENTRIES: usize = 2000;

/// Default backfill size.
pub const DEFAULT_HISTORY_BACKFILL: usize = 1001;

/// Default array length for array variables without one.
pub const DEFAULT_ARRAY_LENGTH: usize = 10;

/// Largest accepted per-record cap.
pub const MAX_HISTORY_ENTRIES: usize = 1_000_000;

/// Largest accepted backfill span (`backfill_count * backfill_spacing_secs`), 100 years.
pub const MAX_BACKFILL_SPAN_SECS: u64 = 100 * 365 * 24 * 60 * 60;

// =============================================================================
// SimConfig
// =============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    /// Simulator identity.
    #[serde(default)]
    pub simulator: SimulatorConfig,

    /// Sampling scheduler settings.
    #[serde(default)]
    pub sampling: SamplingSettings,

    /// History archive settings.
    #[serde(default)]
    pub history: HistorySettings,

    /// Variables the generator knows about.
    #[serde(default)]
    pub variables: Vec<VariableConfig>,

    /// Monitored items started at launch.
    #[serde(default)]
    pub monitors: Vec<MonitorConfig>,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimConfig {
    /// Validates the whole configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.simulator.validate()?;
        self.sampling.validate()?;
        self.history.validate()?;

        let mut ids = HashSet::new();
        for variable in &self.variables {
            if !ids.insert(variable.id.as_str()) {
                return Err(ConfigError::duplicate_variable_id(&variable.id));
            }
            variable.validate()?;
        }

        let mut handles = HashSet::new();
        for monitor in &self.monitors {
            if !handles.insert(monitor.handle) {
                return Err(ConfigError::duplicate_monitor_handle(monitor.handle));
            }
            if !ids.contains(monitor.variable.as_str()) {
                return Err(ConfigError::unknown_variable(monitor.handle, &monitor.variable));
            }
        }

        self.logging.validate()?;
        Ok(())
    }

    /// Looks up a variable by id.
    pub fn variable(&self, id: &str) -> Option<&VariableConfig> {
        self.variables.iter().find(|v| v.id == id)
    }

    /// Variables marked for history.
    pub fn historized_variables(&self) -> impl Iterator<Item = &VariableConfig> {
        self.variables.iter().filter(|v| v.historize)
    }
}

// =============================================================================
// Simulator
// =============================================================================

/// Simulator identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulatorConfig {
    /// Human readable name.
    #[serde(default = "default_simulator_name")]
    pub name: String,

    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

fn default_simulator_name() -> String {
    "simdata".to_string()
}

impl SimulatorConfig {
    /// Validates the simulator section.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::validation("simulator.name", "cannot be empty"));
        }
        if self.name.len() > 64 {
            return Err(ConfigError::validation(
                "simulator.name",
                "cannot exceed 64 characters",
            ));
        }
        Ok(())
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            name: default_simulator_name(),
            description: None,
        }
    }
}

// =============================================================================
// Sampling
// =============================================================================

/// Sampling scheduler settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SamplingSettings {
    /// Floor for the shared timer period, in milliseconds.
    #[serde(default = "default_min_period_ms")]
    pub min_period_ms: u64,
}

fn default_min_period_ms() -> u64 {
    DEFAULT_MIN_PERIOD_MS
}

impl SamplingSettings {
    /// Validates the sampling section.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.min_period_ms == 0 {
            return Err(ConfigError::validation(
                "sampling.min_period_ms",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            min_period_ms: DEFAULT_MIN_PERIOD_MS,
        }
    }
}

// =============================================================================
// History
// =============================================================================

/// History archive settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistorySettings {
    /// Whether `historize: true` variables get a record.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Archive timer period, in milliseconds.
    #[serde(default = "default_history_tick_ms")]
    pub tick_period_ms: u64,

    /// Entry cap per record.
    #[serde(default = "default_history_max_entries")]
    pub max_entries: usize,

    /// Entries written at record creation.
    #[serde(default = "default_history_backfill")]
    pub backfill_count: usize,

    /// Spacing between backfilled entries, in seconds.
    #[serde(default = "default_backfill_spacing_secs")]
    pub backfill_spacing_secs: u64,

    /// Source timestamp offset, in milliseconds.
    #[serde(default = "default_source_offset_ms")]
    pub source_offset_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_history_tick_ms() -> u64 {
    DEFAULT_HISTORY_TICK_MS
}

fn default_history_max_entries() -> usize {
    DEFAULT_HISTORY_MAX_ENTRIES
}

fn default_history_backfill() -> usize {
    DEFAULT_HISTORY_BACKFILL
}

fn default_backfill_spacing_secs() -> u64 {
    10
}

fn default_source_offset_ms() -> u64 {
    1234
}

impl HistorySettings {
    /// Validates the history section.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.tick_period_ms == 0 {
            return Err(ConfigError::validation(
                "history.tick_period_ms",
                "must be greater than zero",
            ));
        }
        if self.max_entries == 0 || self.max_entries > MAX_HISTORY_ENTRIES {
            return Err(ConfigError::out_of_range(
                "history.max_entries",
                self.max_entries,
                1,
                MAX_HISTORY_ENTRIES,
            ));
        }
        if self.backfill_count == 0 || self.backfill_count > self.max_entries {
            return Err(ConfigError::out_of_range(
                "history.backfill_count",
                self.backfill_count,
                1,
                self.max_entries,
            ));
        }
        if self.backfill_spacing_secs == 0 {
            return Err(ConfigError::validation(
                "history.backfill_spacing_secs",
                "must be greater than zero",
            ));
        }
        let span = (self.backfill_count as u64).checked_mul(self.backfill_spacing_secs);
        if span.map_or(true, |span| span > MAX_BACKFILL_SPAN_SECS) {
            return Err(ConfigError::out_of_range(
                "history.backfill_spacing_secs",
                self.backfill_spacing_secs,
                1,
                MAX_BACKFILL_SPAN_SECS / self.backfill_count as u64,
            ));
        }
        Ok(())
    }
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_period_ms: DEFAULT_HISTORY_TICK_MS,
            max_entries: DEFAULT_HISTORY_MAX_ENTRIES,
            backfill_count: DEFAULT_HISTORY_BACKFILL,
            backfill_spacing_secs: default_backfill_spacing_secs(),
            source_offset_ms: default_source_offset_ms(),
        }
    }
}

// =============================================================================
// Variables
// =============================================================================

/// A variable the generator produces values for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariableConfig {
    /// Node id, e.g. `ns=2;s=Scalar.Int32`.
    pub id: String,

    /// Value type.
    pub data_type: DataType,

    /// Scalar or array.
    #[serde(default)]
    pub value_rank: ValueRank,

    /// Array length, arrays only.
    #[serde(default)]
    pub array_length: Option<usize>,

    /// Inclusive bounds for numeric scalars.
    #[serde(default)]
    pub range: Option<RangeConfig>,

    /// Whether to keep a history record for this variable.
    #[serde(default)]
    pub historize: bool,
}

/// Inclusive numeric bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RangeConfig {
    /// Lower bound.
    pub low: f64,
    /// Upper bound.
    pub high: f64,
}

impl VariableConfig {
    /// Validates one variable.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::validation("variables.id", "cannot be empty"));
        }

        let field = |name: &str| format!("variables.{}.{}", self.id, name);

        match self.value_rank {
            ValueRank::Scalar => {
                if self.array_length.is_some() {
                    return Err(ConfigError::validation(
                        field("array_length"),
                        "only valid for arrays",
                    ));
                }
            }
            ValueRank::Array => {
                if self.array_length == Some(0) {
                    return Err(ConfigError::validation(
                        field("array_length"),
                        "must be greater than zero",
                    ));
                }
                if self.range.is_some() {
                    return Err(ConfigError::validation(field("range"), "not valid for arrays"));
                }
            }
        }

        if let Some(range) = self.range {
            if !self.data_type.is_numeric() {
                return Err(ConfigError::validation(
                    field("range"),
                    format!("not valid for {}", self.data_type),
                ));
            }
            if !range.low.is_finite() || !range.high.is_finite() || range.low > range.high {
                return Err(ConfigError::validation(
                    field("range"),
                    "low and high must be finite with low <= high",
                ));
            }
        }

        Ok(())
    }

    /// Generator strategy for this variable.
    pub fn strategy(&self) -> GeneratorStrategy {
        match (self.value_rank, self.range) {
            (ValueRank::Array, _) => GeneratorStrategy::Array {
                data_type: self.data_type,
                length: self.array_length.unwrap_or(DEFAULT_ARRAY_LENGTH),
            },
            (ValueRank::Scalar, Some(range)) => GeneratorStrategy::Analog {
                data_type: self.data_type,
                low: range.low,
                high: range.high,
            },
            (ValueRank::Scalar, None) => GeneratorStrategy::Scalar {
                data_type: self.data_type,
            },
        }
    }
}

// =============================================================================
// Monitors
// =============================================================================

/// A monitored item started at launch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
    /// Subscription handle.
    pub handle: u32,

    /// Variable id to sample.
    pub variable: String,

    /// Requested sampling interval, in milliseconds.
    pub interval_ms: u64,
}

// =============================================================================
// Logging
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include span targets in logs.
    #[serde(default = "default_true")]
    pub with_target: bool,

    /// Include file/line in logs.
    #[serde(default)]
    pub with_file: bool,

    /// Include thread IDs in logs.
    #[serde(default)]
    pub with_thread_ids: bool,
}

impl LoggingConfig {
    /// Validates the logging configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            with_target: true,
            with_file: false,
            with_thread_ids: false,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the level as a filter directive.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable text.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
    /// Compact text.
    Compact,
}

impl LogFormat {
    /// Returns the format name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
            LogFormat::Compact => "compact",
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
