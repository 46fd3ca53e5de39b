// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Prebuilt variables, configurations and components.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tempfile::NamedTempFile;

use simdata_core::{
    DataType, MonitoredItemId, NotificationSink, StrategyTable, ValueGenerator, VariableId,
};
use simdata_history::{HistoryArchive, HistoryConfig};
use simdata_sampling::{SamplingScheduler, SchedulerConfig};

// =============================================================================
// Variables
// =============================================================================

/// Variable ids used across the suites.
pub struct VariableFixtures;

impl VariableFixtures {
    /// An Int32 scalar.
    pub fn int32() -> VariableId {
        VariableId::new("ns=2;s=Scalar.Int32")
    }

    /// A Double scalar.
    pub fn double() -> VariableId {
        VariableId::new("ns=2;s=Scalar.Double")
    }

    /// A Boolean scalar.
    pub fn boolean() -> VariableId {
        VariableId::new("ns=2;s=Scalar.Boolean")
    }

    /// A Byte array.
    pub fn byte_array() -> VariableId {
        VariableId::new("ns=2;s=Array.Byte")
    }

    /// `count` distinct variable ids.
    pub fn batch(count: usize) -> Vec<VariableId> {
        (0..count)
            .map(|i| VariableId::new(format!("ns=2;s=Batch.{:03}", i)))
            .collect()
    }

    /// Monitored item handle `n`.
    pub fn handle(n: u32) -> MonitoredItemId {
        MonitoredItemId::new(n)
    }

    /// Generator table covering the variables above.
    pub fn table() -> StrategyTable {
        StrategyTable::builder()
            .scalar(Self::int32(), DataType::Int32)
            .analog(Self::double(), DataType::Double, -10.0, 10.0)
            .scalar(Self::boolean(), DataType::Boolean)
            .array(Self::byte_array(), DataType::Byte, 8)
            .build()
    }
}

// =============================================================================
// Components
// =============================================================================

/// Prebuilt engine components.
pub struct ComponentFixtures;

impl ComponentFixtures {
    /// A scheduler with the default floor on the current runtime.
    pub fn scheduler(
        generator: Arc<dyn ValueGenerator>,
        sink: Arc<dyn NotificationSink>,
    ) -> SamplingScheduler {
        SamplingScheduler::with_config(generator, sink, SchedulerConfig::default())
            .expect("tokio runtime")
    }

    /// An archive with production settings on the current runtime.
    pub fn archive() -> HistoryArchive {
        HistoryArchive::new().expect("tokio runtime")
    }

    /// An archive with small limits on the current runtime.
    pub fn small_archive() -> HistoryArchive {
        HistoryArchive::with_config(HistoryFixtures::small()).expect("tokio runtime")
    }
}

// =============================================================================
// History
// =============================================================================

/// History configurations.
pub struct HistoryFixtures;

impl HistoryFixtures {
    /// Production defaults: 1001 backfilled entries, cap 2000, 10 s timer.
    pub fn production() -> HistoryConfig {
        HistoryConfig::default()
    }

    /// 11 backfilled entries, cap 20, 100 ms timer.
    pub fn small() -> HistoryConfig {
        HistoryConfig::for_testing()
    }

    /// Production limits with a custom timer period.
    pub fn with_tick(period: Duration) -> HistoryConfig {
        HistoryConfig::builder().tick_period(period).build()
    }
}

// =============================================================================
// Configuration Files
// =============================================================================

/// Configuration documents.
pub struct ConfigFixtures;

impl ConfigFixtures {
    /// A complete YAML configuration.
    pub const YAML: &'static str = r#"
simulator:
  name: integration
  description: integration test configuration

sampling:
  min_period_ms: 100

history:
  enabled: true
  tick_period_ms: 1000
  max_entries: 30
  backfill_count: 21

variables:
  - id: "ns=2;s=Scalar.Int32"
    data_type: int32
    historize: true
  - id: "ns=2;s=Scalar.Double"
    data_type: double
    range: { low: -10, high: 10 }
  - id: "ns=2;s=Array.Byte"
    data_type: byte
    value_rank: array
    array_length: 8
    historize: true

monitors:
  - handle: 1
    variable: "ns=2;s=Scalar.Int32"
    interval_ms: 500
  - handle: 2
    variable: "ns=2;s=Scalar.Double"
    interval_ms: 200

logging:
  level: debug
  format: compact
"#;

    /// Writes `content` to a temp file with `suffix`.
    pub fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(suffix).expect("temp file");
        file.write_all(content.as_bytes()).expect("write temp file");
        file
    }

    /// [`Self::YAML`] written to a temp file.
    pub fn yaml_file() -> NamedTempFile {
        Self::temp_file(".yaml", Self::YAML)
    }
}
