// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Archive configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default period of the archive timer.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(10);

/// Default per-record entry cap.
pub const DEFAULT_MAX_ENTRIES: usize = 2000;

/// Default number of entries written when a record is created.
pub const DEFAULT_BACKFILL_COUNT: usize = 1001;

/// Default spacing between backfilled entries.
pub const DEFAULT_BACKFILL_SPACING: Duration = Duration::from_secs(10);

/// Default offset of the source timestamp from the server timestamp.
pub const DEFAULT_SOURCE_OFFSET: Duration = Duration::from_millis(1234);

/// Configuration for a [`HistoryArchive`](crate::HistoryArchive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// How often every historizing record gains an entry.
    #[serde(with = "duration_millis")]
    pub tick_period: Duration,

    /// Entry cap per record. Records at the cap stop growing.
    pub max_entries: usize,

    /// Entries written when a record is created.
    pub backfill_count: usize,

    /// Server timestamp spacing between backfilled entries.
    #[serde(with = "duration_secs")]
    pub backfill_spacing: Duration,

    /// Source timestamp minus server timestamp.
    #[serde(with = "duration_millis")]
    pub source_offset: Duration,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            tick_period: DEFAULT_TICK_PERIOD,
            max_entries: DEFAULT_MAX_ENTRIES,
            backfill_count: DEFAULT_BACKFILL_COUNT,
            backfill_spacing: DEFAULT_BACKFILL_SPACING,
            source_offset: DEFAULT_SOURCE_OFFSET,
        }
    }
}

impl HistoryConfig {
    /// Creates a configuration builder.
    pub fn builder() -> HistoryConfigBuilder {
        HistoryConfigBuilder::default()
    }

    /// Creates a small, fast configuration for testing.
    pub fn for_testing() -> Self {
        Self {
            tick_period: Duration::from_millis(100),
            max_entries: 20,
            backfill_count: 11,
            backfill_spacing: Duration::from_secs(10),
            source_offset: DEFAULT_SOURCE_OFFSET,
        }
    }

    /// Number of entries a new record starts with.
    pub fn initial_len(&self) -> usize {
        self.backfill_count.min(self.max_entries)
    }
}

/// Builder for [`HistoryConfig`].
#[derive(Debug, Default)]
pub struct HistoryConfigBuilder {
    config: HistoryConfig,
}

impl HistoryConfigBuilder {
    /// Sets the timer period.
    pub fn tick_period(mut self, period: Duration) -> Self {
        self.config.tick_period = period;
        self
    }

    /// Sets the per-record cap.
    pub fn max_entries(mut self, max: usize) -> Self {
        self.config.max_entries = max;
        self
    }

    /// Sets the backfill count.
    pub fn backfill_count(mut self, count: usize) -> Self {
        self.config.backfill_count = count;
        self
    }

    /// Sets the backfill spacing.
    pub fn backfill_spacing(mut self, spacing: Duration) -> Self {
        self.config.backfill_spacing = spacing;
        self
    }

    /// Sets the source timestamp offset.
    pub fn source_offset(mut self, offset: Duration) -> Self {
        self.config.source_offset = offset;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> HistoryConfig {
        self.config
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HistoryConfig::default();
        assert_eq!(config.tick_period, Duration::from_secs(10));
        assert_eq!(config.max_entries, 2000);
        assert_eq!(config.backfill_count, 1001);
        assert_eq!(config.initial_len(), 1001);
        assert_eq!(config.source_offset, Duration::from_millis(1234));
    }

    #[test]
    fn test_backfill_capped_by_max() {
        let config = HistoryConfig::builder()
            .max_entries(5)
            .backfill_count(10)
            .build();
        assert_eq!(config.initial_len(), 5);
    }

    #[test]
    fn test_serde_units() {
        let json = serde_json::to_value(HistoryConfig::default()).unwrap();
        assert_eq!(json["tick_period"], 10_000);
        assert_eq!(json["backfill_spacing"], 10);
        assert_eq!(json["source_offset"], 1234);

        let parsed: HistoryConfig = serde_json::from_str(r#"{"max_entries": 50}"#).unwrap();
        assert_eq!(parsed.max_entries, 50);
        assert_eq!(parsed.tick_period, DEFAULT_TICK_PERIOD);
    }
}
