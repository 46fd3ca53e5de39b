// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Bounded history archive.
//!
//! Records are created once per variable, pre-filled with a backfill window
//! and then grown by a single shared timer. A record stops growing at
//! `max_entries`; nothing is ever evicted.
//!
//! The archive tick performs no external calls, so it runs entirely under
//! the archive lock.

use std::collections::HashMap;
use std::fmt;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use simdata_core::error::HistoryError;
use simdata_core::timer::PeriodicTimer;
use simdata_core::types::{DataType, VariableId};

use crate::config::HistoryConfig;
use crate::record::{to_chrono, HistoryEntry, HistoryRecord};

// =============================================================================
// Statistics
// =============================================================================

#[derive(Debug, Default)]
struct ArchiveStats {
    ticks: AtomicU64,
    records_created: AtomicU64,
    entries_appended: AtomicU64,
    update_failures: AtomicU64,
}

impl ArchiveStats {
    fn snapshot(&self) -> ArchiveStatsSnapshot {
        ArchiveStatsSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            records_created: self.records_created.load(Ordering::Relaxed),
            entries_appended: self.entries_appended.load(Ordering::Relaxed),
            update_failures: self.update_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of archive counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveStatsSnapshot {
    /// Completed archive ticks.
    pub ticks: u64,
    /// Records created.
    pub records_created: u64,
    /// Entries appended by ticks.
    pub entries_appended: u64,
    /// Record updates that failed.
    pub update_failures: u64,
}

/// Outcome of one archive tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveTickSummary {
    /// Records that gained an entry.
    pub appended: usize,
    /// Records at the cap or not historizing.
    pub skipped: usize,
    /// Records whose update failed.
    pub failed: usize,
}

// =============================================================================
// Inner state
// =============================================================================

#[derive(Debug, Default)]
struct ArchiveShared {
    records: HashMap<VariableId, HistoryRecord>,
    timer: Option<PeriodicTimer>,
}

struct ArchiveInner {
    shared: Mutex<ArchiveShared>,
    config: HistoryConfig,
    runtime: Handle,
    stats: ArchiveStats,
}

impl ArchiveInner {
    fn ensure_timer(self: &Arc<Self>, shared: &mut ArchiveShared) {
        if shared.timer.is_some() {
            return;
        }

        let weak = Arc::downgrade(self);
        shared.timer = Some(PeriodicTimer::spawn_delayed(
            &self.runtime,
            "history",
            self.config.tick_period,
            move || match weak.upgrade() {
                Some(inner) => {
                    inner.tick();
                    ControlFlow::Continue(())
                }
                None => ControlFlow::Break(()),
            },
        ));
        info!(
            period_ms = self.config.tick_period.as_millis() as u64,
            "History archive timer started"
        );
    }

    fn tick(&self) -> ArchiveTickSummary {
        let now = Utc::now();
        let offset = to_chrono(self.config.source_offset);
        let max_entries = self.config.max_entries;
        let mut summary = ArchiveTickSummary::default();

        let mut shared = self.shared.lock();
        for record in shared.records.values_mut() {
            if !record.accepts_entries(max_entries) {
                summary.skipped += 1;
                continue;
            }

            match record.next_value() {
                Ok(value) => {
                    record.push(value, now, offset);
                    summary.appended += 1;
                    if record.len() == max_entries {
                        debug!(key = %record.key, "History record reached its cap");
                    }
                }
                Err(e) => {
                    warn!(key = %record.key, error = %e, "History record update failed");
                    summary.failed += 1;
                }
            }
        }
        drop(shared);

        self.stats.ticks.fetch_add(1, Ordering::Relaxed);
        self.stats
            .entries_appended
            .fetch_add(summary.appended as u64, Ordering::Relaxed);
        self.stats
            .update_failures
            .fetch_add(summary.failed as u64, Ordering::Relaxed);
        summary
    }
}

// =============================================================================
// HistoryArchive
// =============================================================================

/// Bounded per-variable history with a shared growth timer.
///
/// Dropping the archive releases its timer.
pub struct HistoryArchive {
    inner: Arc<ArchiveInner>,
}

impl HistoryArchive {
    /// Creates an archive with default settings on the current runtime.
    pub fn new() -> Result<Self, HistoryError> {
        Self::with_config(HistoryConfig::default())
    }

    /// Creates an archive on the current runtime.
    pub fn with_config(config: HistoryConfig) -> Result<Self, HistoryError> {
        let runtime = Handle::try_current().map_err(|e| HistoryError::no_runtime(e.to_string()))?;
        Ok(Self::with_runtime(config, runtime))
    }

    /// Creates an archive whose timer runs on `runtime`.
    pub fn with_runtime(config: HistoryConfig, runtime: Handle) -> Self {
        debug!(
            max_entries = config.max_entries,
            backfill = config.backfill_count,
            "History archive created"
        );
        Self {
            inner: Arc::new(ArchiveInner {
                shared: Mutex::new(ArchiveShared::default()),
                config,
                runtime,
                stats: ArchiveStats::default(),
            }),
        }
    }

    /// Archive settings.
    pub fn config(&self) -> &HistoryConfig {
        &self.inner.config
    }

    /// Creates a backfilled, historizing record for `key`.
    ///
    /// Returns `false` and changes nothing if the record already exists or
    /// its backfill cannot be built.
    /// The first record starts the archive timer.
    pub fn create_record(&self, key: VariableId, data_type: DataType) -> bool {
        let mut shared = self.inner.shared.lock();
        if shared.records.contains_key(&key) {
            debug!(key = %key, "History record already exists");
            return false;
        }

        let record = match HistoryRecord::backfilled(
            key.clone(),
            data_type,
            Utc::now(),
            &self.inner.config,
        ) {
            Ok(record) => record,
            Err(e) => {
                warn!(key = %key, error = %e, "History record not created");
                return false;
            }
        };
        debug!(key = %key, data_type = %data_type, entries = record.len(), "History record created");
        shared.records.insert(key, record);
        self.inner.stats.records_created.fetch_add(1, Ordering::Relaxed);

        self.inner.ensure_timer(&mut shared);
        true
    }

    /// Turns timer growth on or off for a record. Returns `false` if unknown.
    pub fn set_historizing(&self, key: &VariableId, historizing: bool) -> bool {
        let mut shared = self.inner.shared.lock();
        match shared.records.get_mut(key) {
            Some(record) => {
                record.historizing = historizing;
                debug!(key = %key, historizing, "History record updated");
                true
            }
            None => false,
        }
    }

    /// Copy of a record's entries, oldest first.
    pub fn entries(&self, key: &VariableId) -> Option<Vec<HistoryEntry>> {
        self.inner
            .shared
            .lock()
            .records
            .get(key)
            .map(|r| r.entries().to_vec())
    }

    /// Copy of a whole record.
    pub fn record(&self, key: &VariableId) -> Option<HistoryRecord> {
        self.inner.shared.lock().records.get(key).cloned()
    }

    /// Number of entries in a record.
    pub fn len(&self, key: &VariableId) -> Option<usize> {
        self.inner.shared.lock().records.get(key).map(HistoryRecord::len)
    }

    /// Returns `true` if the record exists and is historizing.
    pub fn is_historizing(&self, key: &VariableId) -> bool {
        self.inner
            .shared
            .lock()
            .records
            .get(key)
            .is_some_and(|r| r.historizing)
    }

    /// Returns `true` if a record exists for `key`.
    pub fn contains(&self, key: &VariableId) -> bool {
        self.inner.shared.lock().records.contains_key(key)
    }

    /// Number of records.
    pub fn record_count(&self) -> usize {
        self.inner.shared.lock().records.len()
    }

    /// Returns `true` while the archive timer exists.
    pub fn is_running(&self) -> bool {
        self.inner.shared.lock().timer.is_some()
    }

    /// Runs one growth pass immediately.
    pub fn tick(&self) -> ArchiveTickSummary {
        self.inner.tick()
    }

    /// Counter snapshot.
    pub fn stats(&self) -> ArchiveStatsSnapshot {
        self.inner.stats.snapshot()
    }

    /// Releases the timer and drops every record.
    pub fn shutdown(&self) {
        let mut shared = self.inner.shared.lock();
        let had_timer = shared.timer.take().is_some();
        let count = shared.records.len();
        shared.records.clear();
        if had_timer || count > 0 {
            info!(records = count, "History archive shut down");
        }
    }
}

impl Drop for HistoryArchive {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for HistoryArchive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.inner.shared.lock();
        f.debug_struct("HistoryArchive")
            .field("records", &shared.records.len())
            .field("running", &shared.timer.is_some())
            .field("config", &self.inner.config)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use simdata_core::types::Value;
    use std::time::Duration;

    fn key(name: &str) -> VariableId {
        VariableId::new(name)
    }

    fn last_value(archive: &HistoryArchive, k: &VariableId) -> Value {
        archive.entries(k).unwrap().last().unwrap().value.clone()
    }

    #[test]
    fn test_new_without_runtime_fails() {
        assert!(matches!(
            HistoryArchive::new(),
            Err(HistoryError::NoRuntime { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_backfills_and_starts_timer() {
        let archive = HistoryArchive::new().unwrap();
        assert!(!archive.is_running());

        assert!(archive.create_record(key("x"), DataType::Int32));
        assert_eq!(archive.len(&key("x")), Some(1001));
        assert!(archive.is_historizing(&key("x")));
        assert!(archive.is_running());
        assert_eq!(archive.stats().records_created, 1);
    }

    #[tokio::test]
    async fn test_second_create_is_noop() {
        let archive = HistoryArchive::new().unwrap();
        archive.create_record(key("x"), DataType::Int32);
        archive.tick();
        let before = archive.record(&key("x")).unwrap();

        assert!(!archive.create_record(key("x"), DataType::Double));

        assert_eq!(archive.record(&key("x")).unwrap(), before);
        assert_eq!(archive.record_count(), 1);
    }

    #[tokio::test]
    async fn test_tick_increments_int32() {
        let archive = HistoryArchive::new().unwrap();
        archive.create_record(key("x"), DataType::Int32);
        assert_eq!(last_value(&archive, &key("x")), Value::Int32(0));

        let summary = archive.tick();

        assert_eq!(summary.appended, 1);
        assert_eq!(archive.len(&key("x")), Some(1002));
        assert_eq!(last_value(&archive, &key("x")), Value::Int32(1));
    }

    #[tokio::test]
    async fn test_non_int_tick_appends_null() {
        let archive = HistoryArchive::new().unwrap();
        archive.create_record(key("d"), DataType::Double);
        archive.tick();

        assert_eq!(archive.len(&key("d")), Some(1002));
        assert!(last_value(&archive, &key("d")).is_null());
    }

    #[tokio::test]
    async fn test_cap_holds_and_historizing_unchanged() {
        let archive = HistoryArchive::new().unwrap();
        archive.create_record(key("x"), DataType::Int32);

        for _ in 0..999 {
            archive.tick();
        }
        assert_eq!(archive.len(&key("x")), Some(2000));

        for _ in 0..5 {
            let summary = archive.tick();
            assert_eq!(summary.skipped, 1);
        }
        assert_eq!(archive.len(&key("x")), Some(2000));
        assert!(archive.is_historizing(&key("x")));
        assert_eq!(last_value(&archive, &key("x")), Value::Int32(999));
    }

    #[tokio::test]
    async fn test_not_historizing_is_skipped() {
        let archive = HistoryArchive::new().unwrap();
        archive.create_record(key("a"), DataType::Int32);
        archive.create_record(key("b"), DataType::Int32);

        assert!(archive.set_historizing(&key("a"), false));
        assert!(!archive.set_historizing(&key("missing"), false));

        let summary = archive.tick();
        assert_eq!(summary.appended, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(archive.len(&key("a")), Some(1001));
        assert_eq!(archive.len(&key("b")), Some(1002));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_grows_records() {
        let archive = HistoryArchive::with_config(HistoryConfig::for_testing()).unwrap();
        archive.create_record(key("x"), DataType::Int32);
        assert_eq!(archive.len(&key("x")), Some(11));

        // Ticks at 100, 200, 300.
        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(archive.len(&key("x")), Some(14));
        assert_eq!(archive.stats().ticks, 3);

        // Cap is 20.
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(archive.len(&key("x")), Some(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_releases_timer() {
        let archive = HistoryArchive::with_config(HistoryConfig::for_testing()).unwrap();
        archive.create_record(key("x"), DataType::Int32);

        archive.shutdown();

        assert!(!archive.is_running());
        assert_eq!(archive.record_count(), 0);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(archive.stats().ticks, 0);
    }

    #[tokio::test]
    async fn test_create_with_unrepresentable_backfill_is_refused() {
        let config = HistoryConfig::builder()
            .backfill_spacing(Duration::from_secs(10_000_000_000))
            .build();
        let archive = HistoryArchive::with_config(config).unwrap();

        assert!(!archive.create_record(key("x"), DataType::Int32));

        assert_eq!(archive.record_count(), 0);
        assert!(!archive.is_running());
        assert_eq!(archive.stats().records_created, 0);
        assert_eq!(archive.tick().appended, 0);
    }
}
