// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! History records and their entries.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};

use simdata_core::error::HistoryError;
use simdata_core::types::{DataType, Value, VariableId};

use crate::config::HistoryConfig;

/// One archived value. Never changed after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The archived value.
    pub value: Value,

    /// When the server recorded the value.
    pub server_timestamp: DateTime<Utc>,

    /// Source timestamp, a fixed offset after the server timestamp.
    pub source_timestamp: DateTime<Utc>,

    /// Always `false`; archived values are never edited.
    pub is_modified: bool,
}

impl HistoryEntry {
    /// Creates an entry whose source timestamp is `server_timestamp + source_offset`.
    pub fn new(value: Value, server_timestamp: DateTime<Utc>, source_offset: ChronoDuration) -> Self {
        Self {
            value,
            server_timestamp,
            source_timestamp: server_timestamp + source_offset,
            is_modified: false,
        }
    }
}

/// The archive for one variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Variable this record belongs to.
    pub key: VariableId,

    /// Type of archived values.
    pub data_type: DataType,

    /// Whether the archive timer appends to this record.
    pub historizing: bool,

    entries: Vec<HistoryEntry>,
}

impl HistoryRecord {
    /// Creates a historizing record pre-filled with entries ending at `now`.
    ///
    /// Entries are `backfill_spacing` apart with strictly increasing server
    /// timestamps. `Int32` records count down from `len - 1` to `0`; other
    /// types hold null.
    ///
    /// Fails if the oldest timestamp cannot be represented.
    pub fn backfilled(
        key: VariableId,
        data_type: DataType,
        now: DateTime<Utc>,
        config: &HistoryConfig,
    ) -> Result<Self, HistoryError> {
        let count = config.initial_len();
        let spacing = to_chrono(config.backfill_spacing);
        let offset = to_chrono(config.source_offset);

        let entries = (0..count)
            .rev()
            .map(|steps_back| {
                let value = match data_type {
                    DataType::Int32 => Value::Int32(i32::try_from(steps_back).unwrap_or(i32::MAX)),
                    _ => Value::Null,
                };
                i32::try_from(steps_back)
                    .ok()
                    .and_then(|steps| spacing.checked_mul(steps))
                    .and_then(|back| now.checked_sub_signed(back))
                    .and_then(|server| server.checked_add_signed(offset).map(|_| server))
                    .map(|server| HistoryEntry::new(value, server, offset))
                    .ok_or_else(|| HistoryError::timestamp_out_of_range(key.as_str()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            key,
            data_type,
            historizing: true,
            entries,
        })
    }

    /// Archived entries, oldest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the record holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The newest entry.
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// Returns `true` if the timer should append to this record.
    pub fn accepts_entries(&self, max_entries: usize) -> bool {
        self.historizing && self.entries.len() < max_entries
    }

    /// Derives the value of the next entry from the newest one.
    pub fn next_value(&self) -> Result<Value, HistoryError> {
        match self.data_type {
            DataType::Int32 => {
                let last = self
                    .last()
                    .ok_or_else(|| HistoryError::empty_record(self.key.as_str()))?;
                match last.value {
                    Value::Int32(v) => v
                        .checked_add(1)
                        .map(Value::Int32)
                        .ok_or_else(|| HistoryError::value_overflow(self.key.as_str())),
                    ref other => Err(HistoryError::unexpected_value(
                        self.key.as_str(),
                        DataType::Int32.name(),
                        other.to_string(),
                    )),
                }
            }
            _ => Ok(Value::Null),
        }
    }

    /// Appends an entry stamped `now`.
    pub(crate) fn push(&mut self, value: Value, now: DateTime<Utc>, source_offset: ChronoDuration) {
        self.entries.push(HistoryEntry::new(value, now, source_offset));
    }
}

/// Converts a std duration, saturating values chrono cannot represent.
pub(crate) fn to_chrono(duration: std::time::Duration) -> ChronoDuration {
    ChronoDuration::from_std(duration).unwrap_or(ChronoDuration::MAX)
}
