// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Unified error hierarchy for simdata.
//!
//! # Error Hierarchy
//!
//! ```text
//! SimError (root)
//! ├── SamplingError   - Scheduler construction and per-entry tick failures
//! ├── HistoryError    - Per-record archive update failures
//! └── SinkError       - Notification sink failures
//! ```
//!
//! None of these errors is fatal to a timer. Tick handlers log them and move
//! on to the next entry or record.
//!
//! # Examples
//!
//! ```
//! use simdata_core::error::{SimError, SinkError};
//!
//! let error = SinkError::rejected("ns=2;s=A", "node is read-only");
//! assert!(error.is_transient());
//!
//! let sim_error: SimError = error.into();
//! assert_eq!(sim_error.error_type(), "sink");
//! ```

use thiserror::Error;

/// Result alias used across simdata crates.
pub type SimResult<T> = Result<T, SimError>;

// =============================================================================
// SimError - Root Error Type
// =============================================================================

/// The root error type for simdata.
#[derive(Debug, Error)]
pub enum SimError {
    /// Sampling scheduler error.
    #[error("Sampling error: {0}")]
    Sampling(#[from] SamplingError),

    /// History archive error.
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    /// Notification sink error.
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),
}

impl SimError {
    /// Returns the error type as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            SimError::Sampling(_) => "sampling",
            SimError::History(_) => "history",
            SimError::Sink(_) => "sink",
        }
    }

    /// Returns `true` if the failure only affects a single entry or record.
    pub fn is_transient(&self) -> bool {
        match self {
            SimError::Sampling(e) => e.is_transient(),
            SimError::History(e) => e.is_transient(),
            SimError::Sink(e) => e.is_transient(),
        }
    }
}

// =============================================================================
// SamplingError
// =============================================================================

/// Errors raised by the sampling scheduler.
#[derive(Debug, Error)]
pub enum SamplingError {
    /// No tokio runtime was available to host the shared timer.
    #[error("No tokio runtime available: {message}")]
    NoRuntime {
        /// Error message.
        message: String,
    },

    /// The value generator panicked for a variable.
    #[error("Value generation failed for '{variable}': {message}")]
    GeneratorPanicked {
        /// The variable being sampled.
        variable: String,
        /// Panic payload, if it was a string.
        message: String,
    },
}

impl SamplingError {
    /// Creates a no-runtime error.
    pub fn no_runtime(message: impl Into<String>) -> Self {
        Self::NoRuntime {
            message: message.into(),
        }
    }

    /// Creates a generator failure error.
    pub fn generator_panicked(variable: impl Into<String>, message: impl Into<String>) -> Self {
        Self::GeneratorPanicked {
            variable: variable.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this error only affects one entry of one tick.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::GeneratorPanicked { .. })
    }
}

// =============================================================================
// HistoryError
// =============================================================================

/// Errors raised while updating a history record.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Incrementing the last value would overflow its type.
    #[error("Value overflow in history record '{key}'")]
    ValueOverflow {
        /// The record key.
        key: String,
    },

    /// The last entry does not hold the value type the record was created with.
    #[error("Unexpected value in history record '{key}': expected {expected}, found {found}")]
    UnexpectedValue {
        /// The record key.
        key: String,
        /// Expected type name.
        expected: String,
        /// Found value.
        found: String,
    },

    /// The record has no entries to derive the next one from.
    #[error("History record '{key}' is empty")]
    EmptyRecord {
        /// The record key.
        key: String,
    },

    /// A backfilled timestamp falls outside the representable range.
    #[error("Backfill timestamps out of range for history record '{key}'")]
    TimestampOutOfRange {
        /// The record key.
        key: String,
    },

    /// No tokio runtime was available to host the archive timer.
    #[error("No tokio runtime available: {message}")]
    NoRuntime {
        /// Error message.
        message: String,
    },
}

impl HistoryError {
    /// Creates a value overflow error.
    pub fn value_overflow(key: impl Into<String>) -> Self {
        Self::ValueOverflow { key: key.into() }
    }

    /// Creates an unexpected value error.
    pub fn unexpected_value(
        key: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::UnexpectedValue {
            key: key.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Creates an empty record error.
    pub fn empty_record(key: impl Into<String>) -> Self {
        Self::EmptyRecord { key: key.into() }
    }

    /// Creates a timestamp range error.
    pub fn timestamp_out_of_range(key: impl Into<String>) -> Self {
        Self::TimestampOutOfRange { key: key.into() }
    }

    /// Creates a no-runtime error.
    pub fn no_runtime(message: impl Into<String>) -> Self {
        Self::NoRuntime {
            message: message.into(),
        }
    }

    /// Returns the key of the record that failed, if the error is per record.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::ValueOverflow { key }
            | Self::UnexpectedValue { key, .. }
            | Self::EmptyRecord { key }
            | Self::TimestampOutOfRange { key } => Some(key),
            Self::NoRuntime { .. } => None,
        }
    }

    /// Returns `true` if this error only affects one record of one tick.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::NoRuntime { .. })
    }
}

// =============================================================================
// SinkError
// =============================================================================

/// Errors raised by notification sinks.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The sink refused the sample.
    #[error("Sample for '{variable}' rejected: {message}")]
    Rejected {
        /// The variable of the rejected sample.
        variable: String,
        /// Error message.
        message: String,
    },

    /// The downstream channel is closed.
    #[error("Notification channel closed")]
    ChannelClosed,

    /// The sink panicked while handling a sample.
    #[error("Sink panicked while handling '{variable}': {message}")]
    Panicked {
        /// The variable being dispatched.
        variable: String,
        /// Panic payload, if it was a string.
        message: String,
    },
}

impl SinkError {
    /// Creates a rejected error.
    pub fn rejected(variable: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            variable: variable.into(),
            message: message.into(),
        }
    }

    /// Creates a panicked error.
    pub fn panicked(variable: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Panicked {
            variable: variable.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if a later sample may succeed.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::ChannelClosed)
    }
}

/// Extracts a readable message from a panic payload.
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_type() {
        let err: SimError = HistoryError::value_overflow("ns=2;s=A").into();
        assert_eq!(err.error_type(), "history");
        assert!(err.is_transient());

        let err: SimError = SamplingError::no_runtime("outside runtime").into();
        assert_eq!(err.error_type(), "sampling");
        assert!(!err.is_transient());
    }

    #[test]
    fn test_sink_error_transience() {
        assert!(SinkError::rejected("a", "b").is_transient());
        assert!(!SinkError::ChannelClosed.is_transient());
    }

    #[test]
    fn test_history_error_key() {
        let err = HistoryError::unexpected_value("ns=2;s=B", "Int32", "null");
        assert_eq!(err.key(), Some("ns=2;s=B"));
        assert_eq!(HistoryError::no_runtime("x").key(), None);
        assert!(err.to_string().contains("expected Int32"));
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");

        let payload: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
