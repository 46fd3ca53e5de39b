// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # simdata-history
//!
//! Bounded, backfilled history per variable.
//!
//! ```rust,ignore
//! use simdata_core::{DataType, VariableId};
//! use simdata_history::HistoryArchive;
//!
//! let archive = HistoryArchive::new()?;
//! archive.create_record(VariableId::new("ns=2;s=Counter"), DataType::Int32);
//! assert_eq!(archive.len(&VariableId::new("ns=2;s=Counter")), Some(1001));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod archive;
pub mod config;
pub mod record;

pub use archive::{ArchiveStatsSnapshot, ArchiveTickSummary, HistoryArchive};
pub use config::{HistoryConfig, HistoryConfigBuilder};
pub use record::{HistoryEntry, HistoryRecord};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
