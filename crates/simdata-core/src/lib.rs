// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # simdata-core
//!
//! Core abstractions and shared types for the simdata synthetic OPC UA data
//! engine.
//!
//! - **Types**: `VariableId`, `MonitoredItemId`, `Value`, `DataType`, `StatusCode`, `Sample`
//! - **Error**: Unified error hierarchy
//! - **Generator**: `ValueGenerator` trait and the lookup-table `StrategyTable`
//! - **Sink**: `NotificationSink` trait with tracing and channel sinks
//! - **Timer**: `PeriodicTimer`, a tokio task released on drop
//!
//! ## Example
//!
//! ```rust,ignore
//! use simdata_core::{Sample, Value, VariableId};
//! use simdata_core::sink::{ChannelSink, NotificationSink};
//!
//! let (sink, mut rx) = ChannelSink::with_channel(16);
//! sink.on_sample(Sample::good(VariableId::new("ns=2;s=A"), Value::Int32(1))).await?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod generator;
pub mod sink;
pub mod timer;
pub mod types;

pub use error::*;
pub use types::*;

pub use generator::{GeneratorStrategy, StrategyTable, StrategyTableBuilder, ValueGenerator};
pub use sink::{ChannelSink, NotificationSink, TracingSink};
pub use timer::PeriodicTimer;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
