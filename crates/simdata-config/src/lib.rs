// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # simdata-config
//!
//! Configuration for the simdata engine.
//!
//! - **Schema**: `SimConfig` with `simulator`, `sampling`, `history`,
//!   `variables`, `monitors` and `logging` sections
//! - **Multi-Format Support**: YAML, TOML, and JSON
//! - **Environment Overrides**: `${VAR:default}` placeholders and `SIMDATA_*` variables
//!
//! ## Quick Start
//!
//! ```no_run
//! use simdata_config::loader::load_config;
//!
//! let config = load_config("simdata.yaml").unwrap();
//! println!("Simulator: {}", config.simulator.name);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, load_config_str, ConfigFormat, ConfigLoader, ConfigLoaderBuilder};
pub use schema::{
    HistorySettings, LogFormat, LogLevel, LoggingConfig, MonitorConfig, RangeConfig,
    SamplingSettings, SimConfig, SimulatorConfig, VariableConfig,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
