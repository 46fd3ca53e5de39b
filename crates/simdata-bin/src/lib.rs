// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # simdata-bin
//!
//! CLI binary for the simdata engine.
//!
//! - CLI argument parsing with clap
//! - The [`DataSystem`] facade over scheduler and archive
//! - Runtime orchestration and graceful shutdown
//! - Logging initialization
//! - Command implementations (run, validate, version)
//!
//! ## Architecture
//!
//! ```text
//!                    ┌─────────────┐
//!                    │   main.rs   │
//!                    └──────┬──────┘
//!                    ┌──────▼──────┐
//!                    │   cli.rs    │
//!                    └──────┬──────┘
//!               ┌───────────┼───────────┐
//!               ▼           ▼           ▼
//!        ┌──────────┐ ┌──────────┐ ┌──────────┐
//!        │ commands │ │ runtime  │ │ logging  │
//!        └──────────┘ └────┬─────┘ └──────────┘
//!                    ┌─────┴──────┐
//!                    ▼            ▼
//!              ┌──────────┐ ┌──────────┐
//!              │  system  │ │ shutdown │
//!              └────┬─────┘ └──────────┘
//!          ┌────────┴────────┐
//!          ▼                 ▼
//!   simdata-sampling  simdata-history
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start generating data (default command)
//! simdata
//!
//! # Print samples for 30 seconds
//! simdata -c demo.yaml run --duration 30 --print-samples
//!
//! # Validate configuration
//! simdata validate --strict
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;
pub mod system;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands, LogFormat, OutputFormat, RunArgs, ValidateArgs};
pub use error::{BinError, BinResult};
pub use runtime::{RunOptions, RuntimeBuilder, SimRuntime};
pub use shutdown::{ShutdownCoordinator, ShutdownToken};
pub use system::{DataSystem, DataSystemBuilder, MonitoringMode};

/// Binary version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Binary name.
pub const NAME: &str = "simdata";
