// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # simdata Integration Tests
//!
//! Integration tests for the sampling scheduler, the history archive and the
//! data system facade, plus the shared utilities they use.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `fixtures`: Variables, configurations and prebuilt components
//!   - `mocks`: Recording sinks and scripted generators
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p simdata-tests
//! cargo test -p simdata-tests --test integration_sampling
//! cargo test -p simdata-tests --test integration_history
//! cargo test -p simdata-tests --test integration_system
//! ```
//!
//! Timer-driven tests use `#[tokio::test(start_paused = true)]` so simulated
//! time advances only while every task is idle.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::fixtures::*;
    pub use crate::common::mocks::*;
    pub use crate::common::{init_test_logging, ms};
}
