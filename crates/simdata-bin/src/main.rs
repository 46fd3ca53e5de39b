// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! simdata - synthetic OPC UA test data engine
//!
//! Main binary entry point.

use simdata_bin::cli::Cli;
use simdata_bin::commands;
use simdata_bin::error::report_error_and_exit;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    if let Err(e) = commands::execute(cli).await {
        report_error_and_exit(e);
    }
}
