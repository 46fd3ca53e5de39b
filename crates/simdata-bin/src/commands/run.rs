// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `run` command.

use std::time::Duration;

use crate::cli::{Cli, RunArgs};
use crate::error::BinResult;
use crate::logging::init_logging;
use crate::runtime::{RunOptions, RuntimeBuilder};

/// Executes the `run` command.
///
/// Logging is set up after the configuration loads so its `logging`
/// section applies; command-line flags still win.
pub async fn run(cli: &Cli, args: RunArgs) -> BinResult<()> {
    let runtime = RuntimeBuilder::new()
        .config_path(&cli.config)
        .options(RunOptions {
            duration: args.duration.map(Duration::from_secs),
            print_samples: args.print_samples,
            no_history: args.no_history,
        })
        .build()?;

    let logging = &runtime.config().logging;
    init_logging(
        cli.effective_log_level(logging.level.as_str()),
        cli.effective_log_format(logging.format.into()),
    )?;

    runtime.run().await
}
