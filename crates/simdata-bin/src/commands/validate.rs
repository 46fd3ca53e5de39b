// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use simdata_config::SimConfig;

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};

/// Executes the `validate` command to validate configuration.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    if !config_path.exists() {
        return Err(BinError::Configuration(format!(
            "Configuration file not found: {}",
            config_path.display()
        )));
    }

    let config = simdata_config::load_config(config_path).map_err(|e| {
        BinError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    let warnings = collect_warnings(&config);

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", config_path.display());
            println!();
            println!("Summary:");
            println!("  Simulator: {}", config.simulator.name);
            println!("  Variables: {}", config.variables.len());
            println!("  Monitors: {}", config.monitors.len());
            println!("  Min period: {} ms", config.sampling.min_period_ms);
            println!(
                "  History: {}",
                if config.history.enabled { "enabled" } else { "disabled" }
            );
            println!("  Historized: {}", config.historized_variables().count());

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                println!("{}", to_json(&config)?);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "summary": {
                    "simulator": config.simulator.name,
                    "variable_count": config.variables.len(),
                    "monitor_count": config.monitors.len(),
                    "min_period_ms": config.sampling.min_period_ms,
                    "history_enabled": config.history.enabled,
                    "historized_count": config.historized_variables().count(),
                },
                "warnings": warnings,
                "config": if args.show_config { Some(&config) } else { None },
            });
            println!("{}", to_json(&output)?);
        }
    }

    if args.strict && !warnings.is_empty() {
        return Err(BinError::Configuration(format!(
            "Strict mode: {} warning(s) found",
            warnings.len()
        )));
    }

    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> BinResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| BinError::runtime(format!("Failed to serialize output: {}", e)))
}

/// Valid but probably unintended settings.
pub(crate) fn collect_warnings(config: &SimConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.variables.is_empty() {
        warnings.push("No variables configured".to_string());
    }

    if config.monitors.is_empty() {
        warnings.push("No monitors configured; nothing will be sampled".to_string());
    }

    for monitor in &config.monitors {
        if monitor.interval_ms < config.sampling.min_period_ms {
            warnings.push(format!(
                "Monitor {} interval {} ms is below the {} ms floor and will be clamped",
                monitor.handle, monitor.interval_ms, config.sampling.min_period_ms
            ));
        }
    }

    for variable in config.historized_variables() {
        if !variable.value_rank.is_scalar() {
            warnings.push(format!(
                "Variable {} is an array; history is only kept for scalars",
                variable.id
            ));
        }
    }

    if !config.history.enabled && config.historized_variables().next().is_some() {
        warnings.push("Variables are marked historize but history is disabled".to_string());
    }

    warnings
}
