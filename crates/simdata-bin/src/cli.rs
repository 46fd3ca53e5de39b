// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `run`: Start generating data (default)
//! - `validate`: Validate configuration file
//! - `version`: Show version information

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// simdata - synthetic OPC UA test data engine
///
/// Samples configured variables on a shared timer and keeps a bounded,
/// backfilled history for historized variables.
#[derive(Parser, Debug)]
#[command(
    name = "simdata",
    author = "Sylvex <contact@sylvex.io>",
    version = simdata_core::VERSION,
    about = "Synthetic OPC UA test data engine",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "simdata.yaml",
        env = "SIMDATA_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Log format; overrides the config file
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Enable quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start generating data
    ///
    /// This is the default command when no subcommand is specified.
    /// Registers the configured variables, enables history and starts the
    /// configured monitors until Ctrl+C.
    Run(RunArgs),

    /// Validate the configuration file
    ///
    /// Parses and validates the configuration file without starting anything.
    Validate(ValidateArgs),

    /// Show detailed version information
    Version,
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `run` command.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Stop after this many seconds instead of waiting for a signal
    #[arg(short, long)]
    pub duration: Option<u64>,

    /// Print every sample to stdout instead of logging it
    #[arg(short, long)]
    pub print_samples: bool,

    /// Do not create history records
    #[arg(long, env = "SIMDATA_NO_HISTORY")]
    pub no_history: bool,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Strict mode: treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

impl From<simdata_config::LogFormat> for LogFormat {
    fn from(format: simdata_config::LogFormat) -> Self {
        match format {
            simdata_config::LogFormat::Text => LogFormat::Text,
            simdata_config::LogFormat::Json => LogFormat::Json,
            simdata_config::LogFormat::Compact => LogFormat::Compact,
        }
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective command, defaulting to `Run` if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Run(RunArgs::default()))
    }

    /// Get the effective log level: flags, then `--log-level`, then `fallback`.
    pub fn effective_log_level<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            self.log_level.as_deref().unwrap_or(fallback)
        }
    }

    /// Get the effective log format, `fallback` unless `--log-format` is set.
    pub fn effective_log_format(&self, fallback: LogFormat) -> LogFormat {
        self.log_format.unwrap_or(fallback)
    }
}

impl Default for ValidateArgs {
    fn default() -> Self {
        Self {
            show_config: false,
            format: OutputFormat::Text,
            strict: false,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command() {
        let cli = Cli::parse_from(["simdata"]);
        assert!(cli.command.is_none());
        assert!(matches!(cli.effective_command(), Commands::Run(_)));
    }

    #[test]
    fn test_run_command() {
        let cli = Cli::parse_from(["simdata", "run", "--duration", "5", "-p"]);
        if let Some(Commands::Run(args)) = cli.command {
            assert_eq!(args.duration, Some(5));
            assert!(args.print_samples);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_validate_command() {
        let cli = Cli::parse_from(["simdata", "validate", "--show-config", "-f", "json"]);
        if let Some(Commands::Validate(args)) = cli.command {
            assert!(args.show_config);
            assert_eq!(args.format, OutputFormat::Json);
        } else {
            panic!("Expected Validate command");
        }
    }

    #[test]
    fn test_config_path() {
        let cli = Cli::parse_from(["simdata", "-c", "/etc/simdata/config.yaml"]);
        assert_eq!(cli.config, PathBuf::from("/etc/simdata/config.yaml"));
    }

    #[test]
    fn test_log_level_precedence() {
        let cli = Cli::parse_from(["simdata"]);
        assert_eq!(cli.effective_log_level("error"), "error");

        let cli = Cli::parse_from(["simdata", "-l", "trace"]);
        assert_eq!(cli.effective_log_level("error"), "trace");

        let cli = Cli::parse_from(["simdata", "-q", "-l", "trace"]);
        assert_eq!(cli.effective_log_level("error"), "warn");

        let cli = Cli::parse_from(["simdata", "-v"]);
        assert_eq!(cli.effective_log_level("error"), "debug");
    }

    #[test]
    fn test_log_format_override() {
        let cli = Cli::parse_from(["simdata", "--log-format", "json"]);
        assert_eq!(cli.effective_log_format(LogFormat::Text), LogFormat::Json);

        let cli = Cli::parse_from(["simdata"]);
        assert_eq!(cli.effective_log_format(LogFormat::Compact), LogFormat::Compact);
    }
}
