// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading for simdata.
//!
//! # Loading Pipeline
//!
//! 1. Resolve `${VAR}` / `${VAR:default}` placeholders in the raw text
//! 2. Parse YAML, TOML or JSON by file extension
//! 3. Apply `SIMDATA_*` environment overrides
//! 4. Validate
//!
//! # Environment Variable Override
//!
//! ```text
//! SIMDATA_SIMULATOR_NAME=bench
//! SIMDATA_LOG_LEVEL=debug
//! SIMDATA_SAMPLING_MIN_PERIOD_MS=200
//! SIMDATA_HISTORY_ENABLED=false
//! SIMDATA_MONITORS_0_INTERVAL_MS=1000
//! ```

use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{LogFormat, LogLevel, SimConfig};

/// Default environment variable prefix.
pub const DEFAULT_ENV_PREFIX: &str = "SIMDATA";

// =============================================================================
// ConfigLoader
// =============================================================================

/// Configuration loader.
///
/// ```no_run
/// use simdata_config::loader::ConfigLoader;
///
/// let config = ConfigLoader::new().load("simdata.yaml").unwrap();
/// println!("{} variables", config.variables.len());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Environment variable prefix.
    env_prefix: String,

    /// Whether to resolve placeholders and apply env overrides.
    resolve_env_vars: bool,
}

impl ConfigLoader {
    /// Creates a loader with default settings.
    pub fn new() -> Self {
        Self {
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            resolve_env_vars: true,
        }
    }

    /// Creates a builder for configuring the loader.
    pub fn builder() -> ConfigLoaderBuilder {
        ConfigLoaderBuilder::new()
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables environment variable resolution.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Loads configuration from a file.
    ///
    /// The format follows the extension: `.yaml`/`.yml`, `.toml` or `.json`.
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<SimConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = self.read_file(path)?;
        let format = ConfigFormat::from_path(path)?;
        let mut config = self.parse_content(&content, format, path)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        config.validate()?;

        info!("Configuration loaded successfully");
        debug!(
            "Loaded {} variables and {} monitors",
            config.variables.len(),
            config.monitors.len()
        );

        Ok(config)
    }

    /// Loads configuration from a string.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<SimConfig> {
        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(content)
        } else {
            content.to_string()
        };
        let mut config = parse_str(&content, format)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        config.validate()?;
        Ok(config)
    }

    fn read_file(&self, path: &Path) -> ConfigResult<String> {
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))
    }

    fn parse_content(&self, content: &str, format: ConfigFormat, path: &Path) -> ConfigResult<SimConfig> {
        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(content)
        } else {
            content.to_string()
        };

        parse_str(&content, format).map_err(|e| match e {
            ConfigError::Serialization { message } => ConfigError::parse(path, message),
            other => other,
        })
    }

    /// Resolves `${VAR_NAME}` and `${VAR_NAME:default}` placeholders.
    ///
    /// Unset variables without a default are left in place.
    fn resolve_env_placeholders(&self, content: &str) -> String {
        let mut result = String::with_capacity(content.len());
        let mut chars = content.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' || chars.peek() != Some(&'{') {
                result.push(c);
                continue;
            }
            chars.next();

            let mut var_content = String::new();
            let mut found_close = false;
            for c in chars.by_ref() {
                if c == '}' {
                    found_close = true;
                    break;
                }
                var_content.push(c);
            }

            if !found_close {
                result.push_str("${");
                result.push_str(&var_content);
                continue;
            }

            let (var_name, default_value) = match var_content.split_once(':') {
                Some((name, default)) => (name, Some(default)),
                None => (var_content.as_str(), None),
            };

            match (env::var(var_name), default_value) {
                (Ok(value), _) => result.push_str(&value),
                (Err(_), Some(default)) => result.push_str(default),
                (Err(_), None) => {
                    warn!("Environment variable '{}' not found", var_name);
                    result.push_str(&format!("${{{}}}", var_name));
                }
            }
        }

        result
    }

    /// Applies `<PREFIX>_*` environment overrides.
    fn apply_env_overrides(&self, config: &mut SimConfig) -> ConfigResult<()> {
        let key = |suffix: &str| format!("{}_{}", self.env_prefix, suffix);

        if let Ok(value) = env::var(key("SIMULATOR_NAME")) {
            config.simulator.name = value;
        }

        if let Ok(value) = env::var(key("LOG_LEVEL")) {
            match parse_log_level(&value) {
                Some(level) => config.logging.level = level,
                None => warn!("Ignoring unknown log level '{}'", value),
            }
        }
        if let Ok(value) = env::var(key("LOG_FORMAT")) {
            match parse_log_format(&value) {
                Some(format) => config.logging.format = format,
                None => warn!("Ignoring unknown log format '{}'", value),
            }
        }

        if let Some(ms) = env_number(&key("SAMPLING_MIN_PERIOD_MS"))? {
            config.sampling.min_period_ms = ms;
        }

        if let Ok(value) = env::var(key("HISTORY_ENABLED")) {
            config.history.enabled = parse_bool(&value);
        }
        if let Some(ms) = env_number(&key("HISTORY_TICK_PERIOD_MS"))? {
            config.history.tick_period_ms = ms;
        }

        for (i, monitor) in config.monitors.iter_mut().enumerate() {
            if let Some(ms) = env_number(&key(&format!("MONITORS_{}_INTERVAL_MS", i)))? {
                monitor.interval_ms = ms;
            }
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ConfigLoaderBuilder
// =============================================================================

/// Builder for ConfigLoader.
#[derive(Debug, Default)]
pub struct ConfigLoaderBuilder {
    env_prefix: Option<String>,
    resolve_env_vars: Option<bool>,
}

impl ConfigLoaderBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the environment prefix.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Enables or disables environment variable resolution.
    pub fn resolve_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = Some(enabled);
        self
    }

    /// Builds the ConfigLoader.
    pub fn build(self) -> ConfigLoader {
        let mut loader = ConfigLoader::new();
        if let Some(prefix) = self.env_prefix {
            loader.env_prefix = prefix;
        }
        if let Some(resolve_env_vars) = self.resolve_env_vars {
            loader.resolve_env_vars = resolve_env_vars;
        }
        loader
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::unsupported_format(other)),
            None => Err(ConfigError::unsupported_format("(no extension)")),
        }
    }

    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_str(content: &str, format: ConfigFormat) -> ConfigResult<SimConfig> {
    match format {
        ConfigFormat::Yaml => parse_yaml(content),
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
    }
}

/// YAML parsing through the config crate.
fn parse_yaml<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(content, config::FileFormat::Yaml))
        .build()
        .map_err(|e| ConfigError::serialization(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| ConfigError::serialization(e.to_string()))
}

fn env_number<T: FromStr>(name: &str) -> ConfigResult<Option<T>> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::invalid_env_var(name, "expected valid number")),
        Err(_) => Ok(None),
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "true" | "1" | "yes" | "on" | "enabled"
    )
}

fn parse_log_level(value: &str) -> Option<LogLevel> {
    match value.to_lowercase().as_str() {
        "trace" => Some(LogLevel::Trace),
        "debug" => Some(LogLevel::Debug),
        "info" => Some(LogLevel::Info),
        "warn" | "warning" => Some(LogLevel::Warn),
        "error" => Some(LogLevel::Error),
        _ => None,
    }
}

fn parse_log_format(value: &str) -> Option<LogFormat> {
    match value.to_lowercase().as_str() {
        "text" | "pretty" => Some(LogFormat::Text),
        "json" => Some(LogFormat::Json),
        "compact" => Some(LogFormat::Compact),
        _ => None,
    }
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Loads configuration from a file with default settings.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<SimConfig> {
    ConfigLoader::new().load(path)
}

/// Loads configuration from a string with the specified format.
pub fn load_config_str(content: &str, format: ConfigFormat) -> ConfigResult<SimConfig> {
    ConfigLoader::new().load_from_str(content, format)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use simdata_core::types::{DataType, ValueRank};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const YAML: &str = r#"
simulator:
  name: test-sim

sampling:
  min_period_ms: 100

history:
  tick_period_ms: 10000

variables:
  - id: "ns=2;s=Scalar.Int32"
    data_type: int32
    historize: true
  - id: "ns=2;s=Array.Double"
    data_type: double
    value_rank: array
    array_length: 4
  - id: "ns=2;s=Analog.Byte"
    data_type: byte
    range: { low: 0, high: 100 }

monitors:
  - handle: 1
    variable: "ns=2;s=Scalar.Int32"
    interval_ms: 250

logging:
  level: debug
  format: compact
"#;

    fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(suffix).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_yaml() {
        let file = temp_file(".yaml", YAML);
        let config = ConfigLoader::new()
            .with_env_prefix("SIMDATA_TEST_YAML")
            .load(file.path())
            .unwrap();

        assert_eq!(config.simulator.name, "test-sim");
        assert_eq!(config.variables.len(), 3);
        assert_eq!(config.variables[1].value_rank, ValueRank::Array);
        assert_eq!(config.variables[2].data_type, DataType::Byte);
        assert_eq!(config.monitors[0].interval_ms, 250);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert_eq!(config.historized_variables().count(), 1);
    }

    #[test]
    fn test_load_toml() {
        let toml = r#"
[simulator]
name = "toml-sim"

[[variables]]
id = "ns=2;s=Flag"
data_type = "boolean"

[[monitors]]
handle = 7
variable = "ns=2;s=Flag"
interval_ms = 1000
"#;
        let file = temp_file(".toml", toml);
        let config = ConfigLoader::new().with_env_vars(false).load(file.path()).unwrap();

        assert_eq!(config.simulator.name, "toml-sim");
        assert_eq!(config.monitors[0].handle, 7);
        assert_eq!(config.history.max_entries, 2000);
    }

    #[test]
    fn test_load_json() {
        let json = r#"{"variables": [{"id": "a", "data_type": "uint16"}]}"#;
        let config = ConfigLoader::new()
            .with_env_vars(false)
            .load_from_str(json, ConfigFormat::Json)
            .unwrap();
        assert_eq!(config.variables[0].data_type, DataType::UInt16);
    }

    #[test]
    fn test_config_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("config.yml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("config.TOML")).unwrap(),
            ConfigFormat::Toml
        );
        assert!(ConfigFormat::from_path(Path::new("config.txt")).is_err());
        assert!(ConfigFormat::from_path(Path::new("config")).is_err());
    }

    #[test]
    fn test_env_placeholder_with_default() {
        let loader = ConfigLoader::new();
        let result = loader.resolve_env_placeholders("name: ${SIMDATA_NONEXISTENT_VAR:fallback}");
        assert_eq!(result, "name: fallback");

        let result = loader.resolve_env_placeholders("name: ${SIMDATA_NONEXISTENT_VAR}");
        assert_eq!(result, "name: ${SIMDATA_NONEXISTENT_VAR}");

        let result = loader.resolve_env_placeholders("broken: ${UNCLOSED");
        assert_eq!(result, "broken: ${UNCLOSED");
    }

    #[test]
    fn test_env_overrides() {
        env::set_var("SIMDATA_TEST_OVR_SIMULATOR_NAME", "from-env");
        env::set_var("SIMDATA_TEST_OVR_MONITORS_0_INTERVAL_MS", "900");
        env::set_var("SIMDATA_TEST_OVR_HISTORY_ENABLED", "off");

        let config = ConfigLoader::new()
            .with_env_prefix("SIMDATA_TEST_OVR")
            .load_from_str(YAML, ConfigFormat::Yaml)
            .unwrap();

        assert_eq!(config.simulator.name, "from-env");
        assert_eq!(config.monitors[0].interval_ms, 900);
        assert!(!config.history.enabled);
    }

    #[test]
    fn test_invalid_env_number() {
        env::set_var("SIMDATA_TEST_BAD_SAMPLING_MIN_PERIOD_MS", "fast");

        let result = ConfigLoader::new()
            .with_env_prefix("SIMDATA_TEST_BAD")
            .load_from_str(YAML, ConfigFormat::Yaml);
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
    }

    #[test]
    fn test_validation_runs_on_load() {
        let yaml = r#"
variables:
  - id: a
    data_type: int32
monitors:
  - handle: 1
    variable: b
    interval_ms: 100
"#;
        let file = temp_file(".yaml", yaml);
        let result = ConfigLoader::new().with_env_vars(false).load(file.path());
        assert!(matches!(result, Err(ConfigError::UnknownVariable { .. })));
    }

    #[test]
    fn test_unknown_field_is_parse_error() {
        let file = temp_file(".json", r#"{"simulator": {"name": "x", "colour": "red"}}"#);
        let result = ConfigLoader::new().with_env_vars(false).load(file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_file_not_found() {
        let result = load_config("/nonexistent/path/simdata.yaml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_loader_builder() {
        let loader = ConfigLoader::builder()
            .env_prefix("MYSIM")
            .resolve_env_vars(false)
            .build();

        assert_eq!(loader.env_prefix, "MYSIM");
        assert!(!loader.resolve_env_vars);
    }

    #[test]
    fn test_parse_helpers() {
        assert!(parse_bool("yes"));
        assert!(!parse_bool("0"));
        assert_eq!(parse_log_level("warning"), Some(LogLevel::Warn));
        assert_eq!(parse_log_level("loud"), None);
        assert_eq!(parse_log_format("json"), Some(LogFormat::Json));
    }
}
