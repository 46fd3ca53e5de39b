// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration error types for simdata-config.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration file.
    #[error("Failed to parse config file '{path}': {message}")]
    Parse {
        /// Path to the configuration file.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Validation failed for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },

    /// File I/O error.
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// Two variables share an id.
    #[error("Duplicate variable ID: {id}")]
    DuplicateVariableId {
        /// The duplicated id.
        id: String,
    },

    /// Two monitors share a handle.
    #[error("Duplicate monitor handle: {handle}")]
    DuplicateMonitorHandle {
        /// The duplicated handle.
        handle: u32,
    },

    /// A monitor refers to a variable that is not declared.
    #[error("Monitor {handle} refers to unknown variable '{variable}'")]
    UnknownVariable {
        /// The monitor handle.
        handle: u32,
        /// The missing variable id.
        variable: String,
    },

    /// Invalid environment variable value.
    #[error("Invalid environment variable value for '{name}': {message}")]
    InvalidEnvVar {
        /// The environment variable name.
        name: String,
        /// Error message.
        message: String,
    },

    /// Value out of range.
    #[error("Value out of range for '{field}': {value} (expected {min}..{max})")]
    OutOfRange {
        /// The field name.
        field: String,
        /// The actual value.
        value: String,
        /// Minimum allowed value.
        min: String,
        /// Maximum allowed value.
        max: String,
    },

    /// Unsupported file format.
    #[error("Unsupported configuration format: {format}")]
    UnsupportedFormat {
        /// The format or extension.
        format: String,
    },

    /// Serialization error.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message.
        message: String,
    },
}

impl ConfigError {
    /// Creates a parse error.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Creates a duplicate variable error.
    pub fn duplicate_variable_id(id: impl Into<String>) -> Self {
        Self::DuplicateVariableId { id: id.into() }
    }

    /// Creates a duplicate handle error.
    pub fn duplicate_monitor_handle(handle: u32) -> Self {
        Self::DuplicateMonitorHandle { handle }
    }

    /// Creates an unknown variable error.
    pub fn unknown_variable(handle: u32, variable: impl Into<String>) -> Self {
        Self::UnknownVariable {
            handle,
            variable: variable.into(),
        }
    }

    /// Creates an invalid env var error.
    pub fn invalid_env_var(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates an out of range error.
    pub fn out_of_range<T: std::fmt::Display>(
        field: impl Into<String>,
        value: T,
        min: T,
        max: T,
    ) -> Self {
        Self::OutOfRange {
            field: field.into(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    /// Creates an unsupported format error.
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Returns `true` if this error is related to file I/O.
    pub fn is_io_error(&self) -> bool {
        matches!(self, ConfigError::Io { .. } | ConfigError::FileNotFound { .. })
    }

    /// Returns `true` if the file parsed but its content is inconsistent.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            ConfigError::Validation { .. }
                | ConfigError::DuplicateVariableId { .. }
                | ConfigError::DuplicateMonitorHandle { .. }
                | ConfigError::UnknownVariable { .. }
                | ConfigError::OutOfRange { .. }
        )
    }

    /// Returns the error type as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            ConfigError::Parse { .. } => "parse",
            ConfigError::Validation { .. } => "validation",
            ConfigError::Io { .. } => "io",
            ConfigError::FileNotFound { .. } => "file_not_found",
            ConfigError::DuplicateVariableId { .. } => "duplicate_variable_id",
            ConfigError::DuplicateMonitorHandle { .. } => "duplicate_monitor_handle",
            ConfigError::UnknownVariable { .. } => "unknown_variable",
            ConfigError::InvalidEnvVar { .. } => "invalid_env_var",
            ConfigError::OutOfRange { .. } => "out_of_range",
            ConfigError::UnsupportedFormat { .. } => "unsupported_format",
            ConfigError::Serialization { .. } => "serialization",
        }
    }
}

/// A Result type with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;
