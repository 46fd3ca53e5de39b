// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core data types for simdata.
//!
//! This module provides the identifiers, values and status codes shared by the
//! sampling scheduler, the history archive and their collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// Identifiers
// =============================================================================

/// Identity of a variable node in the simulated address space.
///
/// The id is a non-owning reference: the address space itself lives in the
/// node manager, and the engine only carries the id around.
///
/// # Examples
///
/// ```
/// use simdata_core::types::VariableId;
///
/// let id = VariableId::new("ns=2;s=Scalar.Int32");
/// assert_eq!(id.as_str(), "ns=2;s=Scalar.Int32");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableId(String);

impl VariableId {
    /// Creates a new variable ID.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the ID and returns the inner string.
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VariableId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VariableId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for VariableId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Opaque handle of one monitored item registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonitoredItemId(pub u32);

impl MonitoredItemId {
    /// Creates a new monitored item ID.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for MonitoredItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mi-{}", self.0)
    }
}

impl From<u32> for MonitoredItemId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

// =============================================================================
// Data Types
// =============================================================================

/// OPC UA built-in data types understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Boolean value.
    Boolean,
    /// Signed 8-bit integer.
    SByte,
    /// Unsigned 8-bit integer.
    Byte,
    /// Signed 16-bit integer.
    Int16,
    /// Unsigned 16-bit integer.
    UInt16,
    /// Signed 32-bit integer.
    #[default]
    Int32,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 64-bit integer.
    UInt64,
    /// 32-bit IEEE 754 float.
    Float,
    /// 64-bit IEEE 754 double.
    Double,
    /// UTF-8 string.
    String,
    /// Date and time.
    DateTime,
    /// GUID.
    Guid,
    /// Raw byte string.
    ByteString,
}

impl DataType {
    /// Returns the OPC UA type ID for built-in types.
    pub const fn type_id(&self) -> u32 {
        match self {
            Self::Boolean => 1,
            Self::SByte => 2,
            Self::Byte => 3,
            Self::Int16 => 4,
            Self::UInt16 => 5,
            Self::Int32 => 6,
            Self::UInt32 => 7,
            Self::Int64 => 8,
            Self::UInt64 => 9,
            Self::Float => 10,
            Self::Double => 11,
            Self::String => 12,
            Self::DateTime => 13,
            Self::Guid => 14,
            Self::ByteString => 15,
        }
    }

    /// Returns `true` if this is an integer type.
    #[inline]
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::SByte
                | Self::Byte
                | Self::Int16
                | Self::UInt16
                | Self::Int32
                | Self::UInt32
                | Self::Int64
                | Self::UInt64
        )
    }

    /// Returns `true` if this is a numeric type.
    #[inline]
    pub const fn is_numeric(&self) -> bool {
        self.is_integer() || matches!(self, Self::Float | Self::Double)
    }

    /// Returns the display name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::SByte => "SByte",
            Self::Byte => "Byte",
            Self::Int16 => "Int16",
            Self::UInt16 => "UInt16",
            Self::Int32 => "Int32",
            Self::UInt32 => "UInt32",
            Self::Int64 => "Int64",
            Self::UInt64 => "UInt64",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::String => "String",
            Self::DateTime => "DateTime",
            Self::Guid => "Guid",
            Self::ByteString => "ByteString",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Whether a variable holds a single value or an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValueRank {
    /// A single value.
    #[default]
    Scalar,
    /// A one-dimensional array.
    Array,
}

impl ValueRank {
    /// Returns `true` for scalar variables.
    #[inline]
    pub const fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar)
    }
}

// =============================================================================
// Value
// =============================================================================

/// A variant value produced by the generator or stored in history.
///
/// # Examples
///
/// ```
/// use simdata_core::types::{DataType, Value};
///
/// let v = Value::Int32(41);
/// assert_eq!(v.as_i32(), Some(41));
/// assert_eq!(v.data_type(), Some(DataType::Int32));
/// assert!(Value::Null.is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// Boolean value
    Boolean(bool),
    /// Signed 8-bit integer
    SByte(i8),
    /// Unsigned 8-bit integer
    Byte(u8),
    /// Signed 16-bit integer
    Int16(i16),
    /// Unsigned 16-bit integer
    UInt16(u16),
    /// Signed 32-bit integer
    Int32(i32),
    /// Unsigned 32-bit integer
    UInt32(u32),
    /// Signed 64-bit integer
    Int64(i64),
    /// Unsigned 64-bit integer
    UInt64(u64),
    /// 32-bit floating point
    Float(f32),
    /// 64-bit floating point
    Double(f64),
    /// UTF-8 string
    String(String),
    /// Date and time
    DateTime(DateTime<Utc>),
    /// GUID
    Guid(Uuid),
    /// Raw bytes
    ByteString(Vec<u8>),
    /// Homogeneous array of values
    Array(Vec<Value>),
    /// Null/absent value
    #[default]
    Null,
}

impl Value {
    /// Returns the built-in type of a scalar value, `None` for arrays and null.
    pub fn data_type(&self) -> Option<DataType> {
        let dt = match self {
            Value::Boolean(_) => DataType::Boolean,
            Value::SByte(_) => DataType::SByte,
            Value::Byte(_) => DataType::Byte,
            Value::Int16(_) => DataType::Int16,
            Value::UInt16(_) => DataType::UInt16,
            Value::Int32(_) => DataType::Int32,
            Value::UInt32(_) => DataType::UInt32,
            Value::Int64(_) => DataType::Int64,
            Value::UInt64(_) => DataType::UInt64,
            Value::Float(_) => DataType::Float,
            Value::Double(_) => DataType::Double,
            Value::String(_) => DataType::String,
            Value::DateTime(_) => DataType::DateTime,
            Value::Guid(_) => DataType::Guid,
            Value::ByteString(_) => DataType::ByteString,
            Value::Array(_) | Value::Null => return None,
        };
        Some(dt)
    }

    /// Returns `true` if this is a null value.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Attempts to get this value as a boolean.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to get this value as an i32, without lossy conversion.
    #[inline]
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to convert an integer value to an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::SByte(v) => Some(*v as i64),
            Value::Byte(v) => Some(*v as i64),
            Value::Int16(v) => Some(*v as i64),
            Value::UInt16(v) => Some(*v as i64),
            Value::Int32(v) => Some(*v as i64),
            Value::UInt32(v) => Some(*v as i64),
            Value::Int64(v) => Some(*v),
            Value::UInt64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Attempts to convert a numeric value to an f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    /// Attempts to get this value as an array reference.
    #[inline]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(v) => write!(f, "{}", v),
            Value::SByte(v) => write!(f, "{}", v),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::UInt16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::UInt32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::UInt64(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::DateTime(v) => write!(f, "{}", v.to_rfc3339()),
            Value::Guid(v) => write!(f, "{}", v),
            Value::ByteString(v) => write!(f, "<{} bytes>", v.len()),
            Value::Array(v) => write!(f, "[{} elements]", v.len()),
            Value::Null => write!(f, "null"),
        }
    }
}

macro_rules! impl_from_for_value {
    ($variant:ident, $type:ty) => {
        impl From<$type> for Value {
            fn from(v: $type) -> Self {
                Value::$variant(v)
            }
        }
    };
}

impl_from_for_value!(Boolean, bool);
impl_from_for_value!(SByte, i8);
impl_from_for_value!(Byte, u8);
impl_from_for_value!(Int16, i16);
impl_from_for_value!(UInt16, u16);
impl_from_for_value!(Int32, i32);
impl_from_for_value!(UInt32, u32);
impl_from_for_value!(Int64, i64);
impl_from_for_value!(UInt64, u64);
impl_from_for_value!(Float, f32);
impl_from_for_value!(Double, f64);
impl_from_for_value!(String, String);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

// =============================================================================
// Status Code
// =============================================================================

/// Status attached to a sample, following the OPC UA severity classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "status", content = "reason")]
pub enum StatusCode {
    /// The value is good and reliable.
    #[default]
    Good,

    /// The value is uncertain but may be usable.
    Uncertain(UncertainReason),

    /// The value is bad and should not be used.
    Bad(BadReason),
}

impl StatusCode {
    /// Returns the OPC UA severity bits for this status.
    pub const fn code(&self) -> u32 {
        match self {
            StatusCode::Good => 0x0000_0000,
            StatusCode::Uncertain(_) => 0x4000_0000,
            StatusCode::Bad(_) => 0x8000_0000,
        }
    }

    /// Returns `true` if the status is good.
    #[inline]
    pub fn is_good(&self) -> bool {
        matches!(self, StatusCode::Good)
    }

    /// Returns `true` if the status is bad.
    #[inline]
    pub fn is_bad(&self) -> bool {
        matches!(self, StatusCode::Bad(_))
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCode::Good => write!(f, "Good"),
            StatusCode::Uncertain(reason) => write!(f, "Uncertain: {:?}", reason),
            StatusCode::Bad(reason) => write!(f, "Bad: {:?}", reason),
        }
    }
}

/// Reasons for an uncertain status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UncertainReason {
    /// Last known value is being repeated.
    LastKnownValue,
    /// Initial value before the first sample.
    InitialValue,
    /// Unknown reason.
    #[default]
    Unknown,
}

/// Reasons for a bad status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BadReason {
    /// The node id is not known to the generator.
    NodeIdUnknown,
    /// The value could not be produced.
    InternalError,
    /// Unknown reason.
    #[default]
    Unknown,
}

// =============================================================================
// Sample
// =============================================================================

/// One generated value for one monitored variable.
///
/// Samples are created per tick and handed to the notification sink by
/// value; nothing keeps them afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// The variable the value belongs to.
    pub variable: VariableId,

    /// The generated value.
    pub value: Value,

    /// Status of the value.
    pub status: StatusCode,

    /// When the value was generated.
    pub timestamp: DateTime<Utc>,
}

impl Sample {
    /// Creates a good sample stamped with the current time.
    pub fn good(variable: VariableId, value: Value) -> Self {
        Self {
            variable,
            value,
            status: StatusCode::Good,
            timestamp: Utc::now(),
        }
    }

    /// Creates a sample with an explicit status and timestamp.
    pub fn with_status(
        variable: VariableId,
        value: Value,
        status: StatusCode,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            variable,
            value,
            status,
            timestamp,
        }
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} [{}] @ {}",
            self.variable,
            self.value,
            self.status,
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f")
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
