// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Value generation for monitored variables.
//!
//! The scheduler only ever calls [`ValueGenerator::generate`]. The bundled
//! [`StrategyTable`] maps each variable to a small [`GeneratorStrategy`]
//! built once at startup, so no type-specific branching leaks into the
//! scheduler.
//!
//! # Example
//!
//! ```
//! use simdata_core::generator::{GeneratorStrategy, StrategyTable, ValueGenerator};
//! use simdata_core::types::{DataType, Value, VariableId};
//!
//! let table = StrategyTable::builder()
//!     .scalar("ns=2;s=Scalar.Int32", DataType::Int32)
//!     .array("ns=2;s=Array.Double", DataType::Double, 10)
//!     .build();
//!
//! let value = table.generate(&VariableId::new("ns=2;s=Scalar.Int32"));
//! assert!(matches!(value, Value::Int32(_)));
//!
//! // Unknown variables yield null, never an error.
//! assert!(table.generate(&VariableId::new("ns=2;s=Missing")).is_null());
//! ```

use std::collections::HashMap;

use chrono::{Duration as ChronoDuration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{DataType, Value, VariableId};

// =============================================================================
// ValueGenerator Trait
// =============================================================================

/// Produces a value for a variable.
///
/// Implementations are called from the scheduler's tick task, must not block
/// for long, and return `Value::Null` for variables they do not know.
pub trait ValueGenerator: Send + Sync {
    /// Generates a fresh value for `variable`.
    fn generate(&self, variable: &VariableId) -> Value;
}

impl<F> ValueGenerator for F
where
    F: Fn(&VariableId) -> Value + Send + Sync,
{
    fn generate(&self, variable: &VariableId) -> Value {
        self(variable)
    }
}

// =============================================================================
// GeneratorStrategy
// =============================================================================

/// How values for one variable are produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneratorStrategy {
    /// A random scalar of the given type.
    Scalar {
        /// Element type.
        data_type: DataType,
    },

    /// A random array of the given type and length.
    Array {
        /// Element type.
        data_type: DataType,
        /// Number of elements.
        length: usize,
    },

    /// A random numeric scalar drawn from `[low, high]`.
    Analog {
        /// Numeric type of the produced value.
        data_type: DataType,
        /// Inclusive lower bound.
        low: f64,
        /// Inclusive upper bound.
        high: f64,
    },
}

impl GeneratorStrategy {
    /// Returns the element type of generated values.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Scalar { data_type }
            | Self::Array { data_type, .. }
            | Self::Analog { data_type, .. } => *data_type,
        }
    }

    /// Produces one value using the given random source.
    pub fn produce<R: Rng + ?Sized>(&self, rng: &mut R) -> Value {
        match self {
            Self::Scalar { data_type } => random_scalar(*data_type, rng),
            Self::Array { data_type, length } => {
                Value::Array((0..*length).map(|_| random_scalar(*data_type, rng)).collect())
            }
            Self::Analog {
                data_type,
                low,
                high,
            } => {
                // Non-finite bounds or spans have no uniform distribution.
                if !(high - low).is_finite() {
                    return Value::Null;
                }
                let (low, high) = if low <= high { (*low, *high) } else { (*high, *low) };
                let raw = if low == high { low } else { rng.gen_range(low..=high) };
                numeric_value(*data_type, raw)
            }
        }
    }
}

fn random_scalar<R: Rng + ?Sized>(data_type: DataType, rng: &mut R) -> Value {
    match data_type {
        DataType::Boolean => Value::Boolean(rng.gen()),
        DataType::SByte => Value::SByte(rng.gen()),
        DataType::Byte => Value::Byte(rng.gen()),
        DataType::Int16 => Value::Int16(rng.gen()),
        DataType::UInt16 => Value::UInt16(rng.gen()),
        DataType::Int32 => Value::Int32(rng.gen()),
        DataType::UInt32 => Value::UInt32(rng.gen()),
        DataType::Int64 => Value::Int64(rng.gen()),
        DataType::UInt64 => Value::UInt64(rng.gen()),
        DataType::Float => Value::Float(rng.gen_range(-1.0e6f32..1.0e6f32)),
        DataType::Double => Value::Double(rng.gen_range(-1.0e9f64..1.0e9f64)),
        DataType::String => {
            let len = rng.gen_range(4..=16);
            Value::String((0..len).map(|_| char::from(rng.sample(Alphanumeric))).collect())
        }
        DataType::DateTime => {
            let offset = rng.gen_range(0..=86_400 * 365);
            Value::DateTime(Utc::now() - ChronoDuration::seconds(offset))
        }
        DataType::Guid => Value::Guid(Uuid::new_v4()),
        DataType::ByteString => {
            let len = rng.gen_range(1..=32);
            Value::ByteString((0..len).map(|_| rng.gen()).collect())
        }
    }
}

fn numeric_value(data_type: DataType, raw: f64) -> Value {
    // `as` saturates float-to-int casts, so out-of-range bounds clamp.
    let rounded = raw.round();
    match data_type {
        DataType::SByte => Value::SByte(rounded as i8),
        DataType::Byte => Value::Byte(rounded as u8),
        DataType::Int16 => Value::Int16(rounded as i16),
        DataType::UInt16 => Value::UInt16(rounded as u16),
        DataType::Int32 => Value::Int32(rounded as i32),
        DataType::UInt32 => Value::UInt32(rounded as u32),
        DataType::Int64 => Value::Int64(rounded as i64),
        DataType::UInt64 => Value::UInt64(rounded as u64),
        DataType::Float => Value::Float(raw as f32),
        DataType::Double => Value::Double(raw),
        _ => Value::Null,
    }
}

// =============================================================================
// StrategyTable
// =============================================================================

/// Lookup table from variable identity to generator strategy.
///
/// Built once at startup and then only read, so it is shared without locks.
#[derive(Debug, Clone, Default)]
pub struct StrategyTable {
    strategies: HashMap<VariableId, GeneratorStrategy>,
}

impl StrategyTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table builder.
    pub fn builder() -> StrategyTableBuilder {
        StrategyTableBuilder::default()
    }

    /// Returns the strategy registered for a variable.
    pub fn strategy(&self, variable: &VariableId) -> Option<&GeneratorStrategy> {
        self.strategies.get(variable)
    }

    /// Returns `true` if the variable has a strategy.
    pub fn contains(&self, variable: &VariableId) -> bool {
        self.strategies.contains_key(variable)
    }

    /// Returns the number of registered variables.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Returns `true` if no variables are registered.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl ValueGenerator for StrategyTable {
    fn generate(&self, variable: &VariableId) -> Value {
        match self.strategies.get(variable) {
            Some(strategy) => strategy.produce(&mut rand::thread_rng()),
            None => Value::Null,
        }
    }
}

/// Builder for [`StrategyTable`].
#[derive(Debug, Default)]
pub struct StrategyTableBuilder {
    strategies: HashMap<VariableId, GeneratorStrategy>,
}

impl StrategyTableBuilder {
    /// Registers a strategy for a variable, replacing any previous one.
    pub fn insert(mut self, variable: impl Into<VariableId>, strategy: GeneratorStrategy) -> Self {
        self.strategies.insert(variable.into(), strategy);
        self
    }

    /// Registers a random scalar variable.
    pub fn scalar(self, variable: impl Into<VariableId>, data_type: DataType) -> Self {
        self.insert(variable, GeneratorStrategy::Scalar { data_type })
    }

    /// Registers a random array variable.
    pub fn array(self, variable: impl Into<VariableId>, data_type: DataType, length: usize) -> Self {
        self.insert(variable, GeneratorStrategy::Array { data_type, length })
    }

    /// Registers a bounded analog variable.
    ///
    /// Non-finite bounds make the variable read as null.
    pub fn analog(
        self,
        variable: impl Into<VariableId>,
        data_type: DataType,
        low: f64,
        high: f64,
    ) -> Self {
        self.insert(
            variable,
            GeneratorStrategy::Analog {
                data_type,
                low,
                high,
            },
        )
    }

    /// Builds the table.
    pub fn build(self) -> StrategyTable {
        StrategyTable {
            strategies: self.strategies,
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
    fn test_scalar_strategy_matches_type() {
        let mut rng = rand::thread_rng();
        for dt in [
            DataType::Boolean,
            DataType::SByte,
            DataType::Int32,
            DataType::UInt64,
            DataType::Double,
            DataType::String,
            DataType::Guid,
            DataType::ByteString,
            DataType::DateTime,
        ] {
            let value = GeneratorStrategy::Scalar { data_type: dt }.produce(&mut rng);
            assert_eq!(value.data_type(), Some(dt));
        }
    }

    #[test]
    fn test_array_strategy_length() {
        let mut rng = rand::thread_rng();
        let value = GeneratorStrategy::Array {
            data_type: DataType::Int16,
            length: 10,
        }
        .produce(&mut rng);

        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 10);
        assert!(items.iter().all(|v| v.data_type() == Some(DataType::Int16)));
    }

    #[test]
    fn test_analog_strategy_bounds() {
        let mut rng = rand::thread_rng();
        let strategy = GeneratorStrategy::Analog {
            data_type: DataType::SByte,
            low: -100.0,
            high: 100.0,
        };
        for _ in 0..200 {
            let v = strategy.produce(&mut rng).as_i64().unwrap();
            assert!((-100..=100).contains(&v));
        }

        let reversed = GeneratorStrategy::Analog {
            data_type: DataType::Double,
            low: 5.0,
            high: 1.0,
        };
        let v = reversed.produce(&mut rng).as_f64().unwrap();
        assert!((1.0..=5.0).contains(&v));
    }

    #[test]
    fn test_analog_non_finite_bounds_are_null() {
        let table = StrategyTable::builder()
            .analog("ns=2;s=Nan", DataType::Double, f64::NAN, 1.0)
            .analog("ns=2;s=Inf", DataType::Double, 0.0, f64::INFINITY)
            .analog("ns=2;s=Wide", DataType::Double, f64::MIN, f64::MAX)
            .build();

        assert!(table.generate(&VariableId::new("ns=2;s=Nan")).is_null());
        assert!(table.generate(&VariableId::new("ns=2;s=Inf")).is_null());
        assert!(table.generate(&VariableId::new("ns=2;s=Wide")).is_null());
    }

    #[test]
    fn test_unknown_variable_is_null() {
        let table = StrategyTable::builder()
            .scalar("ns=2;s=Known", DataType::Boolean)
            .build();

        assert_eq!(table.len(), 1);
        assert!(table.contains(&VariableId::new("ns=2;s=Known")));
        assert!(table.generate(&VariableId::new("ns=2;s=Unknown")).is_null());
    }

    #[test]
    fn test_closure_generator() {
        let generator = |_: &VariableId| Value::Int32(42);
        assert_eq!(generator.generate(&VariableId::new("x")), Value::Int32(42));
    }
}
