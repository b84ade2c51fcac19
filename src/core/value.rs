// Copyright 2026 Stratum Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Value type for Stratum - runtime values with type information
//!
//! This module provides a unified Value enum that represents column values
//! with full type information and conversion capabilities. The engine does
//! not model NULLs; the ingest path rejects them.

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hasher;
use std::sync::Arc;

use super::error::{Error, Result};
use super::types::DataType;

/// A runtime value with type information
///
/// Each variant carries its data directly. Text uses Arc<str> for cheap
/// cloning during materialization and row assembly.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 32-bit signed integer
    Int(i32),

    /// 64-bit signed integer
    BigInt(i64),

    /// 32-bit floating point
    Float(f32),

    /// 64-bit floating point
    Double(f64),

    /// UTF-8 text string (Arc for cheap cloning)
    Text(Arc<str>),
}

impl Value {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create a text value
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(Arc::from(value.into().as_str()))
    }

    /// Create a text value from Arc<str> (zero-copy)
    pub fn text_arc(value: Arc<str>) -> Self {
        Value::Text(value)
    }

    // =========================================================================
    // Type accessors
    // =========================================================================

    /// Returns the data type of this value
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int(_) => DataType::Int,
            Value::BigInt(_) => DataType::BigInt,
            Value::Float(_) => DataType::Float,
            Value::Double(_) => DataType::Double,
            Value::Text(_) => DataType::Text,
        }
    }

    // =========================================================================
    // Value extractors
    // =========================================================================

    /// Extract as f64 for numeric arithmetic
    ///
    /// Returns None for text values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::BigInt(v) => Some(*v as f64),
            Value::Float(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            Value::Text(_) => None,
        }
    }

    /// Extract as text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    // =========================================================================
    // Conversion
    // =========================================================================

    /// Cast this value to another data type
    ///
    /// Numeric values convert freely between the numeric types with the
    /// usual narrowing semantics; text only casts to text. Everything else
    /// is a type error.
    pub fn cast(&self, target: DataType) -> Result<Value> {
        if self.data_type() == target {
            return Ok(self.clone());
        }
        match (self, target) {
            (Value::Text(_), _) | (_, DataType::Text) => Err(Error::type_conversion(
                self.data_type().to_string(),
                target.to_string(),
            )),
            (v, DataType::Int) => {
                let f = v.as_f64().ok_or_else(|| {
                    Error::type_conversion(v.data_type().to_string(), target.to_string())
                })?;
                Ok(Value::Int(f as i32))
            }
            (v, DataType::BigInt) => {
                let f = v.as_f64().ok_or_else(|| {
                    Error::type_conversion(v.data_type().to_string(), target.to_string())
                })?;
                Ok(Value::BigInt(f as i64))
            }
            (v, DataType::Float) => {
                let f = v.as_f64().ok_or_else(|| {
                    Error::type_conversion(v.data_type().to_string(), target.to_string())
                })?;
                Ok(Value::Float(f as f32))
            }
            (v, DataType::Double) => {
                let f = v.as_f64().ok_or_else(|| {
                    Error::type_conversion(v.data_type().to_string(), target.to_string())
                })?;
                Ok(Value::Double(f))
            }
        }
    }

    /// Parse a textual field into a value of the given type
    ///
    /// Used by the CSV importer; the rendered form of every value parses
    /// back to an equal value.
    pub fn parse_typed(field: &str, data_type: DataType) -> Result<Value> {
        let parse_err = || Error::CsvFieldParse {
            field: field.to_string(),
            data_type: data_type.to_string(),
            column: String::new(),
        };
        match data_type {
            DataType::Int => field.parse::<i32>().map(Value::Int).map_err(|_| parse_err()),
            DataType::BigInt => field
                .parse::<i64>()
                .map(Value::BigInt)
                .map_err(|_| parse_err()),
            DataType::Float => field
                .parse::<f32>()
                .map(Value::Float)
                .map_err(|_| parse_err()),
            DataType::Double => field
                .parse::<f64>()
                .map(Value::Double)
                .map_err(|_| parse_err()),
            DataType::Text => Ok(Value::text(field)),
        }
    }

    // =========================================================================
    // Comparison
    // =========================================================================

    /// Compare two values
    ///
    /// Numeric values compare by their numeric order regardless of width;
    /// text compares lexicographically. Comparing text with a numeric value
    /// is a type error.
    pub fn compare(&self, other: &Value) -> Result<Ordering> {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => Ok(a.as_bytes().cmp(b.as_bytes())),
            (Value::Text(_), _) | (_, Value::Text(_)) => Err(Error::incomparable(
                self.data_type().to_string(),
                other.data_type().to_string(),
            )),
            // Exact integer comparison when neither side is a float
            (a, b) if a.data_type().is_integer() && b.data_type().is_integer() => {
                let (x, y) = match (a, b) {
                    (Value::Int(x), Value::Int(y)) => (*x as i64, *y as i64),
                    (Value::Int(x), Value::BigInt(y)) => (*x as i64, *y),
                    (Value::BigInt(x), Value::Int(y)) => (*x, *y as i64),
                    (Value::BigInt(x), Value::BigInt(y)) => (*x, *y),
                    _ => unreachable!(),
                };
                Ok(x.cmp(&y))
            }
            (a, b) => {
                let (x, y) = (a.as_f64(), b.as_f64());
                match (x, y) {
                    (Some(x), Some(y)) => Ok(x.partial_cmp(&y).unwrap_or(Ordering::Equal)),
                    _ => Err(Error::incomparable(
                        a.data_type().to_string(),
                        b.data_type().to_string(),
                    )),
                }
            }
        }
    }

    // =========================================================================
    // Grouping keys
    // =========================================================================

    /// Bit-exact equality for use in group-by keys
    ///
    /// Floats compare by bit pattern here so that keys form a proper
    /// equivalence relation.
    pub(crate) fn key_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }

    /// Feed a bit-exact representation of this value into a hasher
    pub(crate) fn key_hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Int(v) => {
                state.write_u8(0);
                state.write_i32(*v);
            }
            Value::BigInt(v) => {
                state.write_u8(1);
                state.write_i64(*v);
            }
            Value::Float(v) => {
                state.write_u8(2);
                state.write_u32(v.to_bits());
            }
            Value::Double(v) => {
                state.write_u8(3);
                state.write_u64(v.to_bits());
            }
            Value::Text(s) => {
                state.write_u8(4);
                state.write(s.as_bytes());
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::BigInt(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::BigInt(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_numeric_widths() {
        assert_eq!(
            Value::Int(5).compare(&Value::BigInt(5)).unwrap(),
            Ordering::Equal
        );
        assert_eq!(
            Value::Int(3).compare(&Value::Double(3.5)).unwrap(),
            Ordering::Less
        );
        assert_eq!(
            Value::Float(2.5).compare(&Value::Int(2)).unwrap(),
            Ordering::Greater
        );
    }

    #[test]
    fn test_compare_text() {
        assert_eq!(
            Value::text("apple").compare(&Value::text("banana")).unwrap(),
            Ordering::Less
        );
        assert!(Value::text("a").compare(&Value::Int(1)).is_err());
    }

    #[test]
    fn test_cast() {
        assert_eq!(
            Value::BigInt(7).cast(DataType::Int).unwrap(),
            Value::Int(7)
        );
        assert_eq!(
            Value::Int(7).cast(DataType::Double).unwrap(),
            Value::Double(7.0)
        );
        assert!(Value::text("7").cast(DataType::Int).is_err());
        assert!(Value::Int(7).cast(DataType::Text).is_err());
    }

    #[test]
    fn test_parse_typed_round_trip() {
        let cases = [
            (Value::Int(-42), DataType::Int),
            (Value::BigInt(1 << 40), DataType::BigInt),
            (Value::Float(1.25), DataType::Float),
            (Value::Double(-0.125), DataType::Double),
            (Value::text("hello, world"), DataType::Text),
        ];
        for (value, dt) in cases {
            let rendered = value.to_string();
            assert_eq!(Value::parse_typed(&rendered, dt).unwrap(), value);
        }
        assert!(Value::parse_typed("abc", DataType::Int).is_err());
    }

    #[test]
    fn test_key_eq_is_bit_exact() {
        assert!(Value::Double(1.5).key_eq(&Value::Double(1.5)));
        assert!(!Value::Double(0.0).key_eq(&Value::Double(-0.0)));
        assert!(!Value::Int(1).key_eq(&Value::BigInt(1)));
    }
}
