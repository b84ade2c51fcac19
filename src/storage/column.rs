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

//! Typed column segments
//!
//! A segment holds one chunk's worth of a single column as a contiguous
//! typed vector, so per-type pipelines can borrow a plain slice without
//! per-row dispatch.

use std::sync::Arc;

use crate::core::{DataType, Error, Result, Value};

/// One chunk of one column, stored as a typed vector
#[derive(Debug, Clone)]
pub enum ColumnSegment {
    Int(Vec<i32>),
    BigInt(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Text(Vec<Arc<str>>),
}

impl ColumnSegment {
    /// Create an empty segment for the given type with reserved capacity
    pub fn with_capacity(data_type: DataType, capacity: usize) -> Self {
        match data_type {
            DataType::Int => ColumnSegment::Int(Vec::with_capacity(capacity)),
            DataType::BigInt => ColumnSegment::BigInt(Vec::with_capacity(capacity)),
            DataType::Float => ColumnSegment::Float(Vec::with_capacity(capacity)),
            DataType::Double => ColumnSegment::Double(Vec::with_capacity(capacity)),
            DataType::Text => ColumnSegment::Text(Vec::with_capacity(capacity)),
        }
    }

    /// The data type stored in this segment
    pub fn data_type(&self) -> DataType {
        match self {
            ColumnSegment::Int(_) => DataType::Int,
            ColumnSegment::BigInt(_) => DataType::BigInt,
            ColumnSegment::Float(_) => DataType::Float,
            ColumnSegment::Double(_) => DataType::Double,
            ColumnSegment::Text(_) => DataType::Text,
        }
    }

    /// Number of values in this segment
    pub fn len(&self) -> usize {
        match self {
            ColumnSegment::Int(v) => v.len(),
            ColumnSegment::BigInt(v) => v.len(),
            ColumnSegment::Float(v) => v.len(),
            ColumnSegment::Double(v) => v.len(),
            ColumnSegment::Text(v) => v.len(),
        }
    }

    /// Returns true if the segment holds no values
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a value; its type must match the segment type exactly
    pub fn push(&mut self, value: Value) -> Result<()> {
        match (self, value) {
            (ColumnSegment::Int(v), Value::Int(x)) => v.push(x),
            (ColumnSegment::BigInt(v), Value::BigInt(x)) => v.push(x),
            (ColumnSegment::Float(v), Value::Float(x)) => v.push(x),
            (ColumnSegment::Double(v), Value::Double(x)) => v.push(x),
            (ColumnSegment::Text(v), Value::Text(x)) => v.push(x),
            (segment, value) => {
                return Err(Error::type_mismatch(
                    segment.data_type().to_string(),
                    value.data_type().to_string(),
                ))
            }
        }
        Ok(())
    }

    /// Read the value at the given offset
    pub fn value_at(&self, offset: usize) -> Value {
        match self {
            ColumnSegment::Int(v) => Value::Int(v[offset]),
            ColumnSegment::BigInt(v) => Value::BigInt(v[offset]),
            ColumnSegment::Float(v) => Value::Float(v[offset]),
            ColumnSegment::Double(v) => Value::Double(v[offset]),
            ColumnSegment::Text(v) => Value::Text(v[offset].clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_read() {
        let mut segment = ColumnSegment::with_capacity(DataType::Int, 4);
        segment.push(Value::Int(1)).unwrap();
        segment.push(Value::Int(2)).unwrap();
        assert_eq!(segment.len(), 2);
        assert_eq!(segment.value_at(1), Value::Int(2));
    }

    #[test]
    fn test_push_type_mismatch() {
        let mut segment = ColumnSegment::with_capacity(DataType::Int, 4);
        let err = segment.push(Value::text("nope")).unwrap_err();
        assert!(err.is_type_error());
    }

    #[test]
    fn test_text_segment() {
        let mut segment = ColumnSegment::with_capacity(DataType::Text, 2);
        segment.push(Value::text("a")).unwrap();
        segment.push(Value::text("b")).unwrap();
        assert_eq!(segment.data_type(), DataType::Text);
        assert_eq!(segment.value_at(0), Value::text("a"));
    }
}
