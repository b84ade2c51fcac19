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

//! Column materialization for the sort-merge join
//!
//! Materialization extracts one column of a chunked table into per-chunk
//! `(value, row id)` records. Downstream clustering and sorting work on
//! these records alone; row ids travel along unchanged so the join can
//! reach back into the source tables.
//!
//! The pipeline is monomorphized per column type through [`ClusterValue`],
//! with the runtime dispatch done once per column, not per row.

use std::cmp::Ordering;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::core::{DataType, Error, Result};
use crate::storage::{ColumnSegment, RowId, Table};

/// One materialized record: a column value paired with its source row id
#[derive(Debug, Clone, PartialEq)]
pub struct MaterializedValue<T> {
    pub value: T,
    pub row_id: RowId,
}

impl<T> MaterializedValue<T> {
    pub fn new(value: T, row_id: RowId) -> Self {
        Self { value, row_id }
    }
}

/// One chunk's (or one cluster's) worth of materialized records
pub type MaterializedColumn<T> = Vec<MaterializedValue<T>>;

/// A list of materialized chunks; after clustering, one entry per cluster
pub type MaterializedColumnList<T> = Vec<MaterializedColumn<T>>;

/// Total number of records across all chunks of a materialized column list
pub fn materialized_size<T>(chunks: &MaterializedColumnList<T>) -> usize {
    chunks.iter().map(|chunk| chunk.len()).sum()
}

/// A column value type the cluster-sort pipeline can operate on
///
/// Implemented for the five supported column types. `total_cmp` is the
/// pipeline's single ordering: the natural order for numerics (IEEE total
/// order for floats, which agrees with `<` on the NaN-free data this
/// engine stores) and byte-wise lexicographic order for text.
pub trait ClusterValue: Clone + Send + Sync + 'static {
    /// The column type this value type materializes from
    const DATA_TYPE: DataType;

    /// Typed view of a column segment; `None` when the segment holds a
    /// different type
    fn slice_of(segment: &ColumnSegment) -> Option<&[Self]>
    where
        Self: Sized;

    /// Total order used for per-chunk sorting, range splits, and the final
    /// cluster sort
    fn total_cmp(&self, other: &Self) -> Ordering;

    /// Low 32 bits of the value's representation, fed into the radix
    /// clustering mask
    fn radix(&self) -> u32;
}

impl ClusterValue for i32 {
    const DATA_TYPE: DataType = DataType::Int;

    fn slice_of(segment: &ColumnSegment) -> Option<&[Self]> {
        match segment {
            ColumnSegment::Int(values) => Some(values),
            _ => None,
        }
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn radix(&self) -> u32 {
        *self as u32
    }
}

impl ClusterValue for i64 {
    const DATA_TYPE: DataType = DataType::BigInt;

    fn slice_of(segment: &ColumnSegment) -> Option<&[Self]> {
        match segment {
            ColumnSegment::BigInt(values) => Some(values),
            _ => None,
        }
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn radix(&self) -> u32 {
        // Truncation keeps the low 32 bits
        *self as u32
    }
}

impl ClusterValue for f32 {
    const DATA_TYPE: DataType = DataType::Float;

    fn slice_of(segment: &ColumnSegment) -> Option<&[Self]> {
        match segment {
            ColumnSegment::Float(values) => Some(values),
            _ => None,
        }
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        f32::total_cmp(self, other)
    }

    fn radix(&self) -> u32 {
        // -0.0 normalized so equal keys share a cluster
        if *self == 0.0 {
            0
        } else {
            self.to_bits()
        }
    }
}

impl ClusterValue for f64 {
    const DATA_TYPE: DataType = DataType::Double;

    fn slice_of(segment: &ColumnSegment) -> Option<&[Self]> {
        match segment {
            ColumnSegment::Double(values) => Some(values),
            _ => None,
        }
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        f64::total_cmp(self, other)
    }

    fn radix(&self) -> u32 {
        if *self == 0.0 {
            0
        } else {
            self.to_bits() as u32
        }
    }
}

impl ClusterValue for Arc<str> {
    const DATA_TYPE: DataType = DataType::Text;

    fn slice_of(segment: &ColumnSegment) -> Option<&[Self]> {
        match segment {
            ColumnSegment::Text(values) => Some(values),
            _ => None,
        }
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }

    fn radix(&self) -> u32 {
        // First 4 bytes little-endian; strings shorter than 4 bytes are
        // zero-extended to the right
        let bytes = self.as_bytes();
        let mut prefix = [0u8; 4];
        let len = bytes.len().min(4);
        prefix[..len].copy_from_slice(&bytes[..len]);
        u32::from_le_bytes(prefix)
    }
}

/// Extracts one column of a table into per-chunk materialized records
pub struct ColumnMaterializer<T: ClusterValue> {
    sort_per_chunk: bool,
    _marker: PhantomData<T>,
}

impl<T: ClusterValue> ColumnMaterializer<T> {
    /// Create a materializer; with `sort_per_chunk` each output chunk is
    /// sorted by value (required by range clustering's sampling)
    pub fn new(sort_per_chunk: bool) -> Self {
        Self {
            sort_per_chunk,
            _marker: PhantomData,
        }
    }

    /// Materialize the named column
    ///
    /// The output has one chunk per source chunk and one record per source
    /// row. Without per-chunk sorting, each chunk preserves the source row
    /// order.
    pub fn materialize(
        &self,
        table: &Table,
        column_name: &str,
    ) -> Result<MaterializedColumnList<T>> {
        let column_id = table.schema().column_id(column_name)?;
        let column_type = table.schema().column_type(column_id);
        if column_type != T::DATA_TYPE {
            return Err(Error::type_mismatch(
                T::DATA_TYPE.to_string(),
                column_type.to_string(),
            ));
        }

        let mut output = Vec::with_capacity(table.chunk_count());
        for chunk_id in 0..table.chunk_count() {
            let segment = table.chunk(chunk_id).column(column_id);
            let values = T::slice_of(segment).ok_or_else(|| {
                Error::type_mismatch(T::DATA_TYPE.to_string(), segment.data_type().to_string())
            })?;
            let mut chunk: MaterializedColumn<T> = values
                .iter()
                .enumerate()
                .map(|(offset, value)| {
                    MaterializedValue::new(
                        value.clone(),
                        RowId::new(chunk_id as u32, offset as u32),
                    )
                })
                .collect();
            if self.sort_per_chunk {
                chunk.sort_unstable_by(|a, b| a.value.total_cmp(&b.value));
            }
            output.push(chunk);
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ColumnDefinition, Schema, Value};

    fn int_table(values: &[i32], chunk_size: usize) -> Table {
        let schema = Schema::with_chunk_size(
            vec![ColumnDefinition::new("k", DataType::Int)],
            chunk_size,
        )
        .unwrap();
        let mut table = Table::new(schema);
        for &v in values {
            table.append_row(vec![Value::Int(v)]).unwrap();
        }
        table
    }

    #[test]
    fn test_materialize_preserves_order_and_row_ids() {
        let table = int_table(&[4, 1, 3, 2, 5], 2);
        let materializer: ColumnMaterializer<i32> = ColumnMaterializer::new(false);
        let chunks = materializer.materialize(&table, "k").unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(materialized_size(&chunks), 5);
        assert_eq!(chunks[0][0].value, 4);
        assert_eq!(chunks[0][0].row_id, RowId::new(0, 0));
        assert_eq!(chunks[1][1].value, 2);
        assert_eq!(chunks[1][1].row_id, RowId::new(1, 1));
    }

    #[test]
    fn test_materialize_sorted_per_chunk() {
        let table = int_table(&[4, 1, 3, 2, 5], 2);
        let materializer: ColumnMaterializer<i32> = ColumnMaterializer::new(true);
        let chunks = materializer.materialize(&table, "k").unwrap();

        // Each chunk is sorted; chunks are not ordered relative to each other
        assert_eq!(chunks[0][0].value, 1);
        assert_eq!(chunks[0][1].value, 4);
        assert_eq!(chunks[0][0].row_id, RowId::new(0, 1));
        assert_eq!(chunks[1][0].value, 2);
    }

    #[test]
    fn test_unknown_column() {
        let table = int_table(&[1], 2);
        let materializer: ColumnMaterializer<i32> = ColumnMaterializer::new(false);
        let err = materializer.materialize(&table, "missing").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_type_mismatch() {
        let table = int_table(&[1], 2);
        let materializer: ColumnMaterializer<i64> = ColumnMaterializer::new(false);
        let err = materializer.materialize(&table, "k").unwrap_err();
        assert!(err.is_type_error());
    }

    #[test]
    fn test_integer_radix() {
        assert_eq!(5i32.radix() & 1, 1);
        assert_eq!(4i32.radix() & 1, 0);
        assert_eq!((-1i32).radix(), u32::MAX);
        assert_eq!(((1i64 << 40) + 3).radix(), 3);
    }

    #[test]
    fn test_text_radix_prefix() {
        let short: Arc<str> = Arc::from("ab");
        let long: Arc<str> = Arc::from("abcd");
        let longer: Arc<str> = Arc::from("abcdzzz");
        // Short strings zero-extend to the right
        assert_eq!(short.radix(), u32::from_le_bytes([b'a', b'b', 0, 0]));
        // Only the first four bytes matter
        assert_eq!(long.radix(), longer.radix());
    }

    #[test]
    fn test_float_radix_zero_normalization() {
        assert_eq!((-0.0f64).radix(), 0.0f64.radix());
        assert_eq!((-0.0f32).radix(), 0.0f32.radix());
    }
}
