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

//! Chunked column-store table
//!
//! A table is a sequence of chunks; each chunk stores up to
//! `schema.chunk_size()` rows column-wise in typed segments. Rows are
//! addressed by [`RowId`], the pair of chunk index and offset within the
//! chunk. Tables are append-only; readers share them behind `Arc`.

use std::fmt;

use crate::core::{Error, Result, Schema, Value};

use super::column::ColumnSegment;

/// Identifies one row of a chunked table
///
/// Row ids are opaque to every pipeline stage: they are carried along
/// unchanged and never synthesized or renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId {
    /// Index of the chunk within the table
    pub chunk_id: u32,

    /// Offset of the row within the chunk
    pub chunk_offset: u32,
}

impl RowId {
    /// Create a new row id
    pub fn new(chunk_id: u32, chunk_offset: u32) -> Self {
        Self {
            chunk_id,
            chunk_offset,
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chunk_id, self.chunk_offset)
    }
}

/// One horizontal partition of a table: one segment per schema column
#[derive(Debug, Clone)]
pub struct Chunk {
    columns: Vec<ColumnSegment>,
}

impl Chunk {
    fn for_schema(schema: &Schema) -> Self {
        let columns = schema
            .columns()
            .iter()
            .map(|c| ColumnSegment::with_capacity(c.data_type, schema.chunk_size()))
            .collect();
        Self { columns }
    }

    /// Number of rows in this chunk
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.len())
    }

    /// The segment of the given column
    pub fn column(&self, column_id: usize) -> &ColumnSegment {
        &self.columns[column_id]
    }
}

/// An in-memory, append-only, chunked column-store table
#[derive(Debug, Clone)]
pub struct Table {
    schema: Schema,
    chunks: Vec<Chunk>,
}

impl Table {
    /// Create an empty table for the given schema
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            chunks: Vec::new(),
        }
    }

    /// The table's schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Total number of rows across all chunks
    pub fn row_count(&self) -> usize {
        self.chunks.iter().map(|c| c.row_count()).sum()
    }

    /// Number of chunks
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// The chunk at the given index
    pub fn chunk(&self, chunk_id: usize) -> &Chunk {
        &self.chunks[chunk_id]
    }

    /// Append one row; a full chunk is sealed and a fresh one opened
    pub fn append_row(&mut self, values: Vec<Value>) -> Result<()> {
        if values.len() != self.schema.column_count() {
            return Err(Error::RowArityMismatch {
                expected: self.schema.column_count(),
                got: values.len(),
            });
        }
        let needs_chunk = match self.chunks.last() {
            Some(chunk) => chunk.row_count() >= self.schema.chunk_size(),
            None => true,
        };
        if needs_chunk {
            self.chunks.push(Chunk::for_schema(&self.schema));
        }
        let chunk = self
            .chunks
            .last_mut()
            .ok_or_else(|| Error::internal("no open chunk"))?;
        for (column_id, value) in values.into_iter().enumerate() {
            chunk.columns[column_id].push(value)?;
        }
        Ok(())
    }

    /// Read the value addressed by a row id
    pub fn value_at(&self, column_id: usize, row_id: RowId) -> Value {
        self.chunks[row_id.chunk_id as usize].columns[column_id]
            .value_at(row_id.chunk_offset as usize)
    }

    /// Read a value by table-wide row number (row numbers span chunks in order)
    pub fn get_value(&self, column_id: usize, row_number: usize) -> Result<Value> {
        let mut remaining = row_number;
        for chunk in &self.chunks {
            if remaining < chunk.row_count() {
                return Ok(chunk.columns[column_id].value_at(remaining));
            }
            remaining -= chunk.row_count();
        }
        Err(Error::RowOutOfBounds {
            row: row_number as u64,
            row_count: self.row_count() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ColumnDefinition, DataType};

    fn two_column_table(chunk_size: usize) -> Table {
        let schema = Schema::with_chunk_size(
            vec![
                ColumnDefinition::new("id", DataType::Int),
                ColumnDefinition::new("label", DataType::Text),
            ],
            chunk_size,
        )
        .unwrap();
        Table::new(schema)
    }

    #[test]
    fn test_append_spans_chunks() {
        let mut table = two_column_table(2);
        for i in 0..5 {
            table
                .append_row(vec![Value::Int(i), Value::text(format!("row{}", i))])
                .unwrap();
        }
        assert_eq!(table.row_count(), 5);
        assert_eq!(table.chunk_count(), 3);
        assert_eq!(table.chunk(0).row_count(), 2);
        assert_eq!(table.chunk(2).row_count(), 1);
    }

    #[test]
    fn test_row_id_addressing() {
        let mut table = two_column_table(2);
        for i in 0..5 {
            table
                .append_row(vec![Value::Int(i), Value::text(format!("row{}", i))])
                .unwrap();
        }
        assert_eq!(table.value_at(0, RowId::new(1, 1)), Value::Int(3));
        assert_eq!(table.value_at(1, RowId::new(2, 0)), Value::text("row4"));
    }

    #[test]
    fn test_get_value_by_row_number() {
        let mut table = two_column_table(2);
        for i in 0..5 {
            table
                .append_row(vec![Value::Int(i * 10), Value::text("x")])
                .unwrap();
        }
        assert_eq!(table.get_value(0, 0).unwrap(), Value::Int(0));
        assert_eq!(table.get_value(0, 3).unwrap(), Value::Int(30));
        assert!(matches!(
            table.get_value(0, 5),
            Err(Error::RowOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_arity_mismatch() {
        let mut table = two_column_table(2);
        let err = table.append_row(vec![Value::Int(1)]).unwrap_err();
        assert!(matches!(err, Error::RowArityMismatch { .. }));
    }
}
