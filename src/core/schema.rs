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

//! Schema type for Stratum - ordered column definitions plus chunking

use super::error::{Error, Result};
use super::types::DataType;

/// Default number of rows per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// A single column definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    /// Column name, unique within the schema
    pub name: String,

    /// Column data type
    pub data_type: DataType,
}

impl ColumnDefinition {
    /// Create a new column definition
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Table schema: ordered columns and the target chunk size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<ColumnDefinition>,
    chunk_size: usize,
}

impl Schema {
    /// Create a schema with the default chunk size
    pub fn new(columns: Vec<ColumnDefinition>) -> Result<Self> {
        Self::with_chunk_size(columns, DEFAULT_CHUNK_SIZE)
    }

    /// Create a schema with an explicit chunk size
    pub fn with_chunk_size(columns: Vec<ColumnDefinition>, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::invalid_metadata("chunk size must be positive"));
        }
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(Error::DuplicateColumn(column.name.clone()));
            }
        }
        Ok(Self {
            columns,
            chunk_size,
        })
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Target rows per chunk
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// All column definitions in order
    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    /// Resolve a column name to its position
    pub fn column_id(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    /// Name of the column at the given position
    pub fn column_name(&self, column_id: usize) -> &str {
        &self.columns[column_id].name
    }

    /// Data type of the column at the given position
    pub fn column_type(&self, column_id: usize) -> DataType {
        self.columns[column_id].data_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> Schema {
        Schema::new(vec![
            ColumnDefinition::new("id", DataType::Int),
            ColumnDefinition::new("name", DataType::Text),
            ColumnDefinition::new("score", DataType::Double),
        ])
        .unwrap()
    }

    #[test]
    fn test_column_lookup() {
        let schema = sample_schema();
        assert_eq!(schema.column_id("name").unwrap(), 1);
        assert_eq!(schema.column_name(2), "score");
        assert_eq!(schema.column_type(0), DataType::Int);
        assert!(matches!(
            schema.column_id("missing"),
            Err(Error::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let result = Schema::new(vec![
            ColumnDefinition::new("a", DataType::Int),
            ColumnDefinition::new("a", DataType::Text),
        ]);
        assert!(matches!(result, Err(Error::DuplicateColumn(_))));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let result =
            Schema::with_chunk_size(vec![ColumnDefinition::new("a", DataType::Int)], 0);
        assert!(result.is_err());
    }
}
