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

//! CSV import operator
//!
//! Loads a data file plus its metadata sidecar (`<file>.meta`) into a
//! chunked table. The sidecar describes column names, types, and the chunk
//! size; the data file carries bare records without a header row. When a
//! catalog and table name are supplied, an already-registered name
//! short-circuits the import and the registered table is returned instead.
//!
//! NULL values are not supported by the ingest path.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::core::{ColumnDefinition, DataType, Error, Result, Schema, Value};
use crate::storage::{Catalog, Table};

use super::super::operator::{Operator, OutputSlot};

/// Sidecar record tag for the chunk size property
pub(crate) const META_CHUNK_SIZE: &str = "chunk_size";

/// Sidecar record tag for a column definition
pub(crate) const META_COLUMN_TYPE: &str = "column_type";

/// Path of the metadata sidecar belonging to a data file
pub(crate) fn meta_path(data_path: &Path) -> PathBuf {
    let mut path = data_path.as_os_str().to_os_string();
    path.push(".meta");
    PathBuf::from(path)
}

/// Parse the metadata sidecar into a schema
fn read_meta(path: &Path) -> Result<Schema> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut chunk_size: Option<usize> = None;
    let mut columns: Vec<ColumnDefinition> = Vec::new();

    for record in reader.records() {
        let record = record?;
        if record.len() != 3 {
            return Err(Error::invalid_metadata(format!(
                "expected 3 fields per record, got {}",
                record.len()
            )));
        }
        match &record[0] {
            META_CHUNK_SIZE => {
                let parsed = record[2]
                    .parse::<usize>()
                    .map_err(|_| Error::invalid_metadata("chunk_size is not a number"))?;
                chunk_size = Some(parsed);
            }
            META_COLUMN_TYPE => {
                columns.push(ColumnDefinition::new(
                    record[1].to_string(),
                    DataType::from_str(&record[2])?,
                ));
            }
            other => {
                return Err(Error::invalid_metadata(format!(
                    "unknown property type '{}'",
                    other
                )))
            }
        }
    }

    if columns.is_empty() {
        return Err(Error::invalid_metadata("no columns declared"));
    }
    let chunk_size =
        chunk_size.ok_or_else(|| Error::invalid_metadata("chunk_size is missing"))?;
    Schema::with_chunk_size(columns, chunk_size)
}

/// Imports a CSV data file and its metadata sidecar into a table
pub struct ImportCsv {
    filename: PathBuf,
    catalog: Option<Arc<Catalog>>,
    table_name: Option<String>,
    output: OutputSlot,
}

impl ImportCsv {
    /// Import without catalog registration
    pub fn new(filename: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
            catalog: None,
            table_name: None,
            output: OutputSlot::new(),
        }
    }

    /// Import and register the table in a catalog
    ///
    /// If `table_name` is already registered, the registered table is
    /// returned and no file is read.
    pub fn with_catalog(
        filename: impl Into<PathBuf>,
        catalog: Arc<Catalog>,
        table_name: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            catalog: Some(catalog),
            table_name: Some(table_name.into()),
            output: OutputSlot::new(),
        }
    }

    fn import(&self) -> Result<Table> {
        let schema = read_meta(&meta_path(&self.filename))?;
        let mut table = Table::new(schema);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(&self.filename)?;

        for record in reader.records() {
            let record = record?;
            let column_count = table.schema().column_count();
            if record.len() != column_count {
                return Err(Error::RowArityMismatch {
                    expected: column_count,
                    got: record.len(),
                });
            }
            let mut row = Vec::with_capacity(column_count);
            for (column_id, field) in record.iter().enumerate() {
                let data_type = table.schema().column_type(column_id);
                let value = Value::parse_typed(field, data_type).map_err(|error| match error {
                    Error::CsvFieldParse {
                        field, data_type, ..
                    } => Error::CsvFieldParse {
                        field,
                        data_type,
                        column: table.schema().column_name(column_id).to_string(),
                    },
                    other => other,
                })?;
                row.push(value);
            }
            table.append_row(row)?;
        }
        Ok(table)
    }
}

impl Operator for ImportCsv {
    fn name(&self) -> &str {
        "ImportCsv"
    }

    fn execute(&mut self) -> Result<()> {
        self.output.check_not_executed(self.name())?;

        if let (Some(catalog), Some(name)) = (&self.catalog, &self.table_name) {
            if catalog.has_table(name) {
                self.output.fill(catalog.get_table(name)?);
                return Ok(());
            }
        }

        let table = Arc::new(self.import()?);
        if let (Some(catalog), Some(name)) = (&self.catalog, &self.table_name) {
            catalog.add_table(name.clone(), Arc::clone(&table))?;
        }
        self.output.fill(table);
        Ok(())
    }

    fn output(&self) -> Result<Arc<Table>> {
        self.output.get(self.name())
    }
}
