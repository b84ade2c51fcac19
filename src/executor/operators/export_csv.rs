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

//! CSV export operator
//!
//! Writes the input table to a data file plus the metadata sidecar that
//! [`ImportCsv`](super::import_csv::ImportCsv) reads back: schema, chunk
//! size, and values round-trip. The operator passes its input table
//! through as its own output.

use std::path::PathBuf;
use std::sync::Arc;

use crate::core::Result;
use crate::storage::Table;

use super::super::operator::{Operator, OutputSlot};
use super::import_csv::{meta_path, META_CHUNK_SIZE, META_COLUMN_TYPE};

/// Exports a table to a CSV data file and metadata sidecar
pub struct ExportCsv {
    input: Box<dyn Operator>,
    filename: PathBuf,
    output: OutputSlot,
}

impl ExportCsv {
    /// Create an export of the input's output table
    pub fn new(input: Box<dyn Operator>, filename: impl Into<PathBuf>) -> Self {
        Self {
            input,
            filename: filename.into(),
            output: OutputSlot::new(),
        }
    }

    fn write_meta(&self, table: &Table) -> Result<()> {
        let mut writer = csv::Writer::from_path(meta_path(&self.filename))?;
        writer.write_record(["property_type", "key", "value"])?;
        let chunk_size = table.schema().chunk_size().to_string();
        writer.write_record([META_CHUNK_SIZE, "", chunk_size.as_str()])?;
        for column in table.schema().columns() {
            let data_type = column.data_type.to_string();
            writer.write_record([META_COLUMN_TYPE, column.name.as_str(), data_type.as_str()])?;
        }
        writer.flush().map_err(crate::core::Error::from)?;
        Ok(())
    }

    fn write_data(&self, table: &Table) -> Result<()> {
        let mut writer = csv::Writer::from_path(&self.filename)?;
        for chunk_id in 0..table.chunk_count() {
            let chunk = table.chunk(chunk_id);
            for offset in 0..chunk.row_count() {
                let record: Vec<String> = (0..table.schema().column_count())
                    .map(|column_id| chunk.column(column_id).value_at(offset).to_string())
                    .collect();
                writer.write_record(&record)?;
            }
        }
        writer.flush().map_err(crate::core::Error::from)?;
        Ok(())
    }
}

impl Operator for ExportCsv {
    fn name(&self) -> &str {
        "ExportCsv"
    }

    fn execute(&mut self) -> Result<()> {
        self.output.check_not_executed(self.name())?;
        let table = self.input.output()?;
        self.write_meta(&table)?;
        self.write_data(&table)?;
        self.output.fill(table);
        Ok(())
    }

    fn output(&self) -> Result<Arc<Table>> {
        self.output.get(self.name())
    }
}
