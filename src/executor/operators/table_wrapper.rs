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

//! Table wrapper operator
//!
//! Adapts an existing table to the operator contract so it can feed
//! downstream operators (aggregates, scans, joins).

use std::sync::Arc;

use crate::core::Result;
use crate::storage::Table;

use super::super::operator::{Operator, OutputSlot};

/// Wraps an existing table as a single-shot operator
pub struct TableWrapper {
    table: Arc<Table>,
    output: OutputSlot,
}

impl TableWrapper {
    /// Create a wrapper around a shared table
    pub fn new(table: Arc<Table>) -> Self {
        Self {
            table,
            output: OutputSlot::new(),
        }
    }
}

impl Operator for TableWrapper {
    fn name(&self) -> &str {
        "TableWrapper"
    }

    fn execute(&mut self) -> Result<()> {
        self.output.check_not_executed(self.name())?;
        self.output.fill(Arc::clone(&self.table));
        Ok(())
    }

    fn output(&self) -> Result<Arc<Table>> {
        self.output.get(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ColumnDefinition, DataType, Error, Schema, Value};

    #[test]
    fn test_wrapper_contract() {
        let schema = Schema::new(vec![ColumnDefinition::new("id", DataType::Int)]).unwrap();
        let mut table = Table::new(schema);
        table.append_row(vec![Value::Int(1)]).unwrap();

        let mut wrapper = TableWrapper::new(Arc::new(table));
        assert!(matches!(
            wrapper.output(),
            Err(Error::OperatorNotExecuted(_))
        ));

        wrapper.execute().unwrap();
        assert_eq!(wrapper.output().unwrap().row_count(), 1);
        assert!(matches!(
            wrapper.execute(),
            Err(Error::OperatorAlreadyExecuted(_))
        ));
    }
}
