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

//! Table scan operator
//!
//! Filters the input by a constant predicate on one column and emits the
//! matching rows into a fresh table with the input's schema.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::core::{Error, Result, ScanType, Value};
use crate::storage::Table;

use super::super::operator::{Operator, OutputSlot};

/// Scan of one column against a constant predicate
pub struct TableScan {
    input: Box<dyn Operator>,
    column_name: String,
    scan_type: ScanType,
    value: Value,
    value2: Option<Value>,
    output: OutputSlot,
}

impl TableScan {
    /// Create a scan; `Between` additionally needs `value2`
    pub fn new(
        input: Box<dyn Operator>,
        column_name: impl Into<String>,
        scan_type: ScanType,
        value: Value,
        value2: Option<Value>,
    ) -> Self {
        Self {
            input,
            column_name: column_name.into(),
            scan_type,
            value,
            value2,
            output: OutputSlot::new(),
        }
    }

    fn matches(scan_type: ScanType, ordering: Ordering, upper: Option<Ordering>) -> bool {
        match scan_type {
            ScanType::Equals => ordering.is_eq(),
            ScanType::NotEquals => !ordering.is_eq(),
            ScanType::LessThan => ordering.is_lt(),
            ScanType::LessThanEquals => ordering.is_le(),
            ScanType::GreaterThan => ordering.is_gt(),
            ScanType::GreaterThanEquals => ordering.is_ge(),
            ScanType::Between => ordering.is_ge() && upper.is_some_and(|o| o.is_le()),
        }
    }
}

impl Operator for TableScan {
    fn name(&self) -> &str {
        "TableScan"
    }

    fn execute(&mut self) -> Result<()> {
        self.output.check_not_executed(self.name())?;
        let input = self.input.output()?;
        let schema = input.schema();
        let column_id = schema.column_id(&self.column_name)?;
        let column_type = schema.column_type(column_id);

        // Cast predicate constants to the column type once, not per row
        let low = self.value.cast(column_type)?;
        let high = match self.scan_type {
            ScanType::Between => Some(
                self.value2
                    .as_ref()
                    .ok_or(Error::MissingPredicateValue)?
                    .cast(column_type)?,
            ),
            _ => None,
        };

        let mut result = Table::new(schema.clone());
        for chunk_id in 0..input.chunk_count() {
            let chunk = input.chunk(chunk_id);
            for offset in 0..chunk.row_count() {
                let candidate = chunk.column(column_id).value_at(offset);
                let ordering = candidate.compare(&low)?;
                let upper = match &high {
                    Some(high) => Some(candidate.compare(high)?),
                    None => None,
                };
                if Self::matches(self.scan_type, ordering, upper) {
                    let row = (0..schema.column_count())
                        .map(|id| chunk.column(id).value_at(offset))
                        .collect();
                    result.append_row(row)?;
                }
            }
        }

        self.output.fill(Arc::new(result));
        Ok(())
    }

    fn output(&self) -> Result<Arc<Table>> {
        self.output.get(self.name())
    }
}
