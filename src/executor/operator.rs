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

//! Operator contract
//!
//! Every operator is single-shot: `execute` runs it exactly once and
//! materializes its result table; `output` hands the result out afterwards.
//! Calling `output` before `execute`, or `execute` twice, is an error.

use std::sync::Arc;

use crate::core::{Error, Result};
use crate::storage::Table;

/// A single-shot relational operator producing one table
pub trait Operator {
    /// Operator name for error messages and plan rendering
    fn name(&self) -> &str;

    /// Run the operator; valid exactly once
    fn execute(&mut self) -> Result<()>;

    /// The result table; only valid after `execute`
    fn output(&self) -> Result<Arc<Table>>;
}

/// Shared single-shot result slot used by operator implementations
#[derive(Debug, Default)]
pub struct OutputSlot {
    table: Option<Arc<Table>>,
}

impl OutputSlot {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once a result has been stored
    pub fn is_filled(&self) -> bool {
        self.table.is_some()
    }

    /// Guard against double execution
    pub fn check_not_executed(&self, operator: &str) -> Result<()> {
        if self.is_filled() {
            return Err(Error::OperatorAlreadyExecuted(operator.to_string()));
        }
        Ok(())
    }

    /// Store the operator's result
    pub fn fill(&mut self, table: Arc<Table>) {
        self.table = Some(table);
    }

    /// Read the result, failing when `execute` has not run
    pub fn get(&self, operator: &str) -> Result<Arc<Table>> {
        self.table
            .clone()
            .ok_or_else(|| Error::OperatorNotExecuted(operator.to_string()))
    }
}
