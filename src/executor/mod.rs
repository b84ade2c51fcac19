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

//! Query execution: the operator contract, relational operators, and the
//! sort-merge join preparation pipeline

pub mod join;
pub mod operator;
pub mod operators;

pub use join::{
    materialized_size, ClusterValue, ColumnMaterializer, MaterializedColumn,
    MaterializedColumnList, MaterializedValue, RadixClusterSorter,
};
pub use operator::Operator;
pub use operators::{Aggregate, AggregateDefinition, ExportCsv, ImportCsv, TableScan, TableWrapper};
