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

//! # Stratum - research in-memory column-store engine
//!
//! Stratum is a small column-store relational engine built to study two
//! pieces of query processing machinery:
//!
//! - **Sort-merge join preparation** - chunked column materialization,
//!   parallel radix/range clustering with per-cluster locking, and the
//!   cluster sort that establishes the order a merge join consumes.
//! - **Cardinality estimation** - per-column `(min, max, distinct count)`
//!   statistics with lazy computation through the aggregate operator, and
//!   selectivity estimation for constant, two-column, and placeholder
//!   predicates.
//!
//! Around these cores sit the collaborators they need: chunked tables with
//! typed column segments, a single-shot operator contract, aggregation and
//! scan operators, CSV import/export with a metadata sidecar, and a table
//! catalog.
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use stratum::core::{ColumnDefinition, DataType, Schema, Value};
//! use stratum::executor::RadixClusterSorter;
//! use stratum::storage::Table;
//!
//! let schema = Schema::new(vec![ColumnDefinition::new("id", DataType::Int)]).unwrap();
//! let mut left = Table::new(schema.clone());
//! let mut right = Table::new(schema);
//! for v in [5, 1, 3, 5, 2] {
//!     left.append_row(vec![Value::Int(v)]).unwrap();
//! }
//! for v in [5, 2] {
//!     right.append_row(vec![Value::Int(v)]).unwrap();
//! }
//!
//! let mut sorter = RadixClusterSorter::<i32>::new(
//!     Arc::new(left),
//!     Arc::new(right),
//!     ("id", "id"),
//!     true, // equi join
//!     2,
//! )
//! .unwrap();
//! let (left_clusters, right_clusters) = sorter.execute().unwrap();
//! assert_eq!(left_clusters.len(), 2);
//! assert_eq!(right_clusters.len(), 2);
//! ```
//!
//! ## Modules
//!
//! - [`core`] - fundamental types ([`DataType`], [`Value`], [`Schema`], [`Error`])
//! - [`storage`] - chunked column-store tables and the table catalog
//! - [`executor`] - operators and the sort-merge join preparation pipeline
//! - [`optimizer`] - column statistics and selectivity estimation
//! - [`common`] - task scheduling facade and background loop utilities

pub mod common;
pub mod core;
pub mod executor;
pub mod optimizer;
pub mod storage;

// Re-export main types for convenience
pub use core::{
    AggregateFunction, ColumnDefinition, DataType, Error, Result, ScanType, Schema, Value,
};

// Re-export storage types
pub use storage::{Catalog, Chunk, ColumnSegment, RowId, Table};

// Re-export executor types
pub use executor::{
    Aggregate, AggregateDefinition, ClusterValue, ColumnMaterializer, ExportCsv, ImportCsv,
    MaterializedColumn, MaterializedColumnList, MaterializedValue, Operator, RadixClusterSorter,
    TableScan, TableWrapper,
};

// Re-export optimizer types
pub use optimizer::{ColumnStatistics, PredicateStatistics, TwoColumnPredicateStatistics};

// Re-export shared utilities
pub use common::PausableLoopThread;
