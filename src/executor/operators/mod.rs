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

//! Relational operators

pub mod aggregate;
pub mod export_csv;
pub mod import_csv;
pub mod table_scan;
pub mod table_wrapper;

pub use aggregate::{Aggregate, AggregateDefinition};
pub use export_csv::ExportCsv;
pub use import_csv::ImportCsv;
pub use table_scan::TableScan;
pub use table_wrapper::TableWrapper;
