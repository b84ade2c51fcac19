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

//! Per-column statistics and selectivity estimation
//!
//! A [`ColumnStatistics`] snapshot carries `(distinct count, min, max)` for
//! one column and prices predicates against it. Bound to a live table the
//! three fields are computed lazily through the aggregate operator and
//! cached; predicate estimation also produces derived snapshots describing
//! the rows that survive the predicate, which is what drives join ordering.
//!
//! The model assumes uniformly distributed values. Integer ranges count
//! `max - min + 1` possible values; float ranges use the width `max - min`.
//! Estimates are clamped into [0, 1]; the two-column equality formula can
//! exceed 1 on overlapping ranges, a known weakness of the model.

use std::sync::{Arc, Weak};

use crate::core::{AggregateFunction, DataType, Error, Result, ScanType, Value};
use crate::executor::operator::Operator;
use crate::executor::operators::{Aggregate, TableWrapper};
use crate::storage::Table;

/// Selectivity plus the statistics of the surviving rows
///
/// `column_statistics` is absent when the predicate is unsatisfiable,
/// always satisfied, or not estimated; the caller falls back to the input
/// statistics then.
#[derive(Debug)]
pub struct PredicateStatistics {
    pub selectivity: f64,
    pub column_statistics: Option<ColumnStatistics>,
}

impl PredicateStatistics {
    fn certain(selectivity: f64) -> Self {
        Self {
            selectivity,
            column_statistics: None,
        }
    }
}

/// Two-column predicate result: derived statistics for both sides
#[derive(Debug)]
pub struct TwoColumnPredicateStatistics {
    pub selectivity: f64,
    pub left_statistics: Option<ColumnStatistics>,
    pub right_statistics: Option<ColumnStatistics>,
}

impl TwoColumnPredicateStatistics {
    fn certain(selectivity: f64) -> Self {
        Self {
            selectivity,
            left_statistics: None,
            right_statistics: None,
        }
    }
}

/// Statistics snapshot of one table column
///
/// Either bound to a table (fields computed on first access) or created
/// from literal values (derived estimates). Once a field is materialized
/// it never changes.
#[derive(Debug, Clone)]
pub struct ColumnStatistics {
    column_id: usize,
    data_type: DataType,
    table: Weak<Table>,
    distinct_count: Option<f64>,
    min: Option<Value>,
    max: Option<Value>,
}

impl ColumnStatistics {
    /// Create lazily-filled statistics bound to a table
    pub fn from_table(column_id: usize, table: &Arc<Table>) -> Self {
        Self {
            column_id,
            data_type: table.schema().column_type(column_id),
            table: Arc::downgrade(table),
            distinct_count: None,
            min: None,
            max: None,
        }
    }

    /// Create statistics from literal values (no table behind them)
    pub fn with_values(column_id: usize, distinct_count: f64, min: Value, max: Value) -> Self {
        Self {
            column_id,
            data_type: min.data_type(),
            table: Weak::new(),
            distinct_count: Some(distinct_count),
            min: Some(min),
            max: Some(max),
        }
    }

    /// The column this snapshot describes
    pub fn column_id(&self) -> usize {
        self.column_id
    }

    /// The column's data type
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Number of distinct values, computed on first access
    pub fn distinct_count(&mut self) -> Result<f64> {
        if self.distinct_count.is_none() {
            self.update_distinct_count()?;
        }
        self.distinct_count
            .ok_or_else(|| Error::internal("distinct count not materialized"))
    }

    /// Minimum value, computed on first access
    pub fn min(&mut self) -> Result<Value> {
        if self.min.is_none() {
            self.update_min_max()?;
        }
        self.min
            .clone()
            .ok_or_else(|| Error::internal("min not materialized"))
    }

    /// Maximum value, computed on first access
    pub fn max(&mut self) -> Result<Value> {
        if self.max.is_none() {
            self.update_min_max()?;
        }
        self.max
            .clone()
            .ok_or_else(|| Error::internal("max not materialized"))
    }

    fn bound_table(&self) -> Result<Arc<Table>> {
        self.table.upgrade().ok_or(Error::TableGone)
    }

    /// Distinct count via a group-by-only aggregate: one output row per
    /// distinct value
    fn update_distinct_count(&mut self) -> Result<()> {
        let table = self.bound_table()?;
        let column_name = table.schema().column_name(self.column_id).to_string();
        let mut wrapper = TableWrapper::new(Arc::clone(&table));
        wrapper.execute()?;
        let mut aggregate = Aggregate::new(Box::new(wrapper), vec![], vec![column_name]);
        aggregate.execute()?;
        self.distinct_count = Some(aggregate.output()?.row_count() as f64);
        Ok(())
    }

    /// Min and max in one aggregate pass
    fn update_min_max(&mut self) -> Result<()> {
        let table = self.bound_table()?;
        let column_name = table.schema().column_name(self.column_id).to_string();
        let mut wrapper = TableWrapper::new(Arc::clone(&table));
        wrapper.execute()?;
        let mut aggregate = Aggregate::new(
            Box::new(wrapper),
            vec![
                (column_name.clone(), AggregateFunction::Min),
                (column_name, AggregateFunction::Max),
            ],
            vec![],
        );
        aggregate.execute()?;
        let output = aggregate.output()?;
        self.min = Some(output.get_value(0, 0)?);
        self.max = Some(output.get_value(1, 0)?);
        Ok(())
    }

    /// Estimate a constant-value predicate
    ///
    /// `Between` takes the upper bound as `value2`. Text columns estimate
    /// only `=` and `!=`; everything else is the `(1, none)` no-estimate
    /// sentinel.
    pub fn predicate_selectivity(
        &mut self,
        scan_type: ScanType,
        value: &Value,
        value2: Option<&Value>,
    ) -> Result<PredicateStatistics> {
        if self.data_type == DataType::Text {
            return self.text_predicate_selectivity(scan_type, value);
        }

        let casted = value.cast(self.data_type)?;
        let min = self.min()?;
        let max = self.max()?;
        let distinct = self.distinct_count()?;

        // Inclusive range width for integers, plain width for floats
        let adjust = if self.data_type.is_integer() { 1.0 } else { 0.0 };
        let lo = as_number(&min)?;
        let hi = as_number(&max)?;
        let v = as_number(&casted)?;
        let width = hi - lo + adjust;

        match scan_type {
            ScanType::Equals => {
                if casted.compare(&min)?.is_lt() || casted.compare(&max)?.is_gt() {
                    return Ok(PredicateStatistics::certain(0.0));
                }
                Ok(PredicateStatistics {
                    selectivity: clamp_selectivity(1.0 / distinct),
                    column_statistics: Some(Self::with_values(
                        self.column_id,
                        1.0,
                        casted.clone(),
                        casted,
                    )),
                })
            }
            ScanType::NotEquals => {
                if casted.compare(&min)?.is_lt() || casted.compare(&max)?.is_gt() {
                    return Ok(PredicateStatistics::certain(1.0));
                }
                Ok(PredicateStatistics {
                    selectivity: clamp_selectivity((distinct - 1.0) / distinct),
                    column_statistics: Some(Self::with_values(
                        self.column_id,
                        distinct - 1.0,
                        min,
                        max,
                    )),
                })
            }
            ScanType::LessThan if self.data_type.is_integer() => {
                if casted.compare(&min)?.is_le() {
                    return Ok(PredicateStatistics::certain(0.0));
                }
                let selectivity = clamp_selectivity((v - lo) / width);
                Ok(PredicateStatistics {
                    selectivity,
                    column_statistics: Some(Self::with_values(
                        self.column_id,
                        selectivity * distinct,
                        min,
                        int_pred(&casted),
                    )),
                })
            }
            // Float LessThan estimates like LessThanEquals: a continuous
            // domain has no mass at the bound itself
            ScanType::LessThan | ScanType::LessThanEquals => {
                let excluded = if scan_type == ScanType::LessThan {
                    casted.compare(&min)?.is_le()
                } else {
                    casted.compare(&min)?.is_lt()
                };
                if excluded {
                    return Ok(PredicateStatistics::certain(0.0));
                }
                if casted.compare(&max)?.is_ge() {
                    return Ok(PredicateStatistics::certain(1.0));
                }
                let selectivity = clamp_selectivity((v - lo + adjust) / width);
                Ok(PredicateStatistics {
                    selectivity,
                    column_statistics: Some(Self::with_values(
                        self.column_id,
                        selectivity * distinct,
                        min,
                        casted,
                    )),
                })
            }
            ScanType::GreaterThan if self.data_type.is_integer() => {
                if casted.compare(&max)?.is_ge() {
                    return Ok(PredicateStatistics::certain(0.0));
                }
                let selectivity = clamp_selectivity((hi - v) / width);
                Ok(PredicateStatistics {
                    selectivity,
                    column_statistics: Some(Self::with_values(
                        self.column_id,
                        selectivity * distinct,
                        int_succ(&casted),
                        max,
                    )),
                })
            }
            ScanType::GreaterThan | ScanType::GreaterThanEquals => {
                let excluded = if scan_type == ScanType::GreaterThan {
                    casted.compare(&max)?.is_ge()
                } else {
                    casted.compare(&max)?.is_gt()
                };
                if excluded {
                    return Ok(PredicateStatistics::certain(0.0));
                }
                if casted.compare(&min)?.is_le() {
                    return Ok(PredicateStatistics::certain(1.0));
                }
                let selectivity = clamp_selectivity((hi - v + adjust) / width);
                Ok(PredicateStatistics {
                    selectivity,
                    column_statistics: Some(Self::with_values(
                        self.column_id,
                        selectivity * distinct,
                        casted,
                        max,
                    )),
                })
            }
            ScanType::Between => {
                let second = value2.ok_or(Error::MissingPredicateValue)?;
                let casted2 = second.cast(self.data_type)?;
                if casted.compare(&casted2)?.is_gt()
                    || casted.compare(&max)?.is_gt()
                    || casted2.compare(&min)?.is_lt()
                {
                    return Ok(PredicateStatistics::certain(0.0));
                }
                // Clamp the bounds into the column's range
                let low = if casted.compare(&min)?.is_lt() {
                    min
                } else {
                    casted
                };
                let high = if casted2.compare(&max)?.is_gt() {
                    max
                } else {
                    casted2
                };
                let selectivity = clamp_selectivity(
                    (as_number(&high)? - as_number(&low)? + adjust) / width,
                );
                Ok(PredicateStatistics {
                    selectivity,
                    column_statistics: Some(Self::with_values(
                        self.column_id,
                        selectivity * distinct,
                        low,
                        high,
                    )),
                })
            }
        }
    }

    /// Text columns only estimate equality predicates
    fn text_predicate_selectivity(
        &mut self,
        scan_type: ScanType,
        value: &Value,
    ) -> Result<PredicateStatistics> {
        let casted = value.cast(DataType::Text)?;
        match scan_type {
            ScanType::Equals => {
                if casted.compare(&self.min()?)?.is_lt() || casted.compare(&self.max()?)?.is_gt() {
                    return Ok(PredicateStatistics::certain(0.0));
                }
                let distinct = self.distinct_count()?;
                Ok(PredicateStatistics {
                    selectivity: clamp_selectivity(1.0 / distinct),
                    column_statistics: Some(Self::with_values(
                        self.column_id,
                        1.0,
                        casted.clone(),
                        casted,
                    )),
                })
            }
            ScanType::NotEquals => {
                let min = self.min()?;
                let max = self.max()?;
                if casted.compare(&min)?.is_lt() || casted.compare(&max)?.is_gt() {
                    return Ok(PredicateStatistics::certain(1.0));
                }
                let distinct = self.distinct_count()?;
                Ok(PredicateStatistics {
                    selectivity: clamp_selectivity((distinct - 1.0) / distinct),
                    column_statistics: Some(Self::with_values(
                        self.column_id,
                        distinct - 1.0,
                        min,
                        max,
                    )),
                })
            }
            _ => Ok(PredicateStatistics::certain(1.0)),
        }
    }

    /// Estimate a two-column predicate
    ///
    /// Only equality is modeled: the ranges' overlap bounds the distinct
    /// values both sides can share. The formula can exceed 1 and is clamped
    /// (known model weakness). Columns of different types cannot be
    /// compared.
    pub fn predicate_selectivity_columns(
        &mut self,
        scan_type: ScanType,
        other: &mut ColumnStatistics,
        _value2: Option<&Value>,
    ) -> Result<TwoColumnPredicateStatistics> {
        if self.data_type != other.data_type {
            return Err(Error::type_mismatch(
                self.data_type.to_string(),
                other.data_type.to_string(),
            ));
        }
        if self.data_type == DataType::Text {
            return Ok(TwoColumnPredicateStatistics::certain(1.0));
        }
        if scan_type != ScanType::Equals {
            return Ok(TwoColumnPredicateStatistics::certain(1.0));
        }

        let common_min = max_value(self.min()?, other.min()?)?;
        let common_max = min_value(self.max()?, other.max()?)?;
        if common_min.compare(&common_max)?.is_gt() {
            return Ok(TwoColumnPredicateStatistics::certain(0.0));
        }

        let adjust = if self.data_type.is_integer() { 1.0 } else { 0.0 };
        let overlap = as_number(&common_max)? - as_number(&common_min)? + adjust;
        let width_self = as_number(&self.max()?)? - as_number(&self.min()?)? + adjust;
        let width_other = as_number(&other.max()?)? - as_number(&other.min()?)? + adjust;

        let distinct_self = self.distinct_count()?;
        let distinct_other = other.distinct_count()?;
        let overlapping_distinct = f64::min(
            overlap / width_self * distinct_self,
            overlap / width_other * distinct_other,
        );
        // Probability that a probe value hits the other side at all
        let hit_ratio = distinct_other / distinct_self;
        let selectivity = clamp_selectivity(overlapping_distinct * hit_ratio);

        Ok(TwoColumnPredicateStatistics {
            selectivity,
            left_statistics: Some(Self::with_values(
                self.column_id,
                overlapping_distinct,
                common_min.clone(),
                common_max.clone(),
            )),
            right_statistics: Some(Self::with_values(
                other.column_id,
                overlapping_distinct,
                common_min,
                common_max,
            )),
        })
    }

    /// Estimate a predicate against a prepared-statement placeholder
    ///
    /// The parameter is assumed to be uniformly distributed over the
    /// column's domain.
    pub fn predicate_selectivity_placeholder(
        &mut self,
        scan_type: ScanType,
        _value2: Option<&Value>,
    ) -> Result<PredicateStatistics> {
        match scan_type {
            ScanType::Equals => {
                let distinct = self.distinct_count()?;
                let (min, max) = (self.min()?, self.max()?);
                Ok(PredicateStatistics {
                    selectivity: clamp_selectivity(1.0 / distinct),
                    column_statistics: Some(Self::with_values(self.column_id, 1.0, min, max)),
                })
            }
            ScanType::NotEquals => {
                let distinct = self.distinct_count()?;
                let (min, max) = (self.min()?, self.max()?);
                Ok(PredicateStatistics {
                    selectivity: clamp_selectivity((distinct - 1.0) / distinct),
                    column_statistics: Some(Self::with_values(
                        self.column_id,
                        distinct - 1.0,
                        min,
                        max,
                    )),
                })
            }
            _ => Ok(PredicateStatistics::certain(1.0)),
        }
    }
}

/// Numeric view of a value; text has no numeric interpretation
fn as_number(value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| Error::type_mismatch("numeric", value.data_type().to_string()))
}

/// Clamp an estimate into [0, 1]; a degenerate zero-width range estimates 1
fn clamp_selectivity(selectivity: f64) -> f64 {
    if selectivity.is_nan() {
        return 1.0;
    }
    selectivity.clamp(0.0, 1.0)
}

/// Predecessor of an integer value, for derived upper bounds of `<`
fn int_pred(value: &Value) -> Value {
    match value {
        Value::Int(v) => Value::Int(v - 1),
        Value::BigInt(v) => Value::BigInt(v - 1),
        other => other.clone(),
    }
}

/// Successor of an integer value, for derived lower bounds of `>`
fn int_succ(value: &Value) -> Value {
    match value {
        Value::Int(v) => Value::Int(v + 1),
        Value::BigInt(v) => Value::BigInt(v + 1),
        other => other.clone(),
    }
}

fn max_value(a: Value, b: Value) -> Result<Value> {
    Ok(if a.compare(&b)?.is_ge() { a } else { b })
}

fn min_value(a: Value, b: Value) -> Result<Value> {
    Ok(if a.compare(&b)?.is_le() { a } else { b })
}
