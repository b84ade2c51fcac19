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

//! Hash aggregation operator
//!
//! Groups the input by a list of columns and computes aggregates per group.
//! The output carries the group-by columns first, then one column per
//! aggregate in the order supplied; its row count equals the number of
//! distinct group keys. With an empty aggregate list this is a DISTINCT
//! over the group-by columns, which is how the statistics layer obtains
//! distinct counts.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::core::{
    AggregateFunction, ColumnDefinition, DataType, Error, Result, Schema, Value,
};
use crate::storage::Table;

use super::super::operator::{Operator, OutputSlot};

/// One requested aggregate: column name plus function
pub type AggregateDefinition = (String, AggregateFunction);

/// Composite group-by key with bit-exact value equality
struct GroupKey(SmallVec<[Value; 4]>);

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self.0.iter().zip(other.0.iter()).all(|(a, b)| a.key_eq(b))
    }
}

impl Eq for GroupKey {}

impl Hash for GroupKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for value in &self.0 {
            value.key_hash(state);
        }
    }
}

/// Running state for one aggregate within one group
enum AggregateState {
    MinMax { current: Option<Value>, is_min: bool },
    SumInt(i64),
    SumFloat(f64),
    Count(u64),
    Avg { sum: f64, count: u64 },
}

impl AggregateState {
    fn new(function: AggregateFunction, input_type: DataType) -> Self {
        match function {
            AggregateFunction::Min => AggregateState::MinMax {
                current: None,
                is_min: true,
            },
            AggregateFunction::Max => AggregateState::MinMax {
                current: None,
                is_min: false,
            },
            AggregateFunction::Sum if input_type.is_integer() => AggregateState::SumInt(0),
            AggregateFunction::Sum => AggregateState::SumFloat(0.0),
            AggregateFunction::Count => AggregateState::Count(0),
            AggregateFunction::Avg => AggregateState::Avg { sum: 0.0, count: 0 },
        }
    }

    fn update(&mut self, value: &Value) -> Result<()> {
        match self {
            AggregateState::MinMax { current, is_min } => {
                let replace = match current {
                    None => true,
                    Some(best) => {
                        let ordering = value.compare(best)?;
                        if *is_min {
                            ordering.is_lt()
                        } else {
                            ordering.is_gt()
                        }
                    }
                };
                if replace {
                    *current = Some(value.clone());
                }
            }
            AggregateState::SumInt(sum) => {
                *sum += match value {
                    Value::Int(v) => *v as i64,
                    Value::BigInt(v) => *v,
                    other => {
                        return Err(Error::type_mismatch(
                            "INT or BIGINT",
                            other.data_type().to_string(),
                        ))
                    }
                };
            }
            AggregateState::SumFloat(sum) => {
                *sum += value.as_f64().ok_or_else(|| {
                    Error::type_mismatch("numeric", value.data_type().to_string())
                })?;
            }
            AggregateState::Count(count) => *count += 1,
            AggregateState::Avg { sum, count } => {
                *sum += value.as_f64().ok_or_else(|| {
                    Error::type_mismatch("numeric", value.data_type().to_string())
                })?;
                *count += 1;
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<Value> {
        match self {
            AggregateState::MinMax { current, .. } => {
                current.ok_or_else(|| Error::internal("aggregate over empty group"))
            }
            AggregateState::SumInt(sum) => Ok(Value::BigInt(sum)),
            AggregateState::SumFloat(sum) => Ok(Value::Double(sum)),
            AggregateState::Count(count) => Ok(Value::BigInt(count as i64)),
            AggregateState::Avg { sum, count } => Ok(Value::Double(sum / count.max(1) as f64)),
        }
    }
}

/// Hash aggregation over one input operator
pub struct Aggregate {
    input: Box<dyn Operator>,
    aggregates: Vec<AggregateDefinition>,
    group_by: Vec<String>,
    output: OutputSlot,
}

impl Aggregate {
    /// Create an aggregation over the input's output table
    pub fn new(
        input: Box<dyn Operator>,
        aggregates: Vec<AggregateDefinition>,
        group_by: Vec<String>,
    ) -> Self {
        Self {
            input,
            aggregates,
            group_by,
            output: OutputSlot::new(),
        }
    }

    fn output_type(function: AggregateFunction, input_type: DataType) -> Result<DataType> {
        match function {
            AggregateFunction::Min | AggregateFunction::Max => Ok(input_type),
            AggregateFunction::Count => Ok(DataType::BigInt),
            AggregateFunction::Sum if input_type.is_integer() => Ok(DataType::BigInt),
            AggregateFunction::Sum | AggregateFunction::Avg => {
                if input_type.is_numeric() {
                    Ok(DataType::Double)
                } else {
                    Err(Error::type_mismatch("numeric", input_type.to_string()))
                }
            }
        }
    }
}

impl Operator for Aggregate {
    fn name(&self) -> &str {
        "Aggregate"
    }

    fn execute(&mut self) -> Result<()> {
        self.output.check_not_executed(self.name())?;
        let input = self.input.output()?;
        let schema = input.schema();

        // Resolve all referenced columns up front
        let group_ids: Vec<usize> = self
            .group_by
            .iter()
            .map(|name| schema.column_id(name))
            .collect::<Result<_>>()?;
        let aggregate_ids: Vec<usize> = self
            .aggregates
            .iter()
            .map(|(name, _)| schema.column_id(name))
            .collect::<Result<_>>()?;

        // Output schema: group columns first, aggregates in supplied order
        let mut output_columns: Vec<ColumnDefinition> = group_ids
            .iter()
            .map(|&id| ColumnDefinition::new(schema.column_name(id), schema.column_type(id)))
            .collect();
        for ((name, function), &id) in self.aggregates.iter().zip(&aggregate_ids) {
            let output_type = Self::output_type(*function, schema.column_type(id))?;
            output_columns.push(ColumnDefinition::new(
                format!("{}({})", function, name),
                output_type,
            ));
        }
        let output_schema = Schema::with_chunk_size(output_columns, schema.chunk_size())?;

        // Group in first-seen key order so results are deterministic
        let mut group_index: FxHashMap<GroupKey, usize> = FxHashMap::default();
        let mut group_keys: Vec<SmallVec<[Value; 4]>> = Vec::new();
        let mut group_states: Vec<Vec<AggregateState>> = Vec::new();

        for chunk_id in 0..input.chunk_count() {
            let chunk = input.chunk(chunk_id);
            for offset in 0..chunk.row_count() {
                let key: SmallVec<[Value; 4]> = group_ids
                    .iter()
                    .map(|&id| chunk.column(id).value_at(offset))
                    .collect();
                let group = match group_index.get(&GroupKey(key.clone())).copied() {
                    Some(group) => group,
                    None => {
                        let group = group_states.len();
                        group_index.insert(GroupKey(key.clone()), group);
                        group_keys.push(key);
                        group_states.push(
                            self.aggregates
                                .iter()
                                .zip(&aggregate_ids)
                                .map(|((_, function), &id)| {
                                    AggregateState::new(*function, schema.column_type(id))
                                })
                                .collect(),
                        );
                        group
                    }
                };
                let states = &mut group_states[group];
                for (state, &id) in states.iter_mut().zip(&aggregate_ids) {
                    state.update(&chunk.column(id).value_at(offset))?;
                }
            }
        }

        let mut result = Table::new(output_schema);
        for (key, states) in group_keys.into_iter().zip(group_states) {
            let mut row: Vec<Value> = key.into_vec();
            for state in states {
                row.push(state.finish()?);
            }
            result.append_row(row)?;
        }

        self.output.fill(Arc::new(result));
        Ok(())
    }

    fn output(&self) -> Result<Arc<Table>> {
        self.output.get(self.name())
    }
}
