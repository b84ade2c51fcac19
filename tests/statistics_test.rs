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

//! Tests for column statistics and the selectivity estimator

use std::sync::Arc;

use stratum::core::{ColumnDefinition, DataType, Error, ScanType, Schema, Value};
use stratum::optimizer::ColumnStatistics;
use stratum::storage::Table;

const EPS: f64 = 1e-9;

/// min=10, max=20, distinct=5 - the reference column of the scenarios
fn reference_stats() -> ColumnStatistics {
    ColumnStatistics::with_values(0, 5.0, Value::Int(10), Value::Int(20))
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPS,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn test_equals_hit_produces_point_statistics() {
    let mut stats = reference_stats();
    let result = stats
        .predicate_selectivity(ScanType::Equals, &Value::Int(15), None)
        .expect("estimate");
    assert_close(result.selectivity, 0.2);

    let mut derived = result.column_statistics.expect("derived stats");
    assert_close(derived.distinct_count().unwrap(), 1.0);
    assert_eq!(derived.min().unwrap(), Value::Int(15));
    assert_eq!(derived.max().unwrap(), Value::Int(15));
}

#[test]
fn test_equals_outside_range_is_unsatisfiable() {
    let mut stats = reference_stats();
    let result = stats
        .predicate_selectivity(ScanType::Equals, &Value::Int(25), None)
        .expect("estimate");
    assert_eq!(result.selectivity, 0.0);
    assert!(result.column_statistics.is_none());
}

#[test]
fn test_not_equals() {
    let mut stats = reference_stats();
    let inside = stats
        .predicate_selectivity(ScanType::NotEquals, &Value::Int(12), None)
        .expect("estimate");
    assert_close(inside.selectivity, 0.8);
    let mut derived = inside.column_statistics.expect("derived stats");
    assert_close(derived.distinct_count().unwrap(), 4.0);
    assert_eq!(derived.min().unwrap(), Value::Int(10));
    assert_eq!(derived.max().unwrap(), Value::Int(20));

    let outside = stats
        .predicate_selectivity(ScanType::NotEquals, &Value::Int(9), None)
        .expect("estimate");
    assert_eq!(outside.selectivity, 1.0);
    assert!(outside.column_statistics.is_none());
}

#[test]
fn test_between_scenario() {
    let mut stats = reference_stats();
    let result = stats
        .predicate_selectivity(ScanType::Between, &Value::Int(12), Some(&Value::Int(18)))
        .expect("estimate");
    assert_close(result.selectivity, 7.0 / 11.0);

    let mut derived = result.column_statistics.expect("derived stats");
    assert_eq!(derived.min().unwrap(), Value::Int(12));
    assert_eq!(derived.max().unwrap(), Value::Int(18));
    assert_close(derived.distinct_count().unwrap(), 7.0 / 11.0 * 5.0);
}

#[test]
fn test_between_clamps_bounds_into_range() {
    let mut stats = reference_stats();
    let result = stats
        .predicate_selectivity(ScanType::Between, &Value::Int(5), Some(&Value::Int(15)))
        .expect("estimate");
    assert_close(result.selectivity, 6.0 / 11.0);
    let mut derived = result.column_statistics.expect("derived stats");
    assert_eq!(derived.min().unwrap(), Value::Int(10));
    assert_eq!(derived.max().unwrap(), Value::Int(15));
}

#[test]
fn test_between_unsatisfiable_cases() {
    let mut stats = reference_stats();
    for (low, high) in [(18, 12), (25, 30), (2, 8)] {
        let result = stats
            .predicate_selectivity(
                ScanType::Between,
                &Value::Int(low),
                Some(&Value::Int(high)),
            )
            .expect("estimate");
        assert_eq!(result.selectivity, 0.0, "BETWEEN {} AND {}", low, high);
        assert!(result.column_statistics.is_none());
    }
}

#[test]
fn test_between_requires_second_value() {
    let mut stats = reference_stats();
    let err = stats
        .predicate_selectivity(ScanType::Between, &Value::Int(12), None)
        .unwrap_err();
    assert!(matches!(err, Error::MissingPredicateValue));
}

#[test]
fn test_integer_range_predicates() {
    let mut stats = reference_stats();

    let lt = stats
        .predicate_selectivity(ScanType::LessThan, &Value::Int(14), None)
        .expect("estimate");
    assert_close(lt.selectivity, 4.0 / 11.0);
    let mut derived = lt.column_statistics.expect("derived");
    assert_eq!(derived.max().unwrap(), Value::Int(13));

    let lte = stats
        .predicate_selectivity(ScanType::LessThanEquals, &Value::Int(14), None)
        .expect("estimate");
    assert_close(lte.selectivity, 5.0 / 11.0);

    let gt = stats
        .predicate_selectivity(ScanType::GreaterThan, &Value::Int(14), None)
        .expect("estimate");
    assert_close(gt.selectivity, 6.0 / 11.0);
    let mut derived = gt.column_statistics.expect("derived");
    assert_eq!(derived.min().unwrap(), Value::Int(15));

    let gte = stats
        .predicate_selectivity(ScanType::GreaterThanEquals, &Value::Int(14), None)
        .expect("estimate");
    assert_close(gte.selectivity, 7.0 / 11.0);
}

#[test]
fn test_range_boundary_certainties() {
    let mut stats = reference_stats();

    // Unsatisfiable edges
    for (scan_type, value) in [
        (ScanType::LessThan, 10),
        (ScanType::LessThanEquals, 9),
        (ScanType::GreaterThan, 20),
        (ScanType::GreaterThanEquals, 21),
    ] {
        let result = stats
            .predicate_selectivity(scan_type, &Value::Int(value), None)
            .expect("estimate");
        assert_eq!(result.selectivity, 0.0, "{} {}", scan_type, value);
        assert!(result.column_statistics.is_none());
    }

    // Always-satisfied edges
    for (scan_type, value) in [
        (ScanType::LessThanEquals, 20),
        (ScanType::GreaterThanEquals, 10),
    ] {
        let result = stats
            .predicate_selectivity(scan_type, &Value::Int(value), None)
            .expect("estimate");
        assert_eq!(result.selectivity, 1.0, "{} {}", scan_type, value);
        assert!(result.column_statistics.is_none());
    }
}

#[test]
fn test_selectivity_bounds_hold_everywhere() {
    let mut stats = reference_stats();
    let scan_types = [
        ScanType::Equals,
        ScanType::NotEquals,
        ScanType::LessThan,
        ScanType::LessThanEquals,
        ScanType::GreaterThan,
        ScanType::GreaterThanEquals,
    ];
    for scan_type in scan_types {
        for v in 0..35 {
            let result = stats
                .predicate_selectivity(scan_type, &Value::Int(v), None)
                .expect("estimate");
            assert!(
                (0.0..=1.0).contains(&result.selectivity),
                "{} {} out of bounds: {}",
                scan_type,
                v,
                result.selectivity
            );
        }
    }
}

#[test]
fn test_less_than_is_monotonic() {
    let mut stats = reference_stats();
    let mut previous = -1.0;
    for v in 5..30 {
        let result = stats
            .predicate_selectivity(ScanType::LessThan, &Value::Int(v), None)
            .expect("estimate");
        assert!(
            result.selectivity >= previous,
            "P(col < {}) dropped below P(col < {})",
            v,
            v - 1
        );
        previous = result.selectivity;
    }
}

#[test]
fn test_float_column_formulas() {
    let mut stats = ColumnStatistics::with_values(0, 4.0, Value::Double(0.0), Value::Double(8.0));

    // Float ranges use width max - min, and < estimates like <=
    let lt = stats
        .predicate_selectivity(ScanType::LessThan, &Value::Double(2.0), None)
        .expect("estimate");
    assert_close(lt.selectivity, 0.25);

    let gte = stats
        .predicate_selectivity(ScanType::GreaterThanEquals, &Value::Double(6.0), None)
        .expect("estimate");
    assert_close(gte.selectivity, 0.25);
    let mut derived = gte.column_statistics.expect("derived");
    assert_eq!(derived.min().unwrap(), Value::Double(6.0));
    assert_eq!(derived.max().unwrap(), Value::Double(8.0));

    let between = stats
        .predicate_selectivity(
            ScanType::Between,
            &Value::Double(2.0),
            Some(&Value::Double(6.0)),
        )
        .expect("estimate");
    assert_close(between.selectivity, 0.5);
}

#[test]
fn test_text_supports_only_equality() {
    let mut stats =
        ColumnStatistics::with_values(0, 4.0, Value::text("alpha"), Value::text("romeo"));

    let eq = stats
        .predicate_selectivity(ScanType::Equals, &Value::text("golf"), None)
        .expect("estimate");
    assert_close(eq.selectivity, 0.25);

    let miss = stats
        .predicate_selectivity(ScanType::Equals, &Value::text("zulu"), None)
        .expect("estimate");
    assert_eq!(miss.selectivity, 0.0);

    let ne = stats
        .predicate_selectivity(ScanType::NotEquals, &Value::text("golf"), None)
        .expect("estimate");
    assert_close(ne.selectivity, 0.75);

    // No estimate for ordering predicates on text
    let lt = stats
        .predicate_selectivity(ScanType::LessThan, &Value::text("golf"), None)
        .expect("estimate");
    assert_eq!(lt.selectivity, 1.0);
    assert!(lt.column_statistics.is_none());
}

#[test]
fn test_two_column_equality_overlap() {
    // A: [0, 10] d=11, B: [5, 15] d=11 -> common range [5, 10], overlap 6
    let mut left = ColumnStatistics::with_values(0, 11.0, Value::Int(0), Value::Int(10));
    let mut right = ColumnStatistics::with_values(1, 11.0, Value::Int(5), Value::Int(15));

    let result = left
        .predicate_selectivity_columns(ScanType::Equals, &mut right, None)
        .expect("estimate");

    // The raw formula yields 6 here; the estimate must be clamped to 1
    assert_eq!(result.selectivity, 1.0);

    let mut left_derived = result.left_statistics.expect("left derived");
    let mut right_derived = result.right_statistics.expect("right derived");
    for derived in [&mut left_derived, &mut right_derived] {
        assert_close(derived.distinct_count().unwrap(), 6.0);
        assert_eq!(derived.min().unwrap(), Value::Int(5));
        assert_eq!(derived.max().unwrap(), Value::Int(10));
    }
    assert_eq!(left_derived.column_id(), 0);
    assert_eq!(right_derived.column_id(), 1);
}

#[test]
fn test_two_column_disjoint_ranges() {
    let mut left = ColumnStatistics::with_values(0, 5.0, Value::Int(0), Value::Int(9));
    let mut right = ColumnStatistics::with_values(1, 5.0, Value::Int(20), Value::Int(29));
    let result = left
        .predicate_selectivity_columns(ScanType::Equals, &mut right, None)
        .expect("estimate");
    assert_eq!(result.selectivity, 0.0);
    assert!(result.left_statistics.is_none());
    assert!(result.right_statistics.is_none());
}

#[test]
fn test_two_column_unestimated_predicates() {
    let mut left = ColumnStatistics::with_values(0, 5.0, Value::Int(0), Value::Int(9));
    let mut right = ColumnStatistics::with_values(1, 5.0, Value::Int(5), Value::Int(14));
    let result = left
        .predicate_selectivity_columns(ScanType::LessThan, &mut right, None)
        .expect("estimate");
    assert_eq!(result.selectivity, 1.0);
    assert!(result.left_statistics.is_none());

    let mut text_left =
        ColumnStatistics::with_values(0, 5.0, Value::text("a"), Value::text("m"));
    let mut text_right =
        ColumnStatistics::with_values(1, 5.0, Value::text("c"), Value::text("z"));
    let result = text_left
        .predicate_selectivity_columns(ScanType::Equals, &mut text_right, None)
        .expect("estimate");
    assert_eq!(result.selectivity, 1.0);
}

#[test]
fn test_lazy_statistics_from_table() {
    let schema = Schema::with_chunk_size(
        vec![
            ColumnDefinition::new("id", DataType::Int),
            ColumnDefinition::new("price", DataType::Int),
        ],
        2,
    )
    .expect("schema");
    let mut table = Table::new(schema);
    for (id, price) in [(1, 14), (2, 10), (3, 20), (4, 14), (5, 16)] {
        table
            .append_row(vec![Value::Int(id), Value::Int(price)])
            .expect("append");
    }
    let table = Arc::new(table);

    let mut stats = ColumnStatistics::from_table(1, &table);
    assert_close(stats.distinct_count().expect("distinct"), 4.0);
    assert_eq!(stats.min().expect("min"), Value::Int(10));
    assert_eq!(stats.max().expect("max"), Value::Int(20));

    // Statistics are a snapshot: the predicate estimate uses the cached
    // values even though the table is still alive
    let result = stats
        .predicate_selectivity(ScanType::Equals, &Value::Int(14), None)
        .expect("estimate");
    assert_close(result.selectivity, 0.25);
}

#[test]
fn test_constant_cast_to_column_type() {
    let mut stats = reference_stats();
    // A BIGINT constant against an INT column narrows before estimating
    let result = stats
        .predicate_selectivity(ScanType::Equals, &Value::BigInt(15), None)
        .expect("estimate");
    assert_close(result.selectivity, 0.2);

    // Text constants cannot be cast to a numeric column
    let err = stats
        .predicate_selectivity(ScanType::Equals, &Value::text("x"), None)
        .unwrap_err();
    assert!(err.is_type_error());
}
