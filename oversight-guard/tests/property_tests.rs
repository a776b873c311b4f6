//! Property-based tests for the oversight-guard intents and detectors.
//!
//! This module uses proptest to check invariants of the aspects, the intents
//! and the detectors over a wide range of generated tables.
//!
//! ## Test Categories
//!
//! ### 1. Aspects
//! - Applying a date range twice keeps the same rows as applying it once
//! - Proportion operators produce shares that sum to 1
//!
//! ### 2. Top-k
//! - A bounded top-k never returns more than `k` rows
//! - Ties keep the grouping order of their dimension values
//!
//! ### 3. Detectors
//! - Mean vs median stays silent on two points or fewer
//! - Relation between two numbers is always within `[0, 1]`
//!
//! ## Test Data Generation
//!
//! - `create_people_table`: one row per person with the given metric values
//! - `create_dated_table`: one row per generated day offset

use chrono::{Duration, NaiveDate};
use oversight_guard::aspects::apply_date_range;
use oversight_guard::oversights::mean_vs_median::mean_vs_median;
use oversight_guard::oversights::similarity::relation;
use oversight_guard::prelude::*;
use proptest::prelude::*;

// ============================================================================
// Test Data Generation Utilities
// ============================================================================

fn create_people_table(values: &[f64]) -> Table {
    Table::builder()
        .text("person", (0..values.len()).map(|i| format!("p{i:04}")))
        .numeric("sales", values.iter().copied())
        .build()
        .unwrap()
}

fn create_dated_table(offsets: &[i64]) -> Table {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    Table::builder()
        .date(
            "date",
            offsets
                .iter()
                .map(|d| (start + Duration::days(*d)).format("%Y-%m-%d").to_string()),
        )
        .numeric("sales", offsets.iter().map(|d| *d as f64))
        .build()
        .unwrap()
}

fn create_sum_query() -> Query {
    Query::new()
        .with_metric("sales")
        .with_dimensions(["person"])
        .with_summary_operator(SummaryOperator::Sum)
}

// ============================================================================
// Aspect Properties
// ============================================================================

proptest! {
    /// Tests that a date range filter is idempotent.
    #[test]
    fn test_date_range_idempotent_property(
        offsets in prop::collection::vec(0i64..365, 0..60),
        window_start in 0i64..200,
        window_length in 0i64..150
    ) {
        let table = create_dated_table(&offsets);
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(window_start);
        let end = start + Duration::days(window_length);
        let range = DateRange::new(
            start.format("%Y-%m-%d").to_string(),
            end.format("%Y-%m-%d").to_string(),
        );

        let once = apply_date_range(&table, Some(&range), "date", false).unwrap();
        let twice = apply_date_range(&once, Some(&range), "date", false).unwrap();
        prop_assert_eq!(&once, &twice);

        let expected = offsets
            .iter()
            .filter(|d| **d >= window_start && **d <= window_start + window_length)
            .count();
        prop_assert_eq!(once.num_rows(), expected);
    }

    /// Tests that proportion of sum yields shares summing to 1 for a non-zero total.
    #[test]
    fn test_proportion_of_sum_property(
        values in prop::collection::vec(1f64..1000.0, 1..40)
    ) {
        let table = Table::builder()
            .text("city", (0..values.len()).map(|i| format!("c{}", i % 5)))
            .numeric("sales", values.iter().copied())
            .build()
            .unwrap();
        let query = Query::new()
            .with_metric("sales")
            .with_dimensions(["city"])
            .with_summary_operator(SummaryOperator::ProportionOfSum);

        let response = OversightEngine::default().show(&table, &query).unwrap();
        let shares = response.table.columns()[1].numbers();
        let total: f64 = shares.iter().sum();
        prop_assert!((total - 1.0).abs() < 1e-9);
        prop_assert!(shares.iter().all(|s| *s > 0.0 && *s <= 1.0));
    }
}

// ============================================================================
// Top-k Properties
// ============================================================================

proptest! {
    /// Tests that a bounded top-k never returns more than k rows.
    #[test]
    fn test_topk_row_count_property(
        values in prop::collection::vec(-1000f64..1000.0, 1..50),
        k in 1i64..60,
        ascending in any::<bool>()
    ) {
        let table = create_people_table(&values);
        let response = OversightEngine::default()
            .topk(&table, &create_sum_query(), k, ascending)
            .unwrap();

        let expected = values.len().min(k as usize);
        prop_assert_eq!(response.table.num_rows(), expected);

        let ranked = response.table.column("Sum of sales").unwrap().numbers();
        let ordered = ranked.windows(2).all(|w| if ascending { w[0] <= w[1] } else { w[0] >= w[1] });
        prop_assert!(ordered);
    }

    /// Tests that ties keep the order of their dimension values.
    #[test]
    fn test_topk_stable_ties_property(
        rows in 2usize..30,
        value in -100f64..100.0,
        k in 1i64..30
    ) {
        let table = create_people_table(&vec![value; rows]);
        let response = OversightEngine::default()
            .topk(&table, &create_sum_query(), k, false)
            .unwrap();

        let expected: Vec<Value> = (0..rows.min(k as usize))
            .map(|i| Value::from(format!("p{i:04}")))
            .collect();
        prop_assert_eq!(&response.table.column("person").unwrap().values, &expected);
    }
}

// ============================================================================
// Detector Properties
// ============================================================================

proptest! {
    /// Tests that mean vs median needs at least three points.
    #[test]
    fn test_mean_vs_median_small_input_property(
        values in prop::collection::vec(-1e6f64..1e6, 0..=2),
        bound in 0f64..5.0
    ) {
        prop_assert!(mean_vs_median(&values, bound).is_none());
    }

    /// Tests that relation stays within [0, 1] and is symmetric.
    #[test]
    fn test_relation_bounds_property(
        a in -1e6f64..1e6,
        b in -1e6f64..1e6
    ) {
        let r = relation(a, b);
        prop_assert!((0.0..=1.0).contains(&r));
        prop_assert!((r - relation(b, a)).abs() < 1e-12);
    }
}
