//! Calendar vs experience in time series.
//!
//! Two slices compared over the same calendar window may be at very different
//! points of their own history: one may have most of its entries before the
//! other even starts.

use super::runner::{DetectionInput, OversightDetector};
use super::{OversightKind, Suggestion};
use crate::aspects::{prepare, Predicate};
use crate::error::{OversightError, Result};
use crate::intents::Query;
use crate::table::{parse_date, Table, Value};

/// Share of the earlier slice's dates that precede the later slice's first date.
///
/// Only applies when the query has a date range and no dimensions.
pub fn calendar_vs_experience(
    table: &Table,
    query: &Query,
    column: &str,
    slice1: &Value,
    slice2: &Value,
    threshold: f64,
) -> Result<Option<Suggestion>> {
    if query.date_range.is_none() || !query.dimensions.is_empty() {
        return Ok(None);
    }
    let prepared = prepare(table, query)?;
    let slices = &prepared.column(column)?.values;
    let dates = &prepared.column(&query.date_column)?.values;

    let mut first = Vec::new();
    let mut second = Vec::new();
    for (slice, date) in slices.iter().zip(dates) {
        let target = if slice == slice1 {
            &mut first
        } else if slice == slice2 {
            &mut second
        } else {
            continue;
        };
        let text = date
            .as_str()
            .ok_or_else(|| OversightError::date_parse(date.to_string(), query.day_first))?;
        target.push(parse_date(text, query.day_first)?);
    }
    if first.is_empty() || second.is_empty() {
        return Ok(None);
    }
    first.sort();
    second.sort();
    if first[0] > second[0] {
        std::mem::swap(&mut first, &mut second);
    }

    let later_start = second[0];
    let before = first.iter().filter(|d| **d < later_start).count();
    let fraction = before as f64 / first.len() as f64;
    Ok((fraction > threshold).then(|| {
        Suggestion::new(
            OversightKind::CalendarVsExperienceInTimeSeries,
            "The entries in the date range mentioned are not consistent for both the slices",
        )
        .with_confidence(fraction)
    }))
}

#[derive(Debug, Clone, Copy)]
pub struct CalendarVsExperience<'a> {
    column: &'a str,
    slice1: &'a Value,
    slice2: &'a Value,
}

impl<'a> CalendarVsExperience<'a> {
    pub fn new(column: &'a str, slice1: &'a Value, slice2: &'a Value) -> Self {
        Self {
            column,
            slice1,
            slice2,
        }
    }
}

impl OversightDetector for CalendarVsExperience<'_> {
    fn kind(&self) -> OversightKind {
        OversightKind::CalendarVsExperienceInTimeSeries
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Result<Vec<Suggestion>> {
        let query = input
            .query
            .clone()
            .with_slice(Predicate::is_in(self.column, [self.slice1.clone(), self.slice2.clone()]));
        Ok(calendar_vs_experience(
            input.table,
            &query,
            self.column,
            self.slice1,
            self.slice2,
            input.config.calendar_experience_threshold,
        )?
        .into_iter()
        .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::DateRange;

    fn create_test_table() -> Table {
        Table::builder()
            .date(
                "date",
                [
                    "2020-01-01", "2020-01-02", "2020-01-03", "2020-01-04", "2020-01-05", "2020-01-20",
                    "2020-01-21",
                ],
            )
            .text("app", ["old", "old", "old", "old", "old", "new", "new"])
            .numeric("installs", [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0])
            .build()
            .unwrap()
    }

    fn create_test_query() -> Query {
        Query::new()
            .with_metric("installs")
            .with_date_range(DateRange::new("2020-01-01", "2020-01-31"))
    }

    #[test]
    fn test_staggered_slices_flagged() {
        // slice order does not matter
        let suggestion = calendar_vs_experience(
            &create_test_table(),
            &create_test_query(),
            "app",
            &Value::from("new"),
            &Value::from("old"),
            0.8,
        )
        .unwrap()
        .unwrap();
        assert_eq!(suggestion.confidence_score, Some(1.0));
    }

    #[test]
    fn test_needs_date_range_and_no_dimensions() {
        let table = create_test_table();
        let without_range = Query::new().with_metric("installs");
        assert!(calendar_vs_experience(&table, &without_range, "app", &Value::from("old"), &Value::from("new"), 0.8)
            .unwrap()
            .is_none());
        let with_dims = create_test_query().with_dimensions(["app"]);
        assert!(calendar_vs_experience(&table, &with_dims, "app", &Value::from("old"), &Value::from("new"), 0.8)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_overlapping_slices_are_silent() {
        let table = Table::builder()
            .date("date", ["2020-01-01", "2020-01-02", "2020-01-01", "2020-01-03"])
            .text("app", ["old", "old", "new", "new"])
            .build()
            .unwrap();
        assert!(calendar_vs_experience(
            &table,
            &create_test_query(),
            "app",
            &Value::from("old"),
            &Value::from("new"),
            0.8
        )
        .unwrap()
        .is_none());
    }
}
