//! Query intents.
//!
//! An intent is a fixed recipe over the [aspects](crate::aspects): it turns a
//! [`Query`] into a result table, runs the oversight detectors that apply to
//! it, and ranks what they found. Every intent is available as a method on
//! [`OversightEngine`], which carries the thresholds, and as a free function
//! using the default configuration.
//!
//! ```rust
//! use oversight_guard::prelude::*;
//!
//! let table = Table::builder()
//!     .text("team", ["a", "b", "c"])
//!     .numeric("score", [3.0, 9.0, 5.0])
//!     .build()
//!     .unwrap();
//!
//! let query = Query::new()
//!     .with_metric("score")
//!     .with_dimensions(["team"])
//!     .with_summary_operator(SummaryOperator::Sum);
//!
//! let response = OversightEngine::default().topk(&table, &query, 2, false).unwrap();
//! assert_eq!(response.table.num_rows(), 2);
//! assert!(response.table.has_column("Sum of score"));
//! ```

pub mod correlation;
pub mod show;
pub mod slice_compare;
pub mod time_compare;
pub mod topk;
pub mod trend;
pub mod weighted_mean;

pub use slice_compare::{SliceComparison, ALL_SLICE_LABEL, WILDCARD};
pub use time_compare::TimeComparison;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::aspects::{Predicate, SummaryOperator};
use crate::config::OversightConfig;
use crate::error::{OversightError, Result};
use crate::oversights::rank::rank_suggestions;
use crate::oversights::{DetectorFailure, RunReport, Suggestion};
use crate::table::{DateRange, Granularity, Table};

/// The kinds of analytical question the engine answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    Show,
    Topk,
    SliceCompare,
    TimeCompare,
    Trend,
    Correlation,
    WeightedMean,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Show => "show",
            Intent::Topk => "top-k",
            Intent::SliceCompare => "slice-compare",
            Intent::TimeCompare => "time-compare",
            Intent::Trend => "trend",
            Intent::Correlation => "correlation",
            Intent::WeightedMean => "weighted-mean",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters shared by every intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Query {
    pub metric: Option<String>,
    pub dimensions: Vec<String>,
    pub summary_operator: Option<SummaryOperator>,
    pub slices: Vec<Predicate>,
    pub date_range: Option<DateRange>,
    pub date_column: String,
    /// How to read ambiguous numeric dates, as decided by the caller.
    pub day_first: bool,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            metric: None,
            dimensions: Vec::new(),
            summary_operator: None,
            slices: Vec::new(),
            date_range: None,
            date_column: "date".to_string(),
            day_first: false,
        }
    }
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metric(mut self, metric: impl Into<String>) -> Self {
        self.metric = Some(metric.into());
        self
    }

    pub fn with_dimensions<S: Into<String>>(mut self, dimensions: impl IntoIterator<Item = S>) -> Self {
        self.dimensions = dimensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_summary_operator(mut self, operator: SummaryOperator) -> Self {
        self.summary_operator = Some(operator);
        self
    }

    pub fn with_slice(mut self, predicate: Predicate) -> Self {
        self.slices.push(predicate);
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn with_date_column(mut self, column: impl Into<String>) -> Self {
        self.date_column = column.into();
        self
    }

    pub fn with_day_first(mut self, day_first: bool) -> Self {
        self.day_first = day_first;
        self
    }

    /// The metric, which most intents cannot do without.
    pub fn metric_name(&self) -> Result<&str> {
        self.metric
            .as_deref()
            .ok_or_else(|| OversightError::invalid_parameter("metric", "this intent needs a metric"))
    }
}

/// A result table with its ranked suggestions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    pub table: Table,
    pub suggestions: Vec<Suggestion>,
    /// Detectors that failed and were skipped.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_detectors: Vec<DetectorFailure>,
}

impl QueryResponse {
    /// Merges aggregation and detector suggestions and ranks them for `intent`.
    pub(crate) fn ranked(
        intent: Intent,
        table: Table,
        mut suggestions: Vec<Suggestion>,
        report: RunReport,
    ) -> Self {
        suggestions.extend(report.suggestions);
        Self {
            table,
            suggestions: rank_suggestions(suggestions, intent),
            failed_detectors: report.failures,
        }
    }
}

/// Runs intents with a given set of thresholds.
#[derive(Debug, Clone, Default)]
pub struct OversightEngine {
    config: OversightConfig,
}

impl OversightEngine {
    pub fn new(config: OversightConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OversightConfig {
        &self.config
    }

    /// Show the (optionally grouped) data.
    pub fn show(&self, table: &Table, query: &Query) -> Result<QueryResponse> {
        show::show(table, query, &self.config)
    }

    /// The `k` best (or worst, with `ascending`) groups by the metric. `k = -1` keeps all.
    pub fn topk(&self, table: &Table, query: &Query, k: i64, ascending: bool) -> Result<QueryResponse> {
        topk::topk(table, query, k, ascending, &self.config)
    }

    /// Two values of one column side by side, or one value against everything.
    pub fn slice_compare(
        &self,
        table: &Table,
        query: &Query,
        comparison: &SliceComparison,
    ) -> Result<QueryResponse> {
        slice_compare::slice_compare(table, query, comparison, &self.config)
    }

    /// The same query over two date windows.
    pub fn time_compare(
        &self,
        table: &Table,
        query: &Query,
        comparison: &TimeComparison,
    ) -> Result<QueryResponse> {
        time_compare::time_compare(table, query, comparison, &self.config)
    }

    /// The metric over time at the given granularity.
    pub fn trend(&self, table: &Table, query: &Query, granularity: Granularity) -> Result<QueryResponse> {
        trend::trend(table, query, granularity, &self.config)
    }

    /// Pearson correlation of two metrics.
    pub fn correlation(
        &self,
        table: &Table,
        query: &Query,
        metric1: &str,
        metric2: &str,
    ) -> Result<QueryResponse> {
        correlation::correlation(table, query, metric1, metric2, &self.config)
    }

    /// Mean of the metric weighted by another column.
    pub fn weighted_mean(&self, table: &Table, query: &Query, weight: &str) -> Result<QueryResponse> {
        weighted_mean::weighted_mean(table, query, weight, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let query = Query::new();
        assert_eq!(query.date_column, "date");
        assert!(!query.day_first);
        assert!(matches!(
            query.metric_name(),
            Err(OversightError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_query_builders() {
        let query = Query::new()
            .with_metric("sales")
            .with_dimensions(["city", "shop"])
            .with_summary_operator(SummaryOperator::Mean)
            .with_date_column("day")
            .with_day_first(true);
        assert_eq!(query.metric_name().unwrap(), "sales");
        assert_eq!(query.dimensions, vec!["city", "shop"]);
        assert_eq!(query.date_column, "day");
        assert!(query.day_first);
    }

    #[test]
    fn test_query_from_json() {
        let query: Query = serde_json::from_str(
            r#"{
                "metric": "sales",
                "dimensions": ["city"],
                "summary_operator": "PROPORTION_OF_SUM",
                "slices": [{ "column": "city", "filter": "IN", "operand": ["Pune", "Delhi"] }],
                "date_range": { "start": "2020-01-01", "end": "2020-12-31" }
            }"#,
        )
        .unwrap();
        assert_eq!(query.summary_operator, Some(SummaryOperator::ProportionOfSum));
        assert_eq!(query.slices.len(), 1);
        assert_eq!(query.date_column, "date");
    }

    #[test]
    fn test_intent_names() {
        assert_eq!(Intent::Topk.to_string(), "top-k");
        assert_eq!(Intent::WeightedMean.name(), "weighted-mean");
    }
}
