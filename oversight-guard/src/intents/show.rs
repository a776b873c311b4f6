//! The show intent.

use tracing::instrument;

use super::{Intent, Query, QueryResponse};
use crate::aspects::{group_by, prepare, project_columns, update_metric_column_name, SummaryOperator};
use crate::config::OversightConfig;
use crate::error::Result;
use crate::oversights::{DetectionInput, OversightRunner, WeightedMeanWeights, WrongPoints};
use crate::table::{Column, Table};

/// Name of the synthetic grouping column used to summarise a whole table.
pub const SUMMARY_OPERATOR_COLUMN: &str = "Summary Operator";

/// Shows the filtered data, grouped by the dimensions when an operator is given.
///
/// With an operator but no dimensions the whole table is summarised into one
/// row, labelled by a leading [`SUMMARY_OPERATOR_COLUMN`]. With neither
/// dimensions nor a metric every column is kept.
#[instrument(skip(table, query, config), fields(rows = table.num_rows()))]
pub fn show(table: &Table, query: &Query, config: &OversightConfig) -> Result<QueryResponse> {
    let prepared = prepare(table, query)?;

    let mut keep = query.dimensions.clone();
    keep.extend(query.metric.iter().cloned());
    let projected = if keep.is_empty() {
        prepared
    } else {
        project_columns(&prepared, &keep)?
    };

    let (frame, dimensions) = match query.summary_operator {
        Some(operator) if query.dimensions.is_empty() => (
            with_summary_operator_column(&projected, operator)?,
            vec![SUMMARY_OPERATOR_COLUMN.to_string()],
        ),
        _ => (projected, query.dimensions.clone()),
    };
    let grouped = group_by(&frame, &dimensions, query.summary_operator, config)?;

    let input = DetectionInput::new(table, &grouped.table, query, config);
    let report = OversightRunner::new()
        .add_if(
            query.metric.is_some() && query.summary_operator == Some(SummaryOperator::Mean),
            WeightedMeanWeights::new(),
        )
        .add(WrongPoints)
        .run(&input)?;

    let result = match query.metric.as_deref() {
        Some(metric) => update_metric_column_name(&grouped.table, query.summary_operator, metric)?,
        None => grouped.table,
    };
    Ok(QueryResponse::ranked(Intent::Show, result, grouped.suggestions, report))
}

fn with_summary_operator_column(table: &Table, operator: SummaryOperator) -> Result<Table> {
    let label = Column::text(
        SUMMARY_OPERATOR_COLUMN,
        std::iter::repeat(operator.name()).take(table.num_rows()),
    );
    let mut columns = vec![label];
    columns.extend(table.columns().iter().cloned());
    Table::new(columns)
}
