//! Mean vs median.
//!
//! A mean over a heavily skewed group is dominated by its tail. This check
//! runs while a MEAN aggregation reduces each group, see
//! [`group_by`](crate::aspects::grouping::group_by).

use super::similarity::skew;
use super::{OversightKind, Suggestion};

/// Checks one group's values; `None` when the group is too small to judge.
///
/// The returned suggestion carries the skew as its confidence. The caller
/// tags it with the group's row.
pub fn mean_vs_median(values: &[f64], skew_bound: f64) -> Option<Suggestion> {
    if values.len() <= 2 {
        return None;
    }
    let skewness = skew(values);
    if (-skew_bound..=skew_bound).contains(&skewness) {
        return None;
    }
    Some(
        Suggestion::new(OversightKind::MeanVsMedian, "Median is very different from the Mean")
            .with_confidence(skewness),
    )
}
