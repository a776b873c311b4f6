//! Per-intent ordering of suggestions.
//!
//! Each intent lists the oversight kinds it can produce, most important
//! first. Ranking is a stable sort by position in that list, so suggestions
//! of the same kind keep the order their detector emitted them in.

use super::{OversightKind, Suggestion};
use crate::intents::Intent;

use super::OversightKind::*;

const TOPK_ORDER: &[OversightKind] = &[
    DuplicatesInTopk,
    TopkWhenLessThanKPresent,
    MeanVsMedian,
    MoreThanJustTopk,
    RegressionToTheMean,
    LookingAtTailsToFindCauses,
    TopkVsOthers,
    AttributionWithHiddenNegatives,
    WrongPoints,
];

const SHOW_ORDER: &[OversightKind] = &[
    MeanVsMedian,
    AttributionWithHiddenNegatives,
    WeightedMeanWithDifferentWeights,
    WrongPoints,
];

const SLICE_COMPARE_ORDER: &[OversightKind] = &[
    MeanVsMedian,
    TopDownError,
    SimpsonsParadox,
    BenchmarkSetTooDifferent,
    CalendarVsExperienceInTimeSeries,
    AttributionWithHiddenNegatives,
    WrongPoints,
];

const TIME_COMPARE_ORDER: &[OversightKind] = &[
    MeanVsMedian,
    TopDownError,
    SimpsonsParadox,
    AttributionWithHiddenNegatives,
    WrongPoints,
];

const TREND_ORDER: &[OversightKind] = &[MeanVsMedian, AttributionWithHiddenNegatives, WrongPoints];

const WEIGHTED_MEAN_ORDER: &[OversightKind] = &[WeightedMeanWithDifferentWeights, WrongPoints];

impl Intent {
    /// Oversight kinds this intent may report, most important first.
    pub fn oversight_order(&self) -> &'static [OversightKind] {
        match self {
            Intent::Show => SHOW_ORDER,
            Intent::Topk => TOPK_ORDER,
            Intent::SliceCompare => SLICE_COMPARE_ORDER,
            Intent::TimeCompare => TIME_COMPARE_ORDER,
            Intent::Trend => TREND_ORDER,
            Intent::Correlation => &[],
            Intent::WeightedMean => WEIGHTED_MEAN_ORDER,
        }
    }
}

/// Sorts suggestions by the intent's order.
///
/// # Panics
///
/// Panics if a suggestion's kind is not in the intent's order: the intent
/// ran a detector it never declared.
pub fn rank_suggestions(mut suggestions: Vec<Suggestion>, intent: Intent) -> Vec<Suggestion> {
    let order = intent.oversight_order();
    let position = |kind: OversightKind| {
        order
            .iter()
            .position(|&k| k == kind)
            .unwrap_or_else(|| panic!("{kind} is not ranked for the {intent} intent"))
    };
    for suggestion in &suggestions {
        position(suggestion.oversight);
    }
    suggestions.sort_by_key(|s| position(s.oversight));
    suggestions
}
