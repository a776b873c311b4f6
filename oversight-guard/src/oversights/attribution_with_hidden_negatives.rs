//! Attribution with hidden negatives.
//!
//! A share of a total is meaningless when some of the parts are negative:
//! positive groups can then claim more than 100% between them. Runs inside
//! PROPORTION_OF_SUM and PROPORTION_OF_COUNT aggregations.

use super::{OversightKind, Suggestion};
use crate::table::Value;

pub(crate) const MESSAGE: &str =
    "There exists negative values among the values on which proportion is being applied";

/// Checks the values one group contributes to a proportion.
pub fn hidden_negatives(values: &[&Value]) -> Option<Suggestion> {
    let any_negative = values
        .iter()
        .filter_map(|v| v.as_f64())
        .any(|x| x < 0.0);
    any_negative.then(|| {
        Suggestion::new(OversightKind::AttributionWithHiddenNegatives, MESSAGE).with_confidence(1.0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_value_fires() {
        let values = [Value::from(10), Value::from(-3), Value::Null];
        let refs: Vec<&Value> = values.iter().collect();
        let suggestion = hidden_negatives(&refs).unwrap();
        assert_eq!(suggestion.confidence_score, Some(1.0));
        assert_eq!(suggestion.message, MESSAGE);
    }

    #[test]
    fn test_non_negative_is_silent() {
        let values = [Value::from(0), Value::from(4), Value::from("x")];
        let refs: Vec<&Value> = values.iter().collect();
        assert!(hidden_negatives(&refs).is_none());
    }
}
