//! Duplicates in top-k.
//!
//! Without a summary operator the top-k rows are raw rows, so the same
//! dimension value can take several of the k places.

use std::collections::HashSet;

use super::runner::{DetectionInput, OversightDetector};
use super::{OversightKind, Suggestion};
use crate::error::Result;
use crate::table::{Table, Value};

pub fn duplicates_in_topk(result: &Table, dimensions: &[String]) -> Result<Option<Suggestion>> {
    if dimensions.is_empty() {
        return Ok(None);
    }
    let tuples = result.key_tuples(dimensions)?;
    let distinct: HashSet<&Vec<Value>> = tuples.iter().collect();
    Ok((distinct.len() != tuples.len())
        .then(|| Suggestion::new(OversightKind::DuplicatesInTopk, "The results has duplicates")))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicatesInTopk;

impl OversightDetector for DuplicatesInTopk {
    fn kind(&self) -> OversightKind {
        OversightKind::DuplicatesInTopk
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Result<Vec<Suggestion>> {
        Ok(duplicates_in_topk(input.result, &input.query.dimensions)?
            .into_iter()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_found() {
        let result = Table::builder()
            .text("batsman", ["a", "b", "a"])
            .numeric("runs", [90.0, 80.0, 70.0])
            .build()
            .unwrap();
        let suggestion = duplicates_in_topk(&result, &["batsman".to_string()]).unwrap().unwrap();
        assert_eq!(suggestion.message, "The results has duplicates");
    }

    #[test]
    fn test_unique_rows_are_silent() {
        let result = Table::builder()
            .text("batsman", ["a", "b"])
            .text("team", ["x", "x"])
            .build()
            .unwrap();
        let dims = vec!["batsman".to_string(), "team".to_string()];
        assert!(duplicates_in_topk(&result, &dims).unwrap().is_none());
        assert!(duplicates_in_topk(&result, &[]).unwrap().is_none());
    }
}
