//! Isolated execution of oversight detectors.
//!
//! Each intent registers the detectors that apply to it with an
//! [`OversightRunner`]. A detector that fails (a date that does not parse in
//! a comparison window, a text column where a number was expected) is logged
//! and recorded in the [`RunReport`]; the remaining detectors still run and
//! the query result is still returned.

use serde::Serialize;
use tracing::{debug, error, info, Level};

use super::{OversightKind, Suggestion};
use crate::config::OversightConfig;
use crate::error::Result;
use crate::intents::Query;
use crate::log_detector;
use crate::logging::truncate_field;
use crate::table::Table;

/// Everything a detector may look at.
#[derive(Debug, Clone, Copy)]
pub struct DetectionInput<'a> {
    /// The table as handed to the intent, before any transform.
    pub table: &'a Table,
    /// The result table as it will be returned (before the metric rename).
    pub result: &'a Table,
    /// The full ordered result without the top-k cut, for top-k detectors.
    pub full_result: Option<&'a Table>,
    pub query: &'a Query,
    pub config: &'a OversightConfig,
}

impl<'a> DetectionInput<'a> {
    pub fn new(table: &'a Table, result: &'a Table, query: &'a Query, config: &'a OversightConfig) -> Self {
        Self {
            table,
            result,
            full_result: None,
            query,
            config,
        }
    }

    pub fn with_full_result(mut self, full_result: &'a Table) -> Self {
        self.full_result = Some(full_result);
        self
    }
}

/// A single oversight detector.
///
/// Detectors are pure: they read the input and return zero or more
/// suggestions of their own [`kind`](OversightDetector::kind).
pub trait OversightDetector {
    fn kind(&self) -> OversightKind;

    fn name(&self) -> &str {
        self.kind().name()
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Result<Vec<Suggestion>>;
}

/// A detector that returned an error and was skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectorFailure {
    pub oversight: OversightKind,
    pub error: String,
}

/// Outcome of running a set of detectors.
#[derive(Debug, Default, Clone)]
pub struct RunReport {
    pub suggestions: Vec<Suggestion>,
    pub failures: Vec<DetectorFailure>,
}

/// Runs detectors one after the other, isolating failures.
///
/// # Example
///
/// ```rust,ignore
/// let report = OversightRunner::new()
///     .add(DuplicatesInTopk)
///     .add(TopkWhenLessThanK::new(10))
///     .run(&input)?;
/// ```
pub struct OversightRunner<'a> {
    detectors: Vec<Box<dyn OversightDetector + 'a>>,
    continue_on_error: Option<bool>,
}

impl Default for OversightRunner<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> OversightRunner<'a> {
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
            continue_on_error: None,
        }
    }

    /// Registers a detector.
    pub fn add<D: OversightDetector + 'a>(mut self, detector: D) -> Self {
        self.detectors.push(Box::new(detector));
        self
    }

    /// Registers a detector only when `condition` holds.
    pub fn add_if<D: OversightDetector + 'a>(self, condition: bool, detector: D) -> Self {
        if condition {
            self.add(detector)
        } else {
            self
        }
    }

    /// Overrides `OversightConfig::continue_on_error` for this run.
    pub fn continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = Some(continue_on_error);
        self
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Runs every registered detector against `input`.
    ///
    /// In strict mode the first detector error is returned as is.
    pub fn run(&self, input: &DetectionInput<'_>) -> Result<RunReport> {
        let continue_on_error = self
            .continue_on_error
            .unwrap_or(input.config.continue_on_error);
        let log = &input.config.log;
        debug!("Running {} oversight detectors", self.detectors.len());

        let mut report = RunReport::default();
        for detector in &self.detectors {
            match detector.detect(input) {
                Ok(found) => {
                    for suggestion in &found {
                        log_detector!(
                            log,
                            detector = detector.name(),
                            message = %truncate_field(&suggestion.message, log.max_field_length),
                            "Oversight detected"
                        );
                    }
                    if found.is_empty() {
                        log_detector!(log, detector = detector.name(), "No oversight detected");
                    }
                    report.suggestions.extend(found);
                }
                Err(e) => {
                    error!("Oversight detector {} failed: {}", detector.name(), e);
                    if !continue_on_error {
                        return Err(e);
                    }
                    report.failures.push(DetectorFailure {
                        oversight: detector.kind(),
                        error: e.to_string(),
                    });
                }
            }
        }

        if log.allows(Level::INFO) {
            info!(
                suggestions = report.suggestions.len(),
                failures = report.failures.len(),
                "Oversight detection finished"
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OversightError;

    struct AlwaysFires;

    impl OversightDetector for AlwaysFires {
        fn kind(&self) -> OversightKind {
            OversightKind::WrongPoints
        }

        fn detect(&self, _input: &DetectionInput<'_>) -> Result<Vec<Suggestion>> {
            Ok(vec![Suggestion::new(self.kind(), "fired")])
        }
    }

    struct AlwaysFails;

    impl OversightDetector for AlwaysFails {
        fn kind(&self) -> OversightKind {
            OversightKind::RegressionToTheMean
        }

        fn detect(&self, input: &DetectionInput<'_>) -> Result<Vec<Suggestion>> {
            input.table.column("missing")?;
            Ok(Vec::new())
        }
    }

    fn create_test_input<'a>(table: &'a Table, query: &'a Query, config: &'a OversightConfig) -> DetectionInput<'a> {
        DetectionInput::new(table, table, query, config)
    }

    #[test]
    fn test_failure_is_isolated() {
        let table = Table::builder().numeric("a", [1.0]).build().unwrap();
        let query = Query::default();
        let config = OversightConfig::default();

        let report = OversightRunner::new()
            .add(AlwaysFails)
            .add(AlwaysFires)
            .run(&create_test_input(&table, &query, &config))
            .unwrap();

        assert_eq!(report.suggestions.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].oversight, OversightKind::RegressionToTheMean);
        assert!(report.failures[0].error.contains("missing"));
    }

    #[test]
    fn test_fail_fast() {
        let table = Table::builder().numeric("a", [1.0]).build().unwrap();
        let query = Query::default();
        let config = OversightConfig::default().with_continue_on_error(false);

        let err = OversightRunner::new()
            .add(AlwaysFails)
            .add(AlwaysFires)
            .run(&create_test_input(&table, &query, &config))
            .unwrap_err();
        assert!(matches!(err, OversightError::ColumnNotFound { .. }));

        // the runner override wins over the config
        let report = OversightRunner::new()
            .add(AlwaysFails)
            .continue_on_error(true)
            .run(&create_test_input(&table, &query, &config))
            .unwrap();
        assert_eq!(report.failures.len(), 1);
    }

    #[test]
    fn test_add_if() {
        let runner = OversightRunner::new()
            .add_if(false, AlwaysFires)
            .add_if(true, AlwaysFails);
        assert_eq!(runner.len(), 1);
    }
}
