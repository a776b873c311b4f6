//! Thresholds that decide when an oversight fires.
//!
//! Every constant the detectors compare against lives in
//! [`OversightConfig`]. The defaults are the calibrated values; callers may
//! override any of them in code with the `with_*` builders or from a JSON
//! document where missing keys fall back to the default.
//!
//! ```rust
//! use oversight_guard::config::OversightConfig;
//!
//! let config = OversightConfig::from_json_str(r#"{ "wrong_points_threshold": 0.6 }"#).unwrap();
//! assert_eq!(config.wrong_points_threshold, 0.6);
//! assert_eq!(config.rtm_rank_angle_degrees, 30.0);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{OversightError, Result};
use crate::logging::LogConfig;

/// Detector thresholds and engine behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OversightConfig {
    /// Regression to the mean: Jaccard overlap at or below which the top-k sets differ
    pub rtm_set_intersection_cutoff: f64,
    /// Regression to the mean: rank-vector angle (degrees) at or above which ranks differ
    pub rtm_rank_angle_degrees: f64,
    /// Mean vs median: skew outside `[-bound, bound]` fires
    pub mean_vs_median_skew_bound: f64,
    /// Looking at tails: ratio of standard deviations at or above which a numeric column is non-distinguishing
    pub tails_std_ratio_threshold: f64,
    /// Looking at tails: category-distribution angle (degrees) within which a text column is non-distinguishing
    pub tails_angle_degrees: f64,
    /// More than just top-k: relation below which a following row ties with the kth row
    pub more_than_just_topk_threshold: f64,
    /// Top-k vs others: positive ratio below which the tail dominates
    pub topk_vs_others_threshold: f64,
    /// Simpson's paradox: flip in dominant percentage (points)
    pub simpsons_dominant_percent_threshold: f64,
    /// Top-down error: similarity at or above which two aggregated values look alike
    pub top_down_similarity_threshold: f64,
    /// Top-down error: similarity at or below which the split values look different
    pub top_down_dissimilarity_threshold: f64,
    /// Benchmark set too different: relation at or above which a slice differs from the benchmark
    pub benchmark_dissimilarity_threshold: f64,
    /// Calendar vs experience time: fraction of non-overlapping dates that fires
    pub calendar_experience_threshold: f64,
    /// Wrong points: share of a single value above which it looks like a sentinel
    pub wrong_points_threshold: f64,
    /// Wrong points: fixed sentinel candidates checked besides the column min and max
    pub wrong_points_sentinels: Vec<f64>,
    /// Whether a failing detector is logged and skipped instead of failing the query
    pub continue_on_error: bool,
    /// Logging behaviour, not part of the serialized form
    #[serde(skip)]
    pub log: LogConfig,
}

impl Default for OversightConfig {
    fn default() -> Self {
        Self {
            rtm_set_intersection_cutoff: 0.7,
            rtm_rank_angle_degrees: 30.0,
            mean_vs_median_skew_bound: 2.5,
            tails_std_ratio_threshold: 0.7,
            tails_angle_degrees: 20.0,
            more_than_just_topk_threshold: 0.001,
            topk_vs_others_threshold: 0.7,
            simpsons_dominant_percent_threshold: 75.0,
            top_down_similarity_threshold: 0.95,
            top_down_dissimilarity_threshold: 0.70,
            benchmark_dissimilarity_threshold: 0.20,
            calendar_experience_threshold: 0.8,
            wrong_points_threshold: 0.45,
            wrong_points_sentinels: vec![-99.0, 0.0],
            continue_on_error: true,
            log: LogConfig::default(),
        }
    }
}

impl OversightConfig {
    /// Parses a configuration from JSON; absent keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Checks that fractions are fractions and angles are angles.
    pub fn validate(&self) -> Result<()> {
        let fractions = [
            ("rtm_set_intersection_cutoff", self.rtm_set_intersection_cutoff),
            ("tails_std_ratio_threshold", self.tails_std_ratio_threshold),
            ("more_than_just_topk_threshold", self.more_than_just_topk_threshold),
            ("top_down_similarity_threshold", self.top_down_similarity_threshold),
            ("top_down_dissimilarity_threshold", self.top_down_dissimilarity_threshold),
            ("benchmark_dissimilarity_threshold", self.benchmark_dissimilarity_threshold),
            ("calendar_experience_threshold", self.calendar_experience_threshold),
            ("wrong_points_threshold", self.wrong_points_threshold),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(OversightError::invalid_parameter(
                    name,
                    format!("must be within [0, 1], got {value}"),
                ));
            }
        }

        for (name, value) in [
            ("rtm_rank_angle_degrees", self.rtm_rank_angle_degrees),
            ("tails_angle_degrees", self.tails_angle_degrees),
        ] {
            if !(0.0..=180.0).contains(&value) {
                return Err(OversightError::invalid_parameter(
                    name,
                    format!("must be within [0, 180] degrees, got {value}"),
                ));
            }
        }

        if !(0.0..=100.0).contains(&self.simpsons_dominant_percent_threshold) {
            return Err(OversightError::invalid_parameter(
                "simpsons_dominant_percent_threshold",
                "must be a percentage",
            ));
        }

        if self.mean_vs_median_skew_bound < 0.0 {
            return Err(OversightError::invalid_parameter(
                "mean_vs_median_skew_bound",
                "must be non-negative",
            ));
        }

        Ok(())
    }

    /// Sets the mean vs median skew bound.
    pub fn with_skew_bound(mut self, bound: f64) -> Self {
        self.mean_vs_median_skew_bound = bound;
        self
    }

    /// Sets the wrong points share threshold.
    pub fn with_wrong_points_threshold(mut self, threshold: f64) -> Self {
        self.wrong_points_threshold = threshold;
        self
    }

    /// Sets the Simpson's paradox flip threshold.
    pub fn with_simpsons_threshold(mut self, percent_points: f64) -> Self {
        self.simpsons_dominant_percent_threshold = percent_points;
        self
    }

    /// Sets the benchmark dissimilarity threshold.
    pub fn with_benchmark_threshold(mut self, threshold: f64) -> Self {
        self.benchmark_dissimilarity_threshold = threshold;
        self
    }

    /// Sets whether detector failures are isolated.
    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    /// Sets the logging behaviour.
    pub fn with_log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }
}
