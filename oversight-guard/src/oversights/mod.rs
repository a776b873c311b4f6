//! Oversight detectors and the machinery that runs and ranks them.
//!
//! Every detector is a plain function over tables and thresholds, plus a
//! small struct implementing [`OversightDetector`] so that intents can hand
//! a list of them to an [`OversightRunner`].
//!
//! ## Available Detectors
//!
//! - **Top-k**: [`DuplicatesInTopk`], [`TopkWhenLessThanK`], [`MoreThanJustTopk`],
//!   [`RegressionToMean`], [`LookingAtTails`], [`TopkVsOthers`]
//! - **Comparisons**: [`SimpsonsParadox`], [`TopDownError`],
//!   [`BenchmarkSetTooDifferent`], [`CalendarVsExperience`]
//! - **Any table**: [`WrongPoints`], [`WeightedMeanWeights`]
//!
//! Mean vs median and attribution with hidden negatives are found while
//! grouping, since they need each group's raw values; see
//! [`group_by`](crate::aspects::group_by).
//!
//! ## Example
//!
//! ```rust
//! use oversight_guard::config::OversightConfig;
//! use oversight_guard::oversights::wrong_points::wrong_points;
//! use oversight_guard::oversights::OversightKind;
//! use oversight_guard::table::Table;
//!
//! let table = Table::builder()
//!     .numeric("age", [-99.0, -99.0, 30.0])
//!     .build()
//!     .unwrap();
//!
//! let suggestion = wrong_points(&table, &OversightConfig::default()).unwrap();
//! assert_eq!(suggestion.oversight, OversightKind::WrongPoints);
//! ```

pub mod attribution_with_hidden_negatives;
pub mod benchmark_set_too_different;
pub mod calendar_vs_experience;
pub mod comparison;
pub mod duplicates_in_topk;
pub mod looking_at_tails;
pub mod mean_vs_median;
pub mod more_than_just_topk;
pub mod rank;
pub mod regression_to_mean;
pub mod runner;
pub mod similarity;
pub mod simpsons_paradox;
pub mod suggestion;
pub mod top_down_error;
pub mod topk_vs_others;
pub mod topk_when_less_than_k;
pub mod weighted_mean_weights;
pub mod wrong_points;

pub use benchmark_set_too_different::BenchmarkSetTooDifferent;
pub use calendar_vs_experience::CalendarVsExperience;
pub use comparison::{ComparedSlices, SlicePair};
pub use duplicates_in_topk::DuplicatesInTopk;
pub use looking_at_tails::LookingAtTails;
pub use more_than_just_topk::MoreThanJustTopk;
pub use rank::rank_suggestions;
pub use regression_to_mean::RegressionToMean;
pub use runner::{DetectionInput, DetectorFailure, OversightDetector, OversightRunner, RunReport};
pub use simpsons_paradox::SimpsonsParadox;
pub use suggestion::{remap_suggestions, ColumnConfidence, OversightKind, RowConfidence, Suggestion};
pub use top_down_error::TopDownError;
pub use topk_vs_others::TopkVsOthers;
pub use topk_when_less_than_k::TopkWhenLessThanK;
pub use weighted_mean_weights::WeightedMeanWeights;
pub use wrong_points::WrongPoints;
