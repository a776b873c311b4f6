//! # Oversight Guard - Debiasing Suggestions for Analytical Queries
//!
//! Oversight Guard answers structured analytical questions ("top-k",
//! "compare these two slices", "trend over months") over in-memory tables
//! and, next to every result, reports the ways that result may mislead:
//! Simpson's paradox, regression to the mean, duplicated top-k entries, a
//! mean dragged away from the median, and more.
//!
//! ## Overview
//!
//! The crate is built in three layers:
//!
//! - **[`table`]**: typed, immutable columnar tables and date handling
//! - **[`aspects`]**: the shared transforms (date range, slicing, projection, grouping)
//! - **[`intents`]**: query recipes built from aspects, each running the
//!   **[`oversights`]** detectors that apply to it and ranking what they find
//!
//! Detector thresholds live in [`config::OversightConfig`]; every intent is a
//! method on [`intents::OversightEngine`].
//!
//! ## Quick Start
//!
//! ```rust
//! use oversight_guard::prelude::*;
//!
//! let table = Table::builder()
//!     .text("batsman", ["a", "b", "c", "d"])
//!     .numeric("runs", [10.0, 250.0, 30.0, 20.0])
//!     .build()
//!     .unwrap();
//!
//! let query = Query::new()
//!     .with_metric("runs")
//!     .with_dimensions(["batsman"])
//!     .with_summary_operator(SummaryOperator::Sum);
//!
//! let engine = OversightEngine::new(OversightConfig::default());
//! let response = engine.topk(&table, &query, 2, false).unwrap();
//!
//! assert_eq!(response.table.num_rows(), 2);
//! for suggestion in &response.suggestions {
//!     println!("{}: {}", suggestion.oversight, suggestion.message);
//! }
//! ```
//!
//! ## Failure Handling
//!
//! Malformed input (a missing column, an unparseable date in the filtered
//! range, a text value where a number is needed) fails the query with an
//! [`error::OversightError`]. A detector that fails on its own is logged
//! and skipped by default, and named in
//! [`QueryResponse::failed_detectors`](intents::QueryResponse::failed_detectors);
//! set `continue_on_error` to `false` to fail the query instead.
//!
//! ## Logging
//!
//! Everything is reported through [`tracing`]. Install a subscriber with
//! [`logging::setup::init_logging`] or any subscriber of your own; use
//! [`logging::LogConfig`] to control how chatty the detectors are.

pub mod aspects;
pub mod config;
pub mod error;
pub mod intents;
pub mod logging;
pub mod oversights;
pub mod prelude;
pub mod table;
