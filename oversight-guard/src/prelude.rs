//! Prelude for commonly used types in oversight-guard.

pub use crate::aspects::{Filter, Predicate, SummaryOperator};
pub use crate::config::OversightConfig;
pub use crate::error::{OversightError, Result};
pub use crate::intents::{
    Intent, OversightEngine, Query, QueryResponse, SliceComparison, TimeComparison,
};
pub use crate::logging::LogConfig;
pub use crate::oversights::{OversightKind, Suggestion};
pub use crate::table::{Column, ColumnType, DateRange, Granularity, Table, Value};
