//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod error;
pub mod indicator;
pub mod log;
pub mod source;

// Re-export main types for cleaner imports
pub use error::{AggregationError, FetchError};
pub use indicator::{Impact, Indicator, IndicatorKey, Trend};
pub use source::{IndicatorSource, ProviderKind, SourceQuery, SourceSet};
