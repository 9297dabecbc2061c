#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fundamentals/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and traits for quarterly fundamentals reconciliation.
//!
//! This crate provides the shared schema every other crate works with:
//!
//! - [`RawFact`](types::RawFact) - One disclosed data point for one concept tag
//! - [`QuarterLabel`](quarter::QuarterLabel) - Calendar quarter, ordered by year then quarter
//! - [`ReconciledSeries`](series::ReconciledSeries) / [`ReconciledTable`](series::ReconciledTable) - Engine output
//! - [`ReconConfig`](config::ReconConfig) / [`MetricSpec`](config::MetricSpec) - Engine settings
//! - [`FactSource`](source::FactSource) - Abstraction over where facts come from

/// Reconciliation settings and metric definitions.
pub mod config;
/// Error types for reconciliation and sourcing.
pub mod error;
/// Fiscal period labels and duration classes.
pub mod period;
/// Calendar quarter labels.
pub mod quarter;
/// Reconciled series and tables.
pub mod series;
/// Source trait for raw facts.
pub mod source;
/// Core data types (Symbol, RawFact, FactBook, QuarterlyDelta).
pub mod types;

// Re-export commonly used items at crate root
pub use config::{DayRange, MetricSpec, ReconConfig, RevisionPolicy, SeriesBasis};
pub use error::{ReconError, Result};
pub use period::{DurationClass, FiscalPeriod, ObservedPeriod};
pub use quarter::QuarterLabel;
pub use series::{ReconciledSeries, ReconciledTable, TableRow};
pub use source::FactSource;
pub use types::{FactBook, FactOrigin, QuarterlyDelta, RawFact, Symbol};
