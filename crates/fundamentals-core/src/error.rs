//! Error types for reconciliation and its collaborators.
//!
//! This module defines [`ReconError`], which covers the fatal cases of the
//! reconciliation engine as well as failures of the fact sources that feed it.
//! Localized anomalies (a skipped Q4 derivation, a dropped delta) are not
//! errors; the engine records them as diagnostics instead.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur while sourcing or reconciling disclosure facts.
#[derive(Error, Debug)]
pub enum ReconError {
    /// No candidate tag yielded any usable quarter for a metric, or no
    /// metric had data at all and there is no calendar to build.
    #[error("No data for metric {metric}")]
    NoData {
        /// The metric that could not be built. When every series is empty,
        /// all of their names joined by `", "`.
        metric: String,
    },

    /// A fact whose period ends before it starts.
    #[error("Invalid period for {concept}: end {end} precedes start {start}")]
    InvalidPeriod {
        /// Concept tag of the rejected fact.
        concept: String,
        /// Declared period start.
        start: NaiveDate,
        /// Declared period end.
        end: NaiveDate,
    },

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by a fact source.
    #[error("Rate limited by {source_name}: retry after {retry_after:?}")]
    RateLimited {
        /// The source that rate limited the request.
        source_name: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// The requested symbol was not found.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// Error parsing a disclosure payload.
    #[error("Parse error: {0}")]
    Parse(String),

    /// No fact source has been registered.
    #[error("Source not configured: {0}")]
    SourceNotConfigured(String),

    /// Error converting or writing a reconciled table.
    #[error("Export error: {0}")]
    Export(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

/// Result type alias using [`ReconError`].
pub type Result<T> = std::result::Result<T, ReconError>;
