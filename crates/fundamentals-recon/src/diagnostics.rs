//! Non-fatal anomalies observed while reconciling.
//!
//! Each stage absorbs localized problems (a fourth quarter that cannot be
//! derived, a point that fails the gap check) and degrades its output instead
//! of failing. What it absorbed is recorded here so callers can see why a
//! quarter is blank.

use chrono::NaiveDate;
use fundamentals_core::QuarterLabel;
use serde::Serialize;
use tracing::debug;

/// Why a fourth quarter could not be derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum MissingInput {
    /// No Q3 fact ends inside the fiscal year before the annual fact.
    NoPrecedingQ3,
    /// The annual fact or the matching Q3 fact has no value.
    NullValue,
}

/// A localized problem that was absorbed rather than escalated.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Anomaly {
    /// Fourth quarter for the fiscal year ending `annual_end` was omitted.
    MissingDerivationInput {
        /// Concept tag of the annual fact.
        concept: String,
        /// Period end of the annual fact.
        annual_end: NaiveDate,
        /// What was missing.
        reason: MissingInput,
    },
    /// A point was dropped because its gap to the preceding period end was
    /// outside the accepted window, or there was no preceding fact.
    EligibilityGap {
        /// Concept tag of the dropped fact.
        concept: String,
        /// Period end of the dropped fact.
        end: NaiveDate,
        /// Days since the preceding period end, `None` for the first fact.
        gap_days: Option<i64>,
    },
    /// A point was dropped because a value it needed is null.
    MissingValue {
        /// Concept tag of the dropped fact.
        concept: String,
        /// Period end of the dropped fact.
        end: NaiveDate,
    },
    /// Two deltas fell in the same calendar quarter; the later one was dropped.
    DuplicateQuarter {
        /// Concept tag of the dropped delta.
        concept: String,
        /// The contested quarter.
        quarter: QuarterLabel,
    },
    /// A candidate tag had no facts at all.
    EmptyCandidate {
        /// Metric the tag was a candidate for.
        metric: String,
        /// The absent tag.
        concept: String,
    },
    /// An optional metric produced no data; its column is entirely null.
    NoData {
        /// The empty metric.
        metric: String,
    },
}

/// Collected anomalies of one reconciliation.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    anomalies: Vec<Anomaly>,
}

impl Diagnostics {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an anomaly.
    pub fn record(&mut self, anomaly: Anomaly) {
        debug!(?anomaly, "Absorbed reconciliation anomaly");
        self.anomalies.push(anomaly);
    }

    /// All anomalies in the order they were observed.
    #[must_use]
    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    /// Number of anomalies matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&Anomaly) -> bool) -> usize {
        self.anomalies.iter().filter(|a| predicate(a)).count()
    }

    /// Number of anomalies recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.anomalies.len()
    }

    /// Returns true if nothing was absorbed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anomalies.is_empty()
    }
}
