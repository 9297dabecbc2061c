//! Reconciliation settings and metric definitions.
//!
//! [`ReconConfig`] holds the thresholds every stage of the engine reads, and
//! [`MetricSpec`] describes one requested metric: its candidate concept tags
//! and how its series should be built. Both are plain builder-style values
//! and can be deserialized from JSON.

use serde::{Deserialize, Serialize};

use crate::error::{ReconError, Result};

/// Inclusive range of day counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DayRange {
    /// Smallest accepted day count.
    pub min: i64,
    /// Largest accepted day count.
    pub max: i64,
}

impl DayRange {
    /// Three-month periods: 85 to 95 days.
    pub const QUARTER: Self = Self { min: 85, max: 95 };
    /// Nine- to twelve-month periods: 270 to 370 days.
    pub const ANNUAL: Self = Self { min: 270, max: 370 };

    /// Creates an inclusive range.
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::InvalidParameter`] if `min > max` or `min` is negative.
    pub fn new(min: i64, max: i64) -> Result<Self> {
        if min < 0 || min > max {
            return Err(ReconError::InvalidParameter(format!(
                "Invalid day range {min}..={max}"
            )));
        }
        Ok(Self { min, max })
    }

    /// Returns true if `days` lies within the range, bounds included.
    #[must_use]
    pub const fn contains(&self, days: i64) -> bool {
        days >= self.min && days <= self.max
    }
}

/// Which filing survives when several cover the same period.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RevisionPolicy {
    /// Keep the earliest filing; later restatements are discarded.
    #[default]
    FirstFiled,
    /// Keep the latest restatement.
    LatestFiled,
}

/// How a concept's facts are turned into a quarterly series.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesBasis {
    /// Split facts into quarterly- and annual-length tracks, derive the
    /// missing fourth quarter from the annual track, then difference.
    #[default]
    Classified,
    /// Keep one cumulative chain (Q1, Q2 YTD, Q3 YTD, FY) and difference
    /// consecutive points. Facts shorter than the quarterly maximum are
    /// dropped unless labelled Q1. Suits statements reported only
    /// year-to-date, such as cash flows.
    YearToDate,
}

/// Settings shared by every stage of the reconciliation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    /// Day counts classified as quarterly-length.
    pub quarter_days: DayRange,
    /// Day counts classified as annual-length.
    pub annual_days: DayRange,
    /// Accepted gap between consecutive period ends when differencing.
    pub delta_gap_days: DayRange,
    /// Revision tie-break.
    pub revision_policy: RevisionPolicy,
    /// Form types eligible for annual classification. Empty means any form.
    pub annual_forms: Vec<String>,
    /// Treat Q1-labelled facts shorter than a quarter as quarterly-length.
    pub exempt_short_q1: bool,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            quarter_days: DayRange::QUARTER,
            annual_days: DayRange::ANNUAL,
            delta_gap_days: DayRange::QUARTER,
            revision_policy: RevisionPolicy::FirstFiled,
            annual_forms: Vec::new(),
            exempt_short_q1: false,
        }
    }
}

impl ReconConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the quarterly-length window.
    #[must_use]
    pub const fn with_quarter_days(mut self, range: DayRange) -> Self {
        self.quarter_days = range;
        self
    }

    /// Sets the annual-length window.
    #[must_use]
    pub const fn with_annual_days(mut self, range: DayRange) -> Self {
        self.annual_days = range;
        self
    }

    /// Sets the accepted gap between consecutive period ends.
    #[must_use]
    pub const fn with_delta_gap_days(mut self, range: DayRange) -> Self {
        self.delta_gap_days = range;
        self
    }

    /// Sets the revision tie-break.
    #[must_use]
    pub const fn with_revision_policy(mut self, policy: RevisionPolicy) -> Self {
        self.revision_policy = policy;
        self
    }

    /// Restricts annual classification to the given form types.
    #[must_use]
    pub fn with_annual_forms<I, S>(mut self, forms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.annual_forms = forms.into_iter().map(Into::into).collect();
        self
    }

    /// Enables or disables the short-Q1 exemption.
    #[must_use]
    pub const fn with_short_q1_exemption(mut self, exempt: bool) -> Self {
        self.exempt_short_q1 = exempt;
        self
    }

    /// Returns true if a fact filed on `form` may be classified annual.
    #[must_use]
    pub fn annual_form_allowed(&self, form: Option<&str>) -> bool {
        if self.annual_forms.is_empty() {
            return true;
        }
        form.is_some_and(|f| self.annual_forms.iter().any(|allowed| allowed == f))
    }
}

/// One requested metric.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricSpec {
    /// Column name in the reconciled table.
    pub name: String,
    /// Concept tags that may carry this metric, in preference order.
    pub candidates: Vec<String>,
    /// Flip the sign when the median observed value is negative.
    #[serde(default)]
    pub sign_ambiguous: bool,
    /// Fail the whole reconciliation when this metric has no data.
    #[serde(default)]
    pub required: bool,
    /// How facts become a quarterly series.
    #[serde(default)]
    pub basis: SeriesBasis,
}

impl MetricSpec {
    /// Creates a metric with its candidate tags.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            candidates: candidates.into_iter().map(Into::into).collect(),
            sign_ambiguous: false,
            required: false,
            basis: SeriesBasis::Classified,
        }
    }

    /// Marks the metric as having a filer-dependent sign convention.
    #[must_use]
    pub const fn sign_ambiguous(mut self) -> Self {
        self.sign_ambiguous = true;
        self
    }

    /// Marks the metric as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the series basis.
    #[must_use]
    pub const fn with_basis(mut self, basis: SeriesBasis) -> Self {
        self.basis = basis;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_range_bounds_inclusive() {
        assert!(DayRange::QUARTER.contains(85));
        assert!(DayRange::QUARTER.contains(95));
        assert!(!DayRange::QUARTER.contains(84));
        assert!(!DayRange::QUARTER.contains(96));
        assert!(DayRange::new(90, 80).is_err());
        assert!(DayRange::new(-1, 80).is_err());
        assert_eq!(DayRange::new(86, 95).unwrap().min, 86);
    }

    #[test]
    fn test_annual_form_scope() {
        let config = ReconConfig::default();
        assert!(config.annual_form_allowed(None));
        assert!(config.annual_form_allowed(Some("10-Q")));

        let config = config.with_annual_forms(["10-K", "10-K/A"]);
        assert!(config.annual_form_allowed(Some("10-K")));
        assert!(!config.annual_form_allowed(Some("10-Q")));
        assert!(!config.annual_form_allowed(None));
    }

    #[test]
    fn test_config_from_partial_json() {
        let json = r#"{ "revision_policy": "LatestFiled", "delta_gap_days": { "min": 86, "max": 95 } }"#;
        let config: ReconConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.revision_policy, RevisionPolicy::LatestFiled);
        assert_eq!(config.delta_gap_days.min, 86);
        assert_eq!(config.quarter_days, DayRange::QUARTER);
    }

    #[test]
    fn test_metric_spec_builder() {
        let spec = MetricSpec::new("capex", ["PaymentsToAcquirePropertyPlantAndEquipment"])
            .sign_ambiguous()
            .with_basis(SeriesBasis::YearToDate);
        assert!(spec.sign_ambiguous);
        assert!(!spec.required);
        assert_eq!(spec.basis, SeriesBasis::YearToDate);
        assert_eq!(spec.candidates.len(), 1);
    }
}
