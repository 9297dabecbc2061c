//! Core data types for disclosure facts.
//!
//! This module defines the input side of the reconciliation:
//!
//! - [`Symbol`] - Ticker symbol a company is requested by
//! - [`RawFact`] - One disclosed data point for one concept tag
//! - [`FactBook`] - All facts of one company, grouped by concept tag
//! - [`QuarterlyDelta`] - A single-quarter flow produced from cumulative facts

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{ReconError, Result};
use crate::period::{FiscalPeriod, ObservedPeriod};
use crate::quarter::QuarterLabel;

/// A trading symbol/ticker.
///
/// Symbols are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Where a fact came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactOrigin {
    /// Disclosed by the filer.
    #[default]
    Reported,
    /// Synthesized as full year minus the third-quarter year-to-date value.
    DerivedQ4,
}

/// One disclosed data point for one concept tag.
///
/// Facts are immutable once built; [`RawFact::new`] rejects periods that end
/// before they start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawFact {
    /// Concept tag the value was disclosed under.
    pub concept: String,
    /// First day of the reported period.
    pub start: NaiveDate,
    /// Last day of the reported period.
    pub end: NaiveDate,
    /// Reported value in the native unit. `None` when the filer left it blank.
    pub value: Option<f64>,
    /// Filer-asserted fiscal period label.
    pub fiscal_period: Option<FiscalPeriod>,
    /// Date the fact was filed. Later filings may restate earlier ones.
    pub filed: NaiveDate,
    /// Form type of the filing (e.g. "10-Q", "10-K").
    pub form: Option<String>,
    /// Whether the fact was disclosed or synthesized.
    #[serde(default)]
    pub origin: FactOrigin,
}

impl RawFact {
    /// Creates a reported fact. The filing date defaults to the period end.
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::InvalidPeriod`] if `end` precedes `start`.
    pub fn new(
        concept: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        value: Option<f64>,
    ) -> Result<Self> {
        let concept = concept.into();
        if end < start {
            return Err(ReconError::InvalidPeriod {
                concept,
                start,
                end,
            });
        }
        Ok(Self {
            concept,
            start,
            end,
            value,
            fiscal_period: None,
            filed: end,
            form: None,
            origin: FactOrigin::Reported,
        })
    }

    /// Sets the fiscal period label.
    #[must_use]
    pub fn with_fiscal_period(mut self, fiscal_period: FiscalPeriod) -> Self {
        self.fiscal_period = Some(fiscal_period);
        self
    }

    /// Sets the filing date.
    #[must_use]
    pub fn with_filed(mut self, filed: NaiveDate) -> Self {
        self.filed = filed;
        self
    }

    /// Sets the form type.
    #[must_use]
    pub fn with_form(mut self, form: impl Into<String>) -> Self {
        self.form = Some(form.into());
        self
    }

    /// The `(start, end)` key this fact covers.
    #[must_use]
    pub const fn period(&self) -> ObservedPeriod {
        ObservedPeriod::new(self.start, self.end)
    }

    /// Length of the reported period in days.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Returns true if the label is the given fiscal period.
    #[must_use]
    pub fn is_labelled(&self, fiscal_period: FiscalPeriod) -> bool {
        self.fiscal_period == Some(fiscal_period)
    }

    /// Returns true if this fact was synthesized rather than disclosed.
    #[must_use]
    pub fn is_derived(&self) -> bool {
        self.origin != FactOrigin::Reported
    }
}

/// All facts of one company, grouped by concept tag.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FactBook {
    /// Name of the reporting entity, when the source knows it.
    pub entity: Option<String>,
    facts: BTreeMap<String, Vec<RawFact>>,
}

impl FactBook {
    /// Creates an empty fact book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the entity name.
    #[must_use]
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Adds a fact under its own concept tag.
    pub fn insert(&mut self, fact: RawFact) {
        self.facts.entry(fact.concept.clone()).or_default().push(fact);
    }

    /// Facts disclosed under `concept`, empty if the tag is absent.
    #[must_use]
    pub fn get(&self, concept: &str) -> &[RawFact] {
        self.facts.get(concept).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns true if at least one fact exists for `concept`.
    #[must_use]
    pub fn contains(&self, concept: &str) -> bool {
        !self.get(concept).is_empty()
    }

    /// Iterates over the concept tags present.
    pub fn concepts(&self) -> impl Iterator<Item = &str> {
        self.facts.keys().map(String::as_str)
    }

    /// Number of distinct concept tags.
    #[must_use]
    pub fn concept_count(&self) -> usize {
        self.facts.len()
    }

    /// Total number of facts across all tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.values().map(Vec::len).sum()
    }

    /// Returns true if the book holds no facts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Extend<RawFact> for FactBook {
    fn extend<I: IntoIterator<Item = RawFact>>(&mut self, iter: I) {
        for fact in iter {
            self.insert(fact);
        }
    }
}

impl FromIterator<RawFact> for FactBook {
    fn from_iter<I: IntoIterator<Item = RawFact>>(iter: I) -> Self {
        let mut book = Self::new();
        book.extend(iter);
        book
    }
}

/// The flow attributable to exactly one quarter, keyed by its period end.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuarterlyDelta {
    /// Period end of the quarter.
    pub end: NaiveDate,
    /// Single-quarter amount (never cumulative).
    pub value: f64,
}

impl QuarterlyDelta {
    /// Creates a new quarterly delta.
    #[must_use]
    pub const fn new(end: NaiveDate, value: f64) -> Self {
        Self { end, value }
    }

    /// Calendar quarter this delta falls in.
    #[must_use]
    pub fn label(&self) -> QuarterLabel {
        QuarterLabel::from_date(self.end)
    }
}
