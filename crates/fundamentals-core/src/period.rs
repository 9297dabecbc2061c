//! Fiscal period labels and duration classes.
//!
//! This module defines [`FiscalPeriod`] for the filer-asserted period label,
//! [`DurationClass`] for the length bucket of a fact and [`ObservedPeriod`]
//! for the `(start, end)` key that revisions are resolved on.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ReconError;

/// Fiscal period label as asserted by the filer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FiscalPeriod {
    /// First fiscal quarter.
    Q1,
    /// Second fiscal quarter (year-to-date values span two quarters).
    Q2,
    /// Third fiscal quarter (year-to-date values span three quarters).
    Q3,
    /// Fourth fiscal quarter.
    Q4,
    /// Full fiscal year.
    FY,
}

impl FiscalPeriod {
    /// Returns true for the first fiscal quarter, whose year-to-date value is
    /// the quarter itself.
    #[must_use]
    pub const fn is_first_quarter(&self) -> bool {
        matches!(self, Self::Q1)
    }

    /// Returns the label as written in filings.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
            Self::Q4 => "Q4",
            Self::FY => "FY",
        }
    }
}

impl fmt::Display for FiscalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FiscalPeriod {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "Q1" => Ok(Self::Q1),
            "Q2" => Ok(Self::Q2),
            "Q3" => Ok(Self::Q3),
            "Q4" => Ok(Self::Q4),
            "FY" => Ok(Self::FY),
            other => Err(ReconError::Parse(format!("Unknown fiscal period: {other}"))),
        }
    }
}

/// Length bucket of a fact, derived from its start and end dates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DurationClass {
    /// Roughly three months.
    Quarterly,
    /// Roughly nine to twelve months.
    Annual,
    /// Anything else; excluded from both tracks.
    Other,
}

/// The `(start, end)` key of a disclosed period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObservedPeriod {
    /// First day of the period.
    pub start: NaiveDate,
    /// Last day of the period.
    pub end: NaiveDate,
}

impl ObservedPeriod {
    /// Creates a new observed period.
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Number of days between start and end.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl fmt::Display for ObservedPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
