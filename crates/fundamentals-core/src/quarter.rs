//! Calendar quarter labels.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ReconError, Result};

/// A calendar quarter, ordered by `(year, quarter)`.
///
/// Rendered as `"Q3 2024"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuarterLabel {
    year: i32,
    quarter: u8,
}

impl QuarterLabel {
    /// Creates a label for `quarter` (1-4) of `year`.
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::InvalidParameter`] if `quarter` is not in 1..=4.
    pub fn new(quarter: u8, year: i32) -> Result<Self> {
        if !(1..=4).contains(&quarter) {
            return Err(ReconError::InvalidParameter(format!(
                "Quarter must be between 1 and 4, got {quarter}"
            )));
        }
        Ok(Self { year, quarter })
    }

    /// The calendar quarter containing `date`.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            quarter: ((date.month0() / 3) + 1) as u8,
        }
    }

    /// Quarter number (1-4).
    #[must_use]
    pub const fn quarter(&self) -> u8 {
        self.quarter
    }

    /// Calendar year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// The following quarter.
    #[must_use]
    pub const fn next(&self) -> Self {
        if self.quarter == 4 {
            Self {
                year: self.year + 1,
                quarter: 1,
            }
        } else {
            Self {
                year: self.year,
                quarter: self.quarter + 1,
            }
        }
    }

    /// The preceding quarter.
    #[must_use]
    pub const fn prev(&self) -> Self {
        if self.quarter == 1 {
            Self {
                year: self.year - 1,
                quarter: 4,
            }
        } else {
            Self {
                year: self.year,
                quarter: self.quarter - 1,
            }
        }
    }

    /// Last calendar day of the quarter.
    #[must_use]
    pub fn end_date(&self) -> NaiveDate {
        let next = self.next();
        let first_of_next =
            NaiveDate::from_ymd_opt(next.year, u32::from(next.quarter - 1) * 3 + 1, 1)
                .unwrap_or(NaiveDate::MAX);
        first_of_next.pred_opt().unwrap_or(first_of_next)
    }

    /// Every quarter from `first` to `last`, inclusive. Empty if `last < first`.
    pub fn range(first: Self, last: Self) -> impl Iterator<Item = Self> {
        let mut current = Some(first).filter(|q| *q <= last);
        std::iter::from_fn(move || {
            let out = current?;
            current = Some(out.next()).filter(|q| *q <= last);
            Some(out)
        })
    }
}

impl fmt::Display for QuarterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{} {}", self.quarter, self.year)
    }
}

impl FromStr for QuarterLabel {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self> {
        let bad = || ReconError::Parse(format!("Invalid quarter label: {s}"));
        let (q, year) = s.trim().split_once(char::is_whitespace).ok_or_else(bad)?;
        let quarter = q
            .strip_prefix('Q')
            .and_then(|n| n.parse::<u8>().ok())
            .ok_or_else(bad)?;
        let year = year.trim().parse::<i32>().map_err(|_| bad())?;
        Self::new(quarter, year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(quarter: u8, year: i32) -> QuarterLabel {
        QuarterLabel::new(quarter, year).unwrap()
    }

    #[test]
    fn test_from_date_uses_calendar_month() {
        let cases = [
            ((2024, 1, 31), "Q1 2024"),
            ((2024, 3, 30), "Q1 2024"),
            ((2024, 6, 29), "Q2 2024"),
            ((2024, 9, 28), "Q3 2024"),
            ((2024, 12, 28), "Q4 2024"),
        ];
        for ((y, m, d), expected) in cases {
            let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
            assert_eq!(QuarterLabel::from_date(date).to_string(), expected);
        }
    }

    #[test]
    fn test_ordering_by_year_then_quarter() {
        assert!(q(4, 2023) < q(1, 2024));
        assert!(q(2, 2024) < q(3, 2024));
        assert_eq!(q(4, 2023).next(), q(1, 2024));
        assert_eq!(q(1, 2024).prev(), q(4, 2023));
    }

    #[test]
    fn test_parse_label() {
        assert_eq!("Q3 2024".parse::<QuarterLabel>().unwrap(), q(3, 2024));
        assert!("Q5 2024".parse::<QuarterLabel>().is_err());
        assert!("2024Q1".parse::<QuarterLabel>().is_err());
    }

    #[test]
    fn test_end_date() {
        assert_eq!(q(1, 2024).end_date(), NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        assert_eq!(q(4, 2024).end_date(), NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }

    #[test]
    fn test_range_is_contiguous() {
        let labels: Vec<_> = QuarterLabel::range(q(3, 2023), q(2, 2024)).collect();
        assert_eq!(labels, vec![q(3, 2023), q(4, 2023), q(1, 2024), q(2, 2024)]);
        assert_eq!(QuarterLabel::range(q(2, 2024), q(1, 2024)).count(), 0);
        assert_eq!(QuarterLabel::range(q(2, 2024), q(2, 2024)).count(), 1);
    }
}
