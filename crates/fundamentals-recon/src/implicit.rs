//! Derivation of the fourth quarter that annual filings never state directly.

use chrono::NaiveDate;
use fundamentals_core::{FactOrigin, FiscalPeriod, RawFact};

use crate::diagnostics::{Anomaly, Diagnostics, MissingInput};

/// Synthesizes a Q4 fact for every FY fact in `annual`.
///
/// The Q4 value is `FY - Q3`, where Q3 is the cumulative Q3-labelled fact
/// from either track that shares the FY start and ends inside the fiscal
/// year. The latest such Q3 wins, then the longer period. Filers that only
/// report three-month quarters get `FY - (Q1 + Q2 + Q3)` instead, when three
/// contiguous quarters from the quarterly track tile the year from its start.
/// The derived period runs from the end of the nine months to the FY end and
/// carries the FY filing date.
///
/// Years without nine qualifying months, or with a null value on either side,
/// are skipped and recorded. No Q4 is synthesized when `quarterly` already
/// holds a fact ending on the FY end.
pub fn derive_fourth_quarters(
    annual: &[RawFact],
    quarterly: &[RawFact],
    diagnostics: &mut Diagnostics,
) -> Vec<RawFact> {
    let mut derived = Vec::new();

    for fy in annual.iter().filter(|f| f.is_labelled(FiscalPeriod::FY)) {
        if quarterly.iter().any(|q| q.end == fy.end) {
            continue;
        }

        let nine_months = cumulative_q3(fy, annual, quarterly)
            .map(|q3| (q3.end, q3.value))
            .or_else(|| discrete_nine_months(fy, quarterly));

        let Some((nine_months_end, nine_months_value)) = nine_months else {
            diagnostics.record(Anomaly::MissingDerivationInput {
                concept: fy.concept.clone(),
                annual_end: fy.end,
                reason: MissingInput::NoPrecedingQ3,
            });
            continue;
        };

        let (Some(annual_value), Some(nine_months_value)) = (fy.value, nine_months_value) else {
            diagnostics.record(Anomaly::MissingDerivationInput {
                concept: fy.concept.clone(),
                annual_end: fy.end,
                reason: MissingInput::NullValue,
            });
            continue;
        };

        derived.push(RawFact {
            concept: fy.concept.clone(),
            start: nine_months_end,
            end: fy.end,
            value: Some(annual_value - nine_months_value),
            fiscal_period: Some(FiscalPeriod::Q4),
            filed: fy.filed,
            form: fy.form.clone(),
            origin: FactOrigin::DerivedQ4,
        });
    }

    derived
}

/// The Q3 year-to-date fact of `fy`: Q3-labelled, same start, ending before it.
fn cumulative_q3<'a>(
    fy: &RawFact,
    annual: &'a [RawFact],
    quarterly: &'a [RawFact],
) -> Option<&'a RawFact> {
    annual
        .iter()
        .chain(quarterly)
        .filter(|f| {
            f.is_labelled(FiscalPeriod::Q3)
                && f.start == fy.start
                && f.end < fy.end
                && f.end >= fy.start
        })
        .max_by_key(|f| (f.end, f.days()))
}

/// End and summed value of three back-to-back quarters opening `fy`.
///
/// Quarters chain when the next one starts on the previous end or the day
/// after. The sum is `None` if any of the three values is null.
fn discrete_nine_months(fy: &RawFact, quarterly: &[RawFact]) -> Option<(NaiveDate, Option<f64>)> {
    let mut in_year: Vec<&RawFact> = quarterly
        .iter()
        .filter(|q| q.start >= fy.start && q.end < fy.end)
        .collect();
    in_year.sort_by_key(|q| (q.end, q.start));

    let mut chain: Vec<&RawFact> = Vec::with_capacity(3);
    for quarter in in_year {
        let links = match chain.last() {
            None => quarter.start == fy.start,
            Some(prev) => (0..=1).contains(&(quarter.start - prev.end).num_days()),
        };
        if links {
            chain.push(quarter);
        }
        if chain.len() == 3 {
            break;
        }
    }

    if chain.len() < 3 {
        return None;
    }
    let end = chain.last()?.end;
    let sum = chain.iter().try_fold(0.0, |acc, q| q.value.map(|v| acc + v));
    Some((end, sum))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fact(start: NaiveDate, end: NaiveDate, value: Option<f64>, fp: FiscalPeriod) -> RawFact {
        RawFact::new("X", start, end, value)
            .unwrap()
            .with_fiscal_period(fp)
    }

    fn fy(year: i32, value: Option<f64>) -> RawFact {
        fact(date(year, 1, 1), date(year, 12, 31), value, FiscalPeriod::FY)
            .with_filed(date(year + 1, 2, 15))
    }

    fn q3_ytd(year: i32, value: Option<f64>) -> RawFact {
        fact(date(year, 1, 1), date(year, 9, 30), value, FiscalPeriod::Q3)
    }

    #[test]
    fn test_q4_is_fy_minus_q3() {
        let mut diagnostics = Diagnostics::new();
        let annual = vec![q3_ytd(2023, Some(35.0)), fy(2023, Some(50.0))];

        let derived = derive_fourth_quarters(&annual, &[], &mut diagnostics);

        assert_eq!(derived.len(), 1);
        let q4 = &derived[0];
        assert_eq!(q4.value, Some(15.0));
        assert_eq!(q4.start, date(2023, 9, 30));
        assert_eq!(q4.end, date(2023, 12, 31));
        assert_eq!(q4.filed, date(2024, 2, 15));
        assert!(q4.is_labelled(FiscalPeriod::Q4));
        assert!(q4.is_derived());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_prefers_q3_on_same_cumulative_basis() {
        let mut diagnostics = Diagnostics::new();
        let annual = vec![q3_ytd(2023, Some(35.0)), fy(2023, Some(50.0))];
        let three_month_q3 = fact(date(2023, 7, 1), date(2023, 9, 30), Some(13.0), FiscalPeriod::Q3);

        let derived = derive_fourth_quarters(&annual, &[three_month_q3], &mut diagnostics);

        assert_eq!(derived[0].value, Some(15.0));
    }

    #[test]
    fn test_three_month_q3_alone_is_not_subtracted() {
        let mut diagnostics = Diagnostics::new();
        let annual = vec![fy(2023, Some(50.0))];
        let three_month_q3 = fact(date(2023, 7, 1), date(2023, 9, 30), Some(13.0), FiscalPeriod::Q3);

        let derived = derive_fourth_quarters(&annual, &[three_month_q3], &mut diagnostics);

        assert!(derived.is_empty());
        assert_eq!(
            diagnostics.count(|a| matches!(
                a,
                Anomaly::MissingDerivationInput {
                    reason: MissingInput::NoPrecedingQ3,
                    ..
                }
            )),
            1
        );
    }

    #[test]
    fn test_q4_from_three_month_quarters() {
        let mut diagnostics = Diagnostics::new();
        let annual = vec![fy(2023, Some(50.0))];
        let quarterly = vec![
            fact(date(2023, 1, 1), date(2023, 3, 31), Some(10.0), FiscalPeriod::Q1),
            fact(date(2023, 4, 1), date(2023, 6, 30), Some(12.0), FiscalPeriod::Q2),
            fact(date(2023, 7, 1), date(2023, 9, 30), Some(13.0), FiscalPeriod::Q3),
        ];

        let derived = derive_fourth_quarters(&annual, &quarterly, &mut diagnostics);

        assert_eq!(derived.len(), 1);
        assert_eq!(derived[0].value, Some(15.0));
        assert_eq!(derived[0].start, date(2023, 9, 30));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_three_month_quarters_with_a_hole_are_skipped() {
        let mut diagnostics = Diagnostics::new();
        let annual = vec![fy(2023, Some(50.0))];
        let quarterly = vec![
            fact(date(2023, 1, 1), date(2023, 3, 31), Some(10.0), FiscalPeriod::Q1),
            fact(date(2023, 7, 1), date(2023, 9, 30), Some(13.0), FiscalPeriod::Q3),
        ];

        let derived = derive_fourth_quarters(&annual, &quarterly, &mut diagnostics);

        assert!(derived.is_empty());
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_null_three_month_quarter_is_never_defaulted() {
        let mut diagnostics = Diagnostics::new();
        let annual = vec![fy(2023, Some(50.0))];
        let quarterly = vec![
            fact(date(2023, 1, 1), date(2023, 3, 31), Some(10.0), FiscalPeriod::Q1),
            fact(date(2023, 4, 1), date(2023, 6, 30), None, FiscalPeriod::Q2),
            fact(date(2023, 7, 1), date(2023, 9, 30), Some(13.0), FiscalPeriod::Q3),
        ];

        let derived = derive_fourth_quarters(&annual, &quarterly, &mut diagnostics);

        assert!(derived.is_empty());
        assert!(matches!(
            diagnostics.anomalies(),
            [Anomaly::MissingDerivationInput {
                reason: MissingInput::NullValue,
                ..
            }]
        ));
    }

    #[test]
    fn test_missing_q3_skips_year_only() {
        let mut diagnostics = Diagnostics::new();
        let annual = vec![fy(2022, Some(40.0)), q3_ytd(2023, Some(35.0)), fy(2023, Some(50.0))];

        let derived = derive_fourth_quarters(&annual, &[], &mut diagnostics);

        assert_eq!(derived.len(), 1);
        assert_eq!(derived[0].end, date(2023, 12, 31));
        assert_eq!(
            diagnostics.anomalies(),
            &[Anomaly::MissingDerivationInput {
                concept: "X".to_string(),
                annual_end: date(2022, 12, 31),
                reason: MissingInput::NoPrecedingQ3,
            }]
        );
    }

    #[test]
    fn test_prior_year_q3_does_not_qualify() {
        let mut diagnostics = Diagnostics::new();
        let annual = vec![q3_ytd(2022, Some(30.0)), fy(2023, Some(50.0))];

        let derived = derive_fourth_quarters(&annual, &[], &mut diagnostics);

        assert!(derived.is_empty());
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_null_values_are_never_defaulted() {
        let mut diagnostics = Diagnostics::new();
        let annual = vec![q3_ytd(2023, None), fy(2023, Some(50.0)), q3_ytd(2024, Some(1.0)), fy(2024, None)];

        let derived = derive_fourth_quarters(&annual, &[], &mut diagnostics);

        assert!(derived.is_empty());
        assert_eq!(
            diagnostics.count(|a| matches!(
                a,
                Anomaly::MissingDerivationInput {
                    reason: MissingInput::NullValue,
                    ..
                }
            )),
            2
        );
    }

    #[test]
    fn test_reported_q4_suppresses_derivation() {
        let mut diagnostics = Diagnostics::new();
        let annual = vec![q3_ytd(2023, Some(35.0)), fy(2023, Some(50.0))];
        let reported_q4 = fact(date(2023, 10, 1), date(2023, 12, 31), Some(15.0), FiscalPeriod::Q4);

        let derived = derive_fourth_quarters(&annual, &[reported_q4], &mut diagnostics);

        assert!(derived.is_empty());
        assert!(diagnostics.is_empty());
    }
}
