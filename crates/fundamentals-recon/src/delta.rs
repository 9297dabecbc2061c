//! Conversion of cumulative (year-to-date) values into single-quarter deltas.

use fundamentals_core::{DayRange, FiscalPeriod, QuarterlyDelta, RawFact, ReconciledSeries};

use crate::diagnostics::{Anomaly, Diagnostics};

/// Walks facts sorted by period end and emits one delta per eligible fact.
///
/// - Q1 facts and derived Q4 facts already hold one quarter and are emitted as-is.
/// - Every other fact needs the immediately preceding fact, and the gap between
///   the two period ends must lie in `gap`; otherwise the point is dropped.
///   A fact starting on or after the preceding end is a discrete quarter and
///   is emitted as-is. Anything else is year-to-date and is differenced.
///
/// The preceding fact is always the previous input fact, whether or not that
/// one produced a delta.
pub fn to_deltas(
    facts: &[RawFact],
    gap: DayRange,
    diagnostics: &mut Diagnostics,
) -> Vec<QuarterlyDelta> {
    let mut deltas = Vec::with_capacity(facts.len());
    let mut previous: Option<&RawFact> = None;

    for fact in facts {
        let standalone = fact.is_labelled(FiscalPeriod::Q1) || fact.is_derived();

        let value = if standalone {
            fact.value
        } else {
            match previous {
                None => {
                    diagnostics.record(Anomaly::EligibilityGap {
                        concept: fact.concept.clone(),
                        end: fact.end,
                        gap_days: None,
                    });
                    previous = Some(fact);
                    continue;
                }
                Some(prev) => {
                    let days = (fact.end - prev.end).num_days();
                    if !gap.contains(days) {
                        diagnostics.record(Anomaly::EligibilityGap {
                            concept: fact.concept.clone(),
                            end: fact.end,
                            gap_days: Some(days),
                        });
                        previous = Some(fact);
                        continue;
                    }
                    if fact.start >= prev.end {
                        fact.value
                    } else {
                        fact.value.zip(prev.value).map(|(this, before)| this - before)
                    }
                }
            }
        };

        match value {
            Some(value) => deltas.push(QuarterlyDelta::new(fact.end, value)),
            None => diagnostics.record(Anomaly::MissingValue {
                concept: fact.concept.clone(),
                end: fact.end,
            }),
        }
        previous = Some(fact);
    }

    deltas
}

/// Collects deltas into a series keyed by calendar quarter.
///
/// Deltas must be in period-end order; when two fall in the same quarter the
/// earlier one is kept.
pub fn to_series(
    metric: &str,
    concept: &str,
    deltas: &[QuarterlyDelta],
    diagnostics: &mut Diagnostics,
) -> ReconciledSeries {
    let mut series = ReconciledSeries::new(metric);
    for delta in deltas {
        let quarter = delta.label();
        if !series.insert_if_absent(quarter, delta.value) {
            diagnostics.record(Anomaly::DuplicateQuarter {
                concept: concept.to_string(),
                quarter,
            });
        }
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};
    use fundamentals_core::{FactOrigin, QuarterLabel};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ytd(end: NaiveDate, value: f64, fp: FiscalPeriod) -> RawFact {
        RawFact::new("X", date(end.year(), 1, 1), end, Some(value))
            .unwrap()
            .with_fiscal_period(fp)
    }

    #[test]
    fn test_ytd_chain_round_trips_to_fy() {
        let mut diagnostics = Diagnostics::new();
        let facts = vec![
            ytd(date(2023, 3, 31), 10.0, FiscalPeriod::Q1),
            ytd(date(2023, 6, 30), 22.0, FiscalPeriod::Q2),
            ytd(date(2023, 9, 30), 35.0, FiscalPeriod::Q3),
            ytd(date(2023, 12, 31), 50.0, FiscalPeriod::FY),
        ];

        let deltas = to_deltas(&facts, DayRange::QUARTER, &mut diagnostics);

        let values: Vec<f64> = deltas.iter().map(|d| d.value).collect();
        assert_eq!(values, vec![10.0, 12.0, 13.0, 15.0]);
        assert_eq!(values.iter().sum::<f64>(), 50.0);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_derived_q4_is_emitted_as_is() {
        let mut diagnostics = Diagnostics::new();
        let mut q4 = RawFact::new("X", date(2023, 9, 30), date(2023, 12, 31), Some(15.0))
            .unwrap()
            .with_fiscal_period(FiscalPeriod::Q4);
        q4.origin = FactOrigin::DerivedQ4;
        let facts = vec![ytd(date(2023, 9, 30), 35.0, FiscalPeriod::Q3), q4];

        let deltas = to_deltas(&facts, DayRange::QUARTER, &mut diagnostics);

        // The leading Q3 has nothing to difference against.
        assert_eq!(deltas, vec![QuarterlyDelta::new(date(2023, 12, 31), 15.0)]);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_gap_outside_window_drops_point() {
        let mut diagnostics = Diagnostics::new();
        let facts = vec![
            ytd(date(2023, 3, 31), 10.0, FiscalPeriod::Q1),
            // Q2 missing: Q3 is 183 days after Q1.
            ytd(date(2023, 9, 30), 35.0, FiscalPeriod::Q3),
            ytd(date(2023, 12, 31), 50.0, FiscalPeriod::FY),
        ];

        let deltas = to_deltas(&facts, DayRange::QUARTER, &mut diagnostics);

        assert_eq!(
            deltas,
            vec![
                QuarterlyDelta::new(date(2023, 3, 31), 10.0),
                QuarterlyDelta::new(date(2023, 12, 31), 15.0),
            ]
        );
        assert_eq!(
            diagnostics.anomalies(),
            &[Anomaly::EligibilityGap {
                concept: "X".to_string(),
                end: date(2023, 9, 30),
                gap_days: Some(183),
            }]
        );
    }

    #[test]
    fn test_gap_bounds_follow_configured_range() {
        let facts = vec![
            ytd(date(2023, 3, 31), 10.0, FiscalPeriod::Q1),
            ytd(date(2023, 6, 24), 22.0, FiscalPeriod::Q2),
        ];
        // 85 days apart: accepted inclusively, rejected by a strict lower bound.
        let mut diagnostics = Diagnostics::new();
        assert_eq!(to_deltas(&facts, DayRange::QUARTER, &mut diagnostics).len(), 2);

        let strict = DayRange::new(86, 95).unwrap();
        assert_eq!(to_deltas(&facts, strict, &mut diagnostics).len(), 1);
    }

    #[test]
    fn test_discrete_quarters_are_not_differenced() {
        let mut diagnostics = Diagnostics::new();
        let discrete = |start: NaiveDate, end: NaiveDate, value: f64, fp: FiscalPeriod| {
            RawFact::new("X", start, end, Some(value))
                .unwrap()
                .with_fiscal_period(fp)
        };
        let facts = vec![
            discrete(date(2023, 1, 1), date(2023, 3, 31), 10.0, FiscalPeriod::Q1),
            discrete(date(2023, 4, 1), date(2023, 6, 30), 12.0, FiscalPeriod::Q2),
            discrete(date(2023, 7, 1), date(2023, 9, 30), 13.0, FiscalPeriod::Q3),
        ];

        let deltas = to_deltas(&facts, DayRange::QUARTER, &mut diagnostics);

        let values: Vec<f64> = deltas.iter().map(|d| d.value).collect();
        assert_eq!(values, vec![10.0, 12.0, 13.0]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_null_value_drops_point() {
        let mut diagnostics = Diagnostics::new();
        let mut q2 = ytd(date(2023, 6, 30), 0.0, FiscalPeriod::Q2);
        q2.value = None;
        let facts = vec![
            ytd(date(2023, 3, 31), 10.0, FiscalPeriod::Q1),
            q2,
            ytd(date(2023, 9, 30), 35.0, FiscalPeriod::Q3),
        ];

        let deltas = to_deltas(&facts, DayRange::QUARTER, &mut diagnostics);

        assert_eq!(deltas.len(), 1);
        assert_eq!(
            diagnostics.count(|a| matches!(a, Anomaly::MissingValue { .. })),
            2
        );
    }

    #[test]
    fn test_to_series_keeps_earlier_delta_per_quarter() {
        let mut diagnostics = Diagnostics::new();
        let deltas = vec![
            QuarterlyDelta::new(date(2023, 3, 25), 1.0),
            QuarterlyDelta::new(date(2023, 3, 31), 2.0),
            QuarterlyDelta::new(date(2023, 6, 30), 3.0),
        ];

        let series = to_series("m", "X", &deltas, &mut diagnostics);

        assert_eq!(series.metric(), "m");
        assert_eq!(series.get(&QuarterLabel::new(1, 2023).unwrap()), Some(1.0));
        assert_eq!(series.non_null_count(), 2);
        assert_eq!(diagnostics.len(), 1);
    }
}
