//! Duration classification and track splitting.

use fundamentals_core::{DurationClass, FiscalPeriod, RawFact, ReconConfig};

/// Classifies a fact by the length of its period.
///
/// Quarterly and annual windows are inclusive on both ends. A fact whose form
/// is outside [`ReconConfig::annual_forms`] can never be annual.
#[must_use]
pub fn classify(fact: &RawFact, config: &ReconConfig) -> DurationClass {
    let days = fact.days();
    if config.quarter_days.contains(days) {
        DurationClass::Quarterly
    } else if config.annual_days.contains(days) && config.annual_form_allowed(fact.form.as_deref())
    {
        DurationClass::Annual
    } else {
        DurationClass::Other
    }
}

/// Facts split by length, ready for revision resolution.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tracks {
    /// Quarterly-length facts, plus short Q1 facts when exempted.
    pub quarterly: Vec<RawFact>,
    /// Annual-length facts.
    pub annual: Vec<RawFact>,
}

/// Splits facts into the quarterly and annual tracks, discarding the rest.
#[must_use]
pub fn split_tracks(facts: &[RawFact], config: &ReconConfig) -> Tracks {
    let mut tracks = Tracks::default();
    for fact in facts {
        match classify(fact, config) {
            DurationClass::Quarterly => tracks.quarterly.push(fact.clone()),
            DurationClass::Annual => tracks.annual.push(fact.clone()),
            DurationClass::Other if is_exempt_short_q1(fact, config) => {
                tracks.quarterly.push(fact.clone());
            }
            DurationClass::Other => {}
        }
    }
    tracks
}

fn is_exempt_short_q1(fact: &RawFact, config: &ReconConfig) -> bool {
    config.exempt_short_q1
        && fact.is_labelled(FiscalPeriod::Q1)
        && fact.days() < config.quarter_days.min
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn fact_of(days: i64) -> RawFact {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        RawFact::new("X", start, start + Duration::days(days), Some(1.0)).unwrap()
    }

    #[test]
    fn test_classify_boundaries() {
        let config = ReconConfig::default();
        for days in 0..400 {
            let expected = if (85..=95).contains(&days) {
                DurationClass::Quarterly
            } else if (270..=370).contains(&days) {
                DurationClass::Annual
            } else {
                DurationClass::Other
            };
            assert_eq!(classify(&fact_of(days), &config), expected, "days = {days}");
        }
    }

    #[test]
    fn test_annual_requires_allowed_form() {
        let config = ReconConfig::default().with_annual_forms(["10-K"]);
        assert_eq!(classify(&fact_of(365), &config), DurationClass::Other);
        assert_eq!(
            classify(&fact_of(365).with_form("10-K"), &config),
            DurationClass::Annual
        );
        assert_eq!(
            classify(&fact_of(90).with_form("10-Q"), &config),
            DurationClass::Quarterly
        );
    }

    #[test]
    fn test_split_tracks_with_short_q1_exemption() {
        let short_q1 = fact_of(60).with_fiscal_period(FiscalPeriod::Q1);
        let short_q2 = fact_of(60).with_fiscal_period(FiscalPeriod::Q2);
        let facts = vec![fact_of(90), fact_of(365), fact_of(180), short_q1, short_q2];

        let tracks = split_tracks(&facts, &ReconConfig::default());
        assert_eq!(tracks.quarterly.len(), 1);
        assert_eq!(tracks.annual.len(), 1);

        let tracks = split_tracks(&facts, &ReconConfig::default().with_short_q1_exemption(true));
        assert_eq!(tracks.quarterly.len(), 2);
        assert!(tracks.quarterly[1].is_labelled(FiscalPeriod::Q1));
    }
}
