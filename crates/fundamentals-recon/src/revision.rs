//! Revision resolution: one surviving fact per observed period.

use fundamentals_core::{ObservedPeriod, RawFact, RevisionPolicy};
use std::collections::HashSet;

/// Collapses facts covering the same `(start, end)` period into one.
///
/// Facts are stably sorted by filing date (ascending for
/// [`RevisionPolicy::FirstFiled`], descending for
/// [`RevisionPolicy::LatestFiled`]) and the first per period is kept. Equal
/// filing dates keep input order. Survivors come back sorted by period end,
/// then period start.
#[must_use]
pub fn resolve(facts: &[RawFact], policy: RevisionPolicy) -> Vec<RawFact> {
    let mut by_filing: Vec<&RawFact> = facts.iter().collect();
    match policy {
        RevisionPolicy::FirstFiled => by_filing.sort_by_key(|f| f.filed),
        RevisionPolicy::LatestFiled => by_filing.sort_by(|a, b| b.filed.cmp(&a.filed)),
    }

    let mut seen: HashSet<ObservedPeriod> = HashSet::with_capacity(by_filing.len());
    let mut survivors: Vec<RawFact> = by_filing
        .into_iter()
        .filter(|f| seen.insert(f.period()))
        .cloned()
        .collect();

    survivors.sort_by_key(|f| (f.end, f.start));
    survivors
}
