//! Merging candidate concept tags into one series.

use fundamentals_core::ReconciledSeries;

/// Combines the series of several candidate tags into one series for `metric`.
///
/// Candidates are ordered by descending number of observed quarters (a stable
/// sort, so input priority breaks ties) and merged first-non-null: once a
/// quarter has a value from a wider series, narrower ones never overwrite it.
#[must_use]
pub fn stitch(metric: &str, candidates: Vec<ReconciledSeries>) -> ReconciledSeries {
    let mut ordered: Vec<ReconciledSeries> =
        candidates.into_iter().filter(|s| !s.is_empty()).collect();
    ordered.sort_by(|a, b| b.non_null_count().cmp(&a.non_null_count()));

    let mut merged = ReconciledSeries::new(metric);
    for candidate in &ordered {
        for (quarter, value) in candidate.iter() {
            merged.insert_if_absent(quarter, value);
        }
    }
    merged
}
