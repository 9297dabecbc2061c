//! Sign convention normalization for flow metrics.
//!
//! Filers report the same outflow either as a negative number or as a
//! positive amount spent. A metric flagged sign-ambiguous is flipped when its
//! median is negative, so it always reads as a positive magnitude.

use fundamentals_core::{ReconciledSeries, ReconciledTable};

/// Median of the values, `None` when there are none. Even counts average the
/// two middle values.
#[must_use]
pub fn median(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Negates the series if its median is negative. Returns true if it flipped.
pub fn normalize_series(series: &mut ReconciledSeries) -> bool {
    match median(series.values()) {
        Some(m) if m < 0.0 => {
            series.map_values(|v| -v);
            true
        }
        _ => false,
    }
}

/// Negates the non-null values of `metric` if their median is negative.
///
/// Returns true if the column flipped, false if it did not or does not exist.
pub fn normalize_column(table: &mut ReconciledTable, metric: &str) -> bool {
    let Some(column) = table.column(metric) else {
        return false;
    };
    match median(column.into_iter().flatten()) {
        Some(m) if m < 0.0 => table.map_column(metric, |v| -v),
        _ => false,
    }
}
