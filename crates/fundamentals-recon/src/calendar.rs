//! Alignment of several series onto one contiguous quarter calendar.

use fundamentals_core::{
    QuarterLabel, ReconError, ReconciledSeries, ReconciledTable, Result, TableRow,
};

/// Left-joins every series onto the calendar spanning the earliest to the
/// latest quarter observed in any of them.
///
/// Every quarter in that range gets a row; a series with no value for a
/// quarter contributes `None` there, never zero. Columns follow input order.
///
/// # Errors
///
/// Returns [`ReconError::NoData`] naming every series if all of them are
/// empty.
pub fn align(series: &[ReconciledSeries]) -> Result<ReconciledTable> {
    let first = series.iter().filter_map(ReconciledSeries::first_quarter).min();
    let last = series.iter().filter_map(ReconciledSeries::last_quarter).max();
    let (Some(first), Some(last)) = (first, last) else {
        let names: Vec<&str> = series.iter().map(ReconciledSeries::metric).collect();
        return Err(ReconError::NoData {
            metric: names.join(", "),
        });
    };

    let rows = QuarterLabel::range(first, last)
        .map(|quarter| TableRow {
            quarter,
            values: series.iter().map(|s| s.get(&quarter)).collect(),
        })
        .collect();

    let metrics = series.iter().map(|s| s.metric().to_string()).collect();
    ReconciledTable::new(metrics, rows)
}
