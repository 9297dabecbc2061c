//! Reconciled tables as polars DataFrames and CSV.

use std::io::Write;

use fundamentals_core::{ReconError, ReconciledTable, Result};
use polars::prelude::{Column, CsvWriter, DataFrame, DataType, SerWriter};

/// Name of the quarter label column, rendered like `Q3 2024`.
pub const QUARTER_COLUMN: &str = "quarter";

/// Name of the calendar quarter-end date column.
pub const QUARTER_END_COLUMN: &str = "quarter_end";

/// Converts a table into a DataFrame.
///
/// Columns: [`QUARTER_COLUMN`], [`QUARTER_END_COLUMN`] and one nullable
/// `f64` column per metric, in table order.
///
/// # Errors
///
/// Returns [`ReconError::Export`] if a metric name collides with another
/// column or a date is out of range.
pub fn to_dataframe(table: &ReconciledTable) -> Result<DataFrame> {
    let epoch = chrono::NaiveDate::default();
    let quarters: Vec<String> = table.rows().iter().map(|r| r.quarter.to_string()).collect();
    let days = table
        .rows()
        .iter()
        .map(|r| i32::try_from((r.quarter.end_date() - epoch).num_days()))
        .collect::<std::result::Result<Vec<i32>, _>>()
        .map_err(|e| ReconError::Export(e.to_string()))?;

    let quarter_end = Column::new(QUARTER_END_COLUMN.into(), days)
        .cast(&DataType::Date)
        .map_err(|e| ReconError::Export(e.to_string()))?;

    let mut columns = Vec::with_capacity(table.metrics().len() + 2);
    columns.push(Column::new(QUARTER_COLUMN.into(), quarters));
    columns.push(quarter_end);
    for metric in table.metrics() {
        let values = table.column(metric).unwrap_or_default();
        columns.push(Column::new(metric.as_str().into(), values));
    }

    DataFrame::new(columns).map_err(|e| ReconError::Export(e.to_string()))
}

/// Writes a table as CSV with a header row. Null values are empty cells.
///
/// # Errors
///
/// Returns [`ReconError::Export`] if the table cannot be converted or the
/// writer fails.
pub fn write_csv<W: Write>(table: &ReconciledTable, writer: W) -> Result<()> {
    let mut df = to_dataframe(table)?;
    CsvWriter::new(writer)
        .include_header(true)
        .finish(&mut df)
        .map_err(|e| ReconError::Export(e.to_string()))
}
