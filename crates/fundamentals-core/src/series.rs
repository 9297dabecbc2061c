//! Reconciled quarterly series and the aligned table built from them.
//!
//! - [`ReconciledSeries`] - One metric keyed by [`QuarterLabel`], absent quarters have no entry
//! - [`ReconciledTable`] - Several metrics joined over a contiguous quarter calendar
//! - [`TableRow`] - One quarter of the table with a nullable value per metric

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::error::{ReconError, Result};
use crate::quarter::QuarterLabel;

/// Quarterly values of one logical metric.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciledSeries {
    metric: String,
    values: BTreeMap<QuarterLabel, f64>,
}

impl ReconciledSeries {
    /// Creates an empty series for `metric`.
    #[must_use]
    pub fn new(metric: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            values: BTreeMap::new(),
        }
    }

    /// Name of the metric this series holds.
    #[must_use]
    pub fn metric(&self) -> &str {
        &self.metric
    }

    /// Renames the series.
    #[must_use]
    pub fn with_metric(mut self, metric: impl Into<String>) -> Self {
        self.metric = metric.into();
        self
    }

    /// Sets the value for `quarter`, replacing any previous value.
    pub fn insert(&mut self, quarter: QuarterLabel, value: f64) {
        self.values.insert(quarter, value);
    }

    /// Sets the value for `quarter` only if it has none yet.
    ///
    /// Returns true if the value was stored.
    pub fn insert_if_absent(&mut self, quarter: QuarterLabel, value: f64) -> bool {
        match self.values.entry(quarter) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    /// Value for `quarter`, if observed.
    #[must_use]
    pub fn get(&self, quarter: &QuarterLabel) -> Option<f64> {
        self.values.get(quarter).copied()
    }

    /// Number of quarters with a value.
    #[must_use]
    pub fn non_null_count(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no quarter has a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Earliest observed quarter.
    #[must_use]
    pub fn first_quarter(&self) -> Option<QuarterLabel> {
        self.values.keys().next().copied()
    }

    /// Latest observed quarter.
    #[must_use]
    pub fn last_quarter(&self) -> Option<QuarterLabel> {
        self.values.keys().next_back().copied()
    }

    /// Iterates over `(quarter, value)` in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (QuarterLabel, f64)> + '_ {
        self.values.iter().map(|(q, v)| (*q, *v))
    }

    /// Observed values in chronological order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.values().copied()
    }

    /// Applies `f` to every observed value.
    pub fn map_values(&mut self, f: impl Fn(f64) -> f64) {
        for value in self.values.values_mut() {
            *value = f(*value);
        }
    }

    /// Sum of the last `quarters` calendar quarters ending at the latest
    /// observed quarter.
    ///
    /// Returns `None` if the series is empty, `quarters` is zero, or any of
    /// those quarters is missing.
    #[must_use]
    pub fn trailing_sum(&self, quarters: usize) -> Option<f64> {
        if quarters == 0 {
            return None;
        }
        let mut label = self.last_quarter()?;
        let mut total = 0.0;
        for i in 0..quarters {
            if i > 0 {
                label = label.prev();
            }
            total += self.get(&label)?;
        }
        Some(total)
    }
}

impl Extend<(QuarterLabel, f64)> for ReconciledSeries {
    fn extend<I: IntoIterator<Item = (QuarterLabel, f64)>>(&mut self, iter: I) {
        self.values.extend(iter);
    }
}

/// One quarter of a [`ReconciledTable`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Calendar quarter of the row.
    pub quarter: QuarterLabel,
    /// One nullable value per metric, in the table's column order.
    pub values: Vec<Option<f64>>,
}

/// Several metrics joined over a contiguous, gap-free quarter calendar.
///
/// Quarters a metric did not observe carry `None`, never zero. Deserializing
/// runs the same checks as [`ReconciledTable::new`].
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ReconciledTable {
    metrics: Vec<String>,
    rows: Vec<TableRow>,
}

impl<'de> Deserialize<'de> for ReconciledTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Parts {
            metrics: Vec<String>,
            rows: Vec<TableRow>,
        }

        let parts = Parts::deserialize(deserializer)?;
        Self::new(parts.metrics, parts.rows).map_err(serde::de::Error::custom)
    }
}

impl ReconciledTable {
    /// Creates a table from column names and rows.
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::InvalidParameter`] if a row's width differs from
    /// the number of metrics, or rows are not strictly consecutive quarters.
    pub fn new(metrics: Vec<String>, rows: Vec<TableRow>) -> Result<Self> {
        if let Some(row) = rows.iter().find(|r| r.values.len() != metrics.len()) {
            return Err(ReconError::InvalidParameter(format!(
                "Row {} has {} values for {} metrics",
                row.quarter,
                row.values.len(),
                metrics.len()
            )));
        }
        if let Some(pair) = rows
            .windows(2)
            .find(|pair| pair[0].quarter.next() != pair[1].quarter)
        {
            return Err(ReconError::InvalidParameter(format!(
                "Rows {} and {} are not consecutive quarters",
                pair[0].quarter, pair[1].quarter
            )));
        }
        Ok(Self { metrics, rows })
    }

    /// Column names in order.
    #[must_use]
    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    /// Rows in chronological order.
    #[must_use]
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `metric` among the columns.
    #[must_use]
    pub fn column_index(&self, metric: &str) -> Option<usize> {
        self.metrics.iter().position(|m| m == metric)
    }

    /// All values of `metric`, one per row.
    #[must_use]
    pub fn column(&self, metric: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.column_index(metric)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    /// Value of `metric` in `quarter`, `None` when absent or out of range.
    #[must_use]
    pub fn value(&self, quarter: QuarterLabel, metric: &str) -> Option<f64> {
        let idx = self.column_index(metric)?;
        self.rows
            .iter()
            .find(|r| r.quarter == quarter)
            .and_then(|r| r.values[idx])
    }

    /// Applies `f` to every non-null value of `metric`.
    ///
    /// Returns false if the column does not exist.
    pub fn map_column(&mut self, metric: &str, f: impl Fn(f64) -> f64) -> bool {
        let Some(idx) = self.column_index(metric) else {
            return false;
        };
        for row in &mut self.rows {
            if let Some(value) = row.values[idx].as_mut() {
                *value = f(*value);
            }
        }
        true
    }

    /// Extracts one column back into a series, dropping null quarters.
    #[must_use]
    pub fn series(&self, metric: &str) -> Option<ReconciledSeries> {
        let idx = self.column_index(metric)?;
        let mut series = ReconciledSeries::new(metric);
        series.extend(
            self.rows
                .iter()
                .filter_map(|r| r.values[idx].map(|v| (r.quarter, v))),
        );
        Some(series)
    }

    /// Appends a column `name` holding `lhs - rhs`, null where either side is null.
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::InvalidParameter`] if `lhs` or `rhs` is not a
    /// column, or `name` already is one.
    pub fn with_difference(mut self, name: &str, lhs: &str, rhs: &str) -> Result<Self> {
        if self.column_index(name).is_some() {
            return Err(ReconError::InvalidParameter(format!(
                "Column {name} already exists"
            )));
        }
        let left = self
            .column_index(lhs)
            .ok_or_else(|| ReconError::InvalidParameter(format!("Unknown column: {lhs}")))?;
        let right = self
            .column_index(rhs)
            .ok_or_else(|| ReconError::InvalidParameter(format!("Unknown column: {rhs}")))?;

        for row in &mut self.rows {
            let diff = match (row.values[left], row.values[right]) {
                (Some(a), Some(b)) => Some(a - b),
                _ => None,
            };
            row.values.push(diff);
        }
        self.metrics.push(name.to_string());
        Ok(self)
    }
}
