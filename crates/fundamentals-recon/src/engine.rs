//! The reconciliation pipeline.
//!
//! [`Engine`] runs every stage in order for each requested metric:
//!
//! ```text
//! facts per tag -> classify -> resolve revisions -> derive Q4 -> deltas
//!              -> stitch candidate tags -> align calendar -> normalize signs
//! ```
//!
//! The engine is a pure function of its inputs. It performs no I/O and keeps
//! no state between calls beyond its configuration.

use std::collections::HashSet;

use fundamentals_core::{
    FactBook, FiscalPeriod, MetricSpec, QuarterlyDelta, RawFact, ReconConfig, ReconError,
    ReconciledSeries, ReconciledTable, Result, SeriesBasis,
};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::calendar::align;
use crate::classify::split_tracks;
use crate::delta::{to_deltas, to_series};
use crate::diagnostics::{Anomaly, Diagnostics};
use crate::implicit::derive_fourth_quarters;
use crate::revision::resolve;
use crate::sign::normalize_column;
use crate::stitch::stitch;

/// Output of one reconciliation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Reconciliation {
    /// Requested metrics aligned on one contiguous quarter calendar.
    pub table: ReconciledTable,
    /// Anomalies absorbed along the way.
    pub diagnostics: Diagnostics,
    /// Optional metrics that produced no data. Their columns are all null.
    pub missing_metrics: Vec<String>,
}

/// Turns raw disclosure facts into a clean quarterly table.
#[derive(Clone, Debug, Default)]
pub struct Engine {
    config: ReconConfig,
}

impl Engine {
    /// Creates an engine with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ReconConfig) -> Self {
        self.config = config;
        self
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &ReconConfig {
        &self.config
    }

    /// Converts the facts of one concept tag into single-quarter deltas.
    #[instrument(skip(self, facts, diagnostics), fields(count = facts.len()))]
    pub fn quarterize(
        &self,
        concept: &str,
        facts: &[RawFact],
        basis: SeriesBasis,
        diagnostics: &mut Diagnostics,
    ) -> Vec<QuarterlyDelta> {
        let chain = match basis {
            SeriesBasis::Classified => self.classified_chain(facts, diagnostics),
            SeriesBasis::YearToDate => self.year_to_date_chain(facts),
        };
        let deltas = to_deltas(&chain, self.config.delta_gap_days, diagnostics);
        debug!(chain = chain.len(), deltas = deltas.len(), "Quarterized concept");
        deltas
    }

    /// Quarterly track plus derived fourth quarters, in period-end order.
    fn classified_chain(&self, facts: &[RawFact], diagnostics: &mut Diagnostics) -> Vec<RawFact> {
        let tracks = split_tracks(facts, &self.config);
        let policy = self.config.revision_policy;
        let quarterly = resolve(&tracks.quarterly, policy);
        let annual = resolve(&tracks.annual, policy);

        let derived = derive_fourth_quarters(&annual, &quarterly, diagnostics);
        let mut chain = quarterly;
        chain.extend(derived);
        chain.sort_by_key(|f| (f.end, f.start));
        chain
    }

    /// One cumulative chain: Q1, then every period from a quarter up to a
    /// year long. Shorter non-Q1 periods and multi-year periods are left out.
    fn year_to_date_chain(&self, facts: &[RawFact]) -> Vec<RawFact> {
        let min_days = self.config.quarter_days.max;
        let max_days = self.config.annual_days.max;
        resolve(facts, self.config.revision_policy)
            .into_iter()
            .filter(|f| {
                f.days() <= max_days && (f.days() >= min_days || f.is_labelled(FiscalPeriod::Q1))
            })
            .collect()
    }

    /// Builds the series for one metric by stitching its candidate tags.
    ///
    /// Tags with no facts are recorded and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::NoData`] if no candidate yields a single quarter.
    #[instrument(skip(self, book, spec, diagnostics), fields(metric = %spec.name))]
    pub fn reconcile_metric(
        &self,
        book: &FactBook,
        spec: &MetricSpec,
        diagnostics: &mut Diagnostics,
    ) -> Result<ReconciledSeries> {
        let mut candidates = Vec::with_capacity(spec.candidates.len());
        for tag in &spec.candidates {
            let facts = book.get(tag);
            if facts.is_empty() {
                diagnostics.record(Anomaly::EmptyCandidate {
                    metric: spec.name.clone(),
                    concept: tag.clone(),
                });
                continue;
            }
            let deltas = self.quarterize(tag, facts, spec.basis, diagnostics);
            candidates.push(to_series(&spec.name, tag, &deltas, diagnostics));
        }

        let series = stitch(&spec.name, candidates);
        if series.is_empty() {
            return Err(ReconError::NoData {
                metric: spec.name.clone(),
            });
        }
        debug!(quarters = series.non_null_count(), "Stitched metric");
        Ok(series)
    }

    /// Reconciles every requested metric into one aligned table.
    ///
    /// Optional metrics without data become all-null columns and are listed
    /// in [`Reconciliation::missing_metrics`]. Sign-ambiguous columns are
    /// normalized last.
    ///
    /// # Errors
    ///
    /// - [`ReconError::InvalidParameter`] if `metrics` is empty or repeats a name
    /// - [`ReconError::NoData`] if a required metric has no data, or if no
    ///   metric has any data
    #[instrument(skip(self, book, metrics), fields(entity = ?book.entity, metrics = metrics.len()))]
    pub fn reconcile(&self, book: &FactBook, metrics: &[MetricSpec]) -> Result<Reconciliation> {
        if metrics.is_empty() {
            return Err(ReconError::InvalidParameter(
                "At least one metric is required".to_string(),
            ));
        }
        let mut names = HashSet::with_capacity(metrics.len());
        if let Some(dup) = metrics.iter().find(|m| !names.insert(m.name.as_str())) {
            return Err(ReconError::InvalidParameter(format!(
                "Metric {} requested twice",
                dup.name
            )));
        }

        let mut diagnostics = Diagnostics::new();
        let mut missing_metrics = Vec::new();
        let mut series = Vec::with_capacity(metrics.len());

        for spec in metrics {
            match self.reconcile_metric(book, spec, &mut diagnostics) {
                Ok(s) => series.push(s),
                Err(ReconError::NoData { metric }) if !spec.required => {
                    warn!(metric = %metric, "No data for optional metric, column left null");
                    diagnostics.record(Anomaly::NoData {
                        metric: metric.clone(),
                    });
                    series.push(ReconciledSeries::new(metric.as_str()));
                    missing_metrics.push(metric);
                }
                Err(e) => return Err(e),
            }
        }

        let mut table = align(&series)?;
        for spec in metrics.iter().filter(|m| m.sign_ambiguous) {
            if normalize_column(&mut table, &spec.name) {
                debug!(metric = %spec.name, "Flipped sign convention");
            }
        }

        debug!(
            quarters = table.len(),
            anomalies = diagnostics.len(),
            "Reconciliation complete"
        );
        Ok(Reconciliation {
            table,
            diagnostics,
            missing_metrics,
        })
    }
}
