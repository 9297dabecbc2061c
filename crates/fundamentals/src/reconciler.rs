//! Fact sources and the reconciliation engine behind one entry point.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, instrument, warn};

use fundamentals_core::{
    FactBook, FactSource, MetricSpec, ReconConfig, ReconError, Result, Symbol,
};
use fundamentals_recon::{Engine, Reconciliation};

/// Fetches facts from registered sources and reconciles them.
///
/// Sources are tried in registration order until one returns the symbol's
/// facts; the engine then reconciles them. The engine runs synchronously on
/// the fetched book, only fetching is concurrent.
///
/// # Example
///
/// ```rust,ignore
/// use fundamentals::{Reconciler, Symbol, concepts};
///
/// let reconciler = Reconciler::new().with_edgar("MyApp/1.0 (contact@example.com)")?;
/// let result = reconciler
///     .reconcile(&Symbol::new("AAPL"), &concepts::cash_flow_metrics())
///     .await?;
/// let table = result.table.with_difference("fcf", "cfoa", "capex")?;
/// ```
#[derive(Default)]
pub struct Reconciler {
    sources: Vec<Arc<dyn FactSource>>,
    engine: Engine,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field(
                "sources",
                &self.sources.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("engine", &self.engine)
            .finish()
    }
}

impl Reconciler {
    /// Creates a reconciler with no sources and the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the engine configuration.
    #[must_use]
    pub fn with_config(mut self, config: ReconConfig) -> Self {
        self.engine = self.engine.with_config(config);
        self
    }

    /// Adds a source after the already registered ones.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn FactSource>) -> Self {
        self.register(source);
        self
    }

    /// Registers a fact source.
    pub fn register(&mut self, source: Arc<dyn FactSource>) {
        debug!(source = source.name(), "Registering fact source");
        self.sources.push(source);
    }

    /// Adds the SEC EDGAR source.
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::Network`] if the HTTP client cannot be built.
    #[cfg(feature = "edgar")]
    pub fn with_edgar(self, user_agent: &str) -> Result<Self> {
        let source = fundamentals_edgar::EdgarSource::new(user_agent)?;
        Ok(self.with_source(Arc::new(source)))
    }

    /// The engine used for reconciliation.
    #[must_use]
    pub const fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Names of the registered sources, in fallback order.
    pub fn source_names(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|s| s.name())
    }

    /// Fetches the facts for `symbol`, trying sources in order.
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::SourceNotConfigured`] if no source is registered,
    /// otherwise the last source's error when every source fails.
    pub async fn fetch_facts(&self, symbol: &Symbol) -> Result<FactBook> {
        if self.sources.is_empty() {
            return Err(ReconError::SourceNotConfigured(
                "No fact sources registered".to_string(),
            ));
        }

        let mut last_error = None;
        for source in &self.sources {
            debug!(source = source.name(), symbol = %symbol, "Fetching facts");
            match source.fetch_facts(symbol).await {
                Ok(book) => return Ok(book),
                Err(e) => {
                    warn!(
                        source = source.name(),
                        error = %e,
                        "Source failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| ReconError::Other("All sources failed with no error".to_string())))
    }

    /// Fetches and reconciles the requested metrics for one company.
    ///
    /// # Errors
    ///
    /// Propagates fetch failures and the engine's fatal errors.
    #[instrument(skip(self, metrics), fields(symbol = %symbol, metrics = metrics.len()))]
    pub async fn reconcile(&self, symbol: &Symbol, metrics: &[MetricSpec]) -> Result<Reconciliation> {
        let book = self.fetch_facts(symbol).await?;
        self.engine.reconcile(&book, metrics)
    }

    /// Reconciles several companies, fetching their facts concurrently.
    ///
    /// Results come back in input order; one company failing does not affect
    /// the others.
    pub async fn reconcile_many(
        &self,
        symbols: &[Symbol],
        metrics: &[MetricSpec],
    ) -> Vec<(Symbol, Result<Reconciliation>)> {
        let results = join_all(symbols.iter().map(|s| self.reconcile(s, metrics))).await;
        symbols.iter().cloned().zip(results).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemorySource;
    use chrono::NaiveDate;
    use fundamentals_core::{FiscalPeriod, QuarterLabel, RawFact, SeriesBasis};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn cash_flow_book(cfoa: [f64; 4], capex: [f64; 4]) -> FactBook {
        let periods = [
            (date(2023, 3, 31), FiscalPeriod::Q1),
            (date(2023, 6, 30), FiscalPeriod::Q2),
            (date(2023, 9, 30), FiscalPeriod::Q3),
            (date(2023, 12, 31), FiscalPeriod::FY),
        ];
        let mut book = FactBook::new();
        for (tag, values) in [("OpCash", cfoa), ("Capex", capex)] {
            for ((end, fp), value) in periods.iter().zip(values) {
                book.insert(
                    RawFact::new(tag, date(2023, 1, 1), *end, Some(value))
                        .unwrap()
                        .with_fiscal_period(*fp),
                );
            }
        }
        book
    }

    fn metrics() -> Vec<MetricSpec> {
        vec![
            MetricSpec::new("cfoa", ["OpCash"]).with_basis(SeriesBasis::YearToDate),
            MetricSpec::new("capex", ["Capex"])
                .sign_ambiguous()
                .with_basis(SeriesBasis::YearToDate),
        ]
    }

    #[tokio::test]
    async fn test_reconcile_from_source() {
        let source = InMemorySource::new().with_book(
            "ACME",
            cash_flow_book([10.0, 22.0, 35.0, 50.0], [-2.0, -5.0, -9.0, -12.0]),
        );
        let reconciler = Reconciler::new().with_source(Arc::new(source));

        let result = reconciler
            .reconcile(&Symbol::new("acme"), &metrics())
            .await
            .unwrap();

        let table = result.table.with_difference("fcf", "cfoa", "capex").unwrap();
        let q4 = QuarterLabel::new(4, 2023).unwrap();
        assert_eq!(table.value(q4, "cfoa"), Some(15.0));
        assert_eq!(table.value(q4, "capex"), Some(3.0));
        assert_eq!(table.value(q4, "fcf"), Some(12.0));
        assert_eq!(table.series("cfoa").unwrap().trailing_sum(4), Some(50.0));
    }

    #[tokio::test]
    async fn test_falls_back_to_next_source() {
        let empty = InMemorySource::new().with_name("empty");
        let full = InMemorySource::new().with_name("full").with_book(
            "ACME",
            cash_flow_book([1.0, 2.0, 3.0, 4.0], [1.0, 2.0, 3.0, 4.0]),
        );
        let reconciler = Reconciler::new()
            .with_source(Arc::new(empty))
            .with_source(Arc::new(full));

        assert_eq!(reconciler.source_names().collect::<Vec<_>>(), vec!["empty", "full"]);
        let book = reconciler.fetch_facts(&Symbol::new("ACME")).await.unwrap();
        assert!(book.contains("OpCash"));
    }

    #[tokio::test]
    async fn test_no_sources() {
        let err = Reconciler::new()
            .reconcile(&Symbol::new("ACME"), &metrics())
            .await
            .unwrap_err();
        assert!(matches!(err, ReconError::SourceNotConfigured(_)));
    }

    #[tokio::test]
    async fn test_reconcile_many_keeps_order_and_isolates_failures() {
        let source = InMemorySource::new()
            .with_book("AAA", cash_flow_book([1.0, 2.0, 3.0, 4.0], [1.0, 2.0, 3.0, 4.0]))
            .with_book("CCC", cash_flow_book([5.0, 6.0, 7.0, 8.0], [1.0, 2.0, 3.0, 4.0]));
        let reconciler = Reconciler::new().with_source(Arc::new(source));
        let symbols = vec![Symbol::new("AAA"), Symbol::new("BBB"), Symbol::new("CCC")];

        let results = reconciler.reconcile_many(&symbols, &metrics()).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, Symbol::new("AAA"));
        assert!(results[0].1.is_ok());
        assert!(matches!(results[1].1, Err(ReconError::SymbolNotFound(_))));
        let ccc = results[2].1.as_ref().unwrap();
        let q1 = QuarterLabel::new(1, 2023).unwrap();
        assert_eq!(ccc.table.value(q1, "cfoa"), Some(5.0));
    }
}
