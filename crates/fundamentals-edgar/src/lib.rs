#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fundamentals/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! SEC EDGAR fact source.
//!
//! # Example
//!
//! ```no_run
//! use fundamentals_core::{FactSource, Symbol};
//! use fundamentals_edgar::EdgarSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = EdgarSource::new("MyApp/1.0 (contact@example.com)")?;
//!     let book = source.fetch_facts(&Symbol::new("AAPL")).await?;
//!     println!("{} concepts for {:?}", book.concept_count(), book.entity);
//!     Ok(())
//! }
//! ```

/// Candidate tags for common metrics.
pub mod concepts;

use async_trait::async_trait;
use chrono::NaiveDate;
use fundamentals_core::{FactBook, FactSource, RawFact, ReconError, Result, Symbol};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::{debug, instrument, warn};

/// SEC EDGAR API base URL
const EDGAR_BASE_URL: &str = "https://data.sec.gov";

/// SEC company tickers URL
const COMPANY_TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers.json";

/// SEC allows 10 requests per second.
const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(100);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Taxonomy every catalog tag lives in.
const TAXONOMY: &str = "us-gaap";

/// Only monetary facts reported in dollars are read.
const UNIT: &str = "USD";

#[derive(Debug)]
struct RateLimiter {
    last_request: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            last_request: now.checked_sub(min_interval).unwrap_or(now),
            min_interval,
        }
    }

    async fn wait(&mut self) {
        let elapsed = self.last_request.elapsed();
        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }
        self.last_request = Instant::now();
    }
}

/// Fact source backed by the SEC EDGAR company-facts API.
#[derive(Debug, Clone)]
pub struct EdgarSource {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl EdgarSource {
    /// Creates a source identifying itself with `user_agent`.
    ///
    /// The SEC rejects anonymous clients; use the form
    /// `"AppName/Version (contact@email.com)"`.
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::Network`] if the HTTP client cannot be built.
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ReconError::Network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client))
    }

    /// Creates a source around a pre-configured client.
    ///
    /// The client must already send an identifying user agent.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(DEFAULT_RATE_LIMIT))),
        }
    }

    /// Rate-limited GET, decoded as JSON.
    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.rate_limiter.lock().await.wait().await;

        debug!("EDGAR request: {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ReconError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(ReconError::RateLimited {
                source_name: "SEC EDGAR".to_string(),
                retry_after,
            });
        }

        if !response.status().is_success() {
            return Err(ReconError::Network(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ReconError::Parse(format!("Failed to parse {url}: {e}")))
    }

    /// Looks up a company's CIK from its ticker, zero-padded to 10 digits.
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::SymbolNotFound`] if the SEC does not list the ticker.
    #[instrument(skip(self))]
    pub async fn get_cik(&self, ticker: &str) -> Result<String> {
        if ticker.trim().is_empty() {
            return Err(ReconError::InvalidParameter("Empty ticker".to_string()));
        }

        let tickers: HashMap<String, CompanyTickerInfo> = self.get(COMPANY_TICKERS_URL).await?;
        let cik = find_cik(&tickers, ticker)
            .ok_or_else(|| ReconError::SymbolNotFound(ticker.to_string()))?;
        debug!(cik = %cik, "Resolved CIK");
        Ok(cik)
    }

    /// Downloads every fact the company has filed.
    #[instrument(skip(self))]
    async fn fetch_company_facts(&self, cik: &str) -> Result<CompanyFactsResponse> {
        let url = format!("{EDGAR_BASE_URL}/api/xbrl/companyfacts/CIK{cik:0>10}.json");
        self.get(&url).await
    }
}

#[async_trait]
impl FactSource for EdgarSource {
    fn name(&self) -> &str {
        "SEC EDGAR"
    }

    async fn fetch_facts(&self, symbol: &Symbol) -> Result<FactBook> {
        let cik = self.get_cik(symbol.as_str()).await?;
        let response = self.fetch_company_facts(&cik).await?;
        let book = fact_book(response);
        debug!(
            symbol = %symbol,
            concepts = book.concept_count(),
            facts = book.len(),
            "Fetched company facts"
        );
        Ok(book)
    }

    async fn supports_symbol(&self, symbol: &Symbol) -> Result<bool> {
        match self.get_cik(symbol.as_str()).await {
            Ok(_) => Ok(true),
            Err(ReconError::SymbolNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Parses a company-facts JSON payload into a [`FactBook`].
///
/// Useful for payloads downloaded ahead of time.
///
/// # Errors
///
/// Returns [`ReconError::Parse`] if the payload is not a company-facts document.
pub fn parse_company_facts(json: &str) -> Result<FactBook> {
    let response: CompanyFactsResponse = serde_json::from_str(json)
        .map_err(|e| ReconError::Parse(format!("Failed to parse company facts: {e}")))?;
    Ok(fact_book(response))
}

fn find_cik(tickers: &HashMap<String, CompanyTickerInfo>, ticker: &str) -> Option<String> {
    let wanted = ticker.trim();
    tickers
        .values()
        .find(|company| company.ticker.eq_ignore_ascii_case(wanted))
        .map(|company| format!("{:0>10}", company.cik_str))
}

/// Keeps `us-gaap` USD duration facts; instants and unparsable entries are skipped.
fn fact_book(response: CompanyFactsResponse) -> FactBook {
    let mut book = FactBook::new();
    if let Some(name) = response.entity_name {
        book = book.with_entity(name);
    }

    let Some(taxonomy) = response.facts.get(TAXONOMY) else {
        warn!("Company facts carry no {} taxonomy", TAXONOMY);
        return book;
    };

    for (tag, tag_facts) in taxonomy {
        let Some(values) = tag_facts.units.get(UNIT) else {
            continue;
        };
        let mut skipped = 0usize;
        for value in values {
            match raw_fact(tag, value) {
                Some(fact) => book.insert(fact),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            debug!(concept = %tag, skipped, "Skipped instant or malformed facts");
        }
    }
    book
}

fn raw_fact(tag: &str, value: &FactValue) -> Option<RawFact> {
    let start = parse_date(value.start.as_deref()?)?;
    let end = parse_date(&value.end)?;
    let mut fact = RawFact::new(tag, start, end, value.val).ok()?;
    if let Some(fp) = value.fp.as_deref().and_then(|fp| fp.parse().ok()) {
        fact = fact.with_fiscal_period(fp);
    }
    if let Some(filed) = value.filed.as_deref().and_then(parse_date) {
        fact = fact.with_filed(filed);
    }
    if let Some(form) = &value.form {
        fact = fact.with_form(form.as_str());
    }
    Some(fact)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

// =============================================================================
// SEC API Response Types
// =============================================================================

/// Company ticker information from SEC JSON.
#[derive(Debug, Deserialize)]
struct CompanyTickerInfo {
    /// SEC returns the CIK as an integer.
    cik_str: u64,
    ticker: String,
}

/// Response from the SEC EDGAR Company Facts API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompanyFactsResponse {
    #[serde(default)]
    entity_name: Option<String>,
    /// Facts organized by taxonomy and tag
    #[serde(default)]
    facts: HashMap<String, HashMap<String, TagFacts>>,
}

/// Facts for one XBRL tag, keyed by unit.
#[derive(Debug, Deserialize)]
struct TagFacts {
    #[serde(default)]
    units: HashMap<String, Vec<FactValue>>,
}

/// A single fact value with metadata.
#[derive(Debug, Clone, Deserialize)]
struct FactValue {
    /// Absent for instant (balance sheet) facts.
    #[serde(default)]
    start: Option<String>,
    end: String,
    #[serde(default)]
    val: Option<f64>,
    #[serde(default)]
    fp: Option<String>,
    #[serde(default)]
    form: Option<String>,
    #[serde(default)]
    filed: Option<String>,
}
