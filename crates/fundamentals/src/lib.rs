#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fundamentals/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Quarterly fundamentals reconciliation.
//!
//! This crate re-exports the core types, the reconciliation engine and the
//! fact sources, and provides a [`Reconciler`] that fetches facts with
//! fallback across sources before reconciling them.
//!
//! # Features
//!
//! - `edgar` - SEC EDGAR company-facts source and tag catalog
//!
//! # Example
//!
//! ```rust,ignore
//! use fundamentals::{Reconciler, Symbol, concepts, export};
//!
//! #[tokio::main]
//! async fn main() -> fundamentals::Result<()> {
//!     let reconciler = Reconciler::new().with_edgar("MyApp/1.0 (contact@example.com)")?;
//!
//!     let result = reconciler
//!         .reconcile(&Symbol::new("AAPL"), &concepts::cash_flow_metrics())
//!         .await?;
//!     let table = result.table.with_difference("fcf", "cfoa", "capex")?;
//!
//!     export::write_csv(&table, std::io::stdout())?;
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use fundamentals_core::*;

// Engine
pub use fundamentals_recon::{Anomaly, Diagnostics, Engine, MissingInput, Reconciliation};

// Sources
#[cfg(feature = "edgar")]
pub use fundamentals_edgar::{EdgarSource, concepts, parse_company_facts};

/// DataFrame and CSV export.
pub mod export;

mod memory;
pub use memory::InMemorySource;

mod reconciler;
pub use reconciler::Reconciler;
