//! Source traits for obtaining raw disclosure facts.
//!
//! The reconciliation engine never fetches anything itself. Collaborators
//! implementing [`FactSource`] resolve a ticker and hand back every fact the
//! company disclosed, grouped by concept tag in a [`FactBook`].

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::Result,
    types::{FactBook, Symbol},
};

/// Provider of raw disclosure facts.
///
/// Implementations own their transport (HTTP, files, fixtures) and map its
/// failures into [`ReconError`](crate::ReconError) variants.
#[async_trait]
pub trait FactSource: Send + Sync + Debug {
    /// Returns the name of this source (e.g., "SEC EDGAR").
    fn name(&self) -> &str;

    /// Fetches every fact disclosed by the company behind `symbol`.
    ///
    /// Returns [`ReconError::SymbolNotFound`](crate::ReconError::SymbolNotFound)
    /// when the source does not know the symbol.
    async fn fetch_facts(&self, symbol: &Symbol) -> Result<FactBook>;

    /// Checks if a symbol is supported by this source.
    ///
    /// Default implementation fetches the facts and reports whether that
    /// succeeded.
    async fn supports_symbol(&self, symbol: &Symbol) -> Result<bool> {
        match self.fetch_facts(symbol).await {
            Ok(_) => Ok(true),
            Err(crate::error::ReconError::SymbolNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
