//! In-memory fact source.

use std::collections::HashMap;

use async_trait::async_trait;
use fundamentals_core::{FactBook, FactSource, ReconError, Result, Symbol};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Fact source serving books registered up front.
///
/// Books are stored in a `RwLock`-protected `HashMap` and cloned on every
/// fetch. Suited to tests and to payloads downloaded ahead of time.
#[derive(Debug)]
pub struct InMemorySource {
    name: String,
    books: RwLock<HashMap<Symbol, FactBook>>,
}

impl InMemorySource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: "In-memory".to_string(),
            books: RwLock::default(),
        }
    }

    /// Renames the source.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers the facts served for `symbol`.
    #[must_use]
    pub fn with_book(mut self, symbol: impl Into<Symbol>, book: FactBook) -> Self {
        self.books.get_mut().insert(symbol.into(), book);
        self
    }

    /// Registers or replaces the facts served for `symbol`.
    pub async fn insert(&self, symbol: impl Into<Symbol>, book: FactBook) {
        self.books.write().await.insert(symbol.into(), book);
    }

    /// Forgets `symbol`. Returns true if it was registered.
    pub async fn remove(&self, symbol: &Symbol) -> bool {
        self.books.write().await.remove(symbol).is_some()
    }
}

impl Default for InMemorySource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FactSource for InMemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self), fields(source = %self.name, symbol = %symbol))]
    async fn fetch_facts(&self, symbol: &Symbol) -> Result<FactBook> {
        match self.books.read().await.get(symbol) {
            Some(book) => {
                debug!(
                    concepts = book.concept_count(),
                    facts = book.len(),
                    "Serving stored facts"
                );
                Ok(book.clone())
            }
            None => Err(ReconError::SymbolNotFound(symbol.to_string())),
        }
    }

    async fn supports_symbol(&self, symbol: &Symbol) -> Result<bool> {
        Ok(self.books.read().await.contains_key(symbol))
    }
}
