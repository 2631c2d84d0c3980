//! Lexical scorer trait and the in-memory BM25 implementation.
//!
//! A scorer is initialized with a corpus of document texts and then answers
//! `score` calls with the top-k hits. Initialization is two steps: `build`
//! produces an immutable [`LexicalIndex`] off to the side, and `install`
//! swaps it in, so a concurrent `score` call sees either the old index or
//! the new one, never a partial build. Callers that pair the index with
//! other state (such as a corpus snapshot) can keep the built index
//! themselves and publish both in one swap.

use std::sync::{Arc, RwLock};

use ragrank_core::{Error, LexicalHit, Result};

use crate::bm25::Bm25Index;
use crate::types::{Bm25Params, LexicalIndexStats, LexicalScorerKind};

/// Default number of hits returned when `score` is called without `k`.
pub const DEFAULT_K: usize = 4;

/// An immutable, fully built lexical index.
pub trait LexicalIndex: Send + Sync + std::fmt::Debug {
    /// Up to `k` hits for `query`, best first; ties keep corpus order.
    fn top_k(&self, query: &str, k: usize) -> Vec<LexicalHit>;

    /// Corpus statistics.
    fn stats(&self) -> LexicalIndexStats;
}

impl LexicalIndex for Bm25Index {
    fn top_k(&self, query: &str, k: usize) -> Vec<LexicalHit> {
        Bm25Index::top_k(self, query, k)
    }

    fn stats(&self) -> LexicalIndexStats {
        Bm25Index::stats(self)
    }
}

/// Trait for lexical relevance scorers.
///
/// Implementations must be safe to share across tasks; `score` may run
/// concurrently with `initialize`.
pub trait LexicalScorer: Send + Sync {
    /// Build an index over `corpus` without installing it.
    ///
    /// An empty corpus is valid; the index then returns no hits.
    fn build(&self, corpus: &[String]) -> Result<Arc<dyn LexicalIndex>>;

    /// Replace the index used by `score`.
    fn install(&self, index: Arc<dyn LexicalIndex>) -> Result<()>;

    /// Build (or rebuild) the index over `corpus` and install it.
    ///
    /// On failure the previous index stays in place.
    fn initialize(&self, corpus: &[String]) -> Result<()> {
        let index = self.build(corpus)?;
        self.install(index)
    }

    /// Return up to `k` hits for `query`, best first.
    ///
    /// `None` uses the scorer's configured default.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotInitialized` if called before `initialize`.
    fn score(&self, query: &str, k: Option<usize>) -> Result<Vec<LexicalHit>>;

    /// Whether an index has been installed.
    fn is_initialized(&self) -> bool;

    /// Statistics for the current index, if any.
    fn stats(&self) -> Option<LexicalIndexStats>;

    /// The scorer name for diagnostics.
    fn name(&self) -> &str;
}

/// BM25 Okapi scorer over an in-memory index.
pub struct Bm25Scorer {
    params: Bm25Params,
    default_k: usize,
    current: RwLock<Option<Arc<dyn LexicalIndex>>>,
}

impl Bm25Scorer {
    /// Create an uninitialized scorer.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidData` if `params` are out of range.
    pub fn new(params: Bm25Params, default_k: usize) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            default_k,
            current: RwLock::new(None),
        })
    }

    /// The BM25 parameters in use.
    pub fn params(&self) -> Bm25Params {
        self.params
    }

    /// The installed index, if any.
    fn index(&self) -> Result<Option<Arc<dyn LexicalIndex>>> {
        let guard = self
            .current
            .read()
            .map_err(|e| Error::operation(format!("Lexical index lock poisoned: {e}")))?;
        Ok(guard.clone())
    }
}

impl LexicalScorer for Bm25Scorer {
    fn build(&self, corpus: &[String]) -> Result<Arc<dyn LexicalIndex>> {
        let index = match Bm25Index::build(corpus, self.params) {
            Ok(index) => index,
            Err(e) => {
                log::error!("BM25 index build failed, keeping previous index: {e}");
                return Err(e);
            }
        };

        let stats = index.stats();
        log::info!(
            "BM25 index built: {} documents, {} terms, avg length {:.1}",
            stats.documents,
            stats.vocabulary,
            stats.average_length
        );
        Ok(Arc::new(index))
    }

    fn install(&self, index: Arc<dyn LexicalIndex>) -> Result<()> {
        let mut guard = self
            .current
            .write()
            .map_err(|e| Error::operation(format!("Lexical index lock poisoned: {e}")))?;
        *guard = Some(index);
        Ok(())
    }

    fn score(&self, query: &str, k: Option<usize>) -> Result<Vec<LexicalHit>> {
        let index = self
            .index()?
            .ok_or_else(|| Error::not_initialized("lexical scorer"))?;

        let k = k.unwrap_or(self.default_k);
        let hits = index.top_k(query, k);
        log::debug!("BM25 scored {} hits for query {query:?} (k={k})", hits.len());
        Ok(hits)
    }

    fn is_initialized(&self) -> bool {
        matches!(self.index(), Ok(Some(_)))
    }

    fn stats(&self) -> Option<LexicalIndexStats> {
        self.index().ok().flatten().map(|index| index.stats())
    }

    fn name(&self) -> &str {
        "bm25"
    }
}

impl std::fmt::Debug for Bm25Scorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bm25Scorer")
            .field("params", &self.params)
            .field("default_k", &self.default_k)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

/// Create a lexical scorer of the requested kind.
pub fn create_lexical_scorer(
    kind: LexicalScorerKind,
    params: Bm25Params,
    default_k: usize,
) -> Result<Arc<dyn LexicalScorer>> {
    match kind {
        LexicalScorerKind::Bm25 => Ok(Arc::new(Bm25Scorer::new(params, default_k)?)),
    }
}

// ============================================================================
// Tests
// ============================================================================
