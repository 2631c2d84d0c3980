//! Retrieval configuration.
//!
//! Mirrors the `[scoring]`, `[embeddings]` and `[vectorstore]` sections of
//! the configuration file. Every field has a default, so an empty file (or
//! no file) yields a working hybrid setup.

use ragrank_core::{Error, Result};
use ragrank_lexical::Bm25Params;
use ragrank_vector::{EmbeddingConfig, HybridWeights, VectorStoreConfig};
use serde::{Deserialize, Serialize};

/// How query results are ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
    /// Weighted combination of vector and lexical scores.
    #[default]
    Hybrid,

    /// Vector search only; the score is the raw distance.
    Vector,

    /// BM25 only.
    #[serde(alias = "bm25")]
    Lexical,
}

impl SearchStrategy {
    /// Lowercase name, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hybrid => "hybrid",
            Self::Vector => "vector",
            Self::Lexical => "lexical",
        }
    }
}

impl std::str::FromStr for SearchStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "hybrid" => Ok(Self::Hybrid),
            "vector" => Ok(Self::Vector),
            "lexical" | "bm25" => Ok(Self::Lexical),
            other => Err(Error::config(format!(
                "Unknown scoring type '{other}'. Expected hybrid, vector, lexical or bm25"
            ))),
        }
    }
}

impl std::fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `[scoring.parameters]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringParameters {
    /// Number of results returned when a query does not specify `k`.
    pub k: usize,
}

impl Default for ScoringParameters {
    fn default() -> Self {
        Self { k: 4 }
    }
}

/// `[scoring]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Ranking strategy.
    #[serde(rename = "type")]
    pub strategy: SearchStrategy,

    /// Hybrid weights.
    pub hybrid: HybridWeights,

    /// Query parameters.
    pub parameters: ScoringParameters,

    /// BM25 tuning.
    pub bm25: Bm25Params,
}

/// Everything needed to build a [`Retriever`](crate::Retriever).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Scoring and ranking.
    pub scoring: ScoringConfig,

    /// Embedding provider.
    pub embeddings: EmbeddingConfig,

    /// Vector store.
    pub vectorstore: VectorStoreConfig,
}

impl RetrievalConfig {
    /// Check value ranges that the type system does not.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` naming the offending key.
    pub fn validate(&self) -> Result<()> {
        self.scoring
            .hybrid
            .validate()
            .map_err(|e| Error::config(format!("scoring.hybrid: {e}")))?;
        self.scoring
            .bm25
            .validate()
            .map_err(|e| Error::config(format!("scoring.bm25: {e}")))?;
        if self.embeddings.dimension == 0 {
            return Err(Error::config("embeddings.dimension must be greater than 0"));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
