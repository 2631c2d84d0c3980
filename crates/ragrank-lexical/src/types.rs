//! Common types for lexical scoring.

use ragrank_core::{Error, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// Configuration
// ============================================================================

/// Supported lexical scoring strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LexicalScorerKind {
    /// BM25 Okapi over lowercase whitespace tokens.
    #[default]
    Bm25,
}

/// BM25 Okapi tuning parameters.
///
/// Defaults follow the classic Okapi settings: `k1 = 1.5`, `b = 0.75`, and
/// an IDF floor of `epsilon = 0.25` times the average IDF for terms that
/// appear in more than half of the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Params {
    /// Term-frequency saturation.
    pub k1: f64,

    /// Document length normalization (0 = none, 1 = full).
    pub b: f64,

    /// Floor for negative IDF values, as a fraction of the average IDF.
    pub epsilon: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: 1.5,
            b: 0.75,
            epsilon: 0.25,
        }
    }
}

impl Bm25Params {
    /// Check that the parameters describe a usable model.
    pub fn validate(&self) -> Result<()> {
        if !self.k1.is_finite() || self.k1 < 0.0 {
            return Err(Error::invalid_data(format!(
                "bm25 k1 must be a finite value >= 0, got {}",
                self.k1
            )));
        }
        if !self.b.is_finite() || !(0.0..=1.0).contains(&self.b) {
            return Err(Error::invalid_data(format!(
                "bm25 b must be within [0, 1], got {}",
                self.b
            )));
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(Error::invalid_data(format!(
                "bm25 epsilon must be a finite value >= 0, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Index statistics
// ============================================================================

/// Summary of a built lexical index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LexicalIndexStats {
    /// Number of indexed documents.
    pub documents: usize,

    /// Number of distinct terms.
    pub vocabulary: usize,

    /// Average document length in tokens.
    pub average_length: f64,
}

// ============================================================================
// Tests
// ============================================================================
