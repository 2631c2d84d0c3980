//! Hybrid ranking combining vector and lexical results.
//!
//! The two result lists rank possibly different document sets with
//! incompatible scores: vector matches carry a distance (lower is better),
//! lexical hits carry a relevance (higher is better). The combiner reconciles
//! them by document content and ranks the union by a weighted sum.
//!
//! # Algorithm
//!
//! For each candidate document `d`:
//!
//! ```text
//! score(d) = vector_weight · (1 − distance(d)) + lexical_weight · relevance(d)
//! ```
//!
//! A missing distance counts as `0` and a missing relevance counts as `0`.
//! The first rule means a document found only by the lexical scorer gets the
//! full vector component, so lexical-only hits are favoured over vector hits
//! with a non-zero distance. This matches the established ranking behaviour
//! and is kept as-is.
//!
//! Candidates are ordered vector-first, then lexical-only in lexical order;
//! the final sort is stable, so that order breaks ties.
//!
//! # Failure policy
//!
//! [`HybridCombiner::combine`] never fails. Non-finite inputs, invalid
//! weights, or a lookup error make it return the vector results truncated to
//! `k`, tagged [`MatchSource::VectorFallback`] and scored by raw distance.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;

use ragrank_core::{Document, DocumentLookup, Error, LexicalHit, Result, VectorMatch};
use serde::{Deserialize, Serialize};

// ============================================================================
// Weights
// ============================================================================

/// Linear weights for the two ranking signals (`[scoring.hybrid]`).
///
/// The weights are independent multipliers and need not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridWeights {
    /// Multiplier for `1 − distance`.
    pub vector_weight: f64,

    /// Multiplier for lexical relevance.
    #[serde(rename = "bm25_weight", alias = "lexical_weight")]
    pub lexical_weight: f64,
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            vector_weight: 0.7,
            lexical_weight: 0.3,
        }
    }
}

impl HybridWeights {
    /// Create weights without validation.
    pub fn new(vector_weight: f64, lexical_weight: f64) -> Self {
        Self {
            vector_weight,
            lexical_weight,
        }
    }

    /// Both weights must be finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("vector_weight", self.vector_weight),
            ("bm25_weight", self.lexical_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::invalid_data(format!(
                    "{name} must be a finite value >= 0, got {value}"
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Results
// ============================================================================

/// Which ranking signal(s) produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    /// Found by vector search only.
    Vector,
    /// Found by the lexical scorer only.
    Lexical,
    /// Found by both.
    Hybrid,
    /// The combiner degraded; the score is the raw vector distance.
    VectorFallback,
}

impl MatchSource {
    /// Lowercase name, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vector => "vector",
            Self::Lexical => "lexical",
            Self::Hybrid => "hybrid",
            Self::VectorFallback => "vector_fallback",
        }
    }
}

impl fmt::Display for MatchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ranked retrieval result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridSearchResult {
    /// The retrieved document.
    pub document: Document,

    /// Combined score (higher is better), or the raw distance for
    /// [`MatchSource::VectorFallback`] and vector-only strategies.
    pub score: f32,

    /// Which signal(s) produced the result.
    pub source: MatchSource,
}

impl HybridSearchResult {
    /// Create a new result.
    pub fn new(document: Document, score: f32, source: MatchSource) -> Self {
        Self {
            document,
            score,
            source,
        }
    }
}

/// A candidate in the union of both result lists, before truncation.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Document content (the identity key).
    pub content: String,

    /// Vector distance, if the vector side returned this document.
    pub distance: Option<f32>,

    /// Lexical relevance, if the lexical side returned this document.
    pub relevance: Option<f32>,

    /// The document as returned by the vector side.
    pub document: Option<Document>,

    /// Combined score, at full precision. Ranking uses this value.
    pub score: f64,
}

impl Candidate {
    /// Which signal(s) produced this candidate.
    pub fn source(&self) -> MatchSource {
        match (self.distance.is_some(), self.relevance.is_some()) {
            (true, true) => MatchSource::Hybrid,
            (false, true) => MatchSource::Lexical,
            _ => MatchSource::Vector,
        }
    }
}

// ============================================================================
// Combiner
// ============================================================================

/// Weighted-sum combiner for vector and lexical result lists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HybridCombiner {
    weights: HybridWeights,
}

impl HybridCombiner {
    /// Create a combiner. Weights are checked on every combination.
    pub fn new(weights: HybridWeights) -> Self {
        Self { weights }
    }

    /// The configured weights.
    pub fn weights(&self) -> HybridWeights {
        self.weights
    }

    /// Merge both lists into at most `k` ranked results.
    ///
    /// Lexical-only candidates are resolved to documents through `lookup`.
    /// Candidates that cannot be resolved are dropped (and counted in the
    /// log), so fewer than `k` results may be returned.
    pub fn combine(
        &self,
        vector_results: &[VectorMatch],
        lexical_results: &[LexicalHit],
        lookup: Option<&dyn DocumentLookup>,
        k: usize,
    ) -> Vec<HybridSearchResult> {
        if k == 0 {
            return Vec::new();
        }

        match self.try_combine(vector_results, lexical_results, lookup, k) {
            Ok(results) => results,
            Err(e) => {
                log::error!("Hybrid combination failed, falling back to vector results: {e}");
                fallback(vector_results, k)
            }
        }
    }

    /// The scored union of both lists, in candidate order (unsorted).
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidData` for invalid weights or any non-finite
    /// distance, relevance, or combined score.
    pub fn candidates(
        &self,
        vector_results: &[VectorMatch],
        lexical_results: &[LexicalHit],
    ) -> Result<Vec<Candidate>> {
        self.weights.validate()?;

        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut candidates: Vec<Candidate> = Vec::new();

        for m in vector_results {
            if !m.distance.is_finite() {
                return Err(Error::invalid_data(format!(
                    "non-finite vector distance {} for {:?}",
                    m.distance,
                    m.document.preview(40)
                )));
            }
            let content = m.document.content.as_str();
            if positions.contains_key(content) {
                continue;
            }
            positions.insert(content, candidates.len());
            candidates.push(Candidate {
                content: content.to_string(),
                distance: Some(m.distance),
                relevance: None,
                document: Some(m.document.clone()),
                score: 0.0,
            });
        }

        let mut seen_lexical: HashSet<&str> = HashSet::new();
        for hit in lexical_results {
            if !hit.score.is_finite() {
                return Err(Error::invalid_data(format!(
                    "non-finite lexical score {} for {:?}",
                    hit.score, hit.content
                )));
            }
            let content = hit.content.as_str();
            if !seen_lexical.insert(content) {
                continue;
            }
            match positions.get(content) {
                Some(&i) => candidates[i].relevance = Some(hit.score),
                None => {
                    positions.insert(content, candidates.len());
                    candidates.push(Candidate {
                        content: content.to_string(),
                        distance: None,
                        relevance: Some(hit.score),
                        document: None,
                        score: 0.0,
                    });
                }
            }
        }

        let HybridWeights {
            vector_weight,
            lexical_weight,
        } = self.weights;
        for candidate in &mut candidates {
            let distance = f64::from(candidate.distance.unwrap_or(0.0));
            let relevance = f64::from(candidate.relevance.unwrap_or(0.0));
            let combined = vector_weight * (1.0 - distance) + lexical_weight * relevance;
            if !combined.is_finite() || !(combined as f32).is_finite() {
                return Err(Error::invalid_data(format!(
                    "combined score overflowed for {:?}",
                    candidate.content
                )));
            }
            candidate.score = combined;
        }

        Ok(candidates)
    }

    fn try_combine(
        &self,
        vector_results: &[VectorMatch],
        lexical_results: &[LexicalHit],
        lookup: Option<&dyn DocumentLookup>,
        k: usize,
    ) -> Result<Vec<HybridSearchResult>> {
        let mut candidates = self.candidates(vector_results, lexical_results)?;
        candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        candidates.truncate(k);

        let mut results = Vec::with_capacity(candidates.len());
        let mut dropped = 0usize;

        for candidate in candidates {
            let source = candidate.source();
            let document = match (candidate.document, lookup) {
                (Some(document), _) => document,
                (None, Some(lookup)) => match lookup.lookup(&candidate.content)? {
                    Some(document) => document,
                    None => {
                        dropped += 1;
                        continue;
                    }
                },
                (None, None) => {
                    dropped += 1;
                    continue;
                }
            };
            results.push(HybridSearchResult::new(document, candidate.score as f32, source));
        }

        if dropped > 0 {
            log::warn!("Dropped {dropped} lexical-only candidates with no matching document");
        }
        Ok(results)
    }
}

impl Default for HybridCombiner {
    fn default() -> Self {
        Self::new(HybridWeights::default())
    }
}

fn fallback(vector_results: &[VectorMatch], k: usize) -> Vec<HybridSearchResult> {
    vector_results
        .iter()
        .take(k)
        .map(|m| HybridSearchResult::new(m.document.clone(), m.distance, MatchSource::VectorFallback))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn vm(content: &str, distance: f32) -> VectorMatch {
        VectorMatch::new(Document::new(content), distance)
    }

    fn hit(content: &str, score: f32) -> LexicalHit {
        LexicalHit::new(content, score)
    }

    fn corpus(contents: &[&str]) -> HashMap<String, Document> {
        contents
            .iter()
            .map(|c| (c.to_string(), Document::new(*c)))
            .collect()
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-5,
            "expected {expected}, got {actual}"
        );
    }

    struct FailingLookup;

    impl DocumentLookup for FailingLookup {
        fn lookup(&self, _content: &str) -> Result<Option<Document>> {
            Err(Error::operation("lookup backend unavailable"))
        }
    }

    // ------------------------------------------------------------------------
    // Weights
    // ------------------------------------------------------------------------

    #[test]
    fn test_weights_default() {
        let weights = HybridWeights::default();
        assert_eq!(weights.vector_weight, 0.7);
        assert_eq!(weights.lexical_weight, 0.3);
        assert!(weights.validate().is_ok());
    }

    #[test]
    fn test_weights_validation() {
        assert!(HybridWeights::new(-0.1, 0.3).validate().is_err());
        assert!(HybridWeights::new(0.7, f64::NAN).validate().is_err());
        assert!(HybridWeights::new(f64::INFINITY, 0.3).validate().is_err());
        assert!(HybridWeights::new(0.0, 0.0).validate().is_ok());
        assert!(HybridWeights::new(2.0, 5.0).validate().is_ok());
    }

    #[test]
    fn test_weights_config_keys() {
        let weights: HybridWeights = toml::from_str("bm25_weight = 0.5").unwrap();
        assert_eq!(weights.lexical_weight, 0.5);
        assert_eq!(weights.vector_weight, 0.7);

        let weights: HybridWeights =
            toml::from_str("vector_weight = 0.2\nlexical_weight = 0.8").unwrap();
        assert_eq!(weights, HybridWeights::new(0.2, 0.8));
    }

    #[test]
    fn test_match_source_serialization() {
        let json = serde_json::to_string(&MatchSource::VectorFallback).unwrap();
        assert_eq!(json, "\"vector_fallback\"");
        assert_eq!(MatchSource::Hybrid.to_string(), "hybrid");
    }

    // ------------------------------------------------------------------------
    // Combination
    // ------------------------------------------------------------------------

    #[test]
    fn test_deterministic_ordering_regression() {
        let vector = vec![vm("D1 text", 0.1), vm("D2 text", 0.4)];
        let lexical = vec![hit("D2 text", 3.0), hit("D3 text", 1.0)];
        let lookup = corpus(&["D1 text", "D2 text", "D3 text"]);

        let results = HybridCombiner::default().combine(&vector, &lexical, Some(&lookup), 3);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].document.content, "D2 text");
        assert_close(results[0].score, 1.32);
        assert_eq!(results[0].source, MatchSource::Hybrid);

        assert_eq!(results[1].document.content, "D3 text");
        assert_close(results[1].score, 1.0);
        assert_eq!(results[1].source, MatchSource::Lexical);

        assert_eq!(results[2].document.content, "D1 text");
        assert_close(results[2].score, 0.63);
        assert_eq!(results[2].source, MatchSource::Vector);
    }

    #[test]
    fn test_lexical_only_gets_full_vector_component() {
        // A lexical-only hit with relevance 0 still scores vector_weight,
        // which beats any vector hit with a non-zero distance.
        let vector = vec![vm("near", 0.05)];
        let lexical = vec![hit("unrelated", 0.0)];
        let lookup = corpus(&["near", "unrelated"]);

        let results = HybridCombiner::default().combine(&vector, &lexical, Some(&lookup), 2);

        assert_eq!(results[0].document.content, "unrelated");
        assert_close(results[0].score, 0.7);
        assert_eq!(results[1].document.content, "near");
        assert_close(results[1].score, 0.665);
    }

    #[test]
    fn test_vector_document_preferred_over_lookup() {
        let vector = vec![VectorMatch::new(
            Document::new("shared").with_metadata("source", "vector-side"),
            0.2,
        )];
        let lexical = vec![hit("shared", 1.0)];
        let mut lookup = HashMap::new();
        lookup.insert(
            "shared".to_string(),
            Document::new("shared").with_metadata("source", "lookup-side"),
        );

        let results = HybridCombiner::default().combine(&vector, &lexical, Some(&lookup), 4);
        assert_eq!(results[0].document.source(), Some("vector-side"));
    }

    #[test]
    fn test_unresolvable_lexical_hits_dropped() {
        let vector = vec![vm("a", 0.5)];
        let lexical = vec![hit("b", 2.0), hit("c", 1.0)];
        let lookup = corpus(&["a", "c"]);

        let results = HybridCombiner::default().combine(&vector, &lexical, Some(&lookup), 3);
        let contents: Vec<&str> = results.iter().map(|r| r.document.content.as_str()).collect();
        assert_eq!(contents, vec!["c", "a"]);
    }

    #[test]
    fn test_no_lookup_drops_lexical_only() {
        let vector = vec![vm("a", 0.5)];
        let lexical = vec![hit("a", 1.0), hit("b", 9.0)];

        let results = HybridCombiner::default().combine(&vector, &lexical, None, 4);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.content, "a");
        assert_eq!(results[0].source, MatchSource::Hybrid);
    }

    #[test]
    fn test_drops_happen_after_truncation() {
        // "b" takes the only slot, then fails to resolve.
        let vector = vec![vm("a", 0.5)];
        let lexical = vec![hit("b", 9.0)];

        let results = HybridCombiner::default().combine(&vector, &lexical, None, 1);
        assert!(results.is_empty());
    }

    #[test]
    fn test_first_occurrence_wins() {
        let vector = vec![vm("a", 0.1), vm("a", 0.9)];
        let lexical = vec![hit("a", 2.0), hit("a", 0.5)];

        let candidates = HybridCombiner::default()
            .candidates(&vector, &lexical)
            .unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].distance, Some(0.1));
        assert_eq!(candidates[0].relevance, Some(2.0));
    }

    #[test]
    fn test_candidate_order_vector_first() {
        let vector = vec![vm("v1", 0.3), vm("both", 0.2)];
        let lexical = vec![hit("l1", 1.0), hit("both", 0.5), hit("l2", 0.1)];

        let candidates = HybridCombiner::default()
            .candidates(&vector, &lexical)
            .unwrap();
        let contents: Vec<&str> = candidates.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["v1", "both", "l1", "l2"]);
        assert_eq!(candidates[1].source(), MatchSource::Hybrid);
        assert_eq!(candidates[2].source(), MatchSource::Lexical);
    }

    #[test]
    fn test_ranking_uses_full_precision_scores() {
        // Both combined scores narrow to 1.0f32; the lexical-only one is
        // larger by 1e-12 and must still rank first.
        let combiner = HybridCombiner::new(HybridWeights::new(1.0, 1e-12));
        let vector = vec![vm("vector only", 0.0)];
        let lexical = vec![hit("lexical only", 1.0)];
        let corpus = corpus(&["vector only", "lexical only"]);

        let candidates = combiner.candidates(&vector, &lexical).unwrap();
        assert!(candidates[1].score > candidates[0].score);
        assert_eq!(candidates[0].score as f32, candidates[1].score as f32);

        let results = combiner.combine(&vector, &lexical, Some(&corpus), 2);
        assert_eq!(results[0].document.content, "lexical only");
        assert_eq!(results[1].document.content, "vector only");
        assert_eq!(results[0].score, 1.0);
    }

    #[test]
    fn test_score_beyond_f32_range_falls_back() {
        let combiner = HybridCombiner::new(HybridWeights::new(0.7, 1e30));
        let vector = vec![vm("a", 0.1)];
        let lexical = vec![hit("a", 1e30)];

        let results = combiner.combine(&vector, &lexical, None, 1);
        assert_eq!(results[0].source, MatchSource::VectorFallback);
    }

    #[test]
    fn test_ties_keep_candidate_order() {
        let vector = vec![vm("x", 0.5), vm("y", 0.5)];
        let results = HybridCombiner::default().combine(&vector, &[], None, 2);
        assert_eq!(results[0].document.content, "x");
        assert_eq!(results[1].document.content, "y");
    }

    #[test]
    fn test_top_k_bound() {
        let vector: Vec<VectorMatch> = (0..10).map(|i| vm(&format!("v{i}"), 0.1)).collect();
        let combiner = HybridCombiner::default();

        assert_eq!(combiner.combine(&vector, &[], None, 3).len(), 3);
        assert_eq!(combiner.combine(&vector, &[], None, 50).len(), 10);
        assert!(combiner.combine(&vector, &[], None, 0).is_empty());
    }

    #[test]
    fn test_empty_inputs() {
        assert!(HybridCombiner::default().combine(&[], &[], None, 4).is_empty());
    }

    #[test]
    fn test_lexical_only_ranking() {
        // Vector side failed upstream; only lexical hits remain.
        let lexical = vec![hit("doc A", 5.0)];
        let lookup = corpus(&["doc A"]);

        let results = HybridCombiner::default().combine(&[], &lexical, Some(&lookup), 4);
        assert_eq!(results.len(), 1);
        assert_close(results[0].score, 2.2);
        assert_eq!(results[0].source, MatchSource::Lexical);
    }

    // ------------------------------------------------------------------------
    // Fallback
    // ------------------------------------------------------------------------

    #[test]
    fn test_nan_relevance_falls_back() {
        let vector = vec![vm("a", 0.2), vm("b", 0.3), vm("c", 0.4)];
        let lexical = vec![hit("a", f32::NAN)];

        let results = HybridCombiner::default().combine(&vector, &lexical, None, 2);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.source == MatchSource::VectorFallback));
        assert_eq!(results[0].document.content, "a");
        assert_close(results[0].score, 0.2);
        assert_close(results[1].score, 0.3);
    }

    #[test]
    fn test_infinite_distance_falls_back() {
        let vector = vec![vm("a", f32::INFINITY)];
        let results = HybridCombiner::default().combine(&vector, &[], None, 4);
        assert_eq!(results[0].source, MatchSource::VectorFallback);
        assert_eq!(results[0].score, f32::INFINITY);
    }

    #[test]
    fn test_invalid_weights_fall_back() {
        let combiner = HybridCombiner::new(HybridWeights::new(-1.0, 0.3));
        let vector = vec![vm("a", 0.2)];
        let lexical = vec![hit("b", 1.0)];

        let results = combiner.combine(&vector, &lexical, None, 4);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source, MatchSource::VectorFallback);
    }

    #[test]
    fn test_lookup_error_falls_back() {
        let vector = vec![vm("a", 0.5)];
        let lexical = vec![hit("b", 3.0)];

        let results = HybridCombiner::default().combine(&vector, &lexical, Some(&FailingLookup), 4);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.content, "a");
        assert_eq!(results[0].source, MatchSource::VectorFallback);
        assert_close(results[0].score, 0.5);
    }

    #[test]
    fn test_result_serialization() {
        let result = HybridSearchResult::new(Document::new("body"), 0.5, MatchSource::Hybrid);
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"source\":\"hybrid\""));
        assert!(json.contains("\"content\":\"body\""));
        assert!(!json.contains("metadata"));
    }
}
