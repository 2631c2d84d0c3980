//! BM25 Okapi index over an in-memory corpus.
//!
//! # Algorithm
//!
//! For a query `q` and document `d`:
//!
//! ```text
//! score(d, q) = Σ_{t ∈ q} idf(t) · tf(t,d)·(k1+1) / (tf(t,d) + k1·(1 − b + b·|d|/avgdl))
//! idf(t)      = ln(N − n(t) + 0.5) − ln(n(t) + 0.5)
//! ```
//!
//! Terms occurring in more than half of the corpus get a negative IDF; those
//! are floored to `epsilon × mean(idf)` so that very common terms still add
//! a small positive amount instead of penalizing a match.
//!
//! A [`Bm25Index`] is immutable once built. Re-indexing means building a new
//! one and swapping it in (see [`crate::scorer::Bm25Scorer`]).

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use ragrank_core::{LexicalHit, Result};

use crate::tokenizer::tokenize;
use crate::types::{Bm25Params, LexicalIndexStats};

/// A single entry in a term's postings list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Posting {
    /// Position of the document in the corpus.
    doc: usize,
    /// Number of times the term appears in the document.
    term_frequency: u32,
}

/// Immutable BM25 Okapi ranking model.
#[derive(Debug, Clone)]
pub struct Bm25Index {
    /// Indexed texts, in corpus order.
    documents: Vec<String>,
    /// term → postings, in corpus order.
    postings: HashMap<String, Vec<Posting>>,
    /// Token count per document.
    doc_lengths: Vec<usize>,
    average_length: f64,
    idf: HashMap<String, f64>,
    params: Bm25Params,
}

impl Bm25Index {
    /// Build an index over `documents`.
    ///
    /// An empty corpus is valid and produces an index that scores nothing.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidData` if `params` are out of range.
    pub fn build(documents: &[String], params: Bm25Params) -> Result<Self> {
        params.validate()?;

        let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();
        let mut doc_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut doc_lengths = Vec::with_capacity(documents.len());
        let mut total_length = 0usize;

        for (doc, text) in documents.iter().enumerate() {
            let tokens = tokenize(text);
            total_length += tokens.len();
            doc_lengths.push(tokens.len());

            let mut frequencies: BTreeMap<String, u32> = BTreeMap::new();
            for token in tokens {
                *frequencies.entry(token).or_insert(0) += 1;
            }

            for (term, term_frequency) in frequencies {
                *doc_counts.entry(term.clone()).or_insert(0) += 1;
                postings.entry(term).or_default().push(Posting {
                    doc,
                    term_frequency,
                });
            }
        }

        let average_length = if documents.is_empty() {
            0.0
        } else {
            total_length as f64 / documents.len() as f64
        };
        let idf = compute_idf(&doc_counts, documents.len(), params.epsilon);

        Ok(Self {
            documents: documents.to_vec(),
            postings,
            doc_lengths,
            average_length,
            idf,
            params,
        })
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the index holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// The parameters this index was built with.
    pub fn params(&self) -> Bm25Params {
        self.params
    }

    /// The IDF of a term, if it occurs in the corpus.
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.idf.get(term).copied()
    }

    /// Summary statistics.
    pub fn stats(&self) -> LexicalIndexStats {
        LexicalIndexStats {
            documents: self.documents.len(),
            vocabulary: self.idf.len(),
            average_length: self.average_length,
        }
    }

    /// Score every indexed document against `query`, in corpus order.
    ///
    /// Repeated query terms contribute once per occurrence. Terms that do not
    /// occur in the corpus contribute nothing, so an empty query scores every
    /// document 0.
    pub fn scores(&self, query: &str) -> Vec<f64> {
        let mut scores = vec![0.0f64; self.documents.len()];
        let k1 = self.params.k1;
        let b = self.params.b;

        for term in tokenize(query) {
            let (Some(postings), Some(&idf)) = (self.postings.get(&term), self.idf.get(&term))
            else {
                continue;
            };

            for posting in postings {
                let tf = f64::from(posting.term_frequency);
                let length_ratio = if self.average_length > 0.0 {
                    self.doc_lengths[posting.doc] as f64 / self.average_length
                } else {
                    1.0
                };
                let norm = tf + k1 * (1.0 - b + b * length_ratio);
                scores[posting.doc] += idf * (tf * (k1 + 1.0)) / norm;
            }
        }

        scores
    }

    /// Return the `k` best documents for `query`.
    ///
    /// Ordered by descending score; documents with equal scores keep their
    /// corpus order. Every document is eligible, including those scoring 0.
    pub fn top_k(&self, query: &str, k: usize) -> Vec<LexicalHit> {
        if k == 0 || self.documents.is_empty() {
            return Vec::new();
        }

        let mut ranked: Vec<(usize, f64)> = self.scores(query).into_iter().enumerate().collect();
        // `sort_by` is stable, which gives the corpus-order tie-break.
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        ranked.truncate(k);

        ranked
            .into_iter()
            .map(|(doc, score)| LexicalHit::new(self.documents[doc].clone(), score as f32))
            .collect()
    }
}

/// Compute per-term IDF with the epsilon floor for negative values.
///
/// `doc_counts` is a `BTreeMap` so the IDF sum is accumulated in a fixed
/// order and rebuilding the same corpus yields bit-identical values.
fn compute_idf(
    doc_counts: &BTreeMap<String, usize>,
    corpus_size: usize,
    epsilon: f64,
) -> HashMap<String, f64> {
    let n = corpus_size as f64;
    let mut idf = HashMap::with_capacity(doc_counts.len());
    let mut idf_sum = 0.0;
    let mut negative = Vec::new();

    for (term, &count) in doc_counts {
        let df = count as f64;
        let value = (n - df + 0.5).ln() - (df + 0.5).ln();
        idf_sum += value;
        if value < 0.0 {
            negative.push(term.clone());
        }
        idf.insert(term.clone(), value);
    }

    if idf.is_empty() {
        return idf;
    }

    let floor = epsilon * (idf_sum / idf.len() as f64);
    for term in negative {
        idf.insert(term, floor);
    }
    idf
}

// ============================================================================
// Tests
// ============================================================================
