//! Hybrid retrieval: vector similarity and BM25 relevance in one ranking.
//!
//! [`Retriever`] is the entry point. It owns a vector store and a lexical
//! scorer, keeps the lexical index in sync with the store, and merges both
//! signals per query.
//!
//! ```rust,ignore
//! use ragrank::{RetrievalConfig, Retriever};
//! use ragrank_core::Document;
//!
//! let retriever = Retriever::from_config(&RetrievalConfig::default())?;
//! retriever
//!     .add_documents(vec![Document::new("Kong routes traffic to upstream services")])
//!     .await?;
//!
//! for result in retriever.query("upstream routing", None).await {
//!     println!("{:.3} [{}] {}", result.score, result.source, result.document.content);
//! }
//! ```

#![doc = include_str!("../README.md")]

pub mod config;
pub mod retriever;

pub use config::{RetrievalConfig, ScoringConfig, ScoringParameters, SearchStrategy};
pub use retriever::{CorpusSnapshot, Retriever};

// Re-exports from the component crates
pub use ragrank_core::{Document, Error, Result};
pub use ragrank_lexical::{Bm25Params, LexicalIndexStats};
pub use ragrank_vector::{HybridSearchResult, HybridWeights, MatchSource};
