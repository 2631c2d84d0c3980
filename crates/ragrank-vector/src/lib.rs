//! Vector search and hybrid ranking for ragrank.
//!
//! This crate provides semantic vector search with pluggable embedding
//! providers, an in-memory vector store, and the hybrid combiner that merges
//! vector and lexical result lists into one ranking.
//!
//! # Features
//!
//! - `fastembed`: Enable local embedding generation via fastembed
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     ragrank-vector                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  EmbeddingProvider trait                                    │
//! │  ├── HashingEmbeddingProvider (always available)            │
//! │  └── FastEmbedProvider (feature: fastembed)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  VectorStore trait                                          │
//! │  └── SimpleVectorStore (in-memory, cosine distance)         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  HybridCombiner (weighted sum over vector + lexical hits)   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use ragrank_vector::{HashingEmbeddingProvider, SimpleVectorStore, VectorStore};
//! use std::sync::Arc;
//!
//! let provider = Arc::new(HashingEmbeddingProvider::new(256));
//! let store = SimpleVectorStore::new(provider);
//!
//! store.add_documents(vec![Document::new("Kong routes traffic")]).await?;
//! for m in store.search_with_score("routing", 4).await? {
//!     println!("{:.3} {}", m.distance, m.document.content);
//! }
//! ```

#![doc = include_str!("../README.md")]

pub mod embedding;
pub mod hybrid;
pub mod store;
pub mod types;

#[cfg(feature = "fastembed")]
pub mod fastembed;

// Re-exports: types
pub use types::{
    EmbeddedDocument, EmbeddingConfig, EmbeddingProviderKind, VectorStoreConfig, VectorStoreKind,
};

// Re-exports: traits and implementations
pub use embedding::{EmbeddingProvider, HashingEmbeddingProvider, create_embedding_provider};
pub use store::{SimpleVectorStore, VectorStore, cosine_distance, create_vector_store};

// Re-exports: hybrid ranking
pub use hybrid::{Candidate, HybridCombiner, HybridSearchResult, HybridWeights, MatchSource};

#[cfg(feature = "fastembed")]
pub use fastembed::FastEmbedProvider;
