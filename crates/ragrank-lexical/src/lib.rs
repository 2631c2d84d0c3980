//! Lexical relevance scoring for ragrank.
//!
//! This crate provides an in-memory BM25 Okapi scorer. The index is rebuilt
//! from scratch on every `initialize` and swapped in atomically, so readers
//! never observe a half-built index.
//!
//! # Modules
//!
//! - [`tokenizer`]: Lowercase whitespace tokenization
//! - [`bm25`]: The immutable BM25 index
//! - [`scorer`]: `LexicalIndex` and `LexicalScorer` traits, `Bm25Scorer`, and the factory
//! - [`types`]: Parameters and statistics

#![doc = include_str!("../README.md")]

pub mod bm25;
pub mod scorer;
pub mod tokenizer;
pub mod types;

// Re-exports
pub use bm25::Bm25Index;
pub use scorer::{Bm25Scorer, DEFAULT_K, LexicalIndex, LexicalScorer, create_lexical_scorer};
pub use tokenizer::tokenize;
pub use types::{Bm25Params, LexicalIndexStats, LexicalScorerKind};
