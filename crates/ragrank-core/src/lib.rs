//! Shared types, traits and errors for ragrank.
//!
//! This crate provides the foundational types used across all ragrank crates.
//! It has no internal ragrank dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`document`]: Documents and scored result pairs
//! - [`traits`]: The corpus-lookup collaborator trait

#![doc = include_str!("../README.md")]

pub mod document;
pub mod error;
pub mod traits;

// Re-export key types at crate root for convenience
pub use document::{CONTENT_TYPE_KEY, Document, LexicalHit, SOURCE_KEY, VectorMatch};
pub use error::{Error, Result};
pub use traits::DocumentLookup;
