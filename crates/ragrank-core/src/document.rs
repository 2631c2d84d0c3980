//! Documents and the scored pairs that flow between ragrank components.
//!
//! A [`Document`] is identified across result sets by its `content`, not by
//! a store id. The vector side reports [`VectorMatch`]es (distance, lower is
//! better) and the lexical side reports [`LexicalHit`]s (relevance, higher is
//! better); the hybrid combiner reconciles the two by content.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Document
// ============================================================================

/// Metadata key holding the origin of a document (URL, file path).
pub const SOURCE_KEY: &str = "source";

/// Metadata key holding the content-type tag of a document.
pub const CONTENT_TYPE_KEY: &str = "content_type";

/// An immutable unit of retrievable text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Text body. Also the identity key across result sets.
    pub content: String,

    /// Arbitrary metadata key-value pairs.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Create a document with no metadata.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    /// Add a metadata key-value pair.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The `source` metadata entry, if any.
    pub fn source(&self) -> Option<&str> {
        self.metadata.get(SOURCE_KEY).map(String::as_str)
    }

    /// The `content_type` metadata entry, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.metadata.get(CONTENT_TYPE_KEY).map(String::as_str)
    }

    /// First `max_chars` characters of the content, for log lines and listings.
    pub fn preview(&self, max_chars: usize) -> String {
        let mut chars = self.content.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }
}

// ============================================================================
// Scored pairs
// ============================================================================

/// A vector search hit: a document and its distance from the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMatch {
    /// The matched document.
    pub document: Document,

    /// Distance from the query embedding (lower is more similar).
    pub distance: f32,
}

impl VectorMatch {
    /// Create a new vector match.
    pub fn new(document: Document, distance: f32) -> Self {
        Self { document, distance }
    }
}

/// A lexical scoring hit: document content and its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexicalHit {
    /// Content of the matched document.
    pub content: String,

    /// Relevance score (higher is more relevant).
    pub score: f32,
}

impl LexicalHit {
    /// Create a new lexical hit.
    pub fn new(content: impl Into<String>, score: f32) -> Self {
        Self {
            content: content.into(),
            score,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
