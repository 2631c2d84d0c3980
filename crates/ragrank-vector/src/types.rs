//! Common types for the vector search module.
//!
//! These types are used across all vector stores and embedding providers,
//! and are always available regardless of feature flags.

use ragrank_core::Document;
use serde::{Deserialize, Serialize};

// ============================================================================
// Configuration
// ============================================================================

/// Supported embedding providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    /// Deterministic feature hashing. No model download.
    #[default]
    Hashing,

    /// Local transformer models (requires the `fastembed` feature).
    Fastembed,
}

/// Supported vector stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorStoreKind {
    /// In-memory store with exhaustive cosine search.
    #[default]
    Memory,
}

/// Embedding configuration (`[embeddings]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Provider type.
    #[serde(rename = "type", default)]
    pub kind: EmbeddingProviderKind,

    /// Model name for model-backed providers (e.g., "bge-small-en-v1.5").
    #[serde(default = "default_model")]
    pub model: String,

    /// Output dimension for the hashing provider.
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Path to cache directory for embedding models.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_path: Option<String>,
}

fn default_model() -> String {
    "bge-small-en-v1.5".to_string()
}

fn default_dimension() -> usize {
    256
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            kind: EmbeddingProviderKind::default(),
            model: default_model(),
            dimension: default_dimension(),
            cache_path: None,
        }
    }
}

/// Vector store configuration (`[vectorstore]`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    /// Store type.
    #[serde(rename = "type", default)]
    pub kind: VectorStoreKind,
}

// ============================================================================
// Stored documents
// ============================================================================

/// A document held by a vector store, with its id and embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedDocument {
    /// Store-assigned identifier.
    pub id: String,

    /// The original document.
    pub document: Document,

    /// The embedding vector.
    pub embedding: Vec<f32>,
}

impl EmbeddedDocument {
    /// Create a new embedded document.
    pub fn new(id: impl Into<String>, document: Document, embedding: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            document,
            embedding,
        }
    }

    /// The embedding dimension.
    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_config_default() {
        let config = EmbeddingConfig::default();
        assert_eq!(config.kind, EmbeddingProviderKind::Hashing);
        assert_eq!(config.model, "bge-small-en-v1.5");
        assert_eq!(config.dimension, 256);
        assert!(config.cache_path.is_none());
    }

    #[test]
    fn test_embedding_config_from_toml() {
        let config: EmbeddingConfig = toml::from_str(
            r#"
type = "fastembed"
model = "all-minilm-l6-v2"
"#,
        )
        .unwrap();

        assert_eq!(config.kind, EmbeddingProviderKind::Fastembed);
        assert_eq!(config.model, "all-minilm-l6-v2");
        assert_eq!(config.dimension, 256);
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let result: Result<EmbeddingConfig, _> = toml::from_str(r#"type = "openai""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_vectorstore_config_serialization() {
        let json = serde_json::to_string(&VectorStoreConfig::default()).unwrap();
        assert_eq!(json, r#"{"type":"memory"}"#);
    }

    #[test]
    fn test_embedded_document_dimension() {
        let doc = EmbeddedDocument::new("id-1", Document::new("text"), vec![0.0; 8]);
        assert_eq!(doc.dimension(), 8);
        assert_eq!(doc.id, "id-1");
    }
}
