//! Embedding provider trait and the feature-hashing implementation.
//!
//! This module defines the `EmbeddingProvider` trait that abstracts over
//! different embedding generation backends.
//!
//! # Providers
//!
//! - `HashingEmbeddingProvider`: Deterministic bag-of-words vectors, no model
//! - `FastEmbedProvider`: Local embedding via fastembed (requires `fastembed` feature)

use std::sync::Arc;

use async_trait::async_trait;
use ragrank_core::{Error, Result};

use crate::types::{EmbeddingConfig, EmbeddingProviderKind};

/// Trait for generating text embeddings.
///
/// Implementations wrap specific embedding libraries and provide a uniform
/// async interface. The trait requires `Send + Sync` to allow safe sharing
/// across async tasks.
///
/// # Thread Safety
///
/// Implementations should handle internal synchronization (e.g., `Arc<Mutex<>>`)
/// for thread-unsafe underlying libraries.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for a batch of texts.
    ///
    /// Default implementation calls `embed` for each text sequentially.
    /// Backends that support native batching should override this.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// The embedding dimension.
    fn dimension(&self) -> usize;

    /// The provider name for diagnostics.
    fn name(&self) -> &str;
}

/// Feature-hashing embedding provider.
///
/// Each lowercase whitespace token is hashed with BLAKE3 into one of
/// `dimension` buckets, with a sign bit taken from the same digest. The
/// resulting vector is unit-normalized, so texts sharing vocabulary have a
/// high cosine similarity. Empty text yields the zero vector.
#[derive(Debug, Clone)]
pub struct HashingEmbeddingProvider {
    dimension: usize,
}

impl HashingEmbeddingProvider {
    /// Create a new hashing provider with the given dimension.
    ///
    /// A dimension of 0 is raised to 1.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn hashed_embedding(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimension];

        for token in text.to_lowercase().split_whitespace() {
            let digest = blake3::hash(token.as_bytes());
            let bytes = digest.as_bytes();
            let mut bucket_bytes = [0u8; 8];
            bucket_bytes.copy_from_slice(&bytes[..8]);
            let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimension as u64) as usize;
            let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };
            embedding[bucket] += sign;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for val in &mut embedding {
                *val /= norm;
            }
        }

        embedding
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.hashed_embedding(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.hashed_embedding(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

/// Create the embedding provider selected by `config`.
///
/// # Errors
///
/// Returns `Error::Config` for a zero hashing dimension, or when
/// `fastembed` is requested without the feature compiled in.
pub fn create_embedding_provider(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.kind {
        EmbeddingProviderKind::Hashing => {
            if config.dimension == 0 {
                return Err(Error::config("embeddings.dimension must be greater than 0"));
            }
            Ok(Arc::new(HashingEmbeddingProvider::new(config.dimension)))
        }
        #[cfg(feature = "fastembed")]
        EmbeddingProviderKind::Fastembed => Ok(Arc::new(crate::fastembed::FastEmbedProvider::new(
            &config.model,
            config.cache_path.as_deref(),
        )?)),
        #[cfg(not(feature = "fastembed"))]
        EmbeddingProviderKind::Fastembed => Err(Error::config(
            "embeddings.type = \"fastembed\" requires building with the `fastembed` feature",
        )),
    }
}

// ============================================================================
// Tests
// ============================================================================
