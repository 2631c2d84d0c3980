//! Vector store trait and the in-memory implementation.
//!
//! A vector store embeds documents on insert and answers nearest-neighbour
//! queries with a distance per match (lower is more similar). It also owns
//! the corpus: the retrieval layer reads the full document list back from
//! the store whenever it rebuilds its lexical index.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use ragrank_core::{Document, Error, Result, VectorMatch};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::embedding::EmbeddingProvider;
use crate::types::{EmbeddedDocument, VectorStoreConfig, VectorStoreKind};

/// Trait for vector stores.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Return up to `k` documents nearest to `query`, ascending by distance.
    async fn search_with_score(&self, query: &str, k: usize) -> Result<Vec<VectorMatch>>;

    /// Embed and store `documents`, returning their generated ids in order.
    async fn add_documents(&self, documents: Vec<Document>) -> Result<Vec<String>>;

    /// Delete the documents with the given ids, or everything for `None`.
    ///
    /// Returns the number of documents removed. Unknown ids are ignored.
    async fn delete(&self, ids: Option<&[String]>) -> Result<usize>;

    /// All stored documents, in insertion order.
    async fn documents(&self) -> Result<Vec<Document>>;

    /// Number of stored documents.
    async fn document_count(&self) -> Result<usize>;

    /// The store name for diagnostics.
    fn name(&self) -> &str;
}

/// Cosine distance `1 - cos(a, b)`.
///
/// A zero vector is treated as orthogonal to everything (distance 1).
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

/// In-memory vector store with exhaustive cosine search.
///
/// Suitable for corpora of up to a few tens of thousands of chunks. Ties in
/// distance keep insertion order.
pub struct SimpleVectorStore {
    provider: Arc<dyn EmbeddingProvider>,
    entries: RwLock<Vec<EmbeddedDocument>>,
}

impl SimpleVectorStore {
    /// Create an empty store that embeds with `provider`.
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// The embedding provider in use.
    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }
}

#[async_trait]
impl VectorStore for SimpleVectorStore {
    async fn search_with_score(&self, query: &str, k: usize) -> Result<Vec<VectorMatch>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.provider.embed(query).await?;
        let entries = self.entries.read().await;

        let mut scored: Vec<(usize, f32)> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_distance(&query_embedding, &entry.embedding)))
            .collect();
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, distance)| VectorMatch::new(entries[i].document.clone(), distance))
            .collect())
    }

    async fn add_documents(&self, documents: Vec<Document>) -> Result<Vec<String>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
        let embeddings = self.provider.embed_batch(&texts).await?;
        if embeddings.len() != documents.len() {
            return Err(Error::provider(format!(
                "{} returned {} embeddings for {} documents",
                self.provider.name(),
                embeddings.len(),
                documents.len()
            )));
        }

        let mut entries = self.entries.write().await;
        let mut ids = Vec::with_capacity(documents.len());
        for (document, embedding) in documents.into_iter().zip(embeddings) {
            let id = Uuid::new_v4().to_string();
            entries.push(EmbeddedDocument::new(id.clone(), document, embedding));
            ids.push(id);
        }

        log::debug!("Added {} documents ({} total)", ids.len(), entries.len());
        Ok(ids)
    }

    async fn delete(&self, ids: Option<&[String]>) -> Result<usize> {
        let mut entries = self.entries.write().await;
        let before = entries.len();

        match ids {
            None => entries.clear(),
            Some(ids) => entries.retain(|entry| !ids.contains(&entry.id)),
        }

        let removed = before - entries.len();
        log::debug!("Deleted {removed} documents ({} remaining)", entries.len());
        Ok(removed)
    }

    async fn documents(&self) -> Result<Vec<Document>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().map(|entry| entry.document.clone()).collect())
    }

    async fn document_count(&self) -> Result<usize> {
        Ok(self.entries.read().await.len())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

impl std::fmt::Debug for SimpleVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimpleVectorStore")
            .field("provider", &self.provider.name())
            .finish()
    }
}

/// Create the vector store selected by `config`.
pub fn create_vector_store(
    config: &VectorStoreConfig,
    provider: Arc<dyn EmbeddingProvider>,
) -> Result<Arc<dyn VectorStore>> {
    match config.kind {
        VectorStoreKind::Memory => Ok(Arc::new(SimpleVectorStore::new(provider))),
    }
}

// ============================================================================
// Tests
// ============================================================================
