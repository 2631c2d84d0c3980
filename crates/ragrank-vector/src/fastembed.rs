//! Local transformer embeddings via `fastembed`.
//!
//! `fastembed::TextEmbedding` needs exclusive access while embedding and is
//! CPU-bound, so the model sits behind `Arc<Mutex<>>` and every call runs on
//! `tokio::task::spawn_blocking`.
//!
//! Requires the `fastembed` feature.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ragrank_core::{Error, Result};

use crate::embedding::EmbeddingProvider;

/// Model names accepted in `embeddings.model`.
pub const SUPPORTED_MODELS: &[&str] = &[
    "bge-small-en-v1.5",
    "bge-base-en-v1.5",
    "all-minilm-l6-v2",
    "nomic-embed-text-v1.5",
];

fn resolve_model(name: &str) -> Result<fastembed::EmbeddingModel> {
    match name.to_ascii_lowercase().as_str() {
        "bge-small-en-v1.5" => Ok(fastembed::EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Ok(fastembed::EmbeddingModel::BGEBaseENV15),
        "all-minilm-l6-v2" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2),
        "nomic-embed-text-v1.5" => Ok(fastembed::EmbeddingModel::NomicEmbedTextV15),
        other => Err(Error::config(format!(
            "Unknown embedding model: '{other}'. Supported: {}",
            SUPPORTED_MODELS.join(", ")
        ))),
    }
}

/// Embedding provider backed by a locally cached transformer model.
pub struct FastEmbedProvider {
    model: Arc<Mutex<fastembed::TextEmbedding>>,
    dimension: usize,
    model_name: String,
}

impl FastEmbedProvider {
    /// Load `model_name`, downloading it into `cache_path` on first use.
    ///
    /// The dimension is read from a probe embedding rather than a table, so
    /// it always matches the loaded weights.
    pub fn new(model_name: &str, cache_path: Option<&str>) -> Result<Self> {
        let mut init = fastembed::InitOptions::new(resolve_model(model_name)?);
        if let Some(path) = cache_path {
            init = init.with_cache_dir(PathBuf::from(path));
        }

        log::info!("Loading embedding model {model_name}");
        let mut text_embedding = fastembed::TextEmbedding::try_new(init)
            .map_err(|e| Error::provider(format!("Failed to load model {model_name}: {e}")))?;

        let dimension = text_embedding
            .embed(vec!["probe"], None)
            .map_err(|e| Error::provider(format!("Dimension probe failed: {e}")))?
            .first()
            .map(Vec::len)
            .ok_or_else(|| Error::provider("Dimension probe returned no embedding"))?;

        Ok(Self {
            model: Arc::new(Mutex::new(text_embedding)),
            dimension,
            model_name: model_name.to_string(),
        })
    }

    async fn run(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let model = Arc::clone(&self.model);

        tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|e| Error::operation(format!("Embedding model lock poisoned: {e}")))?;
            model
                .embed(texts, None)
                .map_err(|e| Error::provider(format!("Embedding failed: {e}")))
        })
        .await
        .map_err(|e| Error::operation(format!("Embedding task failed: {e}")))?
    }
}

#[async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.run(vec![text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::provider("No embedding returned"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.run(texts.iter().map(|t| t.to_string()).collect()).await
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

impl std::fmt::Debug for FastEmbedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedProvider")
            .field("model", &self.model_name)
            .field("dimension", &self.dimension)
            .finish()
    }
}
