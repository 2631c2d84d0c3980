//! The retrieval facade.
//!
//! [`Retriever`] couples corpus mutation to lexical index state: every
//! successful change to the vector store re-reads the full corpus from the
//! store, rebuilds the BM25 index, and publishes a new [`CorpusSnapshot`].
//! Queries run vector search and lexical scoring independently and merge the
//! two lists with the [`HybridCombiner`].
//!
//! # Consistency
//!
//! Rebuilds are serialized by an async mutex. A snapshot owns both the
//! documents and the lexical index built from them, and is an `Arc`
//! replaced wholesale. A query takes one snapshot and scores and resolves
//! against it alone, so a query issued during a rebuild works entirely
//! against the previous corpus.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use ragrank_core::{Document, DocumentLookup, Error, LexicalHit, Result, VectorMatch};
use ragrank_lexical::{LexicalIndex, LexicalScorer, LexicalScorerKind, create_lexical_scorer};
use ragrank_vector::{
    HybridCombiner, HybridSearchResult, MatchSource, VectorStore, create_embedding_provider,
    create_vector_store,
};
use tokio::sync::Mutex;

use crate::config::{RetrievalConfig, ScoringConfig, SearchStrategy};

// ============================================================================
// Corpus snapshot
// ============================================================================

/// The corpus as of the last rebuild, with the lexical index built over it.
#[derive(Debug, Clone)]
pub struct CorpusSnapshot {
    generation: u64,
    built_at: DateTime<Utc>,
    documents: Vec<Document>,
    by_content: HashMap<String, usize>,
    lexical: Option<Arc<dyn LexicalIndex>>,
}

impl CorpusSnapshot {
    /// Build a snapshot over `documents`, in store order.
    ///
    /// Documents with identical content collapse to the first one for
    /// lookups.
    pub fn new(generation: u64, documents: Vec<Document>) -> Self {
        let mut by_content = HashMap::with_capacity(documents.len());
        for (i, doc) in documents.iter().enumerate() {
            by_content.entry(doc.content.clone()).or_insert(i);
        }
        Self {
            generation,
            built_at: Utc::now(),
            documents,
            by_content,
            lexical: None,
        }
    }

    /// Attach the lexical index built over this snapshot's contents.
    pub fn with_lexical_index(mut self, index: Arc<dyn LexicalIndex>) -> Self {
        self.lexical = Some(index);
        self
    }

    /// The lexical index for this snapshot; `None` before the first rebuild.
    pub fn lexical_index(&self) -> Option<&Arc<dyn LexicalIndex>> {
        self.lexical.as_ref()
    }

    /// The snapshot before any rebuild: generation 0, no documents.
    pub fn empty() -> Self {
        Self::new(0, Vec::new())
    }

    /// Rebuild counter; 0 means never built.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// When this snapshot was built.
    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// All documents, in store order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Document contents, in store order. This is the lexical corpus.
    pub fn contents(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.content.clone()).collect()
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the snapshot holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of distinct contents.
    pub fn distinct_len(&self) -> usize {
        self.by_content.len()
    }

    /// The document with exactly this content.
    pub fn get(&self, content: &str) -> Option<&Document> {
        self.by_content.get(content).map(|&i| &self.documents[i])
    }
}

impl DocumentLookup for CorpusSnapshot {
    fn lookup(&self, content: &str) -> Result<Option<Document>> {
        Ok(self.get(content).cloned())
    }
}

// ============================================================================
// Retriever
// ============================================================================

/// Hybrid retrieval over a vector store and a lexical scorer.
pub struct Retriever {
    store: Arc<dyn VectorStore>,
    lexical: Arc<dyn LexicalScorer>,
    combiner: HybridCombiner,
    strategy: SearchStrategy,
    default_k: usize,
    snapshot: RwLock<Arc<CorpusSnapshot>>,
    rebuild: Mutex<()>,
}

impl Retriever {
    /// Assemble a retriever from existing components.
    pub fn new(
        store: Arc<dyn VectorStore>,
        lexical: Arc<dyn LexicalScorer>,
        scoring: &ScoringConfig,
    ) -> Self {
        Self {
            store,
            lexical,
            combiner: HybridCombiner::new(scoring.hybrid),
            strategy: scoring.strategy,
            default_k: scoring.parameters.k,
            snapshot: RwLock::new(Arc::new(CorpusSnapshot::empty())),
            rebuild: Mutex::new(()),
        }
    }

    /// Build the embedding provider, vector store and lexical scorer named
    /// by `config`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for out-of-range values or an unavailable
    /// provider.
    pub fn from_config(config: &RetrievalConfig) -> Result<Self> {
        config.validate()?;

        let provider = create_embedding_provider(&config.embeddings)?;
        log::info!(
            "Embedding provider: {} (dimension {})",
            provider.name(),
            provider.dimension()
        );
        let store = create_vector_store(&config.vectorstore, provider)?;
        let lexical = create_lexical_scorer(
            LexicalScorerKind::Bm25,
            config.scoring.bm25,
            config.scoring.parameters.k,
        )?;

        Ok(Self::new(store, lexical, &config.scoring))
    }

    /// The configured ranking strategy.
    pub fn strategy(&self) -> SearchStrategy {
        self.strategy
    }

    /// Results returned when `query` is called without `k`.
    pub fn default_k(&self) -> usize {
        self.default_k
    }

    /// The hybrid combiner in use.
    pub fn combiner(&self) -> &HybridCombiner {
        &self.combiner
    }

    /// The underlying vector store.
    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// The underlying lexical scorer.
    pub fn lexical(&self) -> &Arc<dyn LexicalScorer> {
        &self.lexical
    }

    /// The current corpus snapshot.
    pub fn snapshot(&self) -> Arc<CorpusSnapshot> {
        // Writers only ever replace the Arc, so a poisoned lock still holds
        // a complete snapshot.
        match self.snapshot.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Add documents to the store, then rebuild the lexical index.
    ///
    /// Returns the ids the store assigned.
    pub async fn add_documents(&self, documents: Vec<Document>) -> Result<Vec<String>> {
        let _guard = self.rebuild.lock().await;
        let count = documents.len();
        let ids = self.store.add_documents(documents).await?;
        log::info!("Added {count} documents to {}", self.store.name());
        self.rebuild_locked().await?;
        Ok(ids)
    }

    /// Delete documents from the store (all of them for `None`), then
    /// rebuild the lexical index.
    pub async fn delete(&self, ids: Option<&[String]>) -> Result<usize> {
        let _guard = self.rebuild.lock().await;
        let removed = self.store.delete(ids).await?;
        log::info!("Deleted {removed} documents from {}", self.store.name());
        self.rebuild_locked().await?;
        Ok(removed)
    }

    /// Rebuild the lexical index from the store's current contents.
    pub async fn reindex(&self) -> Result<()> {
        let _guard = self.rebuild.lock().await;
        self.rebuild_locked().await
    }

    /// Caller must hold `self.rebuild`.
    async fn rebuild_locked(&self) -> Result<()> {
        let documents = self.store.documents().await?;
        let generation = self.snapshot().generation() + 1;
        let snapshot = CorpusSnapshot::new(generation, documents);

        let lexical = Arc::clone(&self.lexical);
        let corpus = snapshot.contents();
        let index = tokio::task::spawn_blocking(move || lexical.build(&corpus))
            .await
            .map_err(|e| Error::operation(format!("Lexical rebuild task failed: {e}")))??;

        let snapshot = Arc::new(snapshot.with_lexical_index(Arc::clone(&index)));

        {
            let mut current = self
                .snapshot
                .write()
                .map_err(|e| Error::operation(format!("Snapshot lock poisoned: {e}")))?;
            *current = Arc::clone(&snapshot);
        }
        self.lexical.install(index)?;

        log::info!(
            "Corpus snapshot {} published ({} documents, {} distinct)",
            snapshot.generation(),
            snapshot.len(),
            snapshot.distinct_len()
        );
        Ok(())
    }

    /// Return up to `k` results for `text`. Never fails.
    ///
    /// `None` uses `scoring.parameters.k`. A failing vector store is logged
    /// and treated as an empty vector list, so hybrid ranking continues on
    /// lexical hits alone. Before the first rebuild there is no lexical
    /// index, which is likewise treated as empty.
    pub async fn query(&self, text: &str, k: Option<usize>) -> Vec<HybridSearchResult> {
        let k = k.unwrap_or(self.default_k);
        if k == 0 {
            return Vec::new();
        }

        let snapshot = self.snapshot();
        let results = match self.strategy {
            SearchStrategy::Hybrid => {
                let (vector, lexical) =
                    tokio::join!(self.vector_results(text, k), async {
                        lexical_results(&snapshot, text, k)
                    });
                self.combiner
                    .combine(&vector, &lexical, Some(snapshot.as_ref()), k)
            }
            SearchStrategy::Vector => self
                .vector_results(text, k)
                .await
                .into_iter()
                .map(|m| HybridSearchResult::new(m.document, m.distance, MatchSource::Vector))
                .collect(),
            SearchStrategy::Lexical => {
                resolve_lexical(&snapshot, lexical_results(&snapshot, text, k))
            }
        };

        log::debug!(
            "Query {text:?} ({}, k={k}) returned {} results",
            self.strategy,
            results.len()
        );
        results
    }

    async fn vector_results(&self, text: &str, k: usize) -> Vec<VectorMatch> {
        match self.store.search_with_score(text, k).await {
            Ok(matches) => matches,
            Err(e) => {
                log::error!("Vector search failed, continuing without vector results: {e}");
                Vec::new()
            }
        }
    }
}

fn lexical_results(snapshot: &CorpusSnapshot, text: &str, k: usize) -> Vec<LexicalHit> {
    match snapshot.lexical_index() {
        Some(index) => index.top_k(text, k),
        None => {
            log::warn!("Lexical index not built yet, continuing without lexical results");
            Vec::new()
        }
    }
}

fn resolve_lexical(snapshot: &CorpusSnapshot, hits: Vec<LexicalHit>) -> Vec<HybridSearchResult> {
    let total = hits.len();
    let results: Vec<HybridSearchResult> = hits
        .into_iter()
        .filter_map(|hit| {
            snapshot
                .get(&hit.content)
                .map(|doc| HybridSearchResult::new(doc.clone(), hit.score, MatchSource::Lexical))
        })
        .collect();

    if results.len() < total {
        log::warn!(
            "Dropped {} lexical hits with no matching document",
            total - results.len()
        );
    }
    results
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("store", &self.store.name())
            .field("lexical", &self.lexical.name())
            .field("combiner", &self.combiner)
            .field("strategy", &self.strategy)
            .field("default_k", &self.default_k)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
