//! RAG Retriever
//!
//! Builds bounded grounding context for the analysis agents from top-k
//! similarity queries. Retrieval fails closed: when the embedder or the
//! store errors, the retriever logs and returns nothing, and callers
//! treat the empty context as "no grounding available" — an unreachable
//! knowledge base must never abort an analysis.

use std::sync::Arc;

use caseguard_core::config::RetrievalConfig;

use super::embedding::EmbeddingProvider;
use super::store::{DocType, KnowledgeStore, ScoredChunk};
use crate::utils::error::{EngineError, EngineResult};

/// Retrieves and formats grounding context.
pub struct RagRetriever {
    store: Arc<dyn KnowledgeStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    config: RetrievalConfig,
}

impl RagRetriever {
    pub fn new(
        store: Arc<dyn KnowledgeStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            config,
        }
    }

    /// Top-k chunks for a query, ranked by descending cosine similarity,
    /// optionally restricted to one doc type. `k` is clamped to the
    /// configured maximum; results below the similarity floor are
    /// dropped.
    ///
    /// Errors are reported so the caller can mark its output as degraded;
    /// most callers want [`RagRetriever::retrieve`], which absorbs them.
    pub async fn try_retrieve(
        &self,
        query: &str,
        doc_type: Option<DocType>,
        k: usize,
    ) -> EngineResult<Vec<ScoredChunk>> {
        let k = k.clamp(1, self.config.max_k);
        let embedding = self
            .embedder
            .embed_query(query)
            .await
            .map_err(|e| EngineError::retrieval(e.to_string()))?;
        let results = self
            .store
            .search(&embedding, k, doc_type)
            .await
            .map_err(|e| EngineError::retrieval(e.to_string()))?;
        Ok(results
            .into_iter()
            .filter(|r| r.similarity >= self.config.min_similarity)
            .collect())
    }

    /// Like [`RagRetriever::try_retrieve`], but never errors: failures
    /// degrade to an empty result. Callers must treat an empty context as
    /// "no grounding available", not as a failed analysis.
    pub async fn retrieve(
        &self,
        query: &str,
        doc_type: Option<DocType>,
        k: usize,
    ) -> Vec<ScoredChunk> {
        match self.try_retrieve(query, doc_type, k).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(error = %e, "retrieval failed, returning empty context");
                Vec::new()
            }
        }
    }

    /// Regulation/policy context for a query, using the default `top_k`.
    pub async fn retrieve_regulations(&self, query: &str) -> Vec<ScoredChunk> {
        self.retrieve(query, Some(DocType::Regulation), self.config.top_k)
            .await
    }

    /// Similar historical cases for a report summary.
    pub async fn retrieve_similar_cases(&self, query: &str) -> Vec<ScoredChunk> {
        self.retrieve(query, Some(DocType::CaseHistory), self.config.similar_cases_k)
            .await
    }

    /// Render retrieved chunks into a single bounded context string.
    ///
    /// Chunks are separated by rulers and prefixed with their source so
    /// agents can cite them. Output is truncated at the configured
    /// character budget on a chunk boundary.
    pub fn build_context(&self, chunks: &[ScoredChunk]) -> String {
        let mut parts = Vec::new();
        let mut budget = self.config.max_context_chars;
        for scored in chunks {
            let part = format!(
                "[Source: {}]\n{}",
                scored.chunk.source_id, scored.chunk.content
            );
            if part.len() > budget {
                break;
            }
            budget -= part.len();
            parts.push(part);
        }
        parts.join("\n\n---\n\n")
    }
}
