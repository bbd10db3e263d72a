//! Knowledge Store
//!
//! Vector storage and top-k similarity search. The store is an external
//! collaborator in production (pgvector, a vector DB); the in-memory
//! implementation here serves tests and small embedded deployments.
//! Chunks are immutable once indexed — re-indexing a source supersedes
//! its chunks rather than mutating them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::embedding::cosine_similarity;
use crate::utils::error::EngineResult;

/// Kind of source document a chunk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocType {
    /// A full regulation text.
    Regulation,
    /// A single article of a regulation.
    Article,
    /// Internal policy or SOP.
    Policy,
    /// Handling guideline (e.g. whistleblowing standards).
    Guideline,
    /// A closed historical case, used for similar-case grounding.
    CaseHistory,
}

/// One embedded chunk of a source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    /// Identifier of the source document.
    pub source_id: String,
    /// Zero-based index of this chunk within its source.
    pub chunk_index: usize,
    pub content: String,
    pub embedding: Vec<f32>,
    pub doc_type: DocType,
}

/// A chunk with its similarity to a query.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: KnowledgeChunk,
    pub similarity: f32,
}

/// Vector upsert and top-k similarity query.
///
/// Writes happen on the offline indexing path only; readers tolerate
/// eventually-consistent content and never block writers.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Insert a batch of chunks.
    async fn upsert(&self, chunks: Vec<KnowledgeChunk>) -> EngineResult<()>;

    /// Remove all chunks of a source. Returns the number removed.
    async fn delete_source(&self, source_id: &str) -> EngineResult<usize>;

    /// Top-k chunks by descending cosine similarity to `embedding`,
    /// optionally restricted to one doc type.
    async fn search(
        &self,
        embedding: &[f32],
        k: usize,
        doc_type: Option<DocType>,
    ) -> EngineResult<Vec<ScoredChunk>>;
}

/// Brute-force in-memory store.
///
/// Linear cosine scan over all chunks; fine for the corpus sizes a test
/// or embedded deployment holds.
#[derive(Default)]
pub struct InMemoryKnowledgeStore {
    chunks: RwLock<Vec<KnowledgeChunk>>,
}

impl InMemoryKnowledgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of chunks currently stored.
    pub async fn len(&self) -> usize {
        self.chunks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.chunks.read().await.is_empty()
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryKnowledgeStore {
    async fn upsert(&self, mut new_chunks: Vec<KnowledgeChunk>) -> EngineResult<()> {
        let mut chunks = self.chunks.write().await;
        chunks.append(&mut new_chunks);
        Ok(())
    }

    async fn delete_source(&self, source_id: &str) -> EngineResult<usize> {
        let mut chunks = self.chunks.write().await;
        let before = chunks.len();
        chunks.retain(|c| c.source_id != source_id);
        Ok(before - chunks.len())
    }

    async fn search(
        &self,
        embedding: &[f32],
        k: usize,
        doc_type: Option<DocType>,
    ) -> EngineResult<Vec<ScoredChunk>> {
        let chunks = self.chunks.read().await;
        let mut scored: Vec<ScoredChunk> = chunks
            .iter()
            .filter(|c| doc_type.map_or(true, |t| c.doc_type == t))
            .map(|c| ScoredChunk {
                similarity: cosine_similarity(embedding, &c.embedding),
                chunk: c.clone(),
            })
            .collect();
        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(source: &str, index: usize, doc_type: DocType, embedding: Vec<f32>) -> KnowledgeChunk {
        KnowledgeChunk {
            source_id: source.to_string(),
            chunk_index: index,
            content: format!("{} chunk {}", source, index),
            embedding,
            doc_type,
        }
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let store = InMemoryKnowledgeStore::new();
        store
            .upsert(vec![
                chunk("a", 0, DocType::Regulation, vec![1.0, 0.0]),
                chunk("b", 0, DocType::Regulation, vec![0.0, 1.0]),
                chunk("c", 0, DocType::Regulation, vec![0.7, 0.7]),
            ])
            .await
            .unwrap();

        let results = store.search(&[1.0, 0.0], 3, None).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].chunk.source_id, "a");
        assert_eq!(results[1].chunk.source_id, "c");
        assert_eq!(results[2].chunk.source_id, "b");
        assert!(results[0].similarity > results[1].similarity);
    }

    #[tokio::test]
    async fn test_search_truncates_to_k() {
        let store = InMemoryKnowledgeStore::new();
        for i in 0..10 {
            store
                .upsert(vec![chunk("src", i, DocType::Policy, vec![1.0, 0.0])])
                .await
                .unwrap();
        }
        let results = store.search(&[1.0, 0.0], 3, None).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_search_doc_type_filter() {
        let store = InMemoryKnowledgeStore::new();
        store
            .upsert(vec![
                chunk("reg", 0, DocType::Regulation, vec![1.0, 0.0]),
                chunk("case", 0, DocType::CaseHistory, vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        let results = store
            .search(&[1.0, 0.0], 10, Some(DocType::CaseHistory))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.source_id, "case");
    }

    #[tokio::test]
    async fn test_delete_source_supersedes() {
        let store = InMemoryKnowledgeStore::new();
        store
            .upsert(vec![
                chunk("reg", 0, DocType::Regulation, vec![1.0]),
                chunk("reg", 1, DocType::Regulation, vec![1.0]),
                chunk("other", 0, DocType::Regulation, vec![1.0]),
            ])
            .await
            .unwrap();

        let removed = store.delete_source("reg").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.len().await, 1);
        assert_eq!(store.delete_source("missing").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search_empty_store() {
        let store = InMemoryKnowledgeStore::new();
        let results = store.search(&[1.0, 0.0], 5, None).await.unwrap();
        assert!(results.is_empty());
    }
}
