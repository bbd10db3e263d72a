//! Knowledge Indexer
//!
//! Offline/batch path that chunks and embeds source documents and writes
//! the vectors to the knowledge store. Not on the request hot path.
//! Re-indexing a source supersedes its previous chunks.

use std::sync::Arc;

use super::chunker::TextChunker;
use super::embedding::EmbeddingProvider;
use super::store::{DocType, KnowledgeChunk, KnowledgeStore};
use crate::utils::error::EngineResult;

/// Chunks, embeds, and stores source documents.
pub struct KnowledgeIndexer {
    store: Arc<dyn KnowledgeStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    chunker: TextChunker,
}

impl KnowledgeIndexer {
    pub fn new(
        store: Arc<dyn KnowledgeStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        chunker: TextChunker,
    ) -> Self {
        Self {
            store,
            embedder,
            chunker,
        }
    }

    /// Index one document, replacing any chunks previously stored for
    /// the same source id. Returns the number of chunks written.
    pub async fn index_document(
        &self,
        source_id: &str,
        doc_type: DocType,
        content: &str,
    ) -> EngineResult<usize> {
        let pieces = self.chunker.chunk(content);
        if pieces.is_empty() {
            tracing::warn!(source_id, "document produced no chunks, skipping");
            return Ok(0);
        }

        let refs: Vec<&str> = pieces.iter().map(|p| p.as_str()).collect();
        let embeddings = self.embedder.embed_documents(&refs).await?;

        let chunks: Vec<KnowledgeChunk> = pieces
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(index, (content, embedding))| KnowledgeChunk {
                source_id: source_id.to_string(),
                chunk_index: index,
                content,
                embedding,
                doc_type,
            })
            .collect();
        let count = chunks.len();

        // Supersede, then write. A reader between the two calls sees a
        // partially-indexed source; retrieval tolerates that.
        self.store.delete_source(source_id).await?;
        self.store.upsert(chunks).await?;
        tracing::info!(source_id, count, "indexed document");
        Ok(count)
    }

    /// Index a regulation plus its individual articles.
    ///
    /// The full text is indexed under the regulation name; each article
    /// additionally gets its own fine-grained entry so compliance
    /// retrieval can cite specific articles.
    pub async fn index_regulation(
        &self,
        name: &str,
        full_text: &str,
        articles: &[(&str, &str)],
    ) -> EngineResult<usize> {
        let mut total = self
            .index_document(name, DocType::Regulation, full_text)
            .await?;
        for (number, content) in articles {
            let source = format!("{} art. {}", name, number);
            let text = format!("Article {}: {}", number, content);
            total += self
                .index_document(&source, DocType::Article, &text)
                .await?;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::knowledge::embedding::HashingEmbedder;
    use crate::services::knowledge::store::InMemoryKnowledgeStore;

    fn indexer_with_store() -> (KnowledgeIndexer, Arc<InMemoryKnowledgeStore>) {
        let store = Arc::new(InMemoryKnowledgeStore::new());
        let indexer = KnowledgeIndexer::new(
            store.clone(),
            Arc::new(HashingEmbedder::default()),
            TextChunker::new(80, 10),
        );
        (indexer, store)
    }

    #[tokio::test]
    async fn test_index_document_writes_chunks() {
        let (indexer, store) = indexer_with_store();
        let count = indexer
            .index_document(
                "Code of Ethics",
                DocType::Policy,
                &"Employees must refuse gifts connected to their office. ".repeat(5),
            )
            .await
            .unwrap();
        assert!(count > 1);
        assert_eq!(store.len().await, count);
    }

    #[tokio::test]
    async fn test_reindex_supersedes_previous_chunks() {
        let (indexer, store) = indexer_with_store();
        let first = indexer
            .index_document("sop", DocType::Policy, &"old text. ".repeat(30))
            .await
            .unwrap();
        assert!(first > 1);

        let second = indexer
            .index_document("sop", DocType::Policy, "new short text.")
            .await
            .unwrap();
        assert_eq!(second, 1);
        // Only the new chunks remain.
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_empty_document_indexes_nothing() {
        let (indexer, store) = indexer_with_store();
        let count = indexer
            .index_document("empty", DocType::Policy, "   ")
            .await
            .unwrap();
        assert_eq!(count, 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_index_regulation_includes_articles() {
        let (indexer, store) = indexer_with_store();
        let count = indexer
            .index_regulation(
                "Anti-Corruption Act",
                "Prohibits corruption, bribery, and gratification by officials.",
                &[
                    ("2", "Unlawful self-enrichment causing state losses"),
                    ("12B", "Gratification to officials is deemed bribery"),
                ],
            )
            .await
            .unwrap();
        assert!(count >= 3);

        // Article entries are individually addressable.
        let chunks = store.search(&vec![0.0f32; 384], usize::MAX, None).await.unwrap();
        assert!(chunks
            .iter()
            .any(|c| c.chunk.source_id == "Anti-Corruption Act art. 12B"
                && c.chunk.doc_type == DocType::Article));
    }
}
