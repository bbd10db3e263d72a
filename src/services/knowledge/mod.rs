//! Knowledge Subsystem
//!
//! Retrieval-augmented grounding for the analysis agents: documents are
//! chunked and embedded offline by the [`indexer::KnowledgeIndexer`];
//! at analysis time the [`retriever::RagRetriever`] runs top-k cosine
//! queries against the [`store::KnowledgeStore`] and assembles a bounded
//! context string. Retrieval fails closed: an unreachable store yields an
//! empty context, never an aborted analysis.

pub mod chunker;
pub mod embedding;
pub mod indexer;
pub mod retriever;
pub mod store;

pub use chunker::TextChunker;
pub use embedding::{cosine_similarity, CachedEmbedder, EmbeddingProvider, HashingEmbedder};
pub use indexer::KnowledgeIndexer;
pub use retriever::RagRetriever;
pub use store::{DocType, InMemoryKnowledgeStore, KnowledgeChunk, KnowledgeStore, ScoredChunk};
